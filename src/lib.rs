//! Castforged - media classification core for DLNA media servers
//!
//! This library crate exposes the classifier, configuration and file
//! inspection used by the `castforged` binary.

pub mod classifier;
pub mod config;
pub mod inspect;

pub use classifier::MediaClassifier;
