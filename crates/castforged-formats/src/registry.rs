//! Extension and MIME type lookup over the format table.

use std::collections::HashMap;
use std::path::Path;

use crate::error::RegistryError;
use crate::format::{FormatCategory, FormatDescriptor, FormatId, FORMATS};

/// Immutable format lookup tables.
///
/// Built once at start-up and shared read-only afterwards. Construction
/// rejects tables in which two descriptors claim the same extension, so
/// extension detection never depends on declaration order.
#[derive(Debug, Clone)]
pub struct FormatRegistry {
    descriptors: Vec<FormatDescriptor>,
    by_id: HashMap<FormatId, usize>,
    by_extension: HashMap<String, usize>,
    by_mime: HashMap<String, usize>,
}

impl FormatRegistry {
    /// Build the registry from [`FORMATS`].
    pub fn build() -> Result<Self, RegistryError> {
        Self::from_descriptors(FORMATS.iter().copied())
    }

    /// Build a registry from an arbitrary descriptor list.
    ///
    /// Playlist descriptors are forced non-transcodable. When several
    /// descriptors share a MIME type, MIME lookups resolve to the first one
    /// declared.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = FormatDescriptor>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            descriptors: Vec::new(),
            by_id: HashMap::new(),
            by_extension: HashMap::new(),
            by_mime: HashMap::new(),
        };

        for mut descriptor in descriptors {
            if registry.by_id.contains_key(&descriptor.identifier) {
                return Err(RegistryError::DuplicateFormat(descriptor.identifier));
            }

            if descriptor.category == FormatCategory::Playlist {
                descriptor.transcodable = false;
            }

            let pos = registry.descriptors.len();

            for ext in descriptor.extensions {
                let key = normalize_extension(ext);
                if let Some(&prev) = registry.by_extension.get(&key) {
                    return Err(RegistryError::DuplicateExtension {
                        extension: key,
                        first: registry.descriptors[prev].identifier,
                        second: descriptor.identifier,
                    });
                }
                registry.by_extension.insert(key, pos);
            }

            if let Some(mime) = descriptor.mime_type {
                registry.by_mime.entry(normalize_mime(mime)).or_insert(pos);
            }

            registry.by_id.insert(descriptor.identifier, pos);
            registry.descriptors.push(descriptor);
        }

        tracing::debug!(
            formats = registry.descriptors.len(),
            extensions = registry.by_extension.len(),
            "format registry built"
        );

        Ok(registry)
    }

    /// Look up a format by file extension, ignoring case and a leading dot.
    pub fn lookup_by_extension(&self, extension: &str) -> Option<&FormatDescriptor> {
        let key = normalize_extension(extension);
        if key.is_empty() {
            return None;
        }
        self.by_extension.get(&key).map(|&pos| &self.descriptors[pos])
    }

    /// Look up a format by MIME type. Parameters (`; charset=...`) are ignored.
    pub fn lookup_by_mime(&self, mime: &str) -> Option<&FormatDescriptor> {
        let key = normalize_mime(mime);
        if key.is_empty() {
            return None;
        }
        self.by_mime.get(&key).map(|&pos| &self.descriptors[pos])
    }

    /// Look up a format by the extension of a file name or path.
    pub fn lookup_by_filename(&self, path: impl AsRef<Path>) -> Option<&FormatDescriptor> {
        let ext = path.as_ref().extension()?.to_str()?;
        self.lookup_by_extension(ext)
    }

    /// Descriptor for an identifier, if registered.
    pub fn get(&self, id: FormatId) -> Option<&FormatDescriptor> {
        self.by_id.get(&id).map(|&pos| &self.descriptors[pos])
    }

    /// The secondary interpretation of a format, if it declares one.
    pub fn secondary(&self, descriptor: &FormatDescriptor) -> Option<&FormatDescriptor> {
        descriptor.secondary_format.and_then(|id| self.get(id))
    }

    /// All descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.descriptors.iter()
    }

    /// All registered extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

fn normalize_mime(mime: &str) -> String {
    mime.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}
