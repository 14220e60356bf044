//! H.264 level model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseLevelError;

/// H.264 level (Annex A), ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "1.0")]
    Level1_0,
    #[serde(rename = "1b")]
    Level1b,
    #[serde(rename = "1.1")]
    Level1_1,
    #[serde(rename = "1.2")]
    Level1_2,
    #[serde(rename = "1.3")]
    Level1_3,
    #[serde(rename = "2.0")]
    Level2_0,
    #[serde(rename = "2.1")]
    Level2_1,
    #[serde(rename = "2.2")]
    Level2_2,
    #[serde(rename = "3.0")]
    Level3_0,
    #[serde(rename = "3.1")]
    Level3_1,
    #[serde(rename = "3.2")]
    Level3_2,
    #[serde(rename = "4.0")]
    Level4_0,
    #[serde(rename = "4.1")]
    Level4_1,
    #[serde(rename = "4.2")]
    Level4_2,
    #[serde(rename = "5.0")]
    Level5_0,
    #[serde(rename = "5.1")]
    Level5_1,
    #[serde(rename = "5.2")]
    Level5_2,
    #[serde(rename = "6.0")]
    Level6_0,
    #[serde(rename = "6.1")]
    Level6_1,
    #[serde(rename = "6.2")]
    Level6_2,
}

impl Level {
    /// Map a raw `level_idc` (ten times the level number) to a level.
    ///
    /// `9` is the level 1b code used by High profiles.
    pub fn from_idc(idc: u8) -> Option<Self> {
        let level = match idc {
            9 => Self::Level1b,
            10 => Self::Level1_0,
            11 => Self::Level1_1,
            12 => Self::Level1_2,
            13 => Self::Level1_3,
            20 => Self::Level2_0,
            21 => Self::Level2_1,
            22 => Self::Level2_2,
            30 => Self::Level3_0,
            31 => Self::Level3_1,
            32 => Self::Level3_2,
            40 => Self::Level4_0,
            41 => Self::Level4_1,
            42 => Self::Level4_2,
            50 => Self::Level5_0,
            51 => Self::Level5_1,
            52 => Self::Level5_2,
            60 => Self::Level6_0,
            61 => Self::Level6_1,
            62 => Self::Level6_2,
            _ => return None,
        };
        Some(level)
    }

    /// Raw `level_idc` for this level.
    pub fn idc(&self) -> u8 {
        match self {
            Self::Level1_0 => 10,
            Self::Level1b => 9,
            Self::Level1_1 => 11,
            Self::Level1_2 => 12,
            Self::Level1_3 => 13,
            Self::Level2_0 => 20,
            Self::Level2_1 => 21,
            Self::Level2_2 => 22,
            Self::Level3_0 => 30,
            Self::Level3_1 => 31,
            Self::Level3_2 => 32,
            Self::Level4_0 => 40,
            Self::Level4_1 => 41,
            Self::Level4_2 => 42,
            Self::Level5_0 => 50,
            Self::Level5_1 => 51,
            Self::Level5_2 => 52,
            Self::Level6_0 => 60,
            Self::Level6_1 => 61,
            Self::Level6_2 => 62,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level1b => write!(f, "1b"),
            other => {
                let idc = other.idc();
                write!(f, "{}.{}", idc / 10, idc % 10)
            }
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts the forms media probers report: `"4.1"`, `"41"`, `"4"`,
    /// `"L4.1"`, `"1b"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseLevelError(s.to_string());
        let trimmed = s.trim().to_ascii_lowercase();
        let value = trimmed.strip_prefix('l').unwrap_or(&trimmed);

        if value == "1b" {
            return Ok(Self::Level1b);
        }

        let idc = match value.split_once('.') {
            Some((major, minor)) => {
                let major: u8 = major.parse().map_err(|_| err())?;
                let minor: u8 = minor.parse().map_err(|_| err())?;
                if minor > 9 {
                    return Err(err());
                }
                major.checked_mul(10).and_then(|m| m.checked_add(minor))
            }
            None => {
                let n: u8 = value.parse().map_err(|_| err())?;
                if n < 10 {
                    n.checked_mul(10)
                } else {
                    Some(n)
                }
            }
        };

        idc.and_then(Self::from_idc).ok_or_else(err)
    }
}
