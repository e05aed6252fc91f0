//! Platform descriptor driving every conditional branch of a plan

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linux distribution family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFamily {
    Ubuntu,
    Debian,
    Redhat,
    Centos,
    Fedora,
    Amazon,
}

impl PlatformFamily {
    /// Every supported family
    pub const ALL: [PlatformFamily; 6] = [
        Self::Ubuntu,
        Self::Debian,
        Self::Redhat,
        Self::Centos,
        Self::Fedora,
        Self::Amazon,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ubuntu => "ubuntu",
            Self::Debian => "debian",
            Self::Redhat => "redhat",
            Self::Centos => "centos",
            Self::Fedora => "fedora",
            Self::Amazon => "amazon",
        }
    }

    /// Families managed with dpkg/apt
    pub fn is_debian_like(&self) -> bool {
        matches!(self, Self::Ubuntu | Self::Debian)
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a family name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported platform family: {0}")]
pub struct UnknownFamily(pub String);

impl FromStr for PlatformFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ubuntu" => Ok(Self::Ubuntu),
            "debian" => Ok(Self::Debian),
            // os-release uses "rhel"
            "redhat" | "rhel" => Ok(Self::Redhat),
            "centos" => Ok(Self::Centos),
            "fedora" => Ok(Self::Fedora),
            // os-release uses "amzn"
            "amazon" | "amzn" => Ok(Self::Amazon),
            other => Err(UnknownFamily(other.to_string())),
        }
    }
}

/// OS family and version of the target host
///
/// Immutable once built; every step resolution reads it and nothing writes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub family: PlatformFamily,
    pub version: String,
}

impl PlatformDescriptor {
    pub fn new(family: PlatformFamily, version: impl Into<String>) -> Self {
        Self {
            family,
            version: version.into(),
        }
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.family)
        } else {
            write!(f, "{} {}", self.family, self.version)
        }
    }
}
