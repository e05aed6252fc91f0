//! Core types for Linux package management.

use std::fmt;

/// A distribution package manager front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Debian/Ubuntu `apt-get` with `dpkg-query` for queries
    Apt,
    /// Fedora, RHEL 8+, Amazon Linux 2022+ `dnf` with `rpm` for queries
    Dnf,
    /// Older RHEL/CentOS and Amazon Linux 2 `yum` with `rpm` for queries
    Yum,
}

impl PackageManager {
    /// Executable used to install packages.
    pub fn binary(&self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
        }
    }

    /// Whether packages are rpm-based.
    pub fn is_rpm(&self) -> bool {
        matches!(self, Self::Dnf | Self::Yum)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// A package found in the installed package database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Package name as queried
    pub name: String,
    /// Installed version (`version-release` for rpm)
    pub version: String,
}
