//! # pkgkit
//!
//! Pure Rust library for Linux distribution package management.
//!
//! This crate provides functionality for:
//! - Driving the host's package manager (apt, dnf, yum)
//! - Querying whether a package is installed, and at which version
//! - Installing packages non-interactively
//! - Categorizing package manager failures from their output
//!
//! ## Example
//!
//! ```no_run
//! use pkgkit::{Client, PackageManager};
//!
//! let client = Client::new(PackageManager::Dnf).expect("rpm-based manager");
//! if client.installed_version("socat").unwrap().is_none() {
//!     client.install("socat").expect("install failed");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{InstalledPackage, PackageManager};

use backend::{Backend, apt::AptBackend, rpm::RpmBackend};

/// High-level client for package operations.
///
/// The client wraps a backend and provides convenient methods for
/// querying and installing packages.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a client for a specific package manager.
    pub fn new(manager: PackageManager) -> Result<Self> {
        let backend: Box<dyn Backend> = match manager {
            PackageManager::Apt => Box::new(AptBackend::new()),
            PackageManager::Dnf | PackageManager::Yum => Box::new(RpmBackend::new(manager)?),
        };
        Ok(Self { backend })
    }

    /// Create a client with a custom backend.
    ///
    /// Useful for testing with mock backends.
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Which package manager this client drives.
    pub fn manager(&self) -> PackageManager {
        self.backend.manager()
    }

    /// Whether the manager's executables are in PATH.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Installed version of a package, `None` when not installed.
    pub fn installed_version(&self, name: &str) -> Result<Option<String>> {
        Ok(self.backend.query(name)?.map(|p| p.version))
    }

    /// Install a package.
    pub fn install(&self, name: &str) -> Result<()> {
        log::info!("Installing {} with {}", name, self.manager());
        self.backend.install(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockBackend {
        installed: Mutex<HashMap<String, String>>,
    }

    impl Backend for MockBackend {
        fn manager(&self) -> PackageManager {
            PackageManager::Dnf
        }

        fn is_available(&self) -> bool {
            true
        }

        fn query(&self, name: &str) -> Result<Option<InstalledPackage>> {
            let installed = self.installed.lock().unwrap();
            Ok(installed.get(name).map(|v| InstalledPackage {
                name: name.to_string(),
                version: v.clone(),
            }))
        }

        fn install(&self, name: &str) -> Result<()> {
            if name == "missing" {
                return Err(Error::NotFound {
                    name: name.to_string(),
                });
            }
            self.installed
                .lock()
                .unwrap()
                .insert(name.to_string(), "1.0-1".to_string());
            Ok(())
        }
    }

    fn client() -> Client {
        Client::with_backend(Box::new(MockBackend {
            installed: Mutex::new(HashMap::new()),
        }))
    }

    #[test]
    fn test_install_then_query() {
        let client = client();
        assert_eq!(client.installed_version("socat").unwrap(), None);
        client.install("socat").unwrap();
        assert_eq!(
            client.installed_version("socat").unwrap(),
            Some("1.0-1".to_string())
        );
    }

    #[test]
    fn test_install_error_category() {
        let err = client().install("missing").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_new_selects_backend() {
        assert_eq!(Client::new(PackageManager::Yum).unwrap().manager(), PackageManager::Yum);
        assert_eq!(Client::new(PackageManager::Apt).unwrap().manager(), PackageManager::Apt);
    }
}
