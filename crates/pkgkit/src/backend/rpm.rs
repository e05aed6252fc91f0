//! RPM-based backend using `dnf` or `yum` for installs and `rpm` for queries.

use crate::backend::{Backend, run};
use crate::error::{Error, Result};
use crate::types::{InstalledPackage, PackageManager};

const QUERY_FORMAT: &str = "%{VERSION}-%{RELEASE}\n";

/// Backend that executes real `dnf`/`yum` and `rpm` commands.
#[derive(Debug, Clone)]
pub struct RpmBackend {
    manager: PackageManager,
}

impl RpmBackend {
    /// Create a backend for `dnf` or `yum`.
    ///
    /// Returns an error for non-rpm managers.
    pub fn new(manager: PackageManager) -> Result<Self> {
        if !manager.is_rpm() {
            return Err(Error::ManagerNotFound(format!("{manager} is not rpm-based")));
        }
        Ok(Self { manager })
    }

    fn rpm_query(&self, args: &[&str]) -> Result<Option<String>> {
        let output = run("rpm", args, &[])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string))
    }
}

impl Backend for RpmBackend {
    fn manager(&self) -> PackageManager {
        self.manager
    }

    fn is_available(&self) -> bool {
        which::which(self.manager.binary()).is_ok() && which::which("rpm").is_ok()
    }

    fn query(&self, name: &str) -> Result<Option<InstalledPackage>> {
        // Names like `nc` are often only a capability of another package
        let version = match self.rpm_query(&["-q", "--qf", QUERY_FORMAT, name])? {
            Some(version) => Some(version),
            None => self.rpm_query(&["-q", "--whatprovides", "--qf", QUERY_FORMAT, name])?,
        };

        Ok(version.map(|version| InstalledPackage {
            name: name.to_string(),
            version,
        }))
    }

    fn install(&self, name: &str) -> Result<()> {
        let binary = self.manager.binary();
        let output = run(binary, &["-y", "install", name], &[])?;

        if !output.status.success() {
            // yum reports "No package X available" on stdout
            let combined = format!(
                "{}\n{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            return Err(Error::from_output(binary, &combined, Some(name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_apt() {
        assert!(RpmBackend::new(PackageManager::Apt).is_err());
        assert_eq!(
            RpmBackend::new(PackageManager::Dnf).unwrap().manager(),
            PackageManager::Dnf
        );
    }
}
