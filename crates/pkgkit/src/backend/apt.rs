//! Debian/Ubuntu backend using `apt-get` and `dpkg-query`.

use crate::backend::{Backend, run};
use crate::error::{Error, Result};
use crate::types::{InstalledPackage, PackageManager};

/// Backend that executes real `apt-get` commands.
#[derive(Debug, Clone, Default)]
pub struct AptBackend;

impl AptBackend {
    /// Create a new AptBackend.
    pub fn new() -> Self {
        Self
    }
}

/// Parse `dpkg-query -W -f '${Status}\t${Version}'` output.
///
/// Only `install ok installed` counts; removed packages that left
/// configuration behind report `deinstall ok config-files`.
pub(crate) fn parse_dpkg_status(output: &str) -> Option<String> {
    let line = output.lines().next()?;
    let (status, version) = line.split_once('\t')?;
    let installed = status.split_whitespace().last() == Some("installed")
        && !status.starts_with("deinstall");
    (installed && !version.trim().is_empty()).then(|| version.trim().to_string())
}

impl Backend for AptBackend {
    fn manager(&self) -> PackageManager {
        PackageManager::Apt
    }

    fn is_available(&self) -> bool {
        which::which("apt-get").is_ok() && which::which("dpkg-query").is_ok()
    }

    fn query(&self, name: &str) -> Result<Option<InstalledPackage>> {
        let output = run(
            "dpkg-query",
            &["-W", "-f", "${Status}\t${Version}\n", name],
            &[],
        )?;

        // dpkg-query exits 1 for unknown packages
        if !output.status.success() {
            return Ok(None);
        }

        Ok(parse_dpkg_status(&String::from_utf8_lossy(&output.stdout)).map(|version| {
            InstalledPackage {
                name: name.to_string(),
                version,
            }
        }))
    }

    fn install(&self, name: &str) -> Result<()> {
        let output = run(
            "apt-get",
            &["-q", "-y", "install", name],
            &[("DEBIAN_FRONTEND", "noninteractive")],
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_output("apt-get", &stderr, Some(name)));
        }
        Ok(())
    }
}
