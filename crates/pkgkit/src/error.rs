//! Error types for package manager operations.
//!
//! Errors are categorized from the package manager's own output so callers
//! can give the user a description and actionable advice.

use thiserror::Error;

/// Categories of package manager errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Package not found in any configured repository
    NotFound,
    /// Package database locked by another process
    Locked,
    /// Network-related errors while fetching metadata or packages
    Network,
    /// Permission denied (not running as root)
    Permission,
    /// No supported package manager on this host
    ManagerNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Package not found",
            Self::Locked => "Package database locked",
            Self::Network => "Network connectivity issue",
            Self::Permission => "Permission denied",
            Self::ManagerNotFound => "No package manager",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Check the package name for this distribution or refresh the package index",
            Self::Locked => "Wait for the other package manager process to finish",
            Self::Network => "Check the host's network and repository mirrors",
            Self::Permission => "Run as root",
            Self::ManagerNotFound => "Install apt, dnf or yum, or pick the platform explicitly",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during package manager operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Package not found in any configured repository
    #[error("package not found: {name}")]
    NotFound {
        /// Name of the package that could not be found
        name: String,
    },

    /// Another process holds the package database lock
    #[error("package database locked: {message}")]
    Locked {
        /// Output of the failed command
        message: String,
    },

    /// Network-related error (mirror unreachable, DNS, timeout)
    #[error("network error: {message}")]
    Network {
        /// Output of the failed command
        message: String,
    },

    /// Permission denied
    #[error("permission denied: {message}")]
    Permission {
        /// Output of the failed command
        message: String,
    },

    /// None of apt-get, dnf or yum is installed
    #[error("no supported package manager found (looked for {0})")]
    ManagerNotFound(String),

    /// Command execution failed
    #[error("{message}: {stderr}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Locked { .. } => ErrorCategory::Locked,
            Error::Network { .. } => ErrorCategory::Network,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::ManagerNotFound(_) => ErrorCategory::ManagerNotFound,
            _ => ErrorCategory::Other,
        }
    }

    /// Create an error from package manager output.
    ///
    /// Analyzes stderr (and stdout, where yum prints its errors) to
    /// categorize the error appropriately.
    pub fn from_output(manager: &str, output: &str, package_name: Option<&str>) -> Self {
        let lower = output.to_lowercase();

        // apt reports a missing privilege as a lock failure too
        if lower.contains("permission denied")
            || lower.contains("are you root")
            || lower.contains("you need to be root")
            || lower.contains("operation not permitted")
        {
            return Error::Permission {
                message: output.trim().to_string(),
            };
        }

        if lower.contains("could not get lock")
            || lower.contains("unable to acquire the dpkg frontend lock")
            || lower.contains("another app is currently holding the yum lock")
            || lower.contains("waiting for process with pid")
        {
            return Error::Locked {
                message: output.trim().to_string(),
            };
        }

        if lower.contains("unable to locate package")
            || lower.contains("has no installation candidate")
            || (lower.contains("no package") && lower.contains("available"))
            || lower.contains("no match for argument")
            || lower.contains("unable to find a match")
        {
            return Error::NotFound {
                name: package_name.unwrap_or("unknown").to_string(),
            };
        }

        if lower.contains("could not resolve")
            || lower.contains("temporary failure resolving")
            || lower.contains("failed to download")
            || lower.contains("cannot download")
            || lower.contains("failed to fetch")
            || lower.contains("timed out")
            || lower.contains("curl error")
        {
            return Error::Network {
                message: output.trim().to_string(),
            };
        }

        Error::CommandFailed {
            message: format!(
                "{manager} failed{}",
                package_name
                    .map(|n| format!(" for {n}"))
                    .unwrap_or_default()
            ),
            stderr: output.trim().to_string(),
        }
    }
}

/// Result type for package manager operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_output_apt_not_found() {
        let err = Error::from_output("apt-get", "E: Unable to locate package nmap-ncat", Some("nmap-ncat"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "package not found: nmap-ncat");
    }

    #[test]
    fn test_from_output_dnf_not_found() {
        let err = Error::from_output(
            "dnf",
            "No match for argument: kernel-devel-5.10.0\nError: Unable to find a match",
            Some("kernel-devel-5.10.0"),
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_from_output_yum_not_found() {
        let err = Error::from_output("yum", "No package curl-minimal available.", Some("curl-minimal"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_from_output_locked() {
        let err = Error::from_output(
            "apt-get",
            "E: Could not get lock /var/lib/dpkg/lock-frontend",
            Some("socat"),
        );
        assert_eq!(err.category(), ErrorCategory::Locked);
    }

    #[test]
    fn test_from_output_network() {
        let err = Error::from_output(
            "apt-get",
            "Temporary failure resolving 'archive.ubuntu.com'",
            Some("wget"),
        );
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_from_output_permission() {
        let err = Error::from_output(
            "apt-get",
            "E: Could not open lock file /var/lib/dpkg/lock-frontend - open (13: Permission denied)\n\
             E: Unable to acquire the dpkg frontend lock (/var/lib/dpkg/lock-frontend), are you root?",
            Some("wget"),
        );
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert_eq!(err.category().advice(), "Run as root");
    }

    #[test]
    fn test_from_output_fallback() {
        let err = Error::from_output("dnf", "something odd", Some("socat"));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.to_string(), "dnf failed for socat: something odd");
    }

    #[test]
    fn test_category_advice() {
        assert_eq!(ErrorCategory::Permission.advice(), "Run as root");
        assert_eq!(ErrorCategory::Locked.description(), "Package database locked");
    }
}
