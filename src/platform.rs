//! Host platform detection from `/etc/os-release`

use anyhow::{Context, Result};
use declarative::{PlatformDescriptor, PlatformFamily};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::PlatformOverride;

pub const OS_RELEASE: &str = "/etc/os-release";

/// Parse os-release `KEY=value` lines, unquoting values
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

/// Build a descriptor from parsed os-release fields
///
/// `ID` is tried first, then each word of `ID_LIKE`, so derivatives such as
/// Rocky Linux resolve to the family they track.
pub fn descriptor_from_os_release(fields: &HashMap<String, String>) -> Result<PlatformDescriptor> {
    let id = fields.get("ID").context("os-release has no ID field")?;

    let family = id
        .parse::<PlatformFamily>()
        .ok()
        .or_else(|| {
            fields
                .get("ID_LIKE")?
                .split_whitespace()
                .find_map(|like| like.parse().ok())
        })
        .with_context(|| format!("Unsupported distribution '{id}'"))?;

    let version = fields.get("VERSION_ID").cloned().unwrap_or_default();
    Ok(PlatformDescriptor::new(family, version))
}

/// Detect the platform of the running host
pub fn detect() -> Result<PlatformDescriptor> {
    detect_from(Path::new(OS_RELEASE))
}

pub fn detect_from(path: &Path) -> Result<PlatformDescriptor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    descriptor_from_os_release(&parse_os_release(&content))
}

/// Pick the platform: CLI flags, then config, then detection
///
/// Family and version are merged independently, so a config naming only
/// the family still takes the version from the host. Detection only runs
/// when one of them is still missing.
pub fn resolve(
    family: Option<PlatformFamily>,
    version: Option<&str>,
    configured: &PlatformOverride,
) -> Result<PlatformDescriptor> {
    resolve_with(family, version, configured, detect)
}

pub fn resolve_with(
    family: Option<PlatformFamily>,
    version: Option<&str>,
    configured: &PlatformOverride,
    detect: impl FnOnce() -> Result<PlatformDescriptor>,
) -> Result<PlatformDescriptor> {
    let family = family.or(configured.family);
    let version = version.map(str::to_string).or(configured.version.clone());

    match (family, version) {
        (Some(family), Some(version)) => Ok(PlatformDescriptor::new(family, version)),
        (family, version) => {
            let detected = detect()?;
            log::debug!("Detected platform {detected}");
            Ok(PlatformDescriptor::new(
                family.unwrap_or(detected.family),
                version.unwrap_or(detected.version),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMAZON_2022: &str = r#"NAME="Amazon Linux"
VERSION="2022"
ID="amzn"
ID_LIKE="fedora"
VERSION_ID="2022"
PRETTY_NAME="Amazon Linux 2022"
"#;

    const ROCKY_9: &str = r#"NAME="Rocky Linux"
ID="rocky"
ID_LIKE="rhel centos fedora"
VERSION_ID="9.3"
"#;

    #[test]
    fn test_parse_os_release_unquotes() {
        let fields = parse_os_release(AMAZON_2022);
        assert_eq!(fields["ID"], "amzn");
        assert_eq!(fields["PRETTY_NAME"], "Amazon Linux 2022");
    }

    #[test]
    fn test_amazon_alias() {
        let platform = descriptor_from_os_release(&parse_os_release(AMAZON_2022)).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Amazon, "2022"));
    }

    #[test]
    fn test_id_like_fallback() {
        let platform = descriptor_from_os_release(&parse_os_release(ROCKY_9)).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Redhat, "9.3"));
    }

    #[test]
    fn test_unsupported_distribution() {
        let fields = parse_os_release("ID=arch\n");
        let err = descriptor_from_os_release(&fields).unwrap_err();
        assert!(err.to_string().contains("arch"));
    }

    #[test]
    fn test_detect_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("os-release");
        fs::write(&path, "ID=debian\nVERSION_ID=\"12\"\n").unwrap();
        assert_eq!(
            detect_from(&path).unwrap(),
            PlatformDescriptor::new(PlatformFamily::Debian, "12")
        );
    }

    #[test]
    fn test_full_override_skips_detection() {
        let platform = resolve(
            Some(PlatformFamily::Centos),
            Some("7"),
            &PlatformOverride::default(),
        )
        .unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Centos, "7"));
    }

    #[test]
    fn test_flags_beat_config() {
        let configured = PlatformOverride {
            family: Some(PlatformFamily::Ubuntu),
            version: Some("22.04".into()),
        };
        let platform = resolve(Some(PlatformFamily::Debian), Some("12"), &configured).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Debian, "12"));

        let platform = resolve(None, None, &configured).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Ubuntu, "22.04"));
    }

    fn rocky() -> Result<PlatformDescriptor> {
        Ok(PlatformDescriptor::new(PlatformFamily::Redhat, "9.3"))
    }

    #[test]
    fn test_config_family_only_keeps_detected_version() {
        let configured = PlatformOverride {
            family: Some(PlatformFamily::Centos),
            version: None,
        };
        let platform = resolve_with(None, None, &configured, rocky).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Centos, "9.3"));
    }

    #[test]
    fn test_version_flag_with_config_family() {
        let configured = PlatformOverride {
            family: Some(PlatformFamily::Amazon),
            version: None,
        };
        let platform = resolve_with(None, Some("2022"), &configured, || {
            panic!("detection must not run")
        })
        .unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Amazon, "2022"));
    }

    #[test]
    fn test_nothing_configured_uses_detection() {
        let platform = resolve_with(None, None, &PlatformOverride::default(), rocky).unwrap();
        assert_eq!(platform, PlatformDescriptor::new(PlatformFamily::Redhat, "9.3"));
    }
}
