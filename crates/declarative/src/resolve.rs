//! Platform-conditional resolution tables
//!
//! A step never branches on the platform itself. It carries a
//! [`ResolutionTable`] for its target and an [`Activation`] for whether it
//! runs at all, and both are pure functions of a [`PlatformDescriptor`].

use crate::platform::{PlatformDescriptor, PlatformFamily};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches a platform by family, or by family and exact version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    Family(PlatformFamily),
    FamilyVersion(PlatformFamily, String),
}

impl Selector {
    pub fn matches(&self, platform: &PlatformDescriptor) -> bool {
        match self {
            Self::Family(family) => *family == platform.family,
            Self::FamilyVersion(family, version) => {
                *family == platform.family && *version == platform.version
            }
        }
    }

    /// Whether this selector also discriminates on version
    pub fn is_versioned(&self) -> bool {
        matches!(self, Self::FamilyVersion(..))
    }
}

impl From<PlatformFamily> for Selector {
    fn from(family: PlatformFamily) -> Self {
        Self::Family(family)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Family(family) => write!(f, "{family}"),
            Self::FamilyVersion(family, version) => write!(f, "{family}:{version}"),
        }
    }
}

/// Ordered platform overrides with an optional default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTable<T> {
    entries: Vec<(Selector, T)>,
    default: Option<T>,
}

impl<T> Default for ResolutionTable<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            default: None,
        }
    }
}

impl<T> ResolutionTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an override for a selector
    pub fn insert(&mut self, selector: Selector, value: T) {
        self.entries.push((selector, value));
    }

    /// Set the value used when no entry matches
    pub fn set_default(&mut self, value: T) {
        self.default = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.default.is_none()
    }

    pub fn entries(&self) -> impl Iterator<Item = &(Selector, T)> {
        self.entries.iter()
    }

    pub fn default_value(&self) -> Option<&T> {
        self.default.as_ref()
    }

    /// Resolve a value for a platform
    ///
    /// A family+version entry wins over a family-only entry. With no match
    /// the declared default is returned, or `None` so the caller can fall
    /// back to the literal it declared.
    pub fn resolve(&self, platform: &PlatformDescriptor) -> Option<&T> {
        self.entries
            .iter()
            .find(|(selector, _)| selector.is_versioned() && selector.matches(platform))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|(selector, _)| !selector.is_versioned() && selector.matches(platform))
            })
            .map(|(_, value)| value)
            .or(self.default.as_ref())
    }
}

/// Whether a step runs on a given platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    Always,
    /// Active only when one of the selectors matches
    Only(Vec<Selector>),
}

impl Activation {
    /// Active on any of the given families
    pub fn families(families: &[PlatformFamily]) -> Self {
        Self::Only(families.iter().copied().map(Selector::Family).collect())
    }

    pub fn is_active(&self, platform: &PlatformDescriptor) -> bool {
        match self {
            Self::Always => true,
            Self::Only(selectors) => selectors.iter().any(|s| s.matches(platform)),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Only(selectors) => {
                let names: Vec<String> = selectors.iter().map(ToString::to_string).collect();
                write!(f, "only on {}", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(family: PlatformFamily, version: &str) -> PlatformDescriptor {
        PlatformDescriptor::new(family, version)
    }

    fn curl_table() -> ResolutionTable<&'static str> {
        let mut table = ResolutionTable::new();
        table.insert(Selector::Family(PlatformFamily::Amazon), "curl");
        table.insert(
            Selector::FamilyVersion(PlatformFamily::Amazon, "2022".into()),
            "curl-minimal",
        );
        table.set_default("curl");
        table
    }

    #[test]
    fn test_versioned_entry_wins_regardless_of_order() {
        let table = curl_table();
        assert_eq!(
            table.resolve(&platform(PlatformFamily::Amazon, "2022")),
            Some(&"curl-minimal")
        );
        assert_eq!(
            table.resolve(&platform(PlatformFamily::Amazon, "2")),
            Some(&"curl")
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_default() {
        let table = curl_table();
        assert_eq!(
            table.resolve(&platform(PlatformFamily::Debian, "12")),
            Some(&"curl")
        );
    }

    #[test]
    fn test_unmatched_without_default_is_none() {
        let mut table = ResolutionTable::new();
        table.insert(Selector::Family(PlatformFamily::Fedora), "nc");
        for family in PlatformFamily::ALL {
            if family == PlatformFamily::Fedora {
                continue;
            }
            assert_eq!(table.resolve(&platform(family, "1")), None);
        }
    }

    #[test]
    fn test_first_family_entry_wins() {
        let mut table = ResolutionTable::new();
        table.insert(Selector::Family(PlatformFamily::Centos), "first");
        table.insert(Selector::Family(PlatformFamily::Centos), "second");
        assert_eq!(
            table.resolve(&platform(PlatformFamily::Centos, "7")),
            Some(&"first")
        );
    }

    #[test]
    fn test_activation() {
        let only_redhat = Activation::families(&[PlatformFamily::Redhat]);
        assert!(only_redhat.is_active(&platform(PlatformFamily::Redhat, "9")));
        for family in PlatformFamily::ALL {
            if family != PlatformFamily::Redhat {
                assert!(!only_redhat.is_active(&platform(family, "9")));
            }
        }
        assert!(Activation::Always.is_active(&platform(PlatformFamily::Ubuntu, "22.04")));
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::Family(PlatformFamily::Amazon).to_string(), "amazon");
        assert_eq!(
            Selector::FamilyVersion(PlatformFamily::Amazon, "2022".into()).to_string(),
            "amazon:2022"
        );
        assert_eq!(
            Activation::families(&[PlatformFamily::Centos, PlatformFamily::Redhat]).to_string(),
            "only on centos, redhat"
        );
    }
}
