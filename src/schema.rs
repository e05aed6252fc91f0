//! TOML plan files
//!
//! A plan file lists steps in the order they run:
//!
//! ```toml
//! [[step]]
//! name = "kernel headers"
//! type = "package"
//!
//! [[step.when]]
//! family = "centos"
//! target = "kernel-devel-{{kernel_release}}"
//!
//! [[step]]
//! name = "/go/bin/gotestsum"
//! type = "file"
//! source = "gotestsum"
//! mode = "0744"
//! ```

use anyhow::{Context, Result, bail};
use declarative::{Activation, ExecutionPlan, PlatformFamily, Selector, Step};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    #[serde(default, rename = "step")]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepType {
    Command,
    Package,
    Directory,
    File,
    KernelModule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    pub name: String,

    #[serde(rename = "type")]
    pub step_type: StepType,

    /// Literal target, defaults to the name
    #[serde(default)]
    pub target: Option<String>,

    /// Target when no `when` entry matches
    #[serde(default)]
    pub default: Option<String>,

    #[serde(default)]
    pub when: Vec<WhenSpec>,

    /// `family` or `family:version` selectors; empty means always
    #[serde(default)]
    pub only_on: Vec<String>,

    #[serde(default)]
    pub ignore_failure: bool,

    /// Command steps only
    #[serde(default)]
    pub user: Option<String>,

    /// Directory steps only
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Octal permission bits, e.g. "0744"
    #[serde(default)]
    pub mode: Option<String>,

    /// File steps only; defaults to the target's file name
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhenSpec {
    pub family: PlatformFamily,
    #[serde(default)]
    pub version: Option<String>,
    pub target: String,
}

fn default_true() -> bool {
    true
}

/// Values substituted for `{{name}}` in plan strings
pub struct Placeholders {
    pattern: Regex,
    values: HashMap<&'static str, String>,
}

impl Placeholders {
    pub fn new(kernel_release: &str) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")?,
            values: HashMap::from([("kernel_release", kernel_release.to_string())]),
        })
    }

    /// Replace every placeholder; an unknown name is an error
    pub fn substitute(&self, input: &str) -> Result<String> {
        if let Some(unknown) = self
            .pattern
            .captures_iter(input)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .find(|name| !self.values.contains_key(*name))
        {
            bail!("unknown placeholder '{{{{{unknown}}}}}' in '{input}'");
        }

        Ok(self
            .pattern
            .replace_all(input, |caps: &regex::Captures<'_>| {
                self.values
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned())
    }
}

/// Parse a `family` or `family:version` selector
pub fn parse_selector(s: &str) -> Result<Selector> {
    match s.split_once(':') {
        Some((family, version)) if !version.trim().is_empty() => Ok(Selector::FamilyVersion(
            family.parse()?,
            version.trim().to_string(),
        )),
        Some(_) => bail!("selector '{s}' has an empty version"),
        None => Ok(Selector::Family(s.parse()?)),
    }
}

/// Parse octal permission bits, with or without a `0o` prefix
pub fn parse_mode(s: &str) -> Result<u32> {
    let digits = s.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).with_context(|| format!("invalid mode '{s}'"))?;
    if mode > 0o7777 {
        bail!("mode '{s}' is out of range");
    }
    Ok(mode)
}

impl StepSpec {
    pub fn to_step(&self, placeholders: &Placeholders) -> Result<Step> {
        let target = placeholders.substitute(self.target.as_deref().unwrap_or(&self.name))?;

        let mut step = match self.step_type {
            StepType::Command => Step::command(target),
            StepType::Package => Step::package(target),
            StepType::Directory => Step::directory(target),
            StepType::File => {
                let source = match &self.source {
                    Some(source) => placeholders.substitute(source)?,
                    None => Path::new(&target)
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .with_context(|| format!("cannot derive a source from '{target}'"))?,
                };
                Step::file(target, source)
            }
            StepType::KernelModule => Step::kernel_module(target),
        }
        .named(&self.name);

        for when in &self.when {
            let value = placeholders.substitute(&when.target)?;
            step = match &when.version {
                Some(version) => step.on_version(when.family, version, value),
                None => step.on(when.family, value),
            };
        }
        if let Some(default) = &self.default {
            step = step.otherwise(placeholders.substitute(default)?);
        }

        if !self.only_on.is_empty() {
            let selectors = self
                .only_on
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?;
            step = step.with_activation(Activation::Only(selectors));
        }

        if self.ignore_failure {
            step = step.ignore_failure();
        }

        if let Some(user) = &self.user {
            if self.step_type != StepType::Command {
                bail!("'user' only applies to command steps");
            }
            step = step.run_as(user);
        }

        if !self.recursive {
            if self.step_type != StepType::Directory {
                bail!("'recursive' only applies to directory steps");
            }
            step = step.non_recursive();
        }

        if let Some(mode) = &self.mode {
            if !matches!(self.step_type, StepType::Directory | StepType::File) {
                bail!("'mode' only applies to directory and file steps");
            }
            step = step.mode(parse_mode(mode)?);
        }

        if self.source.is_some() && self.step_type != StepType::File {
            bail!("'source' only applies to file steps");
        }

        Ok(step)
    }
}

impl PlanFile {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in plan file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read plan file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn to_plan(&self, placeholders: &Placeholders) -> Result<ExecutionPlan> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                spec.to_step(placeholders)
                    .with_context(|| format!("step {} '{}'", index + 1, spec.name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{FailurePolicy, PlatformDescriptor, StepKind};

    const RELEASE: &str = "6.1.0-18-amd64";

    fn load(toml: &str) -> Result<ExecutionPlan> {
        PlanFile::parse(toml)?.to_plan(&Placeholders::new(RELEASE)?)
    }

    #[test]
    fn test_kernel_release_placeholder() {
        let plan = load(
            r#"
[[step]]
name = "kernel headers"
type = "package"

[[step.when]]
family = "debian"
target = "linux-headers-{{ kernel_release }}"
"#,
        )
        .unwrap();

        let step = &plan.steps()[0];
        let debian = PlatformDescriptor::new(PlatformFamily::Debian, "12");
        assert_eq!(step.resolve_target(&debian), "linux-headers-6.1.0-18-amd64");
    }

    #[test]
    fn test_unknown_placeholder_is_an_error() {
        let err = load(
            r#"
[[step]]
name = "uname {{arch}}"
type = "command"
"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("arch"));
    }

    #[test]
    fn test_versioned_when_and_default() {
        let plan = load(
            r#"
[[step]]
name = "curl"
type = "package"
default = "curl"

[[step.when]]
family = "amazon"
version = "2022"
target = "curl-minimal"
"#,
        )
        .unwrap();

        let step = &plan.steps()[0];
        let amazon = |v: &str| PlatformDescriptor::new(PlatformFamily::Amazon, v);
        assert_eq!(step.resolve_target(&amazon("2022")), "curl-minimal");
        assert_eq!(step.resolve_target(&amazon("2")), "curl");
    }

    #[test]
    fn test_command_options() {
        let plan = load(
            r#"
[[step]]
name = "disable firewalld"
type = "command"
target = "systemctl disable --now firewalld"
user = "root"
ignore_failure = true
only_on = ["redhat", "centos:7"]
"#,
        )
        .unwrap();

        let step = &plan.steps()[0];
        assert_eq!(step.name, "disable firewalld");
        assert_eq!(step.target, "systemctl disable --now firewalld");
        assert_eq!(step.failure, FailurePolicy::IgnoreAndContinue);
        assert_eq!(
            step.kind,
            StepKind::RunCommand {
                user: Some("root".into())
            }
        );
        assert_eq!(
            step.activation,
            Activation::Only(vec![
                Selector::Family(PlatformFamily::Redhat),
                Selector::FamilyVersion(PlatformFamily::Centos, "7".into()),
            ])
        );
    }

    #[test]
    fn test_file_source_defaults_to_file_name() {
        let plan = load(
            r#"
[[step]]
name = "/go/bin/gotestsum"
type = "file"
mode = "0744"
"#,
        )
        .unwrap();

        assert_eq!(
            plan.steps()[0].kind,
            StepKind::PlaceFile {
                source: "gotestsum".into(),
                mode: Some(0o744)
            }
        );
    }

    #[test]
    fn test_options_on_wrong_kind_are_rejected() {
        let err = load(
            r#"
[[step]]
name = "socat"
type = "package"
mode = "0644"
"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("mode"));

        assert!(
            load("[[step]]\nname = \"/tmp/x\"\ntype = \"directory\"\nuser = \"root\"\n").is_err()
        );
    }

    #[test]
    fn test_unknown_field_and_type_rejected() {
        assert!(load("[[step]]\nname = \"x\"\ntype = \"package\"\ncolour = 1\n").is_err());
        assert!(load("[[step]]\nname = \"x\"\ntype = \"service\"\n").is_err());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("0744").unwrap(), 0o744);
        assert_eq!(parse_mode("0o444").unwrap(), 0o444);
        assert_eq!(parse_mode("755").unwrap(), 0o755);
        assert!(parse_mode("0999").is_err());
        assert!(parse_mode("17777").is_err());
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            parse_selector("amzn:2022").unwrap(),
            Selector::FamilyVersion(PlatformFamily::Amazon, "2022".into())
        );
        assert!(parse_selector("arch").is_err());
        assert!(parse_selector("centos:").is_err());
    }

    #[test]
    fn test_empty_file_is_empty_plan() {
        assert!(load("").unwrap().is_empty());
    }
}
