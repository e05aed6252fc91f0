//! Artifact bundle: the directory file steps copy from
//!
//! Artifacts are addressed by logical name, a path relative to the bundle
//! root such as `clang-bpf` or `btf/minimized-btfs.tar.xz`.

use anyhow::{Context, Result, bail};
use blake3::Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path of an artifact; it must exist and be a regular file
    pub fn resolve(&self, source: &str) -> Result<PathBuf> {
        let relative = Path::new(source);
        if source.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            bail!("invalid artifact name '{source}'");
        }

        let path = self.root.join(relative);
        if !path.is_file() {
            bail!(
                "artifact '{}' not found in bundle {}",
                source,
                self.root.display()
            );
        }
        Ok(path)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.resolve(source).is_ok()
    }

    /// BLAKE3 digest of an artifact
    pub fn digest(&self, source: &str) -> Result<String> {
        hash_file(&self.resolve(source)?)
    }

    /// Every artifact name in the bundle, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry
                .with_context(|| format!("Failed to walk bundle {}", self.root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .with_context(|| format!("Failed to strip prefix from {}", entry.path().display()))?;
            names.push(relative.to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Sources not present in the bundle, in the order given
    pub fn missing<'a>(&self, sources: &[&'a str]) -> Vec<&'a str> {
        sources
            .iter()
            .copied()
            .filter(|source| !self.contains(source))
            .collect()
    }
}

/// Stream a file through BLAKE3
pub fn hash_file(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bundle() -> (TempDir, Bundle) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("gotestsum"), b"binary").unwrap();
        fs::create_dir(dir.path().join("btf")).unwrap();
        fs::write(dir.path().join("btf/minimized-btfs.tar.xz"), b"xz").unwrap();
        let bundle = Bundle::new(dir.path());
        (dir, bundle)
    }

    #[test]
    fn test_resolve_nested_artifact() {
        let (dir, bundle) = bundle();
        assert_eq!(
            bundle.resolve("btf/minimized-btfs.tar.xz").unwrap(),
            dir.path().join("btf/minimized-btfs.tar.xz")
        );
    }

    #[test]
    fn test_rejects_escaping_names() {
        let (_dir, bundle) = bundle();
        assert!(bundle.resolve("../etc/passwd").is_err());
        assert!(bundle.resolve("/etc/passwd").is_err());
        assert!(bundle.resolve("").is_err());
    }

    #[test]
    fn test_directory_is_not_an_artifact() {
        let (_dir, bundle) = bundle();
        assert!(!bundle.contains("btf"));
    }

    #[test]
    fn test_digest_matches_blake3() {
        let (_dir, bundle) = bundle();
        let expected = blake3::hash(b"binary").to_hex().to_string();
        assert_eq!(bundle.digest("gotestsum").unwrap(), expected);
    }

    #[test]
    fn test_list_and_missing() {
        let (_dir, bundle) = bundle();
        assert_eq!(
            bundle.list().unwrap(),
            vec!["btf/minimized-btfs.tar.xz", "gotestsum"]
        );
        assert_eq!(
            bundle.missing(&["gotestsum", "test2json", "tags.txt"]),
            vec!["test2json", "tags.txt"]
        );
    }
}
