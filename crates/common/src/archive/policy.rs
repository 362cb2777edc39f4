use std::path::{Path, PathBuf};

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyViolation {
    #[error("path is not absolute: {0}")]
    NotAbsolute(PathBuf),
    #[error("path cannot be resolved: {0}")]
    Unresolvable(PathBuf),
    #[error("path escapes {root}: {path}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Hook deciding whether a path may be read into an archive.
///
/// Consulted for every requested path and every file the walker yields, so
///  a confinement policy also catches symlinks pointing out of bounds.
#[async_trait]
pub trait PathPolicy: Send + Sync {
    async fn check(&self, path: &Path) -> Result<(), PolicyViolation>;
}

/// Trusts every path the caller supplies.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PathPolicy for AllowAll {
    async fn check(&self, _path: &Path) -> Result<(), PolicyViolation> {
        Ok(())
    }
}

/// Only admits paths whose canonical form lies under `root`.
#[derive(Debug, Clone)]
pub struct RootConfined {
    root: PathBuf,
}

impl RootConfined {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PathPolicy for RootConfined {
    async fn check(&self, path: &Path) -> Result<(), PolicyViolation> {
        if !path.is_absolute() {
            return Err(PolicyViolation::NotAbsolute(path.to_path_buf()));
        }

        let root = tokio::fs::canonicalize(&self.root)
            .await
            .map_err(|_| PolicyViolation::Unresolvable(self.root.clone()))?;
        let resolved = tokio::fs::canonicalize(path)
            .await
            .map_err(|_| PolicyViolation::Unresolvable(path.to_path_buf()))?;

        if resolved.starts_with(&root) {
            Ok(())
        } else {
            Err(PolicyViolation::OutsideRoot {
                path: path.to_path_buf(),
                root,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_allow_all_accepts_anything() {
        assert!(AllowAll.check(Path::new("relative/path")).await.is_ok());
        assert!(AllowAll.check(Path::new("/etc/passwd")).await.is_ok());
    }

    #[tokio::test]
    async fn test_root_confined() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(root.join("inside.txt"), b"in").unwrap();
        std::fs::write(temp.path().join("outside.txt"), b"out").unwrap();

        let policy = RootConfined::new(&root);
        assert!(policy.check(&root.join("inside.txt")).await.is_ok());
        assert!(matches!(
            policy.check(&root.join("../outside.txt")).await,
            Err(PolicyViolation::OutsideRoot { .. })
        ));
        assert!(matches!(
            policy.check(Path::new("inside.txt")).await,
            Err(PolicyViolation::NotAbsolute(_))
        ));
        assert!(matches!(
            policy.check(&root.join("missing")).await,
            Err(PolicyViolation::Unresolvable(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_root_confined_sees_through_symlinks() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(temp.path().join("secret.txt"), b"s").unwrap();
        std::os::unix::fs::symlink(temp.path().join("secret.txt"), root.join("link")).unwrap();

        let policy = RootConfined::new(&root);
        assert!(policy.check(&root.join("link")).await.is_err());
    }
}
