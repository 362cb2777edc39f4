use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::base_name;

/// One item of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub path: PathBuf,
    pub name: String,
    pub directory: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("failed to list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List the immediate children of `dir`, sorted by name.
///
/// Children whose status cannot be read (dangling links, permission
///  problems) are logged and left out rather than failing the listing.
pub async fn list_children(dir: &Path) -> Result<Vec<Entry>, ListError> {
    let io_err = |source| ListError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut read_dir = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut entries = Vec::new();
    while let Some(child) = read_dir.next_entry().await.map_err(io_err)? {
        let path = child.path();
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => entries.push(Entry {
                name: base_name(&path),
                directory: metadata.is_dir(),
                path,
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable child");
            }
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_children() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("photos")).unwrap();
        std::fs::write(temp.path().join("b.txt"), b"b").unwrap();
        std::fs::write(temp.path().join(".hidden"), b"h").unwrap();

        let entries = list_children(temp.path()).await.unwrap();
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.directory))
            .collect();
        assert_eq!(
            summary,
            vec![(".hidden", false), ("b.txt", false), ("photos", true)]
        );
        assert_eq!(entries[2].path, temp.path().join("photos"));
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let err = list_children(&temp.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ListError::Io { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dangling_link_is_omitted() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("real.txt"), b"r").unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("dangling")).unwrap();

        let entries = list_children(temp.path()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "real.txt");
    }
}
