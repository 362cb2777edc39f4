use std::path::Path;

/// What a path resolves to once symlinks are followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    /// The status query failed, or the target is neither a regular file
    ///  nor a directory (sockets, fifos, devices).
    Inaccessible,
}

/// Classify a path with a single metadata query.
///
/// Symbolic links are followed, so a link reports its target's type.
///  Failures never propagate: callers treat `Inaccessible` as
///  "skip and record".
pub async fn classify(path: &Path) -> PathKind {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => PathKind::Directory,
        Ok(metadata) if metadata.is_file() => PathKind::File,
        Ok(_) => {
            tracing::debug!(path = %path.display(), "not a regular file or directory");
            PathKind::Inaccessible
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "status query failed");
            PathKind::Inaccessible
        }
    }
}

/// A name is hidden when it starts with a `.`
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Base name of a path as it should appear inside an archive.
///
/// Paths without a final component (`/`, `..`) map to an empty name,
///  which makes a walked directory's children land at the archive root.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
