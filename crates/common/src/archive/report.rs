use std::fmt;
use std::path::{Path, PathBuf};

/// Why a path did not make it into the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Status query failed or the path is not a file/directory.
    Inaccessible,
    /// Hidden entry filtered by the active hidden policy.
    Hidden,
    /// Directory children could not be listed.
    ListFailed(String),
    /// Source file could not be opened.
    OpenFailed(String),
    /// Source file opened but could not be read. No entry was written.
    ReadFailed(String),
    /// Directory resolves to one of its own ancestors.
    Cycle,
    /// Directory sits deeper than the configured maximum.
    DepthExceeded,
    /// The path validation hook refused the path.
    Rejected(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Inaccessible => write!(f, "inaccessible"),
            SkipReason::Hidden => write!(f, "hidden"),
            SkipReason::ListFailed(e) => write!(f, "listing failed: {}", e),
            SkipReason::OpenFailed(e) => write!(f, "open failed: {}", e),
            SkipReason::ReadFailed(e) => write!(f, "read failed: {}", e),
            SkipReason::Cycle => write!(f, "symlink cycle"),
            SkipReason::DepthExceeded => write!(f, "maximum depth exceeded"),
            SkipReason::Rejected(e) => write!(f, "rejected: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

impl Skipped {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Summary of one archive run. Nothing in here is written into the
///  archive itself; it only feeds logging.
#[derive(Debug, Default, Clone)]
pub struct ArchiveReport {
    pub entries: Vec<String>,
    pub bytes_read: u64,
    pub skipped: Vec<Skipped>,
}

impl ArchiveReport {
    pub(crate) fn record_entry(&mut self, name: &str, bytes: u64) {
        self.entries.push(name.to_string());
        self.bytes_read += bytes;
    }

    pub(crate) fn record_skip(&mut self, path: &Path, reason: SkipReason) {
        self.skipped.push(Skipped::new(path, reason));
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}
