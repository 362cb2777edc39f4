//! Streaming zip archives of files and directory trees.
//!
//! [`build_archive`] ties the pieces together: every requested path is
//!  checked against a [`PathPolicy`], classified, and either added directly
//!  or expanded by a [`TreeWalker`]. Entries go straight into an
//!  [`ArchiveWriter`] bound to the caller's sink, so memory use does not
//!  grow with the size of the tree.

mod classify;
mod policy;
mod report;
mod request;
mod walk;
mod writer;

use std::path::Path;

use tokio::io::AsyncWrite;

pub use classify::{base_name, classify, is_hidden, PathKind};
pub use policy::{AllowAll, PathPolicy, PolicyViolation, RootConfined};
pub use report::{ArchiveReport, SkipReason, Skipped};
pub use request::{ArchiveRequest, RequestError, FILE_PATHS_FIELD};
pub use walk::{join_name, HiddenPolicy, TreeWalker, WalkEntry, WalkOptions, DEFAULT_MAX_DEPTH};
pub use writer::{ArchiveError, ArchiveWriter, CompressionLevel, EntryError};

/// Knobs shared by every archive a server builds.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveOptions {
    pub hidden: HiddenPolicy,
    pub max_depth: usize,
    pub level: CompressionLevel,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self::new(HiddenPolicy::default(), DEFAULT_MAX_DEPTH)
    }
}

impl ArchiveOptions {
    pub fn new(hidden: HiddenPolicy, max_depth: usize) -> Self {
        Self {
            hidden,
            max_depth,
            level: CompressionLevel::default(),
        }
    }

    pub fn walk(&self) -> WalkOptions {
        WalkOptions {
            hidden: self.hidden,
            max_depth: self.max_depth,
        }
    }
}

/// Archive every path in `request` into `sink`.
///
/// Requested files land under their base name; requested directories land
///  under `<base name>/...`. Per-path problems are logged and collected in the
///  returned report. Only a failing sink, or a file that fails after its
///  entry was started, ends the run early; nothing further is read from disk.
pub async fn build_archive<W>(
    request: &ArchiveRequest,
    sink: W,
    options: ArchiveOptions,
    policy: &dyn PathPolicy,
) -> Result<ArchiveReport, ArchiveError>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = ArchiveWriter::open(sink, options.level);
    let mut report = ArchiveReport::default();

    for path in request.paths() {
        if let Err(e) = policy.check(path).await {
            tracing::warn!(path = %path.display(), error = %e, "requested path rejected");
            report.record_skip(path, SkipReason::Rejected(e.to_string()));
            continue;
        }

        match classify(path).await {
            PathKind::File if options.hidden.skips_file(&base_name(path)) => {
                tracing::debug!(path = %path.display(), "skipping hidden file");
                report.record_skip(path, SkipReason::Hidden);
            }
            PathKind::File => {
                add_entry(&mut writer, &mut report, path, &base_name(path)).await?;
            }
            PathKind::Directory => {
                let mut walker = TreeWalker::new(path, base_name(path), options.walk());
                while let Some(entry) = walker.next().await {
                    if let Err(e) = policy.check(&entry.source).await {
                        tracing::warn!(
                            path = %entry.source.display(),
                            error = %e,
                            "walked path rejected"
                        );
                        report.record_skip(&entry.source, SkipReason::Rejected(e.to_string()));
                        continue;
                    }
                    add_entry(&mut writer, &mut report, &entry.source, &entry.name).await?;
                }
                report.skipped.extend(walker.into_skipped());
            }
            PathKind::Inaccessible => {
                tracing::warn!(path = %path.display(), "skipping inaccessible path");
                report.record_skip(path, SkipReason::Inaccessible);
            }
        }
    }

    writer.finalize().await?;
    Ok(report)
}

async fn add_entry<W>(
    writer: &mut ArchiveWriter<W>,
    report: &mut ArchiveReport,
    source: &Path,
    name: &str,
) -> Result<(), ArchiveError>
where
    W: AsyncWrite + Unpin,
{
    match writer.add_file(source, name).await {
        Ok(bytes) => {
            report.record_entry(name, bytes);
            Ok(())
        }
        Err(EntryError::Inaccessible { path, source }) => {
            tracing::warn!(path = %path.display(), error = %source, "cannot open file");
            report.record_skip(&path, SkipReason::OpenFailed(source.to_string()));
            Ok(())
        }
        Err(EntryError::ReadFailed { path, source }) => {
            tracing::warn!(path = %path.display(), error = %source, "cannot read file");
            report.record_skip(&path, SkipReason::ReadFailed(source.to_string()));
            Ok(())
        }
        Err(EntryError::Truncated { path, bytes, source }) => {
            tracing::warn!(
                path = %path.display(),
                bytes,
                error = %source,
                "file failed mid-entry, stopping"
            );
            Err(ArchiveError::SourceTruncated { path, source })
        }
        Err(EntryError::WriteFailed(e)) => {
            tracing::warn!(error = %e, "archive sink failed, stopping");
            Err(ArchiveError::WriteFailed(e))
        }
    }
}
