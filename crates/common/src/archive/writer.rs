use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, DeflateOption, ZipEntryBuilder};
use futures::AsyncWriteExt as _;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the chunks moved from a source file into the archive.
const CHUNK_SIZE: usize = 64 * 1024;

/// Deflate effort used for every entry in an archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionLevel {
    Fast,
    Normal,
    #[default]
    Maximum,
}

impl From<CompressionLevel> for DeflateOption {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Fast => DeflateOption::Fast,
            CompressionLevel::Normal => DeflateOption::Normal,
            CompressionLevel::Maximum => DeflateOption::Maximum,
        }
    }
}

/// Failure while adding a single entry.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    /// The source could not be opened. Nothing was written.
    #[error("cannot open {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source opened but its first read failed. No entry was created.
    #[error("failed reading {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The source failed after part of it was already compressed into the
    ///  stream. Those bytes cannot be recalled, so the archive is abandoned.
    #[error("{path} failed after {bytes} bytes: {source}")]
    Truncated {
        path: PathBuf,
        bytes: u64,
        #[source]
        source: io::Error,
    },
    /// The sink rejected a write. The archive is unusable from here on.
    #[error("archive stream write failed: {0}")]
    WriteFailed(#[source] io::Error),
}

impl EntryError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, EntryError::Truncated { .. } | EntryError::WriteFailed(_))
    }
}

/// Failure that ends the whole archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive stream write failed: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("{path} failed mid-entry: {source}")]
    SourceTruncated {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("archive stream was aborted by an earlier failure")]
    Aborted,
}

/// A zip stream bound to a single output sink.
///
/// Entries are compressed and pushed to the sink as they are added; nothing
///  is buffered beyond one chunk. An entry is only started once the first
///  chunk of its source has been read. Once a write to the sink fails, or a
///  source fails after its entry was started, the writer is poisoned and
///  refuses further work. A disconnected client stops the producer this way.
pub struct ArchiveWriter<W>
where
    W: AsyncWrite + Unpin,
{
    zip: ZipFileWriter<W>,
    level: CompressionLevel,
    poisoned: bool,
    names: HashSet<String>,
    buffer: Box<[u8]>,
}

impl<W> ArchiveWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn open(sink: W, level: CompressionLevel) -> Self {
        Self {
            zip: ZipFileWriter::with_tokio(sink),
            level,
            poisoned: false,
            names: HashSet::new(),
            buffer: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Stream the file at `source` into a new entry called `name`.
    ///
    /// Returns the number of bytes read from the source.
    pub async fn add_file(&mut self, source: &Path, name: &str) -> Result<u64, EntryError> {
        if self.poisoned {
            return Err(EntryError::WriteFailed(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "archive stream already failed",
            )));
        }

        let mut file = tokio::fs::File::open(source)
            .await
            .map_err(|e| EntryError::Inaccessible {
                path: source.to_path_buf(),
                source: e,
            })?;

        self.add_reader(&mut file, source, name).await
    }

    async fn add_reader<R>(
        &mut self,
        reader: &mut R,
        source: &Path,
        name: &str,
    ) -> Result<u64, EntryError>
    where
        R: AsyncRead + Unpin,
    {
        let builder = ZipEntryBuilder::new(name.to_string().into(), Compression::Deflate)
            .deflate_option(self.level.into());

        let result = stream_entry(&mut self.zip, builder, reader, &mut self.buffer).await;
        match result {
            Ok(bytes) => {
                if !self.names.insert(name.to_string()) {
                    tracing::warn!(name, path = %source.display(), "duplicate entry name in archive");
                }
                tracing::debug!(name, bytes, "added archive entry");
                Ok(bytes)
            }
            Err(StreamError::Unreadable(e)) => Err(EntryError::ReadFailed {
                path: source.to_path_buf(),
                source: e,
            }),
            Err(StreamError::Truncated { source: e, bytes }) => {
                self.poisoned = true;
                Err(EntryError::Truncated {
                    path: source.to_path_buf(),
                    bytes,
                    source: e,
                })
            }
            Err(StreamError::Write(e)) => {
                self.poisoned = true;
                Err(EntryError::WriteFailed(e))
            }
        }
    }

    /// Write the central directory and close the sink, handing it back.
    pub async fn finalize(self) -> Result<W, ArchiveError> {
        if self.poisoned {
            return Err(ArchiveError::Aborted);
        }

        let mut sink = self
            .zip
            .close()
            .await
            .map_err(|e| ArchiveError::WriteFailed(io::Error::other(e)))?
            .into_inner();
        sink.shutdown().await.map_err(ArchiveError::WriteFailed)?;
        Ok(sink)
    }
}

enum StreamError {
    /// Nothing reached the archive.
    Unreadable(io::Error),
    /// An entry was started and is now incomplete.
    Truncated { source: io::Error, bytes: u64 },
    Write(io::Error),
}

async fn stream_entry<W, R>(
    zip: &mut ZipFileWriter<W>,
    builder: ZipEntryBuilder,
    reader: &mut R,
    buffer: &mut [u8],
) -> Result<u64, StreamError>
where
    W: AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let mut n = reader.read(buffer).await.map_err(StreamError::Unreadable)?;

    let mut entry = zip
        .write_entry_stream(builder)
        .await
        .map_err(|e| StreamError::Write(io::Error::other(e)))?;

    let mut bytes = 0u64;
    while n > 0 {
        entry
            .write_all(&buffer[..n])
            .await
            .map_err(StreamError::Write)?;
        bytes += n as u64;
        n = reader
            .read(buffer)
            .await
            .map_err(|source| StreamError::Truncated { source, bytes })?;
    }

    entry
        .close()
        .await
        .map_err(|e| StreamError::Write(io::Error::other(e)))?;

    Ok(bytes)
}
