use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::classify::{classify, is_hidden, PathKind};
use super::report::{SkipReason, Skipped};

/// Default bound on directory nesting below a requested directory.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Which hidden (dot-prefixed) entries the walker leaves out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenPolicy {
    /// Hidden directories contribute nothing, wherever they sit in the tree.
    ///  Hidden files inside a walked directory are still archived.
    #[default]
    SkipDirectories,
    /// Hidden files and directories are both left out, requested ones included.
    SkipAll,
    /// Nothing is filtered.
    Include,
}

impl HiddenPolicy {
    pub fn skips_directory(&self, name: &str) -> bool {
        match self {
            HiddenPolicy::SkipDirectories | HiddenPolicy::SkipAll => is_hidden(name),
            HiddenPolicy::Include => false,
        }
    }

    pub fn skips_file(&self, name: &str) -> bool {
        match self {
            HiddenPolicy::SkipAll => is_hidden(name),
            HiddenPolicy::SkipDirectories | HiddenPolicy::Include => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    pub hidden: HiddenPolicy,
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            hidden: HiddenPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A regular file found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Where to read the file from.
    pub source: PathBuf,
    /// `/`-separated name the file takes inside the archive.
    pub name: String,
}

struct Frame {
    dir: PathBuf,
    prefix: String,
    canonical: Option<PathBuf>,
    depth: usize,
    children: std::vec::IntoIter<OsString>,
}

/// Lazily expands a directory into the regular files beneath it.
///
/// The traversal is depth-first and visits children in sorted name order,
///  so two walks of an unchanged tree yield the same sequence. Directory
///  frames live on an explicit stack; a sub-directory is fully expanded
///  before the walk returns to its next sibling.
///
/// Nothing here is fatal. Listing and status failures skip the affected
///  subtree or entry, get logged, and are collected in [`TreeWalker::skipped`].
pub struct TreeWalker {
    options: WalkOptions,
    root: Option<(PathBuf, String)>,
    stack: Vec<Frame>,
    skipped: Vec<Skipped>,
}

impl TreeWalker {
    /// `root` must already be known to be a directory; `prefix` is the name
    ///  it takes inside the archive (usually its own base name).
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>, options: WalkOptions) -> Self {
        Self {
            options,
            root: Some((root.into(), prefix.into())),
            stack: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Next regular file in the walk, or `None` once the tree is exhausted.
    pub async fn next(&mut self) -> Option<WalkEntry> {
        if let Some((root, prefix)) = self.root.take() {
            self.enter(root, prefix, 0).await;
        }

        loop {
            let frame = self.stack.last_mut()?;
            let Some(child) = frame.children.next() else {
                self.stack.pop();
                continue;
            };

            let name = child.to_string_lossy().into_owned();
            let source = frame.dir.join(&child);
            let relative = join_name(&frame.prefix, &name);
            let depth = frame.depth + 1;

            match classify(&source).await {
                PathKind::File => {
                    if self.options.hidden.skips_file(&name) {
                        tracing::debug!(path = %source.display(), "skipping hidden file");
                        self.skip(source, SkipReason::Hidden);
                        continue;
                    }
                    return Some(WalkEntry {
                        source,
                        name: relative,
                    });
                }
                PathKind::Directory => {
                    self.enter(source, relative, depth).await;
                }
                PathKind::Inaccessible => {
                    tracing::warn!(path = %source.display(), "skipping inaccessible entry");
                    self.skip(source, SkipReason::Inaccessible);
                }
            }
        }
    }

    /// Entries left out so far.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<Skipped> {
        self.skipped
    }

    /// Drain the rest of the walk into a vector.
    pub async fn collect(mut self) -> (Vec<WalkEntry>, Vec<Skipped>) {
        let mut entries = Vec::new();
        while let Some(entry) = self.next().await {
            entries.push(entry);
        }
        (entries, self.skipped)
    }

    async fn enter(&mut self, dir: PathBuf, prefix: String, depth: usize) {
        let own_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.options.hidden.skips_directory(&own_name) {
            tracing::debug!(path = %dir.display(), "skipping hidden directory");
            self.skip(dir, SkipReason::Hidden);
            return;
        }

        if depth > self.options.max_depth {
            tracing::warn!(
                path = %dir.display(),
                max_depth = self.options.max_depth,
                "skipping directory past maximum depth"
            );
            self.skip(dir, SkipReason::DepthExceeded);
            return;
        }

        let canonical = tokio::fs::canonicalize(&dir).await.ok();
        if let Some(canonical) = canonical.as_deref() {
            if self.is_ancestor(canonical) {
                tracing::warn!(
                    path = %dir.display(),
                    target = %canonical.display(),
                    "skipping directory that loops back to an ancestor"
                );
                self.skip(dir, SkipReason::Cycle);
                return;
            }
        }

        let children = match list_names(&dir).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "failed to list directory");
                self.skip(dir, SkipReason::ListFailed(e.to_string()));
                return;
            }
        };

        self.stack.push(Frame {
            dir,
            prefix,
            canonical,
            depth,
            children: children.into_iter(),
        });
    }

    fn is_ancestor(&self, canonical: &Path) -> bool {
        self.stack
            .iter()
            .any(|frame| frame.canonical.as_deref() == Some(canonical))
    }

    fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        self.skipped.push(Skipped::new(path, reason));
    }
}

/// Read the immediate children of `dir`, sorted by name.
async fn list_names(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        names.push(entry.file_name());
    }
    names.sort();
    Ok(names)
}

/// Join an archive prefix and a child name with `/`.
pub fn join_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(entries: &[WalkEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_walk_nested_in_sorted_order() {
        let temp = TempDir::new().unwrap();
        let photos = temp.path().join("photos");
        fs::create_dir_all(photos.join("sub")).unwrap();
        fs::write(photos.join("b.jpg"), b"b").unwrap();
        fs::write(photos.join("a.jpg"), b"a").unwrap();
        fs::write(photos.join("sub/c.jpg"), b"c").unwrap();

        let walker = TreeWalker::new(&photos, "photos", WalkOptions::default());
        let (entries, skipped) = walker.collect().await;

        assert_eq!(
            names(&entries),
            vec!["photos/a.jpg", "photos/b.jpg", "photos/sub/c.jpg"]
        );
        assert_eq!(entries[2].source, photos.join("sub/c.jpg"));
        assert!(skipped.is_empty());
    }

    #[tokio::test]
    async fn test_hidden_directory_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        let secret = temp.path().join(".secret");
        fs::create_dir(&secret).unwrap();
        fs::write(secret.join("key"), b"k").unwrap();

        let walker = TreeWalker::new(&secret, ".secret", WalkOptions::default());
        let (entries, skipped) = walker.collect().await;

        assert!(entries.is_empty());
        assert_eq!(skipped, vec![Skipped::new(secret, SkipReason::Hidden)]);
    }

    #[tokio::test]
    async fn test_default_policy_keeps_hidden_files_but_not_hidden_dirs() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("proj");
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join(".git/HEAD"), b"ref").unwrap();
        fs::write(root.join(".env"), b"X=1").unwrap();
        fs::write(root.join("main.rs"), b"fn main() {}").unwrap();

        let (entries, _) = TreeWalker::new(&root, "proj", WalkOptions::default())
            .collect()
            .await;
        assert_eq!(names(&entries), vec!["proj/.env", "proj/main.rs"]);

        let skip_all = WalkOptions {
            hidden: HiddenPolicy::SkipAll,
            ..WalkOptions::default()
        };
        let (entries, _) = TreeWalker::new(&root, "proj", skip_all).collect().await;
        assert_eq!(names(&entries), vec!["proj/main.rs"]);

        let include = WalkOptions {
            hidden: HiddenPolicy::Include,
            ..WalkOptions::default()
        };
        let (entries, _) = TreeWalker::new(&root, "proj", include).collect().await;
        assert_eq!(
            names(&entries),
            vec!["proj/.env", "proj/.git/HEAD", "proj/main.rs"]
        );
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("deep");
        fs::create_dir_all(root.join("one/two")).unwrap();
        fs::write(root.join("top.txt"), b"0").unwrap();
        fs::write(root.join("one/mid.txt"), b"1").unwrap();
        fs::write(root.join("one/two/low.txt"), b"2").unwrap();

        let options = WalkOptions {
            max_depth: 1,
            ..WalkOptions::default()
        };
        let (entries, skipped) = TreeWalker::new(&root, "deep", options).collect().await;

        assert_eq!(names(&entries), vec!["deep/one/mid.txt", "deep/top.txt"]);
        assert_eq!(
            skipped,
            vec![Skipped::new(root.join("one/two"), SkipReason::DepthExceeded)]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_cycle_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("loop");
        fs::create_dir_all(root.join("inner")).unwrap();
        fs::write(root.join("inner/file.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(&root, root.join("inner/back")).unwrap();

        let (entries, skipped) = TreeWalker::new(&root, "loop", WalkOptions::default())
            .collect()
            .await;

        assert_eq!(names(&entries), vec!["loop/inner/file.txt"]);
        assert_eq!(
            skipped,
            vec![Skipped::new(root.join("inner/back"), SkipReason::Cycle)]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_directory_is_expanded() {
        let temp = TempDir::new().unwrap();
        let shared = temp.path().join("shared");
        fs::create_dir(&shared).unwrap();
        fs::write(shared.join("doc.txt"), b"d").unwrap();

        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&shared, root.join("link")).unwrap();

        let (entries, _) = TreeWalker::new(&root, "root", WalkOptions::default())
            .collect()
            .await;
        assert_eq!(names(&entries), vec!["root/link/doc.txt"]);
    }

    #[tokio::test]
    async fn test_empty_prefix_places_children_at_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();

        let (entries, _) = TreeWalker::new(&root, "", WalkOptions::default())
            .collect()
            .await;
        assert_eq!(names(&entries), vec!["a.txt"]);
    }
}
