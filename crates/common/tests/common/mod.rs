//! Shared test utilities for archive integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_zip::base::read::mem::ZipFileReader;
use tempfile::TempDir;

/// Write `files` (relative path, contents) under a fresh `data` directory.
///
/// The directory is nested inside the temp dir because the temp dir's own
///  name starts with `.tmp` and would count as hidden.
pub fn setup_tree(files: &[(&str, &[u8])]) -> (PathBuf, TempDir) {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir(&data).unwrap();
    for (relative, contents) in files {
        let path = data.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
    (data, temp)
}

/// Read a finished archive back into name -> contents.
pub async fn read_archive(bytes: Vec<u8>) -> BTreeMap<String, Vec<u8>> {
    let reader = ZipFileReader::new(bytes).await.unwrap();
    let mut out = BTreeMap::new();
    for index in 0..reader.file().entries().len() {
        let name = reader.file().entries()[index]
            .filename()
            .as_str()
            .unwrap()
            .to_string();
        let mut entry = reader.reader_with_entry(index).await.unwrap();
        let mut contents = Vec::new();
        entry.read_to_end_checked(&mut contents).await.unwrap();
        out.insert(name, contents);
    }
    out
}

/// Entry names in the order they were written.
pub async fn entry_names(bytes: Vec<u8>) -> Vec<String> {
    let reader = ZipFileReader::new(bytes).await.unwrap();
    reader
        .file()
        .entries()
        .iter()
        .map(|entry| entry.filename().as_str().unwrap().to_string())
        .collect()
}

pub fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}
