use std::path::PathBuf;

use serde_json::Value;

/// Field carrying the requested paths in a download body.
pub const FILE_PATHS_FIELD: &str = "filePaths";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("missing field: filePaths")]
    Missing,
    #[error("filePaths is not an array")]
    NotAnArray,
    #[error("filePaths[{0}] is not a string")]
    NotAString(usize),
    #[error("no paths requested")]
    Empty,
}

/// An ordered, non-empty list of paths to archive.
///
/// Paths are kept exactly as supplied. Whether they exist is only found out
///  while archiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRequest {
    paths: Vec<PathBuf>,
}

impl ArchiveRequest {
    pub fn new<I, P>(paths: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        if paths.is_empty() {
            return Err(RequestError::Empty);
        }
        Ok(Self { paths })
    }

    /// Validate a raw JSON body of the shape `{ "filePaths": [..] }`.
    pub fn from_value(body: &Value) -> Result<Self, RequestError> {
        let field = body.get(FILE_PATHS_FIELD).ok_or(RequestError::Missing)?;
        let items = field.as_array().ok_or(RequestError::NotAnArray)?;

        let paths = items
            .iter()
            .enumerate()
            .map(|(i, item)| item.as_str().ok_or(RequestError::NotAString(i)))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(paths)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_string_array() {
        let request =
            ArchiveRequest::from_value(&json!({ "filePaths": ["/data/a.txt", "/data/b"] }))
                .unwrap();
        assert_eq!(
            request.paths(),
            &[PathBuf::from("/data/a.txt"), PathBuf::from("/data/b")]
        );
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            ArchiveRequest::from_value(&json!({})),
            Err(RequestError::Missing)
        );
        assert_eq!(
            ArchiveRequest::from_value(&json!({ "filePaths": "/data/a.txt" })),
            Err(RequestError::NotAnArray)
        );
        assert_eq!(
            ArchiveRequest::from_value(&json!({ "filePaths": ["/a", 7] })),
            Err(RequestError::NotAString(1))
        );
        assert_eq!(
            ArchiveRequest::from_value(&json!({ "filePaths": [] })),
            Err(RequestError::Empty)
        );
        assert_eq!(
            ArchiveRequest::from_value(&json!(null)),
            Err(RequestError::Missing)
        );
    }

    #[test]
    fn test_duplicates_and_order_are_preserved() {
        let request = ArchiveRequest::new(["/b", "/a", "/b"]).unwrap();
        let paths: Vec<_> = request.paths().iter().map(|p| p.to_str().unwrap()).collect();
        assert_eq!(paths, vec!["/b", "/a", "/b"]);
    }
}
