use std::{
    fmt::{self, Display},
    path::Path,
};

use derive_builder::Builder;
use fileshare_utils::get_epoch_time_in_ms;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: String) -> Self {
        Self(id)
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self(nanoid!())
    }
}

impl Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Metadata for one uploaded file. `filename` is the name the bytes are
/// stored under in the blob store and `path` is the blob store location the
/// upload landed at; both are fixed at upload time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct FileRecord {
    #[builder(default)]
    pub id: FileId,
    #[builder(default)]
    pub title: Option<String>,
    #[builder(default)]
    pub description: Option<String>,
    pub filename: String,
    pub path: String,
    #[builder(default = "get_epoch_time_in_ms()")]
    pub uploaded_at: u64,
}

impl FileRecordBuilder {
    fn validate(&self) -> Result<(), String> {
        if matches!(&self.filename, Some(f) if f.is_empty()) {
            return Err("filename cannot be empty".to_string());
        }
        if matches!(&self.path, Some(p) if p.is_empty()) {
            return Err("path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Storage name for an upload: the millisecond timestamp with the original
/// file's extension carried over verbatim, so uploads in the same millisecond
/// with different extensions still land under distinct names.
pub fn storage_filename(ts_ms: u64, original_name: &str) -> String {
    match Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{ts_ms}.{ext}"),
        None => ts_ms.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_filename_preserves_extension() {
        assert_eq!(storage_filename(1700000000123, "photo.png"), "1700000000123.png");
        assert_eq!(storage_filename(1700000000123, "archive.tar.gz"), "1700000000123.gz");
        assert_eq!(storage_filename(1700000000123, "README"), "1700000000123");
        assert_eq!(storage_filename(1700000000123, ""), "1700000000123");
    }

    #[test]
    fn storage_filename_distinguishes_same_millisecond_uploads() {
        let ts = 1700000000123;
        assert_ne!(
            storage_filename(ts, "a.png"),
            storage_filename(ts, "b.jpg")
        );
    }

    #[test]
    fn builder_generates_id_and_timestamp() {
        let record = FileRecordBuilder::default()
            .filename("1700000000123.png")
            .path("blobs/1700000000123.png")
            .build()
            .unwrap();
        assert!(!record.id.get().is_empty());
        assert!(record.uploaded_at > 0);
        assert_eq!(record.title, None);
        assert_eq!(record.description, None);
    }

    #[test]
    fn builder_rejects_empty_filename_and_path() {
        let err = FileRecordBuilder::default()
            .filename("")
            .path("blobs/x")
            .build();
        assert!(err.is_err());

        let err = FileRecordBuilder::default()
            .filename("1700000000123.png")
            .path("")
            .build();
        assert!(err.is_err());
    }

    #[test]
    fn record_serializes_with_camel_case_wire_names() {
        let record = FileRecordBuilder::default()
            .filename("1700000000123.png")
            .path("blobs/1700000000123.png")
            .build()
            .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("uploadedAt").is_some());
        assert!(value.get("filename").is_some());
        assert!(value.get("uploaded_at").is_none());
    }
}
