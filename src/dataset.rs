//! Staged dataset handling.
//!
//! Both acquisition paths (user-picked or dropped files, and the built-in
//! example dataset) converge on [`StagedDataset`], the single representation
//! `process_upload` consumes. Validation happens here so no handler can
//! stage a non-CSV file.

use std::path::Path;

use thiserror::Error;

/// Built-in example dataset shipped with the app.
const EXAMPLE_CSV: &[u8] = include_bytes!("../assets/example_resumes.csv");
const EXAMPLE_FILE_NAME: &str = "example_resumes.csv";

/// Where a staged dataset came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetOrigin {
    /// Chosen through the file picker.
    Picked,
    /// Dropped onto the window.
    Dropped,
    /// The bundled example dataset.
    Example,
}

/// A CSV file staged for upload.
#[derive(Clone, Debug)]
pub struct StagedDataset {
    /// Name sent as the multipart filename.
    pub file_name: String,
    /// Raw CSV bytes.
    pub contents: Vec<u8>,
    /// Acquisition path, surfaced in the upload dialog.
    pub origin: DatasetOrigin,
}

/// Errors raised while staging a dataset.
#[derive(Debug, Error)]
pub enum StageError {
    /// The file is not a CSV by extension or MIME type.
    #[error("Only CSV files are supported: {name}")]
    NotCsv {
        /// Offending file name.
        name: String,
    },
    /// The file could not be read from disk.
    #[error("Failed to read {name}: {source}")]
    Read {
        /// Offending file name.
        name: String,
        /// Underlying io error.
        source: std::io::Error,
    },
}

/// Whether a file name or MIME type identifies a CSV.
///
/// A `text/csv` MIME type or a `.csv` suffix (case-insensitive) qualifies;
/// everything else is rejected.
pub fn is_csv(name: &str, mime: Option<&str>) -> bool {
    if mime.is_some_and(|mime| mime.eq_ignore_ascii_case("text/csv")) {
        return true;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

impl StagedDataset {
    /// Stage a file from an on-disk path (the picker flow).
    pub fn from_path(path: &Path) -> Result<Self, StageError> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        if !is_csv(&name, None) {
            return Err(StageError::NotCsv { name });
        }
        let contents = std::fs::read(path).map_err(|source| StageError::Read {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            file_name: name,
            contents,
            origin: DatasetOrigin::Picked,
        })
    }

    /// Stage an already-read file (the drag-drop flow).
    pub fn from_dropped(
        name: &str,
        mime: Option<&str>,
        contents: Vec<u8>,
    ) -> Result<Self, StageError> {
        if !is_csv(name, mime) {
            return Err(StageError::NotCsv {
                name: name.to_string(),
            });
        }
        Ok(Self {
            file_name: name.to_string(),
            contents,
            origin: DatasetOrigin::Dropped,
        })
    }

    /// Stage the bundled example dataset.
    pub fn example() -> Self {
        Self {
            file_name: EXAMPLE_FILE_NAME.to_string(),
            contents: EXAMPLE_CSV.to_vec(),
            origin: DatasetOrigin::Example,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn accepts_csv_by_extension_or_mime() {
        assert!(is_csv("resumes.csv", None));
        assert!(is_csv("RESUMES.CSV", None));
        assert!(is_csv("resumes.txt", Some("text/csv")));
        assert!(!is_csv("resumes.txt", None));
        assert!(!is_csv("resumes.csv.zip", Some("application/zip")));
        assert!(!is_csv("resumes", None));
    }

    #[test]
    fn rejects_non_csv_drop() {
        let err = StagedDataset::from_dropped("image.png", Some("image/png"), vec![1, 2, 3]);
        assert!(matches!(err, Err(StageError::NotCsv { .. })));
    }

    #[test]
    fn stages_csv_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, b"Resume_str\nhello\n").unwrap();
        let staged = StagedDataset::from_path(&path).unwrap();
        assert_eq!(staged.file_name, "rows.csv");
        assert_eq!(staged.origin, DatasetOrigin::Picked);
        assert!(staged.contents.starts_with(b"Resume_str"));
    }

    #[test]
    fn rejects_non_csv_path_without_reading() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.parquet");
        let err = StagedDataset::from_path(&path);
        assert!(matches!(err, Err(StageError::NotCsv { .. })));
    }

    #[test]
    fn example_dataset_has_required_column() {
        let staged = StagedDataset::example();
        assert_eq!(staged.origin, DatasetOrigin::Example);
        let header = staged.contents.split(|b| *b == b'\n').next().unwrap();
        assert!(String::from_utf8_lossy(header).contains("Resume_str"));
    }
}
