use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub mod format;
pub mod json_csv;
pub mod report;

pub use format::{format_currency, format_percentage};
pub use json_csv::json_to_csv;
pub use report::{escape_value, serialize, serialize_multiple};

pub const CSV_CONTENT_TYPE: &str = "text/csv;charset=utf-8";

/// One row of tabular data. Key order is the order the keys were inserted.
pub type Record = Map<String, Value>;

/// A named list of records rendered as one section of a multi-sheet export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub records: Vec<Record>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

/// Payload of an export: a single record list, or named lists in insertion order.
///
/// In JSON a single list is an array of objects and named lists are an object whose
/// values are arrays of objects.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    Single(Vec<Record>),
    Multiple(Vec<Sheet>),
}

impl Serialize for ExportData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExportData::Single(records) => serializer.collect_seq(records),
            ExportData::Multiple(sheets) => serializer.collect_map(
                sheets
                    .iter()
                    .map(|sheet| (sheet.name.as_str(), &sheet.records)),
            ),
        }
    }
}

impl<'de> Deserialize<'de> for ExportData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => records_from_values(items).map(ExportData::Single),
            Value::Object(entries) => {
                let mut sheets = Vec::with_capacity(entries.len());
                for (name, value) in entries {
                    let Value::Array(items) = value else {
                        return Err(D::Error::custom(format!(
                            "sheet '{name}' must be an array of records"
                        )));
                    };
                    sheets.push(Sheet::new(name, records_from_values(items)?));
                }
                Ok(ExportData::Multiple(sheets))
            }
            _ => Err(D::Error::custom(
                "export data must be an array of records or an object of named record arrays",
            )),
        }
    }
}

fn records_from_values<E: serde::de::Error>(items: Vec<Value>) -> Result<Vec<Record>, E> {
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            other => Err(E::custom(format!("record must be an object, got {other}"))),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub include_header: bool,
    pub include_metadata: bool,
    /// Descriptive `label: value` lines written above the header.
    pub metadata: Map<String, Value>,
    pub sheet_name: String,
    pub delimiter: char,
    /// Instant stamped into the metadata block. `None` means the time of serialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            include_metadata: true,
            metadata: Map::new(),
            sheet_name: "Data".to_string(),
            delimiter: ',',
            generated_at: None,
        }
    }
}

impl ExportOptions {
    pub fn with_metadata(mut self, label: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(label.into(), value.into());
        self
    }

    pub(crate) fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at.unwrap_or_else(Utc::now)
    }
}

#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    InvalidFilename(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(err) => write!(f, "io error: {err}"),
            ExportError::InvalidFilename(name) => write!(f, "invalid export filename '{name}'"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

pub type ExportResult<T> = Result<T, ExportError>;

/// A rendered document ready to be handed to the host's file-save facility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

/// File-save capability of the hosting environment.
pub trait DownloadSink {
    fn deliver(&self, download: &Download) -> ExportResult<()>;
}

/// Saves downloads as files inside one directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn target_path(&self, download: &Download) -> PathBuf {
        self.dir.join(&download.filename)
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, download: &Download) -> ExportResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.target_path(download);
        fs::write(&path, download.body.as_bytes())?;
        log::info!(
            "saved {} ({} bytes) to {}",
            download.filename,
            download.body.len(),
            path.display()
        );
        Ok(())
    }
}

pub(crate) fn validate_filename(filename: &str) -> ExportResult<()> {
    let trimmed = filename.trim();
    if trimmed.is_empty()
        || trimmed.contains(['/', '\\', '\0', '"', '\r', '\n'])
        || trimmed.contains("..")
    {
        log::warn!("rejected export filename '{filename}'");
        return Err(ExportError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Builds the CSV download for `data`, named `<filename>.csv`.
pub fn prepare_download(
    data: &ExportData,
    filename: &str,
    options: &ExportOptions,
) -> ExportResult<Download> {
    validate_filename(filename)?;
    let body = match data {
        ExportData::Single(records) => serialize(records, options),
        ExportData::Multiple(sheets) => serialize_multiple(sheets, options),
    };
    Ok(Download {
        filename: format!("{}.csv", filename.trim()),
        content_type: CSV_CONTENT_TYPE,
        body,
    })
}

/// Semicolon-delimited sibling of [`prepare_download`].
pub fn prepare_json_csv_download(records: &[Record], filename: &str) -> ExportResult<Download> {
    validate_filename(filename)?;
    Ok(Download {
        filename: format!("{}.csv", filename.trim()),
        content_type: CSV_CONTENT_TYPE,
        body: json_to_csv(records),
    })
}

pub fn trigger_download<S: DownloadSink + ?Sized>(
    data: &ExportData,
    filename: &str,
    options: &ExportOptions,
    sink: &S,
) -> ExportResult<Download> {
    let download = prepare_download(data, filename, options)?;
    sink.deliver(&download)?;
    Ok(download)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_with_path_components_are_rejected() {
        assert!(validate_filename("report").is_ok());
        assert!(validate_filename("report 2024-01").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("   ").is_err());
        assert!(validate_filename("../etc/passwd").is_err());
        assert!(validate_filename("a/b").is_err());
        assert!(validate_filename("a\\b").is_err());
    }

    #[test]
    fn export_data_keeps_sheet_order() {
        let data: ExportData =
            serde_json::from_str(r#"{"Zeta": [{"x": 1}], "Alpha": [{"x": 2}]}"#).unwrap();
        let ExportData::Multiple(sheets) = data else {
            panic!("expected named lists");
        };
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn export_data_rejects_scalars() {
        assert!(serde_json::from_str::<ExportData>("42").is_err());
        assert!(serde_json::from_str::<ExportData>("[1, 2]").is_err());
    }
}
