use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::ReportError;
use crate::metric::Record;

pub const DEFAULT_REPORT_FILE_NAME: &'static str = "data_points.csv";

/// Writes `records` as CSV to `path`, replacing any existing file.
///
/// The header is the first record's keys in order. The document goes to a
/// temporary file next to `path` which is then renamed over it, so on any
/// failure `path` keeps its previous content.
pub fn write_report(records: &[Record], path: &Path) -> Result<(), ReportError> {
    let document = render_report(records)?;
    let io_error = |source: io::Error| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory).map_err(io_error)?;
    file.write_all(&document).map_err(io_error)?;
    file.as_file().sync_all().map_err(io_error)?;
    file.persist(path).map_err(|error| io_error(error.error))?;
    info!(path = %path.display(), rows = records.len(), "report written");
    Ok(())
}

pub fn render_report(records: &[Record]) -> Result<Vec<u8>, ReportError> {
    let header: Vec<&String> = records
        .first()
        .ok_or(ReportError::EmptyResult)?
        .keys()
        .collect();

    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record(&header)?;
    for (index, record) in records.iter().enumerate() {
        if let Some(field) = record.keys().find(|key| !header.contains(key)) {
            return Err(ReportError::InconsistentRecord {
                index,
                field: field.clone(),
            });
        }
        writer.write_record(
            header
                .iter()
                .map(|key| record.get(key.as_str()).map_or(String::new(), to_field)),
        )?;
    }
    writer
        .into_inner()
        .map_err(|error| ReportError::Encode(error.into_error().into()))
}

fn to_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
