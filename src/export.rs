//! `--export` output formats and file writing

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Local;
use serde_json::Value;

use crate::error::{Error, Result};

/// Output formats selectable with `--export`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
    Png,
    Jpg,
}

impl ExportFormat {
    /// Formats for tabular data
    pub const DATA: &'static [ExportFormat] =
        &[ExportFormat::Csv, ExportFormat::Json, ExportFormat::Xlsx];

    /// Formats for rendered figures
    pub const FIGURES: &'static [ExportFormat] = &[ExportFormat::Png, ExportFormat::Jpg];

    /// Every format
    pub const ALL: &'static [ExportFormat] = &[
        ExportFormat::Csv,
        ExportFormat::Json,
        ExportFormat::Xlsx,
        ExportFormat::Png,
        ExportFormat::Jpg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpg),
            other => Err(Error::Other(format!("Unknown export format '{}'", other))),
        }
    }
}

/// Write `rows` under `directory` as `<timestamp>_<name>.<format>`.
///
/// Only data formats that can be written without a renderer are supported;
/// figure and spreadsheet formats return an error naming the format.
pub fn export_rows(
    directory: &Path,
    name: &str,
    format: ExportFormat,
    rows: &[Value],
) -> Result<PathBuf> {
    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(rows)?,
        ExportFormat::Csv => to_csv(rows),
        other => {
            return Err(Error::Other(format!(
                "Exporting to {} is not available for this command",
                other
            )))
        }
    };

    fs::create_dir_all(directory)?;
    let file_name = format!(
        "{}_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        name,
        format
    );
    let path = directory.join(file_name);
    fs::write(&path, content)?;
    debug!("Exported {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Flatten JSON objects into CSV using the union of their keys as header
fn to_csv(rows: &[Value]) -> String {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !header.contains(key) {
                    header.push(key.clone());
                }
            }
        }
    }

    let mut out = String::new();
    if header.is_empty() {
        header.push("value".to_string());
    }
    out.push_str(&header.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","));
    out.push('\n');

    for row in rows {
        let fields: Vec<String> = match row {
            Value::Object(map) => header
                .iter()
                .map(|key| map.get(key).map(value_text).unwrap_or_default())
                .collect(),
            other => vec![value_text(other)],
        };
        out.push_str(&fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","));
        out.push('\n');
    }
    out
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
