//! Table sources: JSON files, JSON Lines files, directories of either, and
//! in-memory rows.
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SourceFormat;
use crate::error::{Error, Result};
use crate::traits::TableSource;
use crate::types::{Row, Table};

/// Rows held in memory, e.g. built by a caller or a test.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    label: String,
    rows: Vec<Row>,
}

impl MemorySource {
    pub fn new(label: impl Into<String>, rows: Vec<Row>) -> Self {
        Self { label: label.into(), rows }
    }

    /// Accepts JSON objects; any non-object value is a data source error.
    pub fn from_values(label: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let label = label.into();
        let rows = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| match v {
                Value::Object(map) => Ok(map),
                other => Err(Error::DataSource(format!(
                    "{label}: row {} is not an object: {other}",
                    i + 1
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { label, rows })
    }
}

impl TableSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn read(&self) -> Result<Table> {
        Ok(Table::from_rows(self.rows.clone()))
    }
}

/// A single `.json` (array of objects, or an object with an `items`/`results`
/// array) or `.jsonl`/`.ndjson` file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    format: SourceFormat,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self { path: path.into(), format }
    }

    fn effective_format(&self) -> SourceFormat {
        match self.format {
            SourceFormat::Auto => match self.path.extension().and_then(|s| s.to_str()) {
                Some("jsonl" | "ndjson") => SourceFormat::JsonLines,
                _ => SourceFormat::Json,
            },
            explicit => explicit,
        }
    }
}

impl TableSource for JsonFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Table> {
        let rows = read_rows(&self.path, self.effective_format())?;
        debug!(path = %self.path.display(), rows = rows.len(), "read table file");
        Ok(Table::from_rows(rows))
    }
}

/// Every `.json`, `.jsonl` and `.ndjson` file below a directory, in path order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl" | "ndjson"))
            })
            .collect();
        files.sort();
        files
    }
}

impl TableSource for DirectorySource {
    fn describe(&self) -> String {
        format!("{}/", self.root.display())
    }

    fn read(&self) -> Result<Table> {
        if !self.root.is_dir() {
            return Err(Error::DataSource(format!(
                "{} is not a readable directory",
                self.root.display()
            )));
        }
        let files = self.list_files();
        if files.is_empty() {
            return Err(Error::DataSource(format!(
                "no .json/.jsonl files under {}",
                self.root.display()
            )));
        }
        let mut rows = Vec::new();
        for file in &files {
            let format = JsonFileSource::new(file, SourceFormat::Auto).effective_format();
            let file_rows = read_rows(file, format)?;
            debug!(path = %file.display(), rows = file_rows.len(), "read table file");
            rows.extend(file_rows);
        }
        Ok(Table::from_rows(rows))
    }
}

/// Pick a directory or file source for `path`.
pub fn open_source(path: &Path, format: SourceFormat) -> Box<dyn TableSource> {
    if path.is_dir() {
        Box::new(DirectorySource::new(path))
    } else {
        Box::new(JsonFileSource::new(path, format))
    }
}

fn read_rows(path: &Path, format: SourceFormat) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::DataSource(format!("cannot read {}: {e}", path.display())))?;
    match format {
        SourceFormat::JsonLines => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str::<Value>(line)
                    .map_err(|e| Error::DataSource(format!("{}:{}: {e}", path.display(), i + 1)))
                    .and_then(|v| into_row(v, path, i + 1))
            })
            .collect(),
        SourceFormat::Json | SourceFormat::Auto => {
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| Error::DataSource(format!("{}: {e}", path.display())))?;
            let array = match value {
                Value::Array(a) => a,
                Value::Object(mut map) => {
                    match map.remove("items").or_else(|| map.remove("results")) {
                        Some(Value::Array(a)) => a,
                        _ => {
                            return Err(Error::DataSource(format!(
                                "{}: expected an array of rows or an object with an `items` array",
                                path.display()
                            )))
                        }
                    }
                }
                _ => {
                    return Err(Error::DataSource(format!(
                        "{}: expected an array of rows",
                        path.display()
                    )))
                }
            };
            array.into_iter().enumerate().map(|(i, v)| into_row(v, path, i + 1)).collect()
        }
    }
}

fn into_row(value: Value, path: &Path, line: usize) -> Result<Row> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::DataSource(format!("{}: row {line} is not an object", path.display()))),
    }
}
