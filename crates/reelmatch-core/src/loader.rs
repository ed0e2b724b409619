//! Turns a raw [`Table`] into a [`Corpus`]: column checks, value
//! normalization, filtering, then contiguous position assignment.
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{ColumnMapping, FilterConfig, Settings};
use crate::error::{Error, Result};
use crate::traits::TableSource;
use crate::types::{Corpus, Item, Meta, Row, Table};

#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    columns: ColumnMapping,
    filter: FilterConfig,
}

impl CorpusLoader {
    pub fn new(columns: ColumnMapping, filter: FilterConfig) -> Self {
        Self { columns, filter }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.data.columns.clone(), settings.filter.clone())
    }

    pub fn load(&self, source: &dyn TableSource) -> Result<Corpus> {
        let table = source.read()?;
        let corpus = self.load_table(&table)?;
        info!(
            source = %source.describe(),
            rows = table.len(),
            items = corpus.len(),
            "loaded corpus"
        );
        Ok(corpus)
    }

    pub fn load_table(&self, table: &Table) -> Result<Corpus> {
        self.check_columns(table)?;

        let titles: Vec<String> =
            table.rows.iter().map(|r| cell_text(r.get(&self.columns.title))).collect();
        if titles.iter().all(|t| t.trim().is_empty()) {
            return Err(Error::Schema(format!(
                "title column '{}' has no usable values in {} rows",
                self.columns.title,
                table.len()
            )));
        }

        let mut items = Vec::with_capacity(table.len());
        let (mut blank_titles, mut blank_ids, mut filtered) = (0usize, 0usize, 0usize);
        for (index, (row, title)) in table.rows.iter().zip(titles).enumerate() {
            let row_number = index + 1;
            let title = title.trim().to_string();
            if title.is_empty() {
                blank_titles += 1;
                continue;
            }
            if !self.keep(row) {
                filtered += 1;
                continue;
            }
            let id = match &self.columns.id {
                Some(col) => cell_text(row.get(col)).trim().to_string(),
                None => row_number.to_string(),
            };
            if id.is_empty() {
                blank_ids += 1;
                continue;
            }
            let text_fields = self.columns.text.iter().map(|c| cell_text(row.get(c))).collect();
            let metadata: Meta = self
                .columns
                .metadata
                .iter()
                .filter_map(|c| row.get(c).filter(|v| !v.is_null()).map(|v| (c.clone(), v.clone())))
                .collect();
            // Position is assigned by Corpus::from_items after filtering.
            items.push(Item { id, title, text_fields, metadata, position: 0 });
        }

        if blank_titles > 0 {
            warn!(
                rows = blank_titles,
                column = %self.columns.title,
                "dropped rows without a title"
            );
        }
        if blank_ids > 0 {
            warn!(rows = blank_ids, "dropped rows without an id");
        }
        if filtered > 0 {
            debug!(rows = filtered, "rows excluded by filters");
        }
        if items.is_empty() {
            warn!("corpus is empty after cleaning and filtering");
        }
        Corpus::from_items(items)
    }

    /// Title and id columns must exist, plus at least one text column.
    /// Absent text columns read as empty for every row.
    fn check_columns(&self, table: &Table) -> Result<()> {
        let mut required: Vec<&str> = vec![self.columns.title.as_str()];
        required.extend(self.columns.id.as_deref());
        let mut missing: Vec<&str> =
            required.into_iter().filter(|c| !table.has_column(c)).collect();

        let absent_text: Vec<&str> = self
            .columns
            .text
            .iter()
            .map(String::as_str)
            .filter(|c| !table.has_column(c))
            .collect();
        if !absent_text.is_empty() && absent_text.len() == self.columns.text.len() {
            missing.extend(absent_text);
        } else if !absent_text.is_empty() {
            warn!(columns = %absent_text.join(", "), "text columns absent, treated as empty");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::DataSource(format!("required columns missing: {}", missing.join(", "))))
        }
    }

    fn keep(&self, row: &Row) -> bool {
        let f = &self.filter;
        if let Some(min) = f.min_vote_count {
            match cell_number(row.get(&f.vote_count_column)) {
                Some(votes) if votes >= min => {}
                _ => return false,
            }
        }
        if f.year_min.is_some() || f.year_max.is_some() {
            let Some(year) = cell_year(row.get(&f.year_column)) else { return false };
            if f.year_min.is_some_and(|lo| year < lo) || f.year_max.is_some_and(|hi| year > hi) {
                return false;
            }
        }
        if !f.kinds.is_empty() {
            let kind = cell_text(row.get(&f.kind_column));
            if !f.kinds.iter().any(|k| k.trim().eq_ignore_ascii_case(kind.trim())) {
                return false;
            }
        }
        true
    }
}

/// Render a cell as text. Missing and null become the empty string.
///
/// Arrays are flattened with spaces; objects contribute their `name` field
/// (TMDB style genre lists). A string holding a JSON array is parsed first.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => {
            let trimmed = s.trim_start();
            if trimmed.starts_with('[') {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return cell_text(Some(&parsed));
                }
            }
            s.clone()
        }
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| cell_text(Some(v)))
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Some(Value::Object(map)) => match map.get("name") {
            Some(Value::String(name)) => name.clone(),
            _ => String::new(),
        },
    }
}

fn cell_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Year from a number (`2010`) or a date-like string (`"2010-07-15"`).
fn cell_year(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().get(..4).and_then(|y| y.parse().ok()),
        _ => None,
    }
}
