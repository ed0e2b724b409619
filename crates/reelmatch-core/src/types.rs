//! Domain types shared by the loader, vectorizer and similarity engines.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{Error, Result};

pub type ItemId = String;
pub type Position = usize;
pub type Meta = BTreeMap<String, serde_json::Value>;

/// One raw record of a tabular source, keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A tabular dataset as read from a source, before any cleaning.
///
/// `columns` is the union of keys seen across all rows, so a column counts as
/// present even when only some rows carry a value for it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: BTreeSet<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let columns = rows.iter().flat_map(|r| r.keys().cloned()).collect();
        Self { columns, rows }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A recommendable movie or show.
///
/// - `id`: stable external identifier, unique in a corpus
/// - `title`: display name, may repeat across items
/// - `text_fields`: descriptive values in configured column order
/// - `metadata`: pass-through display attributes (rating, year, type)
/// - `position`: row of this item in the vector space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub text_fields: Vec<String>,
    pub metadata: Meta,
    pub position: Position,
}

impl Item {
    /// Text fields joined by a single space, in column order.
    pub fn canonical_text(&self) -> String {
        self.text_fields.join(" ")
    }
}

/// Cleaned, contiguously positioned set of items.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    items: Vec<Item>,
    by_id: HashMap<ItemId, Position>,
}

impl Corpus {
    /// Assigns positions `0..N` in the given order; fails on duplicate ids.
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(items.len());
        let mut items = items;
        for (position, item) in items.iter_mut().enumerate() {
            item.position = position;
            if let Some(prev) = by_id.insert(item.id.clone(), position) {
                return Err(Error::Schema(format!(
                    "duplicate id '{}' at positions {} and {}",
                    item.id, prev, position
                )));
            }
        }
        Ok(Self { items, by_id })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, position: Position) -> Option<&Item> {
        self.items.get(position)
    }

    pub fn item(&self, position: Position) -> Result<&Item> {
        self.items
            .get(position)
            .ok_or(Error::InvalidPosition { position, len: self.items.len() })
    }

    pub fn position_of_id(&self, id: &str) -> Option<Position> {
        self.by_id.get(id).copied()
    }

    pub fn canonical_texts(&self) -> Vec<String> {
        self.items.iter().map(Item::canonical_text).collect()
    }

    /// Resolve a user query to exactly one item.
    ///
    /// Tries an exact id, then an exact title, then a trimmed case-insensitive
    /// title. A title shared by several items is ambiguous and reported as
    /// not found; the caller can retry with the id.
    pub fn resolve(&self, title_or_id: &str) -> Result<Position> {
        if let Some(position) = self.position_of_id(title_or_id) {
            return Ok(position);
        }
        let exact: Vec<Position> = self
            .items
            .iter()
            .filter(|i| i.title == title_or_id)
            .map(|i| i.position)
            .collect();
        let matches = if exact.is_empty() {
            let needle = title_or_id.trim().to_lowercase();
            self.items
                .iter()
                .filter(|i| !needle.is_empty() && i.title.trim().to_lowercase() == needle)
                .map(|i| i.position)
                .collect()
        } else {
            exact
        };
        match matches.as_slice() {
            [position] => Ok(*position),
            [] => Err(Error::NotFound(format!("no title or id matches '{title_or_id}'"))),
            many => {
                let ids: Vec<&str> =
                    many.iter().filter_map(|p| self.get(*p)).map(|i| i.id.as_str()).collect();
                Err(Error::NotFound(format!(
                    "'{title_or_id}' is ambiguous ({} items: ids {}); query by id instead",
                    many.len(),
                    ids.join(", ")
                )))
            }
        }
    }
}

/// Borrowed view of one sparse row: strictly increasing term indices.
#[derive(Debug, Clone, Copy)]
pub struct SparseRow<'a> {
    pub indices: &'a [u32],
    pub values: &'a [f64],
}

impl SparseRow<'_> {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }
}

/// Sparse TF-IDF matrix (N items x V terms) in compressed row form.
///
/// Row `i` belongs to the item at position `i` of the corpus it was fitted
/// on. Columns follow `vocabulary` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpace {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    row_ptr: Vec<usize>,
    col_idx: Vec<u32>,
    values: Vec<f64>,
}

impl VectorSpace {
    /// Build from per-row `(term, weight)` lists sorted by term index.
    pub fn from_rows(
        vocabulary: Vec<String>,
        idf: Vec<f64>,
        rows: Vec<Vec<(u32, f64)>>,
    ) -> Result<Self> {
        if vocabulary.len() != idf.len() {
            return Err(Error::Schema(format!(
                "vocabulary has {} terms but idf has {} weights",
                vocabulary.len(),
                idf.len()
            )));
        }
        let n_terms = vocabulary.len();
        let nnz = rows.iter().map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        row_ptr.push(0);
        for (r, row) in rows.into_iter().enumerate() {
            let mut last: Option<u32> = None;
            for (term, weight) in row {
                if term as usize >= n_terms || last.is_some_and(|l| l >= term) {
                    return Err(Error::Schema(format!(
                        "row {r}: term index {term} out of order or outside vocabulary of {n_terms}"
                    )));
                }
                last = Some(term);
                col_idx.push(term);
                values.push(weight);
            }
            row_ptr.push(col_idx.len());
        }
        Ok(Self { vocabulary, idf, row_ptr, col_idx, values })
    }

    pub fn n_rows(&self) -> usize {
        self.row_ptr.len().saturating_sub(1)
    }

    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn term_index(&self, term: &str) -> Option<u32> {
        self.vocabulary
            .binary_search_by(|t| t.as_str().cmp(term))
            .ok()
            .and_then(|i| u32::try_from(i).ok())
    }

    pub fn row(&self, position: Position) -> Result<SparseRow<'_>> {
        if position >= self.n_rows() {
            return Err(Error::InvalidPosition { position, len: self.n_rows() });
        }
        let (start, end) = (self.row_ptr[position], self.row_ptr[position + 1]);
        Ok(SparseRow { indices: &self.col_idx[start..end], values: &self.values[start..end] })
    }

    /// Approximate heap footprint in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.vocabulary.iter().map(String::len).sum::<usize>()
            + self.idf.len() * 8
            + self.row_ptr.len() * std::mem::size_of::<usize>()
            + self.col_idx.len() * 4
            + self.values.len() * 8
    }
}

/// Which similarity strategy an index implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FullMatrix,
    OnDemand,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::FullMatrix => f.write_str("full_matrix"),
            StrategyKind::OnDemand => f.write_str("on_demand"),
        }
    }
}

/// A ranked candidate produced by the ranker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub position: Position,
    pub score: f64,
}

/// The public query result: one recommended item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: ItemId,
    pub title: String,
    pub score: f64,
    pub metadata: Meta,
}

impl Recommendation {
    pub fn from_item(item: &Item, score: f64) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            score,
            metadata: item.metadata.clone(),
        }
    }
}
