//! Controlled-vocabulary tables mapping raw input terms to canonical labels
//! and, when known, ontology IRIs.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::NamedNode;

const KEY_COLUMNS: [&str; 2] = ["InputTerm", "input"];
const LABEL_COLUMNS: [&str; 2] = ["BestMatch", "output"];
const URI_COLUMN: &str = "URI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub label: String,
    pub uri: Option<NamedNode>,
}

/// Case-insensitive term table. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default)]
pub struct VocabularyTable {
    entries: HashMap<String, VocabularyEntry>,
    /// Canonical label to the IRI some entry with that label carries
    label_uris: HashMap<String, NamedNode>,
}

impl VocabularyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(term: &str) -> String {
        term.trim().to_lowercase()
    }

    /// Blank labels are ignored; a blank URI makes a label-only entry.
    pub fn insert(&mut self, term: &str, label: &str, uri: Option<&str>) {
        let label = label.trim();
        if label.is_empty() || term.trim().is_empty() {
            return;
        }
        let uri = uri
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .and_then(|u| match NamedNode::new(u) {
                Ok(iri) => Some(iri),
                Err(e) => {
                    tracing::warn!("Ignoring invalid IRI {:?} for term {:?}: {}", u, term, e);
                    None
                }
            });
        self.insert_entry(
            Self::key(term),
            VocabularyEntry {
                label: label.to_string(),
                uri,
            },
        );
    }

    fn insert_entry(&mut self, key: String, entry: VocabularyEntry) {
        let label = entry.label.clone();
        let uri = entry.uri.clone();
        if let Some(old) = self.entries.insert(key, entry).filter(|old| old.uri.is_some()) {
            self.reindex_label(&old.label);
        }
        if let Some(uri) = uri {
            self.label_uris.insert(label, uri);
        }
    }

    /// Recomputes the IRI for `label` after the entry that supplied it was replaced.
    fn reindex_label(&mut self, label: &str) {
        let uri = self
            .entries
            .values()
            .filter(|e| e.label == label)
            .find_map(|e| e.uri.clone());
        match uri {
            Some(uri) => {
                self.label_uris.insert(label.to_string(), uri);
            }
            None => {
                self.label_uris.remove(label);
            }
        }
    }

    #[must_use]
    pub fn with_entry(mut self, term: &str, label: &str, uri: Option<&str>) -> Self {
        self.insert(term, label, uri);
        self
    }

    #[must_use]
    pub fn get(&self, term: &str) -> Option<&VocabularyEntry> {
        self.entries.get(&Self::key(term))
    }

    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(&Self::key(term))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct canonical labels, sorted.
    pub fn labels(&self) -> BTreeSet<&str> {
        self.entries.values().map(|e| e.label.as_str()).collect()
    }

    /// Canonical IRI recorded for a label, if any entry carrying that label has one.
    #[must_use]
    pub fn uri_for_label(&self, label: &str) -> Option<&NamedNode> {
        self.label_uris.get(label)
    }

    pub fn merge(&mut self, other: Self) {
        for (key, entry) in other.entries {
            self.insert_entry(key, entry);
        }
    }

    /// Loads a table, failing when `expected_rows` is given and the file holds
    /// a different number of data rows.
    pub fn load(path: &Path, expected_rows: Option<usize>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let (table, rows) = Self::parse(&text, path)?;

        if let Some(expected) = expected_rows {
            if expected != rows {
                tracing::error!(
                    "Vocabulary {} has {} rows, expected {}",
                    path.display(),
                    rows,
                    expected
                );
                return Err(Error::RowCountMismatch {
                    file: path.to_path_buf(),
                    expected,
                    actual: rows,
                });
            }
        }

        tracing::info!(
            "Loaded vocabulary {} ({} entries from {} rows)",
            path.display(),
            table.len(),
            rows
        );
        Ok(table)
    }

    /// Loads and merges several files in order.
    pub fn load_all<F>(paths: &[impl AsRef<Path>], expected_rows: F) -> Result<Self>
    where
        F: Fn(&Path) -> Option<usize>,
    {
        let mut merged = Self::new();
        for path in paths {
            let path = path.as_ref();
            merged.merge(Self::load(path, expected_rows(path))?);
        }
        Ok(merged)
    }

    /// Parses delimited text. Tab-delimited when the header line holds a tab,
    /// comma-delimited otherwise. Returns the table and the data row count.
    pub fn parse(text: &str, origin: &Path) -> Result<(Self, usize)> {
        let header_line = text.lines().next().unwrap_or_default();
        let tabbed = header_line.contains('\t');

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(if tabbed { b'\t' } else { b',' })
            .quoting(!tabbed)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let missing = |column: &str| Error::MissingColumn {
            file: origin.to_path_buf(),
            column: column.to_string(),
        };

        let key_idx = find(&KEY_COLUMNS).ok_or_else(|| missing(KEY_COLUMNS[0]))?;
        let label_idx = find(&LABEL_COLUMNS).ok_or_else(|| missing(LABEL_COLUMNS[0]))?;
        let uri_idx = find(&[URI_COLUMN]);

        let mut table = Self::new();
        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            rows += 1;
            let (Some(term), Some(label)) = (record.get(key_idx), record.get(label_idx)) else {
                tracing::debug!("Short vocabulary row {} in {}", rows, origin.display());
                continue;
            };
            table.insert(term, label, uri_idx.and_then(|i| record.get(i)));
        }

        Ok((table, rows))
    }

    /// Writes the table as `InputTerm,BestMatch,URI`, sorted by term.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["InputTerm", "BestMatch", "URI"])?;

        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        for key in keys {
            let entry = &self.entries[key];
            out.write_record([
                key.as_str(),
                entry.label.as_str(),
                entry.uri.as_ref().map_or("", NamedNode::as_str),
            ])?;
        }
        out.flush()?;
        Ok(())
    }
}
