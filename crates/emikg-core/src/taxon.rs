//! Taxon mapping table: the set of taxa the graph is restricted to, keyed by
//! Wikidata identifier and by name.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::namespace::WD;
use crate::graph::NamedNode;
use crate::ingest::{has_value, open_input};

const ID_COLUMNS: [&str; 3] = ["wd_taxon_id", "WdID", "id"];
const NAME_COLUMNS: [&str; 3] = ["WdName", "name", "taxon_name"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonEntry {
    /// Bare Wikidata identifier, e.g. `Q30034`
    pub id: String,
    pub name: Option<String>,
}

impl TaxonEntry {
    #[must_use]
    pub fn iri(&self) -> NamedNode {
        WD.iri(&self.id)
    }
}

/// A taxon matched against the table for one side of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTaxon {
    pub iri: NamedNode,
    pub id: String,
    /// The record's own name when present, else the table's, else the identifier
    pub preferred_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaxonMap {
    entries: Vec<TaxonEntry>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

fn bare_id(raw: &str) -> &str {
    let raw = raw.trim();
    WD.strip(raw).unwrap_or(raw)
}

impl TaxonMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers are unique (last wins); for names the first entry wins.
    pub fn insert(&mut self, id: &str, name: Option<&str>) {
        let id = bare_id(id);
        if !has_value(Some(id)) {
            return;
        }
        let name = name.filter(|n| has_value(Some(*n))).map(|n| n.trim().to_string());
        let idx = self.entries.len();
        if let Some(name) = &name {
            self.by_name.entry(name.clone()).or_insert(idx);
        }
        self.by_id.insert(id.to_string(), idx);
        self.entries.push(TaxonEntry {
            id: id.to_string(),
            name,
        });
    }

    #[must_use]
    pub fn with_taxon(mut self, id: &str, name: Option<&str>) -> Self {
        self.insert(id, name);
        self
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Identifier lookup first, then exact name.
    #[must_use]
    pub fn lookup(&self, id: Option<&str>, name: Option<&str>) -> Option<&TaxonEntry> {
        let by_id = id
            .filter(|i| has_value(Some(*i)))
            .and_then(|i| self.by_id.get(bare_id(i)));
        let by_name = || {
            name.filter(|n| has_value(Some(*n)))
                .and_then(|n| self.by_name.get(n.trim()))
        };
        by_id.or_else(by_name).map(|&idx| &self.entries[idx])
    }

    #[must_use]
    pub fn resolve(&self, id: Option<&str>, name: Option<&str>) -> Option<ResolvedTaxon> {
        let entry = self.lookup(id, name)?;
        let preferred_name = name
            .filter(|n| has_value(Some(*n)))
            .map(str::trim)
            .or(entry.name.as_deref())
            .unwrap_or(&entry.id)
            .to_string();
        Some(ResolvedTaxon {
            iri: entry.iri(),
            id: entry.id.clone(),
            preferred_name,
        })
    }

    pub fn load(path: &Path, expected_rows: Option<usize>) -> Result<Self> {
        let (map, rows) = Self::from_reader(open_input(path)?, path)?;
        if let Some(expected) = expected_rows {
            if expected != rows {
                tracing::error!(
                    "Taxon map {} has {} rows, expected {}",
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
        tracing::info!("Loaded taxon map {} ({} taxa)", path.display(), map.len());
        Ok(map)
    }

    /// Reads tab-separated rows. Returns the map and the data row count.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<(Self, usize)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };
        let id_idx = find(&ID_COLUMNS).ok_or_else(|| Error::MissingColumn {
            file: origin.to_path_buf(),
            column: ID_COLUMNS[0].to_string(),
        })?;
        let name_idx = find(&NAME_COLUMNS);

        let mut map = Self::new();
        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            rows += 1;
            if let Some(id) = record.get(id_idx) {
                map.insert(id, name_idx.and_then(|i| record.get(i)));
            }
        }
        Ok((map, rows))
    }
}
