use std::path::Path;

use csv::StringRecord;

use crate::error::{Error, Result};

/// Spellings of a missing value written by spreadsheet and dataframe tools.
const MISSING_TOKENS: &[&str] = &[
    "na", "n/a", "nan", "null", "none", "nat", "<na>", "#n/a", "#na", "-nan", "-1.#ind",
    "1.#qnan", "1.#ind", "-1.#qnan",
];

const UNMATCHED_TOKENS: &[&str] = &["no:match", "no match", "no name"];

/// True for `None`, blank text, and missing-value markers such as `NA` or `NaN`.
#[must_use]
pub fn is_absent(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") => true,
        Some(v) => MISSING_TOKENS.iter().any(|t| v.eq_ignore_ascii_case(t)),
    }
}

/// True for the placeholders upstream matching writes when it found nothing.
#[must_use]
pub fn is_unmatched(value: &str) -> bool {
    let value = value.trim();
    UNMATCHED_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t))
}

#[must_use]
pub fn has_value(value: Option<&str>) -> bool {
    !is_absent(value) && value.is_some_and(|v| !is_unmatched(v))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Side {
    pub const BOTH: [Self; 2] = [Self::Source, Self::Target];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// Per-side fields of one interaction record. Only meaningful values are
/// kept; absent and unmatched cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideRecord {
    pub taxon_id: Option<String>,
    pub taxon_name: Option<String>,
    /// Wikidata identifier of the taxon
    pub wikidata_id: Option<String>,
    pub body_part_name: Option<String>,
    pub body_part_id: Option<String>,
    pub life_stage_name: Option<String>,
    pub life_stage_id: Option<String>,
    pub sex_name: Option<String>,
    pub physiological_state_name: Option<String>,
}

/// One row of the interaction table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionRecord {
    pub source: SideRecord,
    pub target: SideRecord,
    pub interaction_type_name: Option<String>,
    pub interaction_type_id: Option<String>,
    pub locality_name: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub event_date: Option<String>,
    pub reference_doi: Option<String>,
    pub source_doi: Option<String>,
    pub reference_citation: Option<String>,
}

impl InteractionRecord {
    #[must_use]
    pub fn side(&self, side: Side) -> &SideRecord {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Citation literals in output order.
    pub fn citations(&self) -> impl Iterator<Item = &str> {
        [&self.reference_doi, &self.source_doi, &self.reference_citation]
            .into_iter()
            .filter_map(|v| v.as_deref())
    }
}

#[derive(Debug, Clone, Default)]
struct SideColumns {
    taxon_id: Option<usize>,
    taxon_name: Option<usize>,
    wikidata_id: Option<usize>,
    body_part_name: Option<usize>,
    body_part_id: Option<usize>,
    life_stage_name: Option<usize>,
    life_stage_id: Option<usize>,
    sex_name: Option<usize>,
    physiological_state_name: Option<usize>,
}

/// Column positions resolved from the header row. Header order is free and
/// names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    source: SideColumns,
    target: SideColumns,
    interaction_type_name: Option<usize>,
    interaction_type_id: Option<usize>,
    locality_name: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    event_date: Option<usize>,
    reference_doi: Option<usize>,
    source_doi: Option<usize>,
    reference_citation: Option<usize>,
}

fn position(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn cell(record: &StringRecord, idx: Option<usize>) -> Option<String> {
    let value = idx.and_then(|i| record.get(i));
    has_value(value).then(|| value.unwrap_or_default().trim().to_string())
}

impl SideColumns {
    fn from_headers(headers: &StringRecord, side: Side) -> Self {
        let s = side.as_str();
        let col = |suffixes: &[&str]| {
            let names: Vec<String> = suffixes.iter().map(|suffix| format!("{s}{suffix}")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            position(headers, &names)
        };
        Self {
            taxon_id: col(&["TaxonId"]),
            taxon_name: col(&["TaxonName"]),
            wikidata_id: col(&["_WD"]),
            body_part_name: col(&["BodyPartName"]),
            body_part_id: col(&["BodyPartId"]),
            life_stage_name: col(&["LifeStageName"]),
            life_stage_id: col(&["LifeStageId"]),
            sex_name: col(&["SexName"]),
            physiological_state_name: col(&["PhysiologicalStateName", "PhysiologicalStageName"]),
        }
    }

    fn read(&self, record: &StringRecord) -> SideRecord {
        SideRecord {
            taxon_id: cell(record, self.taxon_id),
            taxon_name: cell(record, self.taxon_name),
            wikidata_id: cell(record, self.wikidata_id),
            body_part_name: cell(record, self.body_part_name),
            body_part_id: cell(record, self.body_part_id),
            life_stage_name: cell(record, self.life_stage_name),
            life_stage_id: cell(record, self.life_stage_id),
            sex_name: cell(record, self.sex_name),
            physiological_state_name: cell(record, self.physiological_state_name),
        }
    }

    fn identifies_taxon(&self) -> bool {
        self.wikidata_id.is_some() || self.taxon_id.is_some() || self.taxon_name.is_some()
    }
}

impl ColumnSchema {
    /// Fails when either side has no column that could identify its taxon.
    pub fn from_headers(headers: &StringRecord, origin: &Path) -> Result<Self> {
        let schema = Self {
            source: SideColumns::from_headers(headers, Side::Source),
            target: SideColumns::from_headers(headers, Side::Target),
            interaction_type_name: position(headers, &["interactionTypeName"]),
            interaction_type_id: position(headers, &["interactionTypeId"]),
            locality_name: position(headers, &["localityName"]),
            latitude: position(headers, &["decimalLatitude"]),
            longitude: position(headers, &["decimalLongitude"]),
            event_date: position(headers, &["eventDate"]),
            reference_doi: position(headers, &["referenceDoi"]),
            source_doi: position(headers, &["sourceDoi"]),
            reference_citation: position(headers, &["referenceCitation"]),
        };

        for side in Side::BOTH {
            if !schema.side(side).identifies_taxon() {
                return Err(Error::MissingColumn {
                    file: origin.to_path_buf(),
                    column: format!("{}_WD", side.as_str()),
                });
            }
        }
        Ok(schema)
    }

    fn side(&self, side: Side) -> &SideColumns {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    #[must_use]
    pub fn read(&self, record: &StringRecord) -> InteractionRecord {
        InteractionRecord {
            source: self.source.read(record),
            target: self.target.read(record),
            interaction_type_name: cell(record, self.interaction_type_name),
            interaction_type_id: cell(record, self.interaction_type_id),
            locality_name: cell(record, self.locality_name),
            latitude: cell(record, self.latitude),
            longitude: cell(record, self.longitude),
            event_date: cell(record, self.event_date),
            reference_doi: cell(record, self.reference_doi),
            source_doi: cell(record, self.source_doi),
            reference_citation: cell(record, self.reference_citation),
        }
    }
}
