use crate::annotation::{QuantityExtractor, UNKNOWN_CATEGORY};
use crate::error::Result;
use crate::graph::namespace::{ABOX, EMI, OBO, WD};
use crate::graph::{
    blank_node, integer_literal, numeric_or_string, string_literal, NamedNode, TripleBatch, Vocab,
};
use crate::resolve::{DedupTracker, EntityResolver, ResolutionSource};
use crate::taxon::{ResolvedTaxon, TaxonMap};
use crate::vocabulary::VocabularyTable;

use super::record::{InteractionRecord, Side, SideRecord};

const ANATOMICAL_ENTITY: &str = "ANATOMICAL_ENTITY";
const DEVELOPMENTAL_STAGE: &str = "DEVELOPMENTAL_STAGE";
const BIOLOGICAL_SEX: &str = "BIOLOGICAL_SEX";

/// Hands out the `N` in `:inRecN`. Never reused within a run.
#[derive(Debug, Clone, Default)]
pub struct RowIndexCounter {
    next: u64,
}

impl RowIndexCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next_index(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Number of indices handed out so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next
    }
}

/// Lookup tables for annotated fields. Any of them may be empty.
#[derive(Debug, Clone, Default)]
pub struct Vocabularies {
    pub body_part: VocabularyTable,
    pub life_stage: VocabularyTable,
    pub sex: VocabularyTable,
    pub interaction_type: VocabularyTable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub rows: usize,
    pub rows_skipped: usize,
    pub sides_skipped: usize,
    pub entities_defined: usize,
    pub fallback_resolutions: usize,
    pub unknown_terms: usize,
    pub inverse_triples: usize,
}

/// Turns a batch of records into triples.
///
/// Run-scoped state (`DedupTracker`, `RowIndexCounter`) is passed in so
/// that definitions and record indices stay unique across batches.
pub struct GraphBatchBuilder {
    vocab: Vocab,
    resolver: EntityResolver,
    quantities: QuantityExtractor,
    /// `None` accepts every side that carries a Wikidata identifier
    taxa: Option<TaxonMap>,
    vocabularies: Vocabularies,
}

impl GraphBatchBuilder {
    pub fn new(taxa: Option<TaxonMap>, vocabularies: Vocabularies) -> Result<Self> {
        Ok(Self {
            vocab: Vocab::new(),
            resolver: EntityResolver::default(),
            quantities: QuantityExtractor::new()?,
            taxa,
            vocabularies,
        })
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: EntityResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn build(
        &self,
        records: &[InteractionRecord],
        tracker: &mut DedupTracker,
        counter: &mut RowIndexCounter,
    ) -> (TripleBatch, BatchStats) {
        let mut batch = TripleBatch::new();
        let mut stats = BatchStats::default();

        for record in records {
            let index = counter.next_index();
            stats.rows += 1;
            let mut row = RowContext {
                index,
                batch: &mut batch,
                tracker: &mut *tracker,
                stats: &mut stats,
            };
            self.add_record(record, &mut row);
        }

        stats.inverse_triples = batch.add_inverse_relations();
        (batch, stats)
    }

    fn resolve_taxon(&self, side: &SideRecord) -> Option<ResolvedTaxon> {
        let id = side.wikidata_id.as_deref();
        let name = side.taxon_name.as_deref();
        match &self.taxa {
            Some(taxa) => taxa.resolve(id, name),
            None => {
                let id = id?;
                let bare = WD.strip(id).unwrap_or(id);
                Some(ResolvedTaxon {
                    iri: WD.iri(bare),
                    id: bare.to_string(),
                    preferred_name: name.unwrap_or(bare).to_string(),
                })
            }
        }
    }

    fn add_record(&self, record: &InteractionRecord, row: &mut RowContext<'_>) {
        let sides: Vec<(Side, ResolvedTaxon)> = Side::BOTH
            .into_iter()
            .filter_map(|side| {
                let resolved = self.resolve_taxon(record.side(side));
                if resolved.is_none() {
                    let s = record.side(side);
                    tracing::debug!(
                        "inRec{}: {} taxon {:?} / {:?} not in taxon map",
                        row.index,
                        side.as_str(),
                        s.wikidata_id,
                        s.taxon_name
                    );
                    row.stats.sides_skipped += 1;
                }
                resolved.map(|taxon| (side, taxon))
            })
            .collect();

        if sides.is_empty() {
            row.stats.rows_skipped += 1;
            return;
        }

        let subject = ABOX.iri(&format!("inRec{}", row.index));
        for (side, taxon) in &sides {
            let sample = self.add_sample(record.side(*side), *side, taxon, row);
            let predicate = match side {
                Side::Source => &self.vocab.has_source,
                Side::Target => &self.vocab.has_target,
            };
            row.batch.add(subject.clone(), predicate, sample);
        }

        self.add_interaction_type(record, &subject, row);
        self.add_record_literals(record, &subject, row);
    }

    fn add_sample(
        &self,
        side_record: &SideRecord,
        side: Side,
        taxon: &ResolvedTaxon,
        row: &mut RowContext<'_>,
    ) -> NamedNode {
        let v = &self.vocab;
        let sample = ABOX.iri(&format!("inRec{}-{}", row.index, side.as_str()));
        let organism = ABOX.iri(&format!("ORGANISM-{}", taxon.preferred_name));

        row.batch.add(sample.clone(), &v.rdf_type, v.sample.clone());
        row.batch.add(sample.clone(), &v.rdfs_label, string_literal(&taxon.preferred_name));
        row.batch.add(sample.clone(), &v.is_sample_of, organism.clone());

        if row.define(&organism) {
            row.batch.add(organism.clone(), &v.rdf_type, v.organism.clone());
            row.batch.add(organism.clone(), &v.rdfs_label, string_literal(&taxon.preferred_name));
            row.batch.add(organism, &v.in_taxon, taxon.iri.clone());
        }
        if row.define(&taxon.iri) {
            row.batch.add(taxon.iri.clone(), &v.rdf_type, v.taxon.clone());
        }

        let annotated = [
            (
                side_record.body_part_name.as_deref(),
                side_record.body_part_id.as_deref(),
                ANATOMICAL_ENTITY,
                &self.vocabularies.body_part,
                &v.has_anatomical_entity,
                &v.anatomical_entity,
            ),
            (
                side_record.life_stage_name.as_deref(),
                side_record.life_stage_id.as_deref(),
                DEVELOPMENTAL_STAGE,
                &self.vocabularies.life_stage,
                &v.has_developmental_stage,
                &v.developmental_stage,
            ),
        ];
        for (name, id, category, vocabulary, predicate, class) in annotated {
            let Some(entity) = self
                .resolver
                .resolve(name, id, category, vocabulary, row.tracker)
            else {
                continue;
            };
            tracing::trace!(
                "inRec{}: {} {} resolved by {}",
                row.index,
                category,
                entity.uri,
                entity.source.as_str()
            );
            if entity.source == ResolutionSource::Fallback {
                row.stats.fallback_resolutions += 1;
            }
            row.batch.add(sample.clone(), predicate, entity.uri.clone());
            if entity.is_newly_defined {
                row.stats.entities_defined += 1;
                row.batch.add(entity.uri.clone(), &v.rdf_type, class.clone());
                row.batch.add(entity.uri, &v.rdfs_label, string_literal(entity.label));
            }
        }

        if let Some(state) = &side_record.physiological_state_name {
            row.batch.add(sample.clone(), &v.has_physiological_stage, string_literal(state));
        }

        if let Some(sex) = &side_record.sex_name {
            self.add_sex_counts(sex, &sample, side, row);
        }

        sample
    }

    /// One quantified node per nonzero category.
    fn add_sex_counts(&self, annotation: &str, sample: &NamedNode, side: Side, row: &mut RowContext<'_>) {
        let v = &self.vocab;
        let counts = self.quantities.extract(annotation, &self.vocabularies.sex);

        for (i, (category, count)) in counts.iter().enumerate() {
            if category == UNKNOWN_CATEGORY {
                row.stats.unknown_terms += 1;
            }
            let category_iri = self
                .vocabularies
                .sex
                .uri_for_label(category)
                .cloned()
                .unwrap_or_else(|| ABOX.iri(&format!("{BIOLOGICAL_SEX}-{category}")));

            let node = blank_node(&format!("inRec{}_{}_sex{i}", row.index, side.as_str()));
            row.batch.add(sample.clone(), &v.has_sex, node.clone());
            row.batch.add(node.clone(), &v.rdf_type, category_iri.clone());
            row.batch.add(node, &v.rdf_value, integer_literal(count));

            if row.define(&category_iri) {
                row.batch.add(category_iri.clone(), &v.rdf_type, v.biological_sex.clone());
                row.batch.add(category_iri, &v.rdfs_label, string_literal(category));
            }
        }
    }

    /// The vocabulary/name IRI and the identifier IRI are both attached when
    /// both are present.
    fn add_interaction_type(&self, record: &InteractionRecord, subject: &NamedNode, row: &mut RowContext<'_>) {
        let name = record.interaction_type_name.as_deref();
        let id = record.interaction_type_id.as_deref();

        if let Some(name) = name {
            let (iri, label) = match self.vocabularies.interaction_type.get(name) {
                Some(entry) => (
                    entry.uri.clone().unwrap_or_else(|| EMI.iri(&entry.label)),
                    entry.label.clone(),
                ),
                None => (EMI.iri(name), name.to_string()),
            };
            self.add_interaction_type_iri(subject, &iri, &label, row);
        }

        if let Some(id) = id {
            let iri = self
                .resolver
                .identifier_iri(id)
                .map_or_else(|| OBO.iri(&id.replace(':', "_")), |(iri, _)| iri);
            self.add_interaction_type_iri(subject, &iri, name.unwrap_or(id), row);
        }
    }

    fn add_interaction_type_iri(&self, subject: &NamedNode, iri: &NamedNode, label: &str, row: &mut RowContext<'_>) {
        let v = &self.vocab;
        row.batch.add(subject.clone(), &v.has_interaction_type, iri.clone());
        if row.define(iri) {
            row.batch.add(iri.clone(), &v.rdf_type, v.interaction_type.clone());
            row.batch.add(iri.clone(), &v.rdfs_label, string_literal(label));
        }
    }

    fn add_record_literals(&self, record: &InteractionRecord, subject: &NamedNode, row: &mut RowContext<'_>) {
        let v = &self.vocab;
        if let Some(locality) = &record.locality_name {
            row.batch.add(subject.clone(), &v.at_location, string_literal(locality));
        }
        for citation in record.citations() {
            row.batch.add(subject.clone(), &v.citation, string_literal(citation));
        }
        if let Some(date) = &record.event_date {
            row.batch.add(subject.clone(), &v.date, string_literal(date));
        }
        if let Some(lat) = &record.latitude {
            row.batch.add(subject.clone(), &v.lat, numeric_or_string(lat));
        }
        if let Some(long) = &record.longitude {
            row.batch.add(subject.clone(), &v.long, numeric_or_string(long));
        }
    }
}

/// Mutable state threaded through the processing of one row.
struct RowContext<'a> {
    index: u64,
    batch: &'a mut TripleBatch,
    tracker: &'a mut DedupTracker,
    stats: &'a mut BatchStats,
}

impl RowContext<'_> {
    fn define(&mut self, iri: &NamedNode) -> bool {
        let new = self.tracker.mark_defined(iri);
        if new {
            self.stats.entities_defined += 1;
        }
        new
    }
}
