use std::io::Read;
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::builder::{BatchStats, GraphBatchBuilder, RowIndexCounter, Vocabularies};
use super::reader::RecordReader;
use super::sink::GraphSink;
use crate::config::{PipelineConfig, DEFAULT_BATCH_SIZE};
use crate::error::Result;
use crate::graph::namespace::STANDARD_BINDINGS;
use crate::graph::GraphFormat;
use crate::resolve::DedupTracker;
use crate::taxon::TaxonMap;
use crate::vocabulary::VocabularyTable;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub batches: usize,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub sides_skipped: usize,
    pub triples_written: usize,
    pub entities_defined: usize,
    pub fallback_resolutions: usize,
    pub unknown_terms: usize,
    /// Uncompressed output size, header included
    pub bytes_written: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

impl PipelineStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_emitted(&self) -> usize {
        self.rows_read - self.rows_skipped
    }

    fn add_batch(&mut self, batch: &BatchStats, triples: usize) {
        self.batches += 1;
        self.rows_read += batch.rows;
        self.rows_skipped += batch.rows_skipped;
        self.sides_skipped += batch.sides_skipped;
        self.triples_written += triples;
        self.entities_defined += batch.entities_defined;
        self.fallback_resolutions += batch.fallback_resolutions;
        self.unknown_terms += batch.unknown_terms;
    }
}

/// Reads records batch by batch, builds each batch's triples, appends them
/// to the output and drops them before reading on.
///
/// The dedup tracker and the row counter outlive the batches; they are all
/// that carries over from one batch to the next.
pub struct StreamingPipeline {
    builder: GraphBatchBuilder,
    tracker: DedupTracker,
    counter: RowIndexCounter,
    batch_size: usize,
    format: GraphFormat,
}

impl StreamingPipeline {
    #[must_use]
    pub fn new(builder: GraphBatchBuilder) -> Self {
        Self {
            builder,
            tracker: DedupTracker::new(),
            counter: RowIndexCounter::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            format: GraphFormat::Turtle,
        }
    }

    /// Loads the taxon map and vocabularies named in `config`, checking
    /// their row counts against `expected_rows`.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        let expected = |path: &Path| config.expected_rows_for(path);

        let taxa = config
            .taxon_map
            .as_deref()
            .map(|path| TaxonMap::load(path, expected(path)))
            .transpose()?;
        if taxa.is_none() {
            tracing::warn!("No taxon map configured; every side with a Wikidata id is kept");
        }

        let load_optional = |path: Option<&Path>| -> Result<VocabularyTable> {
            path.map_or_else(
                || Ok(VocabularyTable::new()),
                |p| VocabularyTable::load(p, expected(p)),
            )
        };

        let vocabularies = Vocabularies {
            body_part: VocabularyTable::load_all(&config.body_part_vocabulary, expected)?,
            life_stage: VocabularyTable::load_all(&config.life_stage_vocabulary, expected)?,
            sex: load_optional(config.sex_vocabulary.as_deref())?,
            interaction_type: load_optional(config.interaction_type_vocabulary.as_deref())?,
        };

        Ok(Self::new(GraphBatchBuilder::new(taxa, vocabularies)?)
            .with_batch_size(config.batch_size)
            .with_format(config.format))
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: GraphFormat) -> Self {
        self.format = format;
        self
    }

    pub fn tracker(&self) -> &DedupTracker {
        &self.tracker
    }

    pub fn counter(&self) -> &RowIndexCounter {
        &self.counter
    }

    pub fn run(&mut self, input: &Path, output: &Path) -> Result<PipelineStats> {
        tracing::info!(
            "Building graph from {} into {} ({}, {} rows per batch)",
            input.display(),
            output.display(),
            self.format,
            self.batch_size
        );
        let reader = RecordReader::open(input)?;
        let mut sink = GraphSink::create(output, self.format, &STANDARD_BINDINGS)?;
        self.run_with(reader, &mut sink)
    }

    /// Streams `reader` into `sink`. Stops at the first error; batches
    /// already appended stay in the output.
    ///
    /// Each call is a fresh run: definitions and record numbering start over.
    pub fn run_with<R: Read>(
        &mut self,
        mut reader: RecordReader<R>,
        sink: &mut GraphSink,
    ) -> Result<PipelineStats> {
        self.tracker = DedupTracker::new();
        self.counter = RowIndexCounter::new();
        let start = Instant::now();
        let mut stats = PipelineStats {
            started_at: Some(Utc::now()),
            ..PipelineStats::new()
        };

        while let Some(records) = reader.next_batch(self.batch_size)? {
            let (batch, batch_stats) = self.builder.build(&records, &mut self.tracker, &mut self.counter);
            drop(records);

            let bytes = sink.append(&batch)?;
            stats.add_batch(&batch_stats, batch.len());
            tracing::info!(
                "Batch {}: {} rows, {} triples, {} bytes",
                stats.batches,
                batch_stats.rows,
                batch.len(),
                bytes
            );
        }

        stats.bytes_written = sink.bytes_written();
        stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            "Wrote {} triples from {} rows ({} skipped) in {} batches",
            stats.triples_written,
            stats.rows_read,
            stats.rows_skipped,
            stats.batches
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::error::Error;

    const HEADER: &str = "source_WD\tsourceTaxonName\ttarget_WD\ttargetTaxonName\n";

    #[test]
    fn test_pipeline_stats() {
        let mut stats = PipelineStats::new();
        let batch = BatchStats {
            rows: 10,
            rows_skipped: 3,
            sides_skipped: 4,
            ..Default::default()
        };
        stats.add_batch(&batch, 40);
        stats.add_batch(&batch, 2);

        assert_eq!(stats.batches, 2);
        assert_eq!(stats.rows_read, 20);
        assert_eq!(stats.rows_emitted(), 14);
        assert_eq!(stats.triples_written, 42);
    }

    #[test]
    fn test_run_with_reader() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = dir.path().join("out.ttl");
        let input = format!("{HEADER}Q1\tA\tQ2\tB\nQ3\tC\t\t\n\t\t\t\n");

        let builder = GraphBatchBuilder::new(None, Vocabularies::default()).unwrap();
        let mut pipeline = StreamingPipeline::new(builder).with_batch_size(2);
        let reader = RecordReader::from_reader(input.as_bytes(), Path::new("in.tsv")).unwrap();
        let mut sink = GraphSink::create(&output, GraphFormat::Turtle, &STANDARD_BINDINGS).unwrap();

        let stats = pipeline.run_with(reader, &mut sink).unwrap();

        assert_eq!(stats.batches, 2);
        assert_eq!(stats.rows_read, 3);
        assert_eq!(stats.rows_skipped, 1);
        assert_eq!(stats.sides_skipped, 3);
        assert_eq!(pipeline.counter().issued(), 3);

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.contains(":inRec1 emi:hasSource :inRec1-source"));
        assert!(!text.contains(":inRec2 "));
    }

    #[test]
    fn test_second_run_starts_over() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("records.tsv");
        let output = dir.path().join("out.nt");
        std::fs::write(&input, format!("{HEADER}Q1\tA\tQ2\tB\n")).unwrap();

        let builder = GraphBatchBuilder::new(None, Vocabularies::default()).unwrap();
        let mut pipeline = StreamingPipeline::new(builder).with_format(GraphFormat::NTriples);

        let first_stats = pipeline.run(&input, &output).unwrap();
        let first = std::fs::read_to_string(&output).unwrap();
        let second_stats = pipeline.run(&input, &output).unwrap();
        let second = std::fs::read_to_string(&output).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_stats.entities_defined, second_stats.entities_defined);
        assert!(second.contains("<https://purl.org/emi/abox#ORGANISM-A> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type>"));
        assert!(second.starts_with("<https://purl.org/emi/abox#inRec0"));
        assert_eq!(pipeline.counter().issued(), 1);
    }

    #[test]
    fn test_from_config_checks_row_counts() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("records.tsv");
        let sexes = dir.path().join("sex.csv");
        std::fs::write(&input, HEADER).unwrap();
        std::fs::write(&sexes, "InputTerm,BestMatch\nmale,Male\n").unwrap();

        let config = PipelineConfig {
            input,
            output: dir.path().join("out.ttl"),
            sex_vocabulary: Some(sexes.clone()),
            expected_rows: [(sexes, 5)].into_iter().collect(),
            ..Default::default()
        };

        let err = StreamingPipeline::from_config(&config).err().unwrap();
        assert!(matches!(err, Error::RowCountMismatch { expected: 5, actual: 1, .. }));
    }

    #[test]
    fn test_from_config_validates() {
        let err = StreamingPipeline::from_config(&PipelineConfig::default()).err().unwrap();
        assert!(matches!(err, Error::Config(ConfigError::MissingPath("input"))));
    }
}
