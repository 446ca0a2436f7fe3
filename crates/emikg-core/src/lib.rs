pub mod annotation;
pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod resolve;
pub mod taxon;
pub mod vocabulary;

pub use annotation::{CountResult, QuantityExtractor, TermNormalizer, UNKNOWN_CATEGORY};
pub use config::{ConfigError, PipelineConfig};
pub use error::{Error, Result};
pub use graph::{GraphFormat, Literal, NamedNode, Term, Triple, TripleBatch};
pub use ingest::{
    is_absent, GraphBatchBuilder, InteractionRecord, PipelineStats, RowIndexCounter,
    StreamingPipeline, Vocabularies,
};
pub use resolve::{DedupTracker, EntityResolver, ResolutionSource, ResolvedEntity};
pub use taxon::TaxonMap;
pub use vocabulary::{VocabularyEntry, VocabularyTable};
