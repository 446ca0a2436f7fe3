mod dedup;
mod entity;
mod matcher;

pub use dedup::DedupTracker;
pub use entity::{EntityResolver, ResolutionSource, ResolvedEntity, ONTOLOGY_PREFIXES};
pub use matcher::{
    ExactLabelMatcher, FuzzyLabelMatcher, MatchStrategy, OntologyTerm, TermMatch, TermMatcher,
};
