//! Free-text annotation parsing: clause splitting and counted categories.

mod normalizer;
mod quantity;

pub use normalizer::{split_clauses, RuleTag, SubstitutionRule, TermNormalizer};
pub use quantity::{singularize, CountResult, QuantityExtractor, UNKNOWN_CATEGORY};
