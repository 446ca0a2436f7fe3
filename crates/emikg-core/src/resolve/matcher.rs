//! Offline term matching used to pre-populate vocabulary files from the
//! distinct raw values found in the records.

use crate::graph::NamedNode;
use crate::vocabulary::VocabularyTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    ExactMatch,
    FuzzyMatch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    pub label: String,
    pub uri: Option<NamedNode>,
    /// Similarity in `[0, 1]`
    pub score: f64,
}

/// Given a raw term, returns the best ontology label for it.
pub trait TermMatcher: Send + Sync {
    fn strategy(&self) -> MatchStrategy;

    fn best_match(&self, term: &str) -> Option<TermMatch>;
}

/// A reference ontology term a matcher can choose from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OntologyTerm {
    pub label: String,
    pub uri: Option<NamedNode>,
}

impl OntologyTerm {
    /// A `uri` that is not a valid IRI is dropped.
    #[must_use]
    pub fn new(label: impl Into<String>, uri: Option<&str>) -> Self {
        Self {
            label: label.into(),
            uri: uri.and_then(|u| NamedNode::new(u.trim()).ok()),
        }
    }
}

pub struct ExactLabelMatcher {
    terms: Vec<OntologyTerm>,
}

impl ExactLabelMatcher {
    #[must_use]
    pub fn new(terms: Vec<OntologyTerm>) -> Self {
        Self { terms }
    }
}

impl TermMatcher for ExactLabelMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::ExactMatch
    }

    fn best_match(&self, term: &str) -> Option<TermMatch> {
        let term = term.trim().to_lowercase();
        self.terms
            .iter()
            .find(|t| t.label.to_lowercase() == term)
            .map(|t| TermMatch {
                label: t.label.clone(),
                uri: t.uri.clone(),
                score: 1.0,
            })
    }
}

/// Normalized Levenshtein similarity over lowercased labels.
pub struct FuzzyLabelMatcher {
    terms: Vec<OntologyTerm>,
    threshold: f64,
}

impl FuzzyLabelMatcher {
    #[must_use]
    pub fn new(terms: Vec<OntologyTerm>, threshold: f64) -> Self {
        Self { terms, threshold }
    }

    #[must_use]
    pub fn similarity(a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
    }
}

impl TermMatcher for FuzzyLabelMatcher {
    fn strategy(&self) -> MatchStrategy {
        MatchStrategy::FuzzyMatch
    }

    fn best_match(&self, term: &str) -> Option<TermMatch> {
        let mut best: Option<(&OntologyTerm, f64)> = None;

        for candidate in &self.terms {
            let score = Self::similarity(term, &candidate.label);
            if score < self.threshold {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((candidate, score));
            }
        }

        best.map(|(t, score)| TermMatch {
            label: t.label.clone(),
            uri: t.uri.clone(),
            score,
        })
    }
}

impl VocabularyTable {
    /// Builds a table by matching each raw term. Terms with no match are
    /// left out.
    pub fn from_matches<'a, I>(terms: I, matcher: &dyn TermMatcher) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut table = Self::new();
        let mut unmatched = 0usize;
        for term in terms {
            match matcher.best_match(term) {
                Some(m) => table.insert(term, &m.label, m.uri.as_ref().map(NamedNode::as_str)),
                None => unmatched += 1,
            }
        }
        tracing::info!(
            "Matched {} terms ({:?}), {} without a match",
            table.len(),
            matcher.strategy(),
            unmatched
        );
        table
    }
}
