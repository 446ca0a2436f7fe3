use std::collections::HashSet;

use oxrdf::{NamedNode, Subject, Term, Triple};

use super::namespace::{Namespace, STANDARD_BINDINGS};

/// Registered inverse predicates. Symmetric pairs are listed in both directions.
const INVERSE_RELATIONS: &[(&str, &str)] = &[
    ("http://purl.org/dc/terms/isPartOf", "http://purl.org/dc/terms/hasPart"),
    ("http://purl.org/dc/terms/hasFormat", "http://purl.org/dc/terms/isFormatOf"),
    ("http://purl.org/dc/terms/hasVersion", "http://purl.org/dc/terms/isVersionOf"),
    ("http://purl.org/dc/terms/references", "http://purl.org/dc/terms/isReferencedBy"),
    ("http://purl.org/dc/terms/replaces", "http://purl.org/dc/terms/isReplacedBy"),
    ("http://purl.org/dc/terms/requires", "http://purl.org/dc/terms/isRequiredBy"),
    ("http://www.w3.org/ns/sosa/isActedOnBy", "http://www.w3.org/ns/sosa/actsOnProperty"),
    ("http://www.w3.org/ns/sosa/actsOnProperty", "http://www.w3.org/ns/sosa/isActedOnBy"),
    (
        "http://www.w3.org/ns/sosa/isFeatureOfInterestOf",
        "http://www.w3.org/ns/sosa/hasFeatureOfInterest",
    ),
    (
        "http://www.w3.org/ns/sosa/hasFeatureOfInterest",
        "http://www.w3.org/ns/sosa/isFeatureOfInterestOf",
    ),
    ("http://www.w3.org/ns/sosa/isResultOf", "http://www.w3.org/ns/sosa/hasResult"),
    ("http://www.w3.org/ns/sosa/hasResult", "http://www.w3.org/ns/sosa/isResultOf"),
    ("http://www.w3.org/ns/sosa/isSampleOf", "http://www.w3.org/ns/sosa/hasSample"),
    ("http://www.w3.org/ns/sosa/hasSample", "http://www.w3.org/ns/sosa/isSampleOf"),
    ("http://www.w3.org/ns/sosa/isHostedBy", "http://www.w3.org/ns/sosa/hosts"),
    ("http://www.w3.org/ns/sosa/hosts", "http://www.w3.org/ns/sosa/isHostedBy"),
    ("http://www.w3.org/ns/sosa/observes", "http://www.w3.org/ns/sosa/isObservedBy"),
    ("http://www.w3.org/ns/sosa/isObservedBy", "http://www.w3.org/ns/sosa/observes"),
    ("http://www.w3.org/ns/sosa/madeByActuator", "http://www.w3.org/ns/sosa/madeActuation"),
    ("http://www.w3.org/ns/sosa/madeActuation", "http://www.w3.org/ns/sosa/madeByActuator"),
    ("http://www.w3.org/ns/sosa/madeSampling", "http://www.w3.org/ns/sosa/madeBySampler"),
    ("http://www.w3.org/ns/sosa/madeBySampler", "http://www.w3.org/ns/sosa/madeSampling"),
    ("http://www.w3.org/ns/sosa/madeObservation", "http://www.w3.org/ns/sosa/madeBySensor"),
    ("http://www.w3.org/ns/sosa/madeBySensor", "http://www.w3.org/ns/sosa/madeObservation"),
];

#[must_use]
pub fn inverse_of(predicate: &str) -> Option<&'static str> {
    INVERSE_RELATIONS
        .iter()
        .find(|(forward, _)| *forward == predicate)
        .map(|(_, inverse)| *inverse)
}

/// Triples for one batch, in insertion order with duplicates dropped.
#[derive(Debug, Clone)]
pub struct TripleBatch {
    triples: Vec<Triple>,
    seen: HashSet<Triple>,
    bindings: Vec<Namespace>,
}

impl TripleBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::with_bindings(STANDARD_BINDINGS.to_vec())
    }

    #[must_use]
    pub fn with_bindings(bindings: Vec<Namespace>) -> Self {
        Self {
            triples: Vec::new(),
            seen: HashSet::new(),
            bindings,
        }
    }

    /// Returns false when the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.seen.contains(&triple) {
            return false;
        }
        self.seen.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    pub fn add(
        &mut self,
        subject: impl Into<Subject>,
        predicate: &NamedNode,
        object: impl Into<Term>,
    ) -> bool {
        self.insert(Triple::new(subject, predicate.clone(), object))
    }

    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.seen.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn bindings(&self) -> &[Namespace] {
        &self.bindings
    }

    /// Adds `(o, inverse(p), s)` for every triple whose predicate has a
    /// registered inverse and whose object is an IRI. Returns the number of
    /// triples added.
    pub fn add_inverse_relations(&mut self) -> usize {
        let inverses: Vec<Triple> = self
            .triples
            .iter()
            .filter_map(|t| {
                let inverse = inverse_of(t.predicate.as_str())?;
                let Term::NamedNode(object) = &t.object else {
                    return None;
                };
                Some(Triple::new(
                    object.clone(),
                    NamedNode::new_unchecked(inverse),
                    t.subject.clone(),
                ))
            })
            .collect();

        inverses.into_iter().filter(|t| self.insert(t.clone())).count()
    }
}

impl Default for TripleBatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::namespace::{ABOX, DCTERMS, SOSA};
    use crate::graph::literal::{blank_node, string_literal};

    #[test]
    fn test_duplicates_dropped() {
        let mut batch = TripleBatch::new();
        let s = ABOX.iri("a");
        let p = DCTERMS.iri("date");

        assert!(batch.add(s.clone(), &p, string_literal("2020")));
        assert!(!batch.add(s, &p, string_literal("2020")));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_inverse_lookup() {
        assert_eq!(
            inverse_of("http://www.w3.org/ns/sosa/isSampleOf"),
            Some("http://www.w3.org/ns/sosa/hasSample")
        );
        assert_eq!(
            inverse_of("http://purl.org/dc/terms/isPartOf"),
            Some("http://purl.org/dc/terms/hasPart")
        );
        assert_eq!(inverse_of("https://purl.org/emi#hasSource"), None);
    }

    #[test]
    fn test_inverse_added_for_iri_objects() {
        let mut batch = TripleBatch::new();
        let sample = ABOX.iri("inRec0-source");
        let organism = ABOX.iri("ORGANISM-Apis mellifera");
        batch.add(sample.clone(), &SOSA.iri("isSampleOf"), organism.clone());

        assert_eq!(batch.add_inverse_relations(), 1);
        assert!(batch.contains(&Triple::new(organism, SOSA.iri("hasSample"), sample)));
    }

    #[test]
    fn test_no_inverse_for_literals_or_blank_nodes() {
        let mut batch = TripleBatch::new();
        let s = ABOX.iri("x");
        batch.add(s.clone(), &DCTERMS.iri("isPartOf"), string_literal("not a node"));
        batch.add(s, &DCTERMS.iri("isPartOf"), blank_node("b0"));

        assert_eq!(batch.add_inverse_relations(), 0);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_inverse_pass_is_idempotent() {
        let mut batch = TripleBatch::new();
        batch.add(ABOX.iri("a"), &SOSA.iri("hosts"), ABOX.iri("b"));

        assert_eq!(batch.add_inverse_relations(), 1);
        assert_eq!(batch.add_inverse_relations(), 0);
        assert_eq!(batch.len(), 2);
    }
}
