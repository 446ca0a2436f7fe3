use std::collections::HashSet;

use crate::graph::NamedNode;

/// IRIs whose type and label triples have already been written this run.
///
/// One tracker lives for the whole pipeline run and is shared by every
/// batch, so definitions are emitted once per run rather than per batch.
#[derive(Debug, Clone, Default)]
pub struct DedupTracker {
    defined: HashSet<NamedNode>,
}

impl DedupTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `iri` defined. True only the first time a given IRI is seen.
    pub fn mark_defined(&mut self, iri: &NamedNode) -> bool {
        if self.defined.contains(iri) {
            return false;
        }
        self.defined.insert(iri.clone())
    }

    #[must_use]
    pub fn is_defined(&self, iri: &NamedNode) -> bool {
        self.defined.contains(iri)
    }

    pub fn len(&self) -> usize {
        self.defined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defined.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defined_once() {
        let mut tracker = DedupTracker::new();
        let iri = NamedNode::new_unchecked("http://purl.obolibrary.org/obo/UBERON_0002107");

        assert!(!tracker.is_defined(&iri));
        assert!(tracker.mark_defined(&iri));
        assert!(tracker.is_defined(&iri));
        for _ in 0..1000 {
            assert!(!tracker.mark_defined(&iri));
        }
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_distinct_iris() {
        let mut tracker = DedupTracker::new();
        assert!(tracker.mark_defined(&NamedNode::new_unchecked("http://x.org/a")));
        assert!(tracker.mark_defined(&NamedNode::new_unchecked("http://x.org/b")));
        assert_eq!(tracker.len(), 2);
    }
}
