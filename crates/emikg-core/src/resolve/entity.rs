use crate::graph::namespace::{ABOX, OBO};
use crate::graph::NamedNode;
use crate::ingest::has_value;
use crate::vocabulary::VocabularyTable;

use super::dedup::DedupTracker;

/// OBO ontologies whose CURIEs (`UBERON:0002107`) expand to
/// `http://purl.obolibrary.org/obo/UBERON_0002107`.
pub const ONTOLOGY_PREFIXES: [&str; 14] = [
    "AEO", "CHEBI", "CLYH", "ENVO", "FAO", "FBdv", "HAO", "NCIT", "OMIT", "PATO", "PORO", "RO",
    "UBERON", "PO",
];

/// Which rule produced an entity's IRI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// Identifier carried a recognized ontology prefix
    Prefixed,
    /// Identifier was already an IRI
    DirectUri,
    /// Name matched a vocabulary entry with an IRI
    VocabularyUri,
    /// Name matched a label-only vocabulary entry
    VocabularyLabel,
    /// Built from the raw name
    Fallback,
}

impl ResolutionSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefixed => "prefixed",
            Self::DirectUri => "direct_uri",
            Self::VocabularyUri => "vocabulary_uri",
            Self::VocabularyLabel => "vocabulary_label",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntity {
    pub uri: NamedNode,
    pub label: String,
    /// True the first time this IRI is resolved in a run; the caller writes
    /// the type and label triples only then
    pub is_newly_defined: bool,
    pub source: ResolutionSource,
}

/// Resolves body parts, life stages and similar annotated entities.
///
/// Resolution order, first match wins:
///
/// 1. identifier with a recognized ontology prefix
/// 2. identifier starting with `http`, used as is
/// 3. name found in the vocabulary with an IRI
/// 4. name found in the vocabulary with only a label, giving
///    `:{CATEGORY}-{label}`
/// 5. `:{CATEGORY}-{name}`
///
/// An identifier that fits neither of the first two rules is ignored and
/// resolution continues with the name.
#[derive(Debug, Clone)]
pub struct EntityResolver {
    prefixes: Vec<String>,
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new(ONTOLOGY_PREFIXES.iter().map(|p| (*p).to_string()).collect())
    }
}

impl EntityResolver {
    #[must_use]
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// Expands a prefixed or absolute identifier. `None` for anything else,
    /// including an `http` identifier that is not a valid IRI.
    #[must_use]
    pub fn identifier_iri(&self, id: &str) -> Option<(NamedNode, ResolutionSource)> {
        let id = id.trim();
        if let Some((prefix, local)) = id.split_once(':') {
            if !local.is_empty() && self.prefixes.iter().any(|p| p == prefix) {
                let iri = OBO.iri(&format!("{prefix}_{}", local.trim()));
                return Some((iri, ResolutionSource::Prefixed));
            }
        }
        if id.starts_with("http") {
            return match NamedNode::new(id) {
                Ok(iri) => Some((iri, ResolutionSource::DirectUri)),
                Err(e) => {
                    tracing::debug!("Identifier {:?} is not a valid IRI: {}", id, e);
                    None
                }
            };
        }
        None
    }

    /// Deterministic IRI and label for a name/identifier pair, without
    /// touching any run state. `None` when both are absent.
    #[must_use]
    pub fn resolve_uri(
        &self,
        name: Option<&str>,
        id: Option<&str>,
        category: &str,
        vocabulary: &VocabularyTable,
    ) -> Option<(NamedNode, String, ResolutionSource)> {
        let name = name.filter(|n| has_value(Some(*n))).map(str::trim);
        let id = id.filter(|i| has_value(Some(*i))).map(str::trim);

        if let Some((iri, source)) = id.and_then(|i| self.identifier_iri(i)) {
            let label = name.or(id).unwrap_or_default().to_string();
            return Some((iri, label, source));
        }

        let name = name.or(id)?;
        if let Some(entry) = vocabulary.get(name) {
            return Some(match &entry.uri {
                Some(uri) => (uri.clone(), entry.label.clone(), ResolutionSource::VocabularyUri),
                None => (
                    synthesized(category, &entry.label),
                    entry.label.clone(),
                    ResolutionSource::VocabularyLabel,
                ),
            });
        }

        Some((
            synthesized(category, name),
            name.to_string(),
            ResolutionSource::Fallback,
        ))
    }

    /// Resolves and records the IRI in `tracker`.
    pub fn resolve(
        &self,
        name: Option<&str>,
        id: Option<&str>,
        category: &str,
        vocabulary: &VocabularyTable,
        tracker: &mut DedupTracker,
    ) -> Option<ResolvedEntity> {
        let (uri, label, source) = self.resolve_uri(name, id, category, vocabulary)?;
        let is_newly_defined = tracker.mark_defined(&uri);
        Some(ResolvedEntity {
            uri,
            label,
            is_newly_defined,
            source,
        })
    }
}

fn synthesized(category: &str, label: &str) -> NamedNode {
    ABOX.iri(&format!("{category}-{label}"))
}
