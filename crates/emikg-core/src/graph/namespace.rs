//! Namespace bindings and the fixed IRIs the graph is built from.

use oxrdf::NamedNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: &'static str,
    pub base: &'static str,
}

impl Namespace {
    #[must_use]
    pub const fn new(prefix: &'static str, base: &'static str) -> Self {
        Self { prefix, base }
    }

    /// `local` is percent-encoded with [`encode_local`] first, so any text
    /// yields a valid IRI.
    #[must_use]
    pub fn iri(&self, local: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("{}{}", self.base, encode_local(local)))
    }

    /// Local part of `iri` when it lies in this namespace.
    #[must_use]
    pub fn strip<'a>(&self, iri: &'a str) -> Option<&'a str> {
        iri.strip_prefix(self.base)
    }
}

pub const EMI: Namespace = Namespace::new("emi", "https://purl.org/emi#");
pub const ABOX: Namespace = Namespace::new("", "https://purl.org/emi/abox#");
pub const SOSA: Namespace = Namespace::new("sosa", "http://www.w3.org/ns/sosa/");
pub const DCTERMS: Namespace = Namespace::new("dcterms", "http://purl.org/dc/terms/");
pub const WD: Namespace = Namespace::new("wd", "http://www.wikidata.org/entity/");
pub const PROV: Namespace = Namespace::new("prov", "http://www.w3.org/ns/prov#");
pub const GEO: Namespace = Namespace::new("geo", "http://www.w3.org/2003/01/geo/wgs84_pos#");
pub const RDF: Namespace = Namespace::new("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
pub const RDFS: Namespace = Namespace::new("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
pub const XSD: Namespace = Namespace::new("xsd", "http://www.w3.org/2001/XMLSchema#");

pub const OBO: Namespace = Namespace::new("obo", "http://purl.obolibrary.org/obo/");

/// Prefix block written once at the head of every output file.
pub const STANDARD_BINDINGS: [Namespace; 10] =
    [EMI, ABOX, SOSA, DCTERMS, WD, PROV, GEO, RDF, RDFS, XSD];

/// Percent-encodes everything that may not appear in an IRI fragment or
/// path segment, after trimming. `%` itself is encoded, so the result never
/// carries a malformed escape.
#[must_use]
pub fn encode_local(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if is_local_char(c) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

fn is_local_char(c: char) -> bool {
    if c.is_ascii() {
        c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@/?".contains(c)
    } else {
        c.is_alphanumeric()
    }
}

/// Predicates and classes used by the interaction graph, allocated once per run.
#[derive(Debug, Clone)]
pub struct Vocab {
    pub rdf_type: NamedNode,
    pub rdf_value: NamedNode,
    pub rdfs_label: NamedNode,
    pub has_source: NamedNode,
    pub has_target: NamedNode,
    pub has_interaction_type: NamedNode,
    pub has_anatomical_entity: NamedNode,
    pub has_developmental_stage: NamedNode,
    pub has_physiological_stage: NamedNode,
    pub has_sex: NamedNode,
    pub in_taxon: NamedNode,
    pub is_sample_of: NamedNode,
    pub at_location: NamedNode,
    pub citation: NamedNode,
    pub date: NamedNode,
    pub lat: NamedNode,
    pub long: NamedNode,
    pub sample: NamedNode,
    pub organism: NamedNode,
    pub taxon: NamedNode,
    pub interaction_type: NamedNode,
    pub anatomical_entity: NamedNode,
    pub developmental_stage: NamedNode,
    pub biological_sex: NamedNode,
}

impl Vocab {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rdf_type: RDF.iri("type"),
            rdf_value: RDF.iri("value"),
            rdfs_label: RDFS.iri("label"),
            has_source: EMI.iri("hasSource"),
            has_target: EMI.iri("hasTarget"),
            has_interaction_type: EMI.iri("hasInteractionType"),
            has_anatomical_entity: EMI.iri("hasAnatomicalEntity"),
            has_developmental_stage: EMI.iri("hasDevelopmentalStage"),
            has_physiological_stage: EMI.iri("hasPhysiologicalStage"),
            has_sex: EMI.iri("hasSex"),
            in_taxon: EMI.iri("inTaxon"),
            is_sample_of: SOSA.iri("isSampleOf"),
            at_location: PROV.iri("atLocation"),
            citation: DCTERMS.iri("bibliographicCitation"),
            date: DCTERMS.iri("date"),
            lat: GEO.iri("lat"),
            long: GEO.iri("long"),
            sample: SOSA.iri("Sample"),
            organism: EMI.iri("Organism"),
            taxon: EMI.iri("Taxon"),
            interaction_type: EMI.iri("InteractionType"),
            anatomical_entity: EMI.iri("AnatomicalEntity"),
            developmental_stage: EMI.iri("DevelopmentalStage"),
            biological_sex: EMI.iri("BiologicalSex"),
        }
    }
}

impl Default for Vocab {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_iri() {
        assert_eq!(
            EMI.iri("hasSource").as_str(),
            "https://purl.org/emi#hasSource"
        );
        assert_eq!(ABOX.iri("inRec7").as_str(), "https://purl.org/emi/abox#inRec7");
    }

    #[test]
    fn test_strip() {
        assert_eq!(WD.strip("http://www.wikidata.org/entity/Q42"), Some("Q42"));
        assert_eq!(WD.strip("https://purl.org/emi#Q42"), None);
    }

    #[test]
    fn test_encode_local() {
        assert_eq!(encode_local(" hind leg "), "hind%20leg");
        assert_eq!(encode_local("Apis mellifera"), "Apis%20mellifera");
        assert_eq!(encode_local("wing <left>"), "wing%20%3Cleft%3E");
        assert_eq!(encode_local("50% cover"), "50%25%20cover");
        assert_eq!(encode_local("leg^2 #3"), "leg%5E2%20%233");
        assert_eq!(encode_local("Véspula"), "Véspula");
    }

    #[test]
    fn test_hostile_labels_make_valid_iris() {
        for label in ["wing <left>", "adult{1}", "Apis \"bee\" m.", "Site \\ x", "a|b`c"] {
            let iri = ABOX.iri(label);
            assert!(NamedNode::new(iri.as_str()).is_ok(), "{iri}");
        }
    }
}
