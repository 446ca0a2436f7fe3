//! Constructors for the literal and blank-node forms the graph writes.

use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal};

#[must_use]
pub fn string_literal(value: impl Into<String>) -> Literal {
    Literal::new_simple_literal(value)
}

#[must_use]
pub fn integer_literal(value: u64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

/// `xsd:double` when the text parses as a finite float, otherwise a plain string.
#[must_use]
pub fn numeric_or_string(value: &str) -> Literal {
    let trimmed = value.trim();
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Literal::new_typed_literal(trimmed, xsd::DOUBLE),
        _ => string_literal(trimmed),
    }
}

/// A labelled blank node. Labels must be unique for the whole run since
/// batches are concatenated into one document. Keeps `[A-Za-z0-9_]` and
/// replaces anything else with `_`.
#[must_use]
pub fn blank_node(label: &str) -> BlankNode {
    let clean: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if clean.is_empty() {
        return BlankNode::default();
    }
    BlankNode::new_unchecked(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_node_label_sanitized() {
        let node = blank_node("inRec3-source sex/0");
        assert_eq!(node.as_str(), "inRec3_source_sex_0");
    }

    #[test]
    fn test_numeric_literal_detection() {
        let lat = numeric_or_string(" -12.5 ");
        assert_eq!(lat.value(), "-12.5");
        assert_eq!(lat.datatype(), xsd::DOUBLE);

        let text = numeric_or_string("12°30'N");
        assert_eq!(text.datatype(), xsd::STRING);

        let nan = numeric_or_string("NaN");
        assert_eq!(nan.datatype(), xsd::STRING);
    }

    #[test]
    fn test_integer_literal() {
        let count = integer_literal(12);
        assert_eq!(count.value(), "12");
        assert_eq!(count.datatype(), xsd::INTEGER);
    }
}
