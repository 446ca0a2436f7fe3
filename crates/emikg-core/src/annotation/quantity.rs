use std::collections::BTreeMap;

use regex::Regex;

use super::normalizer::{split_clauses, TermNormalizer};
use crate::vocabulary::VocabularyTable;

/// Category for terms no vocabulary entry matches.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Counted categories for one annotation. Only nonzero counts are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountResult {
    counts: BTreeMap<String, u64>,
}

impl CountResult {
    fn from_totals(totals: BTreeMap<String, u64>) -> Self {
        Self {
            counts: totals.into_iter().filter(|(_, n)| *n > 0).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<u64> {
        self.counts.get(category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Lowercase, trim and drop a trailing plural `s`, except for terms such as
/// `monoecious` or `autogamous` where the `s` is part of the word.
#[must_use]
pub fn singularize(term: &str) -> String {
    let term = term.trim().to_lowercase();
    if term.contains("mono") || term.contains("auto") {
        return term;
    }
    match term.strip_suffix('s') {
        Some(stem) => stem.to_string(),
        None => term,
    }
}

/// Turns sex/life-stage annotations into counted vocabulary categories.
#[derive(Debug, Clone)]
pub struct QuantityExtractor {
    normalizer: TermNormalizer,
    pair_pattern: Regex,
    affix_pattern: Regex,
}

impl QuantityExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            normalizer: TermNormalizer::new()?,
            pair_pattern: Regex::new(r"(\d+)\s*([\w-]+)|([\w-]+)\s*(\d+)")?,
            affix_pattern: Regex::new(
                r"(?i)adult(?:\s+s\b|e?s|a)?|juvenil(?:es?)?|tortere|maybe|\(?torete?s?\)?",
            )?,
        })
    }

    pub fn normalizer(&self) -> &TermNormalizer {
        &self.normalizer
    }

    /// Aggregates every clause of `annotation`.
    ///
    /// An annotation that is itself a vocabulary key, as given or after
    /// cleaning, counts once for that key and is not split further.
    #[must_use]
    pub fn extract(&self, annotation: &str, vocabulary: &VocabularyTable) -> CountResult {
        let mut totals: BTreeMap<String, u64> = vocabulary
            .labels()
            .into_iter()
            .map(|label| (label.to_string(), 0))
            .collect();

        let cleaned = self.normalizer.clean(annotation);
        let whole = [annotation, cleaned.as_str()]
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .find_map(|s| vocabulary.get(s));
        if let Some(entry) = whole {
            totals.insert(entry.label.clone(), 1);
            return CountResult::from_totals(totals);
        }

        for clause in self.normalizer.clauses(&cleaned) {
            for (category, count) in self.extract_clause(&clause, vocabulary) {
                let total = totals.entry(category).or_insert(0);
                *total = total.saturating_add(count);
            }
        }
        CountResult::from_totals(totals)
    }

    /// `(category, count)` pairs for a single clause, in match order.
    #[must_use]
    pub fn extract_clause(&self, clause: &str, vocabulary: &VocabularyTable) -> Vec<(String, u64)> {
        let pairs: Vec<(String, u64)> = self
            .pair_pattern
            .captures_iter(clause)
            .filter_map(|caps| {
                let (count, term) = match (caps.get(1), caps.get(2)) {
                    (Some(count), Some(term)) => (count, term),
                    _ => (caps.get(4)?, caps.get(3)?),
                };
                let count = count.as_str().parse::<u64>().unwrap_or(1);
                Some((self.category_for(term.as_str(), vocabulary), count))
            })
            .collect();

        if !pairs.is_empty() {
            return pairs;
        }

        split_clauses(clause)
            .iter()
            .map(|fragment| (self.category_for(fragment, vocabulary), 1))
            .collect()
    }

    /// Direct lookup, then one retry with life-stage affixes removed.
    fn category_for(&self, term: &str, vocabulary: &VocabularyTable) -> String {
        let term = singularize(term);
        if let Some(entry) = vocabulary.get(&term) {
            return entry.label.clone();
        }

        // `adult(s)` reaches here as `adult s` once the noise rule has run
        let stripped = self.affix_pattern.replace_all(&term, " ");
        let stripped = singularize(&stripped.split_whitespace().collect::<Vec<_>>().join(" "));
        if !stripped.is_empty() {
            if let Some(entry) = vocabulary.get(&stripped) {
                return entry.label.clone();
            }
        }

        tracing::debug!("Unmapped annotation term {:?}", term);
        UNKNOWN_CATEGORY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sexes() -> VocabularyTable {
        VocabularyTable::new()
            .with_entry("male", "Male", None)
            .with_entry("female", "Female", None)
    }

    fn extractor() -> QuantityExtractor {
        QuantityExtractor::new().unwrap()
    }

    fn counts(result: &CountResult) -> Vec<(&str, u64)> {
        result.iter().collect()
    }

    #[test]
    fn test_numeric_pairs() {
        let result = extractor().extract("12 male, 3 female", &sexes());
        assert_eq!(counts(&result), vec![("Female", 3), ("Male", 12)]);
    }

    #[test]
    fn test_affixes_stripped() {
        let result = extractor().extract("adult female/juvenile male", &sexes());
        assert_eq!(counts(&result), vec![("Female", 1), ("Male", 1)]);
    }

    #[test]
    fn test_parenthesized_plural_affix() {
        let result = extractor().extract("adult(s) female/juvenile male", &sexes());
        assert_eq!(counts(&result), vec![("Female", 1), ("Male", 1)]);
    }

    #[test]
    fn test_plural_affixes_stripped() {
        let result = extractor().extract("juveniles male", &sexes());
        assert_eq!(counts(&result), vec![("Male", 1)]);

        let result = extractor().extract("adults female; maybe male; toretes male", &sexes());
        assert_eq!(counts(&result), vec![("Female", 1), ("Male", 2)]);
    }

    #[test]
    fn test_unmapped_term_is_unknown() {
        let result = extractor().extract("xyzzy", &sexes());
        assert_eq!(counts(&result), vec![(UNKNOWN_CATEGORY, 1)]);
    }

    #[test]
    fn test_term_before_count() {
        let result = extractor().extract("males 4; females 2", &sexes());
        assert_eq!(result.get("Male"), Some(4));
        assert_eq!(result.get("Female"), Some(2));
    }

    #[test]
    fn test_counts_accumulate_across_clauses() {
        let result = extractor().extract("2 males, 1 female and 3 males", &sexes());
        assert_eq!(result.get("Male"), Some(5));
        assert_eq!(result.get("Female"), Some(1));
        assert_eq!(result.total(), 6);
    }

    #[test]
    fn test_plural_kept_for_mono_and_auto() {
        assert_eq!(singularize("Females "), "female");
        assert_eq!(singularize("monoecious"), "monoecious");
        assert_eq!(singularize("autogamous"), "autogamous");
    }

    #[test]
    fn test_affix_retry_after_count() {
        let result = extractor().extract("3 adults", &sexes());
        assert_eq!(result.get(UNKNOWN_CATEGORY), Some(3));

        let result = extractor().extract("2 juvenilemales, 1 femaleadults", &sexes());
        assert_eq!(result.get("Male"), Some(2));
        assert_eq!(result.get("Female"), Some(1));
    }

    #[test]
    fn test_zero_counts_dropped() {
        let result = extractor().extract("0 male, 2 female", &sexes());
        assert_eq!(result.get("Male"), None);
        assert_eq!(result.get("Female"), Some(2));
        assert!(result.iter().all(|(_, n)| n > 0));
    }

    #[test]
    fn test_overflowing_count_is_implicit_one() {
        let result = extractor().extract("99999999999999999999999 male", &sexes());
        assert_eq!(result.get("Male"), Some(1));
    }

    #[test]
    fn test_empty_annotation() {
        assert!(extractor().extract("", &sexes()).is_empty());
        assert!(extractor().extract(" / ; ", &sexes()).is_empty());
    }

    #[test]
    fn test_whole_string_key_short_circuits() {
        let table = sexes().with_entry("male and female", "Mixed", None);
        let result = extractor().extract("Male and Female", &table);
        assert_eq!(counts(&result), vec![("Mixed", 1)]);

        let result = extractor().extract("male and female", &sexes());
        assert_eq!(counts(&result), vec![("Female", 1), ("Male", 1)]);
    }

    #[test]
    fn test_extract_clause_order() {
        let pairs = extractor().extract_clause("1 female 2 male", &sexes());
        assert_eq!(
            pairs,
            vec![("Female".to_string(), 1), ("Male".to_string(), 2)]
        );
    }
}
