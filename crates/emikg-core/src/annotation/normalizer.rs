use regex::Regex;

/// Identifies a substitution pass so each can be exercised on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleTag {
    /// `and` / `y` separate observations
    Conjunction,
    /// `or` marks alternatives inside one slot and is dropped
    Alternation,
    /// `, ; / | &` runs become one comma
    Delimiter,
    /// brackets and punctuation noise become a space
    Noise,
    /// runs of whitespace collapse to one space
    Whitespace,
}

impl RuleTag {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conjunction => "conjunction",
            Self::Alternation => "alternation",
            Self::Delimiter => "delimiter",
            Self::Noise => "noise",
            Self::Whitespace => "whitespace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubstitutionRule {
    pub tag: RuleTag,
    pattern: Regex,
    replacement: &'static str,
}

impl SubstitutionRule {
    pub fn new(tag: RuleTag, pattern: &str, replacement: &'static str) -> Result<Self, regex::Error> {
        Ok(Self {
            tag,
            pattern: Regex::new(pattern)?,
            replacement,
        })
    }

    #[must_use]
    pub fn apply(&self, input: &str) -> String {
        self.pattern.replace_all(input, self.replacement).into_owned()
    }
}

/// Splits a free-text annotation into independent clauses.
///
/// The passes run in a fixed order; each works on the output of the one
/// before it:
///
/// 1. ASCII lowercase and trim
/// 2. conjunctions to `,`, then `or` removed
/// 3. delimiter runs to `,`
/// 4. bracket/punctuation noise to a space
/// 5. whitespace runs collapsed
/// 6. split on `[+.,]+`, trimming and dropping empty clauses
#[derive(Debug, Clone)]
pub struct TermNormalizer {
    rules: Vec<SubstitutionRule>,
}

const CLAUSE_SEPARATORS: [char; 3] = ['+', '.', ','];

impl TermNormalizer {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            rules: vec![
                SubstitutionRule::new(RuleTag::Conjunction, r"\b(and|y)\b", ",")?,
                SubstitutionRule::new(RuleTag::Alternation, r"\bor\b", "")?,
                SubstitutionRule::new(RuleTag::Delimiter, r"[,;/|&]+", ",")?,
                SubstitutionRule::new(RuleTag::Noise, r"[\[\]()?#:`]+", " ")?,
                SubstitutionRule::new(RuleTag::Whitespace, r"\s{2,}", " ")?,
            ],
        })
    }

    pub fn rules(&self) -> &[SubstitutionRule] {
        &self.rules
    }

    #[must_use]
    pub fn rule(&self, tag: RuleTag) -> Option<&SubstitutionRule> {
        self.rules.iter().find(|r| r.tag == tag)
    }

    /// Steps 1 through 5: the cleaned, unsplit annotation.
    #[must_use]
    pub fn clean(&self, raw: &str) -> String {
        let lowered = raw.trim().to_ascii_lowercase();
        let cleaned = self.rules.iter().fold(lowered, |text, rule| {
            let next = rule.apply(&text);
            if next != text {
                tracing::trace!("{} rule: {:?} -> {:?}", rule.tag.as_str(), text, next);
            }
            next
        });
        cleaned.trim().to_string()
    }

    /// Step 6 on already-cleaned text.
    #[must_use]
    pub fn clauses(&self, cleaned: &str) -> Vec<String> {
        split_clauses(cleaned)
    }

    #[must_use]
    pub fn normalize(&self, raw: &str) -> Vec<String> {
        self.clauses(&self.clean(raw))
    }
}

/// Splits on runs of `+ . ,`, trimming and dropping empty pieces.
#[must_use]
pub fn split_clauses(text: &str) -> Vec<String> {
    text.split(CLAUSE_SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TermNormalizer {
        TermNormalizer::new().unwrap()
    }

    #[test]
    fn test_rule_order() {
        let tags: Vec<RuleTag> = normalizer().rules().iter().map(|r| r.tag).collect();
        assert_eq!(
            tags,
            vec![
                RuleTag::Conjunction,
                RuleTag::Alternation,
                RuleTag::Delimiter,
                RuleTag::Noise,
                RuleTag::Whitespace,
            ]
        );
    }

    #[test]
    fn test_conjunction_rule() {
        let n = normalizer();
        let rule = n.rule(RuleTag::Conjunction).unwrap();
        assert_eq!(rule.apply("male and female"), "male , female");
        assert_eq!(rule.apply("macho y hembra"), "macho , hembra");
        assert_eq!(rule.apply("sandy"), "sandy");
    }

    #[test]
    fn test_alternation_rule() {
        let n = normalizer();
        let rule = n.rule(RuleTag::Alternation).unwrap();
        assert_eq!(rule.apply("male or female"), "male  female");
        assert_eq!(rule.apply("adult worker"), "adult worker");
    }

    #[test]
    fn test_delimiter_rule() {
        let n = normalizer();
        let rule = n.rule(RuleTag::Delimiter).unwrap();
        assert_eq!(rule.apply("male;/female|juvenile&adult"), "male,female,juvenile,adult");
    }

    #[test]
    fn test_noise_rule() {
        let n = normalizer();
        let rule = n.rule(RuleTag::Noise).unwrap();
        assert_eq!(rule.apply("female(s)?"), "female s ");
        assert_eq!(rule.apply("[male]#:`"), " male ");
    }

    #[test]
    fn test_whitespace_rule() {
        let n = normalizer();
        let rule = n.rule(RuleTag::Whitespace).unwrap();
        assert_eq!(rule.apply("male   female"), "male female");
    }

    #[test]
    fn test_normalize_counts() {
        assert_eq!(normalizer().normalize("12 male, 3 female"), vec!["12 male", "3 female"]);
    }

    #[test]
    fn test_normalize_mixed_delimiters() {
        assert_eq!(
            normalizer().normalize("Adult(s) Female/Juvenile Male"),
            vec!["adult s female", "juvenile male"]
        );
        assert_eq!(
            normalizer().normalize("1 male + 2 females. 1 juv"),
            vec!["1 male", "2 females", "1 juv"]
        );
    }

    #[test]
    fn test_or_does_not_split() {
        assert_eq!(normalizer().normalize("male or female"), vec!["male female"]);
    }

    #[test]
    fn test_empty_yields_no_clauses() {
        assert!(normalizer().normalize("").is_empty());
        assert!(normalizer().normalize("  ,;/ ").is_empty());
        assert!(normalizer().normalize("and").is_empty());
    }

    #[test]
    fn test_idempotent_on_normalized_clause() {
        let n = normalizer();
        for raw in ["12 male, 3 female", "adult female/juvenile male", "Male or Female?"] {
            for clause in n.normalize(raw) {
                assert_eq!(n.normalize(&clause), vec![clause.clone()]);
            }
        }
    }

    #[test]
    fn test_ascii_lowercase_only() {
        assert_eq!(normalizer().clean("ÉTÉ MALE"), "ÉtÉ male");
    }
}
