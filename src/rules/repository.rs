//! The rule repository and its YAML representation.

use std::{
    collections::{BTreeSet, HashSet},
    path::Path,
};

use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{EntityTag, Word},
    rules::{
        HeadlineRule, NamedEntityRequirement, Similarity,
        headline::Alias,
        word_class::{UnknownWordClass, WordClass},
    },
};

/// The rules shipped with the crate.
pub const BUILTIN_RULES: &str = include_str!("../../rules/default.yaml");

/// Every writing rule a report is checked against.
///
/// Loaded and validated once; read-only afterwards.
#[derive(Debug, Clone)]
pub struct RuleRepository {
    headlines: Vec<HeadlineRule>,
    readability: ReadabilityThresholds,
    forbidden_words: BTreeSet<String>,
    unwanted_words: Vec<UnwantedWord>,
    citation_delimiters: Vec<String>,
    spelling_skip_word_classes: BTreeSet<WordClass>,
    grammar_rules: Vec<GrammarRule>,
}

/// Lower and upper bounds for one readability score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Thresholds {
    /// Scores below this are too simple.
    #[serde(default)]
    pub min: Option<f64>,
    /// Scores above this are too complex.
    #[serde(default)]
    pub max: Option<f64>,
}

/// Thresholds for each readability score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadabilityThresholds {
    /// LIX bounds.
    #[serde(default)]
    pub lix: Thresholds,
    /// OVIX bounds.
    #[serde(default)]
    pub ovix: Thresholds,
    /// Nominal ratio bounds.
    #[serde(default)]
    pub nk: Thresholds,
}

/// A word to avoid and the word to use instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnwantedWord {
    /// The word to avoid.
    pub word: String,
    /// The suggested replacement.
    pub alternative: String,
}

/// A pattern that flags every match in the report text.
#[derive(Debug, Clone)]
pub struct GrammarRule {
    regex: Regex,
    message: String,
}

impl GrammarRule {
    /// The compiled pattern.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// The message reported for each match.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur when loading rules.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The rule file could not be read.
    #[error("failed to read rule file: {0}")]
    Io(#[from] std::io::Error),
    /// The rule file is not valid YAML or does not have the expected shape.
    #[error("failed to parse rule file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A headline rule has an empty name.
    #[error("headline rule with empty name")]
    EmptyName,
    /// Two headline rules share a canonical name.
    #[error("headline '{0}' is defined more than once")]
    DuplicateHeadline(String),
    /// A dependency group is empty.
    #[error("headline '{0}' has an empty dependency group")]
    EmptyDependencyGroup(String),
    /// A dependency names a headline that has no rule.
    #[error("headline '{headline}' depends on unknown headline '{dependency}'")]
    UnknownDependency {
        /// The dependent headline.
        headline: String,
        /// The name that has no rule.
        dependency: String,
    },
    /// A pattern does not compile.
    #[error("invalid pattern in {context}: {source}")]
    Regex {
        /// Where the pattern was found.
        context: String,
        /// The compile error.
        source: regex::Error,
    },
    /// A word class is not a known tag.
    #[error(transparent)]
    WordClass(#[from] UnknownWordClass),
    /// A minimum threshold is greater than its maximum.
    #[error("{metric} minimum {min} is greater than maximum {max}")]
    Thresholds {
        /// The readability score.
        metric: &'static str,
        /// The configured minimum.
        min: f64,
        /// The configured maximum.
        max: f64,
    },
}

impl RuleRepository {
    /// Loads rules from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid, or contains
    /// a rule that does not make sense (see [`RulesError`]).
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parses and validates rules from YAML.
    ///
    /// # Errors
    ///
    /// See [`RuleRepository::load`].
    pub fn from_yaml(content: &str) -> Result<Self, RulesError> {
        let Versions::V1(rules) = serde_yaml::from_str(content)?;
        rules.try_into()
    }

    /// The rules shipped with the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded rule file is broken.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_yaml(BUILTIN_RULES)
    }

    /// Finds the rule for a section name.
    ///
    /// A rule whose canonical name equals the candidate (ignoring case) always
    /// wins. Otherwise the first rule, in repository order, whose alias
    /// matches is returned.
    #[must_use]
    pub fn match_headline(&self, candidate: &str) -> Option<&HeadlineRule> {
        self.headlines
            .iter()
            .find(|rule| rule.is_named(candidate))
            .or_else(|| {
                self.headlines
                    .iter()
                    .find(|rule| rule.matches(candidate))
            })
    }

    /// The rule with the given canonical name.
    #[must_use]
    pub fn headline(&self, name: &str) -> Option<&HeadlineRule> {
        self.headlines.iter().find(|rule| rule.is_named(name))
    }

    /// The known headline whose canonical name scores best against
    /// `candidate`. Ties go to the earlier rule.
    #[must_use]
    pub fn closest_headline(
        &self,
        candidate: &str,
        similarity: &dyn Similarity,
    ) -> Option<&HeadlineRule> {
        let mut best: Option<(u8, &HeadlineRule)> = None;
        for rule in &self.headlines {
            let score = similarity.score(candidate, rule.name());
            if best.is_none_or(|(top, _)| score > top) {
                best = Some((score, rule));
            }
        }
        best.map(|(_, rule)| rule)
    }

    /// All headline rules, in repository order.
    #[must_use]
    pub fn headlines(&self) -> &[HeadlineRule] {
        &self.headlines
    }

    /// The readability thresholds.
    #[must_use]
    pub const fn readability(&self) -> &ReadabilityThresholds {
        &self.readability
    }

    /// The lowest acceptable LIX.
    #[must_use]
    pub const fn lix_min(&self) -> Option<f64> {
        self.readability.lix.min
    }

    /// The highest acceptable LIX.
    #[must_use]
    pub const fn lix_max(&self) -> Option<f64> {
        self.readability.lix.max
    }

    /// Tokens that open and close a quotation.
    #[must_use]
    pub fn citation_delimiters(&self) -> &[String] {
        &self.citation_delimiters
    }

    /// Whether `word` toggles quotation state.
    #[must_use]
    pub fn is_citation_delimiter(&self, word: &Word) -> bool {
        self.citation_delimiters
            .iter()
            .any(|delimiter| delimiter == word.text())
    }

    /// The forbidden words, lower-cased.
    pub fn forbidden_words(&self) -> impl Iterator<Item = &str> {
        self.forbidden_words.iter().map(String::as_str)
    }

    /// Whether the word's text or any of its base forms is forbidden.
    #[must_use]
    pub fn is_forbidden(&self, word: &Word) -> bool {
        std::iter::once(word.text())
            .chain(word.base_forms().iter().map(String::as_str))
            .any(|form| self.forbidden_words.contains(&form.to_lowercase()))
    }

    /// The unwanted words and their alternatives.
    #[must_use]
    pub fn unwanted_words(&self) -> &[UnwantedWord] {
        &self.unwanted_words
    }

    /// The suggested replacement if the word's text is unwanted.
    #[must_use]
    pub fn alternative_for(&self, word: &Word) -> Option<&str> {
        let text = word.text().to_lowercase();
        self.unwanted_words
            .iter()
            .find(|unwanted| unwanted.word.to_lowercase() == text)
            .map(|unwanted| unwanted.alternative.as_str())
    }

    /// Word classes left out of spell-checking.
    #[must_use]
    pub const fn spelling_skip_word_classes(&self) -> &BTreeSet<WordClass> {
        &self.spelling_skip_word_classes
    }

    /// Whether the word is left out of spell-checking because of its class.
    #[must_use]
    pub fn skips_spelling(&self, word: &Word) -> bool {
        word.word_class()
            .parse::<WordClass>()
            .is_ok_and(|class| self.spelling_skip_word_classes.contains(&class))
    }

    /// The grammar rules.
    #[must_use]
    pub fn grammar_rules(&self) -> &[GrammarRule] {
        &self.grammar_rules
    }
}

/// The serialized versions of the rule file.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1(RulesV1),
}

#[derive(Debug, Deserialize)]
struct RulesV1 {
    #[serde(default)]
    headlines: Vec<HeadlineEntry>,
    #[serde(default)]
    readability: ReadabilityThresholds,
    #[serde(default)]
    forbidden_words: Vec<String>,
    #[serde(default)]
    unwanted_words: Vec<UnwantedWord>,
    #[serde(default)]
    citation_delimiters: Vec<String>,
    #[serde(default)]
    spelling_skip_word_classes: Vec<String>,
    #[serde(default)]
    grammar: Vec<GrammarEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeadlineEntry {
    name: String,
    #[serde(default)]
    regex: Option<String>,
    /// Absent or negative means unordered.
    #[serde(default)]
    order: Option<i64>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    dependencies: Vec<Vec<String>>,
    #[serde(default)]
    named_entities: Vec<NamedEntityEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NamedEntityEntry {
    message: String,
    identity: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    cheat: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrammarEntry {
    regex: String,
    message: String,
}

fn compile(pattern: &str, context: impl FnOnce() -> String) -> Result<Regex, RulesError> {
    Regex::new(pattern).map_err(|source| RulesError::Regex {
        context: context(),
        source,
    })
}

impl TryFrom<HeadlineEntry> for HeadlineRule {
    type Error = RulesError;

    fn try_from(entry: HeadlineEntry) -> Result<Self, Self::Error> {
        let HeadlineEntry {
            name,
            regex,
            order,
            required,
            dependencies,
            named_entities,
        } = entry;

        let name =
            NonEmptyString::new(name.trim().to_string()).map_err(|_| RulesError::EmptyName)?;

        let alias = regex
            .map(|pattern| {
                Alias::new(pattern).map_err(|source| RulesError::Regex {
                    context: format!("alias of headline '{}'", name.as_str()),
                    source,
                })
            })
            .transpose()?;

        let dependencies = dependencies
            .into_iter()
            .map(|group| {
                NonEmpty::from_vec(group).ok_or_else(|| {
                    RulesError::EmptyDependencyGroup(name.as_str().to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let named_entities = named_entities
            .into_iter()
            .map(|raw| {
                let cheat = raw
                    .cheat
                    .as_deref()
                    .map(|pattern| {
                        compile(pattern, || {
                            format!("named entity cheat of headline '{}'", name.as_str())
                        })
                    })
                    .transpose()?;
                Ok(NamedEntityRequirement {
                    message: raw.message,
                    tag: EntityTag {
                        identity: raw.identity,
                        kind: raw.kind,
                        subtype: raw.subtype,
                    },
                    cheat,
                })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        Ok(Self {
            name,
            alias,
            order: order.and_then(|order| u32::try_from(order).ok()),
            required,
            dependencies,
            named_entities,
        })
    }
}

impl TryFrom<RulesV1> for RuleRepository {
    type Error = RulesError;

    fn try_from(rules: RulesV1) -> Result<Self, Self::Error> {
        let RulesV1 {
            headlines,
            readability,
            forbidden_words,
            unwanted_words,
            citation_delimiters,
            spelling_skip_word_classes,
            grammar,
        } = rules;

        let headlines = headlines
            .into_iter()
            .map(HeadlineRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        for rule in &headlines {
            if !seen.insert(rule.name().to_lowercase()) {
                return Err(RulesError::DuplicateHeadline(rule.name().to_string()));
            }
        }
        for rule in &headlines {
            for dependency in rule.dependencies().iter().flatten() {
                if !seen.contains(&dependency.to_lowercase()) {
                    return Err(RulesError::UnknownDependency {
                        headline: rule.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
            }
        }

        for (metric, thresholds) in [
            ("LIX", readability.lix),
            ("OVIX", readability.ovix),
            ("NK", readability.nk),
        ] {
            if let (Some(min), Some(max)) = (thresholds.min, thresholds.max) {
                if min > max {
                    return Err(RulesError::Thresholds { metric, min, max });
                }
            }
        }

        let spelling_skip_word_classes = spelling_skip_word_classes
            .iter()
            .map(|class| class.parse::<WordClass>())
            .collect::<Result<BTreeSet<_>, _>>()?;

        let grammar_rules = grammar
            .into_iter()
            .map(|GrammarEntry { regex, message }| {
                let regex = compile(&regex, || format!("grammar rule '{message}'"))?;
                Ok(GrammarRule { regex, message })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        Ok(Self {
            headlines,
            readability,
            forbidden_words: forbidden_words
                .iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
            unwanted_words,
            citation_delimiters,
            spelling_skip_word_classes,
            grammar_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::rules::PartialRatio;

    fn rules(yaml: &str) -> Result<RuleRepository, RulesError> {
        RuleRepository::from_yaml(&format!("_version: \"1\"\n{yaml}"))
    }

    #[test]
    fn builtin_rules_load() {
        let rules = RuleRepository::builtin().unwrap();
        assert!(rules.headline("INLEDNING").unwrap().is_required());
        assert!(rules.lix_min().is_some());
        assert!(!rules.grammar_rules().is_empty());
    }

    #[test]
    fn canonical_name_beats_earlier_alias() {
        let rules = rules(
            "headlines:\n  - name: HÄNDELSEFÖRLOPP\n    regex: \"händelse.*\"\n  - name: HÄNDELSEN\n",
        )
        .unwrap();

        let headline = rules.match_headline("Händelsen").unwrap();
        assert_eq!(headline.name(), "HÄNDELSEN");
        assert_eq!(
            rules.match_headline("händelseförlopp enligt vittne").unwrap().name(),
            "HÄNDELSEFÖRLOPP"
        );
        for _ in 0..3 {
            let headline = rules.match_headline("HÄNDELSEN").unwrap();
            assert_eq!(headline.name(), "HÄNDELSEN");
        }
    }

    #[test]
    fn first_matching_alias_wins() {
        let rules = rules(
            "headlines:\n  - name: ERSÄTTNINGSYRKAN\n    regex: \"ersättning\"\n  - name: ERSÄTTNING\n    regex: \"ersättning.*\"\n",
        )
        .unwrap();
        assert_eq!(
            rules.match_headline("ersättningsyrkande").unwrap().name(),
            "ERSÄTTNINGSYRKAN"
        );
        assert!(rules.match_headline("okänd").is_none());
    }

    #[test]
    fn negative_or_missing_order_is_unordered() {
        let rules = rules(
            "headlines:\n  - name: A\n    order: 3\n  - name: B\n    order: -1\n  - name: C\n",
        )
        .unwrap();
        assert_eq!(rules.headline("A").unwrap().order(), Some(3));
        assert_eq!(rules.headline("B").unwrap().order(), None);
        assert_eq!(rules.headline("C").unwrap().order(), None);
    }

    #[test]
    fn invalid_regex_fails_at_load() {
        let error = rules("grammar:\n  - regex: \"(unclosed\"\n    message: Fel\n").unwrap_err();
        assert!(matches!(error, RulesError::Regex { .. }), "{error}");

        let error = rules("headlines:\n  - name: A\n    regex: \"[\"\n").unwrap_err();
        assert!(matches!(error, RulesError::Regex { .. }), "{error}");
    }

    #[test]
    fn unknown_word_class_fails_at_load() {
        let error = rules("spelling_skip_word_classes: [PM, XYZ]\n").unwrap_err();
        assert!(matches!(error, RulesError::WordClass(_)), "{error}");
    }

    #[test]
    fn unknown_dependency_fails_at_load() {
        let error = rules("headlines:\n  - name: A\n    dependencies: [[B]]\n").unwrap_err();
        assert!(
            matches!(error, RulesError::UnknownDependency { .. }),
            "{error}"
        );
    }

    #[test]
    fn empty_dependency_group_fails_at_load() {
        let error = rules("headlines:\n  - name: A\n    dependencies: [[]]\n").unwrap_err();
        assert!(
            matches!(error, RulesError::EmptyDependencyGroup(_)),
            "{error}"
        );
    }

    #[test]
    fn duplicate_headline_fails_at_load() {
        let error = rules("headlines:\n  - name: A\n  - name: a\n").unwrap_err();
        assert!(matches!(error, RulesError::DuplicateHeadline(_)), "{error}");
    }

    #[test]
    fn inverted_thresholds_fail_at_load() {
        let error = rules("readability:\n  lix: {min: 60, max: 30}\n").unwrap_err();
        assert!(
            matches!(error, RulesError::Thresholds { metric: "LIX", .. }),
            "{error}"
        );
    }

    #[test]
    fn unknown_headline_field_fails_at_load() {
        let error = rules("headlines:\n  - name: A\n    mandatory: true\n").unwrap_err();
        assert!(matches!(error, RulesError::Yaml(_)), "{error}");
    }

    #[test]
    fn forbidden_words_match_text_or_base_form() {
        let rules = rules("forbidden_words: [Typ, jätte]\n").unwrap();
        assert!(rules.is_forbidden(&Word::new("typ", "AB")));
        let inflected = Word::new("jättarna", "NN").with_base_forms(["jätte"]);
        assert!(rules.is_forbidden(&inflected));
        assert!(!rules.is_forbidden(&Word::new("polis", "NN")));
    }

    #[test]
    fn alternatives_match_surface_text_only() {
        let rules = rules("unwanted_words:\n  - word: erhålla\n    alternative: få\n").unwrap();
        assert_eq!(
            rules.alternative_for(&Word::new("Erhålla", "VB")),
            Some("få")
        );
        assert_eq!(
            rules.alternative_for(&Word::new("erhöll", "VB").with_base_forms(["erhålla"])),
            None
        );
    }

    #[test]
    fn skip_classes_apply_to_known_tags_only() {
        let rules = rules("spelling_skip_word_classes: [PM]\n").unwrap();
        assert!(rules.skips_spelling(&Word::new("Malmö", "PM")));
        assert!(!rules.skips_spelling(&Word::new("malmen", "NN")));
        assert!(!rules.skips_spelling(&Word::new("?", "??")));
    }

    #[test]
    fn closest_headline_prefers_similar_names() {
        let rules = RuleRepository::builtin().unwrap();
        let closest = rules.closest_headline("SIGNALEMNT", &PartialRatio).unwrap();
        assert_eq!(closest.name(), "SIGNALEMENT");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version: \"1\"\ncitation_delimiters: ['\"']\n")
            .unwrap();

        let rules = RuleRepository::load(file.path()).unwrap();
        assert_eq!(rules.citation_delimiters(), &["\"".to_string()]);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("missing.yaml");
        let error = RuleRepository::load(&path).unwrap_err();
        assert!(matches!(error, RulesError::Io(_)));
    }
}
