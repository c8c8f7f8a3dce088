use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use regex::Regex;

use crate::domain::{EntityTag, Section};

/// The rule for one kind of headline section.
#[derive(Debug, Clone)]
pub struct HeadlineRule {
    pub(crate) name: NonEmptyString,
    pub(crate) alias: Option<Alias>,
    pub(crate) order: Option<u32>,
    pub(crate) required: bool,
    pub(crate) dependencies: Vec<NonEmpty<String>>,
    pub(crate) named_entities: Vec<NamedEntityRequirement>,
}

/// An alternative spelling accepted for a headline.
///
/// Matched case-insensitively from the start of the candidate.
#[derive(Debug, Clone)]
pub struct Alias {
    pattern: String,
    regex: Regex,
}

impl Alias {
    pub fn new(pattern: String) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("(?i)^(?:{pattern})"))?;
        Ok(Self { pattern, regex })
    }
}

impl HeadlineRule {
    /// The canonical name, e.g. `SIGNALEMENT`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The alias pattern as written in the rules, if any.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_ref().map(|alias| alias.pattern.as_str())
    }

    /// The required position of the section relative to other ordered
    /// sections. `None` means the section may appear anywhere.
    #[must_use]
    pub const fn order(&self) -> Option<u32> {
        self.order
    }

    /// Whether every report must contain this section.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Groups of canonical names; for each group at least one must be
    /// present whenever this section is.
    #[must_use]
    pub fn dependencies(&self) -> &[NonEmpty<String>] {
        &self.dependencies
    }

    /// Named entities this section is expected to mention.
    #[must_use]
    pub fn named_entities(&self) -> &[NamedEntityRequirement] {
        &self.named_entities
    }

    /// Whether `candidate` equals the canonical name, ignoring case.
    #[must_use]
    pub fn is_named(&self, candidate: &str) -> bool {
        candidate.to_lowercase() == self.name.as_str().to_lowercase()
    }

    /// Whether `candidate` is the canonical name or matches the alias.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.is_named(candidate)
            || self
                .alias
                .as_ref()
                .is_some_and(|alias| alias.regex.is_match(candidate))
    }
}

/// A named entity a section is expected to contain.
#[derive(Debug, Clone)]
pub struct NamedEntityRequirement {
    pub(crate) message: String,
    pub(crate) tag: EntityTag,
    pub(crate) cheat: Option<Regex>,
}

impl NamedEntityRequirement {
    /// The message reported when the requirement is not met.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The entity being looked for. A missing type or subtype matches any.
    #[must_use]
    pub const fn tag(&self) -> &EntityTag {
        &self.tag
    }

    /// Whether an entity with `tag` satisfies this requirement.
    #[must_use]
    pub fn accepts(&self, tag: &EntityTag) -> bool {
        fn wildcard(expected: Option<&String>, actual: Option<&String>) -> bool {
            expected.is_none_or(|expected| Some(expected) == actual)
        }

        self.tag.identity == tag.identity
            && wildcard(self.tag.kind.as_ref(), tag.kind.as_ref())
            && wildcard(self.tag.subtype.as_ref(), tag.subtype.as_ref())
    }

    /// Whether `section` satisfies this requirement.
    ///
    /// Either an entity with at least one word matches, or the cheat pattern
    /// matches the section text. The cheat pattern makes up for entities the
    /// annotation service fails to tag.
    #[must_use]
    pub fn is_satisfied_by(&self, section: &Section) -> bool {
        let tagged = section.sentences().iter().any(|sentence| {
            sentence
                .entities()
                .iter()
                .any(|entity| {
                    self.accepts(entity.tag()) && !sentence.entity_words(entity).is_empty()
                })
        });

        tagged
            || self
                .cheat
                .as_ref()
                .is_some_and(|cheat| cheat.is_match(&section.text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Sentence, Word};

    fn rule(name: &str, alias: Option<&str>) -> HeadlineRule {
        HeadlineRule {
            name: NonEmptyString::new(name.to_string()).unwrap(),
            alias: alias.map(|p| Alias::new(p.to_string()).unwrap()),
            order: None,
            required: false,
            dependencies: Vec::new(),
            named_entities: Vec::new(),
        }
    }

    fn requirement(tag: EntityTag, cheat: Option<&str>) -> NamedEntityRequirement {
        NamedEntityRequirement {
            message: "Tidpunkt saknas".to_string(),
            tag,
            cheat: cheat.map(|pattern| Regex::new(pattern).unwrap()),
        }
    }

    #[test]
    fn canonical_name_matches_case_insensitively() {
        let rule = rule("ÖVRIGT", None);
        assert!(rule.matches("övrigt"));
        assert!(rule.matches("Övrigt"));
        assert!(!rule.matches("ÖVRIGT OCH ANNAT"));
    }

    #[test]
    fn alias_matches_from_the_start() {
        let rule = rule("BILAGOR", Some("bilagor|bilaga"));
        assert!(rule.matches("Bilaga"));
        assert!(rule.matches("BILAGOR"));
        assert!(!rule.matches("SE BILAGA"));
        assert_eq!(rule.alias(), Some("bilagor|bilaga"));
    }

    #[test]
    fn missing_type_and_subtype_are_wildcards() {
        let any_time = requirement(EntityTag::new("TIMEX"), None);
        let date = EntityTag::new("TIMEX").with_kind("TME").with_subtype("DAT");
        assert!(any_time.accepts(&date));
        assert!(!any_time.accepts(&EntityTag::new("ENAMEX")));

        let city = requirement(
            EntityTag::new("ENAMEX").with_kind("LOC").with_subtype("PPL"),
            None,
        );
        let place = EntityTag::new("ENAMEX").with_kind("LOC").with_subtype("PPL");
        assert!(city.accepts(&place));
        assert!(!city.accepts(&EntityTag::new("ENAMEX").with_kind("LOC")));
    }

    #[test]
    fn tagged_entity_satisfies_requirement() {
        let section = Section::new(
            "INLEDNING",
            vec![Sentence::new("Igår hände det.").with_entity(
                EntityTag::new("TIMEX").with_kind("TME"),
                [Word::new("Igår", "AB")],
            )],
        );
        let any_time = requirement(EntityTag::new("TIMEX"), None);
        assert!(any_time.is_satisfied_by(&section));
    }

    #[test]
    fn cheat_pattern_satisfies_requirement() {
        let section = Section::new(
            "INLEDNING",
            vec![
                Sentence::new("Klockan 14.30 ringde hon.").with_word(Word::new("Klockan", "NN")),
            ],
        );
        let any_time = requirement(EntityTag::new("TIMEX"), None);
        assert!(!any_time.is_satisfied_by(&section));
        let cheat = requirement(EntityTag::new("TIMEX"), Some(r"\d{1,2}[.:]\d{2}"));
        assert!(cheat.is_satisfied_by(&section));
    }
}
