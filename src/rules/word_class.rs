use std::{fmt, str::FromStr};

use serde::Serialize;

/// A part-of-speech tag from the Stockholm-Umeå Corpus tag set.
///
/// Only used where the rules name word classes, so that a typo in a rule
/// file is caught when the rules are loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[allow(missing_docs)]
pub enum WordClass {
    Adverb,
    Determiner,
    InterrogativeAdverb,
    InterrogativeDeterminer,
    InterrogativePronoun,
    InterrogativePossessive,
    InfinitiveMarker,
    Interjection,
    Adjective,
    Conjunction,
    Noun,
    Participle,
    Particle,
    ProperNoun,
    Pronoun,
    Preposition,
    Possessive,
    Cardinal,
    Ordinal,
    Subjunction,
    ForeignWord,
    Verb,
    MajorDelimiter,
    MinorDelimiter,
    PairedDelimiter,
}

impl WordClass {
    /// Every word class, in tag order.
    pub const ALL: [Self; 25] = [
        Self::Adverb,
        Self::Determiner,
        Self::InterrogativeAdverb,
        Self::InterrogativeDeterminer,
        Self::InterrogativePronoun,
        Self::InterrogativePossessive,
        Self::InfinitiveMarker,
        Self::Interjection,
        Self::Adjective,
        Self::Conjunction,
        Self::Noun,
        Self::Participle,
        Self::Particle,
        Self::ProperNoun,
        Self::Pronoun,
        Self::Preposition,
        Self::Possessive,
        Self::Cardinal,
        Self::Ordinal,
        Self::Subjunction,
        Self::ForeignWord,
        Self::Verb,
        Self::MajorDelimiter,
        Self::MinorDelimiter,
        Self::PairedDelimiter,
    ];

    /// The tag as emitted by the annotation service.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Adverb => "AB",
            Self::Determiner => "DT",
            Self::InterrogativeAdverb => "HA",
            Self::InterrogativeDeterminer => "HD",
            Self::InterrogativePronoun => "HP",
            Self::InterrogativePossessive => "HS",
            Self::InfinitiveMarker => "IE",
            Self::Interjection => "IN",
            Self::Adjective => "JJ",
            Self::Conjunction => "KN",
            Self::Noun => "NN",
            Self::Participle => "PC",
            Self::Particle => "PL",
            Self::ProperNoun => "PM",
            Self::Pronoun => "PN",
            Self::Preposition => "PP",
            Self::Possessive => "PS",
            Self::Cardinal => "RG",
            Self::Ordinal => "RO",
            Self::Subjunction => "SN",
            Self::ForeignWord => "UO",
            Self::Verb => "VB",
            Self::MajorDelimiter => "MAD",
            Self::MinorDelimiter => "MID",
            Self::PairedDelimiter => "PAD",
        }
    }
}

impl fmt::Display for WordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WordClass {
    type Err = UnknownWordClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownWordClass(s.to_string()))
    }
}

/// Error returned for a tag outside the SUC tag set.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown word class '{0}'")]
pub struct UnknownWordClass(pub String);
