//! Writing rules for incident reports.
//!
//! Rules are data: they are loaded from a YAML file into a
//! [`RuleRepository`] at startup and never change afterwards.

mod headline;
pub use headline::{HeadlineRule, NamedEntityRequirement};

/// The rule repository and its file format.
pub mod repository;
pub use repository::{
    GrammarRule, ReadabilityThresholds, RuleRepository, RulesError, Thresholds, UnwantedWord,
};

/// String similarity for headline suggestions.
pub mod similarity;
pub use similarity::{PartialRatio, Similarity};

mod word_class;
pub use word_class::{UnknownWordClass, WordClass};
