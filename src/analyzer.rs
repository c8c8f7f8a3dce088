//! Running the checks against a document.
//!
//! An [`Analyzer`] runs a fixed sequence of [`Check`]s over one [`Document`]
//! with one [`RuleRepository`] and collects what they find. The sanity check
//! always runs first: a document without recognised headlines would only
//! produce noise from every other check, so nothing else runs when it fails.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

mod diagnostic;
pub use diagnostic::{Analysis, Diagnostic, Location};
use diagnostic::Report;

mod lexical;
mod structure;

use crate::{
    domain::Document,
    rules::{PartialRatio, RuleRepository, Similarity},
    spelling::SpellChecker,
};

/// What to do once a check has found something.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionPolicy {
    /// Run every check and report everything.
    #[default]
    CollectAll,
    /// Skip the remaining checks once any check has reported something.
    StopOnFirstFailure,
}

/// A check routine, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Check {
    /// The document has at least one recognised headline.
    Sanity,
    /// Headlines are written in capitals.
    HeadlinesCase,
    /// Headlines are known and contain no punctuation.
    Headlines,
    /// Required headlines are present.
    HeadlinesRequired,
    /// Headlines that depend on others have them.
    HeadlinesDependencies,
    /// Ordered headlines appear in order.
    HeadlinesOrder,
    /// Sections mention the named entities their rule asks for.
    NamedEntities,
    /// Readability scores are within bounds.
    Readability,
    /// No forbidden words outside quotations.
    ForbiddenWords,
    /// Unwanted words outside quotations.
    UnwantedWords,
    /// Spelling, by the external spell checker.
    Spelling,
    /// Grammar patterns.
    Grammar,
}

impl Check {
    /// Every check, in running order.
    pub const ALL: [Self; 12] = [
        Self::Sanity,
        Self::HeadlinesCase,
        Self::Headlines,
        Self::HeadlinesRequired,
        Self::HeadlinesDependencies,
        Self::HeadlinesOrder,
        Self::NamedEntities,
        Self::Readability,
        Self::ForbiddenWords,
        Self::UnwantedWords,
        Self::Spelling,
        Self::Grammar,
    ];

    /// The name used on the command line and in output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sanity => "sanity",
            Self::HeadlinesCase => "headlines-case",
            Self::Headlines => "headlines",
            Self::HeadlinesRequired => "headlines-required",
            Self::HeadlinesDependencies => "headlines-dependencies",
            Self::HeadlinesOrder => "headlines-order",
            Self::NamedEntities => "named-entities",
            Self::Readability => "readability",
            Self::ForbiddenWords => "forbidden-words",
            Self::UnwantedWords => "unwanted-words",
            Self::Spelling => "spelling",
            Self::Grammar => "grammar",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A check name that is not known.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown check '{0}'")]
pub struct UnknownCheck(pub String);

impl FromStr for Check {
    type Err = UnknownCheck;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|check| check.name() == name)
            .ok_or_else(|| UnknownCheck(s.to_string()))
    }
}

/// Checks one document against one set of rules.
///
/// The analyzer only reads the document and the rules, so [`Analyzer::run`]
/// can be called any number of times and gives the same result each time.
pub struct Analyzer<'a> {
    document: &'a Document,
    rules: &'a RuleRepository,
    policy: ExecutionPolicy,
    checks: Vec<Check>,
    spell_checker: Option<&'a dyn SpellChecker>,
    similarity: &'a dyn Similarity,
}

impl fmt::Debug for Analyzer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("sections", &self.document.sections().len())
            .field("policy", &self.policy)
            .field("checks", &self.checks)
            .field("spelling", &self.spell_checker.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> Analyzer<'a> {
    /// Creates an analyzer running every check, except spelling, and
    /// collecting all diagnostics.
    #[must_use]
    pub fn new(document: &'a Document, rules: &'a RuleRepository) -> Self {
        Self {
            document,
            rules,
            policy: ExecutionPolicy::default(),
            checks: Check::ALL.to_vec(),
            spell_checker: None,
            similarity: &PartialRatio,
        }
    }

    /// Sets what happens after a check reports something.
    #[must_use]
    pub const fn with_policy(mut self, policy: ExecutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Restricts the run to `checks`. The sanity check runs regardless, and
    /// checks always run in their fixed order.
    #[must_use]
    pub fn with_checks(mut self, checks: impl IntoIterator<Item = Check>) -> Self {
        self.checks = checks.into_iter().collect();
        self
    }

    /// Enables the spelling check with `checker`.
    #[must_use]
    pub fn with_spell_checker(mut self, checker: &'a dyn SpellChecker) -> Self {
        self.spell_checker = Some(checker);
        self
    }

    /// Replaces the scorer used to suggest headlines.
    #[must_use]
    pub fn with_similarity(mut self, similarity: &'a dyn Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    /// The checks that will run, in order.
    #[must_use]
    pub fn selected_checks(&self) -> Vec<Check> {
        let selected = |check: &Check| *check == Check::Sanity || self.checks.contains(check);
        let runnable = |check: &Check| *check != Check::Spelling || self.spell_checker.is_some();

        Check::ALL
            .into_iter()
            .filter(selected)
            .filter(runnable)
            .collect()
    }

    /// Runs the checks.
    ///
    /// A spell checker that cannot be run is logged and the spelling check is
    /// skipped; the remaining checks still run.
    #[must_use]
    #[instrument(level = "debug", skip_all, fields(sections = self.document.sections().len()))]
    pub fn run(&self) -> Analysis {
        let mut report = Report::new(self.document);

        for check in self.selected_checks() {
            let before = report.len();
            report.begin(check);
            self.run_check(check, &mut report);

            let found = report.len() - before;
            debug!(%check, found, "check finished");

            if found > 0 && check == Check::Sanity {
                info!("document has no recognised headlines, skipping remaining checks");
                break;
            }
            if found > 0 && self.policy == ExecutionPolicy::StopOnFirstFailure {
                info!(%check, "stopping after first failing check");
                break;
            }
        }

        report.finish()
    }

    fn run_check(&self, check: Check, report: &mut Report<'a>) {
        let (document, rules) = (self.document, self.rules);

        match check {
            Check::Sanity => structure::sanity(document, report),
            Check::HeadlinesCase => structure::case(document, report),
            Check::Headlines => structure::predefined(document, rules, self.similarity, report),
            Check::HeadlinesRequired => structure::required(document, rules, report),
            Check::HeadlinesDependencies => structure::dependencies(document, rules, report),
            Check::HeadlinesOrder => structure::order(document, rules, report),
            Check::NamedEntities => structure::named_entities(document, rules, report),
            Check::Readability => lexical::readability(document, rules, report),
            Check::ForbiddenWords => lexical::forbidden_words(document, rules, report),
            Check::UnwantedWords => lexical::unwanted_words(document, rules, report),
            Check::Spelling => {
                if let Some(checker) = self.spell_checker {
                    if let Err(error) = lexical::spelling(document, rules, checker, report) {
                        warn!("{error}, skipping the spelling check");
                    }
                }
            }
            Check::Grammar => lexical::grammar(document, rules, report),
        }
    }
}
