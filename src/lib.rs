//! Writing-rule checks for police incident reports
//!
//! A report is split into headline sections, annotated by an external
//! linguistic service and turned into a [`Document`]. An [`Analyzer`] then
//! checks the document against a [`RuleRepository`] and reports every
//! violation with its location in the text.

pub mod analyzer;
pub use analyzer::{Analysis, Analyzer, Check, Diagnostic, ExecutionPolicy};

pub mod annotation;
pub use annotation::{
    AnnotateError, AnnotationTree, Annotator, AssembleError, Assembler, CachingAnnotator,
    SourceDocument, SparvClient,
};

mod config;
pub use config::{AnalysisConfig, AnnotationConfig, Config, SpellingConfig};

pub mod domain;
pub use domain::{Document, Readability, Section, Sentence, Span, Word};

pub mod rules;
pub use rules::{RuleRepository, RulesError};

pub mod spelling;
pub use spelling::{HunspellChecker, SpellCheckError, SpellChecker};
