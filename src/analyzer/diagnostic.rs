use serde::Serialize;
use tracing::warn;

use crate::{
    analyzer::Check,
    domain::{Document, Section, Span, Word},
};

/// A rule violation found in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The check that found it.
    pub check: Check,
    /// What is wrong, in Swedish.
    pub message: String,
    /// Where in [`Document::text`] it is. `0..0` for the whole document.
    #[serde(flatten)]
    pub span: Span,
}

/// The outcome of analyzing a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// The reconstructed report text the spans point into.
    pub text: String,
    /// The findings, in the order the checks produced them.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether there are any findings at all.
    pub has_errors: bool,
}

impl Analysis {
    /// The text each diagnostic points at.
    pub fn excerpts(&self) -> impl Iterator<Item = (&Diagnostic, &str)> {
        self.diagnostics.iter().map(|diagnostic| {
            let excerpt = diagnostic.span.slice(&self.text).unwrap_or_default();
            (diagnostic, excerpt)
        })
    }
}

/// What a diagnostic is about.
///
/// Resolved to a [`Span`] when the diagnostic is recorded. An explicit span
/// is used as is; a section resolves to its headline and a word to its own
/// occurrence. Anything that cannot be found falls back to the whole
/// document.
#[derive(Debug, Clone, Copy)]
pub enum Location<'a> {
    /// A known range of the text.
    Span(Span),
    /// A section, located by its headline.
    Section(&'a Section),
    /// A word occurrence.
    Word(&'a Word),
    /// The report as a whole.
    Document,
}

/// Collects diagnostics during one analyzer run.
pub struct Report<'a> {
    document: &'a Document,
    check: Check,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Report<'a> {
    pub const fn new(document: &'a Document) -> Self {
        Self {
            document,
            check: Check::Sanity,
            diagnostics: Vec::new(),
        }
    }

    /// Attributes subsequent diagnostics to `check`.
    pub const fn begin(&mut self, check: Check) {
        self.check = check;
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn add_error(&mut self, message: impl Into<String>, location: Location<'_>) {
        let span = self.resolve(location);
        self.diagnostics.push(Diagnostic {
            check: self.check,
            message: message.into(),
            span,
        });
    }

    fn resolve(&self, location: Location<'_>) -> Span {
        match location {
            Location::Span(span) => span,
            Location::Section(section) => {
                self.document.section_position(section).unwrap_or_else(|| {
                    warn!(section = section.name(), "headline not found in text");
                    Span::DOCUMENT
                })
            }
            Location::Word(word) => self.document.word_position(word).unwrap_or_else(|| {
                warn!(word = word.text(), "word not found in text");
                Span::DOCUMENT
            }),
            Location::Document => Span::DOCUMENT,
        }
    }

    pub fn finish(self) -> Analysis {
        Analysis {
            text: self.document.text().to_string(),
            has_errors: !self.diagnostics.is_empty(),
            diagnostics: self.diagnostics,
        }
    }
}
