//! Domain models for annotated reports.
//!
//! A [`Document`] is built once from the output of the annotation service and
//! is never modified afterwards. Every check reads from it, and every
//! diagnostic points into its reconstructed text.

mod document;
pub use document::{Document, Readability};
#[cfg(test)]
pub(crate) use document::tests as fixtures;

mod section;
pub use section::Section;

/// Sentences and the named entities found in them.
pub mod sentence;
pub use sentence::{EntityTag, NamedEntity, Sentence};

mod span;
pub use span::Span;

/// Annotated words.
pub mod word;
pub use word::{Dependency, Word};
