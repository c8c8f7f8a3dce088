//! Turning a report into an annotated [`Document`](crate::domain::Document).
//!
//! A [`SourceDocument`] is split into an [`AnnotationRequest`], an
//! [`Annotator`] produces an [`AnnotationTree`] for it, and the
//! [`Assembler`] builds the document model from the tree.

use thiserror::Error;

mod assembler;
pub use assembler::Assembler;

mod cache;
pub use cache::CachingAnnotator;

mod source;
pub use source::{
    AnnotationRequest, Paragraph, RequestSection, SourceDocument, is_headline, split_sentences,
};

/// The Sparv web service.
pub mod sparv;
pub use sparv::SparvClient;

mod tree;
pub use tree::{AnnotationTree, SectionNode, SentenceNode, TokenNode};

/// Something that can annotate a report.
pub trait Annotator {
    /// Annotates every section and sentence of `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the annotation could not be produced.
    fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError>;
}

impl<T: Annotator + ?Sized> Annotator for &T {
    fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
        (**self).annotate(request)
    }
}

impl<T: Annotator + ?Sized> Annotator for Box<T> {
    fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
        (**self).annotate(request)
    }
}

/// Errors from an annotation round-trip.
#[derive(Debug, Error)]
pub enum AnnotateError {
    /// The service could not be reached.
    #[error("annotation request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("annotation service returned HTTP {0}")]
    Status(u16),

    /// The response is not well-formed XML.
    #[error("malformed annotation response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute in the response could not be read.
    #[error("malformed attribute in annotation response: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An attribute value contains an invalid escape.
    #[error("invalid escape in annotation response: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// An element lacks an attribute the model needs.
    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        /// The element name.
        element: &'static str,
        /// The attribute name.
        attribute: &'static str,
    },

    /// A sentence contains something other than words and named entities.
    #[error("unexpected <{0}> inside a sentence")]
    UnexpectedElement(String),

    /// The response holds no annotated text.
    #[error("annotation response contains no text")]
    MissingText,
}

/// Errors from building a document.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The annotation round-trip failed.
    #[error(transparent)]
    Annotate(#[from] AnnotateError),

    /// The service returned no sections for a non-empty request.
    #[error("annotation service returned no sections")]
    EmptyResponse,

    /// The service returned a different number of sections than was sent.
    #[error("sent {sent} sections for annotation but received {received}")]
    SectionCount {
        /// Sections in the request.
        sent: usize,
        /// Sections in the response.
        received: usize,
    },
}
