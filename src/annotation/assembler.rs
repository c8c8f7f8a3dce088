use tracing::{debug, instrument};

use crate::{
    annotation::{AssembleError, Annotator, SourceDocument},
    domain::Document,
};

/// Builds annotated documents with an [`Annotator`].
#[derive(Debug)]
pub struct Assembler<A> {
    annotator: A,
}

impl<A: Annotator> Assembler<A> {
    /// Creates an assembler around `annotator`.
    pub const fn new(annotator: A) -> Self {
        Self { annotator }
    }

    /// Annotates `source` and builds its document model.
    ///
    /// A source without any headline produces a document with no sections
    /// and never reaches the annotator; the sanity check reports it.
    ///
    /// # Errors
    ///
    /// Returns an error if annotation fails or the response does not match
    /// the request.
    #[instrument(level = "debug", skip_all, fields(paragraphs = source.paragraph_count()))]
    pub fn assemble(&self, source: &SourceDocument) -> Result<Document, AssembleError> {
        let request = source.to_request();
        if request.is_empty() {
            debug!("no headlines found, skipping annotation");
            return Ok(Document::empty(source.paragraph_count()));
        }

        let tree = self.annotator.annotate(&request)?;
        let sent = request.sections().len();
        let received = tree.sections.len();
        if received == 0 {
            return Err(AssembleError::EmptyResponse);
        }
        if received != sent {
            return Err(AssembleError::SectionCount { sent, received });
        }

        Ok(tree.into_document(source.paragraph_count()))
    }
}
