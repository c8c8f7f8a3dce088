use serde::{Deserialize, Serialize};

use crate::domain::{Document, EntityTag, Readability, Section, Sentence, Word};

/// What the annotation service returned for a report.
///
/// A neutral tree between the wire format and the [`Document`] model, so
/// that annotators can be swapped or faked without touching the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationTree {
    /// One node per headline section.
    pub sections: Vec<SectionNode>,
    /// Document-level readability scores.
    #[serde(default)]
    pub readability: Readability,
}

/// An annotated section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionNode {
    /// The headline as written.
    pub name: String,
    /// The annotated sentences.
    #[serde(default)]
    pub sentences: Vec<SentenceNode>,
}

/// An annotated sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceNode {
    /// The sentence as written.
    pub original: String,
    /// Words and named entities, in order.
    #[serde(default)]
    pub tokens: Vec<TokenNode>,
}

/// A token inside a sentence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TokenNode {
    /// A plain word.
    Word(Word),
    /// A named entity spanning one or more words.
    Entity {
        /// The entity classification.
        tag: EntityTag,
        /// The words of the entity.
        words: Vec<Word>,
    },
}

impl AnnotationTree {
    /// Builds the document model.
    ///
    /// `paragraph_count` is the number of non-empty paragraphs in the source
    /// the tree was annotated from.
    #[must_use]
    pub fn into_document(self, paragraph_count: usize) -> Document {
        let sections = self
            .sections
            .into_iter()
            .map(|section| {
                Section::new(
                    section.name,
                    section.sentences.into_iter().map(Sentence::from).collect(),
                )
            })
            .collect();

        Document::new(sections, self.readability, paragraph_count)
    }
}

impl From<SentenceNode> for Sentence {
    fn from(node: SentenceNode) -> Self {
        node.tokens
            .into_iter()
            .fold(Self::new(node.original), |sentence, token| match token {
                TokenNode::Word(word) => sentence.with_word(word),
                TokenNode::Entity { tag, words } => sentence.with_entity(tag, words),
            })
    }
}
