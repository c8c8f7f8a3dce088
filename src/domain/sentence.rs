use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::Word;

/// The classification of a named entity.
///
/// `identity` is the entity class key (e.g. `TIMEX`, `ENAMEX`), `kind` and
/// `subtype` refine it (e.g. `LOC` / `PPL`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTag {
    /// Entity class key.
    pub identity: String,
    /// Entity type, if tagged.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Entity subtype, if tagged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
}

impl EntityTag {
    /// Creates a tag with only an identity.
    #[must_use]
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            kind: None,
            subtype: None,
        }
    }

    /// Sets the entity type.
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the entity subtype.
    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }
}

/// A tagged span of words within a [`Sentence`].
///
/// The entity does not own its words; it indexes into the sentence's word
/// list, which stays the single source of truth for positions.
#[derive(Debug, Clone)]
pub struct NamedEntity {
    tag: EntityTag,
    words: Range<usize>,
}

impl NamedEntity {
    /// The entity classification.
    #[must_use]
    pub const fn tag(&self) -> &EntityTag {
        &self.tag
    }
}

/// A sentence: its original text, its words, and the entities among them.
#[derive(Debug, Clone)]
pub struct Sentence {
    original: String,
    words: Vec<Word>,
    entities: Vec<NamedEntity>,
}

impl Sentence {
    /// Creates a sentence with no words.
    #[must_use]
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            words: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Appends a plain word.
    #[must_use]
    pub fn with_word(mut self, word: Word) -> Self {
        self.words.push(word);
        self
    }

    /// Appends the words of a named entity and records the entity.
    ///
    /// The words are added to the flat word list in order, so every entity
    /// word is also a sentence word.
    #[must_use]
    pub fn with_entity(mut self, tag: EntityTag, words: impl IntoIterator<Item = Word>) -> Self {
        let start = self.words.len();
        self.words.extend(words);
        let end = self.words.len();
        self.entities.push(NamedEntity {
            tag,
            words: start..end,
        });
        self
    }

    /// The sentence as written in the source.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// All words, entity words included, in order.
    #[must_use]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// The named entities, in order of appearance.
    #[must_use]
    pub fn entities(&self) -> &[NamedEntity] {
        &self.entities
    }

    /// The words belonging to `entity`.
    ///
    /// Returns an empty slice if `entity` belongs to another sentence and its
    /// range falls outside this one.
    #[must_use]
    pub fn entity_words(&self, entity: &NamedEntity) -> &[Word] {
        self.words.get(entity.words.clone()).unwrap_or_default()
    }
}
