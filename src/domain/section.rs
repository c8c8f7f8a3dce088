use crate::domain::{Sentence, Word};

/// A headline section of a report: its title as written and its sentences.
///
/// The name is kept verbatim. Whether it is upper-case, or a recognised
/// headline at all, is for the analyzer to judge.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    sentences: Vec<Sentence>,
}

impl Section {
    /// Creates a section.
    #[must_use]
    pub fn new(name: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            name: name.into(),
            sentences,
        }
    }

    /// The section title as written.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sentences under this headline.
    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// All words of the section in order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.sentences.iter().flat_map(Sentence::words)
    }

    /// The section as plain text: the name on its own line followed by the
    /// sentences separated by single spaces.
    #[must_use]
    pub fn text(&self) -> String {
        let mut text = self.name.clone();
        for (index, sentence) in self.sentences.iter().enumerate() {
            text.push(if index == 0 { '\n' } else { ' ' });
            text.push_str(sentence.original());
        }
        text
    }
}
