use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::{Section, Sentence, Span, Word};

/// Readability scores computed by the annotation service.
///
/// Each score is absent until an annotation round-trip has produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    /// Läsbarhetsindex: average sentence length plus share of long words.
    pub lix: Option<f64>,
    /// Ordvariationsindex: lexical variation.
    pub ovix: Option<f64>,
    /// Nominal ratio: nouns, prepositions and participles versus pronouns,
    /// adverbs and verbs.
    pub nk: Option<f64>,
}

/// An annotated report.
///
/// Built once from an annotation result and immutable afterwards. The
/// reconstructed text and the position of every headline and word in it are
/// computed at construction, so lookups never disagree with
/// [`Document::text`].
#[derive(Debug, Clone)]
pub struct Document {
    sections: Vec<Section>,
    readability: Readability,
    paragraph_count: usize,
    text: String,
    headline_spans: Vec<Span>,
    word_spans: Vec<Option<Span>>,
}

impl Document {
    /// Builds a document from its sections.
    ///
    /// `paragraph_count` is the number of non-empty paragraphs in the source,
    /// headline or not. It lets the sanity check tell an empty source from
    /// one whose headlines went unrecognised.
    #[must_use]
    pub fn new(sections: Vec<Section>, readability: Readability, paragraph_count: usize) -> Self {
        let Layout {
            text,
            headline_spans,
            word_spans,
        } = Layout::compute(&sections);

        Self {
            sections,
            readability,
            paragraph_count,
            text,
            headline_spans,
            word_spans,
        }
    }

    /// A document without any recognised section.
    #[must_use]
    pub fn empty(paragraph_count: usize) -> Self {
        Self::new(Vec::new(), Readability::default(), paragraph_count)
    }

    /// The sections in the order they were written.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Every word in the document, in order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.sections.iter().flat_map(Section::words)
    }

    /// Every sentence in the document, in order.
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sections.iter().flat_map(Section::sentences)
    }

    /// The number of sentences.
    #[must_use]
    pub fn sentence_count(&self) -> usize {
        self.sentences().count()
    }

    /// The number of non-empty paragraphs in the source document.
    #[must_use]
    pub const fn paragraph_count(&self) -> usize {
        self.paragraph_count
    }

    /// The readability scores.
    #[must_use]
    pub const fn readability(&self) -> Readability {
        self.readability
    }

    /// The document as plain text: sections separated by blank lines.
    ///
    /// All positions reported by the analyzer are byte offsets into this
    /// string.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The location of the section's name in [`Document::text`].
    ///
    /// Returns `None` if `section` does not belong to this document.
    #[must_use]
    pub fn section_position(&self, section: &Section) -> Option<Span> {
        self.sections
            .iter()
            .position(|candidate| std::ptr::eq(candidate, section))
            .map(|index| self.headline_spans[index])
    }

    /// The location of `word` in [`Document::text`].
    ///
    /// The word is found by identity, so a repeated surface form resolves to
    /// its own occurrence. Returns `None` if the word does not belong to this
    /// document or its text could not be found in its sentence.
    #[must_use]
    pub fn word_position(&self, word: &Word) -> Option<Span> {
        self.words()
            .position(|candidate| candidate.is(word))
            .and_then(|index| self.word_spans[index])
    }

    /// The location of the first match of `regex` in [`Document::text`].
    #[must_use]
    pub fn regex_position(&self, regex: &Regex) -> Option<Span> {
        regex.find(&self.text).map(|found| found.range().into())
    }

    /// The number of words per sentiment class.
    #[must_use]
    pub fn tonality(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for class in self.words().filter_map(Word::sentiment_class) {
            *counts.entry(class.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// The reconstructed text and where each headline and word ended up in it.
struct Layout {
    text: String,
    headline_spans: Vec<Span>,
    word_spans: Vec<Option<Span>>,
}

impl Layout {
    fn compute(sections: &[Section]) -> Self {
        let mut text = String::new();
        let mut headline_spans = Vec::with_capacity(sections.len());
        let mut word_spans = Vec::new();

        for (index, section) in sections.iter().enumerate() {
            if index > 0 {
                text.push_str("\n\n");
            }
            let start = text.len();
            text.push_str(section.name());
            headline_spans.push(Span::new(start, text.len()));

            for (position, sentence) in section.sentences().iter().enumerate() {
                text.push(if position == 0 { '\n' } else { ' ' });
                let offset = text.len();
                text.push_str(sentence.original());
                word_spans.extend(locate_words(sentence, offset));
            }
        }

        Self {
            text,
            headline_spans,
            word_spans,
        }
    }
}

/// Finds each word of `sentence` in its original text, left to right.
///
/// The search resumes after the previous hit, so repeated words map to
/// successive occurrences. A word whose text cannot be found gets no span and
/// does not move the cursor.
fn locate_words(sentence: &Sentence, offset: usize) -> Vec<Option<Span>> {
    let original = sentence.original();
    let mut cursor = 0;

    sentence
        .words()
        .iter()
        .map(|word| {
            let found = original[cursor..].find(word.text())?;
            let start = cursor + found;
            let end = start + word.text().len();
            cursor = end;
            Some(Span::new(offset + start, offset + end))
        })
        .collect()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::domain::EntityTag;

    /// Builds a sentence whose words are the whitespace-separated tokens of
    /// `text`, with a trailing full stop split off.
    pub fn sentence(text: &str) -> Sentence {
        let mut sentence = Sentence::new(text);
        for token in text.split_whitespace() {
            match token.strip_suffix('.') {
                Some(stem) if !stem.is_empty() => {
                    sentence = sentence
                        .with_word(Word::new(stem, "NN"))
                        .with_word(Word::new(".", "MAD"));
                }
                _ => sentence = sentence.with_word(Word::new(token, "NN")),
            }
        }
        sentence
    }

    /// Builds a document from `(name, sentences)` pairs.
    pub fn document(sections: &[(&str, &[&str])]) -> Document {
        let sections: Vec<_> = sections
            .iter()
            .map(|(name, sentences)| {
                Section::new(*name, sentences.iter().map(|text| sentence(text)).collect())
            })
            .collect();
        let paragraphs = sections.len() * 2;
        Document::new(sections, Readability::default(), paragraphs)
    }

    #[test]
    fn text_joins_sections_with_blank_lines() {
        let document = document(&[
            ("INLEDNING", &["Anmälan upptogs per telefon."]),
            ("BROTTET", &["Ett rån.", "Ingen skadades."]),
        ]);

        assert_eq!(
            document.text(),
            "INLEDNING\nAnmälan upptogs per telefon.\n\nBROTTET\nEtt rån. Ingen skadades."
        );
    }

    #[test]
    fn every_headline_and_word_round_trips_through_its_position() {
        let document = document(&[
            ("INLEDNING", &["Målsägande ringde in.", "Målsägande var upprörd."]),
            ("ÖVRIGT", &["Inget övrigt att tillägga."]),
            ("ÖVRIGT", &[]),
        ]);
        let text = document.text();

        for section in document.sections() {
            let span = document.section_position(section).unwrap();
            assert_eq!(span.slice(text), Some(section.name()));
        }
        for word in document.words() {
            let span = document.word_position(word).unwrap();
            assert_eq!(span.slice(text), Some(word.text()));
        }
    }

    #[test]
    fn repeated_words_resolve_to_their_own_occurrence() {
        let document = document(&[("INLEDNING", &["Polis mötte polis och polis."])]);
        let spans: Vec<_> = document
            .words()
            .filter(|word| word.text() == "polis")
            .map(|word| document.word_position(word).unwrap())
            .collect();

        assert_eq!(spans.len(), 2);
        assert_ne!(spans[0], spans[1]);
    }

    #[test]
    fn duplicate_headline_names_resolve_to_their_own_section() {
        let document = document(&[("ÖVRIGT", &["Ett."]), ("ÖVRIGT", &["Två."])]);
        let first = document.section_position(&document.sections()[0]).unwrap();
        let second = document.section_position(&document.sections()[1]).unwrap();
        assert!(first.start < second.start);
    }

    #[test]
    fn foreign_word_has_no_position() {
        let document = document(&[("INLEDNING", &["Hej."])]);
        let stranger = Word::new("Hej", "IN");
        assert_eq!(document.word_position(&stranger), None);
    }

    #[test]
    fn word_missing_from_original_has_no_position() {
        let sentence = Sentence::new("Han sprang.")
            .with_word(Word::new("Han", "PN"))
            .with_word(Word::new("springa", "VB"))
            .with_word(Word::new(".", "MAD"));
        let document = Document::new(
            vec![Section::new("BROTTET", vec![sentence])],
            Readability::default(),
            2,
        );
        let words: Vec<_> = document.words().collect();

        assert_eq!(document.word_position(words[1]), None);
        let stop = document.word_position(words[2]).unwrap();
        assert_eq!(stop.slice(document.text()), Some("."));
    }

    #[test]
    fn tonality_counts_sentiment_classes() {
        let sentence = Sentence::new("Bra men farligt.")
            .with_word(Word::new("Bra", "JJ").with_sentiment_class("positiv"))
            .with_word(Word::new("men", "KN").with_sentiment_class("neutral"))
            .with_entity(
                EntityTag::new("ENAMEX"),
                [Word::new("farligt", "JJ").with_sentiment_class("negativ")],
            );
        let document = Document::new(
            vec![Section::new("BROTTET", vec![sentence])],
            Readability::default(),
            2,
        );

        let tonality = document.tonality();
        assert_eq!(tonality.get("positiv"), Some(&1));
        assert_eq!(tonality.get("negativ"), Some(&1));
        assert_eq!(tonality.get("neutral"), Some(&1));
    }

    #[test]
    fn regex_position_finds_first_match() {
        let document = document(&[("BROTTET", &["Ett rån. Två rån."])]);
        let regex = Regex::new("rån").unwrap();
        let span = document.regex_position(&regex).unwrap();
        assert_eq!(span.slice(document.text()), Some("rån"));
        assert_eq!(span.start, "BROTTET\nEtt ".len());
    }
}
