use std::sync::LazyLock;

use quick_xml::escape::escape;
use regex::Regex;

/// A headline is a line of at most three words and nothing else.
static HEADLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+\s?\w+\s?\w+\s?$").expect("this must never fail"));

/// Sentences end at a full stop followed by a space.
const SENTENCE_DELIMITER: &str = ". ";

/// One paragraph of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Paragraph {
    /// A short standalone line that opens a section.
    Headline(String),
    /// Body text belonging to the most recent headline.
    Body(String),
}

/// A report split into paragraphs, before annotation.
///
/// Parsing the original file format into paragraphs happens elsewhere; this
/// type only decides which paragraphs are headlines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    paragraphs: Vec<Paragraph>,
}

impl SourceDocument {
    /// Classifies paragraphs as headlines or body text.
    ///
    /// Paragraphs are trimmed and empty ones are dropped.
    pub fn from_paragraphs<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paragraphs = paragraphs
            .into_iter()
            .filter_map(|paragraph| {
                let text = paragraph.as_ref().trim();
                if text.is_empty() {
                    None
                } else if is_headline(text) {
                    Some(Paragraph::Headline(text.to_string()))
                } else {
                    Some(Paragraph::Body(text.to_string()))
                }
            })
            .collect();

        Self { paragraphs }
    }

    /// Reads plain text, one paragraph per line.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_paragraphs(text.lines())
    }

    /// The classified paragraphs.
    #[must_use]
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// The number of non-empty paragraphs.
    #[must_use]
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Groups body paragraphs under their headline and splits them into
    /// sentences.
    ///
    /// Body text before the first headline belongs to no section and is left
    /// out.
    #[must_use]
    pub fn to_request(&self) -> AnnotationRequest {
        let mut sections: Vec<RequestSection> = Vec::new();

        for paragraph in &self.paragraphs {
            match paragraph {
                Paragraph::Headline(name) => sections.push(RequestSection {
                    name: name.clone(),
                    sentences: Vec::new(),
                }),
                Paragraph::Body(text) => {
                    if let Some(section) = sections.last_mut() {
                        section
                            .sentences
                            .extend(split_sentences(text).into_iter().map(ToString::to_string));
                    }
                }
            }
        }

        AnnotationRequest { sections }
    }
}

/// Whether a paragraph looks like a headline.
#[must_use]
pub fn is_headline(text: &str) -> bool {
    HEADLINE.is_match(text)
}

/// Splits text into sentences at `". "`.
///
/// The full stop stays with the sentence it ends; the space is dropped.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(SENTENCE_DELIMITER)
        .map(|sentence| sentence.strip_suffix(' ').unwrap_or(sentence))
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// The structured text sent to the annotation service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationRequest {
    sections: Vec<RequestSection>,
}

/// One section of an [`AnnotationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSection {
    /// The headline as written.
    pub name: String,
    /// The sentences of the section body.
    pub sentences: Vec<String>,
}

impl AnnotationRequest {
    /// Creates a request from sections.
    #[must_use]
    pub const fn new(sections: Vec<RequestSection>) -> Self {
        Self { sections }
    }

    /// The sections.
    #[must_use]
    pub fn sections(&self) -> &[RequestSection] {
        &self.sections
    }

    /// Whether there is nothing to annotate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// The request as XML: a `text` root with one `paragraph` per section,
    /// named after the headline, and one `sentence` per sentence carrying its
    /// original text.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut xml = String::from(r#"<text title="Anmälan">"#);
        for section in &self.sections {
            xml.push_str(r#"<paragraph name=""#);
            xml.push_str(&escape(section.name.as_str()));
            xml.push_str(r#"">"#);
            for sentence in &section.sentences {
                let sentence = escape(sentence.as_str());
                xml.push_str(r#"<sentence original=""#);
                xml.push_str(&sentence);
                xml.push_str(r#"">"#);
                xml.push_str(&sentence);
                xml.push_str("</sentence>");
            }
            xml.push_str("</paragraph>");
        }
        xml.push_str("</text>");
        xml
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("INLEDNING", true; "single word")]
    #[test_case("VIDTAGNA ÅTGÄRDER", true; "two words")]
    #[test_case("HÄNDELSEFÖRLOPP ENLIGT XX", true; "three words")]
    #[test_case("Parternas inbördes förhållande", true; "mixed case")]
    #[test_case("Det här är en mening.", false; "sentence")]
    #[test_case("EN TVÅ TRE FYRA", false; "four words")]
    #[test_case("BILAGOR:", false; "punctuation")]
    fn headline_heuristic(text: &str, expected: bool) {
        assert_eq!(is_headline(text), expected);
    }

    #[test]
    fn sentences_keep_their_full_stop() {
        assert_eq!(
            split_sentences("Ett rån. Ingen skadades. Polis larmades."),
            vec!["Ett rån.", "Ingen skadades.", "Polis larmades."]
        );
    }

    #[test]
    fn sentence_without_trailing_delimiter_is_kept_whole() {
        assert_eq!(split_sentences("Se bilaga 1"), vec!["Se bilaga 1"]);
        assert_eq!(
            split_sentences("Kl. 14.30 kom han"),
            vec!["Kl.", "14.30 kom han"]
        );
    }

    #[test]
    fn body_is_grouped_under_the_latest_headline() {
        let source = SourceDocument::from_text(
            "Inledande brödtext utan rubrik.\n\nINLEDNING\nAnmälan upptogs. Målsägande ringde.\n\nBROTTET\nEtt rån.\n",
        );
        assert_eq!(source.paragraph_count(), 5);

        let request = source.to_request();
        assert_eq!(
            request.sections(),
            &[
                RequestSection {
                    name: "INLEDNING".to_string(),
                    sentences: vec![
                        "Anmälan upptogs.".to_string(),
                        "Målsägande ringde.".to_string(),
                    ],
                },
                RequestSection {
                    name: "BROTTET".to_string(),
                    sentences: vec!["Ett rån.".to_string()],
                },
            ]
        );
    }

    #[test]
    fn body_without_headline_produces_empty_request() {
        let source = SourceDocument::from_text("Bara brödtext här. Inga rubriker alls.");
        assert_eq!(source.paragraph_count(), 1);
        assert!(source.to_request().is_empty());
    }

    #[test]
    fn request_xml_escapes_text() {
        let request = AnnotationRequest::new(vec![RequestSection {
            name: "BROTTET".to_string(),
            sentences: vec![r#"Han sa "stopp" & sprang."#.to_string()],
        }]);

        assert_eq!(
            request.to_xml(),
            r#"<text title="Anmälan"><paragraph name="BROTTET"><sentence original="Han sa &quot;stopp&quot; &amp; sprang.">Han sa &quot;stopp&quot; &amp; sprang.</sentence></paragraph></text>"#
        );
    }
}
