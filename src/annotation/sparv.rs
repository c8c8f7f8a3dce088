//! The Sparv annotation web service.
//!
//! See <https://spraakbanken.gu.se/sparv> for the attributes the service can
//! produce. The settings below ask for exactly what the document model needs.

use std::{borrow::Cow, time::Duration};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use tracing::{debug, info, instrument};

use crate::{
    annotation::{
        AnnotateError, AnnotationRequest, Annotator,
        tree::{AnnotationTree, SectionNode, SentenceNode, TokenNode},
    },
    domain::{Dependency, EntityTag, Readability, Word},
};

/// The public Sparv v2 endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ws.spraakbanken.gu.se/ws/sparv/v2/";

/// Annotates reports with the Sparv web service.
#[derive(Debug, Clone)]
pub struct SparvClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl SparvClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, AnnotateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Annotator for SparvClient {
    #[instrument(level = "debug", skip_all, fields(endpoint = %self.endpoint))]
    fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
        info!(sections = request.sections().len(), "requesting annotation");

        let form = [
            ("text", request.to_xml()),
            ("mode", "xml".to_string()),
            ("settings", settings().to_string()),
        ];
        let response = self.client.post(&self.endpoint).form(&form).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnnotateError::Status(status.as_u16()));
        }

        let body = response.text()?;
        debug!(bytes = body.len(), "annotation received");
        parse_response(body.trim())
    }
}

/// The pipeline configuration sent with every request.
#[must_use]
pub fn settings() -> serde_json::Value {
    serde_json::json!({
        "corpus": "untitled",
        "lang": "sv",
        "textmode": "xml",
        "word_segmenter": "default_tokenizer",
        "sentence_segmentation": {
            "tag": "sentence",
            "attributes": ["original"]
        },
        "paragraph_segmentation": {
            "tag": "paragraph",
            "attributes": ["name"]
        },
        "root": {
            "tag": "text",
            "attributes": ["title"]
        },
        "extra_tags": [],
        "positional_attributes": {
            "lexical_attributes": ["pos", "msd", "lemma", "lex", "sense"],
            "compound_attributes": ["complemgram", "compwf"],
            "dependency_attributes": ["ref", "dephead", "deprel"],
            "sentiment": ["sentiment", "sentimentclass"]
        },
        "named_entity_recognition": ["ex", "type", "subtype"],
        "text_attributes": {
            "readability_metrics": ["lix", "ovix", "nk"]
        }
    })
}

/// Parses a Sparv XML response.
///
/// The annotated report is the `text` element directly inside `corpus`;
/// anything outside it is ignored. Inside a sentence only `w` and `ne`
/// elements are allowed.
///
/// # Errors
///
/// Returns an error if the XML is malformed, a word lacks a required
/// attribute, a sentence contains an unknown element, or there is no
/// annotated text at all.
pub fn parse_response(xml: &str) -> Result<AnnotationTree, AnnotateError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = ResponseParser::default();
    loop {
        match reader.read_event()? {
            Event::Start(element) => parser.open(&element)?,
            Event::Empty(element) => {
                parser.open(&element)?;
                parser.close(element.name().as_ref());
            }
            Event::End(element) => parser.close(element.name().as_ref()),
            Event::Text(text) => parser.text(&text.unescape()?),
            Event::CData(data) => parser.text(&String::from_utf8_lossy(&data)),
            Event::Eof => break,
            _ => {}
        }
    }

    parser.finish()
}

/// Builds the tree while walking the XML events.
#[derive(Default)]
struct ResponseParser {
    /// Names of the open elements.
    path: Vec<Vec<u8>>,
    tree: Option<AnnotationTree>,
    finished: bool,
    section: Option<SectionNode>,
    sentence: Option<SentenceNode>,
    entity: Option<(EntityTag, Vec<Word>)>,
    word: Option<(Word, String)>,
}

impl ResponseParser {
    const fn in_text(&self) -> bool {
        self.tree.is_some() && !self.finished
    }

    fn under_corpus(&self) -> bool {
        self.path.last().is_some_and(|parent| parent == b"corpus")
    }

    fn open(&mut self, element: &BytesStart) -> Result<(), AnnotateError> {
        let name = element.name().as_ref().to_vec();

        match name.as_slice() {
            b"text" if !self.finished && self.under_corpus() => {
                self.tree = Some(AnnotationTree {
                    sections: Vec::new(),
                    readability: Readability {
                        lix: score(element, "lix")?,
                        ovix: score(element, "ovix")?,
                        nk: score(element, "nk")?,
                    },
                });
            }
            b"paragraph" if self.in_text() => {
                self.section = Some(SectionNode {
                    name: required(element, "paragraph", "name")?,
                    sentences: Vec::new(),
                });
            }
            b"sentence" if self.in_text() => {
                self.sentence = Some(SentenceNode {
                    original: required(element, "sentence", "original")?,
                    tokens: Vec::new(),
                });
            }
            b"ne" if self.sentence.is_some() => {
                let tag = EntityTag {
                    identity: required(element, "ne", "ex")?,
                    kind: attribute(element, "type")?.filter(|kind| !kind.is_empty()),
                    subtype: attribute(element, "subtype")?.filter(|subtype| !subtype.is_empty()),
                };
                self.entity = Some((tag, Vec::new()));
            }
            b"w" if self.sentence.is_some() => {
                self.word = Some((word(element)?, String::new()));
            }
            _ if self.sentence.is_some() => {
                return Err(AnnotateError::UnexpectedElement(
                    String::from_utf8_lossy(&name).into_owned(),
                ));
            }
            _ => {}
        }

        self.path.push(name);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some((_, content)) = &mut self.word {
            content.push_str(text);
        }
    }

    fn close(&mut self, name: &[u8]) {
        self.path.pop();

        match name {
            b"w" => {
                if let Some((word, text)) = self.word.take() {
                    let word = word.with_text(text);
                    if let Some((_, words)) = &mut self.entity {
                        words.push(word);
                    } else if let Some(sentence) = &mut self.sentence {
                        sentence.tokens.push(TokenNode::Word(word));
                    }
                }
            }
            b"ne" => {
                if let (Some((tag, words)), Some(sentence)) =
                    (self.entity.take(), &mut self.sentence)
                {
                    sentence.tokens.push(TokenNode::Entity { tag, words });
                }
            }
            b"sentence" => {
                if let (Some(sentence), Some(section)) = (self.sentence.take(), &mut self.section) {
                    section.sentences.push(sentence);
                }
            }
            b"paragraph" => {
                if let (Some(section), Some(tree)) = (self.section.take(), &mut self.tree) {
                    if !self.finished {
                        tree.sections.push(section);
                    }
                }
            }
            b"text" if self.in_text() && self.under_corpus() => {
                self.finished = true;
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<AnnotationTree, AnnotateError> {
        match self.tree {
            Some(tree) if self.finished => Ok(tree),
            _ => Err(AnnotateError::MissingText),
        }
    }
}

fn attribute(element: &BytesStart, name: &str) -> Result<Option<String>, AnnotateError> {
    Ok(element
        .try_get_attribute(name)?
        .map(|attribute| attribute.unescape_value().map(Cow::into_owned))
        .transpose()?)
}

fn required(
    element: &BytesStart,
    tag: &'static str,
    name: &'static str,
) -> Result<String, AnnotateError> {
    attribute(element, name)?.ok_or(AnnotateError::MissingAttribute {
        element: tag,
        attribute: name,
    })
}

fn score(element: &BytesStart, name: &str) -> Result<Option<f64>, AnnotateError> {
    let value = attribute(element, name)?;
    Ok(value.and_then(|value| value.trim().parse().ok()))
}

/// Reads a word's attributes. The text arrives later, with the content.
fn word(element: &BytesStart) -> Result<Word, AnnotateError> {
    let dependency = Dependency {
        relation: required(element, "w", "deprel")?,
        reference: required(element, "w", "ref")?,
        head: attribute(element, "dephead")?.unwrap_or_default(),
    };

    Ok(Word::new(String::new(), required(element, "w", "pos")?)
        .with_morphosyntax(required(element, "w", "msd")?)
        .with_base_forms(Word::parse_base_forms(&required(element, "w", "lemma")?))
        .with_sentiment_class(attribute(element, "sentimentclass")?.unwrap_or_default())
        .with_dependency(dependency))
}
