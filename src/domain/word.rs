use serde::{Deserialize, Serialize};

/// A word and the linguistic tags the annotation service attached to it.
///
/// Words are compared by identity, not by text: the same surface form can
/// occur many times in a report and each occurrence is a distinct word. Use
/// [`Word::is`] rather than comparing fields.
///
/// The tag sets follow the Stockholm-Umeå Corpus conventions used by the
/// Sparv pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    text: String,
    word_class: String,
    #[serde(default)]
    morphosyntax: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    base_forms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sentiment_class: Option<String>,
    #[serde(default)]
    dependency: Dependency,
}

/// The dependency triple of a word within its sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The dependency relation label, e.g. `SS` for subject.
    pub relation: String,
    /// The position of the word itself within the sentence.
    pub reference: String,
    /// The position of the head word, empty for the root.
    pub head: String,
}

impl Word {
    /// Creates a word with the given surface text and part-of-speech tag.
    #[must_use]
    pub fn new(text: impl Into<String>, word_class: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            word_class: word_class.into(),
            morphosyntax: String::new(),
            base_forms: Vec::new(),
            sentiment_class: None,
            dependency: Dependency::default(),
        }
    }

    /// Replaces the surface text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the morphosyntactic description.
    #[must_use]
    pub fn with_morphosyntax(mut self, morphosyntax: impl Into<String>) -> Self {
        self.morphosyntax = morphosyntax.into();
        self
    }

    /// Sets the base forms. The first one is the primary lemma.
    #[must_use]
    pub fn with_base_forms<I, S>(mut self, base_forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_forms = base_forms.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the sentiment class. An empty class is treated as absent.
    #[must_use]
    pub fn with_sentiment_class(mut self, sentiment_class: impl Into<String>) -> Self {
        let class = sentiment_class.into();
        self.sentiment_class = (!class.is_empty()).then_some(class);
        self
    }

    /// Sets the dependency triple.
    #[must_use]
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependency = dependency;
        self
    }

    /// Parses a `|`-delimited lemma set such as `|polis|polisman|`.
    ///
    /// Empty entries are dropped and the order is preserved.
    #[must_use]
    pub fn parse_base_forms(raw: &str) -> Vec<String> {
        raw.split('|')
            .filter(|form| !form.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// The surface text, exactly as written.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The part-of-speech tag, e.g. `NN` or `PM`.
    #[must_use]
    pub fn word_class(&self) -> &str {
        &self.word_class
    }

    /// The morphosyntactic description, e.g. `NN.UTR.SIN.DEF.NOM`.
    #[must_use]
    pub fn morphosyntax(&self) -> &str {
        &self.morphosyntax
    }

    /// The base forms in the order the annotation service ranked them.
    #[must_use]
    pub fn base_forms(&self) -> &[String] {
        &self.base_forms
    }

    /// The primary base form, if any.
    #[must_use]
    pub fn base_form(&self) -> Option<&str> {
        self.base_forms.first().map(String::as_str)
    }

    /// The sentiment class (`positiv`, `negativ`, `neutral`), if tagged.
    #[must_use]
    pub fn sentiment_class(&self) -> Option<&str> {
        self.sentiment_class.as_deref()
    }

    /// The dependency triple.
    #[must_use]
    pub const fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    /// Whether `self` and `other` are the same occurrence.
    #[must_use]
    pub fn is(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    /// Whether the surface text or any base form equals `candidate`,
    /// ignoring case.
    #[must_use]
    pub fn has_form(&self, candidate: &str) -> bool {
        let candidate = candidate.to_lowercase();
        self.text.to_lowercase() == candidate
            || self
                .base_forms
                .iter()
                .any(|form| form.to_lowercase() == candidate)
    }
}
