//! Checks on the words and the text of a report.

use tracing::debug;

use crate::{
    analyzer::diagnostic::{Location, Report},
    domain::{Document, Word},
    rules::{RuleRepository, Thresholds},
    spelling::{SpellCheckError, SpellChecker},
};

/// Readability scores must lie within their thresholds.
pub(super) fn readability(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    let scores = document.readability();
    let thresholds = rules.readability();

    for (metric, score, bounds) in [
        ("LIX", scores.lix, thresholds.lix),
        ("OVIX", scores.ovix, thresholds.ovix),
        ("NK", scores.nk, thresholds.nk),
    ] {
        let Some(score) = score else {
            continue;
        };

        if let Some(message) = readability_message(metric, score, bounds) {
            report.add_error(message, Location::Document);
        }
    }
}

fn readability_message(metric: &str, score: f64, bounds: Thresholds) -> Option<String> {
    if let Some(max) = bounds.max.filter(|max| score > *max) {
        return Some(format!(
            "Texten är för svårläst: {metric} är {score:.1}, högst {max:.1} rekommenderas. \
             Skriv kortare meningar och enklare ord."
        ));
    }
    if let Some(min) = bounds.min.filter(|min| score < *min) {
        return Some(format!(
            "Texten är för enkel: {metric} är {score:.1}, minst {min:.1} rekommenderas. \
             Variera meningarna och var mer utförlig."
        ));
    }
    None
}

/// Forbidden words may only appear inside quotations.
pub(super) fn forbidden_words(
    document: &Document,
    rules: &RuleRepository,
    report: &mut Report<'_>,
) {
    for word in unquoted_words(document, rules) {
        if rules.is_forbidden(word) {
            report.add_error(
                format!("Ordet \"{}\" hör inte hemma i en anmälan.", word.text()),
                Location::Word(word),
            );
        }
    }
}

/// Unwanted words outside quotations get a suggested replacement.
pub(super) fn unwanted_words(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    for word in unquoted_words(document, rules) {
        if let Some(alternative) = rules.alternative_for(word) {
            report.add_error(
                format!(
                    "Undvik ordet \"{}\", skriv hellre \"{alternative}\".",
                    word.text()
                ),
                Location::Word(word),
            );
        }
    }
}

/// Misspelled words, as judged by the external spell checker.
///
/// Words of the classes the rules exempt are neither sent to the checker nor
/// reported, and forbidden words are left to their own check.
pub(super) fn spelling(
    document: &Document,
    rules: &RuleRepository,
    checker: &dyn SpellChecker,
    report: &mut Report<'_>,
) -> Result<(), SpellCheckError> {
    let checked = |word: &&Word| !rules.skips_spelling(word);

    let text: String = document
        .sentences()
        .map(|sentence| {
            let words: Vec<&str> = sentence
                .words()
                .iter()
                .filter(checked)
                .map(Word::text)
                .collect();
            words.join(" ") + "\n"
        })
        .collect();

    let misspellings = checker.check(&text)?;
    debug!(count = misspellings.len(), "misspelled words");

    for word in document.words().filter(checked) {
        if rules.is_forbidden(word) {
            continue;
        }
        let Some(suggestions) = misspellings.get(word.text()) else {
            continue;
        };

        let message = if suggestions.is_empty() {
            format!("Möjligt stavfel: \"{}\".", word.text())
        } else {
            format!(
                "Möjligt stavfel: \"{}\". Förslag: {}.",
                word.text(),
                suggestions.join(", ")
            )
        };
        report.add_error(message, Location::Word(word));
    }

    Ok(())
}

/// Every match of every grammar rule is reported.
pub(super) fn grammar(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    for rule in rules.grammar_rules() {
        for found in rule.regex().find_iter(document.text()) {
            report.add_error(rule.message(), Location::Span(found.range().into()));
        }
    }
}

/// The words outside quotations, delimiters excluded.
///
/// Each delimiter opens or closes a quotation. A delimiter left without a
/// partner at the end of the report opens nothing.
fn unquoted_words<'d>(document: &'d Document, rules: &RuleRepository) -> Vec<&'d Word> {
    let delimiters = document
        .words()
        .filter(|word| rules.is_citation_delimiter(word))
        .count();
    let mut paired = delimiters - delimiters % 2;

    let mut quoted = false;
    let mut words = Vec::new();
    for word in document.words() {
        if rules.is_citation_delimiter(word) {
            if paired > 0 {
                paired -= 1;
                quoted = !quoted;
            }
            continue;
        }
        if !quoted {
            words.push(word);
        }
    }
    words
}
