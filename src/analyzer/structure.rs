//! Checks on the headline structure of a report.

use tracing::debug;

use crate::{
    analyzer::diagnostic::{Location, Report},
    domain::{Document, Section},
    rules::{HeadlineRule, RuleRepository, Similarity},
};

/// Reports a document in which no headline was recognised.
///
/// Source paragraphs without any recognised headline mean the format or the
/// headline typography broke detection; no paragraphs at all means the
/// document is empty.
pub(super) fn sanity(document: &Document, report: &mut Report<'_>) {
    if !document.sections().is_empty() {
        return;
    }

    let message = if document.paragraph_count() > 0 {
        "Inga rubriker hittades. Kontrollera att dokumentet har rätt format och att \
         rubrikerna står på egna rader, skrivna med versaler."
    } else {
        "Dokumentet är tomt."
    };
    report.add_error(message, Location::Document);
}

/// Headlines must be written in capitals.
pub(super) fn case(document: &Document, report: &mut Report<'_>) {
    for section in document.sections() {
        let name = section.name();
        if name != name.to_uppercase() {
            report.add_error(
                format!("Rubriken \"{name}\" ska skrivas med versaler."),
                Location::Section(section),
            );
        }
    }
}

/// Every headline must be a known one, and contain only letters, digits and
/// spaces.
pub(super) fn predefined(
    document: &Document,
    rules: &RuleRepository,
    similarity: &dyn Similarity,
    report: &mut Report<'_>,
) {
    for section in document.sections() {
        let name = section.name();

        if rules.match_headline(name).is_none() {
            let message = match rules.closest_headline(name, similarity) {
                Some(closest) => format!(
                    "Rubriken \"{name}\" är inte en godkänd rubrik. Menade du \"{}\"?",
                    closest.name()
                ),
                None => format!("Rubriken \"{name}\" är inte en godkänd rubrik."),
            };
            report.add_error(message, Location::Section(section));
        }

        if name.chars().any(|c| !c.is_alphanumeric() && c != ' ') {
            report.add_error(
                format!(
                    "Rubriken \"{name}\" får bara innehålla bokstäver, siffror och mellanslag."
                ),
                Location::Section(section),
            );
        }
    }
}

/// Every required headline must be present.
pub(super) fn required(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    let matched = matched_rules(document, rules);

    for rule in rules.headlines().iter().filter(|rule| rule.is_required()) {
        if !matched.iter().any(|(_, found)| std::ptr::eq(*found, rule)) {
            report.add_error(
                format!("Rubriken {} saknas.", rule.name()),
                Location::Document,
            );
        }
    }
}

/// A headline with dependencies needs at least one headline from each of its
/// groups somewhere in the report.
pub(super) fn dependencies(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    let matched = matched_rules(document, rules);

    for (section, rule) in &matched {
        for group in rule.dependencies() {
            let satisfied = group
                .iter()
                .any(|name| matched.iter().any(|(_, found)| found.is_named(name)));

            if !satisfied {
                let alternatives: Vec<&str> = group.iter().map(String::as_str).collect();
                report.add_error(
                    format!(
                        "Rubriken {} kräver att även {} finns med.",
                        section.name(),
                        alternatives_list(&alternatives)
                    ),
                    Location::Section(section),
                );
            }
        }
    }
}

/// Ordered headlines must not come after a headline with a higher order.
///
/// Each ordered headline is compared with the last ordered headline that was
/// in place. A headline out of place is reported and does not become the new
/// reference, so a single misplaced headline is reported once.
pub(super) fn order(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    let mut last: Option<(u32, &str)> = None;

    for (section, rule) in matched_rules(document, rules) {
        let Some(order) = rule.order() else {
            continue;
        };

        match last {
            Some((last_order, last_name)) if last_order > order => {
                debug!(
                    section = section.name(),
                    after = last_name,
                    "headline out of order"
                );
                report.add_error(
                    format!(
                        "Rubriken {} bör komma före {last_name}.",
                        section.name()
                    ),
                    Location::Section(section),
                );
            }
            _ => last = Some((order, section.name())),
        }
    }
}

/// Sections must mention the named entities their rule asks for.
pub(super) fn named_entities(document: &Document, rules: &RuleRepository, report: &mut Report<'_>) {
    for (section, rule) in matched_rules(document, rules) {
        for requirement in rule.named_entities() {
            if !requirement.is_satisfied_by(section) {
                report.add_error(requirement.message(), Location::Section(section));
            }
        }
    }
}

/// The sections that match a rule, with that rule, in document order.
fn matched_rules<'d, 'r>(
    document: &'d Document,
    rules: &'r RuleRepository,
) -> Vec<(&'d Section, &'r HeadlineRule)> {
    document
        .sections()
        .iter()
        .filter_map(|section| {
            let rule = rules.match_headline(section.name())?;
            Some((section, rule))
        })
        .collect()
}

/// `A`, `A eller B`, `A, B eller C`.
fn alternatives_list(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [init @ .., last] => format!("{} eller {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::{
        analyzer::{Analysis, Check},
        domain::fixtures::document,
        rules::PartialRatio,
    };

    fn builtin() -> RuleRepository {
        RuleRepository::builtin().unwrap()
    }

    fn run<'a>(document: &'a Document, check: impl FnOnce(&mut Report<'a>)) -> Analysis {
        let mut report = Report::new(document);
        report.begin(Check::Headlines);
        check(&mut report);
        report.finish()
    }

    fn excerpts(analysis: &Analysis) -> Vec<&str> {
        analysis.excerpts().map(|(_, excerpt)| excerpt).collect()
    }

    #[test]
    fn sanity_tells_empty_from_undetected() {
        let empty = Document::empty(0);
        let analysis = run(&empty, |report| sanity(&empty, report));
        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(analysis.diagnostics[0].message, "Dokumentet är tomt.");

        let undetected = Document::empty(4);
        let analysis = run(&undetected, |report| sanity(&undetected, report));
        assert_eq!(analysis.diagnostics.len(), 1);
        let message = &analysis.diagnostics[0].message;
        assert!(message.starts_with("Inga rubriker hittades."));
    }

    #[test_case("BROTTET", 0; "capitals")]
    #[test_case("Brottet", 1; "mixed case")]
    #[test_case("HÄNDELSEFÖRLOPP ENLIGT Målsägande", 1; "partly lower case")]
    #[test_case("BILAGA 1", 0; "digits")]
    fn case_requires_capitals(name: &str, expected: usize) {
        let document = document(&[(name, &["Text."])]);
        let analysis = run(&document, |report| case(&document, report));
        assert_eq!(analysis.diagnostics.len(), expected);
    }

    #[test]
    fn unknown_headline_gets_a_suggestion() {
        let rules = builtin();
        let document = document(&[
            ("INLEDNING", &["Text."]),
            ("SIGNALEMNT", &["Lång man."]),
        ]);

        let analysis = run(&document, |report| {
            predefined(&document, &rules, &PartialRatio, report);
        });

        assert_eq!(analysis.diagnostics.len(), 1);
        assert!(analysis.diagnostics[0].message.contains("\"SIGNALEMENT\""));
        assert_eq!(excerpts(&analysis), vec!["SIGNALEMNT"]);
    }

    #[test]
    fn punctuation_in_headline_is_reported_even_when_matched() {
        let rules = builtin();
        let document = document(&[("HÄNDELSEFÖRLOPP ENLIGT M-SÄGANDE", &["Text."])]);

        let analysis = run(&document, |report| {
            predefined(&document, &rules, &PartialRatio, report);
        });

        assert_eq!(analysis.diagnostics.len(), 1);
        let message = &analysis.diagnostics[0].message;
        assert!(message.contains("bokstäver, siffror och mellanslag"));
    }

    #[test]
    fn missing_required_headline_is_reported_once() {
        let rules = builtin();
        let document = document(&[("BROTTET", &["Text."]), ("ÖVRIGT", &["Text."])]);

        let analysis = run(&document, |report| required(&document, &rules, report));

        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(
            analysis.diagnostics[0].message,
            "Rubriken INLEDNING saknas."
        );
        assert!(analysis.diagnostics[0].span.is_document_wide());
    }

    #[test]
    fn required_headline_matched_by_case_insensitive_name() {
        let rules = builtin();
        let document = document(&[("Inledning", &["Text."])]);
        let analysis = run(&document, |report| required(&document, &rules, report));
        assert!(analysis.diagnostics.is_empty());
    }

    #[test]
    fn signalement_needs_an_offence_section() {
        let rules = builtin();
        let without = document(&[
            ("INLEDNING", &["Text."]),
            ("SIGNALEMENT", &["Lång man."]),
        ]);

        let analysis = run(&without, |report| dependencies(&without, &rules, report));

        assert_eq!(analysis.diagnostics.len(), 1);
        let message = &analysis.diagnostics[0].message;
        for name in ["BROTTET", "BROTTEN", "HÄNDELSEN"] {
            assert!(message.contains(name), "{message}");
        }
        assert_eq!(excerpts(&analysis), vec!["SIGNALEMENT"]);

        for offence in ["BROTTET", "BROTTEN", "HÄNDELSEN"] {
            let with = document(&[
                ("INLEDNING", &["Text."]),
                ("SIGNALEMENT", &["Lång man."]),
                (offence, &["Ett rån."]),
            ]);
            let analysis = run(&with, |report| dependencies(&with, &rules, report));
            assert!(analysis.diagnostics.is_empty(), "{offence}");
        }
    }

    #[test]
    fn order_regression_is_reported_at_the_later_section() {
        let rules = builtin();
        // Orders 1, 2, 2, none, 5, 3.
        let document = document(&[
            ("INLEDNING", &["Text."]),
            ("BROTTET", &["Text."]),
            ("HÄNDELSEN", &["Text."]),
            ("TVÅNGSMEDEL", &["Text."]),
            ("SIGNALEMENT", &["Text."]),
            ("VITTNESIAKTTAGELSER", &["Text."]),
        ]);

        let analysis = run(&document, |report| order(&document, &rules, report));

        assert_eq!(analysis.diagnostics.len(), 1);
        assert_eq!(excerpts(&analysis), vec!["VITTNESIAKTTAGELSER"]);
        assert!(analysis.diagnostics[0].message.contains("SIGNALEMENT"));
    }

    #[test]
    fn order_compares_with_the_last_section_in_place() {
        let rules = builtin();
        // Orders 1, 5, 3, 4: the 3 is out of place, and so is the 4.
        let document = document(&[
            ("INLEDNING", &["Text."]),
            ("SIGNALEMENT", &["Text."]),
            ("VITTNESIAKTTAGELSER", &["Text."]),
            ("SKADOR", &["Text."]),
        ]);

        let analysis = run(&document, |report| order(&document, &rules, report));

        assert_eq!(excerpts(&analysis), vec!["VITTNESIAKTTAGELSER", "SKADOR"]);
    }

    #[test]
    fn named_entity_requirement_uses_cheat_pattern() {
        let rules = builtin();
        let document = document(&[(
            "INLEDNING",
            &["Klockan 14.30 på Storgatan ringde hon."],
        )]);

        let analysis = run(&document, |report| {
            named_entities(&document, &rules, report);
        });

        assert!(
            analysis.diagnostics.is_empty(),
            "{:?}",
            analysis.diagnostics
        );
    }

    #[test]
    fn missing_named_entities_use_the_rule_messages() {
        let rules = builtin();
        let document = document(&[("INLEDNING", &["Hon ringde."])]);

        let analysis = run(&document, |report| {
            named_entities(&document, &rules, report);
        });

        assert_eq!(analysis.diagnostics.len(), 2);
        assert_eq!(excerpts(&analysis), vec!["INLEDNING", "INLEDNING"]);
    }

    #[test_case(&[], ""; "none")]
    #[test_case(&["A"], "A"; "one")]
    #[test_case(&["A", "B"], "A eller B"; "two")]
    #[test_case(&["A", "B", "C"], "A, B eller C"; "three")]
    fn alternatives_are_listed(names: &[&str], expected: &str) {
        assert_eq!(alternatives_list(names), expected);
    }
}
