use std::path::{Path, PathBuf};

use clap::Parser;
use report_checker::{RuleRepository, rules::HeadlineRule};
use serde_json::json;

use super::{OutputFormat, Workspace, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Validate a rule file and list its headline rules")]
pub struct Rules {
    /// Rule file to validate instead of the configured one
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Rules {
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let workspace = Workspace::load(root.to_path_buf())?;
        let rules = workspace.rules(self.rules.as_deref())?;

        match self.output {
            OutputFormat::Table => print_table(&rules),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&rules))?),
            OutputFormat::Summary => println!(
                "headlines={} forbidden_words={} unwanted_words={} grammar_rules={}",
                rules.headlines().len(),
                rules.forbidden_words().count(),
                rules.unwanted_words().len(),
                rules.grammar_rules().len()
            ),
        }

        Ok(())
    }
}

fn order(rule: &HeadlineRule) -> String {
    rule.order().map_or_else(|| "-".to_string(), |order| order.to_string())
}

fn print_table(rules: &RuleRepository) {
    println!("{:<34} {:>5}  {:<8} DEPENDS ON", "HEADLINE", "ORDER", "REQUIRED");

    for rule in rules.headlines() {
        let dependencies: Vec<String> = rule
            .dependencies()
            .iter()
            .map(|group| {
                let names: Vec<&str> = group.iter().map(String::as_str).collect();
                names.join(" | ")
            })
            .collect();

        println!(
            "{:<34} {:>5}  {:<8} {}",
            rule.name(),
            order(rule),
            if rule.is_required() { "yes" } else { "" },
            dependencies.join(", ")
        );
        if let Some(alias) = rule.alias() {
            println!("{}", format!("  alias: {alias}").dim());
        }
    }

    println!(
        "\n{}",
        format!("✓ {} headline rules loaded", rules.headlines().len()).success()
    );
}

fn to_json(rules: &RuleRepository) -> serde_json::Value {
    let headlines: Vec<_> = rules
        .headlines()
        .iter()
        .map(|rule| {
            json!({
                "name": rule.name(),
                "regex": rule.alias(),
                "order": rule.order(),
                "required": rule.is_required(),
                "dependencies": rule
                    .dependencies()
                    .iter()
                    .map(|group| group.iter().collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
                "named_entities": rule
                    .named_entities()
                    .iter()
                    .map(|requirement| json!({
                        "message": requirement.message(),
                        "tag": requirement.tag(),
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "headlines": headlines,
        "readability": rules.readability(),
        "forbidden_words": rules.forbidden_words().collect::<Vec<_>>(),
        "unwanted_words": rules.unwanted_words(),
        "citation_delimiters": rules.citation_delimiters(),
        "spelling_skip_word_classes": rules
            .spelling_skip_word_classes()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        "grammar": rules
            .grammar_rules()
            .iter()
            .map(|rule| json!({ "regex": rule.regex().as_str(), "message": rule.message() }))
            .collect::<Vec<_>>(),
    })
}
