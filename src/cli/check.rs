use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use report_checker::{
    Analysis, Analyzer, AnnotateError, AnnotationTree, Annotator, Assembler, Check as CheckKind,
    Document, ExecutionPolicy, RuleRepository, SourceDocument,
    annotation::{AnnotationRequest, sparv},
};
use tracing::instrument;

use super::{
    OutputFormat, Workspace,
    terminal::{self, Colorize},
};

#[derive(Debug, Parser)]
#[command(about = "Check a report against the writing rules")]
pub struct Check {
    /// The report, as plain text with one paragraph per line
    file: PathBuf,

    /// Use a saved Sparv XML response instead of calling the service
    #[arg(long, value_name = "FILE")]
    annotation: Option<PathBuf>,

    /// Checks to run (can be specified multiple times; default: all)
    #[arg(long = "check", value_name = "CHECK")]
    checks: Vec<CheckKind>,

    /// Stop after the first check that reports anything
    #[arg(long)]
    stop_on_first_failure: bool,

    /// Skip the spelling check
    #[arg(long)]
    no_spelling: bool,

    /// Rule file to use instead of the configured one
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

/// Replays a saved annotation.
struct Saved(AnnotationTree);

impl Annotator for Saved {
    fn annotate(&self, _: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
        Ok(self.0.clone())
    }
}

impl Check {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::load(root)?;
        let rules = workspace.rules(self.rules.as_deref())?;

        let text = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let source = SourceDocument::from_text(&text);
        let document = self.document(&workspace, &source)?;

        let analysis = self.analyze(&workspace, &document, &rules);

        match self.output {
            OutputFormat::Table => print_table(&analysis),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
            OutputFormat::Summary => println!("diagnostics={}", analysis.diagnostics.len()),
        }

        if analysis.has_errors {
            std::process::exit(2);
        }

        Ok(())
    }

    fn document(&self, workspace: &Workspace, source: &SourceDocument) -> anyhow::Result<Document> {
        let Some(path) = &self.annotation else {
            return Ok(Assembler::new(workspace.annotator()?).assemble(source)?);
        };

        let xml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let tree = sparv::parse_response(&xml)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Assembler::new(Saved(tree)).assemble(source)?)
    }

    fn analyze(
        &self,
        workspace: &Workspace,
        document: &Document,
        rules: &RuleRepository,
    ) -> Analysis {
        let policy = if self.stop_on_first_failure {
            ExecutionPolicy::StopOnFirstFailure
        } else {
            workspace.config.analysis.policy
        };

        let spell_checker = if self.no_spelling {
            None
        } else {
            workspace.spell_checker()
        };

        let mut analyzer = Analyzer::new(document, rules).with_policy(policy);
        if !self.checks.is_empty() {
            analyzer = analyzer.with_checks(self.checks.iter().copied());
        }
        if let Some(checker) = &spell_checker {
            analyzer = analyzer.with_spell_checker(checker);
        }

        analyzer.run()
    }
}

fn print_table(analysis: &Analysis) {
    if !analysis.has_errors {
        println!("{}", "✓ No problems found".success());
        return;
    }

    let narrow = terminal::is_narrow();
    let width = terminal::width();

    for (diagnostic, excerpt) in analysis.excerpts() {
        let (line, column) = line_column(&analysis.text, diagnostic.span.start);
        let location = if diagnostic.span.is_document_wide() {
            "document".to_string()
        } else {
            format!("{line}:{column}")
        };

        if narrow {
            println!("{} {}", location.warning(), diagnostic.message);
        } else {
            println!(
                "{:<10} {:<24} {}",
                location.warning(),
                diagnostic.check.name().dim(),
                diagnostic.message
            );
        }

        if !excerpt.trim().is_empty() {
            let excerpt = terminal::truncate(&excerpt.replace('\n', " "), width.saturating_sub(14));
            println!("           {}", format!("» {excerpt}").dim());
        }
    }

    println!(
        "\n{}",
        format!("✗ {} problems found", analysis.diagnostics.len()).error()
    );
}

/// One-based line and column of a byte offset, counting characters.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit_once('\n')
        .map_or(before, |(_, last)| last)
        .chars()
        .count()
        + 1;
    (line, column)
}
