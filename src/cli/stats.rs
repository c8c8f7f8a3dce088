use std::{
    collections::BTreeMap,
    ffi::OsStr,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use report_checker::{Annotator, Assembler, Document, Readability, SourceDocument};
use serde::Serialize;
use tracing::{instrument, warn};
use walkdir::WalkDir;

use super::{Workspace, terminal::Colorize};

#[derive(Debug, Parser)]
#[command(about = "Collect readability and tonality statistics for a directory of reports")]
pub struct Stats {
    /// Directory searched recursively for `.txt` reports
    directory: PathBuf,

    /// Directory to write `stats.json` and `stats_errors.json` to
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Suppress the progress bar and summary
    #[arg(long, short)]
    quiet: bool,
}

/// Statistics for one report.
#[derive(Debug, Serialize)]
struct ReportStats {
    file: PathBuf,
    paragraphs: usize,
    sections: usize,
    sentences: usize,
    words: usize,
    readability: Readability,
    tonality: BTreeMap<String, usize>,
}

impl ReportStats {
    fn new(file: PathBuf, document: &Document) -> Self {
        Self {
            file,
            paragraphs: document.paragraph_count(),
            sections: document.sections().len(),
            sentences: document.sentence_count(),
            words: document.words().count(),
            readability: document.readability(),
            tonality: document.tonality(),
        }
    }
}

/// A report that could not be annotated.
#[derive(Debug, Serialize)]
struct Failure {
    file: PathBuf,
    error: String,
}

impl Stats {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::load(root)?;
        let assembler = Assembler::new(workspace.annotator()?);

        let files = collect_reports(&self.directory);
        let progress = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(files.len() as u64)
        };
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {wide_msg}")?
                .progress_chars("=> "),
        );

        let mut stats = Vec::new();
        let mut failures = Vec::new();
        for file in files {
            progress.set_message(file.display().to_string());
            match annotate(&assembler, &file) {
                Ok(document) => stats.push(ReportStats::new(file, &document)),
                Err(error) => {
                    warn!(file = %file.display(), "{error:#}");
                    failures.push(Failure {
                        file,
                        error: format!("{error:#}"),
                    });
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        write_json(&self.out.join("stats.json"), &stats)?;
        write_json(&self.out.join("stats_errors.json"), &failures)?;

        if !self.quiet {
            println!("{}", format!("✓ {} reports annotated", stats.len()).success());
            if !failures.is_empty() {
                let message = format!("✗ {} reports failed, see stats_errors.json", failures.len());
                println!("{}", message.warning());
            }
        }

        Ok(())
    }
}

fn collect_reports(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(directory)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension() == Some(OsStr::new("txt")))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

fn annotate<A: Annotator>(assembler: &Assembler<A>, file: &Path) -> anyhow::Result<Document> {
    let text = std::fs::read_to_string(file)?;
    Ok(assembler.assemble(&SourceDocument::from_text(&text))?)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use report_checker::{
        AnnotateError, AnnotationTree,
        annotation::{AnnotationRequest, SectionNode},
    };
    use tempfile::tempdir;

    use super::*;

    struct Headlines;

    impl Annotator for Headlines {
        fn annotate(&self, request: &AnnotationRequest) -> Result<AnnotationTree, AnnotateError> {
            Ok(AnnotationTree {
                sections: request
                    .sections()
                    .iter()
                    .map(|section| SectionNode {
                        name: section.name.clone(),
                        sentences: Vec::new(),
                    })
                    .collect(),
                ..AnnotationTree::default()
            })
        }
    }

    #[test]
    fn only_text_files_are_collected_in_order() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("b.txt"), "").unwrap();
        fs::write(tmp.path().join("nested/a.txt"), "").unwrap();
        fs::write(tmp.path().join("notes.md"), "").unwrap();

        let files = collect_reports(tmp.path());

        assert_eq!(
            files,
            vec![
                tmp.path().join("b.txt"),
                tmp.path().join("nested/a.txt"),
            ]
        );
    }

    #[test]
    fn statistics_describe_the_document() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("report.txt");
        fs::write(&file, "INLEDNING\nAnmälan upptogs.\nBROTTET\nEtt rån.\n").unwrap();

        let document = annotate(&Assembler::new(Headlines), &file).unwrap();
        let stats = ReportStats::new(file.clone(), &document);

        assert_eq!(stats.paragraphs, 4);
        assert_eq!(stats.sections, 2);
        assert_eq!(stats.sentences, 0);
    }

    #[test]
    fn unreadable_report_is_an_error() {
        let tmp = tempdir().unwrap();
        let result = annotate(&Assembler::new(Headlines), &tmp.path().join("missing.txt"));
        assert!(result.is_err());
    }
}
