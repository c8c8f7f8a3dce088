//! Spell checking through an external checker.
//!
//! The analyzer only needs to know which words are misspelled and what the
//! checker suggests instead; [`SpellChecker`] is that seam.
//! [`HunspellChecker`] talks to any program speaking the ispell pipe
//! protocol (`hunspell -a`, `aspell -a`).

use std::{
    collections::BTreeMap,
    io::{self, Write},
    process::{Command, Stdio},
    thread,
};

use thiserror::Error;
use tracing::{debug, instrument};

/// Misspelled words mapped to suggested replacements, best first.
pub type Misspellings = BTreeMap<String, Vec<String>>;

/// Something that finds misspelled words.
pub trait SpellChecker {
    /// Checks `text` and returns every misspelled word with its suggestions.
    ///
    /// # Errors
    ///
    /// Returns an error if the checker could not be run.
    fn check(&self, text: &str) -> Result<Misspellings, SpellCheckError>;
}

impl<S: SpellChecker + ?Sized> SpellChecker for &S {
    fn check(&self, text: &str) -> Result<Misspellings, SpellCheckError> {
        (**self).check(text)
    }
}

/// Errors from the spell checker.
#[derive(Debug, Error)]
pub enum SpellCheckError {
    /// The checker program could not be started or talked to.
    #[error("failed to run spell checker '{command}': {source}")]
    Io {
        /// The program.
        command: String,
        /// The underlying error.
        source: io::Error,
    },

    /// The checker exited with an error.
    #[error("spell checker '{command}' failed: {stderr}")]
    Failed {
        /// The program.
        command: String,
        /// What it printed on standard error.
        stderr: String,
    },
}

/// Runs a spell checker speaking the ispell pipe protocol.
#[derive(Debug, Clone)]
pub struct HunspellChecker {
    command: String,
    args: Vec<String>,
}

impl Default for HunspellChecker {
    fn default() -> Self {
        Self::new("hunspell", ["-a", "-d", "sv_SE"])
    }
}

impl HunspellChecker {
    /// Creates a checker running `command` with `args`.
    ///
    /// The arguments must put the program in pipe mode, usually `-a`.
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn io_error(&self, source: io::Error) -> SpellCheckError {
        SpellCheckError::Io {
            command: self.command.clone(),
            source,
        }
    }
}

impl SpellChecker for HunspellChecker {
    #[instrument(level = "debug", skip_all, fields(command = %self.command))]
    fn check(&self, text: &str) -> Result<Misspellings, SpellCheckError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|error| self.io_error(error))?;

        // A leading '^' keeps lines from being read as pipe commands.
        let input: String = text.lines().map(|line| format!("^{line}\n")).collect();
        let stdin = child.stdin.take();
        let writer = thread::spawn(move || {
            stdin.map_or(Ok(()), |mut stdin| stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|error| self.io_error(error))?;
        writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")))
            .map_err(|error| self.io_error(error))?;

        if !output.status.success() {
            return Err(SpellCheckError::Failed {
                command: self.command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let misspellings = parse_pipe_output(&String::from_utf8_lossy(&output.stdout));
        debug!(count = misspellings.len(), "spell check finished");
        Ok(misspellings)
    }
}

/// Collects the misspelled words from ispell pipe output.
///
/// `& word count offset: a, b` carries suggestions, `? word count offset: a`
/// carries guesses and `# word offset` has none. Every other line is ignored.
#[must_use]
pub fn parse_pipe_output(output: &str) -> Misspellings {
    let mut misspellings = Misspellings::new();

    for line in output.lines() {
        let Some((marker, rest)) = line.split_at_checked(1) else {
            continue;
        };
        let mut fields = rest.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };

        let suggestions = match marker {
            "&" | "?" => rest
                .split_once(':')
                .map(|(_, list)| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|suggestion| !suggestion.is_empty())
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            "#" => Vec::new(),
            _ => continue,
        };

        misspellings.entry(word.to_string()).or_insert(suggestions);
    }

    misspellings
}
