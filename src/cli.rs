use std::path::{Path, PathBuf};

mod check;
mod rules;
mod stats;
mod terminal;

use anyhow::Context;
use check::Check;
use clap::ArgAction;
use report_checker::{
    Annotator, CachingAnnotator, Config, HunspellChecker, RuleRepository, SparvClient,
    rules::repository::BUILTIN_RULES,
};
use rules::Rules;
use stats::Stats;
use tracing::{debug, instrument};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The working directory holding `.rcheck/`
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.command.run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Create `.rcheck/` with a default configuration and rule file
    Init,

    /// Check a report against the writing rules
    Check(Check),

    /// Validate a rule file and list its headline rules
    Rules(Rules),

    /// Collect readability and tonality statistics for a directory of
    /// reports
    Stats(Stats),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => init(&root)?,
            Self::Check(command) => command.run(root)?,
            Self::Rules(command) => command.run(&root)?,
            Self::Stats(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    use std::fs;

    let directory = root.join(Config::DIRECTORY);
    if directory.exists() {
        anyhow::bail!(
            "Already initialized (found existing {} directory)",
            Config::DIRECTORY
        );
    }

    fs::create_dir_all(&directory)
        .with_context(|| format!("Failed to create {}", directory.display()))?;

    let rules_path = directory.join("rules.yaml");
    fs::write(&rules_path, BUILTIN_RULES)
        .with_context(|| format!("Failed to create {}", rules_path.display()))?;

    let mut config = Config::default();
    config.analysis.rules = Some(Path::new(Config::DIRECTORY).join("rules.yaml"));
    config
        .save(&Config::path(root))
        .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

    println!("Initialized report checking in {}", root.display());
    println!("  Created: {}/{}", Config::DIRECTORY, Config::FILE_NAME);
    println!("  Created: {}/rules.yaml", Config::DIRECTORY);
    println!();
    println!("Next steps:");
    println!("  Edit the rules in {}/rules.yaml", Config::DIRECTORY);
    println!("  rcheck check report.txt");

    Ok(())
}

/// The configuration and collaborators for one working root.
struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    fn load(root: PathBuf) -> anyhow::Result<Self> {
        let config = Config::load_or_default(&root).map_err(|e| anyhow::anyhow!(e))?;
        debug!(?config, "configuration loaded");
        Ok(Self { root, config })
    }

    /// Loads `path` if given, otherwise the configured rule file, otherwise
    /// the built-in rules.
    fn rules(&self, path: Option<&Path>) -> anyhow::Result<RuleRepository> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| self.config.rules_path(&self.root));

        path.map_or_else(
            || RuleRepository::builtin().context("Failed to load built-in rules"),
            |path| {
                RuleRepository::load(&path)
                    .with_context(|| format!("Failed to load rules from {}", path.display()))
            },
        )
    }

    fn annotator(&self) -> anyhow::Result<Box<dyn Annotator>> {
        let settings = &self.config.annotation;
        let client = SparvClient::new(settings.endpoint.clone(), settings.timeout())?;

        if settings.cache {
            let cache = CachingAnnotator::new(client, Config::cache_directory(&self.root))
                .context("Failed to create annotation cache")?;
            Ok(Box::new(cache))
        } else {
            Ok(Box::new(client))
        }
    }

    fn spell_checker(&self) -> Option<HunspellChecker> {
        let settings = &self.config.spelling;
        settings.enabled.then(|| {
            HunspellChecker::new(settings.command.clone(), settings.args.clone())
        })
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn init_creates_config_and_rules() {
        let tmp = tempdir().unwrap();

        init(tmp.path()).unwrap();

        let workspace = Workspace::load(tmp.path().to_path_buf()).unwrap();
        assert!(workspace.config.analysis.rules.is_some());
        let rules = workspace.rules(None).unwrap();
        assert!(rules.headline("INLEDNING").is_some());

        assert!(init(tmp.path()).is_err());
    }

    #[test]
    fn workspace_without_config_uses_builtin_rules() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::load(tmp.path().to_path_buf()).unwrap();

        let rules = workspace.rules(None).unwrap();

        assert_eq!(
            rules.headlines().len(),
            RuleRepository::builtin().unwrap().headlines().len()
        );
        assert!(workspace.spell_checker().is_some());
    }

    #[test]
    fn missing_rule_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let workspace = Workspace::load(tmp.path().to_path_buf()).unwrap();

        let missing = tmp.path().join("missing.yaml");
        let error = workspace.rules(Some(&missing)).unwrap_err();

        assert!(error.to_string().starts_with("Failed to load rules from"));
    }

    #[test]
    fn check_arguments_parse() {
        let cli = Cli::try_parse_from([
            "rcheck",
            "-vv",
            "check",
            "report.txt",
            "--check",
            "grammar",
            "--check",
            "headlines-order",
            "--stop-on-first-failure",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Check(_)));
    }
}
