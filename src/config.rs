use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{analyzer::ExecutionPolicy, annotation::sparv::DEFAULT_ENDPOINT};

/// Runtime configuration for checking reports.
///
/// Stored as TOML in `.rcheck/config.toml` under the working root. Every
/// field has a default, so an empty file (or no file) is a valid
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// How reports are annotated.
    pub annotation: AnnotationConfig,
    /// How spelling is checked.
    pub spelling: SpellingConfig,
    /// How the analyzer runs.
    pub analysis: AnalysisConfig,
}

/// Settings for the annotation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// The Sparv endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to cache annotation results under `.rcheck/cache`.
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            cache: true,
        }
    }
}

impl AnnotationConfig {
    /// The request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the external spell checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingConfig {
    /// Whether to run the spelling check at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// The checker program. It must speak the ispell pipe protocol.
    #[serde(default = "default_spelling_command")]
    pub command: String,

    /// Arguments for the checker program.
    #[serde(default = "default_spelling_args")]
    pub args: Vec<String>,
}

impl Default for SpellingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_spelling_command(),
            args: default_spelling_args(),
        }
    }
}

/// Settings for the analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Whether to stop after the first check that reports anything.
    #[serde(default)]
    pub policy: ExecutionPolicy,

    /// A rule file to use instead of the built-in rules.
    ///
    /// Relative paths are resolved against the working root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,
}

impl Config {
    /// The directory holding configuration, relative to the working root.
    pub const DIRECTORY: &'static str = ".rcheck";

    /// The configuration file name inside [`Config::DIRECTORY`].
    pub const FILE_NAME: &'static str = "config.toml";

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration for a working root, falling back to the
    /// defaults when the root has no configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(root: &Path) -> Result<Self, String> {
        let path = Self::path(root);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Where the configuration file lives for a working root.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(Self::DIRECTORY).join(Self::FILE_NAME)
    }

    /// Where annotation results are cached for a working root.
    #[must_use]
    pub fn cache_directory(root: &Path) -> PathBuf {
        root.join(Self::DIRECTORY).join("cache")
    }

    /// The configured rule file, resolved against `root`.
    #[must_use]
    pub fn rules_path(&self, root: &Path) -> Option<PathBuf> {
        self.analysis.rules.as_ref().map(|path| root.join(path))
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

fn default_spelling_command() -> String {
    "hunspell".to_string()
}

fn default_spelling_args() -> Vec<String> {
    ["-a", "-d", "sv_SE"].map(ToString::to_string).to_vec()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        annotation: AnnotationConfig,

        #[serde(default)]
        spelling: SpellingConfig,

        #[serde(default)]
        analysis: AnalysisConfig,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                annotation,
                spelling,
                analysis,
            } => Self {
                annotation,
                spelling,
                analysis,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            annotation: config.annotation,
            spelling: config.spelling,
            analysis: config.analysis,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\n\
              [annotation]\nendpoint = \"http://localhost:8080/\"\ntimeout_secs = 5\ncache = false\n\
              [spelling]\nenabled = false\n\
              [analysis]\npolicy = \"stop-on-first-failure\"\nrules = \"rules.yaml\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.annotation.endpoint, "http://localhost:8080/");
        assert_eq!(config.annotation.timeout(), Duration::from_secs(5));
        assert!(!config.annotation.cache);
        assert!(!config.spelling.enabled);
        assert_eq!(config.spelling.command, "hunspell");
        assert_eq!(config.analysis.policy, ExecutionPolicy::StopOnFirstFailure);
        assert_eq!(
            config.rules_path(Path::new("/reports")),
            Some(PathBuf::from("/reports/rules.yaml"))
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\n[annotation]\ntimeout_secs = \"soon\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn root_without_config_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(tmp.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn saved_config_loads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        let mut config = Config::default();
        config.analysis.policy = ExecutionPolicy::StopOnFirstFailure;
        config.spelling.args = vec!["-a".to_string()];

        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
