//! Configuration types and loading for the relabel tool.
//!
//! The main entry point is [`RelabelConfig`], loaded with [`load_config`].
//! Every field has a default, so a missing or partial `relabel.yaml` is
//! valid.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up at the walk root.
pub const CONFIG_FILE_NAME: &str = "relabel.yaml";

/// Prefix of environment variables that override configuration values.
/// Nested keys are separated by `__`, e.g. `RELABEL_COMMIT__MESSAGE`.
pub const ENV_PREFIX: &str = "RELABEL_";

/// Commit message used when none is configured.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Automated change to prod GS Pipeline";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The layered configuration could not be extracted.
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The configuration could not be rendered as YAML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_yaml::Error),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// What to do when the walk staged nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyCommitPolicy {
    /// Do not call commit at all (default).
    #[default]
    Skip,
    /// Treat an empty batch as a failure.
    Error,
    /// Create an empty commit.
    Allow,
}

/// What to do when processing a single file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    /// Abort the whole walk (default).
    #[default]
    Abort,
    /// Log the failure, count it, and continue with the next file.
    Skip,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Commit section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitConfig {
    /// Message of the single batch commit.
    #[serde(default = "default_commit_message")]
    pub message: String,

    /// Override commit author (e.g. `"pipeline-bot <bot@example.com>"`).
    /// Empty means git's configured identity.
    #[serde(default)]
    pub author: String,

    /// Disable GPG signing for the batch commit.
    #[serde(default)]
    pub no_gpg_sign: bool,

    /// Behavior when nothing was staged.
    #[serde(default)]
    pub on_empty: EmptyCommitPolicy,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            message: default_commit_message(),
            author: String::new(),
            no_gpg_sign: false,
            on_empty: EmptyCommitPolicy::default(),
        }
    }
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

/// Label generation section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Length of generated labels.
    #[serde(default = "default_label_length")]
    pub length: usize,

    /// Fixed RNG seed. When unset the generator is seeded from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            length: default_label_length(),
            seed: None,
        }
    }
}

fn default_label_length() -> usize {
    8
}

/// Tree walk section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Case-sensitive substring a root-relative path must contain.
    #[serde(default = "default_path_filter")]
    pub path_filter: String,

    /// Behavior when a single file fails to process.
    #[serde(default)]
    pub on_file_error: FileErrorPolicy,

    /// Never descend into the repository's `.git` directory.
    #[serde(default = "default_true")]
    pub skip_git_dir: bool,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            path_filter: default_path_filter(),
            on_file_error: FileErrorPolicy::default(),
            skip_git_dir: true,
        }
    }
}

fn default_path_filter() -> String {
    "fields".to_string()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full relabel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RelabelConfig {
    /// Commit configuration.
    #[serde(default)]
    pub commit: CommitConfig,

    /// Label generation configuration.
    #[serde(default)]
    pub labels: LabelConfig,

    /// Tree walk configuration.
    #[serde(default)]
    pub walk: WalkConfig,
}

impl RelabelConfig {
    /// Check values that deserialize fine but make no sense.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad key.
    pub fn validate(&self) -> Result<()> {
        if self.labels.length == 0 {
            return Err(invalid("labels.length", "must be at least 1"));
        }
        if self.walk.path_filter.is_empty() {
            return Err(invalid("walk.path_filter", "must not be empty"));
        }
        if self.commit.message.trim().is_empty() {
            return Err(invalid("commit.message", "must not be empty"));
        }
        Ok(())
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Load the layered configuration for a walk rooted at `root`.
///
/// The YAML layer is `explicit` when given, otherwise `root/relabel.yaml`
/// if it exists. Environment variables prefixed with [`ENV_PREFIX`] are
/// merged last.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if `explicit` does not exist,
/// [`ConfigError::Load`] if a layer cannot be parsed, or
/// [`ConfigError::InvalidValue`] if validation fails.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<RelabelConfig> {
    let file = match explicit {
        Some(path) if !path.is_file() => return Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => path.to_path_buf(),
        None => root.join(CONFIG_FILE_NAME),
    };

    let config: RelabelConfig = Figment::from(Serialized::defaults(RelabelConfig::default()))
        .merge(Yaml::file(file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = RelabelConfig::default();
        assert_eq!(cfg.commit.message, DEFAULT_COMMIT_MESSAGE);
        assert_eq!(cfg.commit.on_empty, EmptyCommitPolicy::Skip);
        assert!(cfg.commit.author.is_empty());
        assert_eq!(cfg.labels.length, 8);
        assert_eq!(cfg.labels.seed, None);
        assert_eq!(cfg.walk.path_filter, "fields");
        assert_eq!(cfg.walk.on_file_error, FileErrorPolicy::Abort);
        assert!(cfg.walk.skip_git_dir);
        assert!(cfg.validate().is_ok());
    }

    // Loading reads `RELABEL_*` from the process environment, so every test
    // that calls `load_config` runs inside a `Jail` to stay isolated.

    #[test]
    fn test_load_without_file_returns_default() {
        Jail::expect_with(|jail| {
            let cfg = load_config(jail.directory(), None).map_err(|e| e.to_string())?;
            assert_eq!(cfg, RelabelConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_partial_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                "commit:\n  on_empty: allow\nlabels:\n  seed: 9\n",
            )?;

            let cfg = load_config(jail.directory(), None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.commit.on_empty, EmptyCommitPolicy::Allow);
            assert_eq!(cfg.labels.seed, Some(9));
            // Everything else keeps its default.
            assert_eq!(cfg.commit.message, DEFAULT_COMMIT_MESSAGE);
            assert_eq!(cfg.labels.length, 8);
            Ok(())
        });
    }

    #[test]
    fn test_load_explicit_file() {
        Jail::expect_with(|jail| {
            jail.create_file("custom.yaml", "walk:\n  on_file_error: skip\n")?;
            let path = jail.directory().join("custom.yaml");

            let cfg = load_config(jail.directory(), Some(&path)).map_err(|e| e.to_string())?;
            assert_eq!(cfg.walk.on_file_error, FileErrorPolicy::Skip);
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_explicit_file() {
        Jail::expect_with(|jail| {
            let path = jail.directory().join("nope.yaml");
            let err = load_config(jail.directory(), Some(&path)).unwrap_err();
            assert!(matches!(err, ConfigError::NotFound(_)), "got {err:?}");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_yaml_is_load_error() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "labels:\n  length: lots\n")?;
            let err = load_config(jail.directory(), None).unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)), "got {err:?}");
            Ok(())
        });
    }

    #[test]
    fn test_zero_length_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "labels:\n  length: 0\n")?;
            match load_config(jail.directory(), None).unwrap_err() {
                ConfigError::InvalidValue { key, .. } => assert_eq!(key, "labels.length"),
                other => panic!("expected InvalidValue, got: {other:?}"),
            }
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(CONFIG_FILE_NAME, "commit:\n  message: from file\n")?;
            jail.set_env("RELABEL_COMMIT__MESSAGE", "from env");
            jail.set_env("RELABEL_LABELS__LENGTH", "12");

            let cfg = load_config(jail.directory(), None).map_err(|e| e.to_string())?;
            assert_eq!(cfg.commit.message, "from env");
            assert_eq!(cfg.labels.length, 12);
            Ok(())
        });
    }

    #[test]
    fn test_to_yaml_roundtrip() {
        let mut cfg = RelabelConfig::default();
        cfg.commit.author = "bot <bot@example.com>".to_string();
        let yaml = cfg.to_yaml().unwrap();
        assert!(yaml.contains("on_empty: skip"), "{yaml}");
        let back: RelabelConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, cfg);
    }
}
