//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config PATH`, otherwise `config.toml` in the platform
//!    config directory
//! 3. Environment variables prefixed `DUPSWEEP_` (e.g. `DUPSWEEP_MIN_SIZE`)
//! 4. Command-line flags ([`Config::apply_filter_args`],
//!    [`Config::apply_clean_args`])
//!
//! The resulting value is passed explicitly into the finder and the deleter.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::delete::{DeleteConfig, DeleteMode};
use crate::cli::{CleanArgs, FilterArgs};
use crate::duplicates::{FinderConfig, RetentionStrategy};
use crate::error::ConfigError;
use crate::report::DEFAULT_REPORT_DIR;
use crate::scanner::{HashAlgorithm, WalkerConfig, DEFAULT_EXCLUDE_DIRS, DEFAULT_MAX_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest used to confirm duplicates.
    pub hash_algorithm: HashAlgorithm,
    /// Smallest file size considered, in bytes.
    pub min_size: u64,
    /// Largest file size considered, in bytes.
    pub max_size: u64,
    /// Extensions to restrict the scan to; empty means all files.
    pub extensions: Vec<String>,
    /// Directory names skipped anywhere below a root.
    pub exclude_dirs: Vec<String>,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Rule selecting the kept file.
    pub strategy: RetentionStrategy,
    /// Copy candidates here before deleting them.
    pub backup_dir: Option<PathBuf>,
    /// Directory receiving deletion reports.
    pub report_dir: PathBuf,
    /// How originals are removed.
    pub delete_mode: DeleteMode,
    /// Byte-compare each candidate with the kept file before deleting.
    pub paranoid: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_algorithm: HashAlgorithm::default(),
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
            extensions: Vec::new(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| (*s).to_string()).collect(),
            follow_symlinks: false,
            strategy: RetentionStrategy::default(),
            backup_dir: None,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            delete_mode: DeleteMode::default(),
            paranoid: false,
        }
    }
}

impl Config {
    /// Build the figment for the given (or default) config file.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load configuration from all layers except the command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if an explicit path does not
    /// exist, and [`ConfigError::Load`] if any layer fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
        }

        let config: Self = Self::figment(path).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupsweep").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Override settings with scan flags given on the command line.
    pub fn apply_filter_args(&mut self, args: &FilterArgs) {
        if let Some(hash) = args.hash {
            self.hash_algorithm = hash.into();
        }
        if let Some(min) = args.min_size {
            self.min_size = min;
        }
        if let Some(max) = args.max_size {
            self.max_size = max;
        }
        if !args.extensions.is_empty() {
            self.extensions.clone_from(&args.extensions);
        }
        if !args.exclude_dirs.is_empty() {
            self.exclude_dirs.clone_from(&args.exclude_dirs);
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
    }

    /// Override settings with deletion flags given on the command line.
    pub fn apply_clean_args(&mut self, args: &CleanArgs) {
        self.apply_filter_args(&args.filter);
        if let Some(strategy) = args.strategy {
            self.strategy = strategy.into();
        }
        if let Some(ref dir) = args.backup_dir {
            self.backup_dir = Some(dir.clone());
        }
        if let Some(ref dir) = args.report_dir {
            self.report_dir.clone_from(dir);
        }
        if args.trash {
            self.delete_mode = DeleteMode::Trash;
        }
        if args.paranoid {
            self.paranoid = true;
        }
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_extensions(&self.extensions)
            .with_exclude_dirs(self.exclude_dirs.iter().cloned())
            .with_size_bounds(self.min_size, self.max_size)
            .with_follow_symlinks(self.follow_symlinks)
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_walker_config(self.walker_config())
            .with_hash_algorithm(self.hash_algorithm)
    }

    /// Deletion settings for the given scanned roots.
    #[must_use]
    pub fn delete_config(&self, roots: Vec<PathBuf>) -> DeleteConfig {
        let mut config = DeleteConfig::new(roots)
            .with_strategy(self.strategy)
            .with_report_dir(self.report_dir.clone())
            .with_mode(self.delete_mode)
            .with_paranoid(self.paranoid)
            .with_hash_algorithm(self.hash_algorithm);
        if let Some(ref dir) = self.backup_dir {
            config = config.with_backup_dir(dir.clone());
        }
        config
    }
}
