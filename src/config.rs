use crate::checker::dictionary::DEFAULT_BUCKETS;
use crate::scheduler::THREAD_LIMIT;
use crate::tally::DEFAULT_CAPACITY;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_thread_limit")]
    pub thread_limit: usize,

    #[serde(default = "default_max_misspelled_words")]
    pub max_misspelled_words: usize,

    #[serde(default = "default_hash_buckets")]
    pub hash_buckets: usize,

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    #[serde(default)]
    pub log_to_file: bool,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    #[serde(default = "default_preprocess")]
    pub preprocess: bool,
}

fn default_thread_limit() -> usize {
    THREAD_LIMIT
}

fn default_max_misspelled_words() -> usize {
    DEFAULT_CAPACITY
}

fn default_hash_buckets() -> usize {
    DEFAULT_BUCKETS
}

fn default_top_n() -> usize {
    3
}

fn default_log_file() -> PathBuf {
    PathBuf::from("spelltally.out")
}

fn default_preprocess() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thread_limit: default_thread_limit(),
            max_misspelled_words: default_max_misspelled_words(),
            hash_buckets: default_hash_buckets(),
            top_n: default_top_n(),
            log_to_file: false,
            log_file: default_log_file(),
            preprocess: default_preprocess(),
        }
    }
}

/// Settings given on the command line; they win over every config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub log_to_file: bool,
    pub log_file: Option<PathBuf>,
    pub no_preprocess: bool,
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(overrides: Overrides) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(".spelltally.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if overrides.log_to_file {
            config.log_to_file = true;
        }
        if let Some(log_file) = overrides.log_file {
            config.log_file = log_file;
        }
        if overrides.no_preprocess {
            config.preprocess = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        if other.thread_limit != default_thread_limit() {
            self.thread_limit = other.thread_limit;
        }
        if other.max_misspelled_words != default_max_misspelled_words() {
            self.max_misspelled_words = other.max_misspelled_words;
        }
        if other.hash_buckets != default_hash_buckets() {
            self.hash_buckets = other.hash_buckets;
        }
        if other.top_n != default_top_n() {
            self.top_n = other.top_n;
        }
        if other.log_file != default_log_file() {
            self.log_file = other.log_file;
        }
        self.log_to_file = other.log_to_file;
        self.preprocess = other.preprocess;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.thread_limit == 0 {
            anyhow::bail!("thread_limit must be at least 1");
        }
        if self.hash_buckets == 0 {
            anyhow::bail!("hash_buckets must be at least 1");
        }
        Ok(())
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spelltally").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
