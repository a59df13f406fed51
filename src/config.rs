use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG: &str = ".pravka.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    /// Word list or compiled `.dict` file; defaults to the installed
    /// dictionary for `language`.
    pub dictionary: Option<PathBuf>,
    pub disabled_rules: Vec<String>,
    pub chars_per_emoji: usize,
    pub spelling_word_limit: usize,
    pub max_suggestions: usize,
}

fn default_chars_per_emoji() -> usize {
    150
}

fn default_spelling_word_limit() -> usize {
    100
}

fn default_max_suggestions() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "ru_RU".to_string(),
            dictionary: None,
            disabled_rules: Vec::new(),
            chars_per_emoji: default_chars_per_emoji(),
            spelling_word_limit: default_spelling_word_limit(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        language: Option<String>,
        dictionary: Option<PathBuf>,
        disabled_rules: Vec<String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        // Load global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                log::debug!("Loading global config from {}", global_path.display());
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        // Load local config (overrides global)
        let local_path = PathBuf::from(LOCAL_CONFIG);
        if local_path.exists() {
            log::debug!("Loading local config from {}", local_path.display());
            config = config.merge(Self::from_file(&local_path)?);
        }

        // Apply CLI overrides
        if let Some(language) = language {
            config.language = language;
        }
        if dictionary.is_some() {
            config.dictionary = dictionary;
        }
        for id in disabled_rules {
            if !config.disabled_rules.contains(&id) {
                config.disabled_rules.push(id);
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // other's values override self's if they differ from defaults
        let defaults = Self::default();
        if other.language != defaults.language {
            self.language = other.language;
        }
        if other.dictionary.is_some() {
            self.dictionary = other.dictionary;
        }
        if !other.disabled_rules.is_empty() {
            self.disabled_rules = other.disabled_rules;
        }
        if other.chars_per_emoji != defaults.chars_per_emoji {
            self.chars_per_emoji = other.chars_per_emoji;
        }
        if other.spelling_word_limit != defaults.spelling_word_limit {
            self.spelling_word_limit = other.spelling_word_limit;
        }
        if other.max_suggestions != defaults.max_suggestions {
            self.max_suggestions = other.max_suggestions;
        }
        self
    }

    /// Dictionary file to load: the configured one, else the installed one.
    pub fn dictionary_path(&self) -> Option<PathBuf> {
        self.dictionary.clone().or_else(|| {
            Self::data_dir().map(|dir| dir.join(format!("{}.dict", self.language)))
        })
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pravka").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pravka").map(|dirs| dirs.data_dir().to_path_buf())
    }
}
