use crate::checker::hunspell::hunspell_words;
use anyhow::{Context, Result};
use fst::{Automaton, IntoStreamer, Set, SetBuilder, Streamer};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Known-word capability the spelling rule depends on.
pub trait WordSource: Send + Sync {
    /// `None` while the source is not ready to answer.
    fn is_known_word(&self, word: &str) -> Option<bool>;
}

pub struct Dictionary {
    set: Set<Vec<u8>>,
}

impl Dictionary {
    /// Load a compiled `.dict` FST, a hunspell `.dic` (affixes expanded when
    /// a sibling `.aff` exists) or a plain word list.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to open dictionary: {}", path.display()))?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("dict") => {
                let set = Set::new(bytes).context("Failed to parse dictionary")?;
                Ok(Self { set })
            }
            Some("dic") if path.with_extension("aff").is_file() => {
                let aff_path = path.with_extension("aff");
                let aff = fs::read(&aff_path)
                    .with_context(|| format!("Failed to open affixes: {}", aff_path.display()))?;
                Self::from_words(hunspell_words(&aff, &bytes)?)
            }
            _ => Self::from_words(parse_word_list(&String::from_utf8_lossy(&bytes))),
        }
    }

    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().to_lowercase())
            .collect();
        sorted.sort();
        sorted.dedup();

        let set = Set::from_iter(sorted).context("Failed to build dictionary")?;
        Ok(Self { set })
    }

    /// Check if word exists in dictionary (entries are stored lowercased)
    pub fn contains(&self, word: &str) -> bool {
        self.set.contains(word.as_bytes())
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Get all words with a given prefix
    pub fn words_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut results = Vec::new();
        let mut stream = self
            .set
            .search(fst::automaton::Str::new(prefix).starts_with())
            .into_stream();

        while let Some(key) = stream.next() {
            if let Ok(word) = String::from_utf8(key.to_vec()) {
                results.push(word);
            }
        }

        results
    }

    /// Build dictionary from word list
    pub fn build_from_words(words: &[String], output_path: &Path) -> Result<usize> {
        let mut sorted_words: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        sorted_words.sort();
        sorted_words.dedup();

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in &sorted_words {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(sorted_words.len())
    }
}

/// Extract words from a plain list or a hunspell `.dic` file.
///
/// The hunspell entry count on the first line and `/FLAGS` suffixes are
/// dropped; affix rules are not expanded here (see `hunspell_words`).
pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('/').next().unwrap_or("").trim())
        .filter(|word| {
            !word.is_empty()
                && !word.starts_with('#')
                && !word.contains('\u{FFFD}')
                && !word.chars().all(|c| c.is_ascii_digit())
        })
        .map(|word| word.to_lowercase())
        .collect()
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary is already loaded")]
    AlreadyLoaded,
    #[error("dictionary loading task failed: {0}")]
    Task(String),
}

/// Shared slot for a dictionary that may still be loading.
///
/// Clones share the slot, so a handle given to the spelling rule becomes
/// ready as soon as any clone installs a dictionary.
#[derive(Clone, Default)]
pub struct DictionaryHandle {
    slot: Arc<OnceLock<Dictionary>>,
}

impl DictionaryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(dictionary: Dictionary) -> Self {
        let handle = Self::new();
        // A fresh slot is always empty.
        let _ = handle.slot.set(dictionary);
        handle
    }

    pub fn is_ready(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn get(&self) -> Option<&Dictionary> {
        self.slot.get()
    }

    pub fn install(&self, dictionary: Dictionary) -> Result<(), DictionaryError> {
        self.slot
            .set(dictionary)
            .map_err(|_| DictionaryError::AlreadyLoaded)
    }

    /// Load a dictionary file on a blocking task and install it.
    pub async fn load_async(&self, path: PathBuf) -> Result<usize> {
        let dictionary = tokio::task::spawn_blocking(move || Dictionary::load_from_path(&path))
            .await
            .map_err(|e| DictionaryError::Task(e.to_string()))??;

        let words = dictionary.len();
        self.install(dictionary)?;
        log::debug!("Dictionary ready with {} words", words);
        Ok(words)
    }
}

impl WordSource for DictionaryHandle {
    fn is_known_word(&self, word: &str) -> Option<bool> {
        let dictionary = self.get()?;
        let lower = word.to_lowercase();

        Some(
            dictionary.contains(&lower)
                || (lower.contains('ё') && dictionary.contains(&lower.replace('ё', "е"))),
        )
    }
}
