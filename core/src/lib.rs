//! libbopomofo-core
//!
//! Dictionaries, the language model gateway and the phrase grid used by the
//! `libbopomofo` key handler.
//!
//! The built-in lexicon is loaded from a text table or from `fst` + `bincode`
//! artifacts; user and excluded phrases live in memory or in a `redb` file.
//!
//! Public API:
//! - `Candidate` / `CandidateList` - scored phrase for a reading span, paged list
//! - `LanguageModel` - lookup capability; `BopomofoModel` is the implementation
//! - `Lexicon` - reading key → phrase dictionary
//! - `UserPhrases` - learned and excluded phrase stores
//! - `AssociatedPhrases` - committed text → following phrases
//! - `PhraseGrid` / `Walk` - segmentation of a reading sequence
//! - `Config` - model configuration
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::ModelError;

pub mod candidate;
pub use candidate::{Candidate, CandidateList};

pub mod lexicon;
pub use lexicon::{Lexicon, PhraseEntry};

pub mod userdict;
pub use userdict::{InMemoryUserPhrases, RedbUserPhrases, UserPhrases};

pub mod associated;
pub use associated::AssociatedPhrases;

pub mod replacement;
pub use replacement::PhraseReplacementMap;

pub mod model;
pub use model::{join_readings, BopomofoModel, LanguageModel, Unigram, READING_SEPARATOR};

pub mod grid;
pub use grid::{GridOptions, PhraseGrid, Pin, Walk, WalkStep};

/// Model configuration.
///
/// Input-method preferences (selection keys, punctuation width, etc.) are
/// not here; they travel with each key event in `libbopomofo::Preferences`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Longest phrase, in readings, considered by the phrase grid.
    pub max_span_length: usize,

    /// Score given to a reading with no dictionary entry, shown raw.
    pub unknown_reading_score: f64,

    /// Score assigned to user-taught phrases. The default of 0 ranks them
    /// above any built-in entry.
    pub user_phrase_score: f64,

    /// Apply the phrase replacement map to lookup results.
    pub phrase_replacement_enabled: bool,

    // Cache Management
    /// Maximum number of entries in the reading -> unigrams cache
    pub max_cache_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_span_length: 6,
            unknown_reading_score: -99.0,
            user_phrase_score: 0.0,
            phrase_replacement_enabled: false,
            max_cache_size: 1000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str("max_span_length = 4\n").unwrap();
        assert_eq!(cfg.max_span_length, 4);
        assert_eq!(cfg.max_cache_size, 1000);
    }

    #[test]
    fn toml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        let cfg = Config {
            phrase_replacement_enabled: true,
            ..Config::default()
        };
        cfg.save_toml(&path).unwrap();
        assert_eq!(Config::load_toml(&path).unwrap(), cfg);
    }

    #[test]
    fn normalize_composes_and_trims() {
        // e + combining acute -> é
        assert_eq!(utils::normalize(" e\u{301} "), "\u{e9}");
    }
}
