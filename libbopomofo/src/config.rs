//! Engine configuration that extends the base `Config` from core.
//!
//! This configuration includes:
//! - All model options from `libbopomofo_core::Config` (flattened via serde)
//! - The keyboard layout used by the syllable composer
//! - A `[preferences]` table, handed to the key handler with every event
//! - A `[data]` table naming the files the model is built from
//!
//! # Example
//!
//! ```rust
//! use libbopomofo::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str("keyboard_layout = \"eten\"\n").unwrap();
//! assert_eq!(config.preferences.page_size(), 9);
//! ```

use crate::error::ConfigError;
use crate::layout::KeyboardLayout;
use libbopomofo_core::{AssociatedPhrases, BopomofoModel, Lexicon, ModelError, PhraseReplacementMap, UserPhrases};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How completed syllables are presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Phrase-level composition: readings accumulate and the grid picks
    /// phrases across the whole buffer.
    #[default]
    Bopomofo,
    /// One syllable at a time: every completed reading is resolved right
    /// away through a candidate list.
    PlainBopomofo,
}

/// Preferences read once per key event. Never written by the handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Preferences {
    pub input_mode: InputMode,
    pub half_width_punctuation_enabled: bool,
    pub associated_phrases_enabled: bool,
    /// Selection keys, one per candidate on a page.
    pub candidate_keys: String,
    /// Readings kept in the buffer before leading phrases are committed.
    pub composing_buffer_size: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Bopomofo,
            half_width_punctuation_enabled: false,
            associated_phrases_enabled: false,
            candidate_keys: "123456789".to_string(),
            composing_buffer_size: 20,
        }
    }
}

impl Preferences {
    pub fn plain() -> Self {
        Self {
            input_mode: InputMode::PlainBopomofo,
            ..Self::default()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.input_mode == InputMode::PlainBopomofo
    }

    /// Position of `key` among the selection keys.
    pub fn selection_key_index(&self, key: char) -> Option<usize> {
        self.candidate_keys.chars().position(|c| c == key)
    }

    pub fn page_size(&self) -> usize {
        self.candidate_keys.chars().count().max(1)
    }
}

/// Files the model is built from. Anything left out falls back to the
/// built-in tables and in-memory stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataFiles {
    /// Directory with lexicon.fst and lexicon.bincode
    pub lexicon_dir: Option<PathBuf>,
    /// redb file holding user and excluded phrases
    pub user_phrases: Option<PathBuf>,
    /// `reading value` lines added to the user phrases at startup
    pub import_user_phrases: Option<PathBuf>,
    /// `reading value` lines hidden from every lookup
    pub excluded_phrases: Option<PathBuf>,
    /// `value replacement` lines, used when `phrase_replacement_enabled` is set
    pub replacements: Option<PathBuf>,
    /// Associated phrase table used instead of the built-in one
    pub associated_phrases: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base model configuration (span length, scores, cache size, etc.)
    #[serde(flatten)]
    pub base: libbopomofo_core::Config,

    pub keyboard_layout: KeyboardLayout,

    pub preferences: Preferences,

    pub data: DataFiles,
}

impl EngineConfig {
    /// Convert into the base config for use with `BopomofoModel::new()`
    pub fn into_base(self) -> libbopomofo_core::Config {
        self.base
    }

    pub fn base(&self) -> &libbopomofo_core::Config {
        &self.base
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build the language model from the `[data]` files.
    pub fn build_model(&self) -> Result<BopomofoModel, ModelError> {
        let data = &self.data;
        let lexicon = match &data.lexicon_dir {
            Some(dir) => {
                let lexicon =
                    Lexicon::load_from_fst_bincode(dir.join("lexicon.fst"), dir.join("lexicon.bincode"))?;
                tracing::info!(dir = %dir.display(), entries = lexicon.len(), "lexicon loaded");
                lexicon
            }
            None => Lexicon::builtin()?,
        };
        let associated = match &data.associated_phrases {
            Some(path) => AssociatedPhrases::load_text(path)?,
            None => AssociatedPhrases::builtin()?,
        };
        let mut model = BopomofoModel::new(lexicon, self.base.clone()).with_associated_phrases(associated);

        match &data.replacements {
            Some(path) => model = model.with_replacements(PhraseReplacementMap::load_text(path)?),
            None if self.base.phrase_replacement_enabled => {
                tracing::warn!("phrase replacement is enabled but no replacement file is configured");
            }
            None => {}
        }
        if let Some(path) = &data.user_phrases {
            let (user, excluded) = UserPhrases::open_redb(path)?;
            tracing::info!(path = %path.display(), "user phrase store opened");
            model = model.with_user_phrases(user, excluded);
        }
        if let Some(path) = &data.import_user_phrases {
            let added = model.import_user_phrases(&std::fs::read_to_string(path)?)?;
            tracing::info!(path = %path.display(), added, "user phrases imported");
        }
        if let Some(path) = &data.excluded_phrases {
            let added = model.import_excluded_phrases(&std::fs::read_to_string(path)?)?;
            tracing::info!(path = %path.display(), added, "excluded phrases imported");
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_base_and_preferences() {
        let cfg = EngineConfig::from_toml_str(
            r#"
max_span_length = 4
keyboard_layout = "eten"

[preferences]
input_mode = "plain_bopomofo"
candidate_keys = "asdfghjkl"
"#,
        )
        .unwrap();
        assert_eq!(cfg.base.max_span_length, 4);
        assert_eq!(cfg.base.max_cache_size, 1000);
        assert_eq!(cfg.keyboard_layout, KeyboardLayout::Eten);
        assert!(cfg.preferences.is_plain());
        assert_eq!(cfg.preferences.selection_key_index('d'), Some(2));
        assert_eq!(cfg.preferences.composing_buffer_size, 20);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bopomofo.toml");
        let mut cfg = EngineConfig::default();
        cfg.preferences.associated_phrases_enabled = true;
        cfg.save_toml(&path).unwrap();
        assert_eq!(EngineConfig::load_toml(&path).unwrap(), cfg);
    }

    #[test]
    fn data_files_feed_the_model() {
        use libbopomofo_core::LanguageModel;

        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, content: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        };
        let mut cfg = EngineConfig::from_toml_str("phrase_replacement_enabled = true\n").unwrap();
        cfg.data = DataFiles {
            replacements: Some(write("replace.txt", "妳 祢\n")),
            associated_phrases: Some(write("associated.txt", "喵 喵喵\n")),
            excluded_phrases: Some(write("excluded.txt", "ㄋㄧˇ 擬\n")),
            import_user_phrases: Some(write("user.txt", "ㄏㄠˇ 郝\n")),
            user_phrases: Some(dir.path().join("phrases.redb")),
            ..DataFiles::default()
        };

        let model = cfg.build_model().unwrap();
        let values: Vec<String> = model.unigrams("ㄋㄧˇ").into_iter().map(|u| u.value).collect();
        assert!(values.contains(&"祢".to_string()));
        assert!(!values.contains(&"妳".to_string()));
        assert!(!values.contains(&"擬".to_string()));
        assert_eq!(model.associated_phrases("喵"), vec!["喵喵"]);
        assert!(model.has_user_phrase("ㄏㄠˇ", "郝"));
        drop(model);

        // imports went into the redb file
        let (user, excluded) = UserPhrases::open_redb(dir.path().join("phrases.redb")).unwrap();
        assert!(user.contains("ㄏㄠˇ", "郝"));
        assert!(excluded.contains("ㄋㄧˇ", "擬"));
    }

    #[test]
    fn missing_data_file_is_an_error() {
        let mut cfg = EngineConfig::default();
        cfg.data.replacements = Some("/nonexistent/replace.txt".into());
        assert!(matches!(cfg.build_model(), Err(ModelError::Io(_))));
    }

    #[test]
    fn empty_selection_keys_still_page() {
        let prefs = Preferences {
            candidate_keys: String::new(),
            ..Preferences::default()
        };
        assert_eq!(prefs.page_size(), 1);
        assert_eq!(prefs.selection_key_index('1'), None);
    }
}
