//! Language model gateway.
//!
//! `LanguageModel` is the lookup capability the phrase grid and the key
//! handler are written against. `BopomofoModel` implements it over the
//! built-in lexicon plus user phrases, excluded phrases, an optional phrase
//! replacement map and the associated phrase table.

use crate::associated::AssociatedPhrases;
use crate::candidate::Candidate;
use crate::error::ModelError;
use crate::lexicon::Lexicon;
use crate::replacement::PhraseReplacementMap;
use crate::userdict::UserPhrases;
use crate::Config;
use lru::LruCache;
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Separator between syllables in a multi-reading key.
pub const READING_SEPARATOR: char = '-';

/// Join readings into a lookup key (`ㄋㄧˇ-ㄏㄠˇ`).
pub fn join_readings<S: AsRef<str>>(readings: &[S]) -> String {
    let mut key = String::new();
    for (i, r) in readings.iter().enumerate() {
        if i > 0 {
            key.push(READING_SEPARATOR);
        }
        key.push_str(r.as_ref());
    }
    key
}

/// A value for a reading key with its log-probability score.
#[derive(Debug, Clone, PartialEq)]
pub struct Unigram {
    pub value: String,
    pub score: f64,
}

impl Unigram {
    pub fn new<T: Into<String>>(value: T, score: f64) -> Self {
        Self {
            value: value.into(),
            score,
        }
    }
}

/// Lookup capability over built-in and user dictionaries.
///
/// An absent key is not an error: lookups return empty vectors.
pub trait LanguageModel {
    /// Unigrams for a joined reading key, in dictionary order.
    fn unigrams(&self, key: &str) -> Vec<Unigram>;

    fn has_unigrams(&self, key: &str) -> bool {
        !self.unigrams(key).is_empty()
    }

    /// Phrases that commonly follow `key`.
    fn associated_phrases(&self, _key: &str) -> Vec<String> {
        Vec::new()
    }

    /// Teach a phrase to the user dictionary. Visible to the next lookup.
    fn add_user_phrase(&self, reading: &str, value: &str) -> Result<(), ModelError>;

    fn has_user_phrase(&self, reading: &str, value: &str) -> bool;

    /// Candidates for a sequence of readings, best first. Equal scores keep
    /// dictionary order.
    fn candidates(&self, readings: &[&str]) -> Vec<Candidate> {
        let key = join_readings(readings);
        let mut out: Vec<Candidate> = self
            .unigrams(&key)
            .into_iter()
            .map(|u| Candidate::new(u.value, u.score).with_reading(key.as_str(), readings.len()))
            .collect();
        out.sort_by(|a, b| b.score.total_cmp(&a.score));
        out
    }

    fn associated_candidates(&self, following: &str) -> Vec<Candidate> {
        self.associated_phrases(following)
            .into_iter()
            .map(|p| Candidate::new(p, 0.0))
            .collect()
    }
}

/// The model used by the engine.
#[derive(Debug)]
pub struct BopomofoModel {
    lexicon: Arc<Lexicon>,
    user_phrases: UserPhrases,
    excluded_phrases: UserPhrases,
    replacements: PhraseReplacementMap,
    associated: AssociatedPhrases,
    config: Config,
    cache: RefCell<LruCache<String, Vec<Unigram>>>,
}

impl BopomofoModel {
    pub fn new(lexicon: Lexicon, config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.max_cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            lexicon: Arc::new(lexicon),
            user_phrases: UserPhrases::new_in_memory(),
            excluded_phrases: UserPhrases::new_in_memory(),
            replacements: PhraseReplacementMap::new(),
            associated: AssociatedPhrases::new(),
            config,
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    /// Built-in lexicon and associated phrases with in-memory user stores.
    pub fn builtin(config: Config) -> Result<Self, ModelError> {
        Ok(Self::new(Lexicon::builtin()?, config).with_associated_phrases(AssociatedPhrases::builtin()?))
    }

    pub fn with_user_phrases(mut self, user: UserPhrases, excluded: UserPhrases) -> Self {
        self.user_phrases = user;
        self.excluded_phrases = excluded;
        self.cache.get_mut().clear();
        self
    }

    pub fn with_replacements(mut self, replacements: PhraseReplacementMap) -> Self {
        self.replacements = replacements;
        self.cache.get_mut().clear();
        self
    }

    pub fn with_associated_phrases(mut self, associated: AssociatedPhrases) -> Self {
        self.associated = associated;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn user_phrases(&self) -> &UserPhrases {
        &self.user_phrases
    }

    /// Hide a value for a reading from every lookup.
    pub fn exclude_phrase(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let added = self.excluded_phrases.add(reading, value)?;
        self.clear_cache();
        Ok(added)
    }

    /// Add `reading value` lines to the user phrases. Returns how many were new.
    pub fn import_user_phrases(&self, content: &str) -> Result<usize, ModelError> {
        let added = self.user_phrases.import_text(content)?;
        self.clear_cache();
        Ok(added)
    }

    /// Exclude every `reading value` line. Returns how many were new.
    pub fn import_excluded_phrases(&self, content: &str) -> Result<usize, ModelError> {
        let added = self.excluded_phrases.import_text(content)?;
        self.clear_cache();
        Ok(added)
    }

    /// Undo `exclude_phrase`.
    pub fn unexclude_phrase(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let removed = self.excluded_phrases.remove(reading, value)?;
        self.clear_cache();
        Ok(removed)
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    fn lookup_uncached(&self, key: &str) -> Vec<Unigram> {
        let excluded = self.excluded_phrases.values_for(key);
        let user_score = self.config.user_phrase_score;

        let builtin = self
            .lexicon
            .lookup(key)
            .into_iter()
            .map(|e| Unigram::new(e.text, e.score));
        let user = self
            .user_phrases
            .values_for(key)
            .into_iter()
            .map(|v| Unigram::new(v, user_score));

        let mut out: Vec<Unigram> = Vec::new();
        for mut unigram in builtin.chain(user) {
            if excluded.contains(&unigram.value) {
                continue;
            }
            if self.config.phrase_replacement_enabled {
                unigram.value = self.replacements.replace(&unigram.value).to_string();
            }
            match out.iter_mut().find(|u| u.value == unigram.value) {
                Some(existing) => existing.score = existing.score.max(unigram.score),
                None => out.push(unigram),
            }
        }
        out
    }
}

impl LanguageModel for BopomofoModel {
    fn unigrams(&self, key: &str) -> Vec<Unigram> {
        // a lone space always maps to itself
        if key == " " {
            return vec![Unigram::new(" ", 0.0)];
        }
        if let Some(hit) = self.cache.borrow_mut().get(key) {
            return hit.clone();
        }
        let result = self.lookup_uncached(key);
        self.cache.borrow_mut().put(key.to_string(), result.clone());
        result
    }

    fn has_unigrams(&self, key: &str) -> bool {
        key == " " || !self.unigrams(key).is_empty()
    }

    fn associated_phrases(&self, key: &str) -> Vec<String> {
        self.associated.lookup(key).to_vec()
    }

    fn add_user_phrase(&self, reading: &str, value: &str) -> Result<(), ModelError> {
        let value = crate::utils::normalize(value);
        if reading.is_empty() || value.is_empty() {
            return Err(ModelError::InvalidPhrase(format!("{reading:?} {value:?}")));
        }
        let added = self.user_phrases.add(reading, &value)?;
        // learning a phrase lifts an earlier exclusion
        self.excluded_phrases.remove(reading, &value)?;
        self.clear_cache();
        tracing::debug!(reading, value = %value, added, "user phrase added");
        Ok(())
    }

    fn has_user_phrase(&self, reading: &str, value: &str) -> bool {
        self.user_phrases.contains(reading, value)
    }
}
