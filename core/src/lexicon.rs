//! Built-in phrase dictionary.
//!
//! Maps a joined reading key (syllables joined with `-`, e.g. `ㄋㄧˇ-ㄏㄠˇ`)
//! to scored phrases. Entries come either from a plain text table loaded
//! into memory, or from compact artifacts produced by `convert_table`:
//! an `fst` map from key to payload index plus a `bincode` vector of
//! payloads.
//!
//! Text table format, one entry per line:
//!
//! ```text
//! # reading value score
//! ㄋㄧˇ 你 -3.21
//! ㄋㄧˇ-ㄏㄠˇ 你好 -4.05
//! ```

use crate::error::ModelError;
use ahash::AHashMap;
use fst::{Map, MapBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

const BUILTIN_PHRASES: &str = include_str!("../data/builtin_phrases.txt");

/// A phrase and its log-probability score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub text: String,
    pub score: f64,
}

impl PhraseEntry {
    pub fn new<T: Into<String>>(text: T, score: f64) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}

/// Reading key → phrases. Phrases keep their table order for a key.
#[derive(Default)]
pub struct Lexicon {
    // In-memory entries, consulted first
    map: AHashMap<String, Vec<PhraseEntry>>,
    // FST map for key -> payload index
    fst_map: Option<Map<Vec<u8>>>,
    payloads: Vec<Vec<PhraseEntry>>,
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("keys", &self.map.len())
            .field("fst_keys", &self.fst_map.as_ref().map(|m| m.len()))
            .finish()
    }
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// The phrase table compiled into the crate.
    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_text(BUILTIN_PHRASES)
    }

    /// Insert a phrase for a key. A phrase already present keeps its
    /// position and takes the higher score.
    pub fn insert<K: Into<String>, T: Into<String>>(&mut self, key: K, text: T, score: f64) {
        let text = crate::utils::normalize(&text.into());
        let bucket = self.map.entry(key.into()).or_default();
        match bucket.iter_mut().find(|e| e.text == text) {
            Some(existing) => existing.score = existing.score.max(score),
            None => bucket.push(PhraseEntry::new(text, score)),
        }
    }

    /// Lookup phrases for a key, in table order.
    pub fn lookup(&self, key: &str) -> Vec<PhraseEntry> {
        if let Some(v) = self.map.get(key) {
            return v.clone();
        }
        if let Some(map) = &self.fst_map {
            if let Some(entries) = map.get(key).and_then(|idx| self.payloads.get(idx as usize)) {
                return entries.clone();
            }
        }
        Vec::new()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(key)
            || self
                .fst_map
                .as_ref()
                .is_some_and(|m| m.contains_key(key))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len() + self.fst_map.as_ref().map_or(0, |m| m.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse a `reading value score` table. Blank lines and `#` comments
    /// are skipped.
    pub fn from_text(content: &str) -> Result<Self, ModelError> {
        let mut lexicon = Self::new();
        for (key, text, score) in parse_table(content)? {
            lexicon.insert(key, text, score);
        }
        Ok(lexicon)
    }

    /// Load a text table from disk.
    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_text(&content)
    }

    /// Write the in-memory entries as `lexicon.fst` + `lexicon.bincode`.
    ///
    /// FST keys must be inserted in byte order, so entries are regrouped
    /// through a `BTreeMap` first.
    pub fn save_fst_bincode<P: AsRef<Path>>(
        &self,
        fst_path: P,
        bincode_path: P,
    ) -> Result<(), ModelError> {
        let grouped: BTreeMap<&str, &Vec<PhraseEntry>> =
            self.map.iter().map(|(k, v)| (k.as_str(), v)).collect();

        let writer = BufWriter::new(File::create(fst_path.as_ref())?);
        let mut builder = MapBuilder::new(writer)?;
        let mut payloads: Vec<&Vec<PhraseEntry>> = Vec::with_capacity(grouped.len());
        for (i, (key, entries)) in grouped.into_iter().enumerate() {
            builder.insert(key, i as u64)?;
            payloads.push(entries);
        }
        builder.finish()?;

        let writer = BufWriter::new(File::create(bincode_path.as_ref())?);
        bincode::serialize_into(writer, &payloads)?;
        tracing::debug!(keys = payloads.len(), "wrote lexicon artifacts");
        Ok(())
    }

    /// Load lexicon from FST + bincode artifacts.
    ///
    /// - fst_path: lexicon.fst file mapping keys to indices
    /// - bincode_path: lexicon.bincode file containing `Vec<Vec<PhraseEntry>>`
    pub fn load_from_fst_bincode<P: AsRef<Path>>(
        fst_path: P,
        bincode_path: P,
    ) -> Result<Self, ModelError> {
        let mut buf = Vec::new();
        File::open(fst_path.as_ref())?.read_to_end(&mut buf)?;
        let map = Map::new(buf)?;

        let reader = BufReader::new(File::open(bincode_path.as_ref())?);
        let payloads: Vec<Vec<PhraseEntry>> = bincode::deserialize_from(reader)?;

        Ok(Self {
            map: AHashMap::new(),
            fst_map: Some(map),
            payloads,
        })
    }
}

/// Parse `reading value score` lines. A line with any other number of
/// columns is an error.
pub fn parse_table(content: &str) -> Result<Vec<(String, String, f64)>, ModelError> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || ModelError::Parse {
            line: idx + 1,
            content: line.to_string(),
        };
        let mut parts = line.split_whitespace();
        let (Some(key), Some(text), Some(score), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let score: f64 = score.parse().map_err(|_| malformed())?;
        out.push((key.to_string(), text.to_string(), score));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_keeps_table_order() {
        let mut lx = Lexicon::new();
        lx.insert("ㄋㄧˇ", "你", -3.0);
        lx.insert("ㄋㄧˇ", "妳", -4.0);
        let texts: Vec<_> = lx.lookup("ㄋㄧˇ").into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["你", "妳"]);
        assert!(lx.lookup("ㄅㄚ").is_empty());
    }

    #[test]
    fn duplicate_insert_keeps_best_score() {
        let mut lx = Lexicon::new();
        lx.insert("k", "x", -5.0);
        lx.insert("k", "x", -2.0);
        let entries = lx.lookup("k");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].score, -2.0);
    }

    #[test]
    fn parse_rejects_missing_score() {
        let err = Lexicon::from_text("ㄋㄧˇ 你 -3\nㄏㄠˇ 好\n").unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 2, .. }));
    }

    #[test]
    fn parse_rejects_extra_columns() {
        let err = Lexicon::from_text("ㄋㄧˇ 你 -3\nㄋㄧˇ 妳 -4 -5\n").unwrap_err();
        assert!(matches!(err, ModelError::Parse { line: 2, .. }));
    }

    #[test]
    fn builtin_table_has_multi_syllable_phrases() {
        let lx = Lexicon::builtin().unwrap();
        assert!(lx.contains_key("ㄋㄧˇ-ㄏㄠˇ"));
        assert_eq!(lx.lookup("ㄇㄧㄠ").len(), 1);
    }

    #[test]
    fn fst_bincode_artifacts_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fst_path = dir.path().join("lexicon.fst");
        let bin_path = dir.path().join("lexicon.bincode");

        let lx = Lexicon::from_text("ㄏㄠˇ 好 -2.9\nㄋㄧˇ 你 -3.2\nㄋㄧˇ 妳 -4.1\n").unwrap();
        lx.save_fst_bincode(&fst_path, &bin_path).unwrap();

        let loaded = Lexicon::load_from_fst_bincode(&fst_path, &bin_path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.lookup("ㄋㄧˇ"), lx.lookup("ㄋㄧˇ"));
        assert!(loaded.contains_key("ㄏㄠˇ"));
    }
}
