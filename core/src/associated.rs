//! Associated phrase table: committed text → phrases that commonly follow it.
//!
//! Text format is `key phrase [phrase ...]`, whitespace separated.

use crate::error::ModelError;
use ahash::AHashMap;

const BUILTIN_ASSOCIATED: &str = include_str!("../data/associated_phrases.txt");

#[derive(Debug, Clone, Default)]
pub struct AssociatedPhrases {
    map: AHashMap<String, Vec<String>>,
}

impl AssociatedPhrases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_text(BUILTIN_ASSOCIATED)
    }

    pub fn from_text(content: &str) -> Result<Self, ModelError> {
        let mut table = Self::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let key = parts.next().unwrap_or_default();
            let phrases: Vec<&str> = parts.collect();
            if phrases.is_empty() {
                return Err(ModelError::Parse {
                    line: idx + 1,
                    content: line.to_string(),
                });
            }
            for phrase in phrases {
                table.insert(key, phrase);
            }
        }
        Ok(table)
    }

    pub fn load_text<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ModelError> {
        Self::from_text(&std::fs::read_to_string(path)?)
    }

    /// Append a phrase for a key; duplicates are ignored.
    pub fn insert(&mut self, key: &str, phrase: &str) {
        let bucket = self
            .map
            .entry(crate::utils::normalize(key))
            .or_default();
        let phrase = crate::utils::normalize(phrase);
        if !bucket.contains(&phrase) {
            bucket.push(phrase);
        }
    }

    pub fn lookup(&self, key: &str) -> &[String] {
        self.map.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_knows_meow() {
        let table = AssociatedPhrases::builtin().unwrap();
        assert!(table.lookup("喵").iter().any(|p| p == "嗚"));
        assert!(table.lookup("貓").is_empty());
    }

    #[test]
    fn duplicate_phrases_are_collapsed() {
        let table = AssociatedPhrases::from_text("你 們 好 們\n").unwrap();
        assert_eq!(table.lookup("你"), ["們", "好"]);
    }

    #[test]
    fn key_without_phrases_is_malformed() {
        assert!(AssociatedPhrases::from_text("# header\n你\n").is_err());
    }
}
