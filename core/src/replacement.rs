//! Phrase replacement map (`value replacement` lines), applied to lookup
//! results when enabled in `Config`.

use crate::error::ModelError;
use ahash::AHashMap;

#[derive(Debug, Clone, Default)]
pub struct PhraseReplacementMap {
    map: AHashMap<String, String>,
}

impl PhraseReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(content: &str) -> Result<Self, ModelError> {
        let mut map = Self::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_whitespace().collect::<Vec<_>>().as_slice() {
                [from, to] => map.insert(*from, *to),
                _ => {
                    return Err(ModelError::Parse {
                        line: idx + 1,
                        content: line.to_string(),
                    })
                }
            }
        }
        Ok(map)
    }

    pub fn load_text<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ModelError> {
        Self::from_text(&std::fs::read_to_string(path)?)
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, from: K, to: V) {
        self.map.insert(from.into(), to.into());
    }

    pub fn replace<'a>(&'a self, value: &'a str) -> &'a str {
        self.map.get(value).map(String::as_str).unwrap_or(value)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
