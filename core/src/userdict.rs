//! User phrase stores.
//!
//! A store holds `(reading, value)` pairs in insertion order. The model keeps
//! two of them: phrases the user taught through marking, and phrases the user
//! excluded from lookup results.
//!
//! Backends:
//! - `InMemory`: `Arc<RwLock<..>>` vector, used by tests and the default model.
//! - `Redb`: persistent store; one database file holds both the user and the
//!   excluded phrases. Each store has a pair table for membership and a
//!   `(reading, seq)` index so lookups by reading are range scans.
use crate::error::ModelError;
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory phrase store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserPhrases {
    inner: Arc<RwLock<Vec<(String, String)>>>,
}

impl InMemoryUserPhrases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Returns false if it was already present.
    pub fn add(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let mut entries = self.inner.write().map_err(|_| ModelError::LockPoisoned)?;
        if entries.iter().any(|(r, v)| r == reading && v == value) {
            return Ok(false);
        }
        entries.push((reading.to_string(), value.to_string()));
        Ok(true)
    }

    pub fn remove(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let mut entries = self.inner.write().map_err(|_| ModelError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|(r, v)| !(r == reading && v == value));
        Ok(entries.len() != before)
    }

    pub fn contains(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let entries = self.inner.read().map_err(|_| ModelError::LockPoisoned)?;
        Ok(entries.iter().any(|(r, v)| r == reading && v == value))
    }

    /// Values stored for a reading, oldest first.
    pub fn values_for(&self, reading: &str) -> Result<Vec<String>, ModelError> {
        let entries = self.inner.read().map_err(|_| ModelError::LockPoisoned)?;
        Ok(entries
            .iter()
            .filter(|(r, _)| r == reading)
            .map(|(_, v)| v.clone())
            .collect())
    }

    pub fn entries(&self) -> Result<Vec<(String, String)>, ModelError> {
        let entries = self.inner.read().map_err(|_| ModelError::LockPoisoned)?;
        Ok(entries.clone())
    }
}

// key "user:next_seq" / "excluded:next_seq", value = next insertion number
const META: TableDefinition<'static, &'static str, u64> = TableDefinition::new("phrase_meta");

type PairTable = TableDefinition<'static, &'static str, u64>;
type IndexTable = TableDefinition<'static, (&'static str, u64), &'static str>;

/// Which tables of the redb file a store reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhraseTable {
    User,
    Excluded,
}

impl PhraseTable {
    // key = "reading\tvalue", value = insertion sequence number
    const USER: PairTable = TableDefinition::new("user_phrases");
    const EXCLUDED: PairTable = TableDefinition::new("excluded_phrases");
    // key = (reading, sequence number), value = phrase
    const USER_BY_READING: IndexTable = TableDefinition::new("user_phrases_by_reading");
    const EXCLUDED_BY_READING: IndexTable = TableDefinition::new("excluded_phrases_by_reading");

    fn pairs(self) -> PairTable {
        match self {
            PhraseTable::User => Self::USER,
            PhraseTable::Excluded => Self::EXCLUDED,
        }
    }

    fn by_reading(self) -> IndexTable {
        match self {
            PhraseTable::User => Self::USER_BY_READING,
            PhraseTable::Excluded => Self::EXCLUDED_BY_READING,
        }
    }

    fn counter(self) -> &'static str {
        match self {
            PhraseTable::User => "user:next_seq",
            PhraseTable::Excluded => "excluded:next_seq",
        }
    }
}

/// Redb-backed phrase store.
#[derive(Clone)]
pub struct RedbUserPhrases {
    db: Arc<Database>,
    table: PhraseTable,
    path: PathBuf,
}

impl std::fmt::Debug for RedbUserPhrases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbUserPhrases")
            .field("table", &self.table)
            .field("path", &self.path)
            .finish()
    }
}

fn entry_key(reading: &str, value: &str) -> String {
    format!("{reading}\t{value}")
}

impl RedbUserPhrases {
    /// Create or open the database at `path` and return the user and
    /// excluded stores sharing it. All tables are created if missing.
    pub fn open_pair<P: AsRef<Path>>(path: P) -> Result<(Self, Self), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = Arc::new(Database::create(path)?);

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(META)?;
            for table in [PhraseTable::User, PhraseTable::Excluded] {
                write_txn.open_table(table.pairs())?;
                write_txn.open_table(table.by_reading())?;
            }
        }
        write_txn.commit()?;

        let store = |table| Self {
            db: Arc::clone(&db),
            table,
            path: path.to_path_buf(),
        };
        Ok((store(PhraseTable::User), store(PhraseTable::Excluded)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let key = entry_key(reading, value);
        let write_txn = self.db.begin_write()?;
        let inserted = {
            let mut pairs = write_txn.open_table(self.table.pairs())?;
            if pairs.get(key.as_str())?.is_some() {
                false
            } else {
                let mut meta = write_txn.open_table(META)?;
                let seq = meta.get(self.table.counter())?.map_or(0, |s| s.value());
                meta.insert(self.table.counter(), seq + 1)?;
                pairs.insert(key.as_str(), seq)?;
                let mut by_reading = write_txn.open_table(self.table.by_reading())?;
                by_reading.insert((reading, seq), value)?;
                true
            }
        };
        write_txn.commit()?;
        Ok(inserted)
    }

    pub fn remove(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let key = entry_key(reading, value);
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut pairs = write_txn.open_table(self.table.pairs())?;
            let seq = pairs.remove(key.as_str())?.map(|s| s.value());
            if let Some(seq) = seq {
                let mut by_reading = write_txn.open_table(self.table.by_reading())?;
                by_reading.remove((reading, seq))?;
            }
            seq.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }

    pub fn contains(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table.pairs())?;
        let found = table.get(entry_key(reading, value).as_str())?.is_some();
        Ok(found)
    }

    /// All pairs ordered by insertion.
    pub fn entries(&self) -> Result<Vec<(String, String)>, ModelError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table.pairs())?;
        let mut rows = Vec::new();
        for item in table.iter()? {
            let (key, seq) = item?;
            if let Some((reading, value)) = key.value().split_once('\t') {
                rows.push((seq.value(), reading.to_string(), value.to_string()));
            }
        }
        rows.sort_by_key(|(seq, _, _)| *seq);
        Ok(rows.into_iter().map(|(_, r, v)| (r, v)).collect())
    }

    /// Values for one reading, oldest first. Scans only that reading's rows.
    pub fn values_for(&self, reading: &str) -> Result<Vec<String>, ModelError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table.by_reading())?;
        let mut values = Vec::new();
        for item in table.range((reading, 0u64)..=(reading, u64::MAX))? {
            let (_, value) = item?;
            values.push(value.value().to_string());
        }
        Ok(values)
    }
}

/// Backend switch used by the model.
#[derive(Clone, Debug)]
pub enum UserPhrases {
    InMemory(InMemoryUserPhrases),
    Redb(RedbUserPhrases),
}

impl Default for UserPhrases {
    fn default() -> Self {
        Self::new_in_memory()
    }
}

impl UserPhrases {
    pub fn new_in_memory() -> Self {
        UserPhrases::InMemory(InMemoryUserPhrases::new())
    }

    /// Open (user, excluded) stores backed by one redb file.
    pub fn open_redb<P: AsRef<Path>>(path: P) -> Result<(Self, Self), ModelError> {
        let (user, excluded) = RedbUserPhrases::open_pair(path)?;
        Ok((UserPhrases::Redb(user), UserPhrases::Redb(excluded)))
    }

    /// Import `reading value` lines.
    pub fn import_text(&self, content: &str) -> Result<usize, ModelError> {
        let mut added = 0;
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((reading, value)) = line.split_once(char::is_whitespace) else {
                return Err(ModelError::Parse {
                    line: idx + 1,
                    content: line.to_string(),
                });
            };
            if self.add(reading, value.trim())? {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn add(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        match self {
            UserPhrases::InMemory(m) => m.add(reading, value),
            UserPhrases::Redb(r) => r.add(reading, value),
        }
    }

    pub fn remove(&self, reading: &str, value: &str) -> Result<bool, ModelError> {
        match self {
            UserPhrases::InMemory(m) => m.remove(reading, value),
            UserPhrases::Redb(r) => r.remove(reading, value),
        }
    }

    /// Lookups run on every keystroke, so a failing store reads as empty
    /// and the failure is logged.
    pub fn contains(&self, reading: &str, value: &str) -> bool {
        let found = match self {
            UserPhrases::InMemory(m) => m.contains(reading, value),
            UserPhrases::Redb(r) => r.contains(reading, value),
        };
        found.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "user phrase lookup failed");
            false
        })
    }

    pub fn values_for(&self, reading: &str) -> Vec<String> {
        let values = match self {
            UserPhrases::InMemory(m) => m.values_for(reading),
            UserPhrases::Redb(r) => r.values_for(reading),
        };
        values.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "user phrase lookup failed");
            Vec::new()
        })
    }

    pub fn entries(&self) -> Result<Vec<(String, String)>, ModelError> {
        match self {
            UserPhrases::InMemory(m) => m.entries(),
            UserPhrases::Redb(r) => r.entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_add_is_idempotent() {
        let store = InMemoryUserPhrases::new();
        assert!(store.add("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵").unwrap());
        assert!(!store.add("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵").unwrap());
        assert_eq!(store.values_for("ㄇㄧㄠ-ㄇㄧㄠ").unwrap(), vec!["喵喵"]);
        assert!(store.remove("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵").unwrap());
        assert!(!store.contains("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵").unwrap());
    }

    #[test]
    fn in_memory_poisoned_lock_is_an_error() {
        let store = InMemoryUserPhrases::new();
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(matches!(
            store.add("ㄋㄧˇ", "妳"),
            Err(ModelError::LockPoisoned)
        ));
        assert!(matches!(
            store.remove("ㄋㄧˇ", "妳"),
            Err(ModelError::LockPoisoned)
        ));
        let wrapped = UserPhrases::InMemory(store);
        assert!(wrapped.add("ㄋㄧˇ", "妳").is_err());
        assert!(wrapped.values_for("ㄋㄧˇ").is_empty());
    }

    #[test]
    fn import_text_counts_new_pairs() {
        let store = UserPhrases::new_in_memory();
        let added = store
            .import_text("# user phrases\nㄋㄧˇ-ㄏㄠˇ 妳好\nㄋㄧˇ-ㄏㄠˇ 妳好\nㄏㄠˇ 郝\n")
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.entries().unwrap().len(), 2);
    }

    #[test]
    fn redb_pair_keeps_tables_apart_and_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.redb");
        let (user, excluded) = UserPhrases::open_redb(&path).unwrap();

        assert!(user.add("ㄋㄧˇ", "妳").unwrap());
        assert!(user.add("ㄋㄧˇ", "你").unwrap());
        assert!(!user.add("ㄋㄧˇ", "妳").unwrap());
        assert!(excluded.add("ㄋㄧˇ", "擬").unwrap());

        assert_eq!(user.values_for("ㄋㄧˇ"), vec!["妳", "你"]);
        assert_eq!(excluded.values_for("ㄋㄧˇ"), vec!["擬"]);
        assert!(!user.contains("ㄋㄧˇ", "擬"));
        assert!(user.remove("ㄋㄧˇ", "妳").unwrap());
        assert_eq!(user.values_for("ㄋㄧˇ"), vec!["你"]);
    }

    #[test]
    fn redb_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("phrases.redb");
        {
            let (user, _) = UserPhrases::open_redb(&path).unwrap();
            user.add("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵").unwrap();
        }
        let (user, _) = UserPhrases::open_redb(&path).unwrap();
        assert!(user.contains("ㄇㄧㄠ-ㄇㄧㄠ", "喵喵"));
    }

    #[test]
    fn redb_lookup_by_reading_keeps_insertion_order_across_readings() {
        let dir = tempfile::tempdir().unwrap();
        let (user, _) = UserPhrases::open_redb(dir.path().join("phrases.redb")).unwrap();

        let readings = ["ㄋㄧˇ", "ㄏㄠˇ", "ㄋㄧˇ-ㄏㄠˇ"];
        for round in 0..20 {
            for reading in readings {
                user.add(reading, &format!("{reading}{round}")).unwrap();
            }
        }
        for reading in readings {
            let expected: Vec<String> = (0..20).map(|r| format!("{reading}{r}")).collect();
            assert_eq!(user.values_for(reading), expected);
        }

        // A removed phrase added again moves to the end.
        assert!(user.remove("ㄏㄠˇ", "ㄏㄠˇ3").unwrap());
        assert!(!user.contains("ㄏㄠˇ", "ㄏㄠˇ3"));
        assert!(user.add("ㄏㄠˇ", "ㄏㄠˇ3").unwrap());
        let values = user.values_for("ㄏㄠˇ");
        assert_eq!(values.len(), 20);
        assert_eq!(values.last().map(String::as_str), Some("ㄏㄠˇ3"));
        assert_eq!(values[3], "ㄏㄠˇ4");

        let entries = user.entries().unwrap();
        assert_eq!(entries.len(), 60);
        assert_eq!(entries.last().unwrap(), &("ㄏㄠˇ".to_string(), "ㄏㄠˇ3".to_string()));
    }
}
