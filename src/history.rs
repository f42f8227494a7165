//! Instruction history.
//!
//! Stored in `<config_dir>/ask-excel/history.json` as a small key-value
//! document. The `history` key holds the entry list serialized as a JSON
//! string, so the file can later carry other keys without a migration.
//!
//! Newest first, deduplicated by instruction text, capped at
//! `MAX_ENTRIES`. A missing or unreadable file is an empty history.
//!
//! Writers hold an exclusive lock on a sibling `.lock` file for the whole
//! read-modify-write, so separate processes do not lose each other's
//! entries. The new document is written to a temp file and renamed over
//! the old one; readers never see a half-written file.

use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::HistoryError;
use crate::settings::APP_DIR;

pub const MAX_ENTRIES: usize = 10;
const HISTORY_KEY: &str = "history";
const HISTORY_FILE: &str = "history.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub instruction: String,
    /// Unix epoch milliseconds.
    pub timestamp: u64,
}

pub struct HistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl HistoryStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn default_location() -> Result<Self, HistoryError> {
        let path = dirs::config_dir()
            .ok_or(HistoryError::NoConfigDir)?
            .join(APP_DIR)
            .join(HISTORY_FILE);
        Ok(Self::open(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;
        Ok(load_entries(&self.path))
    }

    /// Put `instruction` at the front, dropping any older copy.
    pub fn record(&self, instruction: &str) -> Result<(), HistoryError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Ok(());
        }

        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;
        let dir = self.path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(dir)?;
        // Released when the file is closed at the end of this call.
        let _file_lock = self.lock_file()?;

        let mut entries = load_entries(&self.path);
        entries.retain(|e| e.instruction != instruction);
        entries.insert(
            0,
            HistoryEntry {
                instruction: instruction.to_string(),
                timestamp: now_millis(),
            },
        );
        entries.truncate(MAX_ENTRIES);

        let mut doc = load_document(&self.path);
        doc.insert(HISTORY_KEY.to_string(), serde_json::to_string(&entries)?);

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(&doc)?.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        log::info!("[HISTORY] Saved {} entries", entries.len());
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Open the lock file and block until this process holds it exclusively.
    fn lock_file(&self) -> Result<File, HistoryError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.lock_path())?;
        FileExt::lock_exclusive(&file)?;
        Ok(file)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn load_document(path: &Path) -> BTreeMap<String, String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("[HISTORY] Ignoring unreadable {}: {}", path.display(), e);
            BTreeMap::new()
        }),
        Err(_) => BTreeMap::new(),
    }
}

fn load_entries(path: &Path) -> Vec<HistoryEntry> {
    load_document(path)
        .get(HISTORY_KEY)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::open(dir.path().join("nested").join("history.json"));
        (dir, store)
    }

    fn instructions(store: &HistoryStore) -> Vec<String> {
        store
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.instruction)
            .collect()
    }

    #[test]
    fn missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn newest_first_and_deduplicated() {
        let (_dir, store) = store();
        store.record("bold row 1").unwrap();
        store.record("autofit columns").unwrap();
        store.record("bold row 1").unwrap();
        assert_eq!(instructions(&store), vec!["bold row 1", "autofit columns"]);
    }

    #[test]
    fn capped_at_ten() {
        let (_dir, store) = store();
        for i in 0..15 {
            store.record(&format!("instruction {}", i)).unwrap();
        }
        let got = instructions(&store);
        assert_eq!(got.len(), MAX_ENTRIES);
        assert_eq!(got[0], "instruction 14");
        assert_eq!(got[9], "instruction 5");
    }

    #[test]
    fn blank_instructions_are_skipped() {
        let (_dir, store) = store();
        store.record("   ").unwrap();
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty_and_is_replaced() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{{{ not json").unwrap();
        assert!(store.entries().unwrap().is_empty());

        store.record("freeze top row").unwrap();
        assert_eq!(instructions(&store), vec!["freeze top row"]);
    }

    #[test]
    fn history_key_holds_a_json_string() {
        let (_dir, store) = store();
        store.record("read selection").unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let inner = doc["history"].as_str().unwrap();
        let entries: Vec<HistoryEntry> = serde_json::from_str(inner).unwrap();
        assert_eq!(entries[0].instruction, "read selection");
        assert!(entries[0].timestamp > 0);
    }

    #[test]
    fn separate_stores_on_one_file_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = HistoryStore::open(path);
                    for i in 0..2 {
                        store.record(&format!("writer {} step {}", t, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reader = HistoryStore::open(&path);
        let mut got = instructions(&reader);
        assert_eq!(got.len(), 8, "lost updates: {:?}", got);
        got.sort();
        got.dedup();
        assert_eq!(got.len(), 8);
    }

    #[test]
    fn write_leaves_no_temp_files_behind() {
        let (_dir, store) = store();
        store.record("sheet info").unwrap();
        store.record("insert row").unwrap();
        let mut names: Vec<String> = std::fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["history.json", "history.json.lock"]);
    }

    #[test]
    fn other_keys_survive_a_write() {
        let (_dir, store) = store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"lastProvider": "gemini"}"#).unwrap();
        store.record("percent").unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("lastProvider"));
    }
}
