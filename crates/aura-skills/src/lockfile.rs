use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SkillError;

/// Per-skill approval record: the content hash the user last accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub sha256: String,
    /// RFC 3339 timestamp of the approval.
    pub approved_at: String,
}

/// Persisted map of skill name to approved content hash.
///
/// Stored as a single JSON object; rewritten on every successful registry
/// load and every explicit approval.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lockfile {
    #[serde(flatten)]
    entries: HashMap<String, LockEntry>,
}

impl Lockfile {
    /// Read the lockfile, returning an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SkillError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist the lockfile, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SkillError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LockEntry> {
        self.entries.get(name)
    }

    /// Record an approval for `name` at the given hash, stamped now.
    pub fn approve(&mut self, name: &str, sha256: &str) {
        self.entries.insert(
            name.to_string(),
            LockEntry {
                sha256: sha256.to_string(),
                approved_at: chrono::Utc::now().to_rfc3339(),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let lock = Lockfile::load(&dir.path().join("skills.lock.json")).unwrap();
        assert!(lock.is_empty());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("skills.lock.json");

        let mut lock = Lockfile::default();
        lock.approve("list-manager", "abc123");
        lock.save(&path).unwrap();

        let reloaded = Lockfile::load(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        let entry = reloaded.get("list-manager").unwrap();
        assert_eq!(entry.sha256, "abc123");
        assert!(!entry.approved_at.is_empty());
    }

    #[test]
    fn approve_overwrites_existing_entry() {
        let mut lock = Lockfile::default();
        lock.approve("s", "old");
        lock.approve("s", "new");
        assert_eq!(lock.get("s").unwrap().sha256, "new");
        assert_eq!(lock.len(), 1);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.lock.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Lockfile::load(&path).is_err());
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut lock = Lockfile::default();
        lock.approve("s", "deadbeef");
        let json = serde_json::to_string(&lock).unwrap();
        assert!(json.contains("\"s\""));
        assert!(json.contains("\"sha256\":\"deadbeef\""));
        assert!(json.contains("\"approved_at\""));
        assert!(!json.contains("entries"));
    }
}
