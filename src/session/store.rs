//! Durable session artifacts
//!
//! One pretty-printed JSON file per session, written once at close and
//! never modified afterwards.

use std::path::{Path, PathBuf};

use crate::Result;
use crate::session::SessionRecord;

/// Writes closed session records to per-session JSON files
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path for a session's artifact: `<dir>/session_<session_id>.json`
    #[must_use]
    pub fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("session_{session_id}.json"))
    }

    /// Serialize a record to its artifact file and return the path
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the write fails
    pub fn save(&self, record: &SessionRecord) -> Result<PathBuf> {
        let path = self.path_for(&record.session_id);
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json)?;

        tracing::info!(
            session_id = %record.session_id,
            path = %path.display(),
            interactions = record.interactions.len(),
            "session saved"
        );
        Ok(path)
    }

    /// Read a previously saved record back
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing or malformed
    pub fn load(&self, session_id: &str) -> Result<SessionRecord> {
        let json = std::fs::read_to_string(self.path_for(session_id))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// List saved session IDs, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be read
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name();
            if let Some(id) = session_id_from_file_name(&name) {
                ids.push(id);
            }
        }
        // Timestamp-derived IDs sort chronologically
        ids.sort_unstable();
        Ok(ids)
    }

    /// The directory this store writes into
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn session_id_from_file_name(name: &std::ffi::OsStr) -> Option<String> {
    let name = name.to_str()?;
    let id = name.strip_prefix("session_")?.strip_suffix(".json")?;
    Some(id.to_string())
}
