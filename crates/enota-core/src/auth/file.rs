use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::store::{StoreError, TokenKey, TokenStore};

/// Token file name in cache directory
const TOKEN_FILE: &str = "tokens.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl TokenFile {
    fn slot(&mut self, key: TokenKey) -> &mut Option<String> {
        match key {
            TokenKey::Access => &mut self.access_token,
            TokenKey::Refresh => &mut self.refresh_token,
        }
    }

    fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Tokens persisted as JSON in the cache directory.
///
/// The file is rewritten on every mutation and removed once both tokens
/// are gone. Writes go to a temporary file in the same directory that is
/// then renamed over `tokens.json`, so readers never see a partial file.
/// On unix the file is created with mode `0600`.
pub struct FileTokenStore {
    cache_dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.cache_dir.join(TOKEN_FILE)
    }

    fn read(path: &Path) -> Result<TokenFile, StoreError> {
        if !path.exists() {
            return Ok(TokenFile::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write(path: &Path, file: &TokenFile) -> Result<(), StoreError> {
        if file.is_empty() {
            if path.exists() {
                std::fs::remove_file(path)?;
                debug!(path = %path.display(), "Removed empty token file");
            }
            return Ok(());
        }
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, file)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn update(&self, key: TokenKey, value: Option<&str>) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let path = self.path();
        // A corrupt file must not block logout or a fresh login
        let mut file = match Self::read(&path) {
            Err(StoreError::Json(e)) => {
                warn!(path = %path.display(), error = %e, "Token file is corrupt, overwriting");
                TokenFile::default()
            }
            other => other?,
        };
        *file.slot(key) = value.map(str::to_string);
        Self::write(&path, &file)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        let mut file = Self::read(&self.path())?;
        Ok(file.slot(key).take())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        self.update(key, Some(value))
    }

    fn delete(&self, key: TokenKey) -> Result<(), StoreError> {
        self.update(key, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenPair;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
    }

    #[test]
    fn test_tokens_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested"));
        store.set(TokenKey::Access, "A1").unwrap();
        store.set(TokenKey::Refresh, "R1").unwrap();

        let reopened = FileTokenStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));

        let raw = std::fs::read_to_string(reopened.path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["access_token"], "A1");
        assert_eq!(json["refresh_token"], "R1");
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKey::Access, "A1").unwrap();
        store.set(TokenKey::Refresh, "R1").unwrap();
        assert!(store.path().exists());

        store.delete(TokenKey::Access).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));

        store.clear().unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.get(TokenKey::Access), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_clear_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), r#"{"access_tok"#).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
    }

    #[test]
    fn test_store_pair_overwrites_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        std::fs::write(store.path(), r#"{"access_tok"#).unwrap();

        store
            .store_pair(&TokenPair {
                access: "A1".to_string(),
                refresh: "R1".to_string(),
            })
            .unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));
    }

    #[test]
    fn test_write_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKey::Access, "A1").unwrap();
        store.set(TokenKey::Access, "A2").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(TOKEN_FILE)]);
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().to_path_buf());
        store.set(TokenKey::Refresh, "R1").unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
