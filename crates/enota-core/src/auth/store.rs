use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use thiserror::Error;

use crate::models::TokenPair;

/// The two credentials the client persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKey {
    Access,
    Refresh,
}

impl TokenKey {
    pub const ALL: [TokenKey; 2] = [TokenKey::Access, TokenKey::Refresh];

    /// Storage name, shared by every backend
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKey::Access => "access_token",
            TokenKey::Refresh => "refresh_token",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Key-value storage for the credential pair.
///
/// Shared by the request client and by the login/logout flows. There is no
/// locking discipline across calls: the last write wins.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError>;

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError>;

    /// Remove a token. Removing an absent token is not an error.
    fn delete(&self, key: TokenKey) -> Result<(), StoreError>;

    /// Store both tokens issued by a login
    fn store_pair(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.set(TokenKey::Access, &pair.access)?;
        self.set(TokenKey::Refresh, &pair.refresh)
    }

    /// Remove both tokens
    fn clear(&self) -> Result<(), StoreError> {
        for key in TokenKey::ALL {
            self.delete(key)?;
        }
        Ok(())
    }

    fn has_access_token(&self) -> Result<bool, StoreError> {
        Ok(self.get(TokenKey::Access)?.is_some())
    }
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashMap<TokenKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given tokens
    pub fn with_tokens(access: Option<&str>, refresh: Option<&str>) -> Self {
        let mut tokens = HashMap::new();
        if let Some(access) = access {
            tokens.insert(TokenKey::Access, access.to_string());
        }
        if let Some(refresh) = refresh {
            tokens.insert(TokenKey::Refresh, refresh.to_string());
        }
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        Ok(self.tokens.read().get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        self.tokens.write().insert(key, value.to_string());
        Ok(())
    }

    fn delete(&self, key: TokenKey) -> Result<(), StoreError> {
        self.tokens.write().remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_key_names() {
        assert_eq!(TokenKey::Access.as_str(), "access_token");
        assert_eq!(TokenKey::Refresh.as_str(), "refresh_token");
        assert_eq!(TokenKey::Refresh.to_string(), "refresh_token");
    }

    #[test]
    fn test_memory_store_set_get_delete() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);

        store.set(TokenKey::Access, "abc").unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("abc"));
        assert!(store.has_access_token().unwrap());

        store.set(TokenKey::Access, "def").unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("def"));

        store.delete(TokenKey::Access).unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        // Deleting twice is fine
        store.delete(TokenKey::Access).unwrap();
    }

    #[test]
    fn test_store_pair_and_clear() {
        let store = MemoryTokenStore::new();
        store
            .store_pair(&TokenPair {
                access: "A1".to_string(),
                refresh: "R1".to_string(),
            })
            .unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));

        store.clear().unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
        assert!(!store.has_access_token().unwrap());
    }

    #[test]
    fn test_with_tokens_partial() {
        let store = MemoryTokenStore::with_tokens(Some("OLD"), None);
        assert_eq!(store.get(TokenKey::Access).unwrap().as_deref(), Some("OLD"));
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
    }
}
