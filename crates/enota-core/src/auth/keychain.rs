use keyring::Entry;

use super::store::{StoreError, TokenKey, TokenStore};

const SERVICE_NAME: &str = "enota";

/// Tokens kept in the OS keychain, one entry per token key.
pub struct KeyringTokenStore {
    service: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self::with_service(SERVICE_NAME)
    }

    /// Use a different keychain service name (e.g. one per API host)
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: TokenKey) -> Result<Entry, StoreError> {
        Ok(Entry::new(&self.service, key.as_str())?)
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        self.entry(key)?.set_password(value)?;
        Ok(())
    }

    fn delete(&self, key: TokenKey) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a reachable OS keychain (macOS Keychain, Windows Credential
    // Manager or the Linux kernel keyring)
    #[test]
    #[ignore]
    fn test_set_then_get_round_trips() {
        let store = KeyringTokenStore::with_service("enota-test-round-trip");
        store.set(TokenKey::Access, "A1").unwrap();
        store.set(TokenKey::Refresh, "R1").unwrap();

        let reopened = KeyringTokenStore::with_service("enota-test-round-trip");
        assert_eq!(reopened.get(TokenKey::Access).unwrap().as_deref(), Some("A1"));
        assert_eq!(reopened.get(TokenKey::Refresh).unwrap().as_deref(), Some("R1"));

        reopened.clear().unwrap();
        assert_eq!(store.get(TokenKey::Access).unwrap(), None);
        assert_eq!(store.get(TokenKey::Refresh).unwrap(), None);
    }
}
