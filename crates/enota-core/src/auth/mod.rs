//! Credential storage for the access/refresh token pair.
//!
//! This module provides:
//! - `TokenStore`: the get/set/delete seam the API client is built against
//! - `MemoryTokenStore`: process-local storage, lost on exit
//! - `FileTokenStore`: JSON file in the cache directory
//! - `KeyringTokenStore`: OS keychain via keyring
//!
//! Tokens are written by login and refresh, and removed by logout or by a
//! refresh the server rejects.

pub mod file;
pub mod keychain;
pub mod store;

pub use file::FileTokenStore;
pub use keychain::KeyringTokenStore;
pub use store::{MemoryTokenStore, StoreError, TokenKey, TokenStore};
