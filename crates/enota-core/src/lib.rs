//! Core library for the E-nota notes client.
//!
//! - `api`: `AuthClient` (bearer attachment with refresh-on-401) and `NotesApi`
//! - `auth`: the `TokenStore` seam and its memory, file and keychain backends
//! - `config`: persisted settings and base URL resolution
//! - `models`: notes, profile and token payloads

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiError, ApiRequest, AuthClient, NotesApi, SendOutcome, UnauthenticatedReason};
pub use auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, StoreError, TokenKey, TokenStore};
pub use config::{Config, TokenBackend};
