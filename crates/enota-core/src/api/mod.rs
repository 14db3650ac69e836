//! REST API client module for the notes service.
//!
//! This module provides the `AuthClient` for bearer-authenticated requests
//! with transparent token refresh, and `NotesApi` for the account, note and
//! profile endpoints built on top of it.
//!
//! The API issues JWT access/refresh pairs from `/api/token/` and renews
//! access tokens at `/api/token/refresh/`.

pub mod client;
pub mod error;
pub mod notes;
pub mod request;

pub use client::{AuthClient, SendOutcome, UnauthenticatedReason};
pub use error::ApiError;
pub use notes::NotesApi;
pub use request::ApiRequest;
