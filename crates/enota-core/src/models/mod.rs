//! Data models for the notes API.
//!
//! - `Note`, `NoteDraft`: a stored note and the fields a user edits
//! - `Profile`: the signed-in user's summary
//! - `TokenPair`, `RefreshResponse`: token endpoint payloads

pub mod note;
pub mod profile;
pub mod token;

pub use note::{Note, NoteDraft};
pub use profile::Profile;
pub use token::{RefreshResponse, TokenPair};
