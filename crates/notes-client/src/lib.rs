//! notehub-client: Typed REST client for the NoteHub notes backend.
//!
//! Wraps the four note operations (list, create, delete, get by id) behind
//! [`NotesClient`]. Every request carries the configured bearer token and every
//! backend failure is surfaced to the caller unchanged as an [`ApiError`].

pub mod client;
pub mod config;
pub mod error;
pub mod note;

pub use client::NotesClient;
pub use config::{ClientConfig, ConfigError};
pub use error::ApiError;
pub use note::{CreateNotePayload, ListNotesParams, Note, NoteTag, NotesPage};
