//! Domain types

pub mod chat;
pub mod document;

pub use chat::{ChatMessage, ChatRole, DocumentReference};
pub use document::{Document, DocumentStatus};
