//! lex-rag: legal document ingestion and chat-retrieval service
//!
//! Converts uploaded legal documents into searchable, chat-ready knowledge:
//! extraction, chunking, embedding, legal-document classification, and a
//! question-answering engine grounded in document content.

pub mod chat;
pub mod classification;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod providers;
pub mod server;
pub mod types;

pub use config::LexConfig;
pub use error::{Error, Result};
pub use types::{
    chat::{ChatMessage, ChatRole, DocumentReference},
    document::{Document, DocumentStatus},
};
