//! Chat retrieval and answer engine

pub mod engine;
pub mod prompt;

pub use engine::{dot_product, ChatEngine};
pub use prompt::{clean_response_wrapper, render_chat_prompt};
