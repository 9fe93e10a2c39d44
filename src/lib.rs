// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod format;
pub mod render;
pub mod reveal;
pub mod storage;
pub mod types;
pub mod utils;

mod client_logger;
mod observability;

// Re-exports
pub use client::{API_KEY_ENV, Completer, Gemini, resolve_api_key};
pub use client_logger::ClientLogger;
pub use error::{Error, Result};
pub use format::{Formatter, MarkupStyle, format, format_escaped};
pub use observability::register_biometrics;
pub use reveal::{DEFAULT_REVEAL_STEP, Reveal, RevealStep};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
