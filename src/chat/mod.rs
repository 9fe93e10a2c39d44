//! Chat application module for conversations with Gemini.
//!
//! This module holds everything above the remote client:
//!
//! - Turns and the session store that owns them
//! - Word-by-word reveal of completed answers
//! - Side panel and main panel views derived from the store
//! - Slash commands and CLI configuration for the REPL
//!
//! # Architecture
//!
//! - [`ChatStore`]: conversation state and the `send`/`replay`/`clear`
//!   operations
//! - [`SidePanel`] and [`MainView`]: read-only views of the store
//! - [`parse_command`]: slash command parsing
//! - [`ChatArgs`] and [`ChatConfig`]: CLI argument parsing and configuration

mod commands;
mod config;
mod panels;
mod store;
mod turn;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig, default_state_dir};
pub use panels::{
    AnswerView, GREETING, HistoryEntry, MainView, SUBTITLE, SUGGESTIONS, SidePanel, TurnView,
    suggestion,
};
pub use store::{ChatStore, FALLBACK_MESSAGE, Origin, PendingSend, SendOutcome};
pub use turn::{Turn, TurnId, TurnStatus};
