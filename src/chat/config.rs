//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::format::MarkupStyle;
use crate::reveal::DEFAULT_REVEAL_STEP;
use crate::types::Model;

/// Directory name used under the platform data directory.
const STATE_DIR_NAME: &str = "gemchat";

/// Command-line arguments for the gemchat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-2.0-flash)", "MODEL")]
    pub model: Option<String>,

    /// Directory where turns and prompt history are saved.
    #[arrrg(optional, "Directory for saved chat state", "DIR")]
    pub state_dir: Option<String>,

    /// Delay between revealed words, in milliseconds.
    #[arrrg(optional, "Delay between revealed words in ms (default: 75)", "MS")]
    pub reveal_ms: Option<u64>,

    /// Print answers at once instead of word by word.
    #[arrrg(flag, "Print answers at once instead of word by word")]
    pub no_reveal: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Directory holding saved chat state.
    pub state_dir: PathBuf,

    /// Whether answers are revealed word by word.
    pub reveal: bool,

    /// Delay between revealed words.
    pub reveal_step: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-2.0-flash
    /// - State: `<data dir>/gemchat`
    /// - Reveal: enabled, 75 ms per word
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            state_dir: default_state_dir(),
            reveal: true,
            reveal_step: DEFAULT_REVEAL_STEP,
            use_color: true,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the state directory.
    pub fn with_state_dir(mut self, dir: PathBuf) -> Self {
        self.state_dir = dir;
        self
    }

    /// Sets the reveal delay.
    pub fn with_reveal_step(mut self, step: Duration) -> Self {
        self.reveal_step = step;
        self
    }

    /// Prints answers at once.
    pub fn without_reveal(mut self) -> Self {
        self.reveal = false;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Markup used when printing answers to the terminal.
    pub fn markup_style(&self) -> MarkupStyle {
        if self.use_color {
            MarkupStyle::Ansi
        } else {
            MarkupStyle::Plain
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = args
            .model
            .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
            .unwrap_or_default();

        ChatConfig {
            model,
            state_dir: args
                .state_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_state_dir),
            reveal: !args.no_reveal,
            reveal_step: args
                .reveal_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_REVEAL_STEP),
            use_color: !args.no_color,
        }
    }
}

/// `<data dir>/gemchat`, or `.gemchat` when the platform has no data dir.
pub fn default_state_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{STATE_DIR_NAME}")))
}
