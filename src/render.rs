//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the REPL
//! does not care where its output goes.  The default implementation writes
//! to stdout with optional ANSI styling; tests hand it a `Vec<u8>`.

use std::io::{self, Stdout, Write};

use crate::chat::{AnswerView, HistoryEntry, MainView, SidePanel};

/// ANSI escape code for dim text (used for the thinking marker).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for headings).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for questions).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors and failed answers).
const ANSI_RED: &str = "\x1b[31m";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print a chunk of answer text.
    ///
    /// This is called once per revealed word, or once with the whole
    /// answer when the reveal is skipped.
    fn print_text(&mut self, text: &str);

    /// Print the marker shown while a request is in flight.
    fn print_thinking(&mut self);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Called when an answer is complete.
    fn finish_response(&mut self);

    /// Called when the reveal is interrupted by the user.
    fn print_interrupted(&mut self);

    /// Print the side panel.  A collapsed panel shows only its size.
    fn render_side_panel(&mut self, panel: &SidePanel, entries: &[HistoryEntry]);

    /// Print the main panel.
    fn render_main(&mut self, view: &MainView);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    in_thinking: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            in_thinking: false,
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    // Output errors are ignored.
    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn clear_thinking(&mut self) {
        if self.in_thinking {
            self.in_thinking = false;
            if self.use_color {
                self.write("\r\x1b[2K");
            } else {
                self.write("\n");
            }
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_text(&mut self, text: &str) {
        self.clear_thinking();
        self.write(text);
    }

    fn print_thinking(&mut self) {
        let marker = self.styled(ANSI_DIM, "Thinking...");
        self.write(&marker);
        self.in_thinking = true;
    }

    fn print_error(&mut self, error: &str) {
        self.clear_thinking();
        let line = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write(&format!("{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.clear_thinking();
        self.write(&format!("{info}\n"));
    }

    fn finish_response(&mut self) {
        self.clear_thinking();
        self.write("\n\n");
    }

    fn print_interrupted(&mut self) {
        self.clear_thinking();
        self.write("\n[reveal skipped]\n");
    }

    fn render_side_panel(&mut self, panel: &SidePanel, entries: &[HistoryEntry]) {
        self.clear_thinking();
        let heading = self.styled(ANSI_BOLD, "Recent");
        if !panel.is_expanded() {
            self.write(&format!(
                "{heading} ({} prompts, /sidebar to expand)\n",
                entries.len()
            ));
            return;
        }
        self.write(&format!("{heading}\n"));
        if entries.is_empty() {
            self.write("  (none yet)\n");
        }
        for entry in entries {
            self.write(&format!("  {:>2}. {}\n", entry.number, entry.prompt));
        }
    }

    fn render_main(&mut self, view: &MainView) {
        self.clear_thinking();
        match view {
            MainView::Welcome {
                greeting,
                subtitle,
                suggestions,
            } => {
                let greeting = self.styled(ANSI_BOLD, greeting);
                self.write(&format!("{greeting}\n{subtitle}\n\n"));
                for (i, suggestion) in suggestions.iter().enumerate() {
                    self.write(&format!("  [{}] {suggestion}\n", i + 1));
                }
                self.write("\n");
            }
            MainView::Conversation { turns } => {
                for turn in turns {
                    let question = self.styled(ANSI_CYAN, &format!("You: {}", turn.question));
                    self.write(&format!("{question}\n"));
                    let answer = match &turn.answer {
                        AnswerView::Thinking => self.styled(ANSI_DIM, "Thinking..."),
                        AnswerView::Text(text) => text.clone(),
                        AnswerView::Failed(message) => self.styled(ANSI_RED, message),
                    };
                    self.write(&format!("Gemini: {answer}\n\n"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{SUGGESTIONS, TurnId, TurnView};

    fn render(f: impl FnOnce(&mut PlainTextRenderer<Vec<u8>>)) -> String {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), false);
        f(&mut renderer);
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn renderer_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert!(!renderer.use_color);
    }

    #[test]
    fn thinking_then_text() {
        let out = render(|r| {
            r.print_thinking();
            r.print_text("Hello ");
            r.print_text("world ");
            r.finish_response();
        });
        assert_eq!(out, "Thinking...\nHello world \n\n");
    }

    #[test]
    fn colored_thinking_is_erased() {
        let mut renderer = PlainTextRenderer::with_writer(Vec::new(), true);
        renderer.print_thinking();
        renderer.print_text("hi");
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.starts_with(ANSI_DIM));
        assert!(out.ends_with("\r\x1b[2Khi"));
    }

    #[test]
    fn errors_and_info() {
        let out = render(|r| {
            r.print_error("boom");
            r.print_info("cleared");
            r.print_interrupted();
        });
        assert_eq!(out, "Error: boom\ncleared\n\n[reveal skipped]\n");
    }

    #[test]
    fn collapsed_side_panel_shows_count() {
        let entries = vec![HistoryEntry {
            number: 1,
            prompt: "What is React?".to_string(),
        }];
        let out = render(|r| r.render_side_panel(&SidePanel::default(), &entries));
        assert_eq!(out, "Recent (1 prompts, /sidebar to expand)\n");
    }

    #[test]
    fn welcome_lists_suggestions() {
        let view = MainView::Welcome {
            greeting: "Hello, Dev.",
            subtitle: "How can we help you today?",
            suggestions: &SUGGESTIONS,
        };
        let out = render(|r| r.render_main(&view));
        assert!(out.starts_with("Hello, Dev.\nHow can we help you today?\n"));
        assert!(out.contains(&format!("  [1] {}\n", SUGGESTIONS[0])));
        assert!(out.contains(&format!("  [4] {}\n", SUGGESTIONS[3])));
    }

    #[test]
    fn conversation_lists_turns() {
        let view = MainView::Conversation {
            turns: vec![
                TurnView {
                    id: TurnId(1),
                    question: "hi".to_string(),
                    answer: AnswerView::Text("hello".to_string()),
                },
                TurnView {
                    id: TurnId(2),
                    question: "again".to_string(),
                    answer: AnswerView::Thinking,
                },
            ],
        };
        let out = render(|r| r.render_main(&view));
        assert_eq!(
            out,
            "You: hi\nGemini: hello\n\nYou: again\nGemini: Thinking...\n\n"
        );
    }
}
