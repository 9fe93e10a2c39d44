//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a REPL front end over the `generateContent` API.
//! Answers are revealed word by word; prompts and turns are saved under the
//! state directory and restored on the next start.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! GEMINI_API_KEY=... gemchat
//!
//! # Specify a model
//! gemchat --model gemini-1.5-pro
//!
//! # Print answers at once and without colors
//! gemchat --no-reveal --no-color
//! ```
//!
//! Set `GEMCHAT_LOG=debug` to see request logging on stderr.
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/history` - Show recent prompts
//! - `/replay <n>` - Send recent prompt `n` again
//! - `/sidebar` - Expand or collapse the recent prompts panel
//! - `/suggest [n]` - List suggestions, or send suggestion `n`
//! - `/new` - Back to the welcome screen
//! - `/clear` - Clear the conversation and recent prompts
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use futures::StreamExt;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use gemchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatStore, MainView, PlainTextRenderer, Renderer,
    SUGGESTIONS, SendOutcome, SidePanel, help_text, parse_command, suggestion,
};
use gemchat::{Completer, FileStore, Formatter, Gemini, KeyValueStore};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "GEMCHAT_LOG";

/// Everything the REPL needs besides the line editor.
struct App<C: Completer, S: KeyValueStore, R: Renderer> {
    store: ChatStore<C, S>,
    panel: SidePanel,
    renderer: R,
    reveal: bool,
    interrupted: Arc<AtomicBool>,
}

impl<C: Completer, S: KeyValueStore, R: Renderer> App<C, S, R> {
    fn render(&mut self) {
        let entries = self.panel.entries(&self.store);
        self.renderer.render_side_panel(&self.panel, &entries);
        self.renderer.print_info("");
        self.renderer.render_main(&MainView::derive(&self.store));
    }

    /// Sends whatever is in the input field and shows the answer.
    async fn submit(&mut self) {
        if self.store.current_input().trim().is_empty() {
            return;
        }
        self.renderer.print_thinking();
        let outcome = self.store.submit().await;
        self.show(outcome).await;
    }

    async fn replay(&mut self, number: usize) {
        let Some(prompt) = self
            .panel
            .resolve(&self.store, number)
            .map(str::to_string)
        else {
            self.renderer
                .print_error(&format!("No recent prompt numbered {number}"));
            return;
        };
        self.renderer.print_info(&format!("You: {prompt}"));
        self.renderer.print_thinking();
        let outcome = self.store.replay(&prompt).await;
        self.show(outcome).await;
    }

    async fn show(&mut self, outcome: SendOutcome) {
        match outcome {
            SendOutcome::Ignored => {}
            SendOutcome::Failed { error, .. } => {
                tracing::debug!(error = %error, "showing fallback answer");
                let answer = self.store.current_answer().to_string();
                self.renderer.print_text(&answer);
                self.renderer.finish_response();
            }
            SendOutcome::Answered { .. } if !self.reveal => {
                if let Some(answer) = self.store.finish_reveal() {
                    self.renderer.print_text(&answer);
                }
                self.renderer.finish_response();
            }
            SendOutcome::Answered { .. } => self.reveal_answer().await,
        }
    }

    /// Prints the answer one word at a time until it is done or the user
    /// presses Ctrl+C, in which case the rest is printed at once.
    async fn reveal_answer(&mut self) {
        // Ctrl+C pressed while the request was in flight does not skip this reveal.
        self.interrupted.store(false, Ordering::Relaxed);
        let Some(reveal) = self.store.take_reveal() else {
            self.renderer.finish_response();
            return;
        };
        let words = reveal.words().to_vec();
        let mut shown = 0;
        let mut stream = reveal.into_stream();
        while let Some(step) = stream.next().await {
            if self.interrupted.swap(false, Ordering::Relaxed) {
                self.renderer.print_text(&words[step.index..].join(" "));
                self.renderer.print_interrupted();
                self.store.finish_reveal();
                return;
            }
            if self.store.apply_reveal(&step) {
                self.renderer.print_text(&format!("{} ", step.word));
                shown = step.index + 1;
            }
        }
        if shown < words.len() {
            self.renderer.print_text(&words[shown..].join(" "));
        }
        self.store.finish_reveal();
        self.renderer.finish_response();
    }

    /// Runs one slash command.  Returns false when the REPL should exit.
    async fn command(&mut self, command: ChatCommand) -> bool {
        match command {
            ChatCommand::Quit => {
                println!("Goodbye!");
                return false;
            }
            ChatCommand::Clear => {
                self.store.clear();
                self.renderer
                    .print_info("Conversation and recent prompts cleared.");
            }
            ChatCommand::NewChat => {
                self.store.new_chat();
                self.render();
            }
            ChatCommand::History => {
                let entries = self.panel.entries(&self.store);
                self.renderer
                    .render_side_panel(&SidePanel::with_expanded(true), &entries);
            }
            ChatCommand::Replay(number) => self.replay(number).await,
            ChatCommand::Sidebar => {
                if let Err(err) = self.panel.toggle(self.store.storage_mut()) {
                    tracing::warn!(error = %err, "failed to save side panel state");
                }
                let entries = self.panel.entries(&self.store);
                self.renderer.render_side_panel(&self.panel, &entries);
            }
            ChatCommand::Suggest(None) => {
                for (i, prompt) in SUGGESTIONS.iter().enumerate() {
                    self.renderer.print_info(&format!("  [{}] {prompt}", i + 1));
                }
            }
            ChatCommand::Suggest(Some(number)) => match suggestion(number) {
                Some(prompt) => {
                    self.renderer.print_info(&format!("You: {prompt}"));
                    self.store.set_input(prompt);
                    self.submit().await;
                }
                None => self.renderer.print_error(&format!(
                    "Suggestions are numbered 1 to {}",
                    SUGGESTIONS.len()
                )),
            },
            ChatCommand::Help => {
                for line in help_text().lines() {
                    println!("    {}", line);
                }
            }
            ChatCommand::Invalid(message) => {
                self.renderer.print_error(&message);
            }
        }
        true
    }
}

/// Main entry point for the gemchat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("gemchat [OPTIONS]");
    let config = ChatConfig::from(args);

    let client = match Gemini::new(None) {
        Ok(client) => client.with_model(config.model.clone()),
        Err(err) => {
            eprintln!("gemchat: {err}");
            std::process::exit(2);
        }
    };
    let store = ChatStore::open(client, FileStore::new(&config.state_dir))
        .with_formatter(Formatter::new(config.markup_style()))
        .with_reveal_step(config.reveal_step);
    let panel = SidePanel::load(store.storage());

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut app = App {
        store,
        panel,
        renderer: PlainTextRenderer::with_color(config.use_color),
        reveal: config.reveal,
        interrupted: interrupted.clone(),
    };
    let mut rl = DefaultEditor::new()?;

    println!("Gemini Chat (model: {})", config.model);
    println!("Type /help for commands, /quit to exit\n");
    app.render();

    loop {
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(command) = parse_command(line) {
                    if !app.command(command).await {
                        break;
                    }
                    continue;
                }

                app.store.set_input(line);
                app.submit().await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                app.renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}
