//! The chat session store.
//!
//! [`ChatStore`] owns every piece of conversation state and is the only
//! thing that mutates it.  Presentation code reads from it and dispatches
//! intents back through `send`, `submit`, `replay`, `clear` and `new_chat`.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::chat::turn::{Turn, TurnId, TurnStatus};
use crate::client::Completer;
use crate::error::{Error, Result};
use crate::format::Formatter;
use crate::observability::{
    CHAT_CLEARS, CHAT_FAILURES, CHAT_REPLAYS, CHAT_SENDS, CHAT_SENDS_IGNORED, REVEAL_CANCELLED,
    REVEAL_WORDS, STORAGE_ERRORS, STORAGE_WRITES,
};
use crate::reveal::{DEFAULT_REVEAL_STEP, Reveal, RevealStep};
use crate::storage::{KeyValueStore, PROMPT_HISTORY_KEY, TURNS_KEY, load_json, save_json};

/// Answer shown when the remote call fails.
pub const FALLBACK_MESSAGE: &str =
    "Sorry, something went wrong while generating a response. Please try again.";

/// Where a send intent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Typed into the input, or a suggestion copied into the input.
    Input,
    /// Picked from the prompt history; not recorded again.
    History,
}

/// Result of a send intent.  Sends never fail with `Err`.
#[derive(Debug, Clone)]
pub enum SendOutcome {
    /// The prompt was empty (or a request was already in flight); nothing
    /// happened.
    Ignored,
    /// The model answered.
    Answered {
        /// Turn that received the answer.
        turn_id: TurnId,
        /// The complete formatted answer.
        formatted: String,
    },
    /// The remote call failed and the turn shows [`FALLBACK_MESSAGE`].
    Failed {
        /// Turn that failed.
        turn_id: TurnId,
        /// What went wrong.
        error: Error,
    },
}

impl SendOutcome {
    /// Turn created by the send, if any.
    pub fn turn_id(&self) -> Option<TurnId> {
        match self {
            SendOutcome::Ignored => None,
            SendOutcome::Answered { turn_id, .. } | SendOutcome::Failed { turn_id, .. } => {
                Some(*turn_id)
            }
        }
    }
}

/// A send that has created its turn and is waiting for the remote call.
#[derive(Debug)]
#[must_use = "a pending send leaves the store loading until it is finished"]
pub struct PendingSend {
    turn_id: TurnId,
    prompt: String,
}

impl PendingSend {
    /// Turn awaiting the answer.
    pub fn turn_id(&self) -> TurnId {
        self.turn_id
    }

    /// Prompt to send to the remote client.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[derive(Debug)]
struct ActiveReveal {
    turn_id: TurnId,
    full_text: String,
    token: CancellationToken,
}

/// Conversation state plus the operations that mutate it.
pub struct ChatStore<C: Completer, S: KeyValueStore> {
    completer: C,
    storage: S,
    formatter: Formatter,
    reveal_step: Duration,
    current_input: String,
    prompt_history: Vec<String>,
    current_answer: String,
    recent_prompt: Option<String>,
    is_loading: bool,
    show_result: bool,
    turns: Vec<Turn>,
    next_turn_id: u64,
    active_reveal: Option<ActiveReveal>,
    unclaimed_reveal: Option<Reveal>,
}

impl<C: Completer, S: KeyValueStore> ChatStore<C, S> {
    /// Creates an empty store.  Nothing is read from `storage`.
    pub fn new(completer: C, storage: S) -> Self {
        Self {
            completer,
            storage,
            formatter: Formatter::default(),
            reveal_step: DEFAULT_REVEAL_STEP,
            current_input: String::new(),
            prompt_history: Vec::new(),
            current_answer: String::new(),
            recent_prompt: None,
            is_loading: false,
            show_result: false,
            turns: Vec::new(),
            next_turn_id: 1,
            active_reveal: None,
            unclaimed_reveal: None,
        }
    }

    /// Creates a store and restores saved state from `storage`.
    ///
    /// Saved state that cannot be read is logged and ignored.
    pub fn open(completer: C, storage: S) -> Self {
        let mut store = Self::new(completer, storage);
        if let Err(err) = store.restore() {
            tracing::warn!(error = %err, "discarding unreadable chat state");
        }
        store
    }

    /// Sets the formatter used for answers.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Sets the delay between revealed words.
    pub fn with_reveal_step(mut self, step: Duration) -> Self {
        self.reveal_step = step;
        self
    }

    /// Replaces in-memory state with what `storage` holds.
    ///
    /// Turns still pending in storage belonged to a previous run whose
    /// request can no longer complete; they are restored as failed.
    ///
    /// # Errors
    ///
    /// Returns the first read or parse error.  State is left empty when an
    /// entry cannot be read.
    pub fn restore(&mut self) -> Result<()> {
        self.cancel_reveal();
        self.turns.clear();
        self.prompt_history.clear();
        self.current_answer.clear();
        self.recent_prompt = None;
        self.is_loading = false;

        let turns: Vec<Turn> = load_json(&self.storage, TURNS_KEY)?.unwrap_or_default();
        let history: Vec<String> =
            load_json(&self.storage, PROMPT_HISTORY_KEY)?.unwrap_or_default();

        self.turns = turns
            .into_iter()
            .map(|mut turn| {
                if turn.is_pending() {
                    turn.status = TurnStatus::Failed {
                        message: FALLBACK_MESSAGE.to_string(),
                    };
                }
                turn
            })
            .collect();
        for prompt in history {
            if !self.prompt_history.contains(&prompt) {
                self.prompt_history.push(prompt);
            }
        }
        self.next_turn_id = self
            .turns
            .iter()
            .map(|turn| turn.id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(self.next_turn_id);
        self.recent_prompt = self.turns.last().map(|turn| turn.question.clone());
        self.show_result = !self.turns.is_empty();
        tracing::info!(
            turns = self.turns.len(),
            prompts = self.prompt_history.len(),
            "restored chat state"
        );
        Ok(())
    }

    /// Text currently in the input field.
    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    /// Binds the input field.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.current_input = input.into();
    }

    /// Deduplicated prompts in the order they were first sent.
    pub fn prompt_history(&self) -> &[String] {
        &self.prompt_history
    }

    /// Display buffer of the most recent answer, filled by the reveal.
    pub fn current_answer(&self) -> &str {
        &self.current_answer
    }

    /// The last prompt sent.
    pub fn recent_prompt(&self) -> Option<&str> {
        self.recent_prompt.as_deref()
    }

    /// True while a remote call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// False when the main panel should show the welcome view.
    pub fn show_result(&self) -> bool {
        self.show_result
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Looks up a turn.
    pub fn turn(&self, id: TurnId) -> Option<&Turn> {
        self.turns.iter().find(|turn| turn.id == id)
    }

    /// The formatter applied to answers.
    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    /// The remote client.
    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// The backing key/value store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the backing store, for entries the store does not
    /// own itself (such as the side panel flag).
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Sends `prompt` and waits for the answer.
    ///
    /// Empty or whitespace-only prompts are ignored without a remote call.
    /// Remote failures are absorbed: the turn is marked failed with
    /// [`FALLBACK_MESSAGE`] and the error is returned in the outcome.
    /// Either way the store is no longer loading and the input is cleared
    /// when this returns.
    pub async fn send(&mut self, prompt: &str, origin: Origin) -> SendOutcome {
        let Some(pending) = self.begin_send(prompt, origin) else {
            return SendOutcome::Ignored;
        };
        let result = self.completer.complete(pending.prompt()).await;
        self.finish_send(pending, result)
    }

    /// Sends whatever is in the input field.
    pub async fn submit(&mut self) -> SendOutcome {
        let prompt = self.current_input.clone();
        self.send(&prompt, Origin::Input).await
    }

    /// Sends a prompt from the history again without recording it twice.
    pub async fn replay(&mut self, prompt: &str) -> SendOutcome {
        CHAT_REPLAYS.click();
        self.send(prompt, Origin::History).await
    }

    /// Replays the `index`th history entry (zero-based).
    pub async fn replay_entry(&mut self, index: usize) -> Option<SendOutcome> {
        let prompt = self.prompt_history.get(index)?.clone();
        Some(self.replay(&prompt).await)
    }

    /// First half of [`ChatStore::send`]: validates the prompt, creates the
    /// pending turn and marks the store loading.
    ///
    /// Returns `None` when the prompt is empty after trimming or another
    /// request is already in flight.
    pub fn begin_send(&mut self, prompt: &str, origin: Origin) -> Option<PendingSend> {
        if prompt.trim().is_empty() {
            CHAT_SENDS_IGNORED.click();
            tracing::debug!("ignoring empty prompt");
            return None;
        }
        if self.is_loading {
            CHAT_SENDS_IGNORED.click();
            tracing::debug!("ignoring send while a request is in flight");
            return None;
        }
        CHAT_SENDS.click();

        self.cancel_reveal();
        let turn_id = TurnId(self.next_turn_id);
        self.next_turn_id += 1;
        self.turns.push(Turn::pending(turn_id, prompt));
        self.is_loading = true;
        self.show_result = true;
        self.current_answer.clear();
        self.recent_prompt = Some(prompt.to_string());
        if origin == Origin::Input && !self.prompt_history.iter().any(|p| p == prompt) {
            self.prompt_history.push(prompt.to_string());
        }
        self.persist();

        Some(PendingSend {
            turn_id,
            prompt: prompt.to_string(),
        })
    }

    /// Second half of [`ChatStore::send`]: records the remote result.
    ///
    /// If the turn was cleared while the request was outstanding the answer
    /// is dropped rather than written into the cleared conversation.
    pub fn finish_send(&mut self, pending: PendingSend, result: Result<String>) -> SendOutcome {
        let turn_id = pending.turn_id;
        self.is_loading = false;
        self.current_input.clear();

        let outcome = match result {
            Ok(text) => {
                let formatted = self.formatter.format(&text);
                if let Some(turn) = self.turns.iter_mut().find(|turn| turn.id == turn_id) {
                    turn.status = TurnStatus::Answered { text };
                    self.start_reveal(turn_id, formatted.clone());
                } else {
                    tracing::debug!(%turn_id, "dropping answer for a cleared turn");
                }
                SendOutcome::Answered { turn_id, formatted }
            }
            Err(error) => {
                CHAT_FAILURES.click();
                tracing::warn!(%turn_id, error = %error, "remote completion failed");
                if let Some(turn) = self.turns.iter_mut().find(|turn| turn.id == turn_id) {
                    turn.status = TurnStatus::Failed {
                        message: FALLBACK_MESSAGE.to_string(),
                    };
                    self.current_answer = self.formatter.format(FALLBACK_MESSAGE);
                }
                SendOutcome::Failed { turn_id, error }
            }
        };
        self.persist();
        outcome
    }

    /// Empties the conversation and the prompt history.
    pub fn clear(&mut self) {
        CHAT_CLEARS.click();
        self.cancel_reveal();
        self.turns.clear();
        self.prompt_history.clear();
        self.current_answer.clear();
        self.current_input.clear();
        self.recent_prompt = None;
        self.is_loading = false;
        self.show_result = false;
        self.persist();
        tracing::info!("chat cleared");
    }

    /// Returns the main panel to the welcome view, keeping all history.
    pub fn new_chat(&mut self) {
        self.cancel_reveal();
        self.current_answer.clear();
        self.is_loading = false;
        self.show_result = false;
    }

    /// Hands out the reveal scheduled by the last successful send.
    ///
    /// Each reveal is handed out once; the store keeps its token so that a
    /// later send, `new_chat()` or `clear()` stops it.
    pub fn take_reveal(&mut self) -> Option<Reveal> {
        self.unclaimed_reveal.take()
    }

    /// Appends one revealed word to the display buffer.
    ///
    /// Returns false, leaving the buffer alone, when the step belongs to a
    /// reveal that is no longer active.
    pub fn apply_reveal(&mut self, step: &RevealStep) -> bool {
        let Some(active) = &self.active_reveal else {
            return false;
        };
        if active.turn_id != step.turn_id || active.token.is_cancelled() {
            return false;
        }
        REVEAL_WORDS.click();
        self.current_answer.push_str(&step.word);
        self.current_answer.push(' ');
        true
    }

    /// Returns true while a reveal is running.
    pub fn is_revealing(&self) -> bool {
        self.active_reveal
            .as_ref()
            .is_some_and(|active| !active.token.is_cancelled())
    }

    /// Turn whose answer is being revealed, if any.
    pub fn revealing_turn(&self) -> Option<TurnId> {
        self.active_reveal
            .as_ref()
            .filter(|active| !active.token.is_cancelled())
            .map(|active| active.turn_id)
    }

    /// Stops the running reveal and puts the whole answer in the display
    /// buffer.  Returns the full formatted answer.
    pub fn finish_reveal(&mut self) -> Option<String> {
        let active = self.active_reveal.take()?;
        active.token.cancel();
        self.unclaimed_reveal = None;
        self.current_answer = active.full_text.clone();
        Some(active.full_text)
    }

    fn start_reveal(&mut self, turn_id: TurnId, formatted: String) {
        self.cancel_reveal();
        let reveal = Reveal::new(turn_id, &formatted, self.reveal_step);
        self.active_reveal = Some(ActiveReveal {
            turn_id,
            full_text: formatted,
            token: reveal.cancellation_token(),
        });
        self.unclaimed_reveal = Some(reveal);
    }

    fn cancel_reveal(&mut self) {
        if let Some(active) = self.active_reveal.take() {
            if !active.token.is_cancelled() {
                REVEAL_CANCELLED.click();
            }
            active.token.cancel();
        }
        self.unclaimed_reveal = None;
    }

    fn persist(&mut self) {
        let result = save_json(&mut self.storage, TURNS_KEY, &self.turns)
            .and_then(|()| save_json(&mut self.storage, PROMPT_HISTORY_KEY, &self.prompt_history));
        match result {
            Ok(()) => STORAGE_WRITES.click(),
            Err(err) => {
                STORAGE_ERRORS.click();
                tracing::warn!(error = %err, "failed to persist chat state");
            }
        }
    }
}
