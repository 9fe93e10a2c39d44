//! View models for the side panel and the main panel.
//!
//! Nothing here owns conversation state.  Both panels are derived from a
//! [`ChatStore`] on every render; the only state kept locally is whether
//! the side panel is expanded.

use crate::chat::store::ChatStore;
use crate::chat::turn::{TurnId, TurnStatus};
use crate::client::Completer;
use crate::error::Result;
use crate::storage::{KeyValueStore, SIDEBAR_EXPANDED_KEY, load_json, save_json};

/// Greeting shown on the welcome view.
pub const GREETING: &str = "Hello, Dev.";

/// Line shown under the greeting.
pub const SUBTITLE: &str = "How can we help you today?";

/// Prompts offered on the welcome view.
pub const SUGGESTIONS: [&str; 4] = [
    "Suggest a beautiful place for upcoming trial",
    "Briefly summarize the concept of Urban Planning!",
    "Brainstorm team bonding activities for the work retreat!",
    "Improve the readability of my following code!",
];

/// Returns the `number`th suggestion (1-based).
pub fn suggestion(number: usize) -> Option<&'static str> {
    number.checked_sub(1).and_then(|i| SUGGESTIONS.get(i).copied())
}

/////////////////////////////////////////////// SidePanel //////////////////////////////////////////////

/// One row of the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 1-based number used by `/replay`.
    pub number: usize,
    /// The prompt.
    pub prompt: String,
}

/// The recent prompts panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SidePanel {
    expanded: bool,
}

impl SidePanel {
    /// Reads the saved expanded flag.  A missing or unreadable flag means
    /// collapsed.
    pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> Self {
        let expanded = match load_json::<bool, S>(storage, SIDEBAR_EXPANDED_KEY) {
            Ok(flag) => flag.unwrap_or(false),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable side panel state");
                false
            }
        };
        Self { expanded }
    }

    /// A panel in the given state, not backed by storage.
    pub fn with_expanded(expanded: bool) -> Self {
        Self { expanded }
    }

    /// Returns true if the panel lists its entries.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Flips the expanded flag and saves it.
    ///
    /// The flag is flipped even if it cannot be saved.
    pub fn toggle<S: KeyValueStore + ?Sized>(&mut self, storage: &mut S) -> Result<bool> {
        self.expanded = !self.expanded;
        save_json(storage, SIDEBAR_EXPANDED_KEY, &self.expanded)?;
        Ok(self.expanded)
    }

    /// Numbered prompt history, oldest first.
    pub fn entries<C: Completer, S: KeyValueStore>(
        &self,
        store: &ChatStore<C, S>,
    ) -> Vec<HistoryEntry> {
        store
            .prompt_history()
            .iter()
            .enumerate()
            .map(|(i, prompt)| HistoryEntry {
                number: i + 1,
                prompt: prompt.clone(),
            })
            .collect()
    }

    /// Looks up the prompt behind entry `number`.
    pub fn resolve<'a, C: Completer, S: KeyValueStore>(
        &self,
        store: &'a ChatStore<C, S>,
        number: usize,
    ) -> Option<&'a str> {
        number
            .checked_sub(1)
            .and_then(|i| store.prompt_history().get(i))
            .map(String::as_str)
    }
}

/////////////////////////////////////////////// MainView ///////////////////////////////////////////////

/// What a turn's answer area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerView {
    /// The request is in flight.
    Thinking,
    /// Formatted answer, possibly partially revealed.
    Text(String),
    /// The request failed; carries the formatted fallback message.
    Failed(String),
}

/// One turn as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnView {
    /// Turn identifier.
    pub id: TurnId,
    /// The question as sent.
    pub question: String,
    /// The answer area.
    pub answer: AnswerView,
}

/// The main panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainView {
    /// Greeting plus suggestion cards.
    Welcome {
        /// Greeting line.
        greeting: &'static str,
        /// Subtitle line.
        subtitle: &'static str,
        /// Suggestion prompts.
        suggestions: &'static [&'static str],
    },
    /// The turn list.
    Conversation {
        /// Turns, oldest first.
        turns: Vec<TurnView>,
    },
}

impl MainView {
    /// Derives the main panel from the store.
    ///
    /// The welcome view is shown when there are no turns or the store has
    /// been reset with `new_chat()`.  A turn whose answer is being revealed
    /// shows the display buffer rather than the full answer.
    pub fn derive<C: Completer, S: KeyValueStore>(store: &ChatStore<C, S>) -> Self {
        if store.turns().is_empty() || !store.show_result() {
            return MainView::Welcome {
                greeting: GREETING,
                subtitle: SUBTITLE,
                suggestions: &SUGGESTIONS,
            };
        }
        let formatter = store.formatter();
        let revealing = store.revealing_turn();
        let turns = store
            .turns()
            .iter()
            .map(|turn| {
                let answer = match &turn.status {
                    TurnStatus::Pending => AnswerView::Thinking,
                    TurnStatus::Answered { .. } if revealing == Some(turn.id) => {
                        AnswerView::Text(store.current_answer().to_string())
                    }
                    TurnStatus::Answered { text } => AnswerView::Text(formatter.format(text)),
                    TurnStatus::Failed { message } => AnswerView::Failed(formatter.format(message)),
                };
                TurnView {
                    id: turn.id,
                    question: turn.question.clone(),
                    answer,
                }
            })
            .collect();
        MainView::Conversation { turns }
    }

    /// Returns true for the welcome view.
    pub fn is_welcome(&self) -> bool {
        matches!(self, MainView::Welcome { .. })
    }
}
