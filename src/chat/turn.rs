//! Conversation turns.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of a turn, unique for the lifetime of a store.
///
/// Identifiers are never reused, even across `clear()`, so a reveal that
/// outlives its turn can never be mistaken for a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a turn's answer stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TurnStatus {
    /// The remote call is outstanding.
    Pending,
    /// The model answered; `text` is the raw, unformatted answer.
    Answered {
        /// Raw answer text.
        text: String,
    },
    /// The remote call failed; `message` is shown in place of an answer.
    Failed {
        /// Fallback message.
        message: String,
    },
}

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Identifier of this turn.
    pub id: TurnId,
    /// The prompt as it was sent.
    pub question: String,
    /// Answer state.
    #[serde(flatten)]
    pub status: TurnStatus,
    /// When the prompt was sent.
    #[serde(with = "crate::utils::time")]
    pub asked_at: OffsetDateTime,
}

impl Turn {
    /// Creates a pending turn asked now.
    pub fn pending(id: TurnId, question: impl Into<String>) -> Self {
        Self {
            id,
            question: question.into(),
            status: TurnStatus::Pending,
            asked_at: OffsetDateTime::now_utc(),
        }
    }

    /// Returns true while the remote call is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, TurnStatus::Pending)
    }

    /// Returns true if the remote call failed.
    pub fn is_failed(&self) -> bool {
        matches!(self.status, TurnStatus::Failed { .. })
    }

    /// The text shown as the answer: the raw answer, the fallback message,
    /// or `None` while pending.
    pub fn answer(&self) -> Option<&str> {
        match &self.status {
            TurnStatus::Pending => None,
            TurnStatus::Answered { text } => Some(text),
            TurnStatus::Failed { message } => Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn answer_by_status() {
        let mut turn = Turn::pending(TurnId(1), "hi");
        assert!(turn.is_pending());
        assert_eq!(turn.answer(), None);

        turn.status = TurnStatus::Answered {
            text: "hello".to_string(),
        };
        assert_eq!(turn.answer(), Some("hello"));
        assert!(!turn.is_failed());

        turn.status = TurnStatus::Failed {
            message: "oops".to_string(),
        };
        assert_eq!(turn.answer(), Some("oops"));
        assert!(turn.is_failed());
    }

    #[test]
    fn stored_shape() {
        let turn = Turn {
            id: TurnId(7),
            question: "What is React?".to_string(),
            status: TurnStatus::Answered {
                text: "A library.".to_string(),
            },
            asked_at: datetime!(2025-03-01 12:00:00 UTC),
        };
        let value = serde_json::to_value(&turn).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "question": "What is React?",
                "state": "answered",
                "text": "A library.",
                "asked_at": "2025-03-01T12:00:00Z"
            })
        );
        let back: Turn = serde_json::from_value(value).unwrap();
        assert_eq!(back, turn);
    }

    #[test]
    fn display_id() {
        assert_eq!(TurnId(3).to_string(), "#3");
    }
}
