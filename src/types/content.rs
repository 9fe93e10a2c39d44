use serde::{Deserialize, Serialize};

/// The producer of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Content written by the person chatting.
    User,
    /// Content generated by the model.
    Model,
}

/// One part of a multi-part content message.
///
/// Only text parts are modelled; other part kinds in a response deserialize
/// with `text == None` and are skipped when the answer is assembled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// The text of this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set on parts that carry model reasoning rather than the answer.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    /// Creates a text part.
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            thought: false,
        }
    }
}

/// A message in the conversation: a role and its parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Producer of the content; omitted in some responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Ordered parts making up the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a single-part user message.
    pub fn user<S: Into<String>>(text: S) -> Self {
        Self {
            role: Some(Role::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates every non-thought text part.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}
