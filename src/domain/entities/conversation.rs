use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// An ordered exchange with a chat model.
///
/// Every mutation produces a new value; a history handed to the model invoker
/// is never altered from the caller's side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_assistant_reply(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }

    /// A new user turn may only follow an assistant turn (or open the conversation).
    pub fn ensure_ready_for_user(&self) -> Result<(), ValidationError> {
        match self.turns.last() {
            Some(turn) if turn.role != Role::Assistant => Err(ValidationError::ConversationOrder),
            _ => Ok(()),
        }
    }

    pub fn with_user_turn(&self, content: impl Into<String>) -> Result<Self, ValidationError> {
        self.ensure_ready_for_user()?;
        Ok(self.with_turn(Turn::new(Role::User, content)))
    }

    pub fn with_assistant_turn(&self, content: impl Into<String>) -> Self {
        self.with_turn(Turn::new(Role::Assistant, content))
    }

    fn with_turn(&self, turn: Turn) -> Self {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend_from_slice(&self.turns);
        turns.push(turn);
        Self { turns }
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}
