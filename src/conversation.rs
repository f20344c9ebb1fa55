use chrono::Utc;

use crate::models::{ChatTurn, Role};

pub const GREETING: &str = "Привет! Я помогу тебе создать мод для Minecraft. Опиши, что должен делать твой мод, и я создам готовый JAR файл.";

/// Append-only chat log for one session.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<ChatTurn>,
    next_id: u64,
}

impl Conversation {
    /// A fresh log opening with the assistant greeting.
    pub fn new() -> Self {
        let mut conversation = Self::default();
        conversation.push(Role::Assistant, GREETING);
        conversation
    }

    pub fn append(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Build a turn with the next id and the current time, append it and
    /// return a copy for event delivery.
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> ChatTurn {
        self.next_id += 1;
        let turn = ChatTurn {
            id: self.next_id.to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        };
        self.append(turn.clone());
        turn
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> ChatTurn {
        self.push(Role::User, content)
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) -> ChatTurn {
        self.push(Role::Assistant, content)
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
