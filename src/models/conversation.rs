use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::MessageType;

/// One chat entry. Never edited once appended to a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub content: String,
    pub timestamp: NaiveDateTime,
}

impl ConversationMessage {
    pub fn user(content: &str) -> Self {
        Self::new(MessageType::User, content)
    }

    pub fn system(content: &str) -> Self {
        Self::new(MessageType::System, content)
    }

    fn new(message_type: MessageType, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            message_type,
            content: content.to_string(),
            timestamp: Local::now().naive_local(),
        }
    }

    /// Clock time shown next to the bubble.
    pub fn display_time(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Append-only chat history for the session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLog {
    messages: Vec<ConversationMessage>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationMessage> {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_message_type() {
        assert_eq!(ConversationMessage::user("hi").message_type, MessageType::User);
        assert_eq!(
            ConversationMessage::system("hello").message_type,
            MessageType::System
        );
    }

    #[test]
    fn log_preserves_insertion_order() {
        let mut log = ConversationLog::new();
        log.append(ConversationMessage::user("first"));
        log.append(ConversationMessage::system("second"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.messages()[0].content, "first");
        assert_eq!(log.last().unwrap().content, "second");
    }

    #[test]
    fn message_serializes_type_key() {
        let msg = ConversationMessage::user("头痛");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "user");
        assert_eq!(json["content"], "头痛");
    }

    #[test]
    fn display_time_is_clock_format() {
        let msg = ConversationMessage::system("ok");
        let time = msg.display_time();
        assert_eq!(time.len(), 8);
        assert_eq!(time.matches(':').count(), 2);
    }
}
