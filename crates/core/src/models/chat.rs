//! Assistant chat history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageKind {
    Text,
    Image,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ChatMessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl ChatMessage {
    /// A plain text message.
    pub fn text(
        id: impl Into<String>,
        text: impl Into<String>,
        is_user: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_user,
            timestamp,
            kind: Some(ChatMessageKind::Text),
            image_uri: None,
        }
    }

    /// Attaches an image, which makes this an image message.
    pub fn with_image(mut self, image_uri: impl Into<String>) -> Self {
        self.kind = Some(ChatMessageKind::Image);
        self.image_uri = Some(image_uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_767_225_600, 0).unwrap()
    }

    #[test]
    fn test_text_message_has_text_kind() {
        let message = ChatMessage::text("m1", "Hello", true, at());
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["type"], "text");
        assert_eq!(json["isUser"], true);
        assert!(json.get("imageUri").is_none());
    }

    #[test]
    fn test_with_image_switches_kind() {
        let message =
            ChatMessage::text("m2", "Look at this", true, at()).with_image("file:///rash.jpg");

        assert_eq!(message.kind, Some(ChatMessageKind::Image));
        assert_eq!(message.image_uri.as_deref(), Some("file:///rash.jpg"));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "image");
    }
}
