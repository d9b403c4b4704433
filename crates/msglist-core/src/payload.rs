//! Message payloads
//!
//! The store never looks inside a payload. It only needs to build the typing
//! placeholder, which is what [`MessagePayload`] asks for. [`ChatPayload`] is
//! the bundled payload covering the message kinds a chat surface usually
//! renders; hosts with their own kinds implement the trait on their own type.

use serde::{Deserialize, Serialize};

/// Payload carried by a message envelope.
pub trait MessagePayload: Clone {
    /// Payload of the typing placeholder entry.
    fn typing() -> Self;

    /// Whether this payload is a typing indicator.
    fn is_typing(&self) -> bool;
}

/// Display information about who sent a message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Known message kinds, serialized as `{"type": ..., "content": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum MessageContent {
    /// Plain text bubble
    Text { text: String },
    /// Image bubble
    #[serde(rename_all = "camelCase")]
    Image { pic_url: String },
    /// Centered system notice
    System { text: String },
    /// Counterpart is typing
    Typing {},
    /// Anything the host renders itself
    Custom {
        kind: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// Default payload: a [`MessageContent`] plus the opaque routing fields
/// a chat surface passes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[serde(flatten)]
    pub content: MessageContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Sender>,
}

impl ChatPayload {
    pub fn new(content: MessageContent) -> Self {
        Self {
            content,
            scene: None,
            to: None,
            user: None,
        }
    }

    /// Shorthand for a text payload
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(MessageContent::Text { text: text.into() })
    }

    /// Shorthand for an image payload
    pub fn image(pic_url: impl Into<String>) -> Self {
        Self::new(MessageContent::Image {
            pic_url: pic_url.into(),
        })
    }

    /// Shorthand for a system notice
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageContent::System { text: text.into() })
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = Some(scene.into());
        self
    }

    pub fn with_user(mut self, user: Sender) -> Self {
        self.user = Some(user);
        self
    }

    /// The `type` tag of the content, as it appears on the wire
    pub fn kind(&self) -> &str {
        match &self.content {
            MessageContent::Text { .. } => "text",
            MessageContent::Image { .. } => "image",
            MessageContent::System { .. } => "system",
            MessageContent::Typing {} => "typing",
            MessageContent::Custom { kind, .. } => kind,
        }
    }
}

impl MessagePayload for ChatPayload {
    fn typing() -> Self {
        Self {
            content: MessageContent::Typing {},
            scene: Some("p2p".to_string()),
            to: Some(String::new()),
            user: None,
        }
    }

    fn is_typing(&self) -> bool {
        matches!(self.content, MessageContent::Typing {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_payload_wire_shape() {
        let payload = ChatPayload::text("hello").with_scene("group");
        let v = serde_json::to_value(&payload).unwrap();

        assert_eq!(v["type"], "text");
        assert_eq!(v["content"]["text"], "hello");
        assert_eq!(v["scene"], "group");
        assert!(v.get("user").is_none());
    }

    #[test]
    fn test_image_payload_uses_camel_case() {
        let v = serde_json::to_value(ChatPayload::image("https://x/y.png")).unwrap();
        assert_eq!(v["type"], "image");
        assert_eq!(v["content"]["picUrl"], "https://x/y.png");
    }

    #[test]
    fn test_typing_payload() {
        let payload = ChatPayload::typing();
        assert!(payload.is_typing());
        assert_eq!(payload.kind(), "typing");
        assert_eq!(payload.scene.as_deref(), Some("p2p"));

        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["type"], "typing");
        assert_eq!(v["content"], json!({}));
    }

    #[test]
    fn test_custom_payload_parses() {
        let payload: ChatPayload = serde_json::from_value(json!({
            "type": "custom",
            "content": { "kind": "card", "data": { "code": "promo" } },
            "user": { "name": "Robot" }
        }))
        .unwrap();

        assert_eq!(payload.kind(), "card");
        assert!(!payload.is_typing());
        assert_eq!(payload.user.unwrap().name.as_deref(), Some("Robot"));
    }
}
