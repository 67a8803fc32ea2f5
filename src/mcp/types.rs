use rmcp::model::{CallToolResult, JsonObject, RawContent, ResourceContents};
use serde::Serialize;
use serde_json::Value;

/// Arguments mapping for one tool invocation.
///
/// Optional fields are only inserted when a value is present, so the remote
/// tool never receives `null` placeholders for omitted parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArguments {
    inner: JsonObject,
}

impl ToolArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.inner.insert(key.to_string(), value.into());
        self
    }

    pub fn with_optional<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn into_object(self) -> JsonObject {
        self.inner
    }
}

/// Request to call an MCP tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    pub arguments: ToolArguments,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: ToolArguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Response from an MCP tool call
#[derive(Debug, Clone)]
pub struct ToolCallResponse {
    pub content: Vec<ToolContent>,
    pub is_error: Option<bool>,
}

impl ToolCallResponse {
    /// Text of the first content item, if that item is text.
    pub fn first_text(&self) -> Option<&str> {
        match self.content.first() {
            Some(ToolContent::Text { text }) => Some(text),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }
}

impl From<CallToolResult> for ToolCallResponse {
    fn from(result: CallToolResult) -> Self {
        let content = result
            .content
            .into_iter()
            .filter_map(|c| match c.raw {
                RawContent::Text(text_content) => Some(ToolContent::Text {
                    text: text_content.text,
                }),
                RawContent::Image(image_content) => Some(ToolContent::Image {
                    data: image_content.data,
                    mime_type: image_content.mime_type,
                }),
                RawContent::Resource(resource_content) => match resource_content.resource {
                    ResourceContents::TextResourceContents { uri, mime_type, .. } => {
                        Some(ToolContent::Resource { uri, mime_type })
                    }
                    ResourceContents::BlobResourceContents { uri, mime_type, .. } => {
                        Some(ToolContent::Resource { uri, mime_type })
                    }
                },
                _ => None,
            })
            .collect();

        Self {
            content,
            is_error: result.is_error,
        }
    }
}

/// Content item of a tool response. Serialized only for diagnostics.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        mime_type: String,
    },
    Resource {
        uri: String,
        mime_type: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_absent_leaves_no_key() {
        let args = ToolArguments::new()
            .with("text", "hello")
            .with_optional("image_path", None::<String>);

        assert!(args.contains_key("text"));
        assert!(!args.contains_key("image_path"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_optional_present_is_inserted() {
        let args = ToolArguments::new()
            .with("text", "hello")
            .with_optional("video_path", Some("/tmp/clip.mp4"));

        assert_eq!(args.get("video_path"), Some(&json!("/tmp/clip.mp4")));
    }

    #[test]
    fn test_integer_values() {
        let args = ToolArguments::new().with("limit", 20u32);
        assert_eq!(Value::Object(args.into_object()), json!({"limit": 20}));
    }

    #[test]
    fn test_first_text() {
        let response = ToolCallResponse {
            content: vec![
                ToolContent::Text {
                    text: "first".to_string(),
                },
                ToolContent::Text {
                    text: "second".to_string(),
                },
            ],
            is_error: None,
        };
        assert_eq!(response.first_text(), Some("first"));
        assert!(!response.is_error());
    }

    #[test]
    fn test_first_text_empty_or_non_text() {
        let empty = ToolCallResponse {
            content: vec![],
            is_error: None,
        };
        assert_eq!(empty.first_text(), None);

        let image_first = ToolCallResponse {
            content: vec![ToolContent::Image {
                data: "AAAA".to_string(),
                mime_type: "image/png".to_string(),
            }],
            is_error: Some(false),
        };
        assert_eq!(image_first.first_text(), None);
    }

    #[test]
    fn test_content_serialization_tag() {
        let content = ToolContent::Text {
            text: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&content).unwrap(),
            json!({"type": "text", "text": "hi"})
        );
    }
}
