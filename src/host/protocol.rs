use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMessage {
    pub seq: u64,
    #[serde(flatten)]
    pub content: HostMessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostMessageContent {
    Request {
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arguments: Option<Value>,
    },
    Response {
        request_seq: u64,
        success: bool,
        command: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
    Event {
        event: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        body: Option<Value>,
    },
}

/// Arguments of `breakpointAdd` / `breakpointRemove`, in editor numbering.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LineArguments {
    pub line: u32,
}

/// Arguments of `command`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandArguments {
    pub text: String,
}
