use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`. A missing or `null` `message` deserializes to
/// `None` and is rejected by validation like any other blank input.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}
