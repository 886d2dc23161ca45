use axum::Json;
use serde::Serialize;

/// Mobile response envelope. The transport status is always 200; the
/// outcome lives in `code`, so older app builds keep parsing responses
/// they do not expect.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>, data: impl Serialize) -> Json<Self> {
        Json(Self {
            code: 200,
            message: message.into(),
            data: serde_json::to_value(data).ok(),
        })
    }

    pub fn err(code: u16, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            code,
            message: message.into(),
            data: None,
        })
    }
}
