//! Response envelopes of the REST backend.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::location::Location;
use crate::domain::question::QuestionCategory;
use crate::domain::session::SessionUser;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub session_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PaginationInfo {
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: PaginationInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse<T> {
    pub data: T,
}

/// `{success, message?}` acknowledgement. Bodies without a `success` field
/// count as successful.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Ack {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl Ack {
    pub fn message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuestionsResponse {
    #[serde(default)]
    pub categories: Vec<QuestionCategory>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationsResponse {
    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationResponse {
    pub location: Location,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageResponse {
    pub is_in_use: bool,
    #[serde(default)]
    pub user_count: u64,
}

/// Error body of a non-2xx response, in either of the backend's two shapes.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorBody {
    pub fn message(self) -> Option<String> {
        self.message.or(match self.error {
            Some(Value::String(text)) => Some(text),
            Some(Value::Object(map)) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }
}
