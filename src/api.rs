use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error_msg: String,
}

/// `{ "result": "success" | "error", "content": ... }` as sent by the API.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case", tag = "result", content = "content")]
pub enum ApiResponse<T> {
    Success(T),
    Error(ErrorResponse),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Network unreachable, timeout, or a bare HTTP error status.
    #[error("{0}")]
    Transport(String),

    /// The server answered with `content.error_msg`.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 401 that survived refresh and replay, or one with nobody to refresh.
    #[error("{0}")]
    Unauthorized(String),

    #[error("Request failed with unknown error: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResult<T> {
    pub status: Option<u16>,
    pub outcome: Result<T, ApiError>,
}

impl<T> ApiResult<T> {
    pub fn ok(status: u16, content: T) -> Self {
        Self {
            status: Some(status),
            outcome: Ok(content),
        }
    }

    pub fn err(status: Option<u16>, error: ApiError) -> Self {
        Self {
            status,
            outcome: Err(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn data(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<String> {
        self.outcome.as_ref().err().map(ToString::to_string)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.outcome, Err(ApiError::Unauthorized(_)))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            status: self.status,
            outcome: self.outcome.map(f),
        }
    }
}

/// Pulls `content.error_msg` out of an error body without assuming its shape.
pub fn server_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("content")?
        .get("error_msg")?
        .as_str()
        .filter(|msg| !msg.is_empty())
        .map(str::to_owned)
}

pub fn status_message(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Decodes a response body for `status`, following the envelope when present.
pub fn decode<T: serde::de::DeserializeOwned>(status: u16, body: &[u8]) -> ApiResult<T> {
    let success = (200..300).contains(&status);
    if !success {
        let message = server_error_message(body).unwrap_or_else(|| status_message(status));
        let error = if status == 401 {
            ApiError::Unauthorized(message)
        } else {
            ApiError::Server { status, message }
        };
        return ApiResult::err(Some(status), error);
    }

    match serde_json::from_slice::<ApiResponse<T>>(body) {
        Ok(ApiResponse::Success(content)) => ApiResult::ok(status, content),
        Ok(ApiResponse::Error(ErrorResponse { error_msg })) => ApiResult::err(
            Some(status),
            ApiError::Server {
                status,
                message: error_msg,
            },
        ),
        Err(e) => ApiResult::err(Some(status), ApiError::Unknown(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn success_envelope_yields_content() {
        let result: ApiResult<Vec<u32>> =
            decode(200, &bytes(json!({ "result": "success", "content": [1, 2] })));
        assert_eq!(result, ApiResult::ok(200, vec![1, 2]));
    }

    #[test]
    fn error_status_prefers_server_message() {
        let body = bytes(json!({ "result": "error", "content": { "error_msg": "No orders found" } }));
        let result: ApiResult<Value> = decode(404, &body);
        assert_eq!(result.status, Some(404));
        assert_eq!(result.error().as_deref(), Some("No orders found"));
    }

    #[test]
    fn bare_error_status_falls_back_to_status_text() {
        let result: ApiResult<Value> = decode(500, b"");
        assert_eq!(
            result.outcome,
            Err(ApiError::Server {
                status: 500,
                message: "Request failed with status code 500".to_owned()
            })
        );
    }

    #[test]
    fn unauthorized_status_is_distinguished() {
        let result: ApiResult<Value> = decode(401, b"");
        assert!(result.is_unauthorized());
    }

    #[test]
    fn undecodable_success_is_unknown_error() {
        let result: ApiResult<u32> = decode(200, b"<html>");
        let message = result.error().unwrap();
        assert!(message.starts_with("Request failed with unknown error:"), "{message}");
    }
}
