use crate::models::pagination::PageMeta;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Uniform envelope wrapped around every API response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: ResponseStatus::Success,
            message: message.into(),
            data: Some(data),
            timestamp: Utc::now(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl ApiResponse<()> {
    /// Success envelope with no data payload.
    pub fn message_only(message: impl Into<String>) -> Self {
        ApiResponse {
            status: ResponseStatus::Success,
            message: message.into(),
            data: None,
            timestamp: Utc::now(),
            request_id: None,
        }
    }
}

/// Success envelope carrying pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    #[serde(flatten)]
    pub response: ApiResponse<Vec<T>>,
    pub meta: PageMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(message: impl Into<String>, data: Vec<T>, meta: PageMeta) -> Self {
        PaginatedResponse {
            response: ApiResponse::success(message, data),
            meta,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.response.request_id = Some(request_id.into());
        self
    }
}

/// Error envelope. `errors` carries one message per offending field for
/// validation failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
    pub code: u16,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        ErrorResponse {
            status: ResponseStatus::Error,
            message: message.into(),
            code,
            timestamp: Utc::now(),
            request_id: None,
            errors: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let body = ApiResponse::success("ok", 42).with_request_id("req-1");
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "ok");
        assert_eq!(json["data"], 42);
        assert_eq!(json["request_id"], "req-1");
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn paginated_envelope_flattens_meta_alongside() {
        let body = PaginatedResponse::new("ok", vec![1, 2, 3], PageMeta::new(3, 1, 10));
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["status"], "success");
        assert_eq!(json["meta"]["total_count"], 3);
        assert_eq!(json["meta"]["total_pages"], 1);
    }

    #[test]
    fn error_envelope_omits_empty_fields() {
        let body = ErrorResponse::new("Not found", 404);
        let json = serde_json::to_value(&body).expect("serializable");
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], 404);
        assert!(json.get("errors").is_none());
        assert!(json.get("request_id").is_none());
    }
}
