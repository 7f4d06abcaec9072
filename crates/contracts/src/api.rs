//! Request/response contracts for the cleanup backend, plus the client-side
//! error taxonomy shared by every endpoint wrapper.

use crate::report::{preview_pairs, Issue, SheetPreview, ValidationReport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// How a backend call failed. Every variant resolves to a single
/// human-readable string; nothing here is retried or re-thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The fetch did not complete at all (no server reached).
    #[error("{0}")]
    Transport(String),

    /// Non-2xx status. The message is the JSON `error` field when the body
    /// carries one, otherwise the HTTP status text.
    #[error("{message}")]
    Protocol { status: u16, message: String },

    /// 2xx response whose body is not valid JSON (or not the shape the
    /// endpoint promised).
    #[error("Invalid JSON response")]
    Decode,

    /// 2xx envelope that itself flags an error. The backend answers rejected
    /// uploads (bad extension, oversize, parse failure) with status 200 and
    /// an `{ "error": … }` body.
    #[error("{0}")]
    Backend(String),
}

/// Decodes a 2xx JSON body, mapping any parse or shape mismatch to
/// [`ApiError::Decode`].
pub fn decode_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|_| ApiError::Decode)
}

/// Like [`decode_json`], but first rejects `{ "error": … }` envelopes, which
/// the backend sends with a 200 status on some failure paths.
pub fn decode_checked<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|_| ApiError::Decode)?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(ApiError::Backend(message.to_string()));
    }
    serde_json::from_value(value).map_err(|_| ApiError::Decode)
}

/// Classifies a non-2xx response: prefer the JSON `error` field, fall back
/// to the HTTP status text.
pub fn protocol_error(status: u16, status_text: &str, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status_text.to_string());
    ApiError::Protocol { status, message }
}

/// 2xx body of `POST /upload`. `errors` is mandatory; a valid-JSON body
/// without it is a decode failure, not an empty (clean) report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub errors: ValidationReport,
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default, deserialize_with = "preview_pairs")]
    pub preview: Vec<(String, SheetPreview)>,
}

/// JSON body of `POST /bulk-fix-preview`.
#[derive(Debug, Clone, Serialize)]
pub struct FixPreviewRequest {
    pub sheet: Option<String>,
    pub fixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixPreviewResponse {
    #[serde(default)]
    pub preview: Vec<String>,
}

/// JSON body of `POST /financial-report`; the response is a downloadable
/// blob.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    pub sheet: Option<String>,
    pub errors: Vec<Issue>,
    pub fixes: Vec<String>,
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRequest {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON body of `POST /feedback`; the response is not interpreted.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_body_is_a_decode_error() {
        let err = decode_checked::<UploadResponse>("{ \"errors\": { \"Sheet").unwrap_err();
        assert_eq!(err, ApiError::Decode);
        assert_eq!(err.to_string(), "Invalid JSON response");
    }

    #[test]
    fn valid_json_without_errors_field_is_a_decode_error() {
        let err = decode_checked::<UploadResponse>(r#"{ "sheets": ["A"] }"#).unwrap_err();
        assert_eq!(err, ApiError::Decode);
    }

    #[test]
    fn two_hundred_error_envelope_is_a_backend_error() {
        let err = decode_checked::<UploadResponse>(
            r#"{ "error": "File too large. Max 5MB allowed." }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Backend("File too large. Max 5MB allowed.".to_string())
        );
    }

    #[test]
    fn upload_response_decodes_report_and_preview() {
        let resp: UploadResponse = decode_checked(
            r#"{
                "sheets": ["Journal"],
                "preview": { "Journal": { "columns": ["Date", "Debit"], "sample": [] } },
                "errors": { "Journal": [{ "row": 2, "issue": "Invalid date" }] }
            }"#,
        )
        .unwrap();
        assert_eq!(resp.sheets, vec!["Journal"]);
        assert_eq!(resp.preview.len(), 1);
        assert_eq!(resp.preview[0].0, "Journal");
        assert_eq!(resp.preview[0].1.columns, vec!["Date", "Debit"]);
        assert_eq!(resp.errors.issue_count(), 1);
    }

    #[test]
    fn protocol_error_prefers_json_error_field() {
        let err = protocol_error(500, "Internal Server Error", r#"{ "error": "sheet locked" }"#);
        assert_eq!(
            err,
            ApiError::Protocol {
                status: 500,
                message: "sheet locked".to_string()
            }
        );
        assert_eq!(err.to_string(), "sheet locked");
    }

    #[test]
    fn protocol_error_falls_back_to_status_text() {
        let err = protocol_error(502, "Bad Gateway", "<html>upstream</html>");
        assert_eq!(
            err,
            ApiError::Protocol {
                status: 502,
                message: "Bad Gateway".to_string()
            }
        );
    }

    #[test]
    fn email_response_carries_optional_error() {
        let ok: EmailResponse = decode_json(r#"{ "success": true }"#).unwrap();
        assert!(ok.success);
        assert_eq!(ok.error, None);
        let failed: EmailResponse =
            decode_json(r#"{ "success": false, "error": "SMTP login failed" }"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("SMTP login failed"));
    }
}
