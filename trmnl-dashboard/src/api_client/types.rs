//! Result types returned by the display client.

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Filename shown when the display API doesn't name the current image.
pub const DEFAULT_FILENAME: &str = "TRMNL Display";

/// Why a call to the display API produced no usable content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DisplayError {
    /// The API answered with something other than 200 OK
    #[error("API Error: {status}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The API could not be reached or its answer could not be read
    #[error("Connection Error")]
    Connection(String),
}

impl DisplayError {
    /// Short error category, e.g. `API Error: 401`.
    pub fn category(&self) -> String {
        self.to_string()
    }

    /// Human-readable detail.
    pub fn message(&self) -> &str {
        match self {
            DisplayError::Api { body, .. } => body,
            DisplayError::Connection(detail) => detail,
        }
    }
}

impl From<reqwest::Error> for DisplayError {
    fn from(e: reqwest::Error) -> Self {
        DisplayError::Connection(e.to_string())
    }
}

/// Content the display API reports for a device.
///
/// This is the API's JSON body as-is. Only `image_url` and `filename` are
/// interpreted; everything else passes through to `/api/status` untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayContent(pub Value);

impl DisplayContent {
    /// URL of the image currently on the display, if any.
    pub fn image_url(&self) -> Option<&str> {
        self.0
            .get("image_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    /// Name of the image currently on the display.
    pub fn filename(&self) -> &str {
        self.0
            .get("filename")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FILENAME)
    }
}

/// Outcome of one display API call, stamped with when it was made.
///
/// Serializes to the envelope served by `/api/status`:
///
/// ```json
/// {"success": true, "data": {...}, "timestamp": "..."}
/// {"success": false, "error": "API Error: 401", "message": "...", "timestamp": "..."}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayResult {
    pub outcome: Result<DisplayContent, DisplayError>,
    pub timestamp: OffsetDateTime,
}

impl DisplayResult {
    /// Stamp an outcome with the current local time.
    pub fn now(outcome: Result<DisplayContent, DisplayError>) -> Self {
        Self {
            outcome,
            timestamp: OffsetDateTime::now_local()
                .unwrap_or_else(|_| OffsetDateTime::now_utc()),
        }
    }

    /// Image URL of a successful result.
    pub fn image_url(&self) -> Option<&str> {
        self.outcome.as_ref().ok().and_then(DisplayContent::image_url)
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a DisplayContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    timestamp: String,
}

impl Serialize for DisplayResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let timestamp = self
            .timestamp
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;

        let envelope = match &self.outcome {
            Ok(content) => Envelope {
                success: true,
                data: Some(content),
                error: None,
                message: None,
                timestamp,
            },
            Err(e) => Envelope {
                success: false,
                data: None,
                error: Some(e.category()),
                message: Some(e.message()),
                timestamp,
            },
        };

        envelope.serialize(serializer)
    }
}

/// Image bytes fetched from the URL the display API handed out.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub body: Bytes,
    /// Upstream `content-type`, if it sent one
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn at_noon(outcome: Result<DisplayContent, DisplayError>) -> DisplayResult {
        DisplayResult {
            outcome,
            timestamp: datetime!(2024-05-01 12:00:00 UTC),
        }
    }

    #[test]
    fn test_success_envelope() {
        let result = at_noon(Ok(DisplayContent(json!({
            "image_url": "https://example.com/image.png",
            "refresh_rate": 900,
        }))));

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": true,
                "data": {
                    "image_url": "https://example.com/image.png",
                    "refresh_rate": 900,
                },
                "timestamp": "2024-05-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_api_error_envelope() {
        let result = at_noon(Err(DisplayError::Api {
            status: 401,
            body: "Unauthorized".into(),
        }));

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "success": false,
                "error": "API Error: 401",
                "message": "Unauthorized",
                "timestamp": "2024-05-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_connection_error_envelope() {
        let result =
            at_noon(Err(DisplayError::Connection("connection refused".into())));
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "Connection Error");
        assert_eq!(value["message"], "connection refused");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_image_url_and_filename() {
        let content = DisplayContent(json!({
            "image_url": "https://x/y.png",
            "filename": "f.png",
        }));
        assert_eq!(content.image_url(), Some("https://x/y.png"));
        assert_eq!(content.filename(), "f.png");

        let unnamed = DisplayContent(json!({ "image_url": "https://x/y.png" }));
        assert_eq!(unnamed.filename(), DEFAULT_FILENAME);
    }

    #[test]
    fn test_missing_or_empty_image_url() {
        assert_eq!(DisplayContent(json!({})).image_url(), None);
        assert_eq!(DisplayContent(json!({ "image_url": "" })).image_url(), None);
        assert_eq!(DisplayContent(json!({ "image_url": null })).image_url(), None);
        assert_eq!(DisplayContent(json!(["not", "an", "object"])).image_url(), None);
    }

    #[test]
    fn test_failed_result_has_no_image_url() {
        let result = at_noon(Err(DisplayError::Api {
            status: 500,
            body: String::new(),
        }));
        assert!(result.outcome.is_err());
        assert_eq!(result.image_url(), None);
    }

    #[test]
    fn test_now_timestamp_is_recent() {
        let before = OffsetDateTime::now_utc();
        let result = DisplayResult::now(Ok(DisplayContent(json!({}))));
        assert!(result.timestamp >= before - time::Duration::seconds(1));
    }
}
