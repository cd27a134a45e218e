use std::io;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Decoded reply of one engine invocation.
///
/// The bridge only guarantees that the last stdout line was a JSON object with
/// a boolean `success`. Every other top-level field is kept in `payload`
/// without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeResult {
    pub success: bool,

    #[serde(flatten)]
    pub payload: Map<String, JsonValue>,
}

impl BridgeResult {
    /// Decode one output record.
    ///
    /// Returns a human-readable reason on failure.
    pub fn decode_line(line: &str) -> Result<Self, String> {
        let value: JsonValue =
            serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;

        let JsonValue::Object(mut payload) = value else {
            return Err("result is not a JSON object".to_string());
        };

        match payload.remove("success") {
            Some(JsonValue::Bool(success)) => Ok(Self { success, payload }),
            Some(other) => Err(format!("`success` must be a boolean, found {other}")),
            None => match payload.get("error").and_then(JsonValue::as_str) {
                Some(msg) => Err(format!("missing `success` field; engine reported: {msg}")),
                None => Err("missing `success` field".to_string()),
            },
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.payload.get(key)
    }

    /// The engine's own error message, when it reported one.
    pub fn error_message(&self) -> Option<&str> {
        self.payload.get("error").and_then(JsonValue::as_str)
    }

    /// Reinterpret the payload as a caller-owned schema.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(JsonValue::Object(self.payload))
    }
}

/// Last line of `stdout` whose trimmed content is non-empty.
///
/// This is the engine protocol: one single-line JSON record, last. Earlier
/// lines are treated as diagnostics. A pretty-printed (multi-line) final
/// record is not supported and will fail to decode.
pub fn last_record(stdout: &str) -> Option<&str> {
    stdout.lines().map(str::trim).filter(|l| !l.is_empty()).last()
}

/// Typed view of a `predict_demand` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandForecast {
    #[serde(default)]
    pub predictions: Vec<Map<String, JsonValue>>,
    #[serde(default)]
    pub total_predictions: usize,
    #[serde(default)]
    pub forecast_period: Option<String>,
}

/// Typed view of a `predict_pricing` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendations {
    #[serde(default)]
    pub recommendations: Vec<Map<String, JsonValue>>,
    #[serde(default)]
    pub total_recommendations: usize,
}

/// Classified failure of one invocation.
///
/// Every variant is terminal for that call; the bridge never retries.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to start model process `{program}`: {source}")]
    StartFailure {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("model process exceeded its deadline after {elapsed:?} and was killed")]
    Timeout { elapsed: Duration, stderr: String },

    #[error("model process exited with status {code:?} after {elapsed:?}: {stderr}")]
    NonZeroExit {
        code: Option<i32>,
        stderr: String,
        elapsed: Duration,
    },

    #[error("model process exited successfully but produced no output")]
    EmptyOutput { stderr: String, elapsed: Duration },

    #[error("failed to decode model output: {reason}")]
    DecodeFailure {
        reason: String,
        line: String,
        stderr: String,
    },

    #[error("model invocation cancelled after {elapsed:?}")]
    Cancelled { elapsed: Duration, stderr: String },

    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("i/o error while talking to model process: {0}")]
    Io(#[source] io::Error),
}

impl BridgeError {
    /// Captured stderr of the engine, when the process got far enough to produce any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            BridgeError::Timeout { stderr, .. }
            | BridgeError::NonZeroExit { stderr, .. }
            | BridgeError::EmptyOutput { stderr, .. }
            | BridgeError::DecodeFailure { stderr, .. }
            | BridgeError::Cancelled { stderr, .. } => Some(stderr),
            BridgeError::StartFailure { .. } | BridgeError::Encode(_) | BridgeError::Io(_) => None,
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            BridgeError::Timeout { elapsed, .. }
            | BridgeError::NonZeroExit { elapsed, .. }
            | BridgeError::EmptyOutput { elapsed, .. }
            | BridgeError::Cancelled { elapsed, .. } => Some(*elapsed),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, BridgeError::Timeout { .. })
    }

    /// Short machine-readable classification (logs, HTTP error codes).
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::StartFailure { .. } => "start_failure",
            BridgeError::Timeout { .. } => "timeout",
            BridgeError::NonZeroExit { .. } => "non_zero_exit",
            BridgeError::EmptyOutput { .. } => "empty_output",
            BridgeError::DecodeFailure { .. } => "decode_failure",
            BridgeError::Cancelled { .. } => "cancelled",
            BridgeError::Encode(_) => "encode_failure",
            BridgeError::Io(_) => "io_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn last_record_skips_progress_and_blank_lines() {
        let out = "Models loaded successfully\n{\"success\": true}\n\n  \r\n";
        assert_eq!(last_record(out), Some("{\"success\": true}"));
        assert_eq!(last_record(" \n\n"), None);
    }

    #[test]
    fn decode_line_keeps_payload_fields() {
        let r = BridgeResult::decode_line(r#"{"success":true,"predictions":[],"total_predictions":0}"#)
            .unwrap();
        assert!(r.success);
        assert_eq!(r.get("total_predictions"), Some(&json!(0)));
        assert!(r.get("success").is_none());
    }

    #[test]
    fn decode_line_requires_boolean_success() {
        let err = BridgeResult::decode_line(r#"{"error":"Unknown operation: foo"}"#).unwrap_err();
        assert!(err.contains("Unknown operation: foo"));

        assert!(BridgeResult::decode_line(r#"{"success":"yes"}"#).is_err());
        assert!(BridgeResult::decode_line("[1,2,3]").is_err());
        assert!(BridgeResult::decode_line("Models loaded successfully").is_err());
    }

    #[test]
    fn typed_view_of_demand_reply() {
        let r = BridgeResult::decode_line(
            r#"{"success":true,"predictions":[{"city":"Pune","predicted_units":120}],"total_predictions":1,"forecast_period":"5 days"}"#,
        )
        .unwrap();
        let forecast: DemandForecast = r.into_typed().unwrap();
        assert_eq!(forecast.total_predictions, 1);
        assert_eq!(forecast.predictions[0]["city"], json!("Pune"));
        assert_eq!(forecast.forecast_period.as_deref(), Some("5 days"));
    }

    #[test]
    fn failed_reply_exposes_engine_error() {
        let r = BridgeResult::decode_line(r#"{"success":false,"error":"model missing","recommendations":[]}"#)
            .unwrap();
        assert!(!r.success);
        assert_eq!(r.error_message(), Some("model missing"));
    }

    #[test]
    fn error_accessors_expose_diagnostics() {
        let err = BridgeError::NonZeroExit {
            code: Some(2),
            stderr: "Traceback".to_string(),
            elapsed: Duration::from_millis(12),
        };
        assert_eq!(err.stderr(), Some("Traceback"));
        assert_eq!(err.elapsed(), Some(Duration::from_millis(12)));
        assert_eq!(err.kind(), "non_zero_exit");
        assert!(!err.is_timeout());
    }
}
