//! Response body interpretation shared by every endpoint.

use serde::de::DeserializeOwned;
use tracing::warn;

use locapub_shared::protocol::{ErrorBody, GenerateResponse};
use locapub_shared::GatewayError;

/// Message for a non-2xx answer.
///
/// A JSON body yields its `message` field (or the status line when it has
/// none); a non-JSON body is used verbatim; an empty body gives the status
/// line.
pub fn resolve_error_message(status: u16, body: &str) -> String {
    let fallback = format!("HTTP error! status: {status}");

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::from_value::<ErrorBody>(value)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback),
        Err(_) if !body.trim().is_empty() => body.to_string(),
        Err(_) => fallback,
    }
}

/// A list body: empty means no items, anything else must be a JSON array.
pub fn decode_list<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, GatewayError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(body).map_err(|e| GatewayError::MalformedJson {
        detail: e.to_string(),
    })
}

/// The generated payload; a body without `Support` is an error.
pub fn decode_generated(body: &str) -> Result<String, GatewayError> {
    let resp: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GatewayError::MalformedJson {
            detail: e.to_string(),
        })?;

    match resp.payload {
        Some(payload) if !payload.is_empty() => Ok(payload),
        _ => Err(GatewayError::MissingPayload),
    }
}

/// Outcome of a successful distribution call.
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionReceipt {
    /// The backend confirmed with a JSON document.
    Confirmed(serde_json::Value),
    /// 2xx with a body that is not JSON; still counted as success.
    Unstructured(String),
    Empty,
}

pub fn decode_distribution(body: &str) -> DistributionReceipt {
    if body.trim().is_empty() {
        return DistributionReceipt::Empty;
    }
    match serde_json::from_str(body) {
        Ok(value) => DistributionReceipt::Confirmed(value),
        Err(e) => {
            warn!(error = %e, "Distribution response is not JSON, treating as success");
            DistributionReceipt::Unstructured(body.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_from_json_field() {
        assert_eq!(resolve_error_message(500, r#"{"message":"boom"}"#), "boom");
    }

    #[test]
    fn error_message_json_without_field_uses_status() {
        assert_eq!(
            resolve_error_message(502, r#"{"error":"x"}"#),
            "HTTP error! status: 502"
        );
        assert_eq!(
            resolve_error_message(400, r#"{"message":""}"#),
            "HTTP error! status: 400"
        );
    }

    #[test]
    fn error_message_raw_text_then_status() {
        assert_eq!(resolve_error_message(404, "Workflow not found"), "Workflow not found");
        assert_eq!(resolve_error_message(503, ""), "HTTP error! status: 503");
    }

    #[test]
    fn empty_list_body_is_empty_collection() {
        let items: Vec<serde_json::Value> = decode_list("  ").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn non_array_list_body_is_malformed() {
        let err = decode_list::<serde_json::Value>("<html>").unwrap_err();
        assert!(err.is_malformed_json());
    }

    #[test]
    fn generated_payload_required() {
        assert_eq!(decode_generated(r#"{"Support":"abc"}"#).unwrap(), "abc");
        assert_eq!(
            decode_generated(r#"{"Support":""}"#).unwrap_err(),
            GatewayError::MissingPayload
        );
        assert!(decode_generated("oops").unwrap_err().is_malformed_json());
    }

    #[test]
    fn distribution_is_lenient() {
        assert_eq!(decode_distribution(""), DistributionReceipt::Empty);
        assert_eq!(
            decode_distribution("Workflow was started"),
            DistributionReceipt::Unstructured("Workflow was started".into())
        );
        assert!(matches!(
            decode_distribution(r#"{"ok":true}"#),
            DistributionReceipt::Confirmed(_)
        ));
    }
}
