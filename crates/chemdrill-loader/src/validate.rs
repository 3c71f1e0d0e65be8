//! Response-envelope validation.
//!
//! A remote body must be one of three recognized envelopes before any
//! entity parsing happens: a delimited-text payload, a pre-structured
//! entity array, or an error report. HTML documents and arrays carrying a
//! different entity type than requested are hard validation failures, not
//! parse attempts.

use chemdrill_core::model::{PoolType, QuestionRecord};
use chemdrill_core::parser;

use crate::error::{LoaderError, ValidationFailure};

/// Field holding a delimited-text payload.
const PAYLOAD_FIELD: &str = "payload";
/// Field holding a pre-structured entity array.
const RECORDS_FIELD: &str = "records";
/// Field holding a remote-reported error message.
const ERROR_FIELD: &str = "error";

/// True when the body opens like an HTML document.
fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(16).collect::<String>().to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Validate a response body and parse it into question records.
pub fn parse_envelope(
    pool_type: PoolType,
    body: &str,
) -> Result<Vec<QuestionRecord>, LoaderError> {
    if looks_like_html(body) {
        return Err(ValidationFailure::HtmlBody.into());
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|_| ValidationFailure::UnrecognizedShape)?;
    let Some(envelope) = value.as_object() else {
        return Err(ValidationFailure::UnrecognizedShape.into());
    };

    if let Some(message) = envelope.get(ERROR_FIELD).and_then(|v| v.as_str()) {
        return Err(LoaderError::Remote(message.to_string()));
    }

    if let Some(payload) = envelope.get(PAYLOAD_FIELD).and_then(|v| v.as_str()) {
        return parser::parse_payload(payload)
            .map_err(|e| ValidationFailure::Malformed(e.to_string()).into());
    }

    if let Some(records) = envelope.get(RECORDS_FIELD).and_then(|v| v.as_array()) {
        check_cross_wiring(pool_type, records)?;
        return parser::parse_entities(pool_type, records)
            .map_err(|e| ValidationFailure::Malformed(e.to_string()).into());
    }

    Err(ValidationFailure::UnrecognizedShape.into())
}

/// Reject an entity array whose first element belongs to a different pool
/// type than requested. An empty array is valid (an empty dataset).
fn check_cross_wiring(
    pool_type: PoolType,
    records: &[serde_json::Value],
) -> Result<(), ValidationFailure> {
    let Some(first) = records.first() else {
        return Ok(());
    };
    let Some(entity) = first.as_object() else {
        return Err(ValidationFailure::UnrecognizedShape);
    };

    if entity.contains_key(pool_type.marker_field()) {
        return Ok(());
    }

    let found = PoolType::all()
        .into_iter()
        .find(|t| entity.contains_key(t.marker_field()))
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Err(ValidationFailure::CrossWired {
        expected: pool_type,
        found,
    })
}
