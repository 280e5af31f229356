//! Turns whatever the service sent with a rejection into a [`ServiceFailure`].
//!
//! Normalization is total: XML error lists, JSON error lists, empty bodies and
//! garbage all come out as a failure with at least one entry.

use crate::domain::failure::{ErrorEntry, ErrorSet, ReasonCode, ServiceFailure};
use crate::domain::ports::WireResponse;
use crate::interfaces::xml::from_xml;
use serde_json::Value;

/// Source attached to the synthetic entry of an unreadable body.
pub const UNPARSEABLE_SOURCE: &str = "response_body";

const DETAILS_LIMIT: usize = 256;

/// Normalizes a rejection body received without a status line.
pub fn normalize(body: &[u8]) -> ServiceFailure {
    normalize_with_status(None, body)
}

pub fn normalize_response(response: &WireResponse) -> ServiceFailure {
    normalize_with_status(Some(response.status), &response.body)
}

fn normalize_with_status(status: Option<u16>, body: &[u8]) -> ServiceFailure {
    let entries = parse_xml(body)
        .map(without_blanks)
        .filter(|entries| !entries.is_empty())
        .or_else(|| {
            parse_json(body)
                .map(without_blanks)
                .filter(|entries| !entries.is_empty())
        });

    match entries {
        Some(entries) => ServiceFailure::new(status, ErrorSet::new(entries)),
        None => unparseable(status, body),
    }
}

fn without_blanks(entries: Vec<ErrorEntry>) -> Vec<ErrorEntry> {
    entries.into_iter().filter(|entry| !entry.is_blank()).collect()
}

fn parse_xml(body: &[u8]) -> Option<Vec<ErrorEntry>> {
    from_xml::<ErrorSet>(body).ok().map(ErrorSet::into_entries)
}

/// Accepts `{"Errors": {"Error": [...]}}` and its lower-case and single-object
/// variants.
fn parse_json(body: &[u8]) -> Option<Vec<ErrorEntry>> {
    let root: Value = serde_json::from_slice(body).ok()?;
    let errors = field(&root, &["Errors", "errors"])?;
    let list = field(errors, &["Error", "error"]).unwrap_or(errors);

    let entries = match list {
        Value::Array(items) => items.iter().filter_map(json_entry).collect(),
        Value::Object(_) => json_entry(list).into_iter().collect(),
        _ => Vec::new(),
    };
    Some(entries)
}

fn json_entry(value: &Value) -> Option<ErrorEntry> {
    if !value.is_object() {
        return None;
    }
    let source = text(value, &["Source", "source"]).unwrap_or_default();
    let reason = text(value, &["ReasonCode", "reasonCode", "reason_code"]).unwrap_or_default();
    let description =
        text(value, &["Description", "description", "Message", "message"]).unwrap_or_default();

    let mut entry = ErrorEntry::new(source, ReasonCode::from(reason.as_str()), description);
    entry.recoverable = field(value, &["Recoverable", "recoverable"])
        .and_then(Value::as_bool)
        .unwrap_or(false);
    entry.details = text(value, &["Details", "details"]);
    Some(entry)
}

fn field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| value.get(*name))
}

fn text(value: &Value, names: &[&str]) -> Option<String> {
    field(value, names).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn unparseable(status: Option<u16>, body: &[u8]) -> ServiceFailure {
    let description = if body.is_empty() {
        "empty error body"
    } else {
        "unrecognized error body"
    };
    let mut entry = ErrorEntry::new(UNPARSEABLE_SOURCE, ReasonCode::UnknownError, description);

    let snippet: String = String::from_utf8_lossy(body)
        .chars()
        .take(DETAILS_LIMIT)
        .collect();
    if !snippet.trim().is_empty() {
        entry = entry.with_details(snippet);
    }

    ServiceFailure::new(status, ErrorSet::new(vec![entry]))
}
