use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Categorical reason attached to each rejected field.
///
/// Known codes get their own variant so callers can match exhaustively;
/// anything else upstream invents lands in [`ReasonCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    InvalidInputValue,
    InvalidInputFormat,
    InvalidInputLength,
    MissingRequiredInput,
    ProposalExpired,
    DuplicateValue,
    Decline,
    UnknownError,
    Other(String),
}

impl ReasonCode {
    pub fn as_str(&self) -> &str {
        match self {
            ReasonCode::InvalidInputValue => "INVALID_INPUT_VALUE",
            ReasonCode::InvalidInputFormat => "INVALID_INPUT_FORMAT",
            ReasonCode::InvalidInputLength => "INVALID_INPUT_LENGTH",
            ReasonCode::MissingRequiredInput => "MISSING_REQUIRED_INPUT",
            ReasonCode::ProposalExpired => "PROPOSAL_EXPIRED",
            ReasonCode::DuplicateValue => "DUPLICATE_VALUE",
            ReasonCode::Decline => "DECLINE",
            ReasonCode::UnknownError => "UNKNOWN_ERROR",
            ReasonCode::Other(code) => code,
        }
    }
}

impl Default for ReasonCode {
    fn default() -> Self {
        ReasonCode::UnknownError
    }
}

impl FromStr for ReasonCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = match s.trim() {
            "INVALID_INPUT_VALUE" => ReasonCode::InvalidInputValue,
            "INVALID_INPUT_FORMAT" => ReasonCode::InvalidInputFormat,
            "INVALID_INPUT_LENGTH" => ReasonCode::InvalidInputLength,
            "MISSING_REQUIRED_INPUT" => ReasonCode::MissingRequiredInput,
            "PROPOSAL_EXPIRED" => ReasonCode::ProposalExpired,
            "DUPLICATE_VALUE" => ReasonCode::DuplicateValue,
            "DECLINE" => ReasonCode::Decline,
            "UNKNOWN_ERROR" | "" => ReasonCode::UnknownError,
            other => ReasonCode::Other(other.to_string()),
        };
        Ok(code)
    }
}

impl From<&str> for ReasonCode {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(code) => code,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReasonCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReasonCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ReasonCode::from(raw.as_str()))
    }
}

/// One field-level rejection reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Path of the offending field, e.g. `proposal_id`.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub reason_code: ReasonCode,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorEntry {
    pub fn new(
        source: impl Into<String>,
        reason_code: ReasonCode,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            reason_code,
            description: description.into(),
            recoverable: false,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// True when the entry names neither a field nor a known reason.
    pub fn is_blank(&self) -> bool {
        self.source.trim().is_empty() && self.reason_code == ReasonCode::UnknownError
    }

    pub fn is(&self, source: &str, reason_code: &ReasonCode) -> bool {
        self.source == source && &self.reason_code == reason_code
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.reason_code, self.source)?;
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// Ordered collection of the entries of one failed call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSet {
    #[serde(rename = "error", default)]
    entries: Vec<ErrorEntry>,
}

impl ErrorSet {
    pub fn new(entries: Vec<ErrorEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&ErrorEntry> {
        self.entries.first()
    }

    /// Returns the first entry matching both `source` and `reason_code`.
    pub fn find(&self, source: &str, reason_code: &ReasonCode) -> Option<&ErrorEntry> {
        self.entries.iter().find(|entry| entry.is(source, reason_code))
    }

    pub fn into_entries(self) -> Vec<ErrorEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a ErrorEntry;
    type IntoIter = std::slice::Iter<'a, ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// An upstream rejection, carrying every field-level entry the service sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.render())]
pub struct ServiceFailure {
    /// HTTP status of the rejection, when one was received.
    pub status: Option<u16>,
    pub summary: Option<String>,
    pub errors: ErrorSet,
}

impl ServiceFailure {
    pub fn new(status: Option<u16>, errors: ErrorSet) -> Self {
        let summary = errors
            .first()
            .filter(|entry| !entry.description.is_empty())
            .map(|entry| entry.description.clone());
        Self {
            status,
            summary,
            errors,
        }
    }

    /// A failure with a single synthetic `UNKNOWN_ERROR` entry.
    pub fn unknown(
        status: Option<u16>,
        source: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let entry = ErrorEntry::new(source, ReasonCode::UnknownError, description);
        Self::new(status, ErrorSet::new(vec![entry]))
    }

    pub fn has(&self, source: &str, reason_code: &ReasonCode) -> bool {
        self.errors.find(source, reason_code).is_some()
    }

    fn render(&self) -> String {
        let mut out = match self.status {
            Some(status) => format!("service rejected the request (status {status})"),
            None => "service call failed".to_string(),
        };
        if let Some(summary) = &self.summary {
            out.push_str(": ");
            out.push_str(summary);
        }
        for entry in &self.errors {
            out.push_str("\n  - ");
            out.push_str(&entry.to_string());
        }
        out
    }
}
