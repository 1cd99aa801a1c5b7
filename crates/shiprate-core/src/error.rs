//! Structured failure type shared by every component of the rating pipeline.
//!
//! [`CarrierError`] is the only error that crosses the crate boundary. It
//! carries a closed [`ErrorKind`], a human message, and whatever diagnostic
//! data was available at the failure site (HTTP status, the carrier's own
//! error code, free-form context).

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::schema::SchemaIssue;

/// Constructor-level validation failures for domain values.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("field '{field}' length {len} exceeds max {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("country code must be exactly 2 characters: '{value}'")]
    InvalidCountryCode { value: String },
    #[error("field '{field}' must be a finite number greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("length, width and height must be supplied together")]
    PartialDimensions,
    #[error("rate request must include at least one package")]
    NoPackages,
    #[error("invalid carrier id '{value}', expected 1-32 characters of [a-z0-9_-]")]
    InvalidCarrierId { value: String },
}

/// Closed failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    AuthFailed,
    AuthTokenExpired,
    RateLimited,
    Network,
    Timeout,
    Carrier,
    MalformedResponse,
    Unknown,
}

impl ErrorKind {
    pub const ALL: [Self; 9] = [
        Self::Validation,
        Self::AuthFailed,
        Self::AuthTokenExpired,
        Self::RateLimited,
        Self::Network,
        Self::Timeout,
        Self::Carrier,
        Self::MalformedResponse,
        Self::Unknown,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::AuthFailed => "AUTH_FAILED",
            Self::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::RateLimited => "RATE_LIMITED",
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Carrier => "CARRIER_ERROR",
            Self::MalformedResponse => "MALFORMED_RESPONSE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Structured carrier/rating failure.
///
/// Values are built through the kind-specific constructors and then
/// decorated with the `with_*` builders before being returned; nothing
/// mutates an error after it has left the function that produced it.
#[derive(Debug, Clone)]
pub struct CarrierError {
    kind: ErrorKind,
    message: String,
    http_status: Option<u16>,
    carrier_error_code: Option<String>,
    context: BTreeMap<String, Value>,
    cause: Option<Cause>,
}

impl CarrierError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            http_status: None,
            carrier_error_code: None,
            context: BTreeMap::new(),
            cause: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Validation failure built from schema issues; the first issue names the
    /// offending field in the message, the full list goes into context.
    pub fn invalid_request(issues: &[SchemaIssue]) -> Self {
        let message = match issues.first() {
            Some(first) if issues.len() > 1 => format!(
                "invalid rate request: {first} (and {} more issue(s))",
                issues.len() - 1
            ),
            Some(first) => format!("invalid rate request: {first}"),
            None => String::from("invalid rate request"),
        };
        Self::validation(message).with_context("issues", issues_to_value(issues))
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailed, message)
    }

    pub fn auth_token_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthTokenExpired, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn carrier(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Carrier, message)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    /// Malformed payload described by the schema issues that rejected it.
    pub fn malformed_payload(what: &str, issues: &[SchemaIssue]) -> Self {
        let message = match issues.first() {
            Some(first) => format!("{what} failed schema validation: {first}"),
            None => format!("{what} failed schema validation"),
        };
        Self::malformed_response(message).with_context("issues", issues_to_value(issues))
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Coerces a foreign error into `UNKNOWN`, keeping its message and chain.
    pub fn from_unexpected<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::unknown(error.to_string()).with_cause(error)
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_carrier_error_code(mut self, code: impl Into<String>) -> Self {
        self.carrier_error_code = Some(code.into());
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn carrier_error_code(&self) -> Option<&str> {
        self.carrier_error_code.as_deref()
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

impl Display for CarrierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for CarrierError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl Serialize for CarrierError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("message", &self.message)?;
        if let Some(status) = self.http_status {
            map.serialize_entry("httpStatus", &status)?;
        }
        if let Some(code) = &self.carrier_error_code {
            map.serialize_entry("carrierErrorCode", code)?;
        }
        if !self.context.is_empty() {
            map.serialize_entry("context", &self.context)?;
        }
        map.end()
    }
}

impl From<ValidationError> for CarrierError {
    fn from(error: ValidationError) -> Self {
        Self::validation(error.to_string())
    }
}

fn issues_to_value(issues: &[SchemaIssue]) -> Value {
    serde_json::to_value(issues).unwrap_or(Value::Null)
}
