//! Error type shared by every domain service.
//!
//! Adapters translate [`ErrorCode`] into their own status vocabulary. Form
//! validation failures list each offending field under `details.fields`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure category, serialised in `snake_case`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed input or failed form validation.
    InvalidRequest,
    /// No valid session, or rejected credentials.
    Unauthorized,
    /// Signed in, but not allowed to act on the target.
    Forbidden,
    /// No such user or micropost.
    NotFound,
    /// Competing write on the same record.
    Conflict,
    /// Storage unreachable.
    ServiceUnavailable,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller supplies a blank one.
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "request is invalid",
            Self::Unauthorized => "sign in required",
            Self::Forbidden => "action not permitted",
            Self::NotFound => "resource not found",
            Self::Conflict => "resource state conflict",
            Self::ServiceUnavailable => "service unavailable",
            Self::InternalError => "internal error",
        }
    }
}

/// Failure returned by every domain operation.
///
/// The message is never blank: [`Error::new`] substitutes
/// [`ErrorCode::fallback_message`], while [`Error::try_new`] and
/// deserialisation reject blank input.
///
/// # Examples
/// ```
/// use micropost::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("micropost not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(Error::new(ErrorCode::Forbidden, " ").message(), "action not permitted");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorValidationError {
    #[error("error message must not be empty")]
    EmptyMessage,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::try_new(code, message).unwrap_or_else(|_| Self {
            code,
            message: code.fallback_message().to_owned(),
            details: None,
        })
    }

    /// Build an error, rejecting a blank message.
    pub fn try_new(
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured payload, for example `{"fields": [...]}` on validation
    /// failures.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Names of the fields listed under `details.fields`, in order.
    ///
    /// ```
    /// use micropost::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("validation failed")
    ///     .with_details(json!({ "fields": [{ "field": "email", "code": "taken" }] }));
    /// assert_eq!(err.field_names(), vec!["email"]);
    /// ```
    pub fn field_names(&self) -> Vec<&str> {
        self.details
            .as_ref()
            .and_then(|details| details.get("fields"))
            .and_then(Value::as_array)
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|field| field.get("field").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape of [`Error`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let error = Self::try_new(value.code, value.message)?;
        Ok(match value.details {
            Some(details) => error.with_details(details),
            None => error,
        })
    }
}
