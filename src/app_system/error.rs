//! Failure translation.
//!
//! Every [`ProductError`] is first classified into one [`ErrorKind`] by an
//! ordered list of predicates, then rendered for the transport context the
//! call came in through: a [`CatalogException`] for direct calls, an
//! [`ErrorEnvelope`] for asynchronous commands. Internal details of engine and
//! unknown failures are logged here and never reach the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::actor_framework::StoreError;
use crate::product_actor::ProductError;

pub const DUPLICATE_MESSAGE: &str = "instance/attribute duplicate";
pub const ENGINE_FAILURE_MESSAGE: &str = "Data store engine failure";
pub const INTERNAL_MESSAGE: &str = "Internal error, check logs";

/// Caller-facing failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    DuplicateConstraint,
    ValidationFailure,
    EngineFailure,
    UnknownInternal,
}

/// Status carried by both representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum Status {
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::NotFound => "not found",
            Self::InternalError => "internal error",
        }
    }
}

impl From<Status> for u16 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

impl TryFrom<u16> for Status {
    type Error = String;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            400 => Ok(Self::BadRequest),
            404 => Ok(Self::NotFound),
            500 => Ok(Self::InternalError),
            other => Err(format!("unsupported status code {other}")),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// Which representation the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportContext {
    /// Synchronous in-process call
    Direct,
    /// Asynchronous named command
    Command,
}

/// Status-coded exception for direct calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct CatalogException {
    pub status: Status,
    pub message: String,
}

/// `{status, message}` failure reply of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Exception(CatalogException),
    Envelope(ErrorEnvelope),
}

impl From<TransportError> for ErrorEnvelope {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Envelope(envelope) => envelope,
            TransportError::Exception(CatalogException { status, message }) => {
                Self { status, message }
            }
        }
    }
}

impl From<TransportError> for CatalogException {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Exception(exception) => exception,
            TransportError::Envelope(ErrorEnvelope { status, message }) => {
                Self { status, message }
            }
        }
    }
}

impl From<ProductError> for CatalogException {
    fn from(error: ProductError) -> Self {
        ErrorTranslator::new(TransportContext::Direct).translate(&error).into()
    }
}

impl From<ProductError> for ErrorEnvelope {
    fn from(error: ProductError) -> Self {
        ErrorTranslator::new(TransportContext::Command).translate(&error).into()
    }
}

type Predicate = fn(&ProductError) -> bool;

/// Checked top to bottom; the first match wins. Anything left over is
/// [`ErrorKind::UnknownInternal`].
const RULES: [(Predicate, ErrorKind); 4] = [
    (is_not_found, ErrorKind::NotFound),
    (is_validation_failure, ErrorKind::ValidationFailure),
    (is_unique_violation, ErrorKind::DuplicateConstraint),
    (is_engine_failure, ErrorKind::EngineFailure),
];

fn is_not_found(error: &ProductError) -> bool {
    matches!(error, ProductError::NotFound(_))
}

fn is_validation_failure(error: &ProductError) -> bool {
    matches!(error, ProductError::ValidationFailure(_))
}

fn is_unique_violation(error: &ProductError) -> bool {
    matches!(error, ProductError::Store(StoreError::UniqueViolation(_)))
}

fn is_engine_failure(error: &ProductError) -> bool {
    matches!(error, ProductError::Store(StoreError::EngineUnavailable(_)))
}

pub fn classify(error: &ProductError) -> ErrorKind {
    RULES
        .iter()
        .find(|(predicate, _)| predicate(error))
        .map_or(ErrorKind::UnknownInternal, |(_, kind)| *kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorTranslator {
    context: TransportContext,
}

impl ErrorTranslator {
    pub const fn new(context: TransportContext) -> Self {
        Self { context }
    }

    pub fn translate(&self, error: &ProductError) -> TransportError {
        let (status, message) = render(error);
        match self.context {
            TransportContext::Direct => {
                TransportError::Exception(CatalogException { status, message })
            }
            TransportContext::Command => TransportError::Envelope(ErrorEnvelope { status, message }),
        }
    }
}

fn render(error: &ProductError) -> (Status, String) {
    match classify(error) {
        ErrorKind::NotFound => (Status::NotFound, error.to_string()),
        ErrorKind::ValidationFailure => (Status::BadRequest, error.to_string()),
        ErrorKind::DuplicateConstraint => (Status::BadRequest, DUPLICATE_MESSAGE.to_string()),
        ErrorKind::EngineFailure => {
            error!(error = %error, "Data store engine failure");
            (Status::InternalError, ENGINE_FAILURE_MESSAGE.to_string())
        }
        ErrorKind::UnknownInternal => {
            error!(error = %error, detail = ?error, "Unhandled catalog failure");
            (Status::InternalError, INTERNAL_MESSAGE.to_string())
        }
    }
}
