//! Error handling for the diagnosis SDK
//!
//! This module provides the error type shared by every stage of the
//! symptom-to-diagnosis pipeline:
//! - Categorizes errors by kind (validation, init, inference, transport, ...)
//! - Adds rich context to errors for better debugging
//! - Maps backend HTTP error responses to normalized errors
//! - Provides convenient Result type alias

use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for diagnosis SDK operations
pub type Result<T> = std::result::Result<T, DiagnosisError>;

/// Error code attached when a severity label falls outside the triage policy
pub const REFERRAL_POLICY_GAP: &str = "referral_policy_gap";

/// Main error type for the diagnosis SDK
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// Symptom set or request rejected before reaching the engine
    #[error("Validation error: {0}")]
    Validation(String),

    /// Engine or model failed to load
    #[error("Initialization error: {0}")]
    Init(String),

    /// A single scoring attempt failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Response parsing errors
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Backend answered with an error status
    #[error("Service error: {0}")]
    Service(String),

    /// Resource not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<DiagnosisError>,
        context: Box<ErrorContext>,
    },
}

/// Coarse classification of a [`DiagnosisError`], ignoring attached context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Init,
    Inference,
    Configuration,
    Network,
    Timeout,
    Parsing,
    Service,
    NotFound,
}

impl DiagnosisError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        DiagnosisError::Validation(message.into())
    }

    /// Create an initialization error
    pub fn init(message: impl Into<String>) -> Self {
        DiagnosisError::Init(message.into())
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        DiagnosisError::Inference(message.into())
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        DiagnosisError::Configuration(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        DiagnosisError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        DiagnosisError::Timeout(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        DiagnosisError::Parsing(message.into())
    }

    /// Create a service error
    pub fn service(message: impl Into<String>) -> Self {
        DiagnosisError::Service(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        DiagnosisError::NotFound(message.into())
    }

    /// Severity label outside the low/medium/high policy table.
    ///
    /// Surfaces as an inference failure tagged with [`REFERRAL_POLICY_GAP`].
    pub fn referral_policy_gap(label: impl fmt::Display) -> Self {
        DiagnosisError::inference(format!("no triage policy for severity '{}'", label))
            .with_context(ErrorContext::for_service("triage").error_code(REFERRAL_POLICY_GAP))
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        DiagnosisError::WithContext {
            inner: Box::new(self),
            context: Box::new(context),
        }
    }

    /// Kind of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DiagnosisError::Validation(_) => ErrorKind::Validation,
            DiagnosisError::Init(_) => ErrorKind::Init,
            DiagnosisError::Inference(_) => ErrorKind::Inference,
            DiagnosisError::Configuration(_) => ErrorKind::Configuration,
            DiagnosisError::Network(_) => ErrorKind::Network,
            DiagnosisError::Timeout(_) => ErrorKind::Timeout,
            DiagnosisError::Parsing(_) => ErrorKind::Parsing,
            DiagnosisError::Service(_) => ErrorKind::Service,
            DiagnosisError::NotFound(_) => ErrorKind::NotFound,
            DiagnosisError::WithContext { inner, .. } => inner.kind(),
        }
    }

    /// Message of the innermost error, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            DiagnosisError::Validation(m)
            | DiagnosisError::Init(m)
            | DiagnosisError::Inference(m)
            | DiagnosisError::Configuration(m)
            | DiagnosisError::Network(m)
            | DiagnosisError::Timeout(m)
            | DiagnosisError::Parsing(m)
            | DiagnosisError::Service(m)
            | DiagnosisError::NotFound(m) => m.as_str(),
            DiagnosisError::WithContext { inner, .. } => inner.message(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is an initialization error
    pub fn is_init(&self) -> bool {
        self.kind() == ErrorKind::Init
    }

    /// Check if this is an inference error
    pub fn is_inference(&self) -> bool {
        self.kind() == ErrorKind::Inference
    }

    /// Re-tag any failure of a scoring attempt as an inference error.
    ///
    /// Transport, parsing and service errors raised while scoring all mean the
    /// attempt failed; the outermost context (status code, request id) is kept.
    pub fn into_inference(self) -> Self {
        match self {
            inference @ DiagnosisError::Inference(_) => inference,
            DiagnosisError::WithContext { inner, context } => DiagnosisError::WithContext {
                inner: Box::new((*inner).into_inference()),
                context,
            },
            other => DiagnosisError::Inference(other.to_string()),
        }
    }

    /// Get the error code if available
    pub fn error_code(&self) -> Option<&str> {
        match self {
            DiagnosisError::WithContext { context, inner } => {
                context.error_code.as_deref().or_else(|| inner.error_code())
            }
            _ => None,
        }
    }

    /// Get the service name if available
    pub fn service_name(&self) -> Option<&str> {
        match self {
            DiagnosisError::WithContext { context, .. } => Some(&context.service),
            _ => None,
        }
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DiagnosisError::WithContext { context, inner } => {
                context.status_code.or_else(|| inner.status_code())
            }
            _ => None,
        }
    }

    /// Get the request id if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            DiagnosisError::WithContext { context, inner } => {
                context.request_id.as_deref().or_else(|| inner.request_id())
            }
            _ => None,
        }
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Service that generated the error
    pub service: String,

    /// Time the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Machine-readable error code
    pub error_code: Option<String>,

    /// Request ID for tracing
    pub request_id: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            error_code: None,
            request_id: None,
            endpoint: None,
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific service
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    /// Add an HTTP status code
    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Add an error code
    pub fn error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Add a request ID
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Add an endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Convert reqwest errors to DiagnosisError
impl From<reqwest::Error> for DiagnosisError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::for_service("http_client");

        let error = if err.is_timeout() {
            DiagnosisError::timeout(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            DiagnosisError::network(format!("Connection error: {}", err))
        } else if err.is_redirect() {
            DiagnosisError::network(format!("Too many redirects: {}", err))
        } else if err.is_decode() {
            DiagnosisError::parsing(format!("Response decode error: {}", err))
        } else if err.is_request() {
            DiagnosisError::network(format!("Request failed: {}", err))
        } else {
            DiagnosisError::network(format!("HTTP client error: {}", err))
        };

        match err.status() {
            Some(status) => error.with_context(context.status_code(status.as_u16())),
            None => error.with_context(context),
        }
    }
}

/// Convert serde_json errors to DiagnosisError
impl From<serde_json::Error> for DiagnosisError {
    fn from(err: serde_json::Error) -> Self {
        DiagnosisError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}
