use std::fmt;

use serde::{Deserialize, Serialize};

use crate::oracle::types::ModelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleErrorKind {
    InvalidRequest,
    Authentication,
    Authorization,
    RateLimited,
    Timeout,
    Transport,
    MalformedResponse,
    Cancelled,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleError {
    pub kind: OracleErrorKind,
    pub message: String,
    pub retryable: bool,
    pub model: Option<ModelId>,
    pub http_status: Option<u16>,
}

impl OracleError {
    pub fn new(kind: OracleErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: matches!(
                kind,
                OracleErrorKind::RateLimited | OracleErrorKind::Timeout | OracleErrorKind::Transport
            ),
            model: None,
            http_status: None,
        }
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == OracleErrorKind::Cancelled
    }
}

impl fmt::Display for OracleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.model, self.http_status) {
            (Some(model), Some(status)) => {
                write!(f, "{} (model={}, status={})", self.message, model, status)
            }
            (Some(model), None) => write!(f, "{} (model={})", self.message, model),
            (None, Some(status)) => write!(f, "{} (status={})", self.message, status),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for OracleError {}

pub fn invalid_request(message: impl Into<String>) -> OracleError {
    OracleError::new(OracleErrorKind::InvalidRequest, message).with_retryable(false)
}

pub fn cancelled(message: impl Into<String>) -> OracleError {
    OracleError::new(OracleErrorKind::Cancelled, message).with_retryable(false)
}

pub fn malformed_response(message: impl Into<String>) -> OracleError {
    OracleError::new(OracleErrorKind::MalformedResponse, message).with_retryable(false)
}
