use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::FieldErrors;

/// Banner text used when no response came back from the server.
pub const GENERIC_ERROR: &str = "Server Error";

/// Canonical shape of an error banner. The server sends either a single
/// string or a list of strings; both collapse into this list on arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMessages")]
pub struct ErrorMessages(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessages {
    One(String),
    Many(Vec<String>),
}

impl From<RawMessages> for ErrorMessages {
    fn from(raw: RawMessages) -> Self {
        match raw {
            RawMessages::One(message) => ErrorMessages(vec![message]),
            RawMessages::Many(messages) => ErrorMessages(messages),
        }
    }
}

impl ErrorMessages {
    pub fn single(message: impl Into<String>) -> Self {
        ErrorMessages(vec![message.into()])
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for ErrorMessages {
    fn from(messages: Vec<String>) -> Self {
        ErrorMessages(messages)
    }
}

impl fmt::Display for ErrorMessages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// Error body as sent by the server.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: ErrorMessages,
    #[serde(default)]
    pub fields: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The server (or the local form) rejected one or more fields.
    #[error("{messages}")]
    Validation {
        messages: ErrorMessages,
        fields: FieldErrors,
    },
    #[error("{0}")]
    NotFound(ErrorMessages),
    #[error("server responded {status}: {messages}")]
    Server { status: u16, messages: ErrorMessages },
    /// No usable response: connection refused, timeout, undecodable body.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ClientError {
    /// What the error banner shows for this failure.
    pub fn messages(&self) -> ErrorMessages {
        match self {
            ClientError::Validation { messages, .. }
            | ClientError::NotFound(messages)
            | ClientError::Server { messages, .. } => messages.clone(),
            ClientError::Transport(_) => ErrorMessages::single(GENERIC_ERROR),
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}
