//! Error taxonomy shared by the client, decoder, coordinator and writer.

use std::sync::Arc;

use thiserror::Error;

use crate::fetcher::ResourceKind;

pub type Result<T> = std::result::Result<T, Error>;

/// A malformed or missing required JSON field.
///
/// `context` is a JSON path such as `$[0].measuredGoals[1].realGoal`.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{context}: {cause}")]
pub struct DecodeError {
    pub context: String,
    pub cause: String,
}

impl DecodeError {
    pub fn new(context: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            cause: cause.into(),
        }
    }

    pub fn missing(context: impl Into<String>) -> Self {
        Self::new(context, "required field is missing")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request to {path} failed with status {status_code}: {message}")]
    Api {
        status_code: u16,
        path: String,
        message: String,
    },

    #[error("decode failure at {0}")]
    Decode(#[from] DecodeError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Raised by presentation collaborators; nothing in this crate returns it.
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("fetch of {kind} projects for {key} failed: {source}")]
    Fetch {
        key: String,
        kind: ResourceKind,
        #[source]
        source: Arc<Error>,
    },

    #[error("fetch of {kind} projects for {key} ended without an outcome")]
    FetchAborted { key: String, kind: ResourceKind },
}

impl Error {
    /// The error a shared fetch outcome was raised from.
    pub fn root(&self) -> &Error {
        match self {
            Error::Fetch { source, .. } => source.root(),
            other => other,
        }
    }

    /// A sentence safe to show to an end user. Raw transport and decode
    /// detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self.root() {
            Error::Transport(_) => {
                "The server could not be reached. Check your connection and try again.".to_string()
            }
            Error::Api { status_code, .. } if *status_code == 404 => {
                "The requested item no longer exists.".to_string()
            }
            Error::Api { status_code, .. } if *status_code >= 500 => {
                "The server ran into a problem. Try again later.".to_string()
            }
            Error::Api { .. } => "The server rejected the request.".to_string(),
            Error::Decode(_) | Error::FetchAborted { .. } => {
                "The server sent data that could not be read.".to_string()
            }
            Error::Config(_) | Error::InvalidRequest(_) => {
                "The application is not configured correctly.".to_string()
            }
            Error::Validation { field, message } => format!("{}: {}", field, message),
            Error::Fetch { source, .. } => source.user_message(),
        }
    }
}
