// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

/// Errors raised while reading exporter configuration from the environment
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Failure of a single call to the logging service, classified by what the
/// caller should do with it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors that abort a whole invocation
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("Invalid invocation input: {0}")]
    InvalidInput(String),

    #[error("Failed to list log groups: {0}")]
    Listing(#[source] ServiceError),
}

impl ExporterError {
    /// Status code reported in the invocation response for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ExporterError::InvalidInput(_) => 400,
            ExporterError::Listing(ServiceError::LimitExceeded(_)) => 429,
            ExporterError::Listing(ServiceError::Transport(_)) => 502,
            ExporterError::Listing(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ExporterError::InvalidInput(_) => "InvalidInput",
            ExporterError::Listing(_) => "ListingError",
        }
    }
}

/// Per log group error taxonomy. None of these abort the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    SubmissionError,
    TransportError,
}

impl From<&ServiceError> for ErrorKind {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            // a duplicate request for the same window is treated like the
            // concurrency ceiling: the next run picks it up
            ServiceError::LimitExceeded(_) | ServiceError::AlreadyExists(_) => {
                ErrorKind::RateLimited
            }
            ServiceError::Rejected { .. } => ErrorKind::SubmissionError,
            ServiceError::Transport(_) => ErrorKind::TransportError,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::SubmissionError => "SubmissionError",
            ErrorKind::TransportError => "TransportError",
        };
        f.write_str(name)
    }
}
