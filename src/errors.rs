/*!
 * Error types for the dsb_bot application.
 *
 * This module contains custom error types for the different parts of the bot,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while converting teacher plans
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The template file could not be read
    #[error("Failed to read template '{path}': {message}")]
    TemplateUnavailable {
        /// Path of the template file
        path: String,
        /// Underlying I/O error message
        message: String,
    },

    /// The serialized table could not be located in the serialized document
    #[error("Substitution table not found in serialized document")]
    TableNotLocated,
}

/// Errors that can occur when talking to the DSB service
#[derive(Error, Debug)]
pub enum DsbError {
    /// Error when making the request fails
    #[error("DSB request failed: {0}")]
    RequestFailed(String),

    /// Error when the payload cannot be encoded or decoded
    #[error("Failed to decode DSB payload: {0}")]
    Payload(String),

    /// Error returned by the service itself
    #[error("DSB API error (Resultcode {code}): {message}")]
    Api {
        /// Result code reported by the service
        code: i64,
        /// Status text reported by the service
        message: String,
    },

    /// The answer carried no result code
    #[error("DSB API error: response has no Resultcode")]
    MissingResultcode,
}

/// Errors that can occur when posting to a webhook
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The request could not be sent
    #[error("Webhook request failed: {0}")]
    RequestFailed(String),

    /// The webhook answered with an unexpected status
    #[error("Webhook responded with {status_code}: {body}")]
    Status {
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },
}

/// Errors that can occur while running git
#[derive(Error, Debug)]
pub enum GitError {
    /// The git binary could not be run or the checkout prepared
    #[error("Failed to run git: {0}")]
    Io(#[from] std::io::Error),

    /// A git command exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    CommandFailed {
        /// The git subcommand that failed
        command: String,
        /// Captured standard error
        stderr: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from plan conversion
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// Error from the DSB client
    #[error("DSB error: {0}")]
    Dsb(#[from] DsbError),

    /// Error from the notifier
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Error from git
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
