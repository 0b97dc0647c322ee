//! Error handling for the quizstack engine
//!
//! This module defines the crate-wide error type and a Result alias used
//! throughout the engine. Parse failures carry their own error type
//! ([`ParseError`](crate::parser::ParseError)) and are wrapped here so the
//! host sees a single error surface.

use thiserror::Error;

/// Main error type for quizstack operations
#[derive(Error, Debug)]
pub enum QuizStackError {
    /// Errors from the incremental record parser
    #[error("Parse error: {0}")]
    Parse(#[from] crate::parser::ParseError),

    /// Errors raised by a chunk source while opening or reading
    #[error("Source error: {0}")]
    Source(String),

    /// Errors related to configuration values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication with the engine worker
    #[error("Channel error: {0}")]
    Channel(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<QuizStackError>,
    },
}

impl QuizStackError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        QuizStackError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for quizstack operations
pub type Result<T> = std::result::Result<T, QuizStackError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
