//! Result and error types for the page objects.

use thiserror::Error;

/// Result type for page-object operations
pub type PageResult<T> = Result<T, PageError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum PageError {
    /// A bounded wait ran out of time
    #[error("{message} (timed out after {ms}ms)")]
    Timeout {
        /// What the wait expected to observe
        message: String,
        /// Budget that was exhausted
        ms: u64,
    },

    /// No element matched a locator
    #[error("Element not found: {selector}")]
    ElementNotFound {
        /// Human-readable form of the locator
        selector: String,
    },

    /// A result-count label did not hold a parenthesized number
    #[error("Malformed count label: {label:?}")]
    CountLabel {
        /// Raw label text
        label: String,
    },

    /// A pager label did not read "Page N of M"
    #[error("Malformed page label: {label:?}")]
    PageLabel {
        /// Raw label text
        label: String,
    },

    /// A slider move too large to express as a pixel offset
    #[error("Slider move of {notches} notches is out of range")]
    SliderOutOfRange {
        /// Requested notches
        notches: i32,
    },

    /// A built-in label pattern failed to compile
    #[error("Label pattern error: {message}")]
    Pattern {
        /// Error message
        message: String,
    },

    /// An activity label outside the known ratings
    #[error("Unknown activity rating: {label:?}")]
    UnknownActivityRating {
        /// Raw label text
        label: String,
    },

    /// The selector kind cannot be used for this lookup
    #[error("Invalid selector: {message}")]
    InvalidSelector {
        /// Error message
        message: String,
    },

    /// The browser session rejected a command
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PageError {
    /// Create a timeout error
    #[must_use]
    pub fn timeout(message: impl Into<String>, ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            ms,
        }
    }

    /// Create a not-found error
    #[must_use]
    pub fn not_found(selector: impl Into<String>) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
        }
    }

    /// Create a session error
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means the element was simply absent
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }

    /// Whether this error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
