//! Error types for statscrape
//!
//! This module provides the error hierarchy using `thiserror`. Structural
//! absence in the DOM (no table, no rows, no pagination controls) is never an
//! error; it shows up as empty results instead. Everything here is either a
//! per-target failure or, for session launch, fatal to the run.

use thiserror::Error;

/// The main error type for statscrape operations
#[derive(Error, Debug)]
pub enum Error {
    /// Browser-related errors
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// DOM query errors
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// CSV export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Browser lifecycle and control errors
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Failed to launch browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Browser configuration error
    #[error("Invalid browser configuration: {0}")]
    ConfigError(String),

    /// Browser connection lost
    #[error("Browser connection lost")]
    ConnectionLost,

    /// Failed to create new page/tab
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Browser already closed
    #[error("Browser already closed")]
    AlreadyClosed,
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Errors raised while querying the live DOM
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Invalid selector
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Reading the document from the page failed
    #[error("Failed to read page content: {0}")]
    ContentUnavailable(String),

    /// JavaScript execution failed
    #[error("JavaScript execution failed: {0}")]
    JsExecutionFailed(String),

    /// A target run finished without a single record
    #[error("No records extracted for {0}")]
    NoRecords(String),
}

/// CSV export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// The writer failed
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    /// A column refers to a field the records do not have
    #[error("Unknown field in export header: {0}")]
    UnknownField(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML parse failure
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unknown layout variant name
    #[error("Unknown layout variant: {0}")]
    UnknownVariant(String),

    /// No targets to run
    #[error("Target list is empty")]
    NoTargets,

    /// Invalid week/parameter list
    #[error("Invalid parameter list '{0}'")]
    InvalidParams(String),

    /// Layout is missing something it needs
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),
}

/// Result type alias for statscrape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments that show up when the CDP connection or target is gone.
const SESSION_LOST_SIGNATURES: &[&str] = &[
    "target closed",
    "protocol error",
    "connection closed",
    "channel closed",
    "browser closed",
];

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }

    /// Whether this failure means the browser session is unusable and must be
    /// torn down and relaunched before the next target.
    pub fn is_session_lost(&self) -> bool {
        match self {
            Error::Browser(BrowserError::ConnectionLost | BrowserError::AlreadyClosed) => true,
            Error::Browser(_) | Error::Config(_) | Error::Export(_) | Error::Io(_) => false,
            other => {
                let msg = other.to_string().to_lowercase();
                SESSION_LOST_SIGNATURES.iter().any(|sig| msg.contains(sig))
            }
        }
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}
