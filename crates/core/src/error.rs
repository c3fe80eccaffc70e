//! Error types for ossadm-core
//!
//! A single error enum is shared by the core, the S3 adapter and the CLI.
//! Each variant maps onto a CLI exit code via [`Error::exit_code`].

use std::fmt;

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of resource a terminal removal error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceScope {
    Object,
    Bucket,
    Fragment,
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceScope::Object => write!(f, "object"),
            ResourceScope::Bucket => write!(f, "bucket"),
            ResourceScope::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors produced by ossadm
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// The named alias is not configured
    #[error("Alias not found: {0}")]
    AliasNotFound(String),

    /// A path could not be parsed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid flag combination or missing/invalid target; raised before any remote call
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Transport or transient service failure
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials rejected by the service
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Bucket or object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with the resource state (e.g. bucket not empty)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend does not support the requested feature
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal failure on a single resource after the retry budget was spent
    #[error("Failed to remove {scope} '{identifier}' after {attempts} attempt(s): {source}")]
    Resource {
        scope: ResourceScope,
        identifier: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an error with the resource it was acting on
    pub fn resource(
        scope: ResourceScope,
        identifier: impl Into<String>,
        attempts: u32,
        source: Error,
    ) -> Self {
        Error::Resource {
            scope,
            identifier: identifier.into(),
            attempts,
            source: Box::new(source),
        }
    }

    /// Exit code the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::Io(_) | Error::General(_) => 1,
            Error::InvalidPath(_) | Error::Argument(_) => 2,
            Error::Network(_) => 3,
            Error::Auth(_) => 4,
            Error::NotFound(_) | Error::AliasNotFound(_) => 5,
            Error::Conflict(_) => 6,
            Error::UnsupportedFeature(_) => 7,
            Error::Resource { source, .. } => source.exit_code(),
        }
    }

    /// Whether this is a usage error detected before any remote call
    pub fn is_argument_error(&self) -> bool {
        matches!(self, Error::Argument(_) | Error::InvalidPath(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Config(e.to_string())
    }
}
