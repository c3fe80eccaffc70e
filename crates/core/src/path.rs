//! Remote path parsing
//!
//! Remote targets are written `ALIAS/BUCKET[/KEY]`. Everything after the
//! bucket separator is the key (or key prefix) and is kept verbatim.

use std::fmt;

use crate::error::{Error, Result};

/// A parsed remote target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePath {
    pub alias: String,
    pub bucket: String,
    /// Object key or key prefix; empty means the whole bucket
    pub key: String,
}

impl RemotePath {
    pub fn new(alias: impl Into<String>, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the path names a bucket only
    pub fn is_bucket(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}/{}", self.alias, self.bucket)
        } else {
            write!(f, "{}/{}/{}", self.alias, self.bucket, self.key)
        }
    }
}

/// Parse `ALIAS/BUCKET[/KEY]`
///
/// A missing alias or bucket is an argument error.
pub fn parse_remote_path(path: &str) -> Result<RemotePath> {
    if path.is_empty() {
        return Err(Error::Argument("Target cannot be empty".to_string()));
    }

    let mut parts = path.splitn(3, '/');
    let alias = parts.next().unwrap_or_default();
    let bucket = parts.next().unwrap_or_default();
    let key = parts.next().unwrap_or_default();

    if alias.is_empty() {
        return Err(Error::Argument(format!(
            "Alias is required in '{path}' (expected alias/bucket[/key])"
        )));
    }

    if bucket.is_empty() {
        return Err(Error::Argument(format!(
            "Bucket name is required in '{path}' (expected alias/bucket[/key])"
        )));
    }

    Ok(RemotePath::new(alias, bucket, key))
}
