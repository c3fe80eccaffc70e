//! Storage backend abstraction
//!
//! [`ObjectStore`] is the narrow surface the removal engine needs from a
//! storage service. The S3 adapter implements it; tests use mocks and an
//! in-memory fake.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Continuation state for one object listing call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCursor {
    pub prefix: String,
    pub marker: String,
    pub delimiter: String,
}

impl PageCursor {
    /// Cursor for the first page under `prefix`, no delimiter
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            marker: String::new(),
            delimiter: String::new(),
        }
    }

    /// Move to the page following `page`
    ///
    /// Fails when the listing is truncated but yields no new marker, since
    /// that would either stop early or list the same page again.
    pub fn advance(&mut self, page: &ObjectPage) -> Result<()> {
        if let Some(prefix) = &page.prefix {
            self.prefix.clone_from(prefix);
        }

        let next = page
            .next_marker
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| page.keys.last().cloned());

        match next {
            Some(marker) if marker > self.marker => {
                self.marker = marker;
                Ok(())
            }
            Some(marker) => Err(Error::General(format!(
                "Listing returned a non-advancing marker '{marker}' after '{}'",
                self.marker
            ))),
            None => Err(Error::General(
                "Listing is truncated but returned no continuation marker".to_string(),
            )),
        }
    }
}

/// One page of an object listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub next_marker: Option<String>,
    pub truncated: bool,
    /// Prefix echoed by the server, if any
    pub prefix: Option<String>,
}

/// An incomplete multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartEntry {
    pub key: String,
    pub upload_id: String,
}

impl MultipartEntry {
    pub fn new(key: impl Into<String>, upload_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            upload_id: upload_id.into(),
        }
    }
}

/// Continuation state for one multipart upload listing call
///
/// Uploads are ordered by key, then by initiation time. Upload ids of one key
/// carry no order of their own, so the cursor only checks that a marker pair
/// has not been handed out before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadCursor {
    pub prefix: String,
    pub key_marker: String,
    pub upload_id_marker: String,
    visited: HashSet<(String, String)>,
}

impl UploadCursor {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Move to the page following `page`
    pub fn advance(&mut self, page: &UploadPage) -> Result<()> {
        if let Some(prefix) = &page.prefix {
            self.prefix.clone_from(prefix);
        }

        let last = page.entries.last();
        let key_marker = page
            .next_key_marker
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| last.map(|e| e.key.clone()));
        let upload_id_marker = page
            .next_upload_id_marker
            .clone()
            .or_else(|| last.map(|e| e.upload_id.clone()))
            .unwrap_or_default();

        let Some(key_marker) = key_marker else {
            return Err(Error::General(
                "Upload listing is truncated but returned no continuation marker".to_string(),
            ));
        };

        self.visited
            .insert((self.key_marker.clone(), self.upload_id_marker.clone()));
        if !self
            .visited
            .insert((key_marker.clone(), upload_id_marker.clone()))
        {
            return Err(Error::General(format!(
                "Upload listing returned a non-advancing marker '{key_marker}'"
            )));
        }

        self.key_marker = key_marker;
        self.upload_id_marker = upload_id_marker;
        Ok(())
    }
}

/// One page of a multipart upload listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadPage {
    pub entries: Vec<MultipartEntry>,
    pub next_key_marker: Option<String>,
    pub next_upload_id_marker: Option<String>,
    pub truncated: bool,
    pub prefix: Option<String>,
}

/// Operations the removal engine consumes from a storage backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one page of object keys
    async fn list_objects(
        &self,
        bucket: &str,
        cursor: &PageCursor,
        max_keys: i32,
    ) -> Result<ObjectPage>;

    /// Delete up to 1000 keys in quiet mode, returning only the keys that failed
    async fn delete_objects_quiet(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>>;

    /// Delete a single object; deleting an absent key succeeds
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Delete a bucket; fails when the bucket is not empty
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// List one page of incomplete multipart uploads
    async fn list_multipart_uploads(
        &self,
        bucket: &str,
        cursor: &UploadCursor,
        max_uploads: i32,
    ) -> Result<UploadPage>;

    async fn abort_multipart_upload(&self, bucket: &str, key: &str, upload_id: &str)
    -> Result<()>;
}
