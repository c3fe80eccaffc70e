//! Multipart fragment purge: aborting incomplete multipart uploads
//!
//! Aborts have no batch primitive, so each upload is one call. Aborts are not
//! retried; only listing pages are.

use tracing::{debug, info};

use super::confirm::{Confirmation, FRAGMENT_ANSWER_POLICY};
use super::tally::{DeletionTally, StepStatus};
use super::{RemovalKind, Remover};
use crate::error::{Error, Result};
use crate::retry::{ResourceTarget, retry_whole_operation};
use crate::traits::{MultipartEntry, UploadCursor};

impl Remover<'_> {
    /// Abort the uploads for exactly `key`, looking at the first page only
    ///
    /// Listing by prefix returns uploads for `key` itself first, so the scan
    /// stops at the first entry with a different key. Never prompts.
    pub(super) async fn remove_fragment_exact(
        &mut self,
        bucket: &str,
        key: &str,
        tally: &mut DeletionTally,
    ) -> Result<StepStatus> {
        if key.is_empty() {
            return Err(Error::Argument(
                "An object key is required to remove its multipart uploads".to_string(),
            ));
        }

        let store = self.store;
        let page_size = self.page_size;
        let cursor = UploadCursor::new(key);
        let page = retry_whole_operation(&self.retry, &ResourceTarget::bucket(bucket), || {
            store.list_multipart_uploads(bucket, &cursor, page_size)
        })
        .await?;

        for entry in page.entries.iter().take_while(|e| e.key == key) {
            self.abort_fragment(bucket, entry, tally).await?;
        }

        self.observer.page_done(RemovalKind::Fragments, tally);
        info!(
            bucket,
            key,
            removed = tally.removed(),
            "Removed multipart uploads"
        );
        Ok(StepStatus::Completed)
    }

    /// Abort every upload whose key starts with `prefix`
    pub(super) async fn remove_fragments_under(
        &mut self,
        bucket: &str,
        prefix: &str,
        tally: &mut DeletionTally,
    ) -> Result<StepStatus> {
        let action = if prefix.is_empty() {
            format!("Remove all multipart uploads in bucket '{bucket}'")
        } else {
            format!("Remove all multipart uploads under '{bucket}/{prefix}'")
        };
        if self.gate.confirm(&action, FRAGMENT_ANSWER_POLICY) == Confirmation::Cancelled {
            info!(bucket, prefix, "Multipart upload removal cancelled");
            return Ok(StepStatus::Cancelled);
        }

        let store = self.store;
        let page_size = self.page_size;
        let bucket_target = ResourceTarget::bucket(bucket);
        let mut cursor = UploadCursor::new(prefix);

        loop {
            let page = retry_whole_operation(&self.retry, &bucket_target, || {
                store.list_multipart_uploads(bucket, &cursor, page_size)
            })
            .await?;

            debug!(
                bucket,
                prefix = %cursor.prefix,
                key_marker = %cursor.key_marker,
                uploads = page.entries.len(),
                truncated = page.truncated,
                "Listed multipart uploads"
            );

            for entry in page.entries.iter().filter(|e| e.key.starts_with(prefix)) {
                self.abort_fragment(bucket, entry, tally).await?;
            }

            self.observer.page_done(RemovalKind::Fragments, tally);

            if !page.truncated {
                break;
            }
            cursor.advance(&page)?;
        }

        info!(
            bucket,
            prefix,
            scanned = tally.scanned(),
            removed = tally.removed(),
            "Removed multipart uploads"
        );
        Ok(StepStatus::Completed)
    }

    async fn abort_fragment(
        &self,
        bucket: &str,
        entry: &MultipartEntry,
        tally: &mut DeletionTally,
    ) -> Result<()> {
        match self
            .store
            .abort_multipart_upload(bucket, &entry.key, &entry.upload_id)
            .await
        {
            Ok(()) => {
                tally.record(1, 1);
                debug!(bucket, key = %entry.key, upload_id = %entry.upload_id, "Aborted upload");
                Ok(())
            }
            Err(e) => {
                tally.record(1, 0);
                Err(ResourceTarget::fragment(&entry.key).exhausted(1, e))
            }
        }
    }
}
