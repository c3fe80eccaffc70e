//! Object deletion: exact key, or every key under a prefix

use tracing::{debug, info};

use super::confirm::{Confirmation, OBJECT_ANSWER_POLICY};
use super::tally::{DeletionTally, StepStatus};
use super::{MAX_BATCH_SIZE, RemovalKind, Remover};
use crate::error::{Error, Result};
use crate::retry::{ResourceTarget, retry_failed_subset, retry_whole_operation};
use crate::traits::PageCursor;

impl Remover<'_> {
    /// Delete exactly one object. Never prompts.
    pub(super) async fn remove_single_object(
        &mut self,
        bucket: &str,
        key: &str,
        tally: &mut DeletionTally,
    ) -> Result<StepStatus> {
        if key.is_empty() {
            return Err(Error::Argument(
                "An object key is required to remove a single object".to_string(),
            ));
        }

        let store = self.store;
        let result = retry_whole_operation(&self.retry, &ResourceTarget::object(key), || {
            store.delete_object(bucket, key)
        })
        .await;

        match result {
            Ok(()) => {
                tally.record(1, 1);
                info!(bucket, key, "Removed object");
                Ok(StepStatus::Completed)
            }
            Err(e) => {
                tally.record(1, 0);
                Err(e)
            }
        }
    }

    /// Delete every object whose key starts with `prefix`, page by page
    pub(super) async fn remove_objects_under(
        &mut self,
        bucket: &str,
        prefix: &str,
        tally: &mut DeletionTally,
    ) -> Result<StepStatus> {
        let action = if prefix.is_empty() {
            format!("Remove all objects in bucket '{bucket}'")
        } else {
            format!("Remove all objects under '{bucket}/{prefix}'")
        };
        if self.gate.confirm(&action, OBJECT_ANSWER_POLICY) == Confirmation::Cancelled {
            info!(bucket, prefix, "Object removal cancelled");
            return Ok(StepStatus::Cancelled);
        }

        let store = self.store;
        let page_size = self.page_size;
        let bucket_target = ResourceTarget::bucket(bucket);
        let mut cursor = PageCursor::new(prefix);

        loop {
            let page = retry_whole_operation(&self.retry, &bucket_target, || {
                store.list_objects(bucket, &cursor, page_size)
            })
            .await?;

            debug!(
                bucket,
                prefix = %cursor.prefix,
                marker = %cursor.marker,
                keys = page.keys.len(),
                truncated = page.truncated,
                "Listed objects"
            );

            for batch in page.keys.chunks(MAX_BATCH_SIZE) {
                let report = retry_failed_subset(&self.retry, batch.to_vec(), |keys| {
                    store.delete_objects_quiet(bucket, keys)
                })
                .await;

                let submitted = batch.len() as u64;
                tally.record(submitted, submitted.saturating_sub(report.failed.len() as u64));
                report.into_result(&bucket_target)?;
            }

            self.observer.page_done(RemovalKind::Objects, tally);

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
            "Removed objects"
        );
        Ok(StepStatus::Completed)
    }
}
