//! Bucket deletion
//!
//! Emptiness is not checked up front: the backend rejects a non-empty bucket
//! and that rejection is retried like any other failure.

use tracing::info;

use super::confirm::{BUCKET_ANSWER_POLICY, Confirmation};
use super::tally::StepStatus;
use super::Remover;
use crate::error::{Error, Result};
use crate::retry::{ResourceTarget, retry_whole_operation};

impl Remover<'_> {
    pub(super) async fn remove_bucket(&mut self, bucket: &str, key: &str) -> Result<StepStatus> {
        if !key.is_empty() {
            return Err(Error::Argument(format!(
                "Cannot remove bucket '{bucket}' with an object key '{key}'"
            )));
        }

        let action = format!("Remove bucket '{bucket}'");
        if self.gate.confirm(&action, BUCKET_ANSWER_POLICY) == Confirmation::Cancelled {
            info!(bucket, "Bucket removal cancelled");
            return Ok(StepStatus::Cancelled);
        }

        let store = self.store;
        retry_whole_operation(&self.retry, &ResourceTarget::bucket(bucket), || {
            store.delete_bucket(bucket)
        })
        .await?;

        info!(bucket, "Removed bucket");
        Ok(StepStatus::Completed)
    }
}
