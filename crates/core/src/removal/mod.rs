//! Removal engine
//!
//! Deletes a single object, every object under a prefix, incomplete
//! multipart uploads, an empty bucket, or a combination of these.
//!
//! A [`RemovalRequest`] is resolved once from the target and flags
//! ([`resolve`]). [`Remover::run`] then executes its plan in a fixed order:
//! objects, multipart uploads, bucket. Each destructive step is gated by a
//! [`ConfirmationGate`] and every remote call goes through the retry policy.
//! Calls are strictly sequential.

mod bucket;
mod confirm;
mod fragments;
mod objects;
mod plan;
mod tally;


pub use confirm::{
    AFFIRMATIVE_ANSWERS, AnswerPolicy, BUCKET_ANSWER_POLICY, Confirmation, ConfirmationGate,
    FRAGMENT_ANSWER_POLICY, IoPrompt, OBJECT_ANSWER_POLICY, Prompt, StdioPrompt,
};
pub use plan::{ExecutionPlan, RemovalFlags, RemovalRequest, resolve};
pub use tally::{DeletionTally, StepStatus};

use crate::alias::RetryConfig;
use crate::error::Error;
use crate::traits::ObjectStore;

/// Maximum keys per quiet batch delete call
pub const MAX_BATCH_SIZE: usize = 1000;

/// Keys or uploads requested per listing page
pub const DEFAULT_PAGE_SIZE: i32 = 1000;

/// Which engine a progress event comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalKind {
    Objects,
    Fragments,
}

/// Receives progress while a removal runs
pub trait RemovalObserver: Send {
    /// Called after each page has been fully processed
    fn page_done(&self, _kind: RemovalKind, _tally: &DeletionTally) {}

    /// Called when an engine stops, whatever the outcome
    fn step_done(&self, _kind: RemovalKind) {}
}

struct NoopObserver;

impl RemovalObserver for NoopObserver {}

/// Everything a removal did, reported even when it failed part-way
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    pub plan: ExecutionPlan,
    pub objects: DeletionTally,
    pub objects_status: StepStatus,
    pub fragments: DeletionTally,
    pub fragments_status: StepStatus,
    pub bucket_status: StepStatus,
}

impl RemovalReport {
    pub fn new(plan: ExecutionPlan) -> Self {
        Self {
            plan,
            objects: DeletionTally::default(),
            objects_status: StepStatus::Skipped,
            fragments: DeletionTally::default(),
            fragments_status: StepStatus::Skipped,
            bucket_status: StepStatus::Skipped,
        }
    }

    pub fn bucket_removed(&self) -> bool {
        self.bucket_status == StepStatus::Completed
    }

    /// Whether any step was declined at its prompt
    pub fn any_cancelled(&self) -> bool {
        [
            self.objects_status,
            self.fragments_status,
            self.bucket_status,
        ]
        .contains(&StepStatus::Cancelled)
    }
}

/// A removal that ended with a terminal error
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct RemovalFailure {
    /// Progress made before the error
    pub report: RemovalReport,
    pub error: Error,
}

/// Executes removal plans against an [`ObjectStore`]
pub struct Remover<'a> {
    store: &'a dyn ObjectStore,
    retry: RetryConfig,
    gate: ConfirmationGate,
    observer: Box<dyn RemovalObserver + 'a>,
    page_size: i32,
}

impl<'a> Remover<'a> {
    pub fn new(store: &'a dyn ObjectStore, retry: RetryConfig, gate: ConfirmationGate) -> Self {
        Self {
            store,
            retry,
            gate,
            observer: Box::new(NoopObserver),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn RemovalObserver + 'a>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the listing page size (clamped to 1..=1000)
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.clamp(1, MAX_BATCH_SIZE as i32);
        self
    }

    /// Execute `request`'s plan
    pub async fn run(&mut self, request: &RemovalRequest) -> Result<RemovalReport, RemovalFailure> {
        let mut report = RemovalReport::new(request.plan);
        tracing::debug!(
            plan = request.plan.name(),
            bucket = request.bucket(),
            key = request.key(),
            forced = self.gate.is_forced(),
            "Starting removal"
        );

        match self.execute(request, &mut report).await {
            Ok(()) => Ok(report),
            Err(error) => Err(RemovalFailure { report, error }),
        }
    }

    async fn execute(
        &mut self,
        request: &RemovalRequest,
        report: &mut RemovalReport,
    ) -> crate::Result<()> {
        let plan = request.plan;
        let bucket = request.bucket();
        let key = request.key();

        if plan.do_objects() {
            let result = if plan.recursive() {
                self.remove_objects_under(bucket, key, &mut report.objects)
                    .await
            } else {
                self.remove_single_object(bucket, key, &mut report.objects)
                    .await
            };
            self.observer.step_done(RemovalKind::Objects);
            settle(&mut report.objects_status, result)?;
        }

        if plan.do_multipart() {
            let result = if plan.recursive() {
                self.remove_fragments_under(bucket, key, &mut report.fragments)
                    .await
            } else {
                self.remove_fragment_exact(bucket, key, &mut report.fragments)
                    .await
            };
            self.observer.step_done(RemovalKind::Fragments);
            settle(&mut report.fragments_status, result)?;
        }

        if plan.do_bucket() {
            if report.objects_status == StepStatus::Cancelled
                || report.fragments_status == StepStatus::Cancelled
            {
                tracing::info!(bucket, "Bucket kept because emptying it was cancelled");
                report.bucket_status = StepStatus::Cancelled;
            } else {
                let result = self.remove_bucket(bucket, key).await;
                settle(&mut report.bucket_status, result)?;
            }
        }

        Ok(())
    }
}

/// Store a step's status, marking it failed on a terminal error
fn settle(status: &mut StepStatus, result: crate::Result<StepStatus>) -> crate::Result<()> {
    match result {
        Ok(s) => {
            *status = s;
            Ok(())
        }
        Err(e) => {
            *status = StepStatus::Failed;
            Err(e)
        }
    }
}
