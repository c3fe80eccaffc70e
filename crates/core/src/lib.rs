//! ossadm-core: Core library for the ossadm object storage administration CLI
//!
//! This crate provides the core functionality for ossadm, including:
//! - Configuration and alias management
//! - Remote path parsing
//! - The ObjectStore trait consumed by the removal engine
//! - Retry policy
//! - The removal engine (objects, multipart uploads, buckets)
//!
//! This crate is independent of any specific S3 SDK, so the engine can be
//! tested against mocks and in-memory stores.

pub mod alias;
pub mod config;
pub mod error;
pub mod path;
pub mod removal;
pub mod retry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_utils;

pub use alias::{Alias, AliasManager, RetryConfig};
pub use config::{Config, ConfigManager};
pub use error::{Error, ResourceScope, Result};
pub use path::{RemotePath, parse_remote_path};
pub use removal::{
    ConfirmationGate, DeletionTally, ExecutionPlan, RemovalFailure, RemovalFlags, RemovalKind,
    RemovalObserver, RemovalReport, RemovalRequest, Remover, StepStatus,
};
pub use retry::{
    ResourceTarget, RetryBuilder, is_retryable_error, retry_failed_subset, retry_whole_operation,
    retry_with_backoff,
};
pub use traits::{MultipartEntry, ObjectPage, ObjectStore, PageCursor, UploadCursor, UploadPage};
