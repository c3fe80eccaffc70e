//! Target and flag resolution
//!
//! Turns the raw `rm` flags and target into one [`ExecutionPlan`]. Resolution
//! is a pure function: invalid combinations are rejected here, before any
//! remote call is made.

use crate::error::{Error, Result};
use crate::path::{RemotePath, parse_remote_path};

/// Raw removal flags as given on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalFlags {
    pub recursive: bool,
    pub to_bucket: bool,
    pub force: bool,
    pub multipart: bool,
    pub all_type: bool,
}

/// What a removal invocation will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPlan {
    /// Delete one object by exact key
    SingleObject,
    /// Delete every object under a prefix
    BatchObjects,
    /// Abort incomplete multipart uploads only
    FragmentsOnly { recursive: bool },
    /// Delete objects and abort incomplete multipart uploads
    AllTypes { recursive: bool },
    /// Delete an (empty) bucket
    BucketOnly,
    /// Empty a bucket of the selected contents, then delete it
    BucketAndContents { objects: bool, fragments: bool },
}

impl ExecutionPlan {
    /// Resolve the plan for a flag set
    pub fn from_flags(flags: &RemovalFlags) -> Result<Self> {
        let with_fragments = flags.multipart || flags.all_type;

        if flags.to_bucket {
            if !flags.recursive && with_fragments {
                return Err(Error::Argument(
                    "--bucket with --multipart or --all-type requires --recursive".to_string(),
                ));
            }
            if !flags.recursive {
                return Ok(ExecutionPlan::BucketOnly);
            }
            return Ok(ExecutionPlan::BucketAndContents {
                objects: flags.all_type || !flags.multipart,
                fragments: with_fragments,
            });
        }

        let recursive = flags.recursive;
        Ok(if flags.all_type {
            ExecutionPlan::AllTypes { recursive }
        } else if flags.multipart {
            ExecutionPlan::FragmentsOnly { recursive }
        } else if recursive {
            ExecutionPlan::BatchObjects
        } else {
            ExecutionPlan::SingleObject
        })
    }

    pub fn do_objects(&self) -> bool {
        match self {
            ExecutionPlan::SingleObject
            | ExecutionPlan::BatchObjects
            | ExecutionPlan::AllTypes { .. } => true,
            ExecutionPlan::BucketAndContents { objects, .. } => *objects,
            ExecutionPlan::FragmentsOnly { .. } | ExecutionPlan::BucketOnly => false,
        }
    }

    pub fn do_multipart(&self) -> bool {
        match self {
            ExecutionPlan::FragmentsOnly { .. } | ExecutionPlan::AllTypes { .. } => true,
            ExecutionPlan::BucketAndContents { fragments, .. } => *fragments,
            ExecutionPlan::SingleObject
            | ExecutionPlan::BatchObjects
            | ExecutionPlan::BucketOnly => false,
        }
    }

    pub fn do_bucket(&self) -> bool {
        matches!(
            self,
            ExecutionPlan::BucketOnly | ExecutionPlan::BucketAndContents { .. }
        )
    }

    /// Whether content removal matches by prefix rather than exact key
    pub fn recursive(&self) -> bool {
        match self {
            ExecutionPlan::SingleObject | ExecutionPlan::BucketOnly => false,
            ExecutionPlan::BatchObjects | ExecutionPlan::BucketAndContents { .. } => true,
            ExecutionPlan::FragmentsOnly { recursive } | ExecutionPlan::AllTypes { recursive } => {
                *recursive
            }
        }
    }

    /// Stable name used in JSON output
    pub fn name(&self) -> &'static str {
        match self {
            ExecutionPlan::SingleObject => "single_object",
            ExecutionPlan::BatchObjects => "batch_objects",
            ExecutionPlan::FragmentsOnly { .. } => "fragments_only",
            ExecutionPlan::AllTypes { .. } => "all_types",
            ExecutionPlan::BucketOnly => "bucket_only",
            ExecutionPlan::BucketAndContents { .. } => "bucket_and_contents",
        }
    }
}

/// A validated removal request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalRequest {
    pub target: RemotePath,
    pub flags: RemovalFlags,
    pub plan: ExecutionPlan,
}

impl RemovalRequest {
    pub fn bucket(&self) -> &str {
        &self.target.bucket
    }

    /// Object key, or key prefix for recursive plans
    pub fn key(&self) -> &str {
        &self.target.key
    }
}

/// Parse `target` and resolve `flags` into a request
pub fn resolve(target: &str, flags: RemovalFlags) -> Result<RemovalRequest> {
    let target = parse_remote_path(target)?;
    let plan = ExecutionPlan::from_flags(&flags)?;

    if plan.do_bucket() && !target.key.is_empty() {
        return Err(Error::Argument(format!(
            "--bucket cannot be used with an object key or prefix ('{}'); \
             remove --bucket to delete objects",
            target.key
        )));
    }

    if !plan.recursive() && !plan.do_bucket() && target.key.is_empty() {
        return Err(Error::Argument(format!(
            "An object key is required to remove '{}' without --recursive",
            target
        )));
    }

    Ok(RemovalRequest {
        target,
        flags,
        plan,
    })
}
