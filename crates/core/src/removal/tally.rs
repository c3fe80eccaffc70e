//! Progress counters

/// Running `scanned`/`removed` counters for one kind of removal
///
/// Both counters only grow, and `removed` never exceeds `scanned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionTally {
    scanned: u64,
    removed: u64,
}

impl DeletionTally {
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    pub fn removed(&self) -> u64 {
        self.removed
    }

    /// Entries scanned but not removed
    pub fn failed(&self) -> u64 {
        self.scanned - self.removed
    }

    /// Record the outcome of one page or call
    ///
    /// Must only be called once the outcome is known.
    pub fn record(&mut self, scanned: u64, removed: u64) {
        debug_assert!(removed <= scanned, "removed {removed} > scanned {scanned}");
        self.scanned += scanned;
        self.removed += removed.min(scanned);
    }
}

/// How one step of a plan ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepStatus {
    /// Not part of the plan
    #[default]
    Skipped,
    /// Declined at the confirmation prompt
    Cancelled,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Skipped => "skipped",
            StepStatus::Cancelled => "cancelled",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}
