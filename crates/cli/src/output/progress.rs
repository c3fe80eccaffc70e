//! Spinner shown while a removal runs

use std::cell::RefCell;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use ossadm_core::{DeletionTally, RemovalKind, RemovalObserver};

use super::OutputConfig;

/// Draws one spinner per removal step on stderr
///
/// The spinner is only created once the first page is done, so a removal
/// that never gets past its prompt draws nothing.
pub struct RemovalProgress {
    enabled: bool,
    bar: RefCell<Option<ProgressBar>>,
}

impl RemovalProgress {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            enabled: config.progress_enabled() && console::Term::stderr().is_term(),
            bar: RefCell::new(None),
        }
    }

    fn spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

fn noun(kind: RemovalKind) -> &'static str {
    match kind {
        RemovalKind::Objects => "objects",
        RemovalKind::Fragments => "multipart uploads",
    }
}

impl RemovalObserver for RemovalProgress {
    fn page_done(&self, kind: RemovalKind, tally: &DeletionTally) {
        if !self.enabled {
            return;
        }
        let mut bar = self.bar.borrow_mut();
        let pb = bar.get_or_insert_with(Self::spinner);
        pb.set_message(format!(
            "Removed {} of {} {}",
            tally.removed(),
            tally.scanned(),
            noun(kind)
        ));
    }

    fn step_done(&self, _kind: RemovalKind) {
        if let Some(pb) = self.bar.borrow_mut().take() {
            pb.finish_and_clear();
        }
    }
}
