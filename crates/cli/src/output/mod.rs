//! Output handling: human-readable text, JSON, and progress

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::RemovalProgress;

use ossadm_core::config::Defaults;

/// Output settings for one command invocation
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Strict JSON on stdout, errors as JSON on stderr
    pub json: bool,
    pub no_color: bool,
    pub no_progress: bool,
    /// Suppress everything but errors
    pub quiet: bool,
}

impl OutputConfig {
    /// Merge the config file defaults into the command line flags
    ///
    /// Flags can only switch features off, so a flag always wins.
    pub fn with_defaults(mut self, defaults: &Defaults) -> Self {
        self.json |= defaults.output.eq_ignore_ascii_case("json");
        self.no_color |= !defaults.color;
        self.no_progress |= !defaults.progress;
        self
    }

    /// Whether a progress indicator may be drawn
    pub fn progress_enabled(&self) -> bool {
        !(self.json || self.quiet || self.no_progress)
    }
}
