//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across all commands.

use console::Style;
use serde::Serialize;

use super::OutputConfig;

/// Color theme for styled output
#[derive(Debug, Clone)]
pub struct Theme {
    /// Alias/bucket names - bold
    pub name: Style,
    /// Counts in summaries - green
    pub count: Style,
    /// Success messages - green
    pub success: Style,
    /// Error messages - red
    pub error: Style,
    /// Warning messages - yellow
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: Style::new().bold(),
            count: Style::new().green(),
            success: Style::new().green(),
            error: Style::new().red(),
            warning: Style::new().yellow(),
        }
    }
}

impl Theme {
    /// Returns a theme with no styling (for no-color mode)
    pub fn plain() -> Self {
        Self {
            name: Style::new(),
            count: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warning: Style::new(),
        }
    }
}

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, all output is strict JSON without colors or progress.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        let theme = if config.no_color || config.json {
            Theme::plain()
        } else {
            Theme::default()
        };
        Self { config, theme }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    // ========== Style helper methods ==========

    /// Style an alias/bucket name (bold)
    pub fn style_name(&self, text: &str) -> String {
        self.theme.name.apply_to(text).to_string()
    }

    /// Style a count (green)
    pub fn style_count(&self, count: u64) -> String {
        self.theme.count.apply_to(count).to_string()
    }

    // ========== Output methods ==========

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet {
            return;
        }

        if self.config.json {
            // In JSON mode, success is indicated by exit code, not message
            return;
        }

        let checkmark = self.theme.success.apply_to("✓");
        println!("{checkmark} {message}");
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else {
            let cross = self.theme.error.apply_to("✗");
            eprintln!("{cross} {message}");
        }
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        let warn_icon = self.theme.warning.apply_to("⚠");
        eprintln!("{warn_icon} {message}");
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
