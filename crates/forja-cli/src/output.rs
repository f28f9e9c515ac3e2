//! Output formatting and progress reporting

use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Status lines on stderr and a progress bar for long steps
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` items
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet || total == 0 {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Advance the progress bar by one item
    pub fn step(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Position of the progress bar, if one is running
    #[must_use]
    pub fn position(&self) -> Option<u64> {
        self.progress_bar.as_ref().map(ProgressBar::position)
    }

    /// Finish and clear the progress bar
    pub fn finish(&mut self) {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("✓", "OK", console::Color::Green), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("⚠", "WARN", console::Color::Yellow), message);
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        self.line(&self.prefix("ℹ", "INFO", console::Color::Blue), message);
    }

    fn prefix(&self, symbol: &str, plain: &str, color: console::Color) -> String {
        if self.use_color {
            style(symbol).fg(color).bold().to_string()
        } else {
            plain.to_string()
        }
    }

    fn line(&self, prefix: &str, message: &str) {
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }
}
