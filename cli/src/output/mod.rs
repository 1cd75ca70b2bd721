//! Terminal output: glyph-prefixed status lines and aligned tables.

pub mod styles;

use console::Term;
use owo_colors::{OwoColorize as _, Style};
pub use styles::Styles;

use crate::application::ports::Reporter;

/// Styling and terminal state shared by all command output.
///
/// Status lines go to stdout and honor `quiet`; errors go to stderr
/// unconditionally. Table rows are data, never suppressed.
pub struct OutputContext {
    /// Resolved stylesheet, plain unless colors are enabled.
    pub styles: Styles,
    /// True when stdout is attached to a terminal.
    pub is_tty: bool,
    /// Errors-only mode.
    pub quiet: bool,
}

impl OutputContext {
    /// Resolve styling from flags, TTY detection and `NO_COLOR`.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let mut styles = Styles::default();
        if !no_color && is_tty && std::env::var("NO_COLOR").is_err() {
            styles.colorize();
        }
        Self { styles, is_tty, quiet }
    }

    fn status(&self, glyph: &str, style: Style, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", glyph.style(style));
        }
    }

    /// `✓` line on stdout.
    pub fn success(&self, msg: &str) {
        self.status("✓", self.styles.success, msg);
    }

    /// `⚠` line on stdout.
    pub fn warn(&self, msg: &str) {
        self.status("⚠", self.styles.warning, msg);
    }

    /// `ℹ` line on stdout.
    pub fn info(&self, msg: &str) {
        self.status("ℹ", self.styles.info, msg);
    }

    /// `✗` line on stderr. Printed even in quiet mode.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.error));
    }

    /// One table row, cells left-padded to `widths`, trailing space
    /// trimmed.
    pub fn row(&self, cells: &[&str], widths: &[usize]) {
        let line = cells
            .iter()
            .zip(widths.iter().chain(std::iter::repeat(&0)))
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line.trim_end());
    }
}

impl Reporter for OutputContext {
    fn info(&self, message: &str) {
        OutputContext::info(self, message);
    }

    fn success(&self, message: &str) {
        OutputContext::success(self, message);
    }

    fn warn(&self, message: &str) {
        OutputContext::warn(self, message);
    }

    fn error(&self, message: &str) {
        OutputContext::error(self, message);
    }
}
