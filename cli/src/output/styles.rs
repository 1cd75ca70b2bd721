//! owo-colors stylesheet for terminal output.

use owo_colors::Style;

/// One place that decides what each message class looks like. Starts
/// out all-default (plain) and only gains color when the terminal
/// supports it.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Warning messages (yellow)
    pub warning: Style,
    /// Error messages (red)
    pub error: Style,
    /// Informational messages (blue)
    pub info: Style,
}

impl Styles {
    /// Switch the stylesheet from plain to colored.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.warning = Style::new().yellow();
        self.error = Style::new().red();
        self.info = Style::new().blue();
    }
}
