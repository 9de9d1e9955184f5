//! Status line shown below the preview.

use crate::exposure::ExposureCoordinator;

/// Status line with the current exposure state.
///
/// Shows: ISO | exposure time | gain | mode | E | captures
#[derive(Debug, Clone)]
pub struct StatusBar {
    pub visible: bool,
    /// Last capture result, shown at the end of the line
    pub message: Option<String>,
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            visible: true,
            message: None,
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Format: " ISO 850 | 250.50ms | gain 1.25 | manual | E: 212.93 | shots 0 "
    pub fn format(&self, exposure: &ExposureCoordinator) -> String {
        let settings = exposure.state().settings;
        let mut line = format!(
            " ISO {} | {} | gain {:.2} | {} | {} | shots {} ",
            settings.iso,
            exposure.exposure_time_label(),
            exposure.gain(),
            exposure.mode_label(),
            exposure.display(),
            exposure.captures(),
        );
        if let Some(message) = &self.message {
            line.push_str("| ");
            line.push_str(message);
            line.push(' ');
        }
        line
    }

    /// ANSI output placing the status line on terminal row `row` (0-based),
    /// truncated to `cols` characters.
    pub fn to_ansi(&self, exposure: &ExposureCoordinator, row: u16, cols: u16) -> String {
        if !self.visible {
            return String::new();
        }
        let text: String = self.format(exposure).chars().take(cols as usize).collect();
        format!("\x1b[{};1H\x1b[0m\x1b[7m{}\x1b[0m\x1b[K", row + 1, text)
    }
}
