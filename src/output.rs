//! # Output Configuration
//!
//! Controls how much decoration the CLI emits. Terminal capability detection
//! and user preference handling live here so commands can print emoji and
//! colored status lines without re-checking the environment each time.
//!
//! The following conventions are honored:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables decoration when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables decoration
//! - `CLICOLOR_FORCE=1` - Forces decoration even in non-TTY
//! - `TERM=dumb` - Disables decoration for dumb terminals

use std::env;

use indicatif::{ProgressBar, ProgressStyle};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of the `--color` CLI flag: `always` forces
    /// decoration on (overriding `NO_COLOR`), `never` forces it off, and
    /// anything else falls back to environment detection.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_terminal_support(),
        };

        Self { use_color }
    }

    /// Returns the emoji when decoration is enabled, otherwise the plain
    /// text alternative.
    pub fn emoji<'a>(&self, emoji_str: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            emoji_str
        } else {
            plain
        }
    }

    /// Progress bar over `len` items, hidden when decoration is disabled.
    ///
    /// Hidden bars still accept `inc`/`set_message` calls, so callers never
    /// need to branch on the output mode.
    pub fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.use_color {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_style(
            ProgressStyle::with_template("[{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("hard-coded template compiles")
                .progress_chars("=> "),
        );
        bar
    }

    fn detect_terminal_support() -> bool {
        // NO_COLOR disables decoration by mere presence, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with decoration always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with decoration always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}
