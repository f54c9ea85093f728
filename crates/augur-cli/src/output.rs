//! Output formatting and logging utilities
//!
//! Results go to stdout; everything addressed to the user (progress, warnings,
//! errors, hints) goes to stderr so output can be piped.

use owo_colors::OwoColorize;
use std::env;
use tracing_subscriber::{EnvFilter, fmt};

/// Output level for controlling what gets displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLevel {
    /// Show all output (normal mode)
    Normal,
    /// Show only errors (quiet mode)
    Quiet,
    /// Show extra debug information (verbose mode)
    Verbose,
}

impl OutputLevel {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if user-facing messages should be shown (excludes errors/hints which always show)
    pub fn show_user(&self) -> bool {
        matches!(self, Self::Normal | Self::Verbose)
    }

    /// Default log filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
        }
    }
}

/// Install the stderr log subscriber; library `log` records are captured too
pub fn init_logging(output_level: OutputLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(output_level.log_filter()));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(!colors_disabled())
        .try_init();
}

/// Check if colored output should be disabled
fn colors_disabled() -> bool {
    env::var("NO_COLOR").is_ok()
        || env::var("TERM").is_ok_and(|t| t == "dumb")
        || !atty::is(atty::Stream::Stderr)
}

/// Label used to prefix warnings, errors and hints
#[derive(Debug, Clone, Copy)]
enum Label {
    Warning,
    Error,
    Hint,
}

impl Label {
    fn text(self) -> &'static str {
        match self {
            Self::Warning => "Warning:",
            Self::Error => "Error:",
            Self::Hint => "Hint:",
        }
    }

    fn paint(self, text: &str) -> String {
        match self {
            Self::Warning => text.yellow().to_string(),
            Self::Error => text.red().to_string(),
            Self::Hint => text.blue().to_string(),
        }
    }
}

fn labelled(label: Label, msg: &str) -> String {
    if colors_disabled() {
        format!("{} {msg}", label.text())
    } else {
        format!("{} {}", label.paint(label.text()).bold(), label.paint(msg))
    }
}

/// Print a heading with bold formatting
pub fn heading(msg: &str, output_level: OutputLevel) {
    if !output_level.show_user() {
        return;
    }
    if colors_disabled() {
        eprintln!("{msg}");
    } else {
        eprintln!("{}", msg.bold());
    }
}

/// Print a note message with default formatting (no prefix)
pub fn note(msg: &str, output_level: OutputLevel) {
    if output_level.show_user() {
        eprintln!("{msg}");
    }
}

pub fn success(msg: &str, output_level: OutputLevel) {
    if !output_level.show_user() {
        return;
    }
    if colors_disabled() {
        eprintln!("{msg}");
    } else {
        eprintln!("{}", msg.green());
    }
}

pub fn warning(msg: &str, output_level: OutputLevel) {
    if output_level.show_user() {
        eprintln!("{}", labelled(Label::Warning, msg));
    }
}

/// Errors are shown even in quiet mode
pub fn error(msg: &str) {
    eprintln!("{}", labelled(Label::Error, msg));
}

/// Hints are shown even in quiet mode
pub fn hint(msg: &str) {
    eprintln!("{}", labelled(Label::Hint, msg));
}

pub fn error_with_suggestion(msg: &str, suggestion: &str) {
    error(msg);
    hint(suggestion);
}

/// Format a model name with colors
pub fn format_model(model: &str) -> String {
    if colors_disabled() {
        model.to_string()
    } else {
        model.cyan().to_string()
    }
}

/// Format a command or option with colors
pub fn format_command(cmd: &str) -> String {
    if colors_disabled() {
        format!("`{cmd}`")
    } else {
        format!("`{}`", cmd.yellow().bold())
    }
}
