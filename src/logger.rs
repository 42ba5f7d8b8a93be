//! Console logging with tag categories and debug gating
//!
//! Provides a small structured logging API:
//! - Standard levels (ERROR/WARNING/INFO/DEBUG)
//! - Per-module debug control via --debug-<module> flags
//! - Colored console output with timestamps

use crate::arguments::is_debug_enabled_for;
use chrono::Local;
use colored::*;
use std::io::{ stdout, ErrorKind, Write };

/// Log format width for tag alignment
const TAG_WIDTH: usize = 10;

/// Module tags for log categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Config,
    Node,
    Pool,
    Rebalance,
    Tx,
    Telegram,
}

impl LogTag {
    /// Key used for --debug-<module> flag matching
    pub fn debug_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Node => "node",
            LogTag::Pool => "pool",
            LogTag::Rebalance => "rebalance",
            LogTag::Tx => "tx",
            LogTag::Telegram => "telegram",
        }
    }

    fn colored(&self) -> ColoredString {
        let padded = |s: &str| format!("{:<width$}", s, width = TAG_WIDTH);
        match self {
            LogTag::System => padded("SYSTEM").bright_yellow().bold(),
            LogTag::Config => padded("CONFIG").bright_white().bold(),
            LogTag::Node => padded("NODE").bright_cyan().bold(),
            LogTag::Pool => padded("POOL").bright_blue().bold(),
            LogTag::Rebalance => padded("REBALANCE").bright_green().bold(),
            LogTag::Tx => padded("TX").bright_magenta().bold(),
            LogTag::Telegram => padded("TELEGRAM").bright_purple().bold(),
        }
    }
}

/// Log a message with an explicit level string
pub fn log(tag: LogTag, level: &str, message: &str) {
    if level.eq_ignore_ascii_case("DEBUG") && !is_debug_enabled_for(tag.debug_key()) {
        return;
    }

    let time = Local::now().format("%H:%M:%S").to_string();
    let level_str = match level.to_uppercase().as_str() {
        "ERROR" => level.to_uppercase().bright_red().bold(),
        "WARNING" => level.to_uppercase().bright_yellow().bold(),
        "DEBUG" => level.to_uppercase().dimmed(),
        _ => level.to_uppercase().white().bold(),
    };

    let line = format!(
        "{} [{}] [{:<7}] {}",
        time.dimmed(),
        tag.colored(),
        level_str,
        message
    );
    print_stdout_safe(&line);
}

pub fn info(tag: LogTag, message: &str) {
    log(tag, "INFO", message);
}

pub fn warn(tag: LogTag, message: &str) {
    log(tag, "WARNING", message);
}

pub fn error(tag: LogTag, message: &str) {
    log(tag, "ERROR", message);
}

pub fn debug(tag: LogTag, message: &str) {
    log(tag, "DEBUG", message);
}

/// Print to stdout but ignore broken pipe errors
fn print_stdout_safe(message: &str) {
    if let Err(e) = writeln!(stdout(), "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        let _ = writeln!(std::io::stderr(), "Logger stdout error: {}", e);
    }
    if let Err(e) = stdout().flush() {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
