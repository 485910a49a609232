//! Centralized logging configuration for the control panel.
//!
//! Output goes through the `log` facade so the host picks the sink
//! (`env_logger` in the CLI, the browser console in a web build). On top of
//! that, every orchestration message is gated per category so noisy areas such
//! as layout tracking can be silenced without touching the global filter.
//!
//! # Architecture
//!
//! - **LogConfig**: Thread-safe global configuration using atomic operations
//! - **LogLevel**: Hierarchical log levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: Session lifecycle, audio, layout, settings and input
//! - **log()**: Common logging function, message built lazily
//!
//! # Usage
//!
//! ```rust
//! use emu_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Audio, LogLevel::Debug, || {
//!     format!("auto-muted at volume {}", 0.8)
//! });
//! ```

use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }

    fn to_log_level(self) -> Option<log::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(log::Level::Error),
            LogLevel::Warn => Some(log::Level::Warn),
            LogLevel::Info => Some(log::Level::Info),
            LogLevel::Debug => Some(log::Level::Debug),
            LogLevel::Trace => Some(log::Level::Trace),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Parse log level from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Ok(LogLevel::Off),
            "error" | "err" | "1" => Ok(LogLevel::Error),
            "warn" | "warning" | "2" => Ok(LogLevel::Warn),
            "info" | "3" => Ok(LogLevel::Info),
            "debug" | "4" => Ok(LogLevel::Debug),
            "trace" | "5" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

/// Log category for the control panel's collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Running state, quit sequence, background pause, auto save
    Session,
    /// Volume, auto-mute and fast-forward
    Audio,
    /// Panel positions, sizes and captured bounds
    Layout,
    /// Persisted key/value store
    Settings,
    /// Keyboard suspension around sliders
    Input,
}

impl LogCategory {
    const COUNT: usize = 5;

    pub fn all() -> &'static [LogCategory] {
        &[
            LogCategory::Session,
            LogCategory::Audio,
            LogCategory::Layout,
            LogCategory::Settings,
            LogCategory::Input,
        ]
    }

    fn index(self) -> usize {
        match self {
            LogCategory::Session => 0,
            LogCategory::Audio => 1,
            LogCategory::Layout => 2,
            LogCategory::Settings => 3,
            LogCategory::Input => 4,
        }
    }

    /// `log` target the category is emitted under.
    pub fn target(self) -> &'static str {
        match self {
            LogCategory::Session => "emu::session",
            LogCategory::Audio => "emu::audio",
            LogCategory::Layout => "emu::layout",
            LogCategory::Settings => "emu::settings",
            LogCategory::Input => "emu::input",
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    /// Global log level (applies to all categories unless overridden)
    global_level: AtomicU8,
    /// Per-category overrides, indexed by `LogCategory::index`
    category_levels: [AtomicU8; LogCategory::COUNT],
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            category_levels: Default::default(),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.category_levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.category_levels[category.index()].load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    ///
    /// A category with its own level uses it; a category left `Off` falls
    /// back to the global level.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        for category in LogCategory::all() {
            self.set_level(*category, LogLevel::Off);
        }
    }
}

/// Log a message with the specified category and level
///
/// The message closure only runs when the category is enabled for `level`.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    if !LogConfig::global().should_log(category, level) {
        return;
    }
    if let Some(lvl) = level.to_log_level() {
        log::log!(target: category.target(), lvl, "{}", message_fn());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("off".parse::<LogLevel>(), Ok(LogLevel::Off));
        assert_eq!("ERR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("3".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("Debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("trace".parse::<LogLevel>(), Ok(LogLevel::Trace));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_category_levels_start_off() {
        let config = LogConfig::new();
        for category in LogCategory::all() {
            assert_eq!(config.get_level(*category), LogLevel::Off);
        }
        assert_eq!(config.get_global_level(), LogLevel::Off);
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Audio, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Audio, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Audio, LogLevel::Trace));

        // Layout has no specific level, falls back to global
        assert!(config.should_log(LogCategory::Layout, LogLevel::Error));
        assert!(!config.should_log(LogCategory::Layout, LogLevel::Warn));
    }

    #[test]
    fn test_off_is_never_logged() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        assert!(!config.should_log(LogCategory::Session, LogLevel::Off));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Session, LogLevel::Info);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Session), LogLevel::Off);
    }

    #[test]
    fn test_disabled_message_is_not_built() {
        // Nothing in this crate raises the global levels, so Trace stays gated
        let mut built = false;
        log(LogCategory::Input, LogLevel::Trace, || {
            built = true;
            String::from("never")
        });
        assert!(!built);
    }
}
