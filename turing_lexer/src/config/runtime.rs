// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

use super::compile_time;
use crate::scheduler::FailurePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerPreferences {
    /// Whether to resolve line/column positions for diagnostics
    pub track_line_columns: bool,

    /// Whether to log a debug event per scan rule summary
    pub log_scan_summary: bool,
}

impl Default for ScannerPreferences {
    fn default() -> Self {
        Self {
            track_line_columns: env::var("TURING_SCANNER_TRACK_LINE_COLUMNS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_scan_summary: env::var("TURING_SCANNER_LOG_SUMMARY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierPreferences {
    /// Replay every valid fast-path token through the DFA and record disagreements
    pub cross_check_fast_path: bool,

    /// Whether to emit a log event for each invalid token
    pub log_invalid_tokens: bool,
}

impl Default for ClassifierPreferences {
    fn default() -> Self {
        Self {
            cross_check_fast_path: env::var("TURING_CLASSIFIER_CROSS_CHECK")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_invalid_tokens: env::var("TURING_CLASSIFIER_LOG_INVALID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerPreferences {
    /// Requested worker count; `None` selects the hardware default
    pub worker_count: Option<usize>,

    /// What to do when a worker faults
    pub failure_policy: FailurePolicy,

    /// Minimum lexemes per chunk (the chunking floor)
    pub min_chunk_size: usize,

    /// Lexeme count below which the run stays on a single worker
    pub parallel_threshold: usize,
}

impl Default for SchedulerPreferences {
    fn default() -> Self {
        Self {
            worker_count: env::var("TURING_SCHEDULER_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0),
            failure_policy: env::var("TURING_SCHEDULER_FAILURE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            min_chunk_size: env::var("TURING_SCHEDULER_MIN_CHUNK")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(compile_time::scheduler::MIN_CHUNK_SIZE),
            parallel_threshold: env::var("TURING_SCHEDULER_PARALLEL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(compile_time::scheduler::PARALLEL_THRESHOLD),
        }
    }
}

impl SchedulerPreferences {
    /// Worker count clamped to the compile-time ceiling
    pub fn clamped_worker_count(&self) -> Option<usize> {
        self.worker_count
            .map(|n| n.clamp(1, compile_time::scheduler::MAX_WORKER_THREADS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level (within the compile-time ceiling)
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to include run/chunk context in log messages
    pub include_run_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("TURING_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("TURING_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("TURING_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("TURING_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_run_context: env::var("TURING_LOGGING_INCLUDE_RUN_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }

    /// Map the numeric ceiling from the compile-time config
    pub fn from_ceiling(level: u8) -> Self {
        match level {
            0 => LogLevel::Error,
            1 => LogLevel::Warning,
            2 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub scanner: ScannerPreferences,
    pub classifier: ClassifierPreferences,
    pub scheduler: SchedulerPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Scanner
    pub const SCANNER_TRACK_LINE_COLUMNS: &str = "TURING_SCANNER_TRACK_LINE_COLUMNS";
    pub const SCANNER_LOG_SUMMARY: &str = "TURING_SCANNER_LOG_SUMMARY";

    // Classifier
    pub const CLASSIFIER_CROSS_CHECK: &str = "TURING_CLASSIFIER_CROSS_CHECK";
    pub const CLASSIFIER_LOG_INVALID: &str = "TURING_CLASSIFIER_LOG_INVALID";

    // Scheduler
    pub const SCHEDULER_WORKERS: &str = "TURING_SCHEDULER_WORKERS";
    pub const SCHEDULER_FAILURE_POLICY: &str = "TURING_SCHEDULER_FAILURE_POLICY";
    pub const SCHEDULER_MIN_CHUNK: &str = "TURING_SCHEDULER_MIN_CHUNK";
    pub const SCHEDULER_PARALLEL_THRESHOLD: &str = "TURING_SCHEDULER_PARALLEL_THRESHOLD";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "TURING_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "TURING_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "TURING_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "TURING_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_INCLUDE_RUN_CONTEXT: &str = "TURING_LOGGING_INCLUDE_RUN_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_ceiling_mapping() {
        assert_eq!(LogLevel::from_ceiling(0), LogLevel::Error);
        assert_eq!(LogLevel::from_ceiling(9), LogLevel::Debug);
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let prefs = SchedulerPreferences {
            worker_count: Some(100_000),
            failure_policy: FailurePolicy::AbortRun,
            min_chunk_size: 100,
            parallel_threshold: 0,
        };
        assert_eq!(
            prefs.clamped_worker_count(),
            Some(compile_time::scheduler::MAX_WORKER_THREADS)
        );
    }

    #[test]
    fn test_env_var_names_are_prefixed() {
        assert!(env_vars::SCHEDULER_WORKERS.starts_with("TURING_"));
        assert!(env_vars::CLASSIFIER_CROSS_CHECK.starts_with("TURING_"));
    }
}
