//! Logging macros taking a `Code` plus `key => value` context pairs
//!
//! Context values only need `Display`; they are stringified before the
//! event is built. Every macro is a no-op until global logging is initialized.

/// Shared context builder for the macros below
#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),*];
        context_strings
    }};
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_error_with_context($code, $message, None, context_refs)
    }};

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_error_with_context($code, $message, Some($span), context_refs)
    }};
}

#[macro_export]
macro_rules! log_warning {
    ($code:expr, $message:expr) => {
        $crate::logging::log_warning_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_warning_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_warning_with_context($code, $message, None, context_refs)
    }};

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_warning_with_context($code, $message, Some($span), context_refs)
    }};
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_success_with_context($code, $message, context_refs)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {{
        let context_strings = $crate::__log_context!($($key => $value),+);
        let context_refs: Vec<(&str, &str)> = context_strings.iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $crate::logging::log_info_with_context($message, context_refs)
    }};
}

/// Debug events skip context formatting entirely below debug level
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            let context_strings = $crate::__log_context!($($key => $value),+);
            let context_refs: Vec<(&str, &str)> = context_strings.iter()
                .map(|(k, v)| (*k, v.as_str()))
                .collect();
            $crate::logging::log_debug_with_context($message, context_refs)
        }
    };
}

/// Success event with a `duration_ms` entry, gated by the performance preference
#[macro_export]
macro_rules! log_performance {
    ($code:expr, $message:expr, duration = $duration:expr) => {
        if $crate::logging::config::log_performance_events() {
            $crate::log_success!($code, $message,
                "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0)
            );
        }
    };

    ($code:expr, $message:expr, duration = $duration:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::config::log_performance_events() {
            $crate::log_success!($code, $message,
                "duration_ms" => format!("{:.3}", $duration.as_secs_f64() * 1000.0),
                $($key => $value),+
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::logging::codes;

    // Macros must expand and run without an initialized logger
    #[test]
    fn test_macros_are_noops_without_logger() {
        let duration = std::time::Duration::from_millis(12);

        log_error!(codes::scheduler::WORKER_FAILURE, "worker failed",
            "worker" => 3,
            "chunk" => 7
        );
        log_warning!(codes::lexical::PATH_DISAGREEMENT, "paths disagree", "text" => "===");
        log_success!(codes::success::SCAN_COMPLETE, "scanned", "lexemes" => 42);
        log_info!("planning", "chunks" => 8);
        log_debug!("debug detail", "ratio" => 0.5);
        log_performance!(codes::success::PIPELINE_COMPLETE, "done",
            duration = duration,
            "tokens" => 157
        );
    }
}
