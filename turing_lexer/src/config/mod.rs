//! Configuration module for the tokenizer
//! Compile-time limits come from the TOML profile read by build.rs;
//! runtime preferences come from `TURING_*` environment variables.

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    ClassifierPreferences, LoggingPreferences, RuntimeConfig, ScannerPreferences,
    SchedulerPreferences,
};

/// Build information and configuration metadata
pub mod build_info {
    use super::compile_time;

    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        compile_time::BUILD_PROFILE
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        compile_time::CONFIG_DIR
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }

    /// Returns the OUT_DIR path used for generation (for debugging)
    pub fn out_dir() -> &'static str {
        env!("OUT_DIR")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_are_consistent() {
        assert!(compile_time::scanner::MAX_LEXEME_COUNT > 0);
        assert!(compile_time::scheduler::MIN_CHUNK_SIZE > 0);
        assert!(compile_time::scheduler::MAX_WORKER_THREADS >= 2);
    }

    #[test]
    fn test_build_info_mentions_profile() {
        assert!(build_info::source_info().contains(build_info::profile()));
    }
}
