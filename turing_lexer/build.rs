// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    scanner: ScannerLimits,
    classifier: ClassifierLimits,
    scheduler: SchedulerLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct ScannerLimits {
    max_source_bytes: usize,
    max_lexeme_count: usize,
}

#[derive(serde::Deserialize)]
struct ClassifierLimits {
    max_disagreement_samples: usize,
    max_invalid_samples: usize,
}

#[derive(serde::Deserialize)]
struct SchedulerLimits {
    min_chunk_size: usize,
    max_worker_threads: usize,
    parallel_threshold: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    min_enforced_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=TURING_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=TURING_CONFIG_DIR");

    let profile = env::var("TURING_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("TURING_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the turing_lexer directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile, &config_dir);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_SOURCE_BYTES: usize = 1_073_741_824;
    const ABSOLUTE_MAX_WORKERS: usize = 1024;

    if config.scanner.max_source_bytes == 0 || config.scanner.max_source_bytes > ABSOLUTE_MAX_SOURCE_BYTES {
        panic!("LIMITS: scanner.max_source_bytes must be in 1..={}", ABSOLUTE_MAX_SOURCE_BYTES);
    }

    if config.scanner.max_lexeme_count == 0 {
        panic!("LIMITS: scanner.max_lexeme_count must be positive");
    }

    if config.scheduler.min_chunk_size == 0 {
        panic!("LIMITS: scheduler.min_chunk_size must be positive");
    }

    if config.scheduler.max_worker_threads < 2 || config.scheduler.max_worker_threads > ABSOLUTE_MAX_WORKERS {
        panic!(
            "LIMITS: scheduler.max_worker_threads must be in 2..={}",
            ABSOLUTE_MAX_WORKERS
        );
    }

    if config.logging.min_enforced_log_level > 3 {
        panic!("LIMITS: logging.min_enforced_log_level out of range (0=error .. 3=debug)");
    }

    if profile == "production" {
        if config.scanner.max_source_bytes > 100_000_000 {
            panic!("PRODUCTION: scanner.max_source_bytes too high for production");
        }
        if config.logging.min_enforced_log_level > 2 {
            panic!("PRODUCTION: debug logging cannot be enforced in production");
        }
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str, config_dir: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub const BUILD_PROFILE: &str = "{}";
    pub const CONFIG_DIR: &str = "{}";

    pub mod scanner {{
        pub const MAX_SOURCE_BYTES: usize = {};
        pub const MAX_LEXEME_COUNT: usize = {};
    }}

    pub mod classifier {{
        pub const MAX_DISAGREEMENT_SAMPLES: usize = {};
        pub const MAX_INVALID_SAMPLES: usize = {};
    }}

    pub mod scheduler {{
        pub const MIN_CHUNK_SIZE: usize = {};
        pub const MAX_WORKER_THREADS: usize = {};
        pub const PARALLEL_THRESHOLD: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MIN_ENFORCED_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        profile,
        config_dir,
        config.scanner.max_source_bytes,
        config.scanner.max_lexeme_count,
        config.classifier.max_disagreement_samples,
        config.classifier.max_invalid_samples,
        config.scheduler.min_chunk_size,
        config.scheduler.max_worker_threads,
        config.scheduler.parallel_threshold,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.min_enforced_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
