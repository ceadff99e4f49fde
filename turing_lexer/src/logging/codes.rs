//! Event codes and their classification metadata
//!
//! Every code the tokenizer emits is declared here together with its
//! severity, recoverability and recommended action.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by error, warning and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Profile construction and loading
pub mod profile {
    use super::Code;

    pub const INVALID_PROFILE: Code = Code::new("E010");
    pub const PROFILE_PARSE_FAILURE: Code = Code::new("E011");
    pub const UNKNOWN_PROFILE: Code = Code::new("E012");
    pub const UNREACHABLE_OPERATOR: Code = Code::new("W010");
}

/// Scanning and classification
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_LITERAL: Code = Code::new("E021");
    pub const UNCLASSIFIABLE_LEXEME: Code = Code::new("E022");
    pub const SOURCE_TOO_LARGE: Code = Code::new("E023");
    pub const LEXEME_LIMIT_EXCEEDED: Code = Code::new("E024");
    pub const PATH_DISAGREEMENT: Code = Code::new("W020");
}

/// Chunk scheduling, workers and reassembly
pub mod scheduler {
    use super::Code;

    pub const WORKER_FAILURE: Code = Code::new("E040");
    pub const CHUNK_MISSING: Code = Code::new("E041");
    pub const INVALID_WORKER_COUNT: Code = Code::new("E042");
    pub const CHANNEL_CLOSED: Code = Code::new("E043");
    pub const CHUNK_DEGRADED: Code = Code::new("W040");
}

pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const PROFILE_LOADED: Code = Code::new("I010");
    pub const SCAN_COMPLETE: Code = Code::new("I020");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I021");
    pub const CHUNK_COMPLETE: Code = Code::new("I030");
    pub const REASSEMBLY_COMPLETE: Code = Code::new("I031");
    pub const PIPELINE_COMPLETE: Code = Code::new("I040");
    pub const BENCHMARK_COMPLETE: Code = Code::new("I041");
}

/// Every code declared above, used for registry coverage checks
pub fn all_codes() -> &'static [Code] {
    &[
        system::INTERNAL_ERROR,
        system::INITIALIZATION_FAILURE,
        profile::INVALID_PROFILE,
        profile::PROFILE_PARSE_FAILURE,
        profile::UNKNOWN_PROFILE,
        profile::UNREACHABLE_OPERATOR,
        lexical::INVALID_CHARACTER,
        lexical::UNTERMINATED_LITERAL,
        lexical::UNCLASSIFIABLE_LEXEME,
        lexical::SOURCE_TOO_LARGE,
        lexical::LEXEME_LIMIT_EXCEEDED,
        lexical::PATH_DISAGREEMENT,
        scheduler::WORKER_FAILURE,
        scheduler::CHUNK_MISSING,
        scheduler::INVALID_WORKER_COUNT,
        scheduler::CHANNEL_CLOSED,
        scheduler::CHUNK_DEGRADED,
        success::SYSTEM_INITIALIZATION_COMPLETED,
        success::PROFILE_LOADED,
        success::SCAN_COMPLETE,
        success::CLASSIFICATION_COMPLETE,
        success::CHUNK_COMPLETE,
        success::REASSEMBLY_COMPLETE,
        success::PIPELINE_COMPLETE,
        success::BENCHMARK_COMPLETE,
    ]
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // System
            ErrorMetadata::new(
                "ERR001",
                "System",
                Severity::Critical,
                false,
                true,
                "Critical internal error",
                "File a bug report with the input that triggered it",
            ),
            ErrorMetadata::new(
                "ERR002",
                "System",
                Severity::Critical,
                false,
                true,
                "Logging or configuration initialization failure",
                "Check TURING_* environment variables and the build profile",
            ),
            // Profile
            ErrorMetadata::new(
                "E010",
                "Profile",
                Severity::High,
                false,
                true,
                "Lexicon profile failed validation",
                "Fix the reported table or marker in the profile definition",
            ),
            ErrorMetadata::new(
                "E011",
                "Profile",
                Severity::High,
                false,
                true,
                "Lexicon profile definition could not be parsed",
                "Check the profile TOML against the documented layout",
            ),
            ErrorMetadata::new(
                "E012",
                "Profile",
                Severity::Medium,
                false,
                true,
                "No built-in profile with the requested name",
                "Use one of: imperative, symbolic, query",
            ),
            ErrorMetadata::new(
                "W010",
                "Profile",
                Severity::Low,
                true,
                false,
                "Operator can never match because its first character is a delimiter",
                "Remove the operator or the delimiter from the profile",
            ),
            // Lexical
            ErrorMetadata::new(
                "E020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Character outside the profile alphabet",
                "Token is emitted as UNKNOWN and flagged invalid",
            ),
            ErrorMetadata::new(
                "E021",
                "Lexical",
                Severity::Low,
                true,
                false,
                "String, comment or quoted list reaches end of input without a closer",
                "Token keeps its best-guess kind and is flagged invalid",
            ),
            ErrorMetadata::new(
                "E022",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Lexeme rejected by the fallback state machine",
                "Token is emitted as UNKNOWN and flagged invalid",
            ),
            ErrorMetadata::new(
                "E023",
                "Lexical",
                Severity::High,
                false,
                true,
                "Source exceeds the configured maximum size",
                "Split the input or raise scanner.max_source_bytes",
            ),
            ErrorMetadata::new(
                "E024",
                "Lexical",
                Severity::High,
                false,
                true,
                "Lexeme count or lexeme size exceeds the configured maximum",
                "Raise scanner.max_lexeme_count",
            ),
            ErrorMetadata::new(
                "W020",
                "Lexical",
                Severity::Low,
                true,
                false,
                "Fast-path classification and fallback state machine disagree",
                "Fast path result kept; review the lexeme against the profile",
            ),
            // Scheduler
            ErrorMetadata::new(
                "E040",
                "Scheduler",
                Severity::Critical,
                false,
                true,
                "Classification worker failed",
                "Run aborted; retry or use the degrade failure policy",
            ),
            ErrorMetadata::new(
                "E041",
                "Scheduler",
                Severity::Critical,
                false,
                true,
                "Chunk result missing at reassembly",
                "Run aborted; file a bug report",
            ),
            ErrorMetadata::new(
                "E042",
                "Scheduler",
                Severity::Medium,
                false,
                true,
                "Requested worker count is not usable",
                "Request between 1 and scheduler.max_worker_threads workers",
            ),
            ErrorMetadata::new(
                "E043",
                "Scheduler",
                Severity::Critical,
                false,
                true,
                "Result channel closed before every chunk reported",
                "Run aborted; check for worker panics in the log",
            ),
            ErrorMetadata::new(
                "W040",
                "Scheduler",
                Severity::Medium,
                true,
                false,
                "Chunk replaced by an invalid placeholder token",
                "Inspect the worker failure logged for this chunk",
            ),
            // Success
            ErrorMetadata::new(
                "I004",
                "Success",
                Severity::Low,
                true,
                false,
                "Logging system initialized",
                "None",
            ),
            ErrorMetadata::new(
                "I010",
                "Success",
                Severity::Low,
                true,
                false,
                "Lexicon profile loaded and validated",
                "None",
            ),
            ErrorMetadata::new(
                "I020",
                "Success",
                Severity::Low,
                true,
                false,
                "Scanning completed",
                "None",
            ),
            ErrorMetadata::new(
                "I021",
                "Success",
                Severity::Low,
                true,
                false,
                "Classification completed",
                "None",
            ),
            ErrorMetadata::new(
                "I030",
                "Success",
                Severity::Low,
                true,
                false,
                "Chunk classified",
                "None",
            ),
            ErrorMetadata::new(
                "I031",
                "Success",
                Severity::Low,
                true,
                false,
                "Chunk results reassembled in order",
                "None",
            ),
            ErrorMetadata::new(
                "I040",
                "Success",
                Severity::Low,
                true,
                false,
                "Tokenization pipeline completed",
                "None",
            ),
            ErrorMetadata::new(
                "I041",
                "Success",
                Severity::Low,
                true,
                false,
                "Worker-count benchmark completed",
                "None",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Human-readable description, "Unknown error" for unregistered codes
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
