//! Global logging for the tokenizer
//!
//! A single `LoggingService` is installed once per process. Events pick up
//! the calling thread's run context (source label, worker, chunk) so output
//! from concurrent workers can be told apart.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// What the current thread is working on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub label: String,
    pub worker_id: Option<usize>,
    pub chunk_id: Option<usize>,
}

impl RunContext {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            worker_id: None,
            chunk_id: None,
        }
    }

    pub fn for_chunk(label: &str, worker_id: usize, chunk_id: usize) -> Self {
        Self {
            label: label.to_string(),
            worker_id: Some(worker_id),
            chunk_id: Some(chunk_id),
        }
    }

    fn attach(&self, mut event: LogEvent) -> LogEvent {
        event = event.with_context("run", &self.label);
        if let Some(worker) = self.worker_id {
            event = event.with_context("worker", &worker.to_string());
        }
        if let Some(chunk) = self.chunk_id {
            event = event.with_context("chunk", &chunk.to_string());
        }
        event
    }
}

thread_local! {
    static RUN_CONTEXT: RefCell<Option<RunContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    if let Some(missing) = codes::all_codes()
        .iter()
        .find(|code| codes::get_error_metadata(code.as_str()).is_none())
    {
        return Err(format!("Missing metadata for code: {}", missing));
    }

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Install a caller-built service, e.g. one backed by a `MemoryLogger`
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// True when a logger is installed and debug events would pass its filter
pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

// ============================================================================
// RUN CONTEXT MANAGEMENT
// ============================================================================

pub fn set_run_context(context: RunContext) {
    RUN_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_run_context() {
    RUN_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

pub fn get_current_run_context() -> Option<RunContext> {
    RUN_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Run `f` with `context` installed, restoring whatever was there before
pub fn with_run_context<F, R>(context: RunContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous = RUN_CONTEXT.with(|ctx| ctx.borrow_mut().replace(context));
    let result = f();
    RUN_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

fn dispatch(mut event: LogEvent, span: Option<crate::utils::Span>, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    if !logger.should_log(event.level) {
        return;
    }

    event.message = config::truncate_message(&event.message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if config::include_run_context() {
        if let Some(run) = get_current_run_context() {
            event = run.attach(event);
        }
    }

    logger.log_event(event);
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(LogEvent::error(code, message), span, context);
}

pub fn log_warning_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    dispatch(LogEvent::warning_with_code(code, message), span, context);
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::success(code, message), None, context);
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::info(message), None, context);
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    dispatch(LogEvent::debug(message), None, context);
}

// ============================================================================
// DIAGNOSTICS AND FALLBACKS
// ============================================================================

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    if let Some(logger) = try_get_global_logger() {
        diagnostics.push_str(&format!("Service level: {}\n", logger.min_level().as_str()));
    }
    diagnostics.push_str(&format!("Registered codes: {}\n", codes::all_codes().len()));
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

/// Error logging that still reaches stderr when no logger is installed
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}
