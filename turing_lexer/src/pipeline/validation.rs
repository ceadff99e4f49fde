use crate::logging::codes;
use crate::profile::builtin;
use crate::scheduler::FailurePolicy;
use crate::tokens::LexicalIssue;

use super::{process_source_with_config, PipelineConfig};

/// Smoke sample per built-in profile; each must come back lossless
const SAMPLES: [(&str, &str); 3] = [
    (builtin::IMPERATIVE, "def f(x):\n    return x ** 2  # sq\n"),
    (builtin::SYMBOLIC, "(define (f x) (* x 3/4)) ; q\n"),
    (builtin::QUERY, "SELECT a FROM t WHERE b >= @min -- c\n"),
];

/// Validate that the pipeline is properly configured
pub fn validate_pipeline() -> Result<(), String> {
    crate::log_debug!("Validating tokenization pipeline configuration");

    if !crate::logging::is_initialized() {
        return Err("Global logging is not initialized".to_string());
    }

    // Every code the tokenizer can emit must be registered
    let emitted = [
        LexicalIssue::InvalidCharacter.code(),
        LexicalIssue::UnterminatedLiteral.code(),
        LexicalIssue::UnclassifiableLexeme.code(),
        LexicalIssue::DegradedChunk.code(),
        codes::lexical::PATH_DISAGREEMENT,
        codes::scheduler::WORKER_FAILURE,
        codes::success::PIPELINE_COMPLETE,
    ];
    for code in codes::all_codes().iter().chain(emitted.iter()) {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Code {} has no registered metadata", code));
        }
    }

    let profiles = builtin::all().map_err(|e| format!("Built-in profile invalid: {}", e))?;

    let config = PipelineConfig::default()
        .with_workers(1)
        .with_policy(FailurePolicy::AbortRun);
    for (name, sample) in SAMPLES {
        let profile = builtin::by_name(name).map_err(|e| e.to_string())?;
        let result = process_source_with_config(sample, profile, &config)
            .map_err(|e| format!("Smoke run for '{}' failed: {}", name, e))?;
        if result.metrics.invalid > 0 {
            return Err(format!(
                "Smoke run for '{}' produced {} invalid tokens",
                name, result.metrics.invalid
            ));
        }
    }

    crate::log_success!(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Pipeline validation succeeded",
        "profiles_validated" => profiles.len(),
        "codes_registered" => codes::all_codes().len()
    );

    Ok(())
}
