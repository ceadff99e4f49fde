use serde::Serialize;

use crate::config::{build_info, compile_time};
use crate::profile::builtin;
use crate::scheduler::default_worker_count;

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub id: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub reserved_words: usize,
    pub operators: usize,
}

/// System report: hardware, limits and available profiles
#[derive(Debug, Clone, Serialize)]
pub struct PipelineInfo {
    pub detected_cores: usize,
    pub default_workers: usize,
    pub max_worker_threads: usize,
    pub min_chunk_size: usize,
    pub parallel_threshold: usize,
    pub max_source_bytes: usize,
    pub max_lexeme_count: usize,
    pub build_profile: String,
    pub config_source: String,
    pub profiles: Vec<ProfileSummary>,
    pub global_logging_enabled: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        let mut report = format!(
            "Tokenization Pipeline:\n\
             - Detected Cores: {}\n\
             - Default Workers: {}\n\
             - Max Worker Threads: {}\n\
             - Min Chunk Size: {} lexemes\n\
             - Parallel Threshold: {} lexemes\n\
             - Max Source Size: {} MB\n\
             - Max Lexemes: {}\n\
             - Build Profile: {}\n\
             - Config Source: {}\n\
             - Global Logging: {}\n\
             - Profiles:",
            self.detected_cores,
            self.default_workers,
            self.max_worker_threads,
            self.min_chunk_size,
            self.parallel_threshold,
            self.max_source_bytes / (1024 * 1024),
            self.max_lexeme_count,
            self.build_profile,
            self.config_source,
            self.global_logging_enabled
        );
        for profile in &self.profiles {
            report.push_str(&format!(
                "\n    {} ({}): {} reserved words, {} operators",
                profile.id,
                profile.aliases.join(", "),
                profile.reserved_words,
                profile.operators
            ));
        }
        report
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-profile tokenizer, {} default workers on {} cores ({} build)",
            self.profiles.len(),
            self.default_workers,
            self.detected_cores,
            self.build_profile
        )
    }
}

/// Get pipeline capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    let profiles = builtin::all()
        .map(|profiles| {
            profiles
                .iter()
                .map(|p| ProfileSummary {
                    id: p.id().to_string(),
                    aliases: p.aliases().to_vec(),
                    description: p.description().to_string(),
                    reserved_words: p.reserved_word_count(),
                    operators: p.operator_count(),
                })
                .collect()
        })
        .unwrap_or_default();

    PipelineInfo {
        detected_cores: std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        default_workers: default_worker_count(),
        max_worker_threads: compile_time::scheduler::MAX_WORKER_THREADS,
        min_chunk_size: compile_time::scheduler::MIN_CHUNK_SIZE,
        parallel_threshold: compile_time::scheduler::PARALLEL_THRESHOLD,
        max_source_bytes: compile_time::scanner::MAX_SOURCE_BYTES,
        max_lexeme_count: compile_time::scanner::MAX_LEXEME_COUNT,
        build_profile: build_info::profile().to_string(),
        config_source: build_info::source_info(),
        profiles,
        global_logging_enabled: crate::logging::is_initialized(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lists_builtin_profiles() {
        let info = get_pipeline_info();
        let ids: Vec<&str> = info.profiles.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["imperative", "symbolic", "query"]);
        assert!(info.default_workers >= 2);
        assert!(info.report().contains("query (sql)"));
    }
}
