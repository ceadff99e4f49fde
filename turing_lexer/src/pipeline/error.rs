use crate::logging::codes::{self, Code};
use crate::profile::ProfileError;
use crate::scanner::ScanError;
use crate::scheduler::SchedulerError;
use crate::tokens::StreamViolation;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Classification run failed: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Token stream check failed: {0}")]
    Stream(#[from] StreamViolation),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            PipelineError::Profile(e) => e.error_code(),
            PipelineError::Scan(e) => e.error_code(),
            PipelineError::Scheduler(e) => e.error_code(),
            PipelineError::Stream(_) | PipelineError::Pipeline { .. } => {
                codes::system::INTERNAL_ERROR
            }
        }
    }
}
