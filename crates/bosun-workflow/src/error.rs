//! Step execution errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StepError>;

#[derive(Debug, Error)]
pub enum StepError {
    #[error("failed to decode step payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no handler registered for step type {0}")]
    UnknownStepType(String),

    #[error("invalid wait timeout {raw}: {source}")]
    InvalidTimeout {
        raw: String,
        #[source]
        source: humantime::DurationError,
    },

    #[error(transparent)]
    Dynamic(#[from] bosun_dynamic::DynamicError),

    #[error(transparent)]
    Chart(#[from] bosun_chart::ChartError),

    #[error(transparent)]
    Helm(#[from] bosun_chart::HelmError),

    #[error(transparent)]
    Path(#[from] bosun_common::PathError),
}
