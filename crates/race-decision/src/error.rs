use thiserror::Error;

/// Failures turning oracle output into a [`Decision`][crate::Decision], plus
/// scheduler setup errors.
///
/// Reply errors never leave the scheduler: it logs them and substitutes
/// [`Decision::fallback`][crate::Decision::fallback].
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("reply contains no JSON object")]
    NoJson,

    #[error("malformed reply: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unknown action {0:?}")]
    UnknownAction(String),

    #[error("situation could not be serialized: {0}")]
    Situation(String),

    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("oracle worker pool failed to start: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

pub type DecisionResult<T> = Result<T, DecisionError>;

/// What an [`Oracle`][crate::Oracle] may report instead of a reply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle transport error: {0}")]
    Transport(String),

    #[error("oracle timed out")]
    Timeout,

    #[error("oracle unavailable")]
    Unavailable,
}

pub type OracleResult<T> = Result<T, OracleError>;
