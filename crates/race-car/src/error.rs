use thiserror::Error;

/// Construction-time rejections.  Nothing in the per-tick path returns these.
#[derive(Debug, Error)]
pub enum CarError {
    #[error("{field} = {value} is outside the allowed range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min:   f64,
        max:   f64,
    },

    #[error("car name must not be empty")]
    EmptyName,

    #[error("unknown driver style {0:?}")]
    UnknownStyle(String),

    #[error("track error: {0}")]
    Track(String),
}

pub type CarResult<T> = Result<T, CarError>;
