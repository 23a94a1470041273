use race_core::CarId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EffectsError {
    #[error("{0} is not tracked by this subsystem")]
    UnknownCar(CarId),

    #[error("effects configuration error: {0}")]
    Config(String),
}

pub type EffectsResult<T> = Result<T, EffectsError>;
