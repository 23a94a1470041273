use race_car::CarError;
use race_core::CoreError;
use race_decision::DecisionError;
use thiserror::Error;

use crate::RaceState;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("race configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match car count {expected}")]
    CarCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("race already ended ({0:?})")]
    Ended(RaceState),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Car(#[from] CarError),

    #[error("decision scheduler error: {0}")]
    Decision(#[from] DecisionError),
}

pub type SimResult<T> = Result<T, SimError>;
