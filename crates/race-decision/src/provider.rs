//! Decision sources: synchronous rule engines and slow external oracles.

use std::sync::Arc;

use crate::{Decision, OracleError, OracleRequest, OracleResult, RaceSituation};

/// A synchronous decision source: a pure function of the situation.
///
/// Called on the race loop thread when a car's decision expires.
pub trait RuleEngine: Send + Sync + 'static {
    fn decide(&self, situation: &RaceSituation) -> Decision;
}

/// A slow external decision source.
///
/// `consult` runs on a worker thread and may block for as long as it likes;
/// the scheduler never waits on it.  The returned text is parsed with
/// [`parse_decision`][crate::parse_decision].
///
/// # Thread safety
///
/// Several requests for different cars may be in flight at once, so
/// implementations must be `Send + Sync`.
pub trait Oracle: Send + Sync + 'static {
    fn consult(&self, request: &OracleRequest) -> OracleResult<String>;
}

/// An [`Oracle`] that is never reachable.  Every car using it runs on the
/// fallback decision.
pub struct OfflineOracle;

impl Oracle for OfflineOracle {
    fn consult(&self, _request: &OracleRequest) -> OracleResult<String> {
        Err(OracleError::Unavailable)
    }
}

/// Which source drives a car.
#[derive(Clone)]
pub enum DecisionProvider {
    Rules(Arc<dyn RuleEngine>),
    Oracle(Arc<dyn Oracle>),
}

impl DecisionProvider {
    pub fn rules(engine: impl RuleEngine) -> Self {
        DecisionProvider::Rules(Arc::new(engine))
    }

    pub fn oracle(oracle: impl Oracle) -> Self {
        DecisionProvider::Oracle(Arc::new(oracle))
    }

    /// True if decisions arrive out of band.
    #[inline]
    pub fn is_async(&self) -> bool {
        matches!(self, DecisionProvider::Oracle(_))
    }
}

impl std::fmt::Debug for DecisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionProvider::Rules(_)  => f.write_str("DecisionProvider::Rules"),
            DecisionProvider::Oracle(_) => f.write_str("DecisionProvider::Oracle"),
        }
    }
}
