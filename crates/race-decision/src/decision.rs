//! Normalized decisions and oracle reply parsing.

use race_core::Tick;
use serde::{Deserialize, Serialize};

use crate::{Action, DecisionError};

/// Confidence attached to every substituted decision.
pub const FALLBACK_CONFIDENCE: f64 = 0.3;
/// Confidence assumed when a reply omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Where a decision came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Rules,
    Oracle,
    /// Substituted after a timeout, error, malformed reply or saturated pool.
    Fallback,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action:      Action,
    /// In `[0, 1]`.
    pub confidence:  f64,
    /// Advisory only; never read for behavior.
    pub reasoning:   String,
    pub use_powerup: bool,
    pub source:      DecisionSource,
    /// Tick the decision took effect.
    pub decided_at:  Tick,
}

impl Decision {
    pub fn new(action: Action, confidence: f64) -> Self {
        Self {
            action,
            confidence:  clamp_confidence(confidence),
            reasoning:   String::new(),
            use_powerup: false,
            source:      DecisionSource::Rules,
            decided_at:  Tick::ZERO,
        }
    }

    /// `{wait, 0.3}`, used whenever a decision source fails.
    pub fn fallback() -> Self {
        Self { source: DecisionSource::Fallback, ..Self::new(Action::Wait, FALLBACK_CONFIDENCE) }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }

    pub fn with_powerup(mut self, use_powerup: bool) -> Self {
        self.use_powerup = use_powerup;
        self
    }

    pub fn from_source(mut self, source: DecisionSource) -> Self {
        self.source = source;
        self
    }

    pub fn at(mut self, tick: Tick) -> Self {
        self.decided_at = tick;
        self
    }

    #[inline]
    pub fn is_fallback(&self) -> bool {
        self.source == DecisionSource::Fallback
    }

    /// Ticks since this decision took effect.
    #[inline]
    pub fn age(&self, now: Tick) -> u64 {
        now.since(self.decided_at)
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::fallback()
    }
}

fn clamp_confidence(c: f64) -> f64 {
    if c.is_nan() { DEFAULT_CONFIDENCE } else { c.clamp(0.0, 1.0) }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// The reply fields we read.  Anything else in the object is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OracleReply {
    action:      Option<String>,
    confidence:  Option<f64>,
    reasoning:   Option<String>,
    use_powerup: Option<bool>,
}

/// Parse an oracle reply.
///
/// The JSON object between the first `{` and the last `}` is read, so prose
/// or code fences around it are tolerated.  Missing or unknown actions become
/// `wait`; confidence defaults to 0.5 and is clamped to `[0, 1]`.
///
/// # Errors
///
/// [`DecisionError::NoJson`] if there is no `{ … }` span, and
/// [`DecisionError::Malformed`] if that span is not a JSON object of the
/// expected shape.
pub fn parse_decision(raw: &str) -> Result<Decision, DecisionError> {
    let start = raw.find('{').ok_or(DecisionError::NoJson)?;
    let end = raw.rfind('}').filter(|&end| end > start).ok_or(DecisionError::NoJson)?;
    let reply: OracleReply = serde_json::from_str(&raw[start..=end])?;

    let action = reply.action.as_deref().and_then(Action::from_tag).unwrap_or_default();
    Ok(Decision::new(action, reply.confidence.unwrap_or(DEFAULT_CONFIDENCE))
        .with_reasoning(reply.reasoning.unwrap_or_default())
        .with_powerup(reply.use_powerup.unwrap_or(false))
        .from_source(DecisionSource::Oracle))
}
