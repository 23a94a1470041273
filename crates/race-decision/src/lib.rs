//! `race-decision`: where cars' tactical decisions come from.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`action`]    | `Action`: closed action set with speed factors and costs       |
//! | [`decision`]  | `Decision`, `parse_decision` for oracle replies                 |
//! | [`situation`] | `RaceSituation` snapshot (the oracle payload), `RacePhase`      |
//! | [`provider`]  | `RuleEngine` and `Oracle` traits, `DecisionProvider`            |
//! | [`rules`]     | `TacticalRules`: the built-in rule table                       |
//! | [`pool`]      | `WorkerPool`: rayon pool with one-shot flume handoff           |
//! | [`scheduler`] | `DecisionScheduler`, `SchedulerConfig`, `DecisionTable`         |
//! | [`error`]     | `DecisionError`, `OracleError` and their result aliases         |
//!
//! # Design notes
//!
//! The race loop calls [`DecisionScheduler::poll`] once per tick.  Rule
//! engines answer inline.  Oracle calls go to the worker pool and come back
//! through a per-request channel that the scheduler checks with `try_recv`,
//! so a slow or dead oracle only ever makes a car's decision older, never
//! the tick later.  Every failure on that path ends in
//! [`Decision::fallback`].

pub mod action;
pub mod decision;
pub mod error;
pub mod pool;
pub mod provider;
pub mod rules;
pub mod scheduler;
pub mod situation;


pub use action::Action;
pub use decision::{parse_decision, Decision, DecisionSource, FALLBACK_CONFIDENCE};
pub use error::{DecisionError, DecisionResult, OracleError, OracleResult};
pub use pool::WorkerPool;
pub use provider::{DecisionProvider, OfflineOracle, Oracle, RuleEngine};
pub use rules::TacticalRules;
pub use scheduler::{DecisionScheduler, DecisionTable, PendingRequest, SchedulerConfig, SchedulerStats};
pub use situation::{OracleRequest, RacePhase, RaceSituation};
