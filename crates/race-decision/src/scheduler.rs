//! The decision scheduler: per-car cadence, one outstanding request per car,
//! non-blocking polls and fallback on failure.
//!
//! # Per-car state machine
//!
//! ```text
//!            due, rules ─────────────► adopt rule decision
//!           ╱
//! idle ──due┼── oracle, pool busy ──► adopt fallback
//!           ╲
//!            oracle ──► pending ──reply────► adopt parsed (or fallback)
//!                          │  ╲──error────► adopt fallback
//!                          │   ╲─timeout──► abandon, adopt fallback
//!                          └── still running: keep previous decision
//! ```
//!
//! Every adoption restarts the car's cadence, so a decision is never older
//! than `decision_interval_ticks + request_timeout_ticks`.

use std::time::Duration;

use log::{debug, info, warn};
use race_core::{CarId, Tick};
use serde::{Deserialize, Serialize};

use crate::{
    parse_decision, Decision, DecisionError, DecisionProvider, DecisionResult, DecisionSource,
    OracleRequest, OracleResult, RaceSituation, WorkerPool,
};

// ── SchedulerConfig ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ticks a decision stays in force before the next one is requested.
    pub decision_interval_ticks: u64,
    /// Worker threads serving oracle calls.
    pub oracle_workers:          usize,
    /// In-flight oracle jobs above which new requests get the fallback.
    pub max_outstanding:         usize,
    /// Ticks after which a pending request is abandoned.
    pub request_timeout_ticks:   u64,
    /// Longest wait for running jobs on shutdown, milliseconds.
    pub drain_timeout_ms:        u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            decision_interval_ticks: 10,
            oracle_workers:          5,
            max_outstanding:         5,
            request_timeout_ticks:   200,
            drain_timeout_ms:        2_000,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> DecisionResult<()> {
        let checks = [
            (self.decision_interval_ticks == 0, "decision_interval_ticks must be at least 1"),
            (self.oracle_workers == 0, "oracle_workers must be at least 1"),
            (self.max_outstanding == 0, "max_outstanding must be at least 1"),
            (self.request_timeout_ticks == 0, "request_timeout_ticks must be at least 1"),
        ];
        match checks.into_iter().find(|(bad, _)| *bad) {
            Some((_, msg)) => Err(DecisionError::Config(msg.into())),
            None => Ok(()),
        }
    }

    /// Worst-case age of a car's decision, in ticks.
    #[inline]
    pub fn staleness_bound(&self) -> u64 {
        self.decision_interval_ticks + self.request_timeout_ticks
    }
}

// ── DecisionTable ─────────────────────────────────────────────────────────────

/// The decision in force for every car, indexed by `CarId`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTable {
    decisions: Vec<Decision>,
    fresh:     Vec<CarId>,
}

impl DecisionTable {
    fn new(car_count: usize) -> Self {
        Self { decisions: vec![Decision::fallback(); car_count], fresh: Vec::new() }
    }

    #[inline]
    pub fn get(&self, car: CarId) -> Option<&Decision> {
        self.decisions.get(car.index())
    }

    /// Cars whose decision changed in the poll that produced this table.
    #[inline]
    pub fn fresh(&self) -> &[CarId] {
        &self.fresh
    }

    pub fn iter(&self) -> impl Iterator<Item = (CarId, &Decision)> {
        self.decisions.iter().enumerate().map(|(i, d)| (CarId(i as u32), d))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    fn adopt(&mut self, car: CarId, decision: Decision) {
        self.decisions[car.index()] = decision;
        self.fresh.push(car);
    }
}

// ── PendingRequest ────────────────────────────────────────────────────────────

/// An in-flight oracle call for one car.
pub struct PendingRequest {
    pub car:       CarId,
    pub submitted: Tick,
    reply:         flume::Receiver<OracleResult<String>>,
}

enum Poll {
    Ready(OracleResult<String>),
    Waiting,
    /// The job ended without a reply (cancelled or panicked).
    Lost,
}

impl PendingRequest {
    fn poll(&self) -> Poll {
        match self.reply.try_recv() {
            Ok(reply) => Poll::Ready(reply),
            Err(flume::TryRecvError::Empty) => Poll::Waiting,
            Err(flume::TryRecvError::Disconnected) => Poll::Lost,
        }
    }
}

/// Running totals, for results and logs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub requests:  u64,
    pub replies:   u64,
    pub fallbacks: u64,
    pub timeouts:  u64,
    pub saturated: u64,
}

// ── DecisionScheduler ─────────────────────────────────────────────────────────

pub struct DecisionScheduler {
    config:      SchedulerConfig,
    providers:   Vec<DecisionProvider>,
    pool:        WorkerPool,
    /// At most one per car.
    pending:     Vec<Option<PendingRequest>>,
    next_due:    Vec<Tick>,
    retired:     Vec<bool>,
    table:       DecisionTable,
    last_polled: Option<Tick>,
    stats:       SchedulerStats,
    shut_down:   bool,
}

impl DecisionScheduler {
    /// One provider per car, in `CarId` order.
    pub fn new(config: SchedulerConfig, providers: Vec<DecisionProvider>) -> DecisionResult<Self> {
        config.validate()?;
        let n = providers.len();
        let pool = WorkerPool::new(config.oracle_workers)?;
        Ok(Self {
            config,
            providers,
            pool,
            pending:     (0..n).map(|_| None).collect(),
            next_due:    vec![Tick::ZERO; n],
            retired:     vec![false; n],
            table:       DecisionTable::new(n),
            last_polled: None,
            stats:       SchedulerStats::default(),
            shut_down:   false,
        })
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    #[inline]
    pub fn table(&self) -> &DecisionTable {
        &self.table
    }

    #[inline]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    #[inline]
    pub fn has_pending(&self, car: CarId) -> bool {
        self.pending.get(car.index()).is_some_and(Option::is_some)
    }

    /// Pending requests across all cars.
    pub fn outstanding(&self) -> usize {
        self.pending.iter().filter(|p| p.is_some()).count()
    }

    /// Oracle jobs still queued or running, abandoned ones included.
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.pool.in_flight()
    }

    /// Advance every car's decision to `tick` without blocking.
    ///
    /// `situation` is asked for a snapshot only when a car needs a new
    /// request; returning `None` skips that car this tick.  A second call
    /// for the same tick returns the cached table untouched.
    pub fn poll<F>(&mut self, tick: Tick, mut situation: F) -> &DecisionTable
    where
        F: FnMut(CarId) -> Option<RaceSituation>,
    {
        if self.shut_down || self.last_polled == Some(tick) {
            return &self.table;
        }
        self.last_polled = Some(tick);
        self.table.fresh.clear();

        for i in 0..self.providers.len() {
            let car = CarId(i as u32);
            if self.retired[i] {
                continue;
            }
            if self.pending[i].is_some() {
                self.check_pending(car, tick);
                continue;
            }
            if tick < self.next_due[i] {
                continue;
            }
            if let Some(s) = situation(car) {
                self.request(car, tick, &s);
            }
        }
        &self.table
    }

    fn check_pending(&mut self, car: CarId, tick: Tick) {
        let i = car.index();
        let Some(pending) = &self.pending[i] else { return };

        let decision = match pending.poll() {
            Poll::Waiting => {
                if tick.since(pending.submitted) < self.config.request_timeout_ticks {
                    return;
                }
                self.stats.timeouts += 1;
                warn!("{car}: oracle request from {} timed out; using fallback", pending.submitted);
                Decision::fallback()
            }
            Poll::Ready(Ok(raw)) => {
                self.stats.replies += 1;
                match parse_decision(&raw) {
                    Ok(decision) => {
                        debug!("{car}: oracle decided {} ({:.2})", decision.action, decision.confidence);
                        decision
                    }
                    Err(e) => {
                        warn!("{car}: unusable oracle reply ({e}); using fallback");
                        Decision::fallback()
                    }
                }
            }
            Poll::Ready(Err(e)) => {
                warn!("{car}: oracle failed ({e}); using fallback");
                Decision::fallback()
            }
            Poll::Lost => {
                warn!("{car}: oracle request lost; using fallback");
                Decision::fallback()
            }
        };
        // Dropping the receiver abandons a timed-out job.
        self.pending[i] = None;
        self.adopt(car, tick, decision);
    }

    fn request(&mut self, car: CarId, tick: Tick, situation: &RaceSituation) {
        let oracle = match &self.providers[car.index()] {
            DecisionProvider::Rules(engine) => {
                let decision = engine.decide(situation).from_source(DecisionSource::Rules);
                self.adopt(car, tick, decision);
                return;
            }
            DecisionProvider::Oracle(oracle) => std::sync::Arc::clone(oracle),
        };

        if self.pool.in_flight() >= self.config.max_outstanding {
            self.stats.saturated += 1;
            debug!("{car}: oracle pool saturated; using fallback");
            self.adopt(car, tick, Decision::fallback());
            return;
        }

        let payload = match situation.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!("{car}: {e}; using fallback");
                self.adopt(car, tick, Decision::fallback());
                return;
            }
        };
        let request = OracleRequest { car, tick, situation: payload };
        let reply = self.pool.submit(move || oracle.consult(&request));
        self.stats.requests += 1;
        self.pending[car.index()] = Some(PendingRequest { car, submitted: tick, reply });
    }

    fn adopt(&mut self, car: CarId, tick: Tick, decision: Decision) {
        if decision.is_fallback() {
            self.stats.fallbacks += 1;
        }
        self.next_due[car.index()] = tick + self.config.decision_interval_ticks;
        self.table.adopt(car, decision.at(tick));
    }

    /// Stop scheduling `car` (it finished).  Any pending request is
    /// abandoned.
    pub fn retire(&mut self, car: CarId) {
        if let Some(slot) = self.pending.get_mut(car.index()) {
            *slot = None;
            self.retired[car.index()] = true;
        }
    }

    /// Abandon every pending request, stop queued jobs and wait (bounded) for
    /// running ones.  Returns `true` if the pool drained in time.  Idempotent.
    pub fn shutdown(&mut self) -> bool {
        if self.shut_down {
            return self.pool.in_flight() == 0;
        }
        self.shut_down = true;
        self.pool.cancel();
        let abandoned = self.pending.iter_mut().filter_map(Option::take).count();
        let drained = self.pool.drain(Duration::from_millis(self.config.drain_timeout_ms));
        if drained {
            info!("decision scheduler shut down ({abandoned} requests abandoned)");
        } else {
            warn!(
                "decision scheduler shut down with {} oracle calls still running",
                self.pool.in_flight()
            );
        }
        drained
    }
}

impl Drop for DecisionScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
