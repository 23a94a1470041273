//! The `Race` struct and its tick loop.

use log::{debug, info, warn};
use race_car::{
    advance, fuel_strategy, is_low_fuel, predict_tire_wear, roll_incident, target_speed, Car,
    CarRngs, SpeedRequest, Track,
};
use race_core::{CarId, RaceClock, RaceConfig, RaceRng, Tick};
use race_decision::{Action, Decision, DecisionScheduler, RaceSituation};
use race_effects::{
    CollisionEvent, CollisionInput, CollisionResolver, EffectsResult, FireOutcome, HitEvent,
    PowerUpSystem, Weapon, WeaponSystem,
};

use crate::results::{fastest_lap, Classification};
use crate::{
    CarFrame, Flow, FrameView, IncidentKind, RaceEvent, RaceObserver, RaceResults, SimError,
    SimResult,
};

/// Child-stream offsets of the race-level RNG.
const COLLISION_STREAM: u64 = 1;
const PICKUP_STREAM: u64 = 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RaceState {
    NotStarted,
    Running,
    /// Every car finished or the tick budget ran out.
    Finished,
    /// Stopped by an observer or [`Race::abort`].
    Aborted,
}

// ── Race ──────────────────────────────────────────────────────────────────────

/// The race runner.
///
/// `Race` owns every car and subsystem and drives the tick loop:
///
/// 1. **Poll** the decision scheduler with a situation per due car.
/// 2. **Adopt** freshly resolved decisions: one-shot side effects, item use.
/// 3. **Physics**: target speed (style × action × power-ups × low-fuel cap),
///    `advance`, corner incident roll.
/// 4. **Collisions**: detect, apply speed penalties.
/// 5. **Weapons** for cars whose decision is `fire`.
/// 6. **Pickups**, then effect, respawn, cooldown and marker decay.
/// 7. **Laps and finish**: finished cars leave the loop and the scheduler.
/// 8. **Ranking**: finishers in finish order, then by distance; overtakes.
///
/// Subsystems are lent car state one call at a time; a subsystem error is
/// logged and the affected car carries over unchanged for that phase.
///
/// Create via [`RaceBuilder`][crate::RaceBuilder].
pub struct Race {
    pub config: RaceConfig,

    /// Tracks the current tick and maps it to race seconds.
    pub clock: RaceClock,

    pub track: Track,

    /// Indexed by `CarId`.
    pub cars: Vec<Car>,

    /// Per-car RNGs (chaotic style, incidents), separate for split borrows.
    pub rngs: CarRngs,

    scheduler:     DecisionScheduler,
    collisions:    CollisionResolver,
    powerups:      PowerUpSystem,
    weapons:       WeaponSystem,
    collision_rng: RaceRng,
    pickup_rng:    RaceRng,
    state:         RaceState,
    /// Running order, leader first.
    order:         Vec<CarId>,
    finish_order:  Vec<CarId>,
    low_fuel:      Vec<bool>,

    // Per-tick scratch.
    events:          Vec<RaceEvent>,
    tick_collisions: Vec<CollisionEvent>,
    frames:          Vec<CarFrame>,
}

impl Race {
    pub(crate) fn new(
        config:    RaceConfig,
        track:     Track,
        cars:      Vec<Car>,
        rngs:      CarRngs,
        scheduler: DecisionScheduler,
    ) -> Self {
        let n = cars.len();
        let mut master = RaceRng::new(config.seed);
        let collision_rng = master.child(COLLISION_STREAM);
        let pickup_rng = master.child(PICKUP_STREAM);
        let mut race = Self {
            clock: config.make_clock(),
            config,
            track,
            cars,
            rngs,
            scheduler,
            collisions: CollisionResolver::new(n),
            powerups: PowerUpSystem::new(n),
            weapons: WeaponSystem::new(n),
            collision_rng,
            pickup_rng,
            state: RaceState::NotStarted,
            order: CarId::range(n).collect(),
            finish_order: Vec::with_capacity(n),
            low_fuel: vec![false; n],
            events: Vec::new(),
            tick_collisions: Vec::new(),
            frames: Vec::with_capacity(n),
        };
        race.order = race.ranked_order();
        race.write_rankings();
        race
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> RaceState {
        self.state
    }

    /// Running order, leader first.
    #[inline]
    pub fn order(&self) -> &[CarId] {
        &self.order
    }

    /// The decision currently in force for `car`.
    pub fn decision(&self, car: CarId) -> Option<&Decision> {
        self.scheduler.table().get(car)
    }

    #[inline]
    pub fn scheduler(&self) -> &DecisionScheduler {
        &self.scheduler
    }

    #[inline]
    pub fn powerups(&self) -> &PowerUpSystem {
        &self.powerups
    }

    /// Mutable access for scripted setups (granting items before the start).
    #[inline]
    pub fn powerups_mut(&mut self) -> &mut PowerUpSystem {
        &mut self.powerups
    }

    #[inline]
    pub fn weapons(&self) -> &WeaponSystem {
        &self.weapons
    }

    #[inline]
    pub fn collisions(&self) -> &CollisionResolver {
        &self.collisions
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Run until every car finishes, the tick budget runs out, or the
    /// observer returns [`Flow::Stop`].
    ///
    /// # Errors
    ///
    /// [`SimError::Ended`] if the race already finished or was aborted.
    pub fn run<O: RaceObserver>(&mut self, observer: &mut O) -> SimResult<RaceResults> {
        match self.state {
            RaceState::NotStarted => self.start(observer),
            RaceState::Running => {}
            ended => return Err(SimError::Ended(ended)),
        }

        while self.state == RaceState::Running {
            if self.clock.current_tick >= self.config.end_tick() {
                warn!("tick budget exhausted at {} with cars still running", self.clock);
                self.state = RaceState::Finished;
                break;
            }
            self.step(observer);
        }
        Ok(self.conclude(observer))
    }

    /// Run at most `n` ticks from the current position.  Does not conclude
    /// the race; returns the state afterwards.
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: RaceObserver>(&mut self, n: u64, observer: &mut O) -> RaceState {
        if self.state == RaceState::NotStarted {
            self.start(observer);
        }
        for _ in 0..n {
            if self.state != RaceState::Running {
                break;
            }
            self.step(observer);
        }
        self.state
    }

    /// Stop the race and release the oracle workers.  Idempotent.
    pub fn abort(&mut self) {
        if matches!(self.state, RaceState::NotStarted | RaceState::Running) {
            info!("race aborted at {}", self.clock);
            self.state = RaceState::Aborted;
        }
        self.scheduler.shutdown();
    }

    /// Results as of now, in running order.
    pub fn results(&self) -> RaceResults {
        let standings = self
            .order
            .iter()
            .map(|&id| {
                Classification::from_car(
                    &self.cars[id.index()],
                    self.collisions.stats(id).unwrap_or_default(),
                    self.weapons.stats(id).unwrap_or_default(),
                )
            })
            .collect();
        RaceResults {
            track:       self.track.name.clone(),
            track_kind:  self.track.kind,
            weather:     self.track.weather,
            laps:        self.config.laps,
            ticks:       self.clock.current_tick.0,
            race_secs:   self.clock.elapsed_secs(),
            completed:   self.all_finished(),
            aborted:     self.state == RaceState::Aborted,
            standings,
            fastest_lap: fastest_lap(&self.cars),
            collisions:  self.collisions.total(),
            decisions:   self.scheduler.stats(),
        }
    }

    // ── Loop plumbing ─────────────────────────────────────────────────────

    fn start<O: RaceObserver>(&mut self, observer: &mut O) {
        self.state = RaceState::Running;
        info!(
            "race start: {} cars, {} laps of {} ({:.0} m, {})",
            self.cars.len(),
            self.config.laps,
            self.track.name,
            self.track.length_m(),
            self.track.weather.as_str(),
        );
        observer.on_race_start(&self.cars, &self.track);
        observer.on_event(&RaceEvent::RaceStarted {
            tick:  self.clock.current_tick,
            cars:  self.cars.len(),
            laps:  self.config.laps,
            track: self.track.name.clone(),
        });
    }

    fn step<O: RaceObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        self.process_tick(now);

        for event in self.events.drain(..) {
            observer.on_event(&event);
        }

        self.build_frames();
        let frame = FrameView {
            tick:        now,
            race_secs:   self.clock.secs_at(now + 1),
            cars:        &self.frames,
            pickups:     self.powerups.pickups(),
            hit_markers: self.weapons.markers(),
            collisions:  &self.tick_collisions,
        };
        let flow = observer.on_frame(&frame);

        if self.config.snapshot_interval_ticks > 0
            && now.0.is_multiple_of(self.config.snapshot_interval_ticks)
        {
            observer.on_snapshot(now, &self.cars);
        }

        self.clock.advance();
        if self.all_finished() {
            info!("all cars finished at {}", self.clock);
            self.state = RaceState::Finished;
        } else if flow == Flow::Stop {
            self.abort();
        }
    }

    fn conclude<O: RaceObserver>(&mut self, observer: &mut O) -> RaceResults {
        self.scheduler.shutdown();
        let results = self.results();
        observer.on_event(&RaceEvent::RaceEnded {
            tick:      self.clock.current_tick,
            completed: results.completed,
        });
        observer.on_race_end(&results);
        results
    }

    fn all_finished(&self) -> bool {
        self.cars.iter().all(Car::is_finished)
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) {
        let dt = self.clock.tick_secs;
        let now_secs = self.clock.secs_at(now);
        self.tick_collisions.clear();

        // ── Phase 1–2: decisions ──────────────────────────────────────────
        for (car, decision) in self.poll_decisions(now, now_secs) {
            self.adopt(now, car, &decision);
        }

        // ── Phase 3: physics ──────────────────────────────────────────────
        self.move_cars(now, dt);

        // ── Phase 4: collisions ───────────────────────────────────────────
        self.resolve_collisions(now);

        // ── Phase 5: weapons ──────────────────────────────────────────────
        self.fire_weapons(now, now_secs);

        // ── Phase 6: pickups and decay ────────────────────────────────────
        self.collect_pickups(now);
        self.powerups.tick(dt);
        self.collisions.tick_cooldowns();
        self.weapons.tick(dt);

        // ── Phase 7: laps and finish ──────────────────────────────────────
        self.check_laps(now, self.clock.secs_at(now + 1));

        // ── Phase 8: ranking ──────────────────────────────────────────────
        self.update_ranking(now);
    }

    /// Poll the scheduler and return the decisions that changed this tick.
    fn poll_decisions(&mut self, now: Tick, now_secs: f64) -> Vec<(CarId, Decision)> {
        let rows = self.collision_inputs();
        let positions = self.positions();
        let source = SituationSource {
            cars:       &self.cars,
            track:      &self.track,
            laps:       self.config.laps,
            order:      &self.order,
            powerups:   &self.powerups,
            weapons:    &self.weapons,
            collisions: &self.collisions,
            rows:       &rows,
            positions:  &positions,
            now_secs,
        };
        let table = self.scheduler.poll(now, |car| source.situation(car));
        table
            .fresh()
            .iter()
            .filter_map(|&car| table.get(car).map(|d| (car, d.clone())))
            .collect()
    }

    fn adopt(&mut self, now: Tick, car: CarId, decision: &Decision) {
        let i = car.index();
        if self.cars[i].is_finished() {
            return;
        }
        decision.action.apply_side_effects(&mut self.cars[i].state);
        self.events.push(RaceEvent::DecisionAdopted {
            tick:       now,
            car,
            action:     decision.action,
            confidence: decision.confidence,
            source:     decision.source,
        });
        if decision.use_powerup || decision.action == Action::UsePowerup {
            self.use_item(now, car);
        }
    }

    fn use_item(&mut self, now: Tick, car: CarId) {
        match self.powerups.use_item(car, &mut self.cars[car.index()].state, &self.order) {
            Ok(Some(used)) => self.events.push(RaceEvent::ItemUsed {
                tick:    now,
                car,
                item:    used.item,
                hit:     used.hit,
                blocked: used.blocked,
            }),
            Ok(None) => {}
            Err(e) => warn!("{car}: item use failed: {e}"),
        }
    }

    fn move_cars(&mut self, now: Tick, dt: f64) {
        let weather = self.track.weather;
        for i in 0..self.cars.len() {
            let car = &self.cars[i];
            if car.is_finished() {
                continue;
            }
            let id = car.id;
            let segment = self.track.segment_at(car.state.distance_m());
            let request = SpeedRequest {
                action_factor: self.scheduler.table().get(id).map_or(1.0, |d| d.action.speed_factor()),
                effect_factor: self.powerups.speed_modifier(id).unwrap_or_else(|e| {
                    warn!("{id}: {e}; ignoring effects this tick");
                    1.0
                }),
            };
            let rng = self.rngs.get_mut(id);
            let target = target_speed(car, segment, weather, request, rng);
            let next = advance(car, segment, weather, target, dt);

            let car = &mut self.cars[i];
            car.state = next;
            if roll_incident(car, segment, weather, rng) {
                info!("{} spun out at {:.0} m", car.name, car.state.distance_m());
                car.state.set_speed(0.0);
                self.events.push(RaceEvent::Incident { tick: now, car: id, kind: IncidentKind::SpinOut });
            }
            if !self.low_fuel[i] && is_low_fuel(&car.state) {
                self.low_fuel[i] = true;
                warn!("{} is running on fumes ({:.1}%)", car.name, car.state.fuel());
                self.events.push(RaceEvent::LowFuel { tick: now, car: id, fuel: car.state.fuel() });
            }
        }
    }

    fn resolve_collisions(&mut self, now: Tick) {
        let rows = self.collision_inputs();
        let events = self.collisions.detect(&rows, &mut self.collision_rng);
        if events.is_empty() {
            return;
        }

        let mut speeds: Vec<f64> = self.cars.iter().map(|c| c.state.speed()).collect();
        for event in &events {
            if let Err(e) = self.collisions.apply(event, &mut speeds) {
                warn!("collision between {} and {} not applied: {e}", event.at_fault, event.victim);
                continue;
            }
            self.events.push(RaceEvent::Collision {
                tick:     now,
                at_fault: event.at_fault,
                victim:   event.victim,
                kind:     event.kind,
                severity: event.severity,
            });
        }
        for (car, speed) in self.cars.iter_mut().zip(speeds) {
            car.state.set_speed(speed);
        }
        self.tick_collisions = events;
    }

    fn fire_weapons(&mut self, now: Tick, now_secs: f64) {
        let positions = self.positions();
        for i in 0..self.cars.len() {
            let id = self.cars[i].id;
            let firing = !self.cars[i].is_finished()
                && self.scheduler.table().get(id).is_some_and(|d| d.action == Action::Fire);
            if !firing {
                continue;
            }
            match self.fire(id, now_secs, &positions) {
                Ok(Some(hit)) => self.events.push(RaceEvent::WeaponHit {
                    tick:     now,
                    shooter:  hit.shooter,
                    target:   hit.target,
                    absorbed: hit.absorbed,
                }),
                Ok(None) => {}
                Err(e) => warn!("{id}: weapon fire failed: {e}"),
            }
        }
    }

    fn fire(
        &mut self,
        shooter:   CarId,
        now_secs:  f64,
        positions: &[(CarId, f64)],
    ) -> EffectsResult<Option<HitEvent>> {
        if !self.weapons.attempt_fire(shooter, now_secs)? {
            return Ok(None);
        }
        let target = self.weapons.find_target_ahead(shooter, positions)?;
        let protected = match target {
            Some((car, _)) => self.powerups.is_protected(car)?,
            None => false,
        };
        match self.weapons.check_hit(shooter, target, protected)? {
            FireOutcome::Hit(hit) => {
                if !hit.absorbed {
                    let weapon = self.weapons.weapon(shooter)?;
                    let state = &mut self.cars[hit.target.index()].state;
                    state.set_speed(weapon.apply_hit(state.speed()));
                }
                Ok(Some(hit))
            }
            FireOutcome::NoTargetInRange => Ok(None),
        }
    }

    fn collect_pickups(&mut self, now: Tick) {
        let total = self.cars.len() as u32;
        for &id in &self.order {
            let car = &self.cars[id.index()];
            if car.is_finished() {
                continue;
            }
            let progress = self.track.lap_progress(car.state.distance_m());
            let collected = self.powerups.check_collection(
                id,
                progress,
                car.standing.ranking,
                total,
                &mut self.pickup_rng,
            );
            match collected {
                Ok(Some(item)) => self.events.push(RaceEvent::PickupCollected { tick: now, car: id, item }),
                Ok(None) => {}
                Err(e) => warn!("{id}: pickup check failed: {e}"),
            }
        }
    }

    /// `end_secs` is the race time at the end of this tick.
    fn check_laps(&mut self, now: Tick, end_secs: f64) {
        let mut finishers = Vec::new();
        for car in self.cars.iter_mut().filter(|c| !c.is_finished()) {
            let lap = self.track.lap_of(car.state.distance_m());
            while car.standing.lap < lap {
                car.standing.lap += 1;
                let lap_secs = end_secs - car.standing.lap_started_secs;
                car.standing.lap_times.push(lap_secs);
                car.standing.lap_started_secs = end_secs;
                debug!("{} completed lap {} in {:.3}s", car.name, car.standing.lap, lap_secs);
                self.events.push(RaceEvent::LapCompleted {
                    tick: now,
                    car: car.id,
                    lap: car.standing.lap,
                    lap_secs,
                });
            }
            if car.standing.lap >= self.config.laps {
                finishers.push((car.id, car.state.distance_m()));
            }
        }

        // Cars crossing the line on the same tick finish in distance order.
        finishers.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        for (id, _) in finishers {
            self.finish_order.push(id);
            let position = self.finish_order.len() as u32;
            let car = &mut self.cars[id.index()];
            car.standing.finished_at = Some(now);
            car.standing.finish_secs = Some(end_secs);
            info!("{} finished P{position} in {end_secs:.3}s", car.name);
            self.scheduler.retire(id);
            self.events.push(RaceEvent::Finished { tick: now, car: id, position, race_secs: end_secs });
        }
    }

    fn update_ranking(&mut self, now: Tick) {
        let ranked = self.ranked_order();
        let mut previous = vec![0usize; self.cars.len()];
        for (pos, &car) in self.order.iter().enumerate() {
            previous[car.index()] = pos;
        }
        for (pos, &car) in ranked.iter().enumerate() {
            for &passed in &ranked[pos + 1..] {
                if previous[car.index()] > previous[passed.index()] {
                    debug!("{car} passed {passed} for P{}", pos + 1);
                    self.events.push(RaceEvent::Overtake {
                        tick: now,
                        car,
                        passed,
                        position: pos as u32 + 1,
                    });
                }
            }
        }
        self.order = ranked;
        self.write_rankings();
    }

    /// Finishers in finish order, then running cars by distance covered.
    fn ranked_order(&self) -> Vec<CarId> {
        let mut running: Vec<&Car> = self.cars.iter().filter(|c| !c.is_finished()).collect();
        running.sort_by(|a, b| {
            b.state.distance_m().total_cmp(&a.state.distance_m()).then(a.id.cmp(&b.id))
        });
        self.finish_order.iter().copied().chain(running.iter().map(|c| c.id)).collect()
    }

    fn write_rankings(&mut self) {
        for (pos, &car) in self.order.iter().enumerate() {
            self.cars[car.index()].standing.ranking = pos as u32 + 1;
        }
    }

    // ── Per-tick views ────────────────────────────────────────────────────

    /// Collision rows for every running car.
    fn collision_inputs(&self) -> Vec<CollisionInput> {
        self.cars
            .iter()
            .filter(|c| !c.is_finished())
            .map(|c| {
                let distance = c.state.distance_m();
                CollisionInput {
                    car:       c.id,
                    progress:  self.track.lap_progress(distance),
                    speed:     c.state.speed(),
                    section:   self.track.segment_at(distance).section(),
                    protected: self.powerups.is_protected(c.id).unwrap_or(false),
                }
            })
            .collect()
    }

    /// Race progress (laps + in-lap fraction) for every running car.
    fn positions(&self) -> Vec<(CarId, f64)> {
        self.cars
            .iter()
            .filter(|c| !c.is_finished())
            .map(|c| (c.id, self.track.race_progress(c.state.distance_m())))
            .collect()
    }

    fn build_frames(&mut self) {
        self.frames.clear();
        let table = self.scheduler.table();
        for car in &self.cars {
            let id = car.id;
            self.frames.push(CarFrame {
                car:       id,
                lap:       car.standing.lap,
                progress:  self.track.lap_progress(car.state.distance_m()),
                speed_kmh: car.state.speed(),
                position:  car.standing.ranking,
                action:    table.get(id).map_or(Action::Wait, |d| d.action),
                effects:   self
                    .powerups
                    .effects(id)
                    .map(|fx| fx.iter().map(|e| e.source).collect())
                    .unwrap_or_default(),
                protected: self.powerups.is_protected(id).unwrap_or(false),
                finished:  car.is_finished(),
            });
        }
    }
}

// ── Situations ────────────────────────────────────────────────────────────────

/// Borrowed race state for building [`RaceSituation`]s while the scheduler
/// is borrowed mutably.
struct SituationSource<'a> {
    cars:       &'a [Car],
    track:      &'a Track,
    laps:       u32,
    order:      &'a [CarId],
    powerups:   &'a PowerUpSystem,
    weapons:    &'a WeaponSystem,
    collisions: &'a CollisionResolver,
    rows:       &'a [CollisionInput],
    positions:  &'a [(CarId, f64)],
    now_secs:   f64,
}

impl SituationSource<'_> {
    /// `None` for finished or unknown cars.
    fn situation(&self, car: CarId) -> Option<RaceSituation> {
        let c = self.cars.get(car.index()).filter(|c| !c.is_finished())?;
        let pos = self.order.iter().position(|&o| o == car)?;
        let distance = c.state.distance_m();
        let gap_to = |other: &CarId| (self.cars[other.index()].state.distance_m() - distance).abs();

        let weapon = self.weapons.weapon(car).ok();
        let target = self.weapons.find_target_ahead(car, self.positions).ok().flatten();
        let laps_remaining = self.laps.saturating_sub(c.standing.lap);
        let tires = predict_tire_wear(c, self.track, laps_remaining);

        Some(RaceSituation {
            car,
            name:            c.name.clone(),
            position:        pos as u32 + 1,
            total_cars:      self.cars.len() as u32,
            lap:             c.standing.lap,
            total_laps:      self.laps,
            completion:      (self.track.race_progress(distance) / self.laps as f64).clamp(0.0, 1.0),
            gap_ahead_m:     pos.checked_sub(1).and_then(|i| self.order.get(i)).map(gap_to),
            gap_behind_m:    self.order.get(pos + 1).map(gap_to),
            speed_kmh:       c.state.speed(),
            fuel:            c.state.fuel(),
            tire_wear:       c.state.tire_wear(),
            segment:         self.track.segment_at(distance).section(),
            weather:         self.track.weather,
            fuel_strategy:   fuel_strategy(c, laps_remaining).strategy,
            wear_per_lap:    tires.per_lap,
            tires_critical:  tires.critical,
            inventory:       self.powerups.inventory(car).map(<[_]>::to_vec).unwrap_or_default(),
            collision_risk:  self.collisions.collision_risk(car, self.rows).unwrap_or_default(),
            ammo:            weapon.map_or(0, Weapon::ammo),
            can_fire:        weapon.is_some_and(|w| w.can_fire(self.now_secs)),
            target_ahead:    target.map(|(t, _)| t),
            target_distance: target.map(|(_, d)| d),
            target_in_range: target.zip(weapon).is_some_and(|((_, d), w)| w.in_range(d)),
        })
    }
}
