//! Fluent builder for constructing a [`Race`].

use race_car::{Car, CarRngs, Track};
use race_core::RaceConfig;
use race_decision::{DecisionProvider, DecisionScheduler, SchedulerConfig, TacticalRules};

use crate::{Race, SimError, SimResult};

/// Fluent builder for [`Race`].
///
/// # Required inputs
///
/// - [`RaceConfig`]: laps, tick length, tick budget, seed
/// - [`Track`]
/// - `Vec<Car>` + [`CarRngs`]: from [`race_car::GridBuilder`]
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                          |
/// |-------------------------|----------------------------------|
/// | `.scheduler(cfg)`       | `SchedulerConfig::default()`     |
/// | `.providers(v)`         | [`TacticalRules`] for every car  |
/// | `.provider_for_all(p)`  | alternative to `.providers`      |
///
/// # Example
///
/// ```rust,ignore
/// let (cars, rngs) = GridBuilder::new(seed).entrant("Apex", profile).build()?;
/// let mut race = RaceBuilder::new(config, Track::preset(TrackKind::Speed), cars, rngs)
///     .provider_for_all(DecisionProvider::oracle(my_oracle))
///     .build()?;
/// let results = race.run(&mut NoopObserver)?;
/// ```
pub struct RaceBuilder {
    config:    RaceConfig,
    track:     Track,
    cars:      Vec<Car>,
    rngs:      CarRngs,
    scheduler: SchedulerConfig,
    providers: Option<Vec<DecisionProvider>>,
}

impl RaceBuilder {
    pub fn new(config: RaceConfig, track: Track, cars: Vec<Car>, rngs: CarRngs) -> Self {
        Self {
            config,
            track,
            cars,
            rngs,
            scheduler: SchedulerConfig::default(),
            providers: None,
        }
    }

    pub fn scheduler(mut self, config: SchedulerConfig) -> Self {
        self.scheduler = config;
        self
    }

    /// One decision provider per car, in `CarId` order.
    pub fn providers(mut self, providers: Vec<DecisionProvider>) -> Self {
        self.providers = Some(providers);
        self
    }

    /// The same provider for every car.
    pub fn provider_for_all(mut self, provider: DecisionProvider) -> Self {
        self.providers = Some(vec![provider; self.cars.len()]);
        self
    }

    /// Validate inputs, start the scheduler's worker pool and return a
    /// ready-to-run [`Race`].
    pub fn build(self) -> SimResult<Race> {
        self.config.validate()?;
        let car_count = self.cars.len();
        if car_count == 0 {
            return Err(SimError::Config("a race needs at least one car".into()));
        }
        if let Some((i, car)) = self.cars.iter().enumerate().find(|(i, c)| c.id.index() != *i) {
            return Err(SimError::Config(format!("car at index {i} has id {}", car.id)));
        }
        if self.rngs.len() != car_count {
            return Err(SimError::CarCountMismatch {
                expected: car_count,
                got:      self.rngs.len(),
                what:     "car RNGs",
            });
        }

        let providers = match self.providers {
            Some(p) => {
                if p.len() != car_count {
                    return Err(SimError::CarCountMismatch {
                        expected: car_count,
                        got:      p.len(),
                        what:     "decision providers",
                    });
                }
                p
            }
            None => vec![DecisionProvider::rules(TacticalRules); car_count],
        };

        let scheduler = DecisionScheduler::new(self.scheduler, providers)?;
        Ok(Race::new(self.config, self.track, self.cars, self.rngs, scheduler))
    }
}
