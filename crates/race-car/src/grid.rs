//! Fluent builder for the starting grid.
//!
//! # Usage
//!
//! ```rust
//! use race_car::{CarProfile, DriverStyle, GridBuilder};
//!
//! let fast = CarProfile::new(320.0, 3.0, 0.8, 10.0, DriverStyle::Aggressive).unwrap();
//! let (cars, rngs) = GridBuilder::new(42)
//!     .entrant("Velocity", fast)
//!     .entrant("Apex", fast)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(cars.len(), 2);
//! assert_eq!(rngs.len(), 2);
//! ```

use race_core::{CarId, CarRng};

use crate::{Car, CarProfile, CarResult};

// ── CarRngs ───────────────────────────────────────────────────────────────────

/// Per-car RNGs, kept apart from the `Car` records so the loop can hold
/// `&mut CarRngs` while reading `&[Car]`.
pub struct CarRngs {
    pub inner: Vec<CarRng>,
}

impl CarRngs {
    pub fn new(count: usize, global_seed: u64) -> Self {
        Self {
            inner: CarId::range(count).map(|car| CarRng::new(global_seed, car)).collect(),
        }
    }

    #[inline]
    pub fn get_mut(&mut self, car: CarId) -> &mut CarRng {
        &mut self.inner[car.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── GridBuilder ───────────────────────────────────────────────────────────────

/// Collects entrants and produces `Vec<Car>` + [`CarRngs`].
///
/// Entrants are assigned `CarId`s in insertion order, which is also grid
/// order: the first entrant starts on pole, each following car
/// `grid_gap_m` metres further back.
pub struct GridBuilder {
    seed:       u64,
    grid_gap_m: f64,
    entrants:   Vec<(String, CarProfile)>,
}

impl GridBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed, grid_gap_m: 0.0, entrants: Vec::new() }
    }

    pub fn entrant(mut self, name: impl Into<String>, profile: CarProfile) -> Self {
        self.entrants.push((name.into(), profile));
        self
    }

    /// Spacing between consecutive grid slots.  Default: 0 (all on the line).
    pub fn grid_gap(mut self, metres: f64) -> Self {
        self.grid_gap_m = metres.max(0.0);
        self
    }

    /// Validate every entrant and lay out the grid.
    pub fn build(self) -> CarResult<(Vec<Car>, CarRngs)> {
        let count = self.entrants.len();
        let mut cars = Vec::with_capacity(count);
        for (i, (name, profile)) in self.entrants.into_iter().enumerate() {
            let mut car = Car::new(CarId(i as u32), name, profile)?;
            car.reset_for_race((count - 1 - i) as f64 * self.grid_gap_m);
            cars.push(car);
        }
        Ok((cars, CarRngs::new(count, self.seed)))
    }
}
