//! Track pickups, per-car inventories and timed effects.
//!
//! # Item catalogue
//!
//! | Item        | Delivery                       | Effect                    |
//! |-------------|--------------------------------|---------------------------|
//! | lightning   | every car ahead                | ×0.7 speed for 3 s        |
//! | red shell   | car directly ahead             | ×0.5 speed for 2 s        |
//! | blue shell  | race leader                    | ×0.5 speed for 3 s        |
//! | banana      | car directly behind            | ×0.5 speed for 1.5 s      |
//! | shield      | self                           | protection for 10 s       |
//! | turbo       | self                           | ×1.3 speed for 4 s        |
//! | nitro       | self                           | ×1.5 speed for 2 s        |
//! | ghost       | self                           | protection for 3 s        |
//! | radar       | self                           | none (information only)   |
//! | fuel boost  | self, instant                  | +25 % fuel                |
//! | tire repair | self, instant                  | −30 % tire wear           |
//!
//! Offensive items skip protected targets.

use std::fmt;

use log::debug;
use race_car::CarState;
use race_core::{CarId, PickupId, RaceRng};

use crate::{wrapped_gap, EffectsError, EffectsResult};

pub const PICKUP_COUNT: usize = 8;
/// In-lap progress distance inside which a pickup is collected.
pub const COLLECTION_RADIUS: f64 = 0.002;
pub const RESPAWN_SECS: f64 = 5.0;
pub const INVENTORY_CAP: usize = 2;
/// Items worth more than this are used straight away by rule-based drivers.
pub const USE_THRESHOLD: f64 = 0.6;

// ── Item kinds ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PowerUpKind {
    Lightning,
    RedShell,
    BlueShell,
    Banana,
    Shield,
    Turbo,
    Nitro,
    Ghost,
    Radar,
    FuelBoost,
    TireRepair,
}

/// Who an offensive item lands on, relative to the user's race position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Target {
    AllAhead,
    DirectlyAhead,
    Leader,
    DirectlyBehind,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Delivery {
    Attack { target: Target, secs: f64, factor: f64 },
    Boost { secs: f64, factor: f64 },
    Protect { secs: f64 },
    Refuel(f64),
    Repair(f64),
    Nothing,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 11] = [
        PowerUpKind::Lightning,
        PowerUpKind::RedShell,
        PowerUpKind::BlueShell,
        PowerUpKind::Banana,
        PowerUpKind::Shield,
        PowerUpKind::Turbo,
        PowerUpKind::Nitro,
        PowerUpKind::Ghost,
        PowerUpKind::Radar,
        PowerUpKind::FuelBoost,
        PowerUpKind::TireRepair,
    ];

    fn delivery(self) -> Delivery {
        use Delivery::*;
        match self {
            PowerUpKind::Lightning  => Attack { target: Target::AllAhead,       secs: 3.0, factor: 0.7 },
            PowerUpKind::RedShell   => Attack { target: Target::DirectlyAhead,  secs: 2.0, factor: 0.5 },
            PowerUpKind::BlueShell  => Attack { target: Target::Leader,         secs: 3.0, factor: 0.5 },
            PowerUpKind::Banana     => Attack { target: Target::DirectlyBehind, secs: 1.5, factor: 0.5 },
            PowerUpKind::Shield     => Protect { secs: 10.0 },
            PowerUpKind::Turbo      => Boost { secs: 4.0, factor: 1.3 },
            PowerUpKind::Nitro      => Boost { secs: 2.0, factor: 1.5 },
            PowerUpKind::Ghost      => Protect { secs: 3.0 },
            PowerUpKind::Radar      => Nothing,
            PowerUpKind::FuelBoost  => Refuel(25.0),
            PowerUpKind::TireRepair => Repair(30.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::Lightning  => "lightning",
            PowerUpKind::RedShell   => "red_shell",
            PowerUpKind::BlueShell  => "blue_shell",
            PowerUpKind::Banana     => "banana",
            PowerUpKind::Shield     => "shield",
            PowerUpKind::Turbo      => "turbo",
            PowerUpKind::Nitro      => "nitro",
            PowerUpKind::Ghost      => "ghost",
            PowerUpKind::Radar      => "radar",
            PowerUpKind::FuelBoost  => "fuel_boost",
            PowerUpKind::TireRepair => "tire_repair",
        }
    }

    /// True for items that land on other cars.
    pub fn is_offensive(self) -> bool {
        matches!(self.delivery(), Delivery::Attack { .. })
    }
}

impl fmt::Display for PowerUpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Rank tiers ────────────────────────────────────────────────────────────────

/// Position bucket that picks the weighted item table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RankTier {
    Leader,
    Front,
    Middle,
    Rear,
    Last,
}

impl RankTier {
    /// `rank` is 1-based.  Last place outranks front, so P2 of two is `Last`;
    /// `Rear` needs at least four cars.
    pub fn of(rank: u32, total: u32) -> Self {
        if rank <= 1 {
            RankTier::Leader
        } else if rank >= total {
            RankTier::Last
        } else if rank == 2 {
            RankTier::Front
        } else if rank + 1 == total {
            RankTier::Rear
        } else {
            RankTier::Middle
        }
    }

    /// Leaders skew defensive, trailing cars skew offensive.
    pub fn weights(self) -> &'static [(PowerUpKind, u32)] {
        use PowerUpKind::*;
        match self {
            RankTier::Leader => &[
                (Shield, 30), (Banana, 25), (FuelBoost, 20), (TireRepair, 15), (Turbo, 10),
            ],
            RankTier::Front => &[
                (Shield, 20), (Turbo, 20), (RedShell, 15), (Banana, 15), (FuelBoost, 15),
                (Nitro, 15),
            ],
            RankTier::Middle => &[
                (RedShell, 20), (Turbo, 20), (Lightning, 15), (Shield, 15), (Nitro, 15),
                (Banana, 15),
            ],
            RankTier::Rear => &[
                (Lightning, 25), (BlueShell, 20), (Nitro, 20), (Turbo, 15), (RedShell, 10),
                (Radar, 10),
            ],
            RankTier::Last => &[
                (BlueShell, 30), (Lightning, 25), (Nitro, 20), (Turbo, 15), (RedShell, 10),
            ],
        }
    }

    fn draw(self, rng: &mut RaceRng) -> PowerUpKind {
        let table = self.weights();
        let total: u32 = table.iter().map(|&(_, w)| w).sum();
        let mut roll = rng.gen_range(0..total);
        for &(kind, weight) in table {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        table[table.len() - 1].0
    }
}

// ── Effects ───────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectKind {
    /// Multiplies target speed by `magnitude`.
    Speed,
    Protection,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub source:         PowerUpKind,
    pub kind:           EffectKind,
    pub remaining_secs: f64,
    pub magnitude:      f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub id:           PickupId,
    /// In-lap progress, `[0, 1)`.
    pub progress:     f64,
    pub available:    bool,
    pub respawn_secs: f64,
}

/// What happened when a car used an item.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemUse {
    pub user:    CarId,
    pub item:    PowerUpKind,
    /// Cars that received an offensive effect.
    pub hit:     Vec<CarId>,
    /// Targets that were protected and shrugged it off.
    pub blocked: Vec<CarId>,
}

// ── PowerUpSystem ─────────────────────────────────────────────────────────────

pub struct PowerUpSystem {
    pickups:       Vec<Pickup>,
    inventories:   Vec<Vec<PowerUpKind>>,
    effects:       Vec<Vec<ActiveEffect>>,
    radius:        f64,
    respawn_secs:  f64,
    inventory_cap: usize,
}

impl PowerUpSystem {
    /// Standard layout: [`PICKUP_COUNT`] pickups centred in equal slices of
    /// the lap.
    pub fn new(car_count: usize) -> Self {
        Self::with_pickups(car_count, PICKUP_COUNT)
    }

    pub fn with_pickups(car_count: usize, pickup_count: usize) -> Self {
        let spacing = 1.0 / pickup_count.max(1) as f64;
        let pickups = (0..pickup_count)
            .map(|i| Pickup {
                id:           PickupId(i as u16),
                progress:     (i as f64 + 0.5) * spacing,
                available:    true,
                respawn_secs: 0.0,
            })
            .collect();
        Self {
            pickups,
            inventories:   vec![Vec::new(); car_count],
            effects:       vec![Vec::new(); car_count],
            radius:        COLLECTION_RADIUS,
            respawn_secs:  RESPAWN_SECS,
            inventory_cap: INVENTORY_CAP,
        }
    }

    #[inline]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn inventory(&self, car: CarId) -> EffectsResult<&[PowerUpKind]> {
        self.inventories
            .get(car.index())
            .map(Vec::as_slice)
            .ok_or(EffectsError::UnknownCar(car))
    }

    pub fn effects(&self, car: CarId) -> EffectsResult<&[ActiveEffect]> {
        self.effects
            .get(car.index())
            .map(Vec::as_slice)
            .ok_or(EffectsError::UnknownCar(car))
    }

    /// Put `item` in `car`'s inventory.  Returns `false` when full.
    pub fn grant(&mut self, car: CarId, item: PowerUpKind) -> EffectsResult<bool> {
        let cap = self.inventory_cap;
        let inventory = self
            .inventories
            .get_mut(car.index())
            .ok_or(EffectsError::UnknownCar(car))?;
        if inventory.len() >= cap {
            return Ok(false);
        }
        inventory.push(item);
        Ok(true)
    }

    /// Collect the first available pickup within reach of `progress`.
    ///
    /// The pickup is consumed even when the inventory is full; the item is
    /// only granted if there is room.  `rank` is 1-based.
    pub fn check_collection(
        &mut self,
        car:      CarId,
        progress: f64,
        rank:     u32,
        total:    u32,
        rng:      &mut RaceRng,
    ) -> EffectsResult<Option<PowerUpKind>> {
        if car.index() >= self.inventories.len() {
            return Err(EffectsError::UnknownCar(car));
        }
        let radius = self.radius;
        let Some(pickup) = self
            .pickups
            .iter_mut()
            .find(|p| p.available && wrapped_gap(p.progress, progress) < radius)
        else {
            return Ok(None);
        };
        pickup.available = false;
        pickup.respawn_secs = self.respawn_secs;
        let pickup_id = pickup.id;

        let item = RankTier::of(rank, total).draw(rng);
        if self.grant(car, item)? {
            debug!("{car} collected {item} from pickup {pickup_id}");
            Ok(Some(item))
        } else {
            Ok(None)
        }
    }

    /// Use the first item in `car`'s inventory.
    ///
    /// `order` is the current running order, leader first.  Instant items
    /// act on `state`, the user's own car.
    pub fn use_item(
        &mut self,
        car:   CarId,
        state: &mut CarState,
        order: &[CarId],
    ) -> EffectsResult<Option<ItemUse>> {
        let inventory = self
            .inventories
            .get_mut(car.index())
            .ok_or(EffectsError::UnknownCar(car))?;
        if inventory.is_empty() {
            return Ok(None);
        }
        let item = inventory.remove(0);
        let mut outcome = ItemUse { user: car, item, hit: Vec::new(), blocked: Vec::new() };

        match item.delivery() {
            Delivery::Attack { target, secs, factor } => {
                for victim in targets(car, order, target) {
                    if self.is_protected(victim)? {
                        outcome.blocked.push(victim);
                        continue;
                    }
                    self.push_effect(victim, ActiveEffect {
                        source:         item,
                        kind:           EffectKind::Speed,
                        remaining_secs: secs,
                        magnitude:      factor,
                    })?;
                    outcome.hit.push(victim);
                }
            }
            Delivery::Boost { secs, factor } => self.push_effect(car, ActiveEffect {
                source:         item,
                kind:           EffectKind::Speed,
                remaining_secs: secs,
                magnitude:      factor,
            })?,
            Delivery::Protect { secs } => self.push_effect(car, ActiveEffect {
                source:         item,
                kind:           EffectKind::Protection,
                remaining_secs: secs,
                magnitude:      1.0,
            })?,
            Delivery::Refuel(amount) => state.adjust_fuel(amount),
            Delivery::Repair(amount) => state.adjust_tire_wear(-amount),
            Delivery::Nothing => {}
        }

        debug!("{car} used {item}, hit {:?}, blocked {:?}", outcome.hit, outcome.blocked);
        Ok(Some(outcome))
    }

    fn push_effect(&mut self, car: CarId, effect: ActiveEffect) -> EffectsResult<()> {
        self.effects
            .get_mut(car.index())
            .ok_or(EffectsError::UnknownCar(car))?
            .push(effect);
        Ok(())
    }

    /// Product of every active speed effect on `car`.
    pub fn speed_modifier(&self, car: CarId) -> EffectsResult<f64> {
        Ok(self
            .effects(car)?
            .iter()
            .filter(|e| e.kind == EffectKind::Speed)
            .map(|e| e.magnitude)
            .product())
    }

    pub fn is_protected(&self, car: CarId) -> EffectsResult<bool> {
        Ok(self.effects(car)?.iter().any(|e| e.kind == EffectKind::Protection))
    }

    /// Advance effect timers and pickup respawns by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        for effects in &mut self.effects {
            effects.retain_mut(|e| {
                e.remaining_secs -= dt;
                e.remaining_secs > 0.0
            });
        }
        for pickup in self.pickups.iter_mut().filter(|p| !p.available) {
            pickup.respawn_secs -= dt;
            if pickup.respawn_secs <= 0.0 {
                pickup.available = true;
                pickup.respawn_secs = 0.0;
            }
        }
    }
}

fn targets(user: CarId, order: &[CarId], target: Target) -> Vec<CarId> {
    let Some(pos) = order.iter().position(|&c| c == user) else {
        return Vec::new();
    };
    match target {
        Target::AllAhead => order[..pos].to_vec(),
        Target::DirectlyAhead => pos.checked_sub(1).map(|i| vec![order[i]]).unwrap_or_default(),
        Target::Leader if pos > 0 => vec![order[0]],
        Target::Leader => Vec::new(),
        Target::DirectlyBehind => order.get(pos + 1).map(|&c| vec![c]).unwrap_or_default(),
    }
}

// ── Strategy ──────────────────────────────────────────────────────────────────

/// How worthwhile it is to use `item` now.  `rank` is 1-based; gaps are
/// metres to the cars ahead and behind.
pub fn item_value(item: PowerUpKind, rank: u32, total: u32, gap_ahead: f64, gap_behind: f64) -> f64 {
    let rank_fraction = rank as f64 / total.max(1) as f64;
    match item {
        PowerUpKind::BlueShell if rank > 1 => 1.0 - 1.0 / rank as f64,
        PowerUpKind::BlueShell => 0.1,
        PowerUpKind::Lightning => rank_fraction + if rank > 2 { 0.4 } else { 0.0 },
        PowerUpKind::Shield => 1.0 - rank_fraction + if gap_behind < 30.0 { 0.3 } else { 0.0 },
        PowerUpKind::Turbo => 0.7,
        PowerUpKind::RedShell if gap_ahead < 50.0 => 0.8,
        _ => 0.5,
    }
}

/// Most valuable item in `inventory` with its index and value.
pub fn best_item(
    inventory:  &[PowerUpKind],
    rank:       u32,
    total:      u32,
    gap_ahead:  f64,
    gap_behind: f64,
) -> Option<(usize, PowerUpKind, f64)> {
    inventory
        .iter()
        .enumerate()
        .map(|(i, &item)| (i, item, item_value(item, rank, total, gap_ahead, gap_behind)))
        .fold(None, |best, cur| match best {
            Some(b) if b.2 >= cur.2 => Some(b),
            _ => Some(cur),
        })
}
