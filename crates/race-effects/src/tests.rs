//! Unit tests for race-effects.

use race_car::{CarState, SectionKind};
use race_core::{CarId, RaceRng};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn row(car: u32, progress: f64, speed: f64, section: SectionKind) -> CollisionInput {
    CollisionInput { car: CarId(car), progress, speed, section, protected: false }
}

#[cfg(test)]
mod gap_tests {
    use super::*;

    #[test]
    fn wraps_at_the_line() {
        assert!((wrapped_gap(0.999, 0.001) - 0.002).abs() < 1e-12);
        assert!((wrapped_gap(0.25, 0.75) - 0.5).abs() < 1e-12);
        assert_eq!(wrapped_gap(0.4, 0.4), 0.0);
    }
}

// ── Collisions ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod collision_tests {
    use super::*;
    use crate::collision::COOLDOWN_TICKS;

    #[test]
    fn pair_is_unordered() {
        assert_eq!(CarPair::new(CarId(3), CarId(1)), CarPair::new(CarId(1), CarId(3)));
        assert_eq!(CarPair::new(CarId(3), CarId(1)).cars(), (CarId(1), CarId(3)));
    }

    #[test]
    fn distant_cars_never_collide() {
        let mut resolver = CollisionResolver::new(2);
        let mut rng = RaceRng::new(1);
        let cars = [
            row(0, 0.10, 300.0, SectionKind::Chicane),
            row(1, 0.11, 100.0, SectionKind::Chicane),
        ];
        for _ in 0..1000 {
            assert!(resolver.detect(&cars, &mut rng).is_empty());
        }
    }

    #[test]
    fn corner_rate_matches_probability() {
        // Equal speeds in a corner: p = 0.1 × 1.5.
        let cars = [
            row(0, 0.5, 200.0, SectionKind::Corner),
            row(1, 0.5, 200.0, SectionKind::Corner),
        ];
        let trials = 20_000;
        let mut rng = RaceRng::new(42);
        let mut hits = 0;
        for _ in 0..trials {
            let mut resolver = CollisionResolver::new(2);
            hits += resolver.detect(&cars, &mut rng).len();
        }
        let rate = hits as f64 / trials as f64;
        assert!((rate - 0.15).abs() < 0.015, "rate {rate}");
    }

    #[test]
    fn seeded_rolls_are_reproducible() {
        let cars = [
            row(0, 0.5, 210.0, SectionKind::Corner),
            row(1, 0.5, 200.0, SectionKind::Corner),
        ];
        let run = |seed| {
            let mut rng = RaceRng::new(seed);
            (0..200)
                .map(|_| CollisionResolver::new(2).detect(&cars, &mut rng).len())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn cooldown_blocks_repeat_events() {
        let cars = [
            row(0, 0.3, 260.0, SectionKind::Chicane),
            row(1, 0.3, 200.0, SectionKind::Chicane),
        ];
        let mut resolver = CollisionResolver::new(2);
        let mut rng = RaceRng::new(5);
        let mut last_hit: Option<usize> = None;
        let mut events = 0;
        for tick in 0..2000 {
            let hits = resolver.detect(&cars, &mut rng);
            if !hits.is_empty() {
                if let Some(prev) = last_hit {
                    assert!(tick - prev >= COOLDOWN_TICKS as usize);
                }
                last_hit = Some(tick);
                events += 1;
            }
            resolver.tick_cooldowns();
        }
        assert!(events > 10);
        assert_eq!(resolver.stats(CarId(0)).unwrap().at_fault, events as u32);
        assert_eq!(resolver.stats(CarId(1)).unwrap().victim, events as u32);
    }

    #[test]
    fn event_classification() {
        let mut rng = RaceRng::new(3);
        let mut found = None;
        for _ in 0..500 {
            let mut resolver = CollisionResolver::new(2);
            let cars = [
                row(0, 0.2, 150.0, SectionKind::Straight),
                row(1, 0.2, 180.0, SectionKind::Straight),
            ];
            if let Some(e) = resolver.detect(&cars, &mut rng).pop() {
                found = Some(e);
                break;
            }
        }
        let event = found.expect("some roll should succeed");
        assert_eq!(event.at_fault, CarId(1));
        assert_eq!(event.kind, CollisionKind::RearEnd);
        assert!((0.2..=0.8).contains(&event.severity));
        assert!((event.at_fault_penalty / event.victim_penalty - 1.5 / 0.7).abs() < 1e-9);
    }

    #[test]
    fn apply_skips_protected_cars() {
        let resolver = CollisionResolver::new(2);
        let event = CollisionEvent {
            at_fault:           CarId(0),
            victim:             CarId(1),
            kind:               CollisionKind::SideSwipe,
            section:            SectionKind::Straight,
            severity:           0.5,
            at_fault_penalty:   1.5,
            victim_penalty:     0.7,
            at_fault_protected: false,
            victim_protected:   true,
        };
        let mut speeds = [200.0, 180.0];
        resolver.apply(&event, &mut speeds).unwrap();
        assert!((speeds[0] - 170.0).abs() < 1e-9);
        assert_eq!(speeds[1], 180.0);
        assert!(resolver.apply(&event, &mut [1.0]).is_err());
    }

    #[test]
    fn unknown_rows_are_left_out() {
        let good = [
            row(0, 0.4, 260.0, SectionKind::Chicane),
            row(1, 0.4, 200.0, SectionKind::Chicane),
        ];
        let with_stray = [good[0], row(7, 0.4, 230.0, SectionKind::Chicane), good[1]];
        let mut hits = 0;
        for seed in 0..200 {
            let expected = CollisionResolver::new(2).detect(&good, &mut RaceRng::new(seed));
            let actual = CollisionResolver::new(2).detect(&with_stray, &mut RaceRng::new(seed));
            assert_eq!(actual, expected, "seed {seed}");
            hits += actual.len();
        }
        assert!(hits > 0);
    }


    #[test]
    fn risk_levels() {
        let resolver = CollisionResolver::new(3);
        let alone = [row(0, 0.1, 200.0, SectionKind::Straight), row(1, 0.5, 200.0, SectionKind::Straight)];
        assert_eq!(resolver.collision_risk(CarId(0), &alone).unwrap().level, RiskLevel::None);

        let close = [
            row(0, 0.100, 250.0, SectionKind::Corner),
            row(1, 0.101, 200.0, SectionKind::Corner),
            row(2, 0.102, 190.0, SectionKind::Corner),
        ];
        let risk = resolver.collision_risk(CarId(0), &close).unwrap();
        assert_eq!(risk.nearby, 2);
        assert_eq!(risk.factor, 1.0);
        assert_eq!(risk.level, RiskLevel::High);
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod powerup_tests {
    use super::*;

    #[test]
    fn pickups_are_evenly_spaced() {
        let system = PowerUpSystem::new(2);
        let progress: Vec<f64> = system.pickups().iter().map(|p| p.progress).collect();
        assert_eq!(progress.len(), 8);
        assert_eq!(progress[0], 0.0625);
        assert_eq!(progress[7], 0.9375);
    }

    #[test]
    fn collection_consumes_and_respawns() {
        let mut system = PowerUpSystem::new(2);
        let mut rng = RaceRng::new(1);
        let item = system.check_collection(CarId(0), 0.0625, 1, 2, &mut rng).unwrap();
        assert!(item.is_some());
        assert!(!system.pickups()[0].available);
        // Gone until the respawn timer runs out.
        assert_eq!(system.check_collection(CarId(1), 0.0625, 2, 2, &mut rng).unwrap(), None);
        system.tick(4.9);
        assert!(!system.pickups()[0].available);
        system.tick(0.2);
        assert!(system.pickups()[0].available);
    }

    #[test]
    fn out_of_radius_collects_nothing() {
        let mut system = PowerUpSystem::new(1);
        let mut rng = RaceRng::new(1);
        assert_eq!(system.check_collection(CarId(0), 0.07, 1, 1, &mut rng).unwrap(), None);
        assert!(system.pickups().iter().all(|p| p.available));
    }

    #[test]
    fn inventory_is_capped() {
        let mut system = PowerUpSystem::new(1);
        assert!(system.grant(CarId(0), PowerUpKind::Turbo).unwrap());
        assert!(system.grant(CarId(0), PowerUpKind::Shield).unwrap());
        assert!(!system.grant(CarId(0), PowerUpKind::Nitro).unwrap());
        let mut rng = RaceRng::new(1);
        assert_eq!(system.check_collection(CarId(0), 0.1875, 1, 1, &mut rng).unwrap(), None);
        assert!(!system.pickups()[1].available);
        assert_eq!(system.inventory(CarId(0)).unwrap().len(), 2);
    }

    #[test]
    fn tiers_by_rank() {
        assert_eq!(RankTier::of(1, 5), RankTier::Leader);
        assert_eq!(RankTier::of(2, 5), RankTier::Front);
        assert_eq!(RankTier::of(3, 5), RankTier::Middle);
        assert_eq!(RankTier::of(4, 5), RankTier::Rear);
        assert_eq!(RankTier::of(5, 5), RankTier::Last);

        assert_eq!(RankTier::of(1, 2), RankTier::Leader);
        assert_eq!(RankTier::of(2, 2), RankTier::Last);
        assert_eq!(RankTier::of(2, 3), RankTier::Front);
        assert_eq!(RankTier::of(3, 3), RankTier::Last);
        assert_eq!(RankTier::of(3, 4), RankTier::Rear);
        assert_eq!(RankTier::of(1, 1), RankTier::Leader);
        for tier in [RankTier::Leader, RankTier::Front, RankTier::Middle, RankTier::Rear, RankTier::Last] {
            assert_eq!(tier.weights().iter().map(|w| w.1).sum::<u32>(), 100);
        }
    }

    #[test]
    fn leader_never_draws_blue_shell() {
        let mut rng = RaceRng::new(11);
        for _ in 0..500 {
            let mut system = PowerUpSystem::new(1);
            if let Some(item) = system.check_collection(CarId(0), 0.5625, 1, 5, &mut rng).unwrap() {
                assert_ne!(item, PowerUpKind::BlueShell);
            }
        }
    }

    #[test]
    fn boosts_compose_multiplicatively_and_expire() {
        let mut system = PowerUpSystem::new(1);
        let mut state = CarState::race_start();
        system.grant(CarId(0), PowerUpKind::Turbo).unwrap();
        system.grant(CarId(0), PowerUpKind::Nitro).unwrap();
        system.use_item(CarId(0), &mut state, &[CarId(0)]).unwrap();
        system.use_item(CarId(0), &mut state, &[CarId(0)]).unwrap();
        assert!((system.speed_modifier(CarId(0)).unwrap() - 1.95).abs() < 1e-9);
        system.tick(2.5);
        assert!((system.speed_modifier(CarId(0)).unwrap() - 1.3).abs() < 1e-9);
        system.tick(2.0);
        assert_eq!(system.speed_modifier(CarId(0)).unwrap(), 1.0);
        assert!(system.inventory(CarId(0)).unwrap().is_empty());
    }

    #[test]
    fn instant_items_touch_own_state() {
        let mut system = PowerUpSystem::new(1);
        let mut state = CarState::race_start();
        state.set_fuel(50.0);
        state.set_tire_wear(20.0);
        system.grant(CarId(0), PowerUpKind::FuelBoost).unwrap();
        system.grant(CarId(0), PowerUpKind::TireRepair).unwrap();
        system.use_item(CarId(0), &mut state, &[CarId(0)]).unwrap();
        system.use_item(CarId(0), &mut state, &[CarId(0)]).unwrap();
        assert_eq!(state.fuel(), 75.0);
        assert_eq!(state.tire_wear(), 0.0);
        assert!(system.effects(CarId(0)).unwrap().is_empty());
        assert_eq!(system.use_item(CarId(0), &mut state, &[CarId(0)]).unwrap(), None);
    }

    #[test]
    fn offensive_items_find_their_targets() {
        let order = [CarId(2), CarId(0), CarId(1), CarId(3)];
        let mut system = PowerUpSystem::new(4);
        let mut state = CarState::race_start();

        system.grant(CarId(1), PowerUpKind::Lightning).unwrap();
        let used = system.use_item(CarId(1), &mut state, &order).unwrap().unwrap();
        assert_eq!(used.hit, vec![CarId(2), CarId(0)]);

        system.grant(CarId(3), PowerUpKind::BlueShell).unwrap();
        let used = system.use_item(CarId(3), &mut state, &order).unwrap().unwrap();
        assert_eq!(used.hit, vec![CarId(2)]);
        assert!((system.speed_modifier(CarId(2)).unwrap() - 0.35).abs() < 1e-9);

        system.grant(CarId(0), PowerUpKind::Banana).unwrap();
        let used = system.use_item(CarId(0), &mut state, &order).unwrap().unwrap();
        assert_eq!(used.hit, vec![CarId(1)]);
        assert_eq!(system.speed_modifier(CarId(1)).unwrap(), 0.5);
        assert_eq!(system.speed_modifier(CarId(3)).unwrap(), 1.0);
    }

    #[test]
    fn shield_blocks_attacks() {
        let order = [CarId(0), CarId(1)];
        let mut system = PowerUpSystem::new(2);
        let mut state = CarState::race_start();
        system.grant(CarId(0), PowerUpKind::Shield).unwrap();
        system.use_item(CarId(0), &mut state, &order).unwrap();
        assert!(system.is_protected(CarId(0)).unwrap());

        system.grant(CarId(1), PowerUpKind::RedShell).unwrap();
        let used = system.use_item(CarId(1), &mut state, &order).unwrap().unwrap();
        assert!(used.hit.is_empty());
        assert_eq!(used.blocked, vec![CarId(0)]);
        assert_eq!(system.speed_modifier(CarId(0)).unwrap(), 1.0);

        system.tick(10.0);
        assert!(!system.is_protected(CarId(0)).unwrap());
    }

    #[test]
    fn unknown_car_is_an_error() {
        let system = PowerUpSystem::new(1);
        assert_eq!(system.speed_modifier(CarId(1)), Err(EffectsError::UnknownCar(CarId(1))));
        assert!(system.is_protected(CarId(9)).is_err());
    }

    #[test]
    fn item_values() {
        assert!((item_value(PowerUpKind::BlueShell, 4, 5, 100.0, 100.0) - 0.75).abs() < 1e-9);
        assert_eq!(item_value(PowerUpKind::BlueShell, 1, 5, 100.0, 100.0), 0.1);
        assert!((item_value(PowerUpKind::Lightning, 4, 5, 100.0, 100.0) - 1.2).abs() < 1e-9);
        assert!((item_value(PowerUpKind::Shield, 1, 5, 100.0, 10.0) - 1.1).abs() < 1e-9);
        assert_eq!(item_value(PowerUpKind::RedShell, 3, 5, 20.0, 100.0), 0.8);
        assert_eq!(item_value(PowerUpKind::Radar, 3, 5, 20.0, 100.0), 0.5);

        let best = best_item(&[PowerUpKind::Radar, PowerUpKind::Turbo], 2, 5, 100.0, 100.0);
        assert_eq!(best, Some((1, PowerUpKind::Turbo, 0.7)));
        assert_eq!(best_item(&[], 1, 5, 0.0, 0.0), None);
    }
}

// ── Weapons ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod weapon_tests {
    use super::*;
    use crate::weapon::{AMMO, RANGE};

    #[test]
    fn fire_rate_is_enforced() {
        let mut weapons = WeaponSystem::new(1);
        assert!(weapons.attempt_fire(CarId(0), 1.0).unwrap());
        assert!(!weapons.attempt_fire(CarId(0), 1.1).unwrap());
        assert!(!weapons.attempt_fire(CarId(0), 1.19).unwrap());
        assert!(weapons.attempt_fire(CarId(0), 1.2).unwrap());
        assert_eq!(weapons.weapon(CarId(0)).unwrap().ammo(), 48);
        assert_eq!(weapons.stats(CarId(0)).unwrap().shots, 2);
    }

    #[test]
    fn empty_gun_never_fires() {
        let mut weapons = WeaponSystem::new(1);
        for i in 0..AMMO {
            assert!(weapons.attempt_fire(CarId(0), i as f64).unwrap());
        }
        assert_eq!(weapons.weapon(CarId(0)).unwrap().ammo(), 0);
        assert!(!weapons.attempt_fire(CarId(0), 1_000.0).unwrap());
    }

    #[test]
    fn targets_nearest_car_strictly_ahead() {
        let weapons = WeaponSystem::new(4);
        let positions = [
            (CarId(0), 2.50),
            (CarId(1), 2.55),
            (CarId(2), 2.52),
            (CarId(3), 2.45),
        ];
        let (target, distance) = weapons.find_target_ahead(CarId(0), &positions).unwrap().unwrap();
        assert_eq!(target, CarId(2));
        assert!((distance - 0.02).abs() < 1e-9);
        // Nothing ahead of the leader.
        assert_eq!(weapons.find_target_ahead(CarId(1), &positions).unwrap(), None);
    }

    #[test]
    fn lapped_cars_are_far_ahead() {
        let weapons = WeaponSystem::new(2);
        // Same in-lap spot, one lap apart: a full lap away, out of search.
        let positions = [(CarId(0), 1.40), (CarId(1), 2.41)];
        assert_eq!(weapons.find_target_ahead(CarId(0), &positions).unwrap(), None);
        // Across the line on the same lap count boundary.
        let positions = [(CarId(0), 1.99), (CarId(1), 2.01)];
        let (target, distance) = weapons.find_target_ahead(CarId(0), &positions).unwrap().unwrap();
        assert_eq!(target, CarId(1));
        assert!((distance - 0.02).abs() < 1e-9);
    }

    #[test]
    fn range_boundary() {
        let mut weapons = WeaponSystem::new(2);
        let at_edge = weapons.check_hit(CarId(0), Some((CarId(1), RANGE)), false).unwrap();
        assert!(matches!(at_edge, FireOutcome::Hit(HitEvent { target: CarId(1), .. })));

        let beyond = weapons.check_hit(CarId(0), Some((CarId(1), RANGE + 0.001)), false).unwrap();
        assert_eq!(beyond, FireOutcome::NoTargetInRange);
        assert_eq!(weapons.check_hit(CarId(0), None, false).unwrap(), FireOutcome::NoTargetInRange);
        assert_eq!(weapons.stats(CarId(0)).unwrap().hits, 1);
    }

    #[test]
    fn hit_damage_is_floored() {
        let gun = Weapon::machine_gun();
        assert!((gun.apply_hit(200.0) - 170.0).abs() < 1e-9);
        assert_eq!(gun.apply_hit(11.0), 10.0);
        assert_eq!(gun.apply_hit(5.0), 5.0);
    }

    #[test]
    fn markers_expire() {
        let mut weapons = WeaponSystem::new(2);
        weapons.check_hit(CarId(0), Some((CarId(1), 0.01)), true).unwrap();
        assert_eq!(weapons.markers().len(), 1);
        weapons.tick(0.3);
        assert_eq!(weapons.markers().len(), 1);
        weapons.tick(0.3);
        assert!(weapons.markers().is_empty());
    }
}
