//! Unit tests for race-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CarId, PickupId, SegmentId};

    #[test]
    fn index_roundtrip() {
        let id = CarId(7);
        assert_eq!(id.index(), 7);
        assert_eq!(CarId::try_from(7usize).unwrap(), id);
    }

    #[test]
    fn pickup_id_rejects_overflow() {
        assert!(PickupId::try_from(70_000usize).is_err());
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(CarId::INVALID.0, u32::MAX);
        assert_eq!(SegmentId::INVALID.0, u16::MAX);
        assert_eq!(CarId::default(), CarId::INVALID);
    }

    #[test]
    fn range_is_dense() {
        let ids: Vec<CarId> = CarId::range(3).collect();
        assert_eq!(ids, vec![CarId(0), CarId(1), CarId(2)]);
    }

    #[test]
    fn display() {
        assert_eq!(CarId(3).to_string(), "CarId(3)");
    }
}

#[cfg(test)]
mod time {
    use crate::{RaceClock, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(9)), 0);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = RaceClock::new(0.25);
        assert_eq!(clock.elapsed_secs(), 0.0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_secs(), 0.5);
        assert_eq!(clock.current_tick, Tick(2));
    }

    #[test]
    fn ticks_for_secs_rounds_up() {
        let clock = RaceClock::new(0.1);
        assert_eq!(clock.ticks_for_secs(0.5), 5);
        assert_eq!(clock.ticks_for_secs(0.51), 6);
        assert_eq!(clock.ticks_for_secs(0.0), 0);
    }

    #[test]
    fn display_shows_minutes() {
        let mut clock = RaceClock::new(1.0);
        for _ in 0..75 {
            clock.advance();
        }
        assert_eq!(clock.to_string(), "T75 (1:15.000)");
    }
}

#[cfg(test)]
mod config {
    use crate::{RaceConfig, Tick};

    #[test]
    fn default_is_valid() {
        let cfg = RaceConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.end_tick(), Tick(cfg.max_ticks));
    }

    #[test]
    fn rejects_zero_laps() {
        let cfg = RaceConfig { laps: 0, ..RaceConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_tick() {
        let cfg = RaceConfig { tick_secs: 0.0, ..RaceConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = RaceConfig { tick_secs: f64::NAN, ..RaceConfig::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{CarId, CarRng, RaceRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = CarRng::new(12345, CarId(0));
        let mut r2 = CarRng::new(12345, CarId(0));
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_cars_differ() {
        let mut r0 = CarRng::new(1, CarId(0));
        let mut r1 = CarRng::new(1, CarId(1));
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b);
    }

    #[test]
    fn child_streams_are_reproducible() {
        let mut a = RaceRng::new(9);
        let mut b = RaceRng::new(9);
        let mut ca = a.child(1);
        let mut cb = b.child(1);
        assert_eq!(ca.random::<u64>(), cb.random::<u64>());
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = RaceRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(rng.gen_bool(7.5));
    }
}
