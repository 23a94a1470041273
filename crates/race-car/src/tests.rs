//! Unit tests for race-car.

use race_core::{CarId, CarRng};

use crate::*;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn profile(style: DriverStyle) -> CarProfile {
    CarProfile::new(300.0, 4.0, 0.8, 10.0, style).unwrap()
}

fn car(style: DriverStyle) -> Car {
    Car::new(CarId(0), "Test", profile(style)).unwrap()
}

fn rng() -> CarRng {
    CarRng::new(7, CarId(0))
}

#[cfg(test)]
mod profile_tests {
    use super::*;

    #[test]
    fn accepts_range_boundaries() {
        assert!(CarProfile::new(150.0, 2.0, 0.0, 5.0, DriverStyle::Balanced).is_ok());
        assert!(CarProfile::new(400.0, 10.0, 1.0, 20.0, DriverStyle::Balanced).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(CarProfile::new(149.9, 4.0, 0.5, 10.0, DriverStyle::Balanced).is_err());
        assert!(CarProfile::new(300.0, 1.0, 0.5, 10.0, DriverStyle::Balanced).is_err());
        assert!(CarProfile::new(300.0, 4.0, 1.2, 10.0, DriverStyle::Balanced).is_err());
        assert!(CarProfile::new(300.0, 4.0, 0.5, 25.0, DriverStyle::Balanced).is_err());
    }

    #[test]
    fn rejects_nan() {
        let err = CarProfile::new(f64::NAN, 4.0, 0.5, 10.0, DriverStyle::Balanced).unwrap_err();
        assert!(matches!(err, CarError::OutOfRange { field: "top_speed_kmh", .. }));
    }

    #[test]
    fn car_rejects_empty_name() {
        assert!(matches!(
            Car::new(CarId(0), "  ", profile(DriverStyle::Balanced)),
            Err(CarError::EmptyName)
        ));
    }
}

#[cfg(test)]
mod style_tests {
    use super::*;
    use crate::style::SpeedInputs;

    fn inputs(optimal: f64, is_straight: bool) -> SpeedInputs {
        SpeedInputs { optimal, is_straight, effective_top: 250.0, risk_factor: 1.3 }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Aggressive".parse::<DriverStyle>().unwrap(), DriverStyle::Aggressive);
        assert_eq!(" chaotic ".parse::<DriverStyle>().unwrap(), DriverStyle::Chaotic);
        assert!("reckless".parse::<DriverStyle>().is_err());
    }

    #[test]
    fn table_rows_line_up_with_variants() {
        assert_eq!(DriverStyle::Aggressive.modifiers().risk_factor, 1.3);
        assert_eq!(DriverStyle::Conservative.modifiers().fuel_penalty, 1.1);
        assert_eq!(DriverStyle::Balanced.modifiers().speed_bonus, 1.0);
        assert_eq!(DriverStyle::Technical.modifiers().handling_penalty, 1.12);
        assert_eq!(DriverStyle::Chaotic.modifiers().risk_factor, 1.5);
    }

    #[test]
    fn conservative_undershoots_everywhere() {
        let mut r = rng();
        assert!((DriverStyle::Conservative.target_speed(&inputs(100.0, false), &mut r) - 92.0).abs() < 1e-9);
        assert!((DriverStyle::Conservative.target_speed(&inputs(100.0, true), &mut r) - 92.0).abs() < 1e-9);
    }

    #[test]
    fn aggressive_and_technical_cap_straights_at_top_speed() {
        let mut r = rng();
        assert_eq!(DriverStyle::Aggressive.target_speed(&inputs(400.0, true), &mut r), 250.0);
        assert_eq!(DriverStyle::Technical.target_speed(&inputs(400.0, true), &mut r), 250.0);
        assert_eq!(DriverStyle::Technical.target_speed(&inputs(80.0, false), &mut r), 80.0);
        let corner = DriverStyle::Aggressive.target_speed(&inputs(100.0, false), &mut r);
        assert!((corner - 100.0 * (0.95 + 1.3 * 0.05)).abs() < 1e-9);
    }

    #[test]
    fn chaotic_stays_within_its_band() {
        let mut r = rng();
        for _ in 0..500 {
            let v = DriverStyle::Chaotic.target_speed(&inputs(100.0, false), &mut r);
            assert!((85.0..=115.0).contains(&v), "got {v}");
        }
    }
}

#[cfg(test)]
mod state_tests {
    use super::*;

    #[test]
    fn setters_clamp() {
        let mut s = CarState::race_start();
        s.set_fuel(140.0);
        assert_eq!(s.fuel(), 100.0);
        s.adjust_fuel(-250.0);
        assert_eq!(s.fuel(), 0.0);
        s.set_tire_wear(-3.0);
        assert_eq!(s.tire_wear(), 0.0);
        s.adjust_tire_wear(180.0);
        assert_eq!(s.tire_wear(), 100.0);
        s.set_speed(-20.0);
        assert_eq!(s.speed(), 0.0);
        s.set_speed(f64::NAN);
        assert_eq!(s.speed(), 0.0);
    }

    #[test]
    fn travel_never_goes_backwards() {
        let mut s = CarState::race_start();
        s.travel(12.0);
        s.travel(-5.0);
        s.travel(f64::INFINITY);
        assert_eq!(s.distance_m(), 12.0);
    }

    #[test]
    fn derived_values_follow_wear_and_fuel() {
        let mut c = car(DriverStyle::Balanced);
        assert_eq!(c.effective_top_speed(), 300.0);
        assert_eq!(c.effective_acceleration(), 4.0);
        c.state.set_tire_wear(100.0);
        assert_eq!(c.effective_top_speed(), 150.0);
        c.state.set_fuel(0.0);
        // Empty tank → lighter car → quicker 0–100.
        assert!(c.effective_acceleration() < 4.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut c = car(DriverStyle::Balanced);
        c.state.set_speed(200.0);
        c.state.set_fuel(3.0);
        c.standing.lap = 2;
        c.reset_for_race(16.0);
        assert_eq!(c.state.speed(), 0.0);
        assert_eq!(c.state.fuel(), 100.0);
        assert_eq!(c.state.distance_m(), 16.0);
        assert_eq!(c.standing.lap, 0);
        assert!(!c.is_finished());
    }

    #[test]
    fn best_lap_is_minimum() {
        let standing = Standing { lap_times: vec![61.0, 58.5, 60.2], ..Standing::default() };
        assert_eq!(standing.best_lap(), Some(58.5));
        assert_eq!(Standing::default().best_lap(), None);
    }
}

#[cfg(test)]
mod track_tests {
    use super::*;

    #[test]
    fn preset_lengths() {
        assert_eq!(Track::preset(TrackKind::Speed).length_m(), 4850.0);
        assert_eq!(Track::preset(TrackKind::Technical).segments().len(), 14);
    }

    #[test]
    fn locate_wraps_laps() {
        let track = Track::preset(TrackKind::Speed);
        let (seg, offset) = track.locate(1250.0);
        assert_eq!(seg.index(), 1);
        assert!((offset - 50.0).abs() < 1e-9);

        let (seg, offset) = track.locate(4860.0);
        assert_eq!(seg.index(), 0);
        assert!((offset - 10.0).abs() < 1e-9);
        assert_eq!(track.lap_of(4860.0), 1);
        assert!(track.lap_progress(4860.0) < 0.01);
        assert!((track.race_progress(9700.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn corner_optimal_speed() {
        let corner = Segment::corner(100.0, 90.0, 60.0);
        let expected = (0.8f64 * 9.81 * 60.0).sqrt() * 3.6 * 0.85;
        assert!((corner.optimal_speed(0.8) - expected).abs() < 1e-9);
        assert_eq!(Segment::corner(100.0, 0.0, 10_000.0).optimal_speed(1.0), 300.0);
        assert_eq!(Segment::straight(500.0).optimal_speed(0.1), 400.0);
    }

    #[test]
    fn section_classification() {
        assert_eq!(Segment::straight(100.0).section(), SectionKind::Straight);
        assert_eq!(Segment::corner(120.0, 180.0, 20.0).section(), SectionKind::Chicane);
        assert_eq!(Segment::corner(300.0, 90.0, 40.0).section(), SectionKind::LongCorner);
        assert_eq!(Segment::corner(150.0, 45.0, 80.0).section(), SectionKind::Corner);
    }

    #[test]
    fn rejects_bad_segments() {
        assert!(Track::new("Empty", TrackKind::Mixed, vec![]).is_err());
        assert!(Track::new("Zero", TrackKind::Mixed, vec![Segment::straight(0.0)]).is_err());
        assert!(Track::new("Flat", TrackKind::Mixed, vec![Segment::corner(50.0, 90.0, 0.0)]).is_err());
    }

    #[test]
    fn weather_parses() {
        assert_eq!("RAIN".parse::<Weather>().unwrap(), Weather::Rain);
        assert_eq!(Weather::Rain.effects().speed, 0.85);
        assert!("snow".parse::<Weather>().is_err());
    }
}

#[cfg(test)]
mod physics_tests {
    use super::*;

    #[test]
    fn acceleration_is_rate_limited() {
        let c = car(DriverStyle::Balanced);
        let next = advance(&c, &Segment::straight(1000.0), Weather::Clear, 200.0, 1.0);
        // 100 km/h in 4 s → 25 km/h per second.
        assert!((next.speed() - 25.0).abs() < 1e-9);
        assert!((next.distance_m() - 12.5 / 3.6).abs() < 1e-9);
    }

    #[test]
    fn braking_is_one_and_a_half_times_faster() {
        let mut c = car(DriverStyle::Balanced);
        c.state.set_speed(200.0);
        let next = advance(&c, &Segment::straight(1000.0), Weather::Clear, 0.0, 1.0);
        assert!((next.speed() - 162.5).abs() < 1e-9);
    }

    #[test]
    fn consumes_more_in_corners() {
        let mut c = car(DriverStyle::Balanced);
        c.state.set_speed(100.0);
        let straight = advance(&c, &Segment::straight(1000.0), Weather::Clear, 100.0, 1.0);
        let corner = advance(&c, &Segment::corner(1000.0, 90.0, 60.0), Weather::Clear, 100.0, 1.0);
        let fuel_straight = 100.0 - straight.fuel();
        let fuel_corner = 100.0 - corner.fuel();
        assert!((fuel_corner / fuel_straight - 1.3).abs() < 1e-6);
        assert!((corner.tire_wear() / straight.tire_wear() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn heat_wears_tires_faster_and_rain_slower() {
        let mut c = car(DriverStyle::Balanced);
        c.state.set_speed(200.0);
        let straight = Segment::straight(1000.0);
        let wear = |weather| advance(&c, &straight, weather, 200.0, 1.0).tire_wear();
        let clear = wear(Weather::Clear);
        assert!(clear > 0.0);
        assert!((wear(Weather::Hot) / clear - 1.2).abs() < 1e-9);
        assert!((wear(Weather::Rain) / clear - 0.8).abs() < 1e-9);
        assert!((wear(Weather::Fog) - clear).abs() < 1e-12);
    }

    #[test]
    fn invalid_dt_is_a_no_op() {
        let c = car(DriverStyle::Balanced);
        assert_eq!(advance(&c, &Segment::straight(10.0), Weather::Clear, 100.0, 0.0), c.state);
        assert_eq!(advance(&c, &Segment::straight(10.0), Weather::Clear, 100.0, f64::NAN), c.state);
    }

    #[test]
    fn invariants_hold_over_many_steps() {
        let track = Track::preset(TrackKind::Technical);
        let mut c = car(DriverStyle::Chaotic);
        let mut r = rng();
        for i in 0..20_000 {
            let segment = *track.segment_at(c.state.distance_m());
            let request = SpeedRequest {
                action_factor: if i % 7 == 0 { 1.25 } else { 0.9 },
                effect_factor: 1.0,
            };
            let target = target_speed(&c, &segment, track.weather, request, &mut r);
            c.state = advance(&c, &segment, track.weather, target, 0.1);
            let s = c.state;
            assert!((0.0..=100.0).contains(&s.fuel()));
            assert!((0.0..=100.0).contains(&s.tire_wear()));
            assert!(s.speed() >= 0.0);
        }
    }

    #[test]
    fn empty_tank_trends_to_low_fuel_cap() {
        let mut c = car(DriverStyle::Aggressive);
        c.state.set_fuel(0.0);
        c.state.set_speed(250.0);
        let straight = Segment::straight(100_000.0);
        let mut r = rng();
        let mut last = c.state.speed();
        for _ in 0..100 {
            let target = target_speed(&c, &straight, Weather::Clear, SpeedRequest::default(), &mut r);
            assert!(target <= LOW_FUEL_SPEED_CAP_KMH);
            c.state = advance(&c, &straight, Weather::Clear, target, 0.1);
            assert!(c.state.speed() <= last + 1e-9);
            assert_eq!(c.state.fuel(), 0.0);
            last = c.state.speed();
        }
        assert!((c.state.speed() - LOW_FUEL_SPEED_CAP_KMH).abs() < 1e-9);
        assert!(c.state.distance_m() > 0.0);
    }

    #[test]
    fn boosts_may_exceed_top_speed_by_their_factor() {
        let c = car(DriverStyle::Balanced);
        let mut r = rng();
        let straight = Segment::straight(1000.0);
        let plain = target_speed(&c, &straight, Weather::Clear, SpeedRequest::default(), &mut r);
        assert_eq!(plain, 300.0);
        let boosted = SpeedRequest { action_factor: 1.0, effect_factor: 1.3 };
        assert!((target_speed(&c, &straight, Weather::Clear, boosted, &mut r) - 390.0).abs() < 1e-9);
    }

    #[test]
    fn low_risk_styles_never_spin() {
        let mut c = car(DriverStyle::Conservative);
        c.state.set_speed(400.0);
        let hairpin = Segment::corner(120.0, 180.0, 20.0);
        let mut r = rng();
        for _ in 0..1000 {
            assert!(!roll_incident(&c, &hairpin, Weather::Rain, &mut r));
        }
        assert!(!roll_incident(&car(DriverStyle::Chaotic), &Segment::straight(10.0), Weather::Clear, &mut r));
    }
}

#[cfg(test)]
mod strategy_tests {
    use super::*;

    #[test]
    fn fuel_strategy_thresholds() {
        let mut c = car(DriverStyle::Balanced);
        assert_eq!(fuel_strategy(&c, 3).strategy, FuelStrategy::Attack);
        c.state.set_fuel(50.0);
        assert_eq!(fuel_strategy(&c, 3).strategy, FuelStrategy::Manage);
        // 6.67 % per lap → 25 % lasts 3.75 laps, short of 3 + 2.
        c.state.set_fuel(25.0);
        assert_eq!(fuel_strategy(&c, 3).strategy, FuelStrategy::Conserve);
        c.state.set_fuel(5.0);
        let plan = fuel_strategy(&c, 3);
        assert_eq!(plan.strategy, FuelStrategy::MustPit);
        assert!(plan.deficit > 0.0);
    }

    #[test]
    fn tire_outlook_caps_at_hundred() {
        let mut c = car(DriverStyle::Chaotic);
        c.state.set_tire_wear(99.5);
        let outlook = predict_tire_wear(&c, &Track::preset(TrackKind::Mixed), 10);
        assert_eq!(outlook.final_wear, 100.0);
        assert!(outlook.critical);

        c.state.set_tire_wear(0.0);
        assert!(!predict_tire_wear(&c, &Track::preset(TrackKind::Mixed), 3).critical);
    }

    #[test]
    fn tire_outlook_matches_a_driven_lap() {
        let track = Track::preset(TrackKind::Technical).with_weather(Weather::Hot);
        let mut c = car(DriverStyle::Aggressive);
        c.state.set_speed(120.0);
        let forecast = predict_tire_wear(&c, &track, 1).per_lap;

        while c.state.distance_m() < track.length_m() {
            let segment = *track.segment_at(c.state.distance_m());
            c.state = advance(&c, &segment, track.weather, 120.0, 0.01);
        }
        let driven = c.state.tire_wear();
        assert!((driven - forecast).abs() / forecast < 0.01, "driven {driven}, forecast {forecast}");

        let clear = predict_tire_wear(&c, &track.clone().with_weather(Weather::Clear), 1).per_lap;
        assert!((forecast / clear - 1.2).abs() < 1e-9);
    }
}

#[cfg(test)]
mod grid_tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order_and_grid_is_staggered() {
        let (cars, rngs) = GridBuilder::new(1)
            .entrant("A", profile(DriverStyle::Balanced))
            .entrant("B", profile(DriverStyle::Technical))
            .entrant("C", profile(DriverStyle::Chaotic))
            .grid_gap(8.0)
            .build()
            .unwrap();
        assert_eq!(rngs.len(), 3);
        assert_eq!(cars[2].id, CarId(2));
        assert_eq!(cars[0].state.distance_m(), 16.0);
        assert_eq!(cars[2].state.distance_m(), 0.0);
    }

    #[test]
    fn invalid_entrant_fails_build() {
        let bad = CarProfile { handling: 2.0, ..profile(DriverStyle::Balanced) };
        assert!(GridBuilder::new(1).entrant("X", bad).build().is_err());
    }
}
