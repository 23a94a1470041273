//! The built-in tactical rule table.

use race_car::{FuelStrategy, SectionKind};
use race_effects::powerup::{best_item, USE_THRESHOLD};

use crate::{Action, Decision, RacePhase, RaceSituation, RuleEngine};

/// Gap ahead, metres, under which a car on a straight goes for the pass.
const OVERTAKE_GAP_M: f64 = 60.0;
/// Gap behind, metres, under which a car defends.
const DEFEND_GAP_M: f64 = 30.0;
/// Gap ahead, metres, under which a car keeps the pressure on.
const PRESSURE_GAP_M: f64 = 150.0;
const PODIUM: u32 = 3;

/// First matching rule wins:
///
/// | Condition                                 | Action     |
/// |-------------------------------------------|------------|
/// | target in weapon range and gun ready      | `fire`     |
/// | gap ahead < 60 m on a straight            | `overtake` |
/// | gap behind < 30 m                         | `defend`   |
/// | final phase, outside the podium           | `attack`   |
/// | fuel plan says must-pit or conserve       | `conserve` |
/// | tire outlook is critical                  | `hold`     |
/// | gap ahead < 150 m                         | `pressure` |
/// | otherwise                                 | `wait`     |
///
/// Independently, `use_powerup` is set when the best item in the inventory
/// is worth more than 0.6.
#[derive(Debug, Default, Clone, Copy)]
pub struct TacticalRules;

impl RuleEngine for TacticalRules {
    fn decide(&self, s: &RaceSituation) -> Decision {
        let ahead = s.gap_ahead_m.unwrap_or(f64::INFINITY);
        let behind = s.gap_behind_m.unwrap_or(f64::INFINITY);

        let (action, confidence, reasoning) = if s.can_fire && s.target_in_range {
            (Action::Fire, 0.9, "target in range")
        } else if s.segment == SectionKind::Straight && ahead < OVERTAKE_GAP_M {
            (Action::Overtake, 0.8, "close on a straight")
        } else if behind < DEFEND_GAP_M {
            (Action::Defend, 0.7, "under pressure")
        } else if s.phase() == RacePhase::Final && s.position > PODIUM {
            (Action::Attack, 0.75, "last push for the podium")
        } else if matches!(s.fuel_strategy, FuelStrategy::MustPit | FuelStrategy::Conserve) {
            (Action::Conserve, 0.7, "fuel is short")
        } else if s.tires_critical {
            (Action::Hold, 0.65, "tires will not last")
        } else if ahead < PRESSURE_GAP_M {
            (Action::Pressure, 0.6, "closing in")
        } else {
            (Action::Wait, 0.5, "holding position")
        };

        let use_powerup = best_item(&s.inventory, s.position, s.total_cars, ahead, behind)
            .is_some_and(|(_, _, value)| value > USE_THRESHOLD);

        Decision::new(action, confidence)
            .with_reasoning(reasoning)
            .with_powerup(use_powerup)
    }
}
