//! Track model: cyclic segment lists, presets and weather.

use std::fmt;
use std::str::FromStr;

use race_core::SegmentId;

use crate::{CarError, CarResult};

/// Gravitational acceleration, m/s².
const G: f64 = 9.81;
/// Ceiling on straights, km/h.
const STRAIGHT_SPEED_KMH: f64 = 400.0;
/// Ceiling in corners, km/h.
const CORNER_SPEED_CAP_KMH: f64 = 300.0;

// ── Segments ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentKind {
    Straight,
    Corner { angle_deg: f64, radius_m: f64 },
}

/// Coarse section classes used for collision odds and oracle snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SectionKind {
    Straight,
    LongCorner,
    Corner,
    Chicane,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Straight   => "straight",
            SectionKind::LongCorner => "long_corner",
            SectionKind::Corner     => "corner",
            SectionKind::Chicane    => "chicane",
        }
    }

    #[inline]
    pub fn is_cornering(self) -> bool {
        self != SectionKind::Straight
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub length_m: f64,
    pub kind:     SegmentKind,
}

impl Segment {
    pub fn straight(length_m: f64) -> Self {
        Self { length_m, kind: SegmentKind::Straight }
    }

    pub fn corner(length_m: f64, angle_deg: f64, radius_m: f64) -> Self {
        Self { length_m, kind: SegmentKind::Corner { angle_deg, radius_m } }
    }

    #[inline]
    pub fn is_straight(&self) -> bool {
        matches!(self.kind, SegmentKind::Straight)
    }

    /// Fastest sensible speed through this segment for a car with `handling`,
    /// km/h, before weather and driver style.
    ///
    /// Corners use `v = sqrt(μ·g·r)` with handling as μ, slowed further for
    /// sharper angles.
    pub fn optimal_speed(&self, handling: f64) -> f64 {
        match self.kind {
            SegmentKind::Straight => STRAIGHT_SPEED_KMH,
            SegmentKind::Corner { angle_deg, radius_m } => {
                let base = (handling.max(0.0) * G * radius_m.max(0.0)).sqrt() * 3.6;
                let angle_factor = 1.0 - (angle_deg.abs() / 180.0) * 0.3;
                (base * angle_factor).min(CORNER_SPEED_CAP_KMH)
            }
        }
    }

    /// Tight hairpins count as chicanes, long sweepers as long corners.
    pub fn section(&self) -> SectionKind {
        match self.kind {
            SegmentKind::Straight => SectionKind::Straight,
            SegmentKind::Corner { angle_deg, radius_m } => {
                if angle_deg.abs() >= 120.0 && radius_m <= 30.0 {
                    SectionKind::Chicane
                } else if self.length_m >= 250.0 {
                    SectionKind::LongCorner
                } else {
                    SectionKind::Corner
                }
            }
        }
    }

    fn validate(&self, index: usize) -> CarResult<()> {
        if !(self.length_m.is_finite() && self.length_m > 0.0) {
            return Err(CarError::Track(format!("segment {index} has non-positive length")));
        }
        if let SegmentKind::Corner { radius_m, angle_deg } = self.kind {
            if !(radius_m.is_finite() && radius_m > 0.0 && angle_deg.is_finite()) {
                return Err(CarError::Track(format!("segment {index} has an invalid corner")));
            }
        }
        Ok(())
    }
}

// ── Weather ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Fog,
    Hot,
}

/// Multipliers a weather condition applies to every car.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeatherEffects {
    pub speed:     f64,
    pub handling:  f64,
    pub tire_wear: f64,
    /// Scales corner incident odds.
    pub risk:      f64,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Rain, Weather::Fog, Weather::Hot];

    pub fn effects(self) -> WeatherEffects {
        match self {
            Weather::Clear => WeatherEffects { speed: 1.0,  handling: 1.0,  tire_wear: 1.0, risk: 1.0 },
            Weather::Rain  => WeatherEffects { speed: 0.85, handling: 0.7,  tire_wear: 0.8, risk: 1.5 },
            Weather::Fog   => WeatherEffects { speed: 0.9,  handling: 0.85, tire_wear: 1.0, risk: 1.3 },
            Weather::Hot   => WeatherEffects { speed: 0.95, handling: 0.95, tire_wear: 1.2, risk: 1.0 },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain  => "rain",
            Weather::Fog   => "fog",
            Weather::Hot   => "hot",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = CarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weather::ALL
            .into_iter()
            .find(|w| w.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CarError::Track(format!("unknown weather {s:?}")))
    }
}

// ── Track ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackKind {
    Speed,
    Technical,
    Mixed,
    Endurance,
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] =
        [TrackKind::Speed, TrackKind::Technical, TrackKind::Mixed, TrackKind::Endurance];

    pub fn as_str(self) -> &'static str {
        match self {
            TrackKind::Speed     => "speed",
            TrackKind::Technical => "technical",
            TrackKind::Mixed     => "mixed",
            TrackKind::Endurance => "endurance",
        }
    }
}

impl FromStr for TrackKind {
    type Err = CarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CarError::Track(format!("unknown track kind {s:?}")))
    }
}

/// An immutable, cyclic sequence of segments.
#[derive(Clone, Debug)]
pub struct Track {
    pub name:    String,
    pub kind:    TrackKind,
    pub weather: Weather,
    segments:    Vec<Segment>,
    /// `starts[i]` is the in-lap distance at which segment `i` begins.
    starts:      Vec<f64>,
    length_m:    f64,
}

impl Track {
    pub fn new(name: impl Into<String>, kind: TrackKind, segments: Vec<Segment>) -> CarResult<Self> {
        if segments.is_empty() {
            return Err(CarError::Track("a track needs at least one segment".into()));
        }
        if segments.len() >= SegmentId::INVALID.index() {
            return Err(CarError::Track("too many segments".into()));
        }
        for (i, segment) in segments.iter().enumerate() {
            segment.validate(i)?;
        }
        Ok(Self::assemble(name.into(), kind, segments))
    }

    fn assemble(name: String, kind: TrackKind, segments: Vec<Segment>) -> Self {
        let mut starts = Vec::with_capacity(segments.len());
        let mut length_m = 0.0;
        for segment in &segments {
            starts.push(length_m);
            length_m += segment.length_m;
        }
        Self { name, kind, weather: Weather::Clear, segments, starts, length_m }
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    /// One of the four built-in circuits.
    pub fn preset(kind: TrackKind) -> Self {
        let (name, segments) = match kind {
            TrackKind::Speed => ("Monza Speed Circuit", vec![
                Segment::straight(1200.0),
                Segment::corner(150.0, 45.0, 80.0),
                Segment::straight(800.0),
                Segment::corner(200.0, 90.0, 60.0),
                Segment::straight(600.0),
                Segment::corner(100.0, 30.0, 100.0),
                Segment::straight(1000.0),
                Segment::corner(250.0, 120.0, 40.0),
                Segment::straight(400.0),
                Segment::corner(150.0, 60.0, 70.0),
            ]),
            TrackKind::Technical => ("Monaco Technical Circuit", vec![
                Segment::straight(300.0),
                Segment::corner(80.0, 90.0, 25.0),
                Segment::straight(150.0),
                Segment::corner(120.0, 180.0, 20.0),
                Segment::straight(200.0),
                Segment::corner(100.0, 75.0, 35.0),
                Segment::straight(180.0),
                Segment::corner(150.0, 135.0, 30.0),
                Segment::straight(250.0),
                Segment::corner(90.0, 60.0, 40.0),
                Segment::straight(160.0),
                Segment::corner(110.0, 90.0, 30.0),
                Segment::straight(140.0),
                Segment::corner(130.0, 120.0, 25.0),
            ]),
            TrackKind::Mixed => ("Silverstone Mixed Circuit", vec![
                Segment::straight(800.0),
                Segment::corner(180.0, 90.0, 50.0),
                Segment::straight(400.0),
                Segment::corner(200.0, 135.0, 35.0),
                Segment::straight(600.0),
                Segment::corner(150.0, 60.0, 60.0),
                Segment::straight(350.0),
                Segment::corner(250.0, 180.0, 25.0),
                Segment::straight(500.0),
                Segment::corner(170.0, 75.0, 55.0),
                Segment::straight(700.0),
                Segment::corner(140.0, 45.0, 70.0),
            ]),
            TrackKind::Endurance => ("Le Mans Endurance Circuit", vec![
                Segment::straight(2000.0),
                Segment::corner(200.0, 70.0, 60.0),
                Segment::straight(1500.0),
                Segment::corner(300.0, 90.0, 40.0),
                Segment::straight(800.0),
                Segment::corner(180.0, 120.0, 35.0),
                Segment::straight(1200.0),
                Segment::corner(250.0, 45.0, 80.0),
                Segment::straight(900.0),
                Segment::corner(220.0, 135.0, 30.0),
                Segment::straight(600.0),
                Segment::corner(150.0, 60.0, 65.0),
                Segment::straight(1800.0),
                Segment::corner(280.0, 90.0, 45.0),
            ]),
        };
        // Preset segment lists are all well-formed.
        Self::assemble(name.into(), kind, segments)
    }

    #[inline]
    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> &Segment {
        &self.segments[id.index()]
    }

    /// Map a cumulative race distance to (segment, offset into that segment).
    pub fn locate(&self, distance_m: f64) -> (SegmentId, f64) {
        let in_lap = self.in_lap_distance(distance_m);
        // `starts` is sorted ascending with starts[0] == 0.
        let idx = self.starts.partition_point(|&s| s <= in_lap).saturating_sub(1);
        (SegmentId(idx as u16), in_lap - self.starts[idx])
    }

    /// The segment under a car at `distance_m`.
    #[inline]
    pub fn segment_at(&self, distance_m: f64) -> &Segment {
        self.segment(self.locate(distance_m).0)
    }

    /// Completed laps at `distance_m`.
    #[inline]
    pub fn lap_of(&self, distance_m: f64) -> u32 {
        (distance_m.max(0.0) / self.length_m).floor() as u32
    }

    /// Position within the current lap, in `[0, 1)`.
    #[inline]
    pub fn lap_progress(&self, distance_m: f64) -> f64 {
        self.in_lap_distance(distance_m) / self.length_m
    }

    /// Laps plus in-lap fraction; the ordering key for ranking.
    #[inline]
    pub fn race_progress(&self, distance_m: f64) -> f64 {
        distance_m.max(0.0) / self.length_m
    }

    #[inline]
    fn in_lap_distance(&self, distance_m: f64) -> f64 {
        distance_m.max(0.0).rem_euclid(self.length_m)
    }
}
