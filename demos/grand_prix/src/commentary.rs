//! Console commentary and wall-clock pacing around the output observer.

use std::thread;
use std::time::{Duration, Instant};

use race_car::{Car, Track};
use race_core::{CarId, Tick};
use race_output::{OutputWriter, RaceOutputObserver};
use race_sim::{Flow, FrameView, RaceEvent, RaceObserver, RaceResults};

pub struct Commentary<W: OutputWriter> {
    pub inner:  RaceOutputObserver<W>,
    pub events: usize,
    names:      Vec<String>,
    /// Race seconds per wall-clock second; 0 runs flat out.
    realtime:   f64,
    started:    Option<Instant>,
}

impl<W: OutputWriter> Commentary<W> {
    pub fn new(inner: RaceOutputObserver<W>, realtime: f64) -> Self {
        Self { inner, events: 0, names: Vec::new(), realtime, started: None }
    }

    fn name(&self, car: CarId) -> &str {
        self.names.get(car.index()).map_or("?", String::as_str)
    }

    fn pace(&mut self, race_secs: f64) {
        if self.realtime <= 0.0 {
            return;
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        let due = started + Duration::from_secs_f64(race_secs / self.realtime);
        if let Some(wait) = due.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }
}

impl<W: OutputWriter> RaceObserver for Commentary<W> {
    fn on_race_start(&mut self, cars: &[Car], track: &Track) {
        self.names = cars.iter().map(|c| c.name.clone()).collect();
        println!(
            "Lights out at {} ({:.0} m, {}), {} cars",
            track.name,
            track.length_m(),
            track.weather.as_str(),
            cars.len()
        );
        self.inner.on_race_start(cars, track);
    }

    fn on_frame(&mut self, frame: &FrameView<'_>) -> Flow {
        self.pace(frame.race_secs);
        self.inner.on_frame(frame)
    }

    fn on_event(&mut self, event: &RaceEvent) {
        self.events += 1;
        match event {
            RaceEvent::LapCompleted { car, lap, lap_secs, .. } => {
                println!("  {:<16} lap {lap:>2}  {lap_secs:>8.3}s", self.name(*car));
            }
            RaceEvent::Overtake { car, passed, position, .. } => {
                println!("  {} passes {} for P{position}", self.name(*car), self.name(*passed));
            }
            RaceEvent::Collision { at_fault, victim, kind, .. } => {
                println!("  contact! {} into {} ({kind})", self.name(*at_fault), self.name(*victim));
            }
            RaceEvent::Incident { car, .. } => println!("  {} spins!", self.name(*car)),
            RaceEvent::ItemUsed { car, item, hit, .. } if !hit.is_empty() => {
                println!("  {} fires a {item}, {} hit", self.name(*car), hit.len());
            }
            RaceEvent::Finished { car, position, race_secs, .. } => {
                println!("  P{position} {} takes the flag at {race_secs:.3}s", self.name(*car));
            }
            _ => {}
        }
        self.inner.on_event(event);
    }

    fn on_snapshot(&mut self, tick: Tick, cars: &[Car]) {
        self.inner.on_snapshot(tick, cars);
    }

    fn on_race_end(&mut self, results: &RaceResults) {
        self.inner.on_race_end(results);
    }
}
