//! Bug hunter: click wandering bugs before they expire.

use rand::Rng;
use rand::rngs::SmallRng;
use serde::Serialize;

use super::clock::{Countdown, Ticker};
use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Over,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bug {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    /// Jitter amplitude multiplier.
    pub speed: f64,
    #[serde(skip)]
    pub expires_at: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BugView {
    pub phase: Phase,
    pub bugs: Vec<Bug>,
    pub time_left: u32,
    pub score: u32,
    pub caught: u32,
    pub missed: u32,
    pub area: (f64, f64),
}

/// Timed events, ordered for same-instant ties.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Event {
    Second,
    Spawn,
    Expire(u32),
    Move,
}

#[derive(Clone, Copy, Debug)]
struct Rules {
    seconds: u32,
    spawn_ms: f64,
    ttl_ms: f64,
    move_ms: f64,
    points: u32,
    size: f64,
}

pub struct BugHunter {
    phase: Phase,
    rules: Rules,
    area: (f64, f64),
    bugs: Vec<Bug>,
    next_id: u32,
    countdown: Countdown,
    spawner: Ticker,
    mover: Ticker,
    score: u32,
    caught: u32,
    missed: u32,
    rng: SmallRng,
}

impl BugHunter {
    pub fn new(cfg: &GameConfig, rng: SmallRng) -> Self {
        let rules = Rules {
            seconds: cfg.bug_seconds,
            spawn_ms: cfg.bug_spawn_ms,
            ttl_ms: cfg.bug_ttl_ms,
            move_ms: cfg.bug_move_ms,
            points: cfg.bug_points,
            size: cfg.bug_size,
        };
        Self {
            phase: Phase::Idle,
            area: cfg.bug_area,
            bugs: Vec::new(),
            next_id: 0,
            countdown: Countdown::new(rules.seconds, 0.0),
            spawner: Ticker::new(rules.spawn_ms, 0.0),
            mover: Ticker::new(rules.move_ms, 0.0),
            score: 0,
            caught: 0,
            missed: 0,
            rules,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn begin(&mut self, now: f64) {
        self.phase = Phase::Running;
        self.bugs.clear();
        self.score = 0;
        self.caught = 0;
        self.missed = 0;
        self.countdown = Countdown::new(self.rules.seconds, now);
        self.spawner = Ticker::new(self.rules.spawn_ms, now);
        self.mover = Ticker::new(self.rules.move_ms, now);
    }

    /// Play area in pixels; bugs already out of bounds are pulled back in.
    pub fn set_area(&mut self, width: f64, height: f64) -> bool {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return false;
        }
        self.area = (width, height);
        let (max_x, max_y) = self.max_pos();
        for bug in &mut self.bugs {
            bug.x = bug.x.clamp(0.0, max_x);
            bug.y = bug.y.clamp(0.0, max_y);
        }
        true
    }

    fn max_pos(&self) -> (f64, f64) {
        (
            (self.area.0 - self.rules.size).max(0.0),
            (self.area.1 - self.rules.size).max(0.0),
        )
    }

    pub fn squash(&mut self, id: u32) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let Some(pos) = self.bugs.iter().position(|b| b.id == id) else {
            return false;
        };
        self.bugs.remove(pos);
        self.score += self.rules.points;
        self.caught += 1;
        true
    }

    fn next_event(&self) -> Option<(f64, Event)> {
        if self.phase != Phase::Running {
            return None;
        }
        let mut best = self.countdown.next_at().map(|at| (at, Event::Second));
        let mut consider = |at: f64, ev: Event| {
            if best.is_none_or(|(b, _)| at < b) {
                best = Some((at, ev));
            }
        };
        consider(self.spawner.next_at(), Event::Spawn);
        if let Some(bug) = self.bugs.iter().min_by(|a, b| a.expires_at.total_cmp(&b.expires_at)) {
            consider(bug.expires_at, Event::Expire(bug.id));
        }
        consider(self.mover.next_at(), Event::Move);
        best
    }

    fn apply(&mut self, event: Event, at: f64) {
        match event {
            Event::Second => {
                if self.countdown.fire() {
                    log::debug!("bug hunt over: score {} missed {}", self.score, self.missed);
                    self.phase = Phase::Over;
                    self.bugs.clear();
                }
            }
            Event::Spawn => {
                self.spawner.fire();
                let (max_x, max_y) = self.max_pos();
                let bug = Bug {
                    id: self.next_id,
                    x: self.rng.random::<f64>() * max_x,
                    y: self.rng.random::<f64>() * max_y,
                    speed: self.rng.random::<f64>() * 2.0 + 1.0,
                    expires_at: at + self.rules.ttl_ms,
                };
                self.next_id = self.next_id.wrapping_add(1);
                self.bugs.push(bug);
            }
            Event::Expire(id) => {
                self.bugs.retain(|b| b.id != id);
                self.missed += 1;
            }
            Event::Move => {
                self.mover.fire();
                let (max_x, max_y) = self.max_pos();
                for bug in &mut self.bugs {
                    let dx = (self.rng.random::<f64>() - 0.5) * bug.speed * 10.0;
                    let dy = (self.rng.random::<f64>() - 0.5) * bug.speed * 10.0;
                    bug.x = (bug.x + dx).clamp(0.0, max_x);
                    bug.y = (bug.y + dy).clamp(0.0, max_y);
                }
            }
        }
    }
}

impl Game for BugHunter {
    fn start(&mut self, now: f64) {
        self.begin(now);
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Bug { id } => self.squash(*id),
            Input::Area { width, height } => self.set_area(*width, *height),
            Input::Restart => {
                self.begin(now);
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        while let Some((at, event)) = self.next_event() {
            if at > now {
                break;
            }
            self.apply(event, at);
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        self.next_event().map(|(at, _)| at)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Bugs(BugView {
            phase: self.phase,
            bugs: self.bugs.clone(),
            time_left: if self.phase == Phase::Idle {
                self.rules.seconds
            } else {
                self.countdown.seconds_left()
            },
            score: self.score,
            caught: self.caught,
            missed: self.missed,
            area: self.area,
        })
    }
}
