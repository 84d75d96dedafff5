//! Grid snake with speed-up on every meal.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::SmallRng;
use serde::Serialize;

use super::clock::Ticker;
use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    fn inside(self, grid: i32) -> bool {
        (0..grid).contains(&self.x) && (0..grid).contains(&self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    /// Arrow keys and WASD, as reported by `KeyboardEvent.key`.
    pub fn from_key(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" | "w" | "W" => Some(Direction::Up),
            "ArrowDown" | "s" | "S" => Some(Direction::Down),
            "ArrowLeft" | "a" | "A" => Some(Direction::Left),
            "ArrowRight" | "d" | "D" => Some(Direction::Right),
            _ => None,
        }
    }
}

pub fn is_pause_key(key: &str) -> bool {
    matches!(key, " " | "Spacebar")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Paused,
    Over,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnakeView {
    pub phase: Phase,
    pub grid: i32,
    pub body: Vec<Cell>,
    pub food: Cell,
    pub heading: Direction,
    pub score: u32,
    pub interval_ms: f64,
}

pub struct Snake {
    phase: Phase,
    grid: i32,
    /// Head first.
    body: VecDeque<Cell>,
    food: Cell,
    /// Direction of the last completed move.
    heading: Direction,
    pending: Direction,
    ticker: Ticker,
    start_interval: f64,
    min_interval: f64,
    speedup: f64,
    points: u32,
    score: u32,
    rng: SmallRng,
}

impl Snake {
    pub fn new(cfg: &GameConfig, rng: SmallRng) -> Self {
        let center = Cell::new(cfg.snake_grid / 2, cfg.snake_grid / 2);
        Self {
            phase: Phase::Idle,
            grid: cfg.snake_grid,
            body: VecDeque::from([center]),
            food: Cell::new(0, 0),
            heading: Direction::Right,
            pending: Direction::Right,
            ticker: Ticker::new(cfg.snake_interval_ms, 0.0),
            start_interval: cfg.snake_interval_ms,
            min_interval: cfg.snake_min_interval_ms,
            speedup: cfg.snake_speedup_ms,
            points: cfg.snake_food_points,
            score: 0,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn body(&self) -> impl ExactSizeIterator<Item = &Cell> {
        self.body.iter()
    }

    pub fn head(&self) -> Cell {
        self.body[0]
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn interval(&self) -> f64 {
        self.ticker.period()
    }

    pub fn begin(&mut self, now: f64) {
        let center = Cell::new(self.grid / 2, self.grid / 2);
        self.body = VecDeque::from([center]);
        self.heading = Direction::Right;
        self.pending = Direction::Right;
        self.score = 0;
        self.ticker = Ticker::new(self.start_interval, now);
        self.phase = Phase::Running;
        self.place_food();
    }

    /// Queue a turn. Turns along the current axis of travel are rejected.
    pub fn steer(&mut self, dir: Direction) -> bool {
        if self.phase != Phase::Running || dir.is_horizontal() == self.heading.is_horizontal() {
            return false;
        }
        self.pending = dir;
        true
    }

    pub fn toggle_pause(&mut self, now: f64) -> bool {
        match self.phase {
            Phase::Running => self.phase = Phase::Paused,
            Phase::Paused => {
                self.phase = Phase::Running;
                self.ticker.restart(now);
            }
            _ => return false,
        }
        true
    }

    fn occupied(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    fn random_cell(&mut self) -> Cell {
        Cell::new(self.rng.random_range(0..self.grid), self.rng.random_range(0..self.grid))
    }

    /// Random free cell with one retry, then the first free cell in scan
    /// order. Returns false when the board is full.
    fn place_food(&mut self) -> bool {
        for _ in 0..2 {
            let cell = self.random_cell();
            if !self.occupied(cell) {
                self.food = cell;
                return true;
            }
        }
        let free = (0..self.grid)
            .flat_map(|y| (0..self.grid).map(move |x| Cell::new(x, y)))
            .find(|&c| !self.occupied(c));
        match free {
            Some(cell) => {
                self.food = cell;
                true
            }
            None => false,
        }
    }

    fn game_over(&mut self, reason: &str) {
        log::debug!("snake over ({reason}): score {} length {}", self.score, self.body.len());
        self.phase = Phase::Over;
    }

    fn tick(&mut self) {
        self.heading = self.pending;
        let next = self.head().step(self.heading);
        if !next.inside(self.grid) {
            return self.game_over("wall");
        }
        if self.body.iter().skip(1).any(|&c| c == next) {
            return self.game_over("self");
        }
        self.body.push_front(next);
        if next == self.food {
            self.score += self.points;
            let faster = (self.ticker.period() - self.speedup).max(self.min_interval);
            self.ticker.set_period(faster);
            if !self.place_food() {
                self.game_over("board full");
            }
        } else {
            self.body.pop_back();
        }
    }

    #[cfg(test)]
    fn arrange(&mut self, body: &[Cell], heading: Direction, food: Cell) {
        self.body = body.iter().copied().collect();
        self.heading = heading;
        self.pending = heading;
        self.food = food;
    }
}

impl Game for Snake {
    fn start(&mut self, now: f64) {
        self.begin(now);
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Key { key } if is_pause_key(key) => self.toggle_pause(now),
            Input::Key { key } => Direction::from_key(key).is_some_and(|dir| self.steer(dir)),
            Input::Restart => {
                self.begin(now);
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        while self.phase == Phase::Running && self.ticker.is_due(now) {
            // Tick first so a speed-up already shortens the gap to the next one.
            self.tick();
            self.ticker.fire();
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        (self.phase == Phase::Running).then(|| self.ticker.next_at())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Snake(SnakeView {
            phase: self.phase,
            grid: self.grid,
            body: self.body.iter().copied().collect(),
            food: self.food,
            heading: self.heading,
            score: self.score,
            interval_ms: self.ticker.period(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn snake() -> Snake {
        let mut s = Snake::new(&GameConfig::default(), seeded(5));
        s.start(0.0);
        s
    }

    #[test]
    fn moves_one_cell_per_tick() {
        let mut s = snake();
        s.arrange(&[Cell::new(10, 10)], Direction::Right, Cell::new(0, 0));
        s.advance(149.0);
        assert_eq!(s.head(), Cell::new(10, 10));
        s.advance(300.0);
        assert_eq!(s.head(), Cell::new(12, 10));
        assert_eq!(s.body().len(), 1);
    }

    #[test]
    fn wall_ends_game() {
        let mut s = snake();
        s.arrange(&[Cell::new(19, 5)], Direction::Right, Cell::new(0, 0));
        s.advance(150.0);
        assert_eq!(s.phase(), Phase::Over);
        assert_eq!(s.next_deadline(), None);
        assert!(!s.steer(Direction::Up));
    }

    #[test]
    fn biting_own_body_ends_game() {
        let mut s = snake();
        let body = [
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(6, 6),
            Cell::new(6, 5),
            Cell::new(7, 5),
        ];
        s.arrange(&body, Direction::Up, Cell::new(0, 0));
        assert!(s.steer(Direction::Right));
        s.advance(150.0);
        assert_eq!(s.phase(), Phase::Over);
    }

    #[test]
    fn eating_grows_scores_and_speeds_up() {
        let mut s = snake();
        s.arrange(&[Cell::new(3, 3), Cell::new(2, 3)], Direction::Right, Cell::new(4, 3));
        s.advance(150.0);
        assert_eq!(s.body().len(), 3);
        assert_eq!(s.score(), 10);
        assert_eq!(s.interval(), 145.0);
        assert!(!s.body().any(|&c| c == s.food()));
        assert_eq!(s.next_deadline(), Some(295.0));
    }

    #[test]
    fn interval_never_drops_below_floor() {
        let mut s = snake();
        for _ in 0..40 {
            s.arrange(&[Cell::new(1, 10)], Direction::Right, Cell::new(2, 10));
            let at = s.next_deadline().unwrap();
            s.advance(at);
        }
        assert_eq!(s.interval(), 60.0);
    }

    #[test]
    fn same_axis_turns_are_rejected() {
        let mut s = snake();
        assert!(!s.steer(Direction::Left));
        assert!(!s.steer(Direction::Right));
        assert!(s.steer(Direction::Up));
        // Still travelling right until the tick lands.
        assert!(!s.steer(Direction::Left));
        s.advance(150.0);
        assert!(s.steer(Direction::Left));
    }

    #[test]
    fn pause_freezes_state() {
        let mut s = snake();
        let head = s.head();
        assert!(s.handle(&Input::Key { key: " ".into() }, 100.0));
        assert_eq!(s.next_deadline(), None);
        s.advance(5_000.0);
        assert_eq!(s.head(), head);
        assert!(s.handle(&Input::Key { key: " ".into() }, 5_000.0));
        assert_eq!(s.next_deadline(), Some(5_150.0));
    }

    #[test]
    fn food_falls_back_to_first_free_cell() {
        let cfg = GameConfig {
            snake_grid: 4,
            ..GameConfig::default()
        };
        let mut s = Snake::new(&cfg, seeded(0));
        s.start(0.0);
        let body: Vec<Cell> = (0..4)
            .flat_map(|y| (0..4).map(move |x| Cell::new(x, y)))
            .filter(|&c| c != Cell::new(3, 3))
            .collect();
        s.arrange(&body, Direction::Right, Cell::new(0, 0));
        assert!(s.place_food());
        assert_eq!(s.food(), Cell::new(3, 3));
    }

    #[test]
    fn keys_map_to_directions() {
        assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
        assert_eq!(Direction::from_key("a"), Some(Direction::Left));
        assert_eq!(Direction::from_key("x"), None);
        assert!(is_pause_key(" "));
    }
}
