//! Mini-game runtime. Each game is a deadline-driven state machine: the
//! caller feeds it inputs and the current time, asks for the next deadline and
//! renders from a serializable snapshot. `Arcade` holds at most one running
//! game.

pub mod bugs;
pub mod clock;
pub mod host;
pub mod memory;
pub mod rps;
pub mod snake;
pub mod tictactoe;
pub mod typing;

use std::fmt;

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::{Error, Result};
use crate::rng;

pub use bugs::BugHunter;
pub use memory::MemoryMatch;
pub use rps::{Choice, RockPaperScissors};
pub use snake::Snake;
pub use tictactoe::{Mode, TicTacToe};
pub use typing::TypingTrainer;

/// One player action, as forwarded by the host page.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Input {
    Text { value: String },
    Card { index: usize },
    Bug { id: u32 },
    Area { width: f64, height: f64 },
    Cell { index: usize },
    Mode { mode: Mode },
    Choice { choice: Choice },
    Key { key: String },
    Restart,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "game", rename_all = "snake_case")]
pub enum Snapshot {
    Typing(typing::TypingView),
    Memory(memory::MemoryView),
    Bugs(bugs::BugView),
    #[serde(rename = "tictactoe")]
    TicTacToe(tictactoe::TicTacToeView),
    Rps(rps::RpsView),
    Snake(snake::SnakeView),
}

pub trait Game {
    fn start(&mut self, now: f64);

    /// Apply `input`. Returns false when the input was ignored in the current
    /// state; nothing changes in that case.
    fn handle(&mut self, input: &Input, now: f64) -> bool;

    /// Run every timer due at or before `now`, in order.
    fn advance(&mut self, now: f64);

    fn next_deadline(&self) -> Option<f64>;

    fn snapshot(&self) -> Snapshot;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameKind {
    Typing,
    Memory,
    Bugs,
    TicTacToe,
    Rps,
    Snake,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Typing,
        GameKind::Memory,
        GameKind::Bugs,
        GameKind::TicTacToe,
        GameKind::Rps,
        GameKind::Snake,
    ];

    pub fn id(self) -> &'static str {
        match self {
            GameKind::Typing => "typing",
            GameKind::Memory => "memory",
            GameKind::Bugs => "bugs",
            GameKind::TicTacToe => "tictactoe",
            GameKind::Rps => "rps",
            GameKind::Snake => "snake",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameKind::Typing => "Code Typing",
            GameKind::Memory => "Memory Match",
            GameKind::Bugs => "Bug Hunter",
            GameKind::TicTacToe => "Tic-Tac-Toe",
            GameKind::Rps => "Rock Paper Scissors",
            GameKind::Snake => "Snake",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GameKind::Typing => "Retype code snippets before the clock runs out",
            GameKind::Memory => "Find every matching pair of tech cards",
            GameKind::Bugs => "Squash bugs before they escape",
            GameKind::TicTacToe => "Play a friend or an unbeatable AI",
            GameKind::Rps => "Best the computer at the classic",
            GameKind::Snake => "Eat, grow and don't bite yourself",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            GameKind::Typing => "#3b82f6",
            GameKind::Memory => "#8b5cf6",
            GameKind::Bugs => "#ef4444",
            GameKind::TicTacToe => "#10b981",
            GameKind::Rps => "#f59e0b",
            GameKind::Snake => "#22c55e",
        }
    }

    pub fn from_id(id: &str) -> Result<GameKind> {
        GameKind::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or_else(|| Error::UnknownGame(id.to_owned()))
    }

    pub fn entry(self) -> CatalogEntry {
        CatalogEntry {
            id: self.id(),
            name: self.name(),
            description: self.description(),
            color: self.color(),
        }
    }

    pub fn catalog() -> Vec<CatalogEntry> {
        GameKind::ALL.into_iter().map(GameKind::entry).collect()
    }

    fn build(self, cfg: &GameConfig, rng: SmallRng) -> Box<dyn Game> {
        match self {
            GameKind::Typing => Box::new(TypingTrainer::new(cfg, rng)),
            GameKind::Memory => Box::new(MemoryMatch::new(cfg, rng)),
            GameKind::Bugs => Box::new(BugHunter::new(cfg, rng)),
            GameKind::TicTacToe => Box::new(TicTacToe::new(cfg)),
            GameKind::Rps => Box::new(RockPaperScissors::new(cfg, rng)),
            GameKind::Snake => Box::new(Snake::new(cfg, rng)),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Game selector. Opening a game replaces whatever was running; `back` drops
/// it together with all of its pending timers.
pub struct Arcade {
    config: GameConfig,
    rng: SmallRng,
    active: Option<(GameKind, Box<dyn Game>)>,
}

impl Arcade {
    pub fn new(config: GameConfig, rng: SmallRng) -> Self {
        Self {
            config,
            rng,
            active: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Select `kind`. The game is built idle; call `start` to begin a round.
    pub fn open(&mut self, kind: GameKind) {
        if let Some((prev, _)) = self.active.take() {
            log::debug!("closing {prev} to open {kind}");
        }
        let game = kind.build(&self.config, rng::seeded(self.rng.random::<u64>()));
        log::info!("opened {kind}");
        self.active = Some((kind, game));
    }

    pub fn active(&self) -> Option<GameKind> {
        self.active.as_ref().map(|(kind, _)| *kind)
    }

    pub fn start(&mut self, now: f64) -> bool {
        match self.active.as_mut() {
            Some((_, game)) => {
                game.start(now);
                true
            }
            None => false,
        }
    }

    /// Timers due before the input are run first so the input sees current
    /// state. Returns true when either the timers or the input changed the
    /// game, so a rejected input after an overdue timer still reports it.
    pub fn handle(&mut self, input: &Input, now: f64) -> bool {
        let Some((_, game)) = self.active.as_mut() else {
            return false;
        };
        let before = (game.snapshot(), game.next_deadline());
        game.advance(now);
        let advanced = (game.snapshot(), game.next_deadline()) != before;
        game.handle(input, now) || advanced
    }

    pub fn advance(&mut self, now: f64) {
        if let Some((_, game)) = self.active.as_mut() {
            game.advance(now);
        }
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.active.as_ref().and_then(|(_, game)| game.next_deadline())
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.active.as_ref().map(|(_, game)| game.snapshot())
    }

    /// Close the active game. Returns what was closed.
    pub fn back(&mut self) -> Option<GameKind> {
        let (kind, _) = self.active.take()?;
        log::info!("closed {kind}");
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcade() -> Arcade {
        Arcade::new(GameConfig::default(), rng::seeded(42))
    }

    #[test]
    fn ids_round_trip_through_catalog() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_id(kind.id()).unwrap(), kind);
        }
        assert!(matches!(GameKind::from_id("chess"), Err(Error::UnknownGame(_))));
        let json = serde_json::to_string(&GameKind::catalog()).unwrap();
        assert!(json.contains(r#""id":"tictactoe""#));
    }

    #[test]
    fn inputs_parse_from_tagged_json() {
        let input: Input = serde_json::from_str(r#"{"type":"card","index":3}"#).unwrap();
        assert_eq!(input, Input::Card { index: 3 });
        let input: Input = serde_json::from_str(r#"{"type":"mode","mode":"two_player"}"#).unwrap();
        assert_eq!(input, Input::Mode { mode: Mode::TwoPlayer });
        let input: Input = serde_json::from_str(r#"{"type":"restart"}"#).unwrap();
        assert_eq!(input, Input::Restart);
    }

    #[test]
    fn nothing_runs_without_a_game() {
        let mut a = arcade();
        assert!(!a.start(0.0));
        assert!(!a.handle(&Input::Restart, 0.0));
        assert_eq!(a.next_deadline(), None);
        assert!(a.snapshot().is_none());
        assert_eq!(a.back(), None);
    }

    #[test]
    fn back_drops_pending_timers() {
        let mut a = arcade();
        a.open(GameKind::Rps);
        a.start(0.0);
        assert!(a.handle(&Input::Choice { choice: Choice::Rock }, 0.0));
        assert_eq!(a.next_deadline(), Some(700.0));
        assert_eq!(a.back(), Some(GameKind::Rps));
        a.advance(10_000.0);
        assert_eq!(a.next_deadline(), None);
        assert!(a.snapshot().is_none());
    }

    #[test]
    fn opening_replaces_running_game() {
        let mut a = arcade();
        a.open(GameKind::Snake);
        a.start(0.0);
        a.open(GameKind::Memory);
        assert_eq!(a.active(), Some(GameKind::Memory));
        // A freshly opened game waits for start.
        assert_eq!(a.next_deadline(), None);
        let json = serde_json::to_string(&a.snapshot().unwrap()).unwrap();
        assert!(json.starts_with(r#"{"game":"memory""#));
    }

    #[test]
    fn handle_catches_up_timers_first() {
        let mut a = arcade();
        a.open(GameKind::Rps);
        a.start(0.0);
        a.handle(&Input::Choice { choice: Choice::Paper }, 0.0);
        // The round resolved at 1200, so a new choice at 2000 is accepted.
        assert!(a.handle(&Input::Choice { choice: Choice::Rock }, 2_000.0));
    }

    #[test]
    fn overdue_timer_counts_as_change_when_input_is_rejected() {
        let mut a = arcade();
        a.open(GameKind::TicTacToe);
        a.start(0.0);
        assert!(a.handle(&Input::Cell { index: 0 }, 0.0));
        let Some(Snapshot::TicTacToe(before)) = a.snapshot() else {
            panic!("expected a tic-tac-toe snapshot");
        };
        // The AI reply was due at 500 but nothing advanced the arcade. Its
        // first pick is cell 4, so the click is rejected after it lands.
        assert!(a.handle(&Input::Cell { index: 4 }, 510.0));
        let Some(Snapshot::TicTacToe(after)) = a.snapshot() else {
            panic!("expected a tic-tac-toe snapshot");
        };
        assert_ne!(before, after);
        assert_eq!(after.board[4], Some(tictactoe::Mark::O));
        assert_eq!(after.board.iter().flatten().count(), 2);
        assert_eq!(a.next_deadline(), None);
    }

    #[test]
    fn rejected_input_without_due_timer_reports_no_change() {
        let mut a = arcade();
        a.open(GameKind::TicTacToe);
        a.start(0.0);
        a.handle(&Input::Cell { index: 0 }, 0.0);
        assert!(!a.handle(&Input::Cell { index: 1 }, 100.0));
    }
}
