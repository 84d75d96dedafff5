//! Tic-tac-toe with a two-player mode and a minimax opponent.

use serde::{Deserialize, Serialize};

use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "mark", rename_all = "snake_case")]
pub enum Outcome {
    Win(Mark),
    Draw,
}

/// Row-major 3x3 board. Copied by value into every search branch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board(pub [Option<Mark>; 9]);

impl Board {
    pub fn get(&self, index: usize) -> Option<Mark> {
        self.0.get(index).copied().flatten()
    }

    /// The board with `mark` at `index`, or `None` if that cell is taken or
    /// does not exist.
    pub fn with(self, index: usize, mark: Mark) -> Option<Board> {
        match self.0.get(index) {
            Some(None) => {
                let mut next = self;
                next.0[index] = Some(mark);
                Some(next)
            }
            _ => None,
        }
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(|&i| self.0[i].is_none())
    }

    pub fn winning_line(&self) -> Option<[usize; 3]> {
        LINES.into_iter().find(|&[a, b, c]| {
            self.0[a].is_some() && self.0[a] == self.0[b] && self.0[a] == self.0[c]
        })
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winning_line().and_then(|[a, _, _]| self.0[a])
    }

    pub fn is_full(&self) -> bool {
        self.0.iter().all(Option::is_some)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(mark) => Some(Outcome::Win(mark)),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }
}

/// Minimax value of `board` for `ai` with `to_move` to play:
/// +10 when `ai` wins, -10 when it loses, 0 for a draw.
pub fn minimax(board: Board, ai: Mark, to_move: Mark) -> i32 {
    match board.outcome() {
        Some(Outcome::Win(mark)) if mark == ai => return 10,
        Some(Outcome::Win(_)) => return -10,
        Some(Outcome::Draw) => return 0,
        None => {}
    }
    let scores = board
        .empty_cells()
        .filter_map(|i| board.with(i, to_move))
        .map(|next| minimax(next, ai, to_move.other()));
    if to_move == ai {
        scores.max().unwrap_or(0)
    } else {
        scores.min().unwrap_or(0)
    }
}

/// First cell in index order achieving the best minimax score for `ai`.
pub fn best_move(board: Board, ai: Mark) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for i in board.empty_cells() {
        let Some(next) = board.with(i, ai) else {
            continue;
        };
        let score = minimax(next, ai, ai.other());
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    TwoPlayer,
    #[default]
    VsAi,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub x: u32,
    pub o: u32,
    pub draws: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TicTacToeView {
    pub board: [Option<Mark>; 9],
    pub turn: Mark,
    pub mode: Mode,
    pub outcome: Option<Outcome>,
    pub winning_line: Option<[usize; 3]>,
    pub tally: Tally,
    pub ai_thinking: bool,
}

const AI: Mark = Mark::O;

pub struct TicTacToe {
    board: Board,
    turn: Mark,
    mode: Mode,
    tally: Tally,
    ai_at: Option<f64>,
    ai_delay_ms: f64,
}

impl TicTacToe {
    pub fn new(cfg: &GameConfig) -> Self {
        Self {
            board: Board::default(),
            turn: Mark::X,
            mode: Mode::default(),
            tally: Tally::default(),
            ai_at: None,
            ai_delay_ms: cfg.ai_delay_ms,
        }
    }

    pub fn board(&self) -> Board {
        self.board
    }

    pub fn turn(&self) -> Mark {
        self.turn
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.board.outcome()
    }

    /// Clear the board for another round. Tallies are kept.
    pub fn new_round(&mut self) {
        self.board = Board::default();
        self.turn = Mark::X;
        self.ai_at = None;
    }

    /// Switching mode starts over, tallies included.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.tally = Tally::default();
        self.new_round();
    }

    /// Place the current player's mark. In vs-AI mode only the human (X)
    /// plays through here, and not while the AI reply is pending.
    pub fn place(&mut self, index: usize, now: f64) -> bool {
        if self.outcome().is_some() || self.ai_at.is_some() {
            return false;
        }
        if self.mode == Mode::VsAi && self.turn == AI {
            return false;
        }
        if !self.play(index) {
            return false;
        }
        if self.mode == Mode::VsAi && self.outcome().is_none() {
            self.ai_at = Some(now + self.ai_delay_ms);
        }
        true
    }

    fn play(&mut self, index: usize) -> bool {
        let Some(next) = self.board.with(index, self.turn) else {
            return false;
        };
        self.board = next;
        self.turn = self.turn.other();
        match self.board.outcome() {
            Some(Outcome::Win(Mark::X)) => self.tally.x += 1,
            Some(Outcome::Win(Mark::O)) => self.tally.o += 1,
            Some(Outcome::Draw) => self.tally.draws += 1,
            None => {}
        }
        true
    }

    fn ai_turn(&mut self) {
        self.ai_at = None;
        if let Some(index) = best_move(self.board, AI) {
            self.play(index);
        }
    }
}

impl Game for TicTacToe {
    fn start(&mut self, _now: f64) {
        self.new_round();
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Cell { index } => self.place(*index, now),
            Input::Mode { mode } => {
                self.set_mode(*mode);
                true
            }
            Input::Restart => {
                self.new_round();
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        if self.ai_at.is_some_and(|at| at <= now) {
            self.ai_turn();
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        self.ai_at
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::TicTacToe(TicTacToeView {
            board: self.board.0,
            turn: self.turn,
            mode: self.mode,
            outcome: self.outcome(),
            winning_line: self.board.winning_line(),
            tally: self.tally,
            ai_thinking: self.ai_at.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Mark::{O, X};

    fn board(cells: [Option<Mark>; 9]) -> Board {
        Board(cells)
    }

    #[test]
    fn diagonal_completion_wins() {
        let b = board([Some(X), Some(O), Some(X), Some(O), Some(X), Some(O), None, None, None]);
        assert_eq!(b.winner(), None);
        assert_eq!(b.outcome(), None);
        let b = b.with(8, X).unwrap();
        assert_eq!(b.winner(), Some(X));
        assert_eq!(b.winning_line(), Some([0, 4, 8]));
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let b = Board::default().with(4, X).unwrap();
        assert!(b.with(4, O).is_none());
        assert!(b.with(9, O).is_none());
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let b = board([
            Some(X), Some(O), Some(X),
            Some(X), Some(O), Some(O),
            Some(O), Some(X), Some(X),
        ]);
        assert_eq!(b.outcome(), Some(Outcome::Draw));
    }

    #[test]
    fn ai_takes_win_or_blocks() {
        // Cell 6 both completes O's diagonal and blocks X's column.
        let b = board([Some(X), Some(X), Some(O), Some(X), Some(O), None, None, None, None]);
        assert_eq!(best_move(b, O), Some(6));
        // X threatens the top row.
        let b = board([Some(X), Some(X), None, None, Some(O), None, None, None, None]);
        assert_eq!(best_move(b, O), Some(2));
    }

    fn never_loses(b: Board) {
        if b.outcome().is_some() {
            assert_ne!(b.winner(), Some(X));
            return;
        }
        for human in b.empty_cells() {
            let after_human = b.with(human, X).unwrap();
            if after_human.outcome().is_some() {
                assert_ne!(after_human.winner(), Some(X));
                continue;
            }
            let reply = best_move(after_human, O).unwrap();
            never_loses(after_human.with(reply, O).unwrap());
        }
    }

    #[test]
    fn minimax_never_loses_to_any_opponent() {
        never_loses(Board::default());
    }

    #[test]
    fn ai_replies_after_delay() {
        let mut g = TicTacToe::new(&GameConfig::default());
        g.start(0.0);
        assert!(g.place(0, 100.0));
        assert_eq!(g.next_deadline(), Some(600.0));
        // The human cannot move for O.
        assert!(!g.place(1, 200.0));
        g.advance(599.0);
        assert_eq!(g.board().0.iter().flatten().count(), 1);
        g.advance(600.0);
        assert_eq!(g.board().0.iter().flatten().count(), 2);
        assert_eq!(g.turn(), X);
        assert_eq!(g.next_deadline(), None);
    }

    #[test]
    fn two_player_alternates_and_tallies_persist() {
        let mut g = TicTacToe::new(&GameConfig::default());
        g.set_mode(Mode::TwoPlayer);
        for i in [0, 3, 1, 4, 2] {
            assert!(g.place(i, 0.0));
        }
        assert_eq!(g.outcome(), Some(Outcome::Win(X)));
        assert!(!g.place(8, 0.0));
        assert_eq!(g.tally().x, 1);
        g.handle(&Input::Restart, 0.0);
        assert_eq!(g.tally().x, 1);
        assert_eq!(g.turn(), X);
        g.handle(&Input::Mode { mode: Mode::VsAi }, 0.0);
        assert_eq!(g.tally(), Tally::default());
    }

    #[test]
    fn new_round_cancels_pending_ai_move() {
        let mut g = TicTacToe::new(&GameConfig::default());
        g.place(4, 0.0);
        g.new_round();
        g.advance(10_000.0);
        assert_eq!(g.board(), Board::default());
    }
}
