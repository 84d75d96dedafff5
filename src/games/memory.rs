//! Memory match over a shuffled deck of tech-stack pairs.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

pub const TOKENS: [&str; 8] = [
    "Rust", "Tokio", "Serde", "WASM", "Axum", "Docker", "Postgres", "Linux",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Card {
    pub token: &'static str,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardView {
    /// Only revealed while the card is face up or matched.
    pub token: Option<&'static str>,
    pub face_up: bool,
    pub matched: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryView {
    pub phase: Phase,
    pub cards: Vec<CardView>,
    pub moves: u32,
    pub matched_pairs: usize,
    pub total_pairs: usize,
}

pub struct MemoryMatch {
    phase: Phase,
    cards: Vec<Card>,
    /// Indices currently face up and not yet resolved (at most two).
    face_up: Vec<usize>,
    resolve_at: Option<f64>,
    reveal_ms: f64,
    moves: u32,
    matched_pairs: usize,
    rng: SmallRng,
}

impl MemoryMatch {
    pub fn new(cfg: &GameConfig, rng: SmallRng) -> Self {
        Self {
            phase: Phase::Idle,
            cards: Vec::new(),
            face_up: Vec::with_capacity(2),
            resolve_at: None,
            reveal_ms: cfg.memory_reveal_ms,
            moves: 0,
            matched_pairs: 0,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn deal(&mut self) {
        self.cards.clear();
        for token in TOKENS.into_iter().chain(TOKENS) {
            self.cards.push(Card {
                token,
                face_up: false,
                matched: false,
            });
        }
        self.cards.shuffle(&mut self.rng);
        self.face_up.clear();
        self.resolve_at = None;
        self.moves = 0;
        self.matched_pairs = 0;
        self.phase = Phase::Running;
    }

    /// Turn a card over. Matched, already face-up and out-of-range cards are
    /// ignored, as is any click while a pair is waiting to resolve.
    pub fn flip(&mut self, index: usize, now: f64) -> bool {
        if self.phase != Phase::Running || self.face_up.len() >= 2 {
            return false;
        }
        let Some(card) = self.cards.get_mut(index) else {
            return false;
        };
        if card.matched || card.face_up {
            return false;
        }
        card.face_up = true;
        self.face_up.push(index);
        if self.face_up.len() == 2 {
            self.moves += 1;
            self.resolve_at = Some(now + self.reveal_ms);
        }
        true
    }

    fn resolve(&mut self) {
        self.resolve_at = None;
        let [a, b] = [self.face_up[0], self.face_up[1]];
        self.face_up.clear();
        if self.cards[a].token == self.cards[b].token {
            self.cards[a].matched = true;
            self.cards[b].matched = true;
            self.matched_pairs += 1;
            if self.matched_pairs == self.total_pairs() {
                log::debug!("memory match complete in {} moves", self.moves);
                self.phase = Phase::Complete;
            }
        } else {
            self.cards[a].face_up = false;
            self.cards[b].face_up = false;
        }
    }
}

impl Game for MemoryMatch {
    fn start(&mut self, _now: f64) {
        self.deal();
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Card { index } => self.flip(*index, now),
            Input::Restart => {
                self.deal();
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        if self.resolve_at.is_some_and(|at| at <= now) && self.face_up.len() == 2 {
            self.resolve();
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        self.resolve_at
    }

    fn snapshot(&self) -> Snapshot {
        let cards = self
            .cards
            .iter()
            .map(|c| CardView {
                token: (c.face_up || c.matched).then_some(c.token),
                face_up: c.face_up,
                matched: c.matched,
            })
            .collect();
        Snapshot::Memory(MemoryView {
            phase: self.phase,
            cards,
            moves: self.moves,
            matched_pairs: self.matched_pairs,
            total_pairs: self.total_pairs(),
        })
    }
}
