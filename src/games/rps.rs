//! Rock-paper-scissors against a random opponent, with staged reveal delays.

use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Paper, Choice::Rock)
                | (Choice::Scissors, Choice::Paper)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Win,
    Lose,
    Draw,
}

/// Outcome from the player's side.
pub fn judge(player: Choice, ai: Choice) -> Verdict {
    if player == ai {
        Verdict::Draw
    } else if player.beats(ai) {
        Verdict::Win
    } else {
        Verdict::Lose
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Choosing,
    Thinking {
        player: Choice,
        #[serde(skip)]
        until: f64,
    },
    Revealing {
        player: Choice,
        ai: Choice,
        #[serde(skip)]
        until: f64,
    },
    Resolved {
        player: Choice,
        ai: Choice,
        verdict: Verdict,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RpsTally {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RpsView {
    #[serde(flatten)]
    pub stage: Stage,
    pub tally: RpsTally,
}

pub struct RockPaperScissors {
    stage: Stage,
    tally: RpsTally,
    think_ms: f64,
    reveal_ms: f64,
    rng: SmallRng,
}

impl RockPaperScissors {
    pub fn new(cfg: &GameConfig, rng: SmallRng) -> Self {
        Self {
            stage: Stage::Choosing,
            tally: RpsTally::default(),
            think_ms: cfg.rps_think_ms,
            reveal_ms: cfg.rps_reveal_ms,
            rng,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tally(&self) -> RpsTally {
        self.tally
    }

    /// Accepted while choosing or after a resolved round.
    pub fn choose(&mut self, player: Choice, now: f64) -> bool {
        match self.stage {
            Stage::Choosing | Stage::Resolved { .. } => {
                self.stage = Stage::Thinking {
                    player,
                    until: now + self.think_ms,
                };
                true
            }
            _ => false,
        }
    }

    /// Drop any round in flight and zero the tally.
    pub fn reset(&mut self) {
        self.stage = Stage::Choosing;
        self.tally = RpsTally::default();
    }
}

impl Game for RockPaperScissors {
    fn start(&mut self, _now: f64) {
        self.reset();
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Choice { choice } => self.choose(*choice, now),
            Input::Restart => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        loop {
            match self.stage {
                Stage::Thinking { player, until } if until <= now => {
                    let ai = Choice::ALL[self.rng.random_range(0..Choice::ALL.len())];
                    self.stage = Stage::Revealing {
                        player,
                        ai,
                        until: until + self.reveal_ms,
                    };
                }
                Stage::Revealing { player, ai, until } if until <= now => {
                    let verdict = judge(player, ai);
                    match verdict {
                        Verdict::Win => self.tally.wins += 1,
                        Verdict::Lose => self.tally.losses += 1,
                        Verdict::Draw => self.tally.draws += 1,
                    }
                    log::debug!("rps {player:?} vs {ai:?}: {verdict:?}");
                    self.stage = Stage::Resolved { player, ai, verdict };
                }
                _ => break,
            }
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        match self.stage {
            Stage::Thinking { until, .. } | Stage::Revealing { until, .. } => Some(until),
            _ => None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Rps(RpsView {
            stage: self.stage,
            tally: self.tally,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn game() -> RockPaperScissors {
        RockPaperScissors::new(&GameConfig::default(), seeded(3))
    }

    #[test]
    fn beats_relation_is_a_cycle() {
        for a in Choice::ALL {
            assert!(!a.beats(a));
            let wins = Choice::ALL.iter().filter(|&&b| a.beats(b)).count();
            assert_eq!(wins, 1);
        }
        assert_eq!(judge(Choice::Rock, Choice::Scissors), Verdict::Win);
        assert_eq!(judge(Choice::Rock, Choice::Paper), Verdict::Lose);
        assert_eq!(judge(Choice::Paper, Choice::Paper), Verdict::Draw);
    }

    #[test]
    fn round_passes_through_each_stage() {
        let mut g = game();
        assert!(g.choose(Choice::Paper, 0.0));
        assert!(!g.choose(Choice::Rock, 10.0));
        g.advance(699.0);
        assert!(matches!(g.stage(), Stage::Thinking { .. }));
        g.advance(700.0);
        assert!(matches!(g.stage(), Stage::Revealing { .. }));
        assert_eq!(g.next_deadline(), Some(1_200.0));
        g.advance(1_200.0);
        let Stage::Resolved { player, ai, verdict } = g.stage() else {
            panic!("round did not resolve");
        };
        assert_eq!(player, Choice::Paper);
        assert_eq!(verdict, judge(player, ai));
        let t = g.tally();
        assert_eq!(t.wins + t.losses + t.draws, 1);
        assert!(g.choose(Choice::Rock, 2_000.0));
    }

    #[test]
    fn late_advance_catches_up_both_stages() {
        let mut g = game();
        g.choose(Choice::Rock, 0.0);
        g.advance(5_000.0);
        assert!(matches!(g.stage(), Stage::Resolved { .. }));
    }

    #[test]
    fn reset_cancels_pending_resolution() {
        let mut g = game();
        g.choose(Choice::Scissors, 0.0);
        g.advance(800.0);
        g.handle(&Input::Restart, 900.0);
        assert_eq!(g.next_deadline(), None);
        g.advance(10_000.0);
        assert_eq!(g.stage(), Stage::Choosing);
        assert_eq!(g.tally(), RpsTally::default());
    }
}
