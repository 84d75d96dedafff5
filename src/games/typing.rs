//! Code typing trainer: retype snippets against a countdown.

use rand::Rng;
use rand::rngs::SmallRng;
use serde::Serialize;

use super::clock::Countdown;
use super::{Game, Input, Snapshot};
use crate::config::GameConfig;

pub const SNIPPETS: &[&str] = &[
    "let total: u32 = values.iter().sum();",
    "fn greet(name: &str) -> String { format!(\"Hello, {name}!\") }",
    "let names: Vec<_> = users.iter().filter(|u| u.active).map(|u| &u.name).collect();",
    "async fn fetch(url: &str) -> Result<String> { Ok(reqwest::get(url).await?.text().await?) }",
    "let doubled: Vec<i32> = items.iter().map(|x| x * 2).collect();",
    "if let Some(user) = cache.get(&id) { return Ok(user.clone()); }",
    "match cmd { Command::Start => run(), Command::Stop => halt(), _ => {} }",
    "impl Default for Config { fn default() -> Self { Self { retries: 3 } } }",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Running,
    Over,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TypingView {
    pub phase: Phase,
    pub snippet: &'static str,
    pub input: String,
    pub time_left: u32,
    pub score: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub completed: u32,
}

pub struct TypingTrainer {
    phase: Phase,
    round_seconds: u32,
    countdown: Option<Countdown>,
    snippet: &'static str,
    buffer: String,
    score: u32,
    wpm: u32,
    accuracy: u32,
    completed: u32,
    rng: SmallRng,
}

fn word_count(s: &str) -> u32 {
    s.split(' ').count() as u32
}

impl TypingTrainer {
    pub fn new(cfg: &GameConfig, rng: SmallRng) -> Self {
        Self {
            phase: Phase::Idle,
            round_seconds: cfg.typing_seconds,
            countdown: None,
            snippet: SNIPPETS[0],
            buffer: String::new(),
            score: 0,
            wpm: 0,
            accuracy: 100,
            completed: 0,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn snippet(&self) -> &'static str {
        self.snippet
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn accuracy(&self) -> u32 {
        self.accuracy
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn time_left(&self) -> u32 {
        self.countdown.map_or(self.round_seconds, |c| c.seconds_left())
    }

    fn next_snippet(&mut self) {
        // Repeats are allowed.
        self.snippet = SNIPPETS[self.rng.random_range(0..SNIPPETS.len())];
    }

    pub fn begin(&mut self, now: f64) {
        self.phase = Phase::Running;
        self.countdown = Some(Countdown::new(self.round_seconds, now));
        self.buffer.clear();
        self.score = 0;
        self.wpm = 0;
        self.accuracy = 100;
        self.completed = 0;
        self.next_snippet();
    }

    /// Replace the input buffer with `text`. Ignored unless a round is running.
    pub fn type_text(&mut self, text: &str) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.buffer.clear();
        self.buffer.push_str(text);

        let typed = self.buffer.chars().count();
        self.accuracy = if typed == 0 {
            100
        } else {
            let correct = self
                .buffer
                .chars()
                .zip(self.snippet.chars())
                .filter(|(a, b)| a == b)
                .count();
            ((correct as f64 / typed as f64) * 100.0).round() as u32
        };

        let elapsed = self.round_seconds - self.time_left();
        if typed > 0 && elapsed > 0 {
            self.wpm = ((word_count(&self.buffer) as f64 / elapsed as f64) * 60.0).round() as u32;
        }

        if self.buffer == self.snippet {
            self.score += word_count(self.snippet);
            self.completed += 1;
            self.buffer.clear();
            self.next_snippet();
        }
        true
    }
}

impl Game for TypingTrainer {
    fn start(&mut self, now: f64) {
        self.begin(now);
    }

    fn handle(&mut self, input: &Input, now: f64) -> bool {
        match input {
            Input::Text { value } => self.type_text(value),
            Input::Restart => {
                self.begin(now);
                true
            }
            _ => false,
        }
    }

    fn advance(&mut self, now: f64) {
        while self.phase == Phase::Running {
            let Some(countdown) = self.countdown.as_mut() else {
                break;
            };
            match countdown.next_at() {
                Some(at) if at <= now => {
                    if countdown.fire() {
                        log::debug!("typing round over: score {} wpm {}", self.score, self.wpm);
                        self.phase = Phase::Over;
                    }
                }
                _ => break,
            }
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        match self.phase {
            Phase::Running => self.countdown.and_then(|c| c.next_at()),
            _ => None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::Typing(TypingView {
            phase: self.phase,
            snippet: self.snippet,
            input: self.buffer.clone(),
            time_left: self.time_left(),
            score: self.score,
            wpm: self.wpm,
            accuracy: self.accuracy,
            completed: self.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn trainer() -> TypingTrainer {
        TypingTrainer::new(&GameConfig::default(), seeded(1))
    }

    #[test]
    fn input_ignored_until_started() {
        let mut t = trainer();
        assert!(!t.type_text("let"));
        assert_eq!(t.phase(), Phase::Idle);
        assert_eq!(t.time_left(), 60);
    }

    #[test]
    fn accuracy_tracks_char_mismatches() {
        let mut t = trainer();
        t.start(0.0);
        let target: String = t.snippet().chars().take(4).collect();
        let mut wrong: String = target.chars().take(3).collect();
        wrong.push('#');
        t.type_text(&target);
        assert_eq!(t.accuracy(), 100);
        t.type_text(&wrong);
        assert_eq!(t.accuracy(), 75);
        t.type_text("");
        assert_eq!(t.accuracy(), 100);
    }

    #[test]
    fn finishing_snippet_scores_words_and_clears_buffer() {
        let mut t = trainer();
        t.start(0.0);
        let snippet = t.snippet();
        t.type_text(snippet);
        assert_eq!(t.score(), word_count(snippet));
        match t.snapshot() {
            Snapshot::Typing(view) => {
                assert!(view.input.is_empty());
                assert_eq!(view.completed, 1);
            }
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[test]
    fn wpm_uses_whole_elapsed_seconds() {
        let mut t = trainer();
        t.start(0.0);
        t.advance(30_000.0);
        assert_eq!(t.time_left(), 30);
        // Five words in thirty seconds.
        t.type_text("a b c d e");
        assert_eq!(t.wpm(), 10);
    }

    #[test]
    fn countdown_freezes_input() {
        let mut t = trainer();
        t.start(500.0);
        assert_eq!(t.next_deadline(), Some(1_500.0));
        t.advance(60_500.0);
        assert_eq!(t.phase(), Phase::Over);
        assert_eq!(t.time_left(), 0);
        assert_eq!(t.next_deadline(), None);
        assert!(!t.type_text("let"));
        t.start(70_000.0);
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.score(), 0);
    }
}
