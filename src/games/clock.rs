//! Deadline clocks for game timers. Each module keeps absolute due times and
//! catches up in `advance(now)`, so dropping the module drops its timers.

/// Fixed-period ticker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ticker {
    period_ms: f64,
    next_at: f64,
}

impl Ticker {
    pub fn new(period_ms: f64, now: f64) -> Self {
        Self {
            period_ms,
            next_at: now + period_ms,
        }
    }

    pub fn next_at(&self) -> f64 {
        self.next_at
    }

    pub fn period(&self) -> f64 {
        self.period_ms
    }

    pub fn is_due(&self, now: f64) -> bool {
        self.next_at <= now
    }

    /// Consume the pending tick; the next one is one (current) period later.
    pub fn fire(&mut self) {
        self.next_at += self.period_ms;
    }

    /// Takes effect from the next `fire`.
    pub fn set_period(&mut self, period_ms: f64) {
        self.period_ms = period_ms;
    }

    /// Re-anchor on `now`, e.g. after a pause.
    pub fn restart(&mut self, now: f64) {
        self.next_at = now + self.period_ms;
    }
}

/// Whole-second countdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Countdown {
    seconds_left: u32,
    ticker: Ticker,
}

impl Countdown {
    pub fn new(seconds: u32, now: f64) -> Self {
        Self {
            seconds_left: seconds,
            ticker: Ticker::new(1000.0, now),
        }
    }

    pub fn seconds_left(&self) -> u32 {
        self.seconds_left
    }

    pub fn next_at(&self) -> Option<f64> {
        (self.seconds_left > 0).then(|| self.ticker.next_at())
    }

    /// Count one second off. Returns true when this reached zero.
    pub fn fire(&mut self) -> bool {
        if self.seconds_left == 0 {
            return false;
        }
        self.seconds_left -= 1;
        self.ticker.fire();
        self.seconds_left == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_period_change_applies_to_following_tick() {
        let mut t = Ticker::new(150.0, 1_000.0);
        assert_eq!(t.next_at(), 1_150.0);
        assert!(!t.is_due(1_149.0));
        assert!(t.is_due(1_150.0));
        t.set_period(100.0);
        t.fire();
        assert_eq!(t.next_at(), 1_250.0);
        t.restart(2_000.0);
        assert_eq!(t.next_at(), 2_100.0);
    }

    #[test]
    fn countdown_reaches_zero_once() {
        let mut c = Countdown::new(2, 0.0);
        assert_eq!(c.next_at(), Some(1_000.0));
        assert!(!c.fire());
        assert_eq!(c.next_at(), Some(2_000.0));
        assert!(c.fire());
        assert_eq!(c.next_at(), None);
        assert!(!c.fire());
        assert_eq!(c.seconds_left(), 0);
    }
}
