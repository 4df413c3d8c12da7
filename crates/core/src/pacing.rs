//! Per-question exam pacing and the countdown that enforces it.
//!
//! The countdown never schedules anything itself: the host calls
//! [`Countdown::tick`] with the elapsed time (normally once per second).

use std::time::Duration;

use crate::model::Portion;

/// Minutes allotted to the knowledge portion.
pub const KNOWLEDGE_MINUTES: u32 = 130;
/// Question count the knowledge pacing is divided over.
pub const KNOWLEDGE_PACING_QUESTIONS: u32 = 59;
/// Minutes allotted to the calculations portion.
pub const CALCULATIONS_MINUTES: u32 = 110;
/// Question count the calculations pacing is divided over.
pub const CALCULATIONS_PACING_QUESTIONS: u32 = 26;

/// Seconds allowed per question of the given portion, rounded to the nearest
/// second (132 s for knowledge, 254 s for calculations).
#[must_use]
pub fn pace_seconds(portion: Portion) -> u32 {
    let (minutes, questions) = match portion {
        Portion::Knowledge => (KNOWLEDGE_MINUTES, KNOWLEDGE_PACING_QUESTIONS),
        Portion::Calculations => (CALCULATIONS_MINUTES, CALCULATIONS_PACING_QUESTIONS),
    };
    let total = minutes * 60;
    // round half up
    (total * 2 + questions) / (questions * 2)
}

/// What a single tick did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    Running { remaining: u32 },
    /// Reached zero on this tick. Reported once.
    Expired,
    /// Already expired before this tick; nothing changed.
    Stopped,
}

/// One-shot countdown in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    total: u32,
    remaining: u32,
    carry: Duration,
    expired: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self {
            total: seconds,
            remaining: seconds,
            carry: Duration::ZERO,
            expired: false,
        }
    }

    /// Countdown for one question of `portion`.
    #[must_use]
    pub fn for_portion(portion: Portion) -> Self {
        Self::new(pace_seconds(portion))
    }

    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Consume `elapsed` wall time. Sub-second remainders carry over to the
    /// next tick, so ten 100 ms ticks cost exactly one second.
    pub fn tick(&mut self, elapsed: Duration) -> CountdownEvent {
        if self.expired {
            return CountdownEvent::Stopped;
        }

        let elapsed = self.carry + elapsed;
        let whole = elapsed.as_secs();
        self.carry = elapsed - Duration::from_secs(whole);

        let step = u32::try_from(whole).unwrap_or(u32::MAX);
        self.remaining = self.remaining.saturating_sub(step);

        if self.remaining == 0 {
            self.expired = true;
            self.carry = Duration::ZERO;
            CountdownEvent::Expired
        } else {
            CountdownEvent::Running {
                remaining: self.remaining,
            }
        }
    }
}
