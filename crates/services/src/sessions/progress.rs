use serde::Serialize;

/// Running score for the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    pub attempted: u32,
    pub correct: u32,
}

impl ScoreTally {
    /// Whole-number percentage correct, rounded half up; 0 before any attempt.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.attempted == 0 {
            return 0;
        }
        (self.correct * 200 + self.attempted) / (self.attempted * 2)
    }

    pub(crate) fn record(&mut self, correct: bool) {
        self.attempted += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Position within an exam plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExamProgress {
    /// Zero-based index of the current step.
    pub index: usize,
    pub total: usize,
    pub is_complete: bool,
}
