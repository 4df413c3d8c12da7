use rand::RngCore;
use serde::Serialize;

use exam_core::model::{
    ChoiceId, GradeResult, Portion, Question, SessionMode, SessionPhase, SessionStyle,
};

use super::progress::{ExamProgress, ScoreTally};
use super::service::QuizSession;

/// Presentation-agnostic copy of everything a host renders.
///
/// No pre-formatted strings: hosts decide how to show time and percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub mode: SessionMode,
    pub style: SessionStyle,
    pub phase: SessionPhase,
    pub portion: Portion,
    pub question: Option<Question>,
    pub selected: Option<ChoiceId>,
    pub result: Option<GradeResult>,
    pub revealed: bool,
    pub tally: ScoreTally,
    pub percent: u32,
    pub remaining_seconds: Option<u32>,
    pub exam: Option<ExamProgress>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture<R: RngCore>(session: &QuizSession<R>) -> Self {
        let tally = session.tally();
        Self {
            mode: session.mode(),
            style: session.style(),
            phase: session.phase(),
            portion: session.portion(),
            question: session.question().cloned(),
            selected: session.selected(),
            result: session.result(),
            revealed: session.is_revealed(),
            tally,
            percent: tally.percent(),
            remaining_seconds: session.remaining_seconds(),
            exam: session.exam_progress(),
        }
    }

    /// Whether the explanation should be shown.
    #[must_use]
    pub fn shows_answer(&self) -> bool {
        self.phase == SessionPhase::Graded && self.revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::Topic;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn snapshot_tracks_session_state() {
        let mut session =
            QuizSession::with_rng(SessionStyle::Training, StdRng::seed_from_u64(12));
        let idle = SessionSnapshot::capture(&session);
        assert_eq!(idle.phase, SessionPhase::Idle);
        assert!(idle.question.is_none());

        let correct = session.start_practice(Topic::Renewable).correct_choice_id();
        session.submit(correct);

        let graded = SessionSnapshot::capture(&session);
        assert_eq!(graded.mode, SessionMode::Practice);
        assert_eq!(graded.result, Some(GradeResult::Correct));
        assert_eq!(graded.percent, 100);
        assert!(graded.shows_answer());
        assert_eq!(graded.remaining_seconds, None);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut session = QuizSession::with_rng(SessionStyle::Strict, StdRng::seed_from_u64(4));
        session.start_exam();
        let json = serde_json::to_value(SessionSnapshot::capture(&session)).unwrap();
        assert_eq!(json["mode"], "exam");
        assert_eq!(json["phase"], "awaiting_answer");
        assert_eq!(json["remainingSeconds"], 132);
        assert_eq!(json["exam"]["total"], 80);
        assert_eq!(json["style"], "strict");
    }
}
