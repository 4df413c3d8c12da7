use std::time::Duration;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info};

use exam_core::model::{
    ChoiceId, GradeResult, Portion, PortionFilter, Question, SessionMode, SessionPhase,
    SessionStyle, Topic,
};
use exam_core::pacing::{Countdown, CountdownEvent};

use super::plan::ExamPlan;
use super::progress::{ExamProgress, ScoreTally};
use super::registry;
use crate::error::SessionError;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Something `tick` changed that a host may want to announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The countdown ran out before an answer; the question was graded incorrect.
    TimedOut,
    /// The exam moved on to its next question.
    Advanced,
    /// The exam plan ran out; the session is idle.
    Completed,
}

#[derive(Debug, Clone)]
enum Mode {
    Practice { topic: Topic },
    Exam { plan: ExamPlan, index: usize },
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single-owner quiz session covering free practice and the timed exam.
///
/// The session never schedules anything itself. Hosts report elapsed time
/// through [`QuizSession::tick`], which drives both the per-question countdown
/// and the delayed exam advance.
pub struct QuizSession<R: RngCore = StdRng> {
    rng: R,
    style: SessionStyle,
    mode: Mode,
    question: Option<Question>,
    selected: Option<ChoiceId>,
    result: Option<GradeResult>,
    revealed: bool,
    tally: ScoreTally,
    portion: Portion,
    countdown: Option<Countdown>,
    advance_in: Option<Duration>,
}

impl QuizSession<StdRng> {
    /// Create an idle session seeded from the operating system.
    #[must_use]
    pub fn new(style: SessionStyle) -> Self {
        Self::with_rng(style, StdRng::from_os_rng())
    }
}

impl<R: RngCore> QuizSession<R> {
    /// Create an idle session with an injected RNG.
    #[must_use]
    pub fn with_rng(style: SessionStyle, rng: R) -> Self {
        Self {
            rng,
            style,
            mode: Mode::Practice {
                topic: Topic::Mixed,
            },
            question: None,
            selected: None,
            result: None,
            revealed: false,
            tally: ScoreTally::default(),
            portion: Portion::Knowledge,
            countdown: None,
            advance_in: None,
        }
    }

    /// Switch to practice on `topic` and draw a question.
    ///
    /// Any running exam is abandoned. The score tally carries over.
    pub fn start_practice(&mut self, topic: Topic) -> &Question {
        self.mode = Mode::Practice { topic };
        self.draw_practice(topic)
    }

    /// Draw the next practice question on the current topic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ExamInProgress` during an exam and
    /// `SessionError::Completed` once an exam has finished; call
    /// [`QuizSession::start_practice`] to leave exam mode.
    pub fn next_question(&mut self) -> Result<&Question, SessionError> {
        match &self.mode {
            Mode::Practice { topic } => {
                let topic = *topic;
                Ok(self.draw_practice(topic))
            }
            Mode::Exam { plan, index } if *index < plan.len() => Err(SessionError::ExamInProgress),
            Mode::Exam { .. } => Err(SessionError::Completed),
        }
    }

    /// Reset the score, build a fresh exam plan and draw its first question.
    pub fn start_exam(&mut self) -> Option<&Question> {
        let plan = ExamPlan::build(&mut self.rng);
        info!(steps = plan.len(), style = %self.style, "exam started");
        self.tally = ScoreTally::default();
        self.mode = Mode::Exam { plan, index: 0 };
        self.load_exam_step(0)
    }

    /// Grade the current question.
    ///
    /// Returns `None` without changing anything when there is no question or it
    /// has already been graded.
    pub fn submit(&mut self, choice: ChoiceId) -> Option<GradeResult> {
        if self.phase() != SessionPhase::AwaitingAnswer {
            return None;
        }
        let correct = self.question.as_ref()?.is_correct(choice);
        self.selected = Some(choice);
        Some(self.grade(correct))
    }

    /// Report elapsed wall time since the previous tick.
    ///
    /// A pending exam advance is handled first; when it fires the new
    /// question starts with a fresh countdown and the rest of `elapsed` is
    /// dropped. Otherwise the countdown runs, and its expiry grades an
    /// unanswered exam question as incorrect.
    pub fn tick(&mut self, elapsed: Duration) -> Option<SessionEvent> {
        if let Some(due) = self.advance_in {
            if elapsed >= due {
                return Some(self.advance_exam());
            }
            self.advance_in = Some(due - elapsed);
        }

        let countdown = self.countdown.as_mut()?;
        if countdown.tick(elapsed) != CountdownEvent::Expired {
            return None;
        }
        if matches!(self.mode, Mode::Exam { .. }) && self.phase() == SessionPhase::AwaitingAnswer {
            self.grade(false);
            return Some(SessionEvent::TimedOut);
        }
        None
    }

    /// Flip answer visibility for a graded question. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotGraded` while no graded question is shown.
    pub fn toggle_reveal(&mut self) -> Result<bool, SessionError> {
        if self.phase() != SessionPhase::Graded {
            return Err(SessionError::NotGraded);
        }
        self.revealed = !self.revealed;
        Ok(self.revealed)
    }

    /// Change style. Affects the next grading and any advance not yet scheduled.
    pub fn set_style(&mut self, style: SessionStyle) {
        self.style = style;
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match (&self.question, self.result) {
            (None, _) => SessionPhase::Idle,
            (Some(_), None) => SessionPhase::AwaitingAnswer,
            (Some(_), Some(_)) => SessionPhase::Graded,
        }
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        match self.mode {
            Mode::Practice { .. } => SessionMode::Practice,
            Mode::Exam { .. } => SessionMode::Exam,
        }
    }

    #[must_use]
    pub fn style(&self) -> SessionStyle {
        self.style
    }

    /// Topic used for practice draws; `None` in exam mode.
    #[must_use]
    pub fn practice_topic(&self) -> Option<Topic> {
        match self.mode {
            Mode::Practice { topic } => Some(topic),
            Mode::Exam { .. } => None,
        }
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    #[must_use]
    pub fn selected(&self) -> Option<ChoiceId> {
        self.selected
    }

    #[must_use]
    pub fn result(&self) -> Option<GradeResult> {
        self.result
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    #[must_use]
    pub fn tally(&self) -> ScoreTally {
        self.tally
    }

    /// Portion of the current question or exam step.
    #[must_use]
    pub fn portion(&self) -> Portion {
        self.portion
    }

    /// Seconds left on the countdown; `None` outside a timed exam question.
    #[must_use]
    pub fn remaining_seconds(&self) -> Option<u32> {
        self.countdown.as_ref().map(Countdown::remaining_seconds)
    }

    /// Time until the pending exam advance, if one is scheduled.
    #[must_use]
    pub fn advance_due_in(&self) -> Option<Duration> {
        self.advance_in
    }

    #[must_use]
    pub fn exam_progress(&self) -> Option<ExamProgress> {
        match &self.mode {
            Mode::Exam { plan, index } => Some(ExamProgress {
                index: *index,
                total: plan.len(),
                is_complete: *index >= plan.len(),
            }),
            Mode::Practice { .. } => None,
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn draw_practice(&mut self, topic: Topic) -> &Question {
        self.clear_question_state();
        self.countdown = None;
        let question = registry::pick(topic, PortionFilter::Mixed, &mut self.rng);
        self.portion = question.portion();
        self.question.insert(question)
    }

    fn load_exam_step(&mut self, index: usize) -> Option<&Question> {
        self.clear_question_state();
        let Mode::Exam { plan, .. } = &self.mode else {
            return None;
        };
        let Some(step) = plan.get(index) else {
            info!(
                attempted = self.tally.attempted,
                correct = self.tally.correct,
                percent = self.tally.percent(),
                "exam finished"
            );
            self.countdown = None;
            self.question = None;
            return None;
        };

        let question = registry::pick(step.topic, step.portion.into(), &mut self.rng);
        debug!(index, topic = %step.topic, id = %question.id(), "exam step loaded");
        self.portion = step.portion;
        self.countdown = Some(Countdown::for_portion(step.portion));
        Some(self.question.insert(question))
    }

    fn advance_exam(&mut self) -> SessionEvent {
        self.advance_in = None;
        let next = match &mut self.mode {
            Mode::Exam { index, .. } => {
                *index += 1;
                *index
            }
            Mode::Practice { .. } => return SessionEvent::Completed,
        };
        match self.load_exam_step(next) {
            Some(_) => SessionEvent::Advanced,
            None => SessionEvent::Completed,
        }
    }

    fn grade(&mut self, correct: bool) -> GradeResult {
        let result = if correct {
            GradeResult::Correct
        } else {
            GradeResult::Incorrect
        };
        self.tally.record(correct);
        self.result = Some(result);
        self.revealed = self.style.reveals_on_grade();
        if matches!(self.mode, Mode::Exam { .. }) {
            self.advance_in = Some(self.style.advance_delay());
        }
        debug!(
            ?result,
            selected = ?self.selected,
            attempted = self.tally.attempted,
            correct = self.tally.correct,
            "question graded"
        );
        result
    }

    fn clear_question_state(&mut self) {
        self.selected = None;
        self.result = None;
        self.revealed = false;
        self.advance_in = None;
    }
}
