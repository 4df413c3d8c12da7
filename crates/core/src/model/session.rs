use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown session style: {0} (expected training or strict)")]
pub struct StyleParseError(pub String);

/// How feedback is presented after an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStyle {
    /// Explanation shown immediately; exam lingers before moving on.
    #[default]
    Training,
    /// Explanation hidden until asked for; exam moves on almost at once.
    Strict,
}

impl SessionStyle {
    /// Whether grading reveals the explanation on its own.
    #[must_use]
    pub fn reveals_on_grade(self) -> bool {
        matches!(self, SessionStyle::Training)
    }

    /// Delay between grading and the next exam question.
    #[must_use]
    pub fn advance_delay(self) -> Duration {
        match self {
            SessionStyle::Training => Duration::from_millis(2_500),
            SessionStyle::Strict => Duration::from_millis(250),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStyle::Training => "training",
            SessionStyle::Strict => "strict",
        }
    }
}

impl fmt::Display for SessionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "training" => Ok(SessionStyle::Training),
            "strict" => Ok(SessionStyle::Strict),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

/// Practice draws questions on demand; exam walks a fixed plan under a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Practice,
    Exam,
}

/// Where the session stands with respect to the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// No question on screen (before start, or after the exam plan ran out).
    Idle,
    AwaitingAnswer,
    Graded,
}

/// Outcome of grading one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeResult {
    Correct,
    Incorrect,
}

impl GradeResult {
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, GradeResult::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_controls_reveal_and_delay() {
        assert!(SessionStyle::Training.reveals_on_grade());
        assert!(!SessionStyle::Strict.reveals_on_grade());
        assert_eq!(
            SessionStyle::Training.advance_delay(),
            Duration::from_millis(2_500)
        );
        assert_eq!(SessionStyle::Strict.advance_delay(), Duration::from_millis(250));
    }

    #[test]
    fn style_parses() {
        assert_eq!("Strict".parse::<SessionStyle>().unwrap(), SessionStyle::Strict);
        assert!("relaxed".parse::<SessionStyle>().is_err());
    }
}
