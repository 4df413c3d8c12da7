use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::topic::Topic;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems detected by [`Question::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question has no choices")]
    NoChoices,

    #[error("duplicate choice id: {0}")]
    DuplicateChoice(ChoiceId),

    #[error("correct choice {0} is not among the choices")]
    MissingCorrectChoice(ChoiceId),

    #[error("question has no explanation steps")]
    NoSteps,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid choice: {0:?} (expected A-D)")]
pub struct ChoiceParseError(pub String);

//
// ─── CHOICES ───────────────────────────────────────────────────────────────────
//

/// Label of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ChoiceId {
    A,
    B,
    C,
    D,
}

impl ChoiceId {
    /// Display order of the labels.
    pub const ALL: [ChoiceId; 4] = [ChoiceId::A, ChoiceId::B, ChoiceId::C, ChoiceId::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceId::A => "A",
            ChoiceId::B => "B",
            ChoiceId::C => "C",
            ChoiceId::D => "D",
        }
    }
}

impl fmt::Display for ChoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChoiceId {
    type Err = ChoiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(ChoiceId::A),
            "B" | "b" => Ok(ChoiceId::B),
            "C" | "c" => Ok(ChoiceId::C),
            "D" | "d" => Ok(ChoiceId::D),
            other => Err(ChoiceParseError(other.to_string())),
        }
    }
}

/// One answer option as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

//
// ─── PORTION ───────────────────────────────────────────────────────────────────
//

/// Exam section a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portion {
    /// Recall and definitions.
    Knowledge,
    /// Numeric derivations.
    Calculations,
}

impl Portion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Portion::Knowledge => "knowledge",
            Portion::Calculations => "calculations",
        }
    }
}

impl fmt::Display for Portion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portion constraint used when drawing a question; `Mixed` accepts either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionFilter {
    Knowledge,
    Calculations,
    Mixed,
}

impl PortionFilter {
    #[must_use]
    pub fn accepts(self, portion: Portion) -> bool {
        match self {
            PortionFilter::Mixed => true,
            PortionFilter::Knowledge => portion == Portion::Knowledge,
            PortionFilter::Calculations => portion == Portion::Calculations,
        }
    }
}

impl From<Portion> for PortionFilter {
    fn from(portion: Portion) -> Self {
        match portion {
            Portion::Knowledge => PortionFilter::Knowledge,
            Portion::Calculations => PortionFilter::Calculations,
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A labelled line of the worked explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationStep {
    pub label: String,
    pub detail: String,
}

impl ExplanationStep {
    #[must_use]
    pub fn new(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
        }
    }
}

/// A fully-formed multiple-choice question.
///
/// Questions are produced by generators, shown once, and dropped when the
/// session moves on. They are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    id: QuestionId,
    topic: Topic,
    portion: Portion,
    prompt: String,
    choices: Vec<Choice>,
    correct_choice_id: ChoiceId,
    answer_text: String,
    steps: Vec<ExplanationStep>,
    refs: Vec<String>,
}

impl Question {
    /// Build a four-option question. The texts are labelled A-D in order, so
    /// the correct label always refers to exactly one choice.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        id: QuestionId,
        topic: Topic,
        portion: Portion,
        prompt: impl Into<String>,
        choices: [String; 4],
        correct_choice_id: ChoiceId,
        answer_text: impl Into<String>,
        steps: Vec<ExplanationStep>,
        refs: &[&str],
    ) -> Self {
        let choices = ChoiceId::ALL
            .into_iter()
            .zip(choices)
            .map(|(id, text)| Choice { id, text })
            .collect();

        Self {
            id,
            topic,
            portion,
            prompt: prompt.into(),
            choices,
            correct_choice_id,
            answer_text: answer_text.into(),
            steps,
            refs: refs.iter().map(|r| (*r).to_string()).collect(),
        }
    }

    /// Check the structural invariants. Useful for questions that did not come
    /// from a generator (e.g. deserialized ones).
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if self.choices.is_empty() {
            return Err(QuestionError::NoChoices);
        }

        let mut seen = HashSet::with_capacity(self.choices.len());
        for choice in &self.choices {
            if !seen.insert(choice.id) {
                return Err(QuestionError::DuplicateChoice(choice.id));
            }
        }
        if !seen.contains(&self.correct_choice_id) {
            return Err(QuestionError::MissingCorrectChoice(self.correct_choice_id));
        }

        if self.steps.is_empty() {
            return Err(QuestionError::NoSteps);
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn portion(&self) -> Portion {
        self.portion
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn correct_choice_id(&self) -> ChoiceId {
        self.correct_choice_id
    }

    /// Text of the correct option.
    #[must_use]
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choice(self.correct_choice_id)
    }

    #[must_use]
    pub fn is_correct(&self, choice: ChoiceId) -> bool {
        choice == self.correct_choice_id
    }

    #[must_use]
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    #[must_use]
    pub fn steps(&self) -> &[ExplanationStep] {
        &self.steps
    }

    #[must_use]
    pub fn refs(&self) -> &[String] {
        &self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        Question::new(
            QuestionId::new("t-1"),
            Topic::Motors,
            Portion::Knowledge,
            "Pick B",
            ["a".into(), "b".into(), "c".into(), "d".into()],
            ChoiceId::B,
            "b",
            vec![ExplanationStep::new("Rule", "B is right")],
            &["430.250"],
        )
    }

    #[test]
    fn labels_choices_in_order() {
        let q = sample();
        let ids: Vec<_> = q.choices().iter().map(|c| c.id).collect();
        assert_eq!(ids, ChoiceId::ALL.to_vec());
        assert_eq!(q.correct_choice().unwrap().text, "b");
        assert!(q.is_correct(ChoiceId::B));
        assert!(!q.is_correct(ChoiceId::C));
        assert!(q.validate().is_ok());
    }

    #[test]
    fn validate_flags_duplicates_and_missing_correct() {
        let mut q = sample();
        q.choices[1].id = ChoiceId::A;
        assert_eq!(q.validate(), Err(QuestionError::DuplicateChoice(ChoiceId::A)));

        let mut q = sample();
        q.choices.retain(|c| c.id != ChoiceId::B);
        assert_eq!(
            q.validate(),
            Err(QuestionError::MissingCorrectChoice(ChoiceId::B))
        );
    }

    #[test]
    fn validate_requires_steps_and_choices() {
        let mut q = sample();
        q.steps.clear();
        assert_eq!(q.validate(), Err(QuestionError::NoSteps));

        let mut q = sample();
        q.choices.clear();
        assert_eq!(q.validate(), Err(QuestionError::NoChoices));
    }

    #[test]
    fn choice_ids_parse_case_insensitively() {
        assert_eq!("c".parse::<ChoiceId>().unwrap(), ChoiceId::C);
        assert_eq!(" D ".parse::<ChoiceId>().unwrap(), ChoiceId::D);
        assert!("E".parse::<ChoiceId>().is_err());
    }

    #[test]
    fn portion_filter_mixed_accepts_both() {
        assert!(PortionFilter::Mixed.accepts(Portion::Knowledge));
        assert!(PortionFilter::Mixed.accepts(Portion::Calculations));
        assert!(!PortionFilter::Knowledge.accepts(Portion::Calculations));
        assert_eq!(
            PortionFilter::from(Portion::Calculations),
            PortionFilter::Calculations
        );
    }

    #[test]
    fn serializes_correct_choice_in_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["correctChoiceId"], "B");
        assert_eq!(json["portion"], "knowledge");
    }
}
