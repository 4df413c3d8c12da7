use rand::RngCore;
use rand::seq::SliceRandom;

use exam_core::model::{Blueprint, CALCULATIONS_BLUEPRINT, KNOWLEDGE_BLUEPRINT, PlanStep};

/// Ordered exam steps: the shuffled knowledge block followed by the shuffled
/// calculations block. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamPlan {
    steps: Vec<PlanStep>,
    knowledge_len: usize,
}

impl ExamPlan {
    /// Build the journeyman plan (56 knowledge then 24 calculations steps).
    pub fn build(rng: &mut dyn RngCore) -> Self {
        Self::from_blueprints(&KNOWLEDGE_BLUEPRINT, &CALCULATIONS_BLUEPRINT, rng)
    }

    /// Expand both blueprints and shuffle each block on its own.
    pub fn from_blueprints(
        knowledge: &Blueprint,
        calculations: &Blueprint,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut steps = knowledge.expand();
        steps.shuffle(rng);
        let knowledge_len = steps.len();

        let mut tail = calculations.expand();
        tail.shuffle(rng);
        steps.extend(tail);

        Self {
            steps,
            knowledge_len,
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<PlanStep> {
        self.steps.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of leading steps that belong to the knowledge block.
    #[must_use]
    pub fn knowledge_len(&self) -> usize {
        self.knowledge_len
    }
}
