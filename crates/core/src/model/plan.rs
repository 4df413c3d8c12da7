use serde::{Deserialize, Serialize};

use crate::model::question::Portion;
use crate::model::topic::Topic;

/// One slot of an exam: which topic to draw and which portion it counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanStep {
    pub topic: Topic,
    pub portion: Portion,
}

/// Fixed per-topic question counts for one exam portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blueprint {
    portion: Portion,
    weights: &'static [(Topic, u32)],
}

/// Journeyman knowledge portion: 56 questions.
pub const KNOWLEDGE_BLUEPRINT: Blueprint = Blueprint {
    portion: Portion::Knowledge,
    weights: &[
        (Topic::Definitions, 3),
        (Topic::Services, 6),
        (Topic::Feeders, 3),
        (Topic::Branch, 10),
        (Topic::Wiring, 10),
        (Topic::Equipment, 10),
        (Topic::Motors, 5),
        (Topic::Controls, 1),
        (Topic::Special, 6),
        (Topic::Renewable, 2),
    ],
};

/// Journeyman calculations portion: 24 questions.
pub const CALCULATIONS_BLUEPRINT: Blueprint = Blueprint {
    portion: Portion::Calculations,
    weights: &[
        (Topic::CalcTheory, 2),
        (Topic::Services, 4),
        (Topic::Feeders, 3),
        (Topic::Branch, 4),
        (Topic::Wiring, 2),
        (Topic::Equipment, 2),
        (Topic::Motors, 2),
        (Topic::Controls, 1),
        (Topic::Special, 3),
        (Topic::Renewable, 1),
    ],
};

impl Blueprint {
    #[must_use]
    pub const fn new(portion: Portion, weights: &'static [(Topic, u32)]) -> Self {
        Self { portion, weights }
    }

    #[must_use]
    pub fn portion(&self) -> Portion {
        self.portion
    }

    #[must_use]
    pub fn weights(&self) -> &'static [(Topic, u32)] {
        self.weights
    }

    /// Number of questions this blueprint contributes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.weights
            .iter()
            .map(|(_, n)| usize::try_from(*n).unwrap_or(usize::MAX))
            .sum()
    }

    /// Repeat each topic `count` times, in table order.
    #[must_use]
    pub fn expand(&self) -> Vec<PlanStep> {
        let mut steps = Vec::with_capacity(self.total());
        for &(topic, count) in self.weights {
            for _ in 0..count {
                steps.push(PlanStep {
                    topic,
                    portion: self.portion,
                });
            }
        }
        steps
    }
}
