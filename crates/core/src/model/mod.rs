mod ids;
mod plan;
mod question;
mod session;
mod subscription;
mod topic;

pub use ids::QuestionId;
pub use plan::{Blueprint, CALCULATIONS_BLUEPRINT, KNOWLEDGE_BLUEPRINT, PlanStep};
pub use question::{
    Choice, ChoiceId, ChoiceParseError, ExplanationStep, Portion, PortionFilter, Question,
    QuestionError,
};
pub use session::{GradeResult, SessionMode, SessionPhase, SessionStyle, StyleParseError};
pub use subscription::{SubscriptionError, SubscriptionRecord, SubscriptionStatus};
pub use topic::{Topic, TopicParseError};
