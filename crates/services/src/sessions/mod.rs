mod plan;
mod progress;
mod registry;
mod service;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::ExamPlan;
pub use progress::{ExamProgress, ScoreTally};
pub use registry::{PICK_ATTEMPTS, pick, pick_from};
pub use service::{QuizSession, SessionEvent};
pub use view::SessionSnapshot;
