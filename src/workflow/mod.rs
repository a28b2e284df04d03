pub mod session_state;
pub mod study_flow;

pub use session_state::{SessionState, Tab};
pub use study_flow::{DocumentOutcome, StudyFlow};
