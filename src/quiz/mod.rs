//! Onboarding quiz — answer model, question flow, and persistence.

pub mod flow;
pub mod model;
pub mod routes;
pub mod store;

pub use flow::QuizStep;
pub use model::{AnalysisPreference, QuizAnswers, TrackingFrequency};
pub use routes::{QuizRouteState, quiz_routes};
pub use store::QuizAnswerStore;
