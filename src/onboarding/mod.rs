//! Onboarding system — decides whether the user sees onboarding, the
//! re-sign-in prompt, or the main app.
//!
//! The decision is derived from two persisted flags (`onboardingComplete`,
//! `hasBeenAuthenticated`) read once at start-up, plus the live auth status
//! fed in by the [`Coordinator`](crate::coordinator::Coordinator).

pub mod machine;
pub mod routes;
pub mod state;

pub use machine::OnboardingMachine;
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use state::{NavigationTarget, OnboardingRuntimeState, OnboardingView, UserKind};
