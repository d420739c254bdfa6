//! PoopAI state — onboarding, quiz, and re-sign-in coordination over a
//! device-local key-value store.

pub mod app;
pub mod auth;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod onboarding;
pub mod preferences;
pub mod quiz;
pub mod store;
