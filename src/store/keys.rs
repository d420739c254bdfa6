//! Persisted key names. These must match what earlier app builds wrote.

/// Set to `"true"` once onboarding is finished or skipped.
pub const ONBOARDING_COMPLETE: &str = "onboardingComplete";
/// One-way latch, `"true"` after the first successful sign-in on this device.
pub const HAS_BEEN_AUTHENTICATED: &str = "hasBeenAuthenticated";
/// JSON-encoded partial quiz answers.
pub const QUIZ_ANSWERS: &str = "poopai_quiz_answers";
/// Session token written by the auth layer.
pub const AUTH_TOKEN: &str = "authToken";
/// Cached user profile written by the auth layer.
pub const USER_DATA: &str = "userData";
/// Development-only scan counter.
pub const DEV_SCANS_LEFT: &str = "dev_scans_left";
/// Blur preference for scan images.
pub const BLUR_ENABLED: &str = "blurEnabled";

/// Flags owned by the onboarding state machine.
pub const ONBOARDING_FLAGS: [&str; 2] = [ONBOARDING_COMPLETE, HAS_BEEN_AUTHENTICATED];

/// Everything removed by a "clear all local data" wipe.
pub const UNAUTHENTICATED_WIPE: [&str; 6] = [
    ONBOARDING_COMPLETE,
    HAS_BEEN_AUTHENTICATED,
    AUTH_TOKEN,
    USER_DATA,
    QUIZ_ANSWERS,
    DEV_SCANS_LEFT,
];
