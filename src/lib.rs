// Servolle password reset flow
// This crate implements the multi-step forgot-password wizard as an explicit
// state machine: step controller, resend countdown, attempt limiter, and the
// field validation rules, with the clock and persistence injected so the flow
// is testable without wall-clock time or a real storage backend.

pub mod cli;
pub mod clock;
pub mod config;
pub mod flow;
pub mod store;
