// Password reset flow
// This module provides the forgot-password wizard as a state machine:
// step controller, resend countdown, failed-attempt limiter, and the
// pure validation rules for each step's fields.

mod attempts;
mod controller;
mod countdown;
mod validation;

pub use attempts::AttemptLimiter;
pub use controller::{FlowError, FlowSettings, FlowStep, ResetFlow};
pub use countdown::Countdown;
pub use validation::{
    validate_code, validate_email, validate_new_password, PasswordRequirement, ValidationError,
};

/// Max failed code verifications before a new code must be requested
pub const MAX_VERIFY_ATTEMPTS: u32 = 5;

/// Seconds a user must wait before a code can be resent
pub const RESEND_COOLDOWN_SECS: u64 = 60;

/// Length of the verification code
pub const CODE_LENGTH: usize = 4;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Codes accepted by the demo verifier. There is no issuance or delivery
/// mechanism in the prototype; these stand in for a real backend.
pub const ACCEPTED_DEMO_CODES: [&str; 2] = ["0000", "2222"];

/// Email regex pattern for validation
pub const EMAIL_REGEX: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
