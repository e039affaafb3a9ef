use log::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::flow::countdown::Countdown;
use crate::flow::validation::{self, ValidationError};
use crate::flow::AttemptLimiter;
use crate::store::{KeyValueStore, StoreError};

/// The four steps of the reset wizard.
///
/// Exactly one step is active at a time and the forward mapping is fixed:
/// `Email -> Code -> NewPassword -> Success`. There are no implicit
/// transitions; every move is an explicit operation on [`ResetFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    /// Collecting the account email
    Email,
    /// Waiting for the 4-digit verification code
    Code,
    /// Collecting the new password and its confirmation
    NewPassword,
    /// Terminal step; only `restart` leaves it
    Success,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::Email => "email",
            FlowStep::Code => "code",
            FlowStep::NewPassword => "new-password",
            FlowStep::Success => "success",
        }
    }
}

/// Flow errors
///
/// Every variant is a local, user-displayable condition; none of them
/// terminate the flow.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Too many unsuccessful attempts. Please request a new verification code")]
    RateLimited,

    #[error("The verification code you entered is invalid. Please check and try again")]
    WrongCode {
        /// Attempts left before verification is refused
        remaining: u32,
    },

    #[error("A new code can be requested in {remaining_secs}s")]
    ResendNotReady { remaining_secs: u64 },

    #[error("Going back discards this step and you will need to start it over")]
    ConfirmationRequired,

    #[error("There is no previous step to go back to")]
    NoPreviousStep,

    #[error("The reset is already complete. Restart the flow to begin again")]
    FlowComplete,

    #[error("This action is not available at the {step} step")]
    WrongStep { step: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tunable knobs of the flow, derived from [`Config`]
#[derive(Debug, Clone)]
pub struct FlowSettings {
    /// Seconds before the code can be resent
    pub resend_cooldown_secs: u64,
    /// Failed verifications allowed before a new code is required
    pub max_verify_attempts: u32,
    /// Minimum password length
    pub min_password_length: usize,
    /// Codes the demo verifier accepts
    pub accepted_codes: Vec<String>,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            resend_cooldown_secs: super::RESEND_COOLDOWN_SECS,
            max_verify_attempts: super::MAX_VERIFY_ATTEMPTS,
            min_password_length: super::MIN_PASSWORD_LENGTH,
            accepted_codes: super::ACCEPTED_DEMO_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl From<&Config> for FlowSettings {
    fn from(config: &Config) -> Self {
        Self {
            resend_cooldown_secs: config.flow.resend_cooldown_secs,
            max_verify_attempts: config.flow.max_verify_attempts,
            min_password_length: config.flow.min_password_length,
            accepted_codes: config.flow.accepted_codes.clone(),
        }
    }
}

/// In-memory draft of what the user has typed so far.
///
/// Never persisted; cleared when the flow completes or restarts.
#[derive(Debug, Default, Clone)]
struct CredentialsDraft {
    email: String,
    code: String,
}

/// The forgot-password wizard.
///
/// Owns the current step, the credentials draft, the resend countdown and
/// the attempt limiter. The clock and the key-value store are injected at
/// construction so the whole flow runs against manual time and an in-memory
/// store in tests.
pub struct ResetFlow {
    step: FlowStep,
    draft: CredentialsDraft,
    countdown: Option<Countdown>,
    attempts: AttemptLimiter,
    settings: FlowSettings,
    clock: Box<dyn Clock>,
    store: Box<dyn KeyValueStore>,
}

impl ResetFlow {
    /// Start a fresh flow at the email step
    pub fn new(clock: Box<dyn Clock>, store: Box<dyn KeyValueStore>, settings: FlowSettings) -> Self {
        let attempts = AttemptLimiter::new(settings.max_verify_attempts);
        Self {
            step: FlowStep::Email,
            draft: CredentialsDraft::default(),
            countdown: None,
            attempts,
            settings,
            clock,
            store,
        }
    }

    /// Start a flow, resuming a persisted countdown if one exists.
    ///
    /// A valid persisted epoch means a code was issued in an earlier session,
    /// so the flow re-enters the code step with the persisted attempt count
    /// and the countdown continuing from where it left off. Missing or
    /// corrupt state falls back to a fresh flow; it is never an error.
    pub fn resume(
        clock: Box<dyn Clock>,
        store: Box<dyn KeyValueStore>,
        settings: FlowSettings,
    ) -> Result<Self, StoreError> {
        let countdown = Countdown::load(store.as_ref(), settings.resend_cooldown_secs)?;

        let flow = match countdown {
            Some(countdown) => {
                let attempts = AttemptLimiter::load(store.as_ref(), settings.max_verify_attempts)?;
                info!(
                    "Resuming verification mid-countdown ({}s remaining, {} failed attempts)",
                    countdown.remaining_secs(clock.as_ref()),
                    attempts.count()
                );
                Self {
                    step: FlowStep::Code,
                    draft: CredentialsDraft::default(),
                    countdown: Some(countdown),
                    attempts,
                    settings,
                    clock,
                    store,
                }
            }
            None => Self::new(clock, store, settings),
        };

        Ok(flow)
    }

    /// The active step
    pub fn step(&self) -> FlowStep {
        self.step
    }

    /// Email entered at the first step, empty until then
    pub fn email(&self) -> &str {
        &self.draft.email
    }

    /// Seconds left on the resend countdown, `None` before a code was issued
    pub fn resend_remaining_secs(&self) -> Option<u64> {
        self.countdown
            .as_ref()
            .map(|c| c.remaining_secs(self.clock.as_ref()))
    }

    /// Whether the resend cooldown has elapsed
    pub fn can_resend(&self) -> bool {
        self.countdown
            .as_ref()
            .map(|c| c.can_resend(self.clock.as_ref()))
            .unwrap_or(false)
    }

    /// Verification attempts left before the limiter refuses
    pub fn attempts_remaining(&self) -> u32 {
        self.attempts.remaining()
    }

    /// Failed verification attempts recorded so far
    pub fn failed_attempts(&self) -> u32 {
        self.attempts.count()
    }

    /// Submit the email and issue a (demo) verification code.
    ///
    /// On success the countdown is re-armed with a fresh epoch, the attempt
    /// counter is zeroed, and the flow advances to the code step.
    pub fn submit_email(&mut self, email: &str) -> Result<(), FlowError> {
        self.require_step(FlowStep::Email)?;
        validation::validate_email(email)?;

        self.draft.email = email.trim().to_string();
        self.issue_code()?;
        self.step = FlowStep::Code;

        info!("Verification code issued for {}", self.draft.email);
        Ok(())
    }

    /// Verify the entered code.
    ///
    /// An exhausted attempt budget refuses immediately, before the code value
    /// is looked at. An incomplete code is a validation error and does not
    /// consume an attempt; a complete but wrong code does.
    pub fn verify_code(&mut self, code: &str) -> Result<(), FlowError> {
        self.require_step(FlowStep::Code)?;

        if self.attempts.is_exhausted() {
            warn!(
                "Verification refused, attempt budget exhausted ({})",
                self.attempts.count()
            );
            return Err(FlowError::RateLimited);
        }

        validation::validate_code(code)?;
        self.draft.code = code.to_string();

        if !self.settings.accepted_codes.iter().any(|c| c == code) {
            self.attempts.record_failure(self.store.as_ref())?;
            return Err(FlowError::WrongCode {
                remaining: self.attempts.remaining(),
            });
        }

        debug!("Verification code accepted");
        self.step = FlowStep::NewPassword;
        Ok(())
    }

    /// Submit the new password and its confirmation.
    ///
    /// On success the persisted countdown and attempt keys are cleared, the
    /// draft is discarded, and the flow reaches its terminal step.
    pub fn submit_password(&mut self, password: &str, confirmation: &str) -> Result<(), FlowError> {
        self.require_step(FlowStep::NewPassword)?;
        validation::validate_new_password(password, confirmation, self.settings.min_password_length)?;

        Countdown::clear(self.store.as_ref())?;
        AttemptLimiter::clear(self.store.as_ref())?;
        self.countdown = None;
        self.draft = CredentialsDraft::default();
        self.step = FlowStep::Success;

        info!("Password reset completed");
        Ok(())
    }

    /// Reissue the verification code once the cooldown has elapsed.
    ///
    /// Re-arms the countdown, zeroes the attempt counter, and clears the
    /// previously entered code.
    pub fn resend_code(&mut self) -> Result<(), FlowError> {
        self.require_step(FlowStep::Code)?;

        if let Some(remaining_secs) = self.resend_remaining_secs() {
            if remaining_secs > 0 {
                return Err(FlowError::ResendNotReady { remaining_secs });
            }
        }

        self.issue_code()?;
        self.draft.code.clear();

        info!("Verification code reissued");
        Ok(())
    }

    /// Move one step back.
    ///
    /// Going back from the code or new-password step discards progress, so
    /// those transitions only happen when `confirmed` is true; otherwise
    /// [`FlowError::ConfirmationRequired`] tells the caller to ask first.
    /// The email step has no previous step, and the terminal step only
    /// leaves via [`ResetFlow::restart`].
    pub fn retreat(&mut self, confirmed: bool) -> Result<(), FlowError> {
        match self.step {
            FlowStep::Email => Err(FlowError::NoPreviousStep),
            FlowStep::Success => Err(FlowError::FlowComplete),
            FlowStep::Code => {
                if !confirmed {
                    return Err(FlowError::ConfirmationRequired);
                }
                debug!("Retreating to the email step");
                self.step = FlowStep::Email;
                Ok(())
            }
            FlowStep::NewPassword => {
                if !confirmed {
                    return Err(FlowError::ConfirmationRequired);
                }
                debug!("Retreating to the code step");
                self.step = FlowStep::Code;
                Ok(())
            }
        }
    }

    /// Reset the whole flow back to the email step with an empty draft
    pub fn restart(&mut self) {
        debug!("Restarting flow");
        self.step = FlowStep::Email;
        self.draft = CredentialsDraft::default();
        self.countdown = None;
        self.attempts = AttemptLimiter::new(self.settings.max_verify_attempts);
    }

    /// Arm a fresh countdown and zero the attempt counter. Stands in for
    /// sending a code; the prototype has no delivery mechanism.
    fn issue_code(&mut self) -> Result<(), FlowError> {
        let countdown = Countdown::start(
            self.clock.as_ref(),
            self.store.as_ref(),
            self.settings.resend_cooldown_secs,
        )?;
        self.countdown = Some(countdown);
        self.attempts.reset(self.store.as_ref())?;
        Ok(())
    }

    fn require_step(&self, expected: FlowStep) -> Result<(), FlowError> {
        if self.step != expected {
            return Err(FlowError::WrongStep {
                step: self.step.as_str(),
            });
        }
        Ok(())
    }
}
