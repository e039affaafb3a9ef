use anyhow::Result;

use crate::cli::utils::{print_header, print_info, print_success};
use crate::clock::Clock;
use crate::flow::{AttemptLimiter, Countdown, FlowSettings};
use crate::store::KeyValueStore;

/// Print the persisted cross-session state of the reset flow
pub fn show_status(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    settings: &FlowSettings,
) -> Result<()> {
    print_header("Reset Flow Status");

    match Countdown::load(store, settings.resend_cooldown_secs)? {
        Some(countdown) => {
            let remaining = countdown.remaining_secs(clock);
            if remaining > 0 {
                print_info(&format!("Resend countdown: {}s remaining", remaining));
            } else {
                print_info("Resend countdown: elapsed, a new code can be requested");
            }

            let attempts = AttemptLimiter::load(store, settings.max_verify_attempts)?;
            print_info(&format!(
                "Failed verification attempts: {} of {}",
                attempts.count(),
                settings.max_verify_attempts
            ));
            if attempts.is_exhausted() {
                print_info("Verification is blocked until a new code is requested.");
            }
        }
        None => {
            print_info("No password reset in progress.");
        }
    }

    Ok(())
}

/// Remove the persisted countdown and attempt keys
pub fn clear_state(store: &dyn KeyValueStore) -> Result<()> {
    Countdown::clear(store)?;
    AttemptLimiter::clear(store)?;
    print_success("Persisted reset state cleared.");
    Ok(())
}
