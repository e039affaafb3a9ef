use anyhow::Result;
use std::time::Duration;

use crate::cli::utils::{
    confirm, display_spinner, print_error, print_header, print_info, print_success, print_warning,
    read_line, read_password,
};
use crate::flow::{FlowError, FlowStep, ResetFlow};

// Fixed waits standing in for network latency; nothing is actually sent
const SEND_CODE_WAIT: Duration = Duration::from_millis(800);
const VERIFY_CODE_WAIT: Duration = Duration::from_millis(800);
const RESET_PASSWORD_WAIT: Duration = Duration::from_millis(1000);

/// Drive the reset wizard interactively until it completes or the user quits
pub fn run_reset(mut flow: ResetFlow) -> Result<()> {
    print_header("Reset Your Password");

    if flow.step() == FlowStep::Code {
        print_info("Resuming a verification that was already in progress.");
    }

    loop {
        match flow.step() {
            FlowStep::Email => {
                if !email_step(&mut flow)? {
                    return Ok(());
                }
            }
            FlowStep::Code => code_step(&mut flow)?,
            FlowStep::NewPassword => password_step(&mut flow)?,
            FlowStep::Success => {
                if !success_step(&mut flow)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Email step; returns false when the user quits the wizard
fn email_step(flow: &mut ResetFlow) -> Result<bool> {
    print_info("Enter your email and we'll send you a verification code.");

    let email = read_line("Email (q to quit): ")?;
    if email.eq_ignore_ascii_case("q") {
        return Ok(false);
    }

    display_spinner("Sending verification code...", SEND_CODE_WAIT)?;

    match flow.submit_email(&email) {
        Ok(()) => {
            print_success(&format!("A 4-digit code was sent to {}", flow.email()));
            print_info("(demo build: the accepted codes are fixed, try 0000)");
        }
        Err(e) => print_error(&e.to_string()),
    }

    Ok(true)
}

fn code_step(flow: &mut ResetFlow) -> Result<()> {
    if let Some(remaining) = flow.resend_remaining_secs() {
        if remaining > 0 {
            print_info(&format!("Resend available in {}s", remaining));
        } else {
            print_info("You can request a new code with 'r'.");
        }
    }
    if flow.failed_attempts() > 0 {
        print_warning(&format!("Attempts remaining: {}", flow.attempts_remaining()));
    }

    let input = read_line("Enter the 4-digit code (r = resend, b = back): ")?;

    match input.as_str() {
        "r" | "R" => {
            display_spinner("Sending a new code...", SEND_CODE_WAIT)?;
            match flow.resend_code() {
                Ok(()) => print_success("A new verification code has been sent to your email."),
                Err(e) => print_error(&e.to_string()),
            }
        }
        "b" | "B" => retreat_with_confirmation(
            flow,
            "Are you sure you want to go back? You'll need to restart the process.",
        )?,
        code => {
            display_spinner("Verifying...", VERIFY_CODE_WAIT)?;
            match flow.verify_code(code) {
                Ok(()) => print_success("Code verified."),
                Err(e) => print_error(&e.to_string()),
            }
        }
    }

    Ok(())
}

fn password_step(flow: &mut ResetFlow) -> Result<()> {
    print_info("Create a new password (min 8 chars, with upper case, lower case and a digit).");
    print_info("Leave empty and press Enter to go back.");

    let password = read_password("New password: ")?;
    if password.is_empty() {
        return retreat_with_confirmation(flow, "Going back will require you to re-verify your code. Continue?");
    }

    let confirmation = read_password("Confirm password: ")?;

    display_spinner("Resetting password...", RESET_PASSWORD_WAIT)?;
    match flow.submit_password(&password, &confirmation) {
        Ok(()) => {}
        Err(e) => print_error(&e.to_string()),
    }

    Ok(())
}

/// Terminal step; returns false when the user is done
fn success_step(flow: &mut ResetFlow) -> Result<bool> {
    print_success("Your password has been reset successfully.");
    print_info("You can now log in with your new password.");

    if confirm("Return to the start of the flow?")? {
        flow.restart();
        print_header("Reset Your Password");
        Ok(true)
    } else {
        Ok(false)
    }
}

fn retreat_with_confirmation(flow: &mut ResetFlow, question: &str) -> Result<()> {
    // First ask the flow; it refuses unconfirmed retreats from these steps
    match flow.retreat(false) {
        Err(FlowError::ConfirmationRequired) => {
            if confirm(question)? {
                flow.retreat(true)?;
            }
        }
        Ok(()) => {}
        Err(e) => print_error(&e.to_string()),
    }

    Ok(())
}
