use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::fmt;

use crate::flow::{CODE_LENGTH, EMAIL_REGEX};

/// Password requirement types for validation
#[derive(Debug, Clone, PartialEq)]
pub enum PasswordRequirement {
    MinimumLength(usize),
    ContainsUppercase,
    ContainsLowercase,
    ContainsNumbers,
}

impl fmt::Display for PasswordRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordRequirement::MinimumLength(len) => {
                write!(f, "at least {} characters long", len)
            }
            PasswordRequirement::ContainsUppercase => {
                write!(f, "contain at least one uppercase letter")
            }
            PasswordRequirement::ContainsLowercase => {
                write!(f, "contain at least one lowercase letter")
            }
            PasswordRequirement::ContainsNumbers => write!(f, "contain at least one number"),
        }
    }
}

/// Validation errors
///
/// Each message is user-facing; the caller displays it inline and blocks the
/// step transition until the field is corrected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter the complete verification code")]
    IncompleteCode,

    #[error("Please create a new password")]
    EmptyPassword,

    #[error("Your password must be {0}")]
    RequirementsNotMet(String),

    #[error(
        "The passwords you entered do not match. Please ensure both fields contain the same password"
    )]
    PasswordMismatch,
}

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(EMAIL_REGEX).expect("email regex is a compile-time constant");
}

/// Validate an email address against a simple `local@domain.tld` shape
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() || !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate that a verification code is exactly four numeric digits
pub fn validate_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::IncompleteCode);
    }

    Ok(())
}

/// Validate a new password against the strength rules and its confirmation
pub fn validate_new_password(
    password: &str,
    confirmation: &str,
    min_length: usize,
) -> Result<(), ValidationError> {
    debug!("Validating new password strength");

    if password.is_empty() {
        return Err(ValidationError::EmptyPassword);
    }

    let mut failed_requirements = Vec::new();

    if password.chars().count() < min_length {
        failed_requirements.push(PasswordRequirement::MinimumLength(min_length));
    }

    if !password.chars().any(|c| c.is_uppercase()) {
        failed_requirements.push(PasswordRequirement::ContainsUppercase);
    }

    if !password.chars().any(|c| c.is_lowercase()) {
        failed_requirements.push(PasswordRequirement::ContainsLowercase);
    }

    if !password.chars().any(|c| c.is_numeric()) {
        failed_requirements.push(PasswordRequirement::ContainsNumbers);
    }

    if !failed_requirements.is_empty() {
        let requirements_str = failed_requirements
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<String>>()
            .join(", ");

        return Err(ValidationError::RequirementsNotMet(requirements_str));
    }

    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::MIN_PASSWORD_LENGTH;
    use test_case::test_case;

    #[test_case("user@example.com" ; "plain address")]
    #[test_case("first.last@sub.domain.co" ; "dotted local and subdomain")]
    #[test_case("  user@example.com  " ; "surrounding whitespace is trimmed")]
    fn test_email_valid(email: &str) {
        assert!(validate_email(email).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "whitespace only")]
    #[test_case("userexample.com" ; "missing at sign")]
    #[test_case("user@example" ; "missing tld")]
    #[test_case("user name@example.com" ; "space in local part")]
    fn test_email_invalid(email: &str) {
        assert_eq!(validate_email(email), Err(ValidationError::InvalidEmail));
    }

    #[test_case("0000")]
    #[test_case("1234")]
    #[test_case("9999")]
    fn test_code_valid(code: &str) {
        assert!(validate_code(code).is_ok());
    }

    #[test_case("" ; "empty")]
    #[test_case("123" ; "too short")]
    #[test_case("12345" ; "too long")]
    #[test_case("12a4" ; "non digit")]
    #[test_case("12 4" ; "embedded space")]
    fn test_code_invalid(code: &str) {
        assert_eq!(validate_code(code), Err(ValidationError::IncompleteCode));
    }

    #[test]
    fn test_password_valid() {
        assert!(validate_new_password("Abcdefg1", "Abcdefg1", MIN_PASSWORD_LENGTH).is_ok());
    }

    #[test_case("Abcdef1", "at least 8 characters long" ; "seven chars fails length")]
    #[test_case("abcdefg1", "uppercase" ; "no uppercase")]
    #[test_case("Abcdefgh", "number" ; "no digit")]
    #[test_case("ABCDEFG1", "lowercase" ; "no lowercase")]
    fn test_password_requirement_failures(password: &str, expected_fragment: &str) {
        let result = validate_new_password(password, password, MIN_PASSWORD_LENGTH);
        match result {
            Err(ValidationError::RequirementsNotMet(msg)) => {
                assert!(
                    msg.contains(expected_fragment),
                    "expected {:?} in {:?}",
                    expected_fragment,
                    msg
                );
            }
            other => panic!("expected requirements failure, got {:?}", other),
        }
    }

    #[test]
    fn test_password_empty() {
        assert_eq!(
            validate_new_password("", "", MIN_PASSWORD_LENGTH),
            Err(ValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_password_mismatch() {
        assert_eq!(
            validate_new_password("Abcdefg1", "Abcdefg2", MIN_PASSWORD_LENGTH),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_strength_checked_before_match() {
        // A weak password is reported as weak even when the confirmation
        // also differs
        let result = validate_new_password("abc", "xyz", MIN_PASSWORD_LENGTH);
        assert!(matches!(result, Err(ValidationError::RequirementsNotMet(_))));
    }
}
