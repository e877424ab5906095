//! Custom field validators for user input.
//!
//! Plugged into `#[derive(Validate)]` request structs via
//! `#[validate(custom(function = "..."))]`.

use std::borrow::Cow;

use validator::ValidationError;

pub const USERNAME_MIN_LEN: usize = 5;
pub const USERNAME_MAX_LEN: usize = 50;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 50;

pub const USERNAME_RULE_MESSAGE: &str =
    "Username must be 5-50 characters and contain only letters and digits";
pub const PASSWORD_RULE_MESSAGE: &str =
    "Password must be 6-50 characters and contain a digit and an uppercase letter";

/// Username: 5 to 50 ASCII letters or digits.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    let len = username.chars().count();
    let ok = (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len)
        && username.chars().all(|c| c.is_ascii_alphanumeric());
    if ok {
        Ok(())
    } else {
        Err(rule_error("username_policy", USERNAME_RULE_MESSAGE))
    }
}

/// Password: 6 to 50 characters with at least one digit and one uppercase letter.
pub fn validate_password_policy(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    let ok = (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_uppercase());
    if ok {
        Ok(())
    } else {
        Err(rule_error("password_policy", PASSWORD_RULE_MESSAGE))
    }
}

fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- validate_username ---------------------------------------------------

    #[test]
    fn username_accepts_alphanumeric() {
        assert!(validate_username("admin1").is_ok());
        assert!(validate_username("ABCDE").is_ok());
    }

    #[test]
    fn username_rejects_short_long_and_symbols() {
        assert!(validate_username("abcd").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
        assert!(validate_username("john_doe").is_err());
        assert!(validate_username("john doe").is_err());
    }

    // -- validate_password_policy --------------------------------------------

    #[test]
    fn password_needs_digit_and_uppercase() {
        assert!(validate_password_policy("Secret1").is_ok());
        assert!(validate_password_policy("secret1").is_err());
        assert!(validate_password_policy("Secrets").is_err());
    }

    #[test]
    fn password_length_bounds() {
        assert!(validate_password_policy("Abc12").is_err());
        assert!(validate_password_policy("Abc123").is_ok());
        let long = format!("A1{}", "x".repeat(49));
        assert!(validate_password_policy(&long).is_err());
    }

    #[test]
    fn errors_carry_a_message() {
        let err = validate_password_policy("x").unwrap_err();
        assert_eq!(err.message.as_deref(), Some(PASSWORD_RULE_MESSAGE));
    }
}
