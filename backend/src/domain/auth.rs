//! Authentication primitives such as login and signup credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Minimum accepted password length for new accounts.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or malformed.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort { min: usize },
    /// The password confirmation did not match the password.
    PasswordMismatch,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords must match"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is syntactically valid and lowercased.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@example.org", "hunter2").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email suitable for user lookups.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup payload.
///
/// Enforces the account-creation password policy on top of the login
/// invariants: a minimum length and a matching confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupCredentials {
    /// Construct signup credentials from raw form inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if password != confirm_password {
            return Err(CredentialValidationError::PasswordMismatch);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email the account will be registered under.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password destined for the hashing port.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case("not-an-email", "pw")]
    fn login_rejects_bad_emails(#[case] email: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert!(matches!(err, CredentialValidationError::InvalidEmail(_)));
    }

    #[test]
    fn login_rejects_empty_password() {
        let err = LoginCredentials::try_from_parts("ada@example.org", "")
            .expect_err("empty password must fail");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[test]
    fn login_lowercases_email() {
        let creds =
            LoginCredentials::try_from_parts("Ada@Example.org", "hunter2").expect("valid creds");
        assert_eq!(creds.email().as_ref(), "ada@example.org");
        assert_eq!(creds.password(), "hunter2");
    }

    #[rstest]
    #[case("short", "short", CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    #[case("hunter2", "hunter3", CredentialValidationError::PasswordMismatch)]
    #[case("", "", CredentialValidationError::EmptyPassword)]
    fn signup_enforces_password_policy(
        #[case] password: &str,
        #[case] confirm: &str,
        #[case] expected: CredentialValidationError,
    ) {
        let err = SignupCredentials::try_from_parts("ada@example.org", password, confirm)
            .expect_err("policy violation must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn signup_accepts_matching_passwords() {
        let creds = SignupCredentials::try_from_parts("ada@example.org", "hunter22", "hunter22")
            .expect("valid signup");
        assert_eq!(creds.password(), "hunter22");
    }
}
