//! Authentication and credential-change primitives.
//!
//! Inbound payload parsing stays outside the domain: handlers build these
//! types through validating constructors before talking to a service, and
//! password material is wrapped in [`Zeroizing`] so it is wiped when dropped.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, Email, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Password was empty.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort { min: usize },
    /// A user field failed validation.
    User(UserValidationError),
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<UserValidationError> for CredentialValidationError {
    fn from(err: UserValidationError) -> Self {
        Self::User(err)
    }
}

fn validate_new_password(password: &str) -> Result<(), CredentialValidationError> {
    if password.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }
    Ok(())
}

/// Validated login credentials.
///
/// The password retains caller-provided whitespace; trimming credentials
/// before comparison leads to surprising lockouts.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self {
            email: Email::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address used for the account lookup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password exactly as the caller provided it.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone)]
pub struct Registration {
    display_name: DisplayName,
    email: Email,
    password: Zeroizing<String>,
}

impl Registration {
    /// Construct a registration from raw form inputs.
    pub fn try_from_parts(
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        validate_new_password(password)?;
        Ok(Self {
            display_name: DisplayName::new(display_name)?,
            email: Email::new(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Display name the account will carry.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Login email for the new account.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password to be hashed by the account service.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated password-change request.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    current_password: Zeroizing<String>,
    new_password: Zeroizing<String>,
}

impl PasswordChange {
    /// Construct a password change from raw form inputs.
    pub fn try_from_parts(
        current_password: &str,
        new_password: &str,
    ) -> Result<Self, CredentialValidationError> {
        if current_password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        validate_new_password(new_password)?;
        Ok(Self {
            current_password: Zeroizing::new(current_password.to_owned()),
            new_password: Zeroizing::new(new_password.to_owned()),
        })
    }

    /// The password the caller claims to currently have.
    pub fn current_password(&self) -> &str {
        self.current_password.as_str()
    }

    /// The replacement password.
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}
