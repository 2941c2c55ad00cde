//! Authentication inputs: login credentials and registration requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a caller talks to a port or service.
//! Plaintext passwords live in zeroizing buffers and are wiped on drop.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{Email, UserValidationError};

/// Domain error returned when login payload values are structurally empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased but not shape-checked; an address
///   that could never have been registered fails at login as an ordinary
///   credential mismatch.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use auth_core::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" A@X.com", "Sup3rSecr3t!").unwrap();
/// assert_eq!(creds.email(), "a@x.com");
/// assert_eq!(creds.password(), "Sup3rSecr3t!");
///
/// let odd = LoginCredentials::try_from_parts("not-an-email", "pw").unwrap();
/// assert!(odd.account_email().is_none());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Normalised email as supplied by the caller.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Account key for store lookups, or `None` when the email could never
    /// have been registered.
    pub fn account_email(&self) -> Option<Email> {
        Email::parse(&self.email).ok()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub(crate) fn secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Raw registration payload.
///
/// Only the email is normalised at construction; the remaining fields are
/// validated by [`AuthService::register`](crate::domain::AuthService::register)
/// after the uniqueness check so a duplicate email is reported regardless of
/// the other inputs.
#[derive(Clone)]
pub struct RegistrationRequest {
    email: Email,
    password: Zeroizing<String>,
    password_confirmation: Zeroizing<String>,
    display_name: String,
    phone: String,
}

impl RegistrationRequest {
    /// Capture a registration payload, normalising the email.
    pub fn new(
        email: &str,
        password: &str,
        password_confirmation: &str,
        display_name: &str,
        phone: &str,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: Email::parse(email)?,
            password: Zeroizing::new(password.to_owned()),
            password_confirmation: Zeroizing::new(password_confirmation.to_owned()),
            display_name: display_name.to_owned(),
            phone: phone.to_owned(),
        })
    }

    /// Normalised account email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Repetition of the chosen password.
    pub fn password_confirmation(&self) -> &str {
        self.password_confirmation.as_str()
    }

    /// Raw display name input.
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Raw phone number input.
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Whether the confirmation equals the password.
    pub fn passwords_match(&self) -> bool {
        *self.password == *self.password_confirmation
    }

    pub(crate) fn secret(&self) -> Zeroizing<String> {
        self.password.clone()
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("password_confirmation", &"<redacted>")
            .field("display_name", &self.display_name)
            .field("phone", &self.phone)
            .finish()
    }
}
