//! User identity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("user id must be a valid UUID")]
    InvalidId,
    #[error("email must not be empty")]
    EmptyEmail,
    #[error("email must contain a user and a host part")]
    MalformedEmail,
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    #[error("password hash must not be empty")]
    EmptyPasswordHash,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its textual form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an already-parsed UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 255;

/// Email address normalised to lowercase.
///
/// The check here is deliberately syntactic (non-empty user and host parts
/// around one `@`); deliverability is not this type's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`], lowercasing the input.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::EmailAddress;
    ///
    /// let email = EmailAddress::new("Ada@Example.org").expect("valid email");
    /// assert_eq!(email.as_ref(), "ada@example.org");
    /// ```
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.len() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        let Some((user, host)) = trimmed.split_once('@') else {
            return Err(UserValidationError::MalformedEmail);
        };
        if user.is_empty() || host.is_empty() || host.contains('@') {
            return Err(UserValidationError::MalformedEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque password hash in PHC string format.
///
/// The domain never inspects the hash; verification happens behind the
/// `PasswordHasher` port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash produced by the hashing adapter.
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(UserValidationError::EmptyPasswordHash);
        }
        Ok(Self(raw))
    }

    /// Borrow the PHC-formatted hash string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from validated parts.
    pub fn new(
        id: UserId,
        email: EmailAddress,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Normalised email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored password hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Account creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Capability interface required by the session layer.
///
/// Expressed as a trait on the user entity so the session machinery depends
/// on these predicates rather than on any framework base type.
pub trait Authenticatable {
    /// Identifier persisted into the session.
    fn auth_id(&self) -> UserId;

    /// Whether the account may log in. Accounts are never deactivated today,
    /// so this is constantly true; the seam exists for suspension support.
    fn is_active(&self) -> bool;

    /// Whether this value represents a verified identity.
    fn is_authenticated(&self) -> bool;
}

impl Authenticatable for User {
    fn auth_id(&self) -> UserId {
        self.id
    }

    fn is_active(&self) -> bool {
        true
    }

    fn is_authenticated(&self) -> bool {
        true
    }
}
