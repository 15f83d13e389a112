//! Account signup and login over the user repository and hashing ports.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use super::auth::{LoginCredentials, SignupCredentials};
use super::error::Error;
use super::ports::{PasswordHasher, UserPersistenceError, UserRepository};
use super::user::{Authenticatable, User, UserId};

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateEmail => {
            Error::conflict("email is already registered; log in instead")
        }
    }
}

/// Use-case service for signup and login.
///
/// Login failures are deliberately uniform ("invalid email or password")
/// whether the email is unknown or the password wrong.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl AccountService {
    /// Create a service over a user store and a password hasher.
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Conflict when the email is already registered; internal errors for
    /// hashing failures; persistence failures map to service-unavailable or
    /// internal errors.
    pub async fn signup(&self, credentials: &SignupCredentials) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?;
        if existing.is_some() {
            return Err(Error::conflict("email is already registered; log in instead"));
        }

        let password_hash = self
            .hasher
            .hash(credentials.password())
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;

        let user = User::new(
            UserId::random(),
            credentials.email().clone(),
            password_hash,
            Utc::now(),
        );
        self.users
            .insert(&user)
            .await
            .map_err(map_persistence_error)?;
        debug!(user_id = %user.id(), "account created");
        Ok(user)
    }

    /// Authenticate an existing account.
    ///
    /// # Errors
    ///
    /// Unauthorized for unknown email or wrong password; forbidden for an
    /// inactive account; persistence and hashing failures map as for
    /// [`AccountService::signup`].
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
        else {
            return Err(Error::unauthorized("invalid email or password"));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))?;
        if !verified {
            return Err(Error::unauthorized("invalid email or password"));
        }
        if !user.is_active() {
            return Err(Error::forbidden("account is disabled"));
        }
        Ok(user)
    }

    /// Load the account behind a session subject.
    ///
    /// # Errors
    ///
    /// Unauthorized when the id no longer resolves to an account.
    pub async fn find(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for signup/login flows over stubbed ports.

    use std::sync::Mutex;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::PasswordHashError;
    use crate::domain::user::{EmailAddress, PasswordHash};

    #[derive(Default)]
    struct StubUserRepository {
        rows: Mutex<Vec<User>>,
        find_failure: Option<UserPersistenceError>,
    }

    impl StubUserRepository {
        fn with_user(user: User) -> Self {
            Self {
                rows: Mutex::new(vec![user]),
                find_failure: None,
            }
        }

        fn failing(error: UserPersistenceError) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                find_failure: Some(error),
            }
        }

        fn row_count(&self) -> usize {
            self.rows.lock().expect("rows lock").len()
        }
    }

    #[async_trait]
    impl UserRepository for StubUserRepository {
        async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
            self.rows.lock().expect("rows lock").push(user.clone());
            Ok(())
        }

        async fn find_by_email(
            &self,
            email: &EmailAddress,
        ) -> Result<Option<User>, UserPersistenceError> {
            if let Some(error) = &self.find_failure {
                return Err(error.clone());
            }
            Ok(self
                .rows
                .lock()
                .expect("rows lock")
                .iter()
                .find(|u| u.email() == email)
                .cloned())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
            Ok(self
                .rows
                .lock()
                .expect("rows lock")
                .iter()
                .find(|u| u.id() == id)
                .cloned())
        }
    }

    /// Reversible stand-in for the hashing port: "hashed:<password>".
    struct StubHasher {
        fail: bool,
    }

    impl StubHasher {
        fn working() -> Self {
            Self { fail: false }
        }

        fn failing() -> Self {
            Self { fail: true }
        }
    }

    impl PasswordHasher for StubHasher {
        fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
            if self.fail {
                return Err(PasswordHashError::backend("hashing backend down"));
            }
            PasswordHash::new(format!("hashed:{password}"))
                .map_err(|err| PasswordHashError::backend(err.to_string()))
        }

        fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHashError> {
            if self.fail {
                return Err(PasswordHashError::backend("hashing backend down"));
            }
            Ok(hash.as_str() == format!("hashed:{password}"))
        }
    }

    fn signup_credentials(email: &str) -> SignupCredentials {
        SignupCredentials::try_from_parts(email, "hunter22", "hunter22").expect("valid signup")
    }

    fn login_credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid login")
    }

    fn existing_user(email: &str) -> User {
        User::new(
            UserId::random(),
            EmailAddress::new(email).expect("valid email"),
            PasswordHash::new("hashed:hunter22").expect("valid hash"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn signup_hashes_password_and_stores_user() {
        let repository = Arc::new(StubUserRepository::default());
        let service = AccountService::new(repository.clone(), Arc::new(StubHasher::working()));

        let user = service
            .signup(&signup_credentials("Ada@Example.org"))
            .await
            .expect("signup should succeed");

        assert_eq!(user.email().as_ref(), "ada@example.org");
        assert_eq!(user.password_hash().as_str(), "hashed:hunter22");
        assert_eq!(repository.row_count(), 1);
    }

    #[tokio::test]
    async fn signup_rejects_registered_email() {
        let repository = Arc::new(StubUserRepository::with_user(existing_user(
            "ada@example.org",
        )));
        let service = AccountService::new(repository.clone(), Arc::new(StubHasher::working()));

        let err = service
            .signup(&signup_credentials("ada@example.org"))
            .await
            .expect_err("duplicate email must fail");

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(repository.row_count(), 1, "no second row");
    }

    #[tokio::test]
    async fn signup_surfaces_hashing_failures_as_internal() {
        let service = AccountService::new(
            Arc::new(StubUserRepository::default()),
            Arc::new(StubHasher::failing()),
        );

        let err = service
            .signup(&signup_credentials("ada@example.org"))
            .await
            .expect_err("hashing failure must surface");

        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[case("nobody@example.org", "hunter22")]
    #[case("ada@example.org", "wrong-password")]
    #[tokio::test]
    async fn login_failure_is_uniform(#[case] email: &str, #[case] password: &str) {
        let repository = Arc::new(StubUserRepository::with_user(existing_user(
            "ada@example.org",
        )));
        let service = AccountService::new(repository, Arc::new(StubHasher::working()));

        let err = service
            .login(&login_credentials(email, password))
            .await
            .expect_err("bad credentials must fail");

        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid email or password");
    }

    #[tokio::test]
    async fn login_succeeds_with_correct_password() {
        let repository = Arc::new(StubUserRepository::with_user(existing_user(
            "ada@example.org",
        )));
        let service = AccountService::new(repository, Arc::new(StubHasher::working()));

        let user = service
            .login(&login_credentials("Ada@example.org", "hunter22"))
            .await
            .expect("login should succeed");

        assert_eq!(user.email().as_ref(), "ada@example.org");
    }

    #[tokio::test]
    async fn login_maps_connection_failures_to_service_unavailable() {
        let repository = Arc::new(StubUserRepository::failing(
            UserPersistenceError::connection("database unavailable"),
        ));
        let service = AccountService::new(repository, Arc::new(StubHasher::working()));

        let err = service
            .login(&login_credentials("ada@example.org", "hunter22"))
            .await
            .expect_err("connection failure must surface");

        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
