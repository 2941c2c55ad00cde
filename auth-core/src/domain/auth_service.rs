//! Registration, login, token validation, and profile retrieval.
//!
//! `AuthService` holds no mutable state of its own: the credential store is
//! the only shared resource, and its uniqueness guarantee backs the
//! exactly-once registration requirement. Password hashing runs on the Tokio
//! blocking pool so concurrent logins do not stall request-handling workers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CredentialStore, CredentialStoreError, LoginService, RegistrationCommand, UserProfileQuery,
};
use crate::domain::{
    AuthError, AuthResult, AuthenticatedSubject, DisplayName, Email, LoginCredentials,
    PasswordHasher, PasswordPolicy, PhoneNumber, RegistrationRequest, Token, TokenService, UserId,
    UserProfile, UserRecord, ValidationFailure,
};

/// Authentication core wired to a credential store, hasher, and token service.
pub struct AuthService<S> {
    store: Arc<S>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    tokens: TokenService,
    clock: Arc<dyn Clock>,
    hash_timeout: Option<Duration>,
}

impl<S> AuthService<S> {
    /// Create a service with the default password policy and no hashing
    /// timeout.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use std::time::Duration;
    /// # use auth_core::domain::{AuthService, HashingParams, PasswordHasher, SigningKey, TokenService};
    /// # use auth_core::outbound::memory::InMemoryCredentialStore;
    /// # use mockable::DefaultClock;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let clock = Arc::new(DefaultClock);
    /// let tokens = TokenService::new(SigningKey::generate(), Duration::from_secs(3600), clock.clone());
    /// let service = AuthService::new(
    ///     Arc::new(InMemoryCredentialStore::default()),
    ///     PasswordHasher::new(HashingParams::default())?,
    ///     tokens,
    ///     clock,
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        store: Arc<S>,
        hasher: PasswordHasher,
        tokens: TokenService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            hasher,
            policy: PasswordPolicy::default(),
            tokens,
            clock,
            hash_timeout: None,
        }
    }

    /// Replace the password strength policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound how long a caller waits for hashing or verification.
    ///
    /// The blocking task still runs to completion; only the wait is cut short
    /// and reported as [`AuthError::HashingUnavailable`].
    #[must_use]
    pub fn with_hash_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hash_timeout = timeout;
        self
    }

    /// Active password policy.
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Issue a token for an already verified subject.
    pub fn issue_token(&self, subject: &Email) -> AuthResult<Token> {
        self.tokens.issue(subject)
    }

    /// Validate a presented token without touching the store.
    pub fn validate_token(&self, token: &Token) -> AuthResult<AuthenticatedSubject> {
        self.tokens.validate(token).map_err(AuthError::from)
    }

    async fn run_blocking<T, F>(&self, work: F) -> AuthResult<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let task = tokio::task::spawn_blocking(work);
        let joined = match self.hash_timeout {
            Some(limit) => tokio::time::timeout(limit, task).await.map_err(|_| {
                warn!(timeout_ms = limit.as_millis(), "password hashing timed out");
                AuthError::hashing_unavailable(format!("hashing exceeded {}ms", limit.as_millis()))
            })?,
            None => task.await,
        };
        joined.map_err(|err| AuthError::hashing_unavailable(format!("hashing task failed: {err}")))
    }
}

impl<S> AuthService<S>
where
    S: CredentialStore,
{
    /// Create an account.
    ///
    /// The uniqueness check runs first, so a taken email is reported as
    /// [`AuthError::EmailAlreadyRegistered`] whatever else the request holds.
    /// The store's atomic insert settles races between concurrent callers.
    pub async fn register(&self, request: RegistrationRequest) -> AuthResult<UserProfile> {
        let email = request.email().clone();
        if self
            .store
            .exists_by_email(&email)
            .await
            .map_err(map_store_error)?
        {
            debug!("registration rejected: email already registered");
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let display_name = DisplayName::new(request.display_name())?;
        let phone = PhoneNumber::new(request.phone())?;
        self.policy.check(request.password())?;
        if !request.passwords_match() {
            return Err(ValidationFailure::PasswordMismatch.into());
        }

        let hasher = self.hasher.clone();
        let secret = request.secret();
        let password_hash = self.run_blocking(move || hasher.hash(&secret)).await??;

        let record = UserRecord::new(
            UserId::random(),
            email,
            password_hash,
            display_name,
            phone,
            self.clock.utc(),
        );
        self.store.insert(&record).await.map_err(map_store_error)?;

        info!(user_id = %record.id(), "registered user");
        Ok(UserProfile::from(&record))
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Unknown or malformed emails are verified against a dummy digest so
    /// every failure mode costs one Argon2 verification and returns the same
    /// error.
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Token> {
        let record = match credentials.account_email() {
            Some(email) => self
                .store
                .find_by_email(&email)
                .await
                .map_err(map_store_error)?,
            None => None,
        };

        let hasher = self.hasher.clone();
        let secret = credentials.secret();
        let authenticated = match record {
            Some(record) => {
                let hash = record.password_hash().clone();
                let matches = self
                    .run_blocking(move || hasher.verify(&secret, &hash))
                    .await??;
                matches.then_some(record)
            }
            None => {
                self.run_blocking(move || hasher.verify_dummy(&secret))
                    .await?;
                None
            }
        };

        let Some(record) = authenticated else {
            debug!("login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let token = self.tokens.issue(record.email())?;
        debug!(user_id = %record.id(), "login succeeded");
        Ok(token)
    }

    /// Load the profile of a validated token subject.
    pub async fn get_profile(&self, subject: &AuthenticatedSubject) -> AuthResult<UserProfile> {
        self.store
            .find_by_email(subject.email())
            .await
            .map_err(map_store_error)?
            .map(|record| UserProfile::from(&record))
            .ok_or(AuthError::NotFound)
    }
}

fn map_store_error(error: CredentialStoreError) -> AuthError {
    match error {
        CredentialStoreError::Conflict => AuthError::EmailAlreadyRegistered,
        other => {
            warn!(error = %other, "credential store failure");
            AuthError::store_unavailable(other.to_string())
        }
    }
}

#[async_trait]
impl<S> RegistrationCommand for AuthService<S>
where
    S: CredentialStore + 'static,
{
    async fn register(&self, request: RegistrationRequest) -> AuthResult<UserProfile> {
        AuthService::register(self, request).await
    }
}

#[async_trait]
impl<S> LoginService for AuthService<S>
where
    S: CredentialStore + 'static,
{
    async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Token> {
        AuthService::login(self, credentials).await
    }

    fn validate_token(&self, token: &Token) -> AuthResult<AuthenticatedSubject> {
        AuthService::validate_token(self, token)
    }
}

#[async_trait]
impl<S> UserProfileQuery for AuthService<S>
where
    S: CredentialStore + 'static,
{
    async fn fetch_profile(&self, subject: &AuthenticatedSubject) -> AuthResult<UserProfile> {
        self.get_profile(subject).await
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
