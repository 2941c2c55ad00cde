//! Password strength policy and salted Argon2id hashing.
//!
//! Hashing and verification are CPU-bound and synchronous here;
//! [`AuthService`](crate::domain::AuthService) moves them onto the blocking
//! pool.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::AuthError;

/// A single strength requirement a password failed to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordRule {
    /// Fewer characters than the policy minimum.
    MinLength {
        /// Minimum number of characters.
        min: usize,
    },
    /// More characters than the policy maximum.
    MaxLength {
        /// Maximum number of characters.
        max: usize,
    },
    /// No upper-case letter.
    Uppercase,
    /// No lower-case letter.
    Lowercase,
    /// No decimal digit.
    Digit,
    /// No character outside letters, digits, and whitespace.
    Symbol,
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength { min } => write!(f, "password must be at least {min} characters"),
            Self::MaxLength { max } => write!(f, "password must be at most {max} characters"),
            Self::Uppercase => write!(f, "password must contain an upper-case letter"),
            Self::Lowercase => write!(f, "password must contain a lower-case letter"),
            Self::Digit => write!(f, "password must contain a digit"),
            Self::Symbol => write!(f, "password must contain a symbol"),
        }
    }
}

/// Every rule a candidate password broke, in policy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicyViolations(Vec<PasswordRule>);

impl PasswordPolicyViolations {
    /// Rules that were not satisfied.
    pub fn rules(&self) -> &[PasswordRule] {
        &self.0
    }
}

impl fmt::Display for PasswordPolicyViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rule in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{rule}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for PasswordPolicyViolations {}

/// Minimum-strength policy applied to new passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum number of characters.
    pub min_length: usize,
    /// Maximum number of characters; bounds hashing cost per request.
    pub max_length: usize,
    /// Require at least one upper-case letter.
    pub require_uppercase: bool,
    /// Require at least one lower-case letter.
    pub require_lowercase: bool,
    /// Require at least one decimal digit.
    pub require_digit: bool,
    /// Require at least one symbol.
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordPolicy {
    /// Check `password` against every rule, collecting all violations.
    ///
    /// # Examples
    /// ```
    /// use auth_core::domain::{PasswordPolicy, PasswordRule};
    ///
    /// let policy = PasswordPolicy::default();
    /// assert!(policy.check("Sup3rSecr3t!").is_ok());
    ///
    /// let err = policy.check("short").unwrap_err();
    /// assert!(err.rules().contains(&PasswordRule::MinLength { min: 8 }));
    /// ```
    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyViolations> {
        let length = password.chars().count();
        let mut broken = Vec::new();

        if length < self.min_length {
            broken.push(PasswordRule::MinLength {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            broken.push(PasswordRule::MaxLength {
                max: self.max_length,
            });
        }
        if self.require_uppercase && !password.chars().any(char::is_uppercase) {
            broken.push(PasswordRule::Uppercase);
        }
        if self.require_lowercase && !password.chars().any(char::is_lowercase) {
            broken.push(PasswordRule::Lowercase);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            broken.push(PasswordRule::Digit);
        }
        if self.require_symbol
            && !password
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            broken.push(PasswordRule::Symbol);
        }

        if broken.is_empty() {
            Ok(())
        } else {
            Err(PasswordPolicyViolations(broken))
        }
    }
}

/// Salted one-way password digest in PHC string format.
///
/// The digest is opaque to callers: it has no `Display` implementation and
/// its `Debug` output is redacted so it cannot leak through logs or error
/// messages.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a PHC string loaded from storage, rejecting unparsable input.
    pub fn from_phc(phc: impl Into<String>) -> Result<Self, HashingError> {
        let phc = phc.into();
        password_hash::PasswordHash::new(&phc)
            .map_err(|err| HashingError::Malformed(err.to_string()))?;
        Ok(Self(phc))
    }

    /// PHC string for persistence adapters.
    pub fn as_phc_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Errors raised while configuring or running the password hasher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashingError {
    /// The Argon2 cost parameters were rejected.
    #[error("invalid password hashing parameters: {0}")]
    InvalidParams(String),
    /// A stored digest could not be parsed.
    #[error("password hash is malformed: {0}")]
    Malformed(String),
    /// Argon2 failed while deriving a digest.
    #[error("password hashing failed: {0}")]
    Derivation(String),
}

impl From<HashingError> for AuthError {
    fn from(value: HashingError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes over memory.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Argon2id password hasher with a precomputed dummy digest.
///
/// The dummy digest lets callers spend the same verification effort when an
/// account does not exist, so response latency does not reveal whether an
/// email is registered.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy: PasswordHash,
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish_non_exhaustive()
    }
}

impl PasswordHasher {
    /// Build a hasher and derive its dummy digest with the same parameters.
    pub fn new(params: HashingParams) -> Result<Self, HashingError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|err| HashingError::InvalidParams(err.to_string()))?;
        let dummy_secret = hex::encode(rand::random::<[u8; 32]>());
        let dummy = derive(&params, &dummy_secret)?;
        Ok(Self { params, dummy })
    }

    /// Derive a fresh salted digest for `password`.
    pub fn hash(&self, password: &str) -> Result<PasswordHash, HashingError> {
        derive(&self.params, password)
    }

    /// Check `password` against `hash` in constant time.
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// digest is unusable.
    pub fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, HashingError> {
        let parsed = password_hash::PasswordHash::new(hash.as_phc_str())
            .map_err(|err| HashingError::Malformed(err.to_string()))?;
        match argon2(&self.params).verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(HashingError::Derivation(err.to_string())),
        }
    }

    /// Spend one verification against the dummy digest; always a mismatch.
    pub fn verify_dummy(&self, password: &str) {
        // Outcome is irrelevant; only the elapsed work matters.
        drop(self.verify(password, &self.dummy));
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn derive(params: &Params, password: &str) -> Result<PasswordHash, HashingError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| PasswordHash(hash.to_string()))
        .map_err(|err| HashingError::Derivation(err.to_string()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingParams {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap test parameters are valid")
    }

    #[rstest]
    #[case("Sup3rSecr3t!")]
    #[case("Ünïcödé-Pa55")]
    fn default_policy_accepts_strong_passwords(#[case] password: &str) {
        assert!(PasswordPolicy::default().check(password).is_ok());
    }

    #[rstest]
    #[case("Sh0rt!", vec![PasswordRule::MinLength { min: 8 }])]
    #[case("alllowercase1!", vec![PasswordRule::Uppercase])]
    #[case("ALLUPPERCASE1!", vec![PasswordRule::Lowercase])]
    #[case("NoDigitsHere!", vec![PasswordRule::Digit])]
    #[case("NoSymbols123", vec![PasswordRule::Symbol])]
    #[case("abc", vec![
        PasswordRule::MinLength { min: 8 },
        PasswordRule::Uppercase,
        PasswordRule::Digit,
        PasswordRule::Symbol,
    ])]
    fn default_policy_reports_every_violation(
        #[case] password: &str,
        #[case] expected: Vec<PasswordRule>,
    ) {
        let err = PasswordPolicy::default()
            .check(password)
            .expect_err("weak password must fail");
        assert_eq!(err.rules(), expected.as_slice());
    }

    #[rstest]
    fn max_length_is_enforced() {
        let policy = PasswordPolicy {
            max_length: 10,
            ..PasswordPolicy::default()
        };
        let err = policy
            .check("Aa1!Aa1!Aa1!")
            .expect_err("overlong password must fail");
        assert_eq!(err.rules(), &[PasswordRule::MaxLength { max: 10 }]);
    }

    #[rstest]
    fn relaxed_policy_only_checks_length() {
        let policy = PasswordPolicy {
            min_length: 4,
            max_length: 64,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
        };
        assert!(policy.check("wxyz").is_ok());
    }

    #[rstest]
    fn violations_display_joins_messages() {
        let err = PasswordPolicy::default()
            .check("abcdefgh")
            .expect_err("weak password must fail");
        assert_eq!(
            err.to_string(),
            "password must contain an upper-case letter; \
             password must contain a digit; password must contain a symbol"
        );
    }

    #[rstest]
    fn hash_verifies_matching_password(hasher: PasswordHasher) {
        let hash = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        assert!(hasher.verify("Sup3rSecr3t!", &hash).expect("verify runs"));
        assert!(!hasher.verify("wrong", &hash).expect("verify runs"));
    }

    #[rstest]
    fn identical_passwords_get_distinct_salts(hasher: PasswordHasher) {
        let first = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        let second = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    fn hash_is_phc_argon2id_and_never_plaintext(hasher: PasswordHasher) {
        let hash = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        assert!(hash.as_phc_str().starts_with("$argon2id$"));
        assert!(!hash.as_phc_str().contains("Sup3rSecr3t!"));
    }

    #[rstest]
    fn debug_output_is_redacted(hasher: PasswordHasher) {
        let hash = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }

    #[rstest]
    fn verification_uses_parameters_stored_in_the_hash(hasher: PasswordHasher) {
        let stronger = PasswordHasher::new(HashingParams {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        })
        .expect("valid parameters");
        let hash = stronger.hash("Sup3rSecr3t!").expect("hashing succeeds");
        assert!(hasher.verify("Sup3rSecr3t!", &hash).expect("verify runs"));
    }

    #[rstest]
    fn malformed_phc_strings_are_rejected() {
        let err = PasswordHash::from_phc("not-a-phc-string").expect_err("must fail");
        assert!(matches!(err, HashingError::Malformed(_)));
    }

    #[rstest]
    fn stored_hashes_round_trip_through_phc(hasher: PasswordHasher) {
        let hash = hasher.hash("Sup3rSecr3t!").expect("hashing succeeds");
        let loaded = PasswordHash::from_phc(hash.as_phc_str()).expect("valid PHC");
        assert!(hasher.verify("Sup3rSecr3t!", &loaded).expect("verify runs"));
    }

    #[rstest]
    #[case("Sup3rSecr3t!")]
    #[case("")]
    fn dummy_digest_is_a_real_verification_that_never_matches(
        hasher: PasswordHasher,
        #[case] password: &str,
    ) {
        assert!(hasher.dummy.as_phc_str().starts_with("$argon2id$"));
        assert_eq!(hasher.verify(password, &hasher.dummy), Ok(false));
        hasher.verify_dummy(password);
    }

    #[rstest]
    fn invalid_cost_parameters_are_rejected() {
        let err = PasswordHasher::new(HashingParams {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .expect_err("zero iterations must fail");
        assert!(matches!(err, HashingError::InvalidParams(_)));
    }
}
