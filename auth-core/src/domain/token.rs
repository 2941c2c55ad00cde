//! Stateless bearer tokens signed with HMAC-SHA256.
//!
//! Wire format: `base64url(header) "." base64url(claims) "." base64url(mac)`,
//! unpadded, JWT-compatible. The header is fixed and the claims serialise in
//! declaration order (`sub`, `iat`, `exp`), so a token is a pure function of
//! subject, issue time, expiry, and key.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::{AuthError, Email};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "HS256";
const TOKEN_TYPE: &str = "JWT";

/// Minimum signing key length in bytes.
pub const SIGNING_KEY_MIN_LEN: usize = 32;

/// Length of the key fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Errors raised when constructing a [`SigningKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningKeyError {
    /// Key material is shorter than [`SIGNING_KEY_MIN_LEN`].
    #[error("signing key too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        /// Supplied key length in bytes.
        length: usize,
        /// Required minimum length in bytes.
        min_len: usize,
    },
}

/// Symmetric secret used to sign and verify tokens.
///
/// The material is wiped on drop and never printed; use
/// [`SigningKey::fingerprint`] to identify a key in logs.
#[derive(Clone)]
pub struct SigningKey(Zeroizing<Vec<u8>>);

impl SigningKey {
    /// Wrap provided key material.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SigningKeyError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < SIGNING_KEY_MIN_LEN {
            return Err(SigningKeyError::TooShort {
                length: bytes.len(),
                min_len: SIGNING_KEY_MIN_LEN,
            });
        }
        Ok(Self(bytes))
    }

    /// Generate a random 64-byte key for development use.
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0_u8; 64]);
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, bytes.as_mut_slice());
        Self(bytes)
    }

    /// Truncated SHA-256 fingerprint as 16 hex characters.
    ///
    /// Sufficient for telling keys apart in logs without exposing them.
    ///
    /// # Examples
    /// ```
    /// use auth_core::domain::SigningKey;
    ///
    /// let key = SigningKey::new(vec![b'k'; 32]).unwrap();
    /// let fp = key.fingerprint();
    /// assert_eq!(fp.len(), 16);
    /// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_slice());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.0.as_slice()).ok()
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKey(fingerprint={})", self.fingerprint())
    }
}

/// Why a token failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenRejection {
    /// Not three base64url segments, or a segment did not decode.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the header and claims.
    #[error("token signature mismatch")]
    BadSignature,
    /// The header names an algorithm other than HS256.
    #[error("token algorithm is not supported")]
    UnsupportedAlgorithm,
    /// The expiry instant has passed.
    #[error("token has expired")]
    Expired,
}

/// Signed claim set carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the normalised account email.
    pub sub: String,
    /// Issue instant in Unix seconds.
    pub iat: i64,
    /// Expiry instant in Unix seconds.
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

/// Opaque bearer credential handed to clients.
///
/// `Display` yields the wire form; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a token received from a client.
    pub fn from_wire(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Identity proven by a successfully validated token.
///
/// Only [`TokenService::validate`] constructs this type, so holding one is
/// evidence that the signature and expiry checks passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    email: Email,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthenticatedSubject {
    /// Subject email.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// When the token was issued.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// When the token stops being accepted.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Issues and validates tokens with a single signing key.
#[derive(Clone)]
pub struct TokenService {
    key: Arc<SigningKey>,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &self.key)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a service issuing tokens valid for `ttl`.
    pub fn new(key: SigningKey, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            key: Arc::new(key),
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            clock,
        }
    }

    /// Issue a token for `subject` starting now.
    pub fn issue(&self, subject: &Email) -> Result<Token, AuthError> {
        let iat = self.clock.utc().timestamp();
        let exp = iat
            .checked_add(self.ttl_secs)
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or_else(|| AuthError::internal("token expiry is outside the timestamp range"))?;
        self.encode(&TokenClaims {
            sub: subject.to_string(),
            iat,
            exp,
        })
    }

    /// Sign an explicit claim set.
    pub fn encode(&self, claims: &TokenClaims) -> Result<Token, AuthError> {
        let header = serde_json::to_vec(&TokenHeader {
            alg: ALGORITHM.to_owned(),
            typ: TOKEN_TYPE.to_owned(),
        })
        .map_err(|err| AuthError::internal(format!("failed to serialize token header: {err}")))?;
        let payload = serde_json::to_vec(claims)
            .map_err(|err| AuthError::internal(format!("failed to serialize token claims: {err}")))?;
        self.sign_segments(&URL_SAFE_NO_PAD.encode(header), &URL_SAFE_NO_PAD.encode(payload))
    }

    /// Validate `token` and return the subject it proves.
    ///
    /// The signature is checked before any claim is decoded; expiry is
    /// checked against the injected clock.
    pub fn validate(&self, token: &Token) -> Result<AuthenticatedSubject, TokenRejection> {
        let mut segments = token.as_str().split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(TokenRejection::Malformed);
        };

        let signature = decode_segment(signature)?;
        let mut mac = self.key.mac().ok_or(TokenRejection::BadSignature)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenRejection::BadSignature)?;

        let header: TokenHeader = serde_json::from_slice(&decode_segment(header)?)
            .map_err(|_| TokenRejection::Malformed)?;
        if header.alg != ALGORITHM || header.typ != TOKEN_TYPE {
            return Err(TokenRejection::UnsupportedAlgorithm);
        }

        let claims: TokenClaims = serde_json::from_slice(&decode_segment(payload)?)
            .map_err(|_| TokenRejection::Malformed)?;
        if self.clock.utc().timestamp() > claims.exp {
            return Err(TokenRejection::Expired);
        }

        let issued_at =
            DateTime::from_timestamp(claims.iat, 0).ok_or(TokenRejection::Malformed)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(TokenRejection::Malformed)?;
        let email = Email::parse(&claims.sub).map_err(|_| TokenRejection::Malformed)?;

        Ok(AuthenticatedSubject {
            email,
            issued_at,
            expires_at,
        })
    }

    /// Sign pre-encoded header and claim segments.
    pub(crate) fn sign_segments(&self, header: &str, payload: &str) -> Result<Token, AuthError> {
        let mut mac = self
            .key
            .mac()
            .ok_or_else(|| AuthError::internal("signing key rejected by HMAC"))?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(Token(format!("{header}.{payload}.{signature}")))
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, TokenRejection> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenRejection::Malformed)
}
