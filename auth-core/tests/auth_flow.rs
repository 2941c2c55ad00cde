//! End-to-end behaviour of the authentication core against the in-memory
//! credential store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use auth_core::domain::ports::{CredentialStore, CredentialStoreError};
use auth_core::domain::{
    AuthError, AuthService, Email, HashingParams, LoginCredentials, PasswordHasher,
    RegistrationRequest, SigningKey, Token, TokenRejection, TokenService,
};
use auth_core::outbound::memory::InMemoryCredentialStore;
use auth_core::test_support::{MutableClock, fast_hasher};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rstest::{fixture, rstest};

const PASSWORD: &str = "Sup3rSecr3t!";
const TTL_SECS: i64 = 3_600;

struct World {
    clock: Arc<MutableClock>,
    store: Arc<InMemoryCredentialStore>,
    service: Arc<AuthService<InMemoryCredentialStore>>,
}

fn world_with(hasher: PasswordHasher) -> World {
    let clock = MutableClock::shared();
    let store = Arc::new(InMemoryCredentialStore::new());
    let key = SigningKey::new(vec![b'k'; 32]).expect("valid key");
    let tokens = TokenService::new(key, Duration::from_secs(3_600), clock.clone());
    let service = Arc::new(AuthService::new(
        Arc::clone(&store),
        hasher,
        tokens,
        clock.clone(),
    ));
    World {
        clock,
        store,
        service,
    }
}

#[fixture]
fn world() -> World {
    world_with(fast_hasher())
}

fn registration(email: &str) -> RegistrationRequest {
    RegistrationRequest::new(email, PASSWORD, PASSWORD, "Ada Lovelace", "+44 20 7946 0958")
        .expect("valid email")
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("well-formed credentials")
}

#[rstest]
#[tokio::test]
async fn register_login_validate_and_fetch_profile(world: World) {
    let registered = world
        .service
        .register(registration("a@x.com"))
        .await
        .expect("registration succeeds");

    let token = world
        .service
        .login(&credentials("a@x.com", PASSWORD))
        .await
        .expect("login succeeds");
    let subject = world.service.validate_token(&token).expect("token valid");
    let profile = world
        .service
        .get_profile(&subject)
        .await
        .expect("profile found");

    assert_eq!(subject.email().as_ref(), "a@x.com");
    assert_eq!(profile, registered);
    assert_eq!(profile.display_name.as_ref(), "Ada Lovelace");
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_is_rejected_case_insensitively(world: World) {
    world
        .service
        .register(registration("a@x.com"))
        .await
        .expect("first registration");

    let err = world
        .service
        .register(registration("A@X.COM"))
        .await
        .expect_err("duplicate");

    assert_eq!(err, AuthError::EmailAlreadyRegistered);
    assert_eq!(world.store.len().await, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_registrations_admit_exactly_one(world: World) {
    let first = Arc::clone(&world.service);
    let second = Arc::clone(&world.service);

    let (left, right) = tokio::join!(
        tokio::spawn(async move { first.register(registration("race@x.com")).await }),
        tokio::spawn(async move { second.register(registration("RACE@x.com")).await }),
    );
    let outcomes = [left.expect("task joins"), right.expect("task joins")];

    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    let duplicates = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, Err(AuthError::EmailAlreadyRegistered)))
        .count();
    assert_eq!((successes, duplicates), (1, 1));
    assert_eq!(world.store.len().await, 1);
}

#[rstest]
#[tokio::test]
async fn equal_passwords_get_distinct_salted_hashes(world: World) {
    for email in ["one@x.com", "two@x.com"] {
        world
            .service
            .register(registration(email))
            .await
            .expect("registration succeeds");
    }

    let hash_of = |email: &'static str| {
        let store = Arc::clone(&world.store);
        async move {
            store
                .find_by_email(&Email::parse(email).expect("valid email"))
                .await
                .expect("lookup")
                .expect("record exists")
                .password_hash()
                .clone()
        }
    };
    let first = hash_of("one@x.com").await;
    let second = hash_of("two@x.com").await;

    assert_ne!(first, second);
    assert!(!first.as_phc_str().contains(PASSWORD));
}

#[rstest]
#[tokio::test]
async fn tokens_expire_after_their_lifetime(world: World) {
    world
        .service
        .register(registration("a@x.com"))
        .await
        .expect("registration succeeds");
    let token = world
        .service
        .login(&credentials("a@x.com", PASSWORD))
        .await
        .expect("login succeeds");

    world.clock.advance_seconds(TTL_SECS);
    assert!(world.service.validate_token(&token).is_ok());

    world.clock.advance_seconds(1);
    assert_eq!(
        world.service.validate_token(&token),
        Err(AuthError::TokenInvalid(TokenRejection::Expired))
    );
}

#[rstest]
#[tokio::test]
async fn tampered_signatures_are_rejected(world: World) {
    let token = world
        .service
        .issue_token(&Email::parse("a@x.com").expect("valid email"))
        .expect("issue");
    let (signing_input, signature) = token.as_str().rsplit_once('.').expect("three segments");
    let mut bytes = URL_SAFE_NO_PAD.decode(signature).expect("signature decodes");
    if let Some(first) = bytes.first_mut() {
        *first ^= 0x80;
    }
    let tampered = Token::from_wire(format!(
        "{signing_input}.{}",
        URL_SAFE_NO_PAD.encode(bytes)
    ));

    assert_eq!(
        world.service.validate_token(&tampered),
        Err(AuthError::TokenInvalid(TokenRejection::BadSignature))
    );
}

#[rstest]
#[case::wrong_password("a@x.com", "Wr0ngPassword!")]
#[case::unknown_email("nobody@x.com", PASSWORD)]
#[tokio::test]
async fn login_failures_share_one_outcome(
    world: World,
    #[case] email: &str,
    #[case] password: &str,
) {
    world
        .service
        .register(registration("a@x.com"))
        .await
        .expect("registration succeeds");

    let err = world
        .service
        .login(&credentials(email, password))
        .await
        .expect_err("login fails");

    assert_eq!(err, AuthError::InvalidCredentials);
}

#[rstest]
#[tokio::test]
async fn store_outage_is_reported_as_retryable(world: World) {
    world
        .store
        .fail_with(CredentialStoreError::connection("connection refused"));

    let err = world
        .service
        .login(&credentials("a@x.com", PASSWORD))
        .await
        .expect_err("store down");

    assert!(matches!(err, AuthError::StoreUnavailable { .. }));
    assert!(err.is_retryable());
    assert!(!err.to_string().contains(PASSWORD));
}

fn median(mut samples: Vec<Duration>) -> Duration {
    samples.sort_unstable();
    samples
        .get(samples.len() / 2)
        .copied()
        .unwrap_or_default()
}

async fn time_login(service: &AuthService<InMemoryCredentialStore>, email: &str) -> Duration {
    let started = Instant::now();
    let outcome = service.login(&credentials(email, "Wr0ngPassword!")).await;
    let elapsed = started.elapsed();
    assert_eq!(outcome, Err(AuthError::InvalidCredentials));
    elapsed
}

#[rstest]
#[tokio::test]
async fn unknown_email_costs_about_as_much_as_wrong_password() {
    let hasher = PasswordHasher::new(HashingParams {
        memory_kib: 4_096,
        iterations: 2,
        parallelism: 1,
    })
    .expect("valid params");
    let world = world_with(hasher);
    world
        .service
        .register(registration("a@x.com"))
        .await
        .expect("registration succeeds");

    let mut known = Vec::new();
    let mut unknown = Vec::new();
    for _ in 0..7 {
        known.push(time_login(&world.service, "a@x.com").await);
        unknown.push(time_login(&world.service, "nobody@x.com").await);
    }

    let known = median(known).as_secs_f64();
    let unknown = median(unknown).as_secs_f64();
    let ratio = unknown / known;
    assert!(
        (0.5..=2.0).contains(&ratio),
        "unknown-email login took {unknown:.4}s vs wrong-password {known:.4}s"
    );
}
