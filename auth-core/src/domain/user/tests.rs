//! Tests for user components.

use super::*;
use crate::test_support::{MutableClock, fast_hasher};
use mockable::Clock;
use rstest::rstest;

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("   ", UserValidationError::EmptyEmail)]
#[case("ada", UserValidationError::MalformedEmail)]
#[case("ada@example", UserValidationError::MalformedEmail)]
#[case("ada@@example.com", UserValidationError::MalformedEmail)]
#[case("a da@example.com", UserValidationError::MalformedEmail)]
fn invalid_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::parse(raw), Err(expected));
}

#[rstest]
fn overlong_emails_are_rejected() {
    let raw = format!("{}@example.com", "a".repeat(EMAIL_MAX));
    assert_eq!(
        Email::parse(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
#[case("Ada@Example.COM", "ada@example.com")]
#[case("  bob.smith+tag@mail.example.org ", "bob.smith+tag@mail.example.org")]
fn emails_are_normalised(#[case] raw: &str, #[case] expected: &str) {
    let email = Email::parse(raw).expect("valid email");
    assert_eq!(email.as_ref(), expected);
}

#[rstest]
fn case_variants_compare_equal() {
    assert_eq!(
        Email::parse("ADA@example.com").expect("valid"),
        Email::parse("ada@EXAMPLE.com").expect("valid")
    );
}

#[rstest]
#[case("", UserValidationError::EmptyDisplayName)]
#[case("<script>", UserValidationError::DisplayNameInvalidCharacters)]
#[case("Ada\u{0}", UserValidationError::DisplayNameInvalidCharacters)]
fn invalid_display_names_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(DisplayName::new(raw), Err(expected));
}

#[rstest]
fn overlong_display_names_are_rejected() {
    assert_eq!(
        DisplayName::new("a".repeat(DISPLAY_NAME_MAX + 1)),
        Err(UserValidationError::DisplayNameTooLong {
            max: DISPLAY_NAME_MAX
        })
    );
}

#[rstest]
#[case("Ada Lovelace")]
#[case("Zoë O'Brien-Smith")]
#[case("user_42")]
fn valid_display_names_are_accepted(#[case] raw: &str) {
    assert_eq!(DisplayName::new(raw).expect("valid").as_ref(), raw);
}

#[rstest]
#[case("+44 (20) 7946-0958", "+442079460958")]
#[case("555.010.0123", "5550100123")]
#[case("1234567", "1234567")]
fn phone_numbers_drop_separators(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(PhoneNumber::new(raw).expect("valid").as_ref(), expected);
}

#[rstest]
#[case("", UserValidationError::EmptyPhoneNumber)]
#[case("123456", UserValidationError::InvalidPhoneNumber)]
#[case("1234567890123456", UserValidationError::InvalidPhoneNumber)]
#[case("call me", UserValidationError::InvalidPhoneNumber)]
#[case("++15550100", UserValidationError::InvalidPhoneNumber)]
fn invalid_phone_numbers_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(PhoneNumber::new(raw), Err(expected));
}

#[rstest]
#[case("")]
#[case("not-a-uuid")]
#[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6")]
fn invalid_user_ids_are_rejected(#[case] raw: &str) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::InvalidId));
}

#[rstest]
fn profile_omits_the_password_hash() {
    let record = UserRecord::new(
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("uuid"),
        Email::parse("ada@example.com").expect("email"),
        fast_hasher().hash("Sup3rSecr3t!").expect("hash"),
        DisplayName::new("Ada").expect("name"),
        PhoneNumber::new("+15550100").expect("phone"),
        MutableClock::shared().utc(),
    );

    let json = serde_json::to_value(UserProfile::from(&record)).expect("serialise");

    assert_eq!(json["id"], "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    assert_eq!(json["email"], "ada@example.com");
    assert_eq!(json["displayName"], "Ada");
    assert_eq!(json["phone"], "+15550100");
    assert!(json.get("passwordHash").is_none());
    assert!(!json.to_string().contains("argon2"));
}
