//! Property-based tests for role derivation, tiers and referral codes
//!
//! - Role derivation is total: any class status maps to exactly one role
//! - Only the exact `"Teacher"` status yields a teacher
//! - Tier names survive a string round trip, including unknown names
//! - Referral codes accept exactly the `PREFIX-XXXXXX` uppercase base-36 shape

use nexus_types::{ReferralCode, Role, Tier, REFERRAL_ALPHABET};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Class statuses that must never grant the teacher role
fn arb_non_teacher_status() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("11th".to_string()),
        Just("12th".to_string()),
        Just("Dropper".to_string()),
        Just(String::new()),
        // Case and whitespace variants
        Just("teacher".to_string()),
        Just("TEACHER".to_string()),
        Just(" Teacher".to_string()),
        Just("Teacher ".to_string()),
        "Teacher[a-z]{1,5}",
        "[a-z]{1,5}Teacher",
        // Anything else
        ".*".prop_filter("not the teacher status", |s| s != "Teacher"),
    ]
}

/// Valid referral suffixes of length 6
fn arb_suffix() -> impl Strategy<Value = String> {
    "[0-9A-Z]{6}"
}

/// Known tier names
fn arb_known_tier() -> impl Strategy<Value = Tier> {
    prop_oneof![
        Just(Tier::Free),
        Just(Tier::Chapterwise),
        Just(Tier::FullLength),
        Just(Tier::Dpp),
        Just(Tier::Combo),
    ]
}

// ============================================================================
// Role properties
// ============================================================================

proptest! {
    #[test]
    fn prop_non_teacher_status_is_user(status in arb_non_teacher_status()) {
        prop_assert_eq!(Role::from_class_status(Some(&status)), Role::User);
    }

    #[test]
    fn prop_role_derivation_is_total(status in proptest::option::of(".*")) {
        let role = Role::from_class_status(status.as_deref());
        let expected = if status.as_deref() == Some("Teacher") {
            Role::Teacher
        } else {
            Role::User
        };
        prop_assert_eq!(role, expected);
        prop_assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
    }
}

// ============================================================================
// Tier properties
// ============================================================================

proptest! {
    #[test]
    fn prop_known_tier_round_trips(tier in arb_known_tier()) {
        prop_assert_eq!(Tier::from(tier.as_str()), tier.clone());
        prop_assert_eq!(tier.is_free(), tier == Tier::Free);
    }

    #[test]
    fn prop_unknown_tier_is_paid(name in "[a-z_]{3,20}") {
        let tier = Tier::from(name.as_str());
        prop_assert_eq!(tier.as_str(), name.as_str());
        prop_assert_eq!(tier.is_paid(), name != "free");
    }
}

// ============================================================================
// Referral code properties
// ============================================================================

proptest! {
    #[test]
    fn prop_well_formed_codes_parse(suffix in arb_suffix()) {
        let code = ReferralCode::new("NEXUS", &suffix);
        let parsed = ReferralCode::parse(code.as_str(), "NEXUS", 6).unwrap();
        prop_assert_eq!(parsed, code);
    }

    #[test]
    fn prop_lowercase_suffix_rejected(suffix in "[a-z]{6}") {
        let candidate = format!("NEXUS-{suffix}");
        prop_assert!(ReferralCode::parse(&candidate, "NEXUS", 6).is_err());
    }

    #[test]
    fn prop_wrong_length_rejected(suffix in "[0-9A-Z]{0,12}") {
        prop_assume!(suffix.len() != 6);
        let candidate = format!("NEXUS-{suffix}");
        prop_assert!(ReferralCode::parse(&candidate, "NEXUS", 6).is_err());
    }

    #[test]
    fn prop_alphabet_is_uppercase_base36(index in 0usize..REFERRAL_ALPHABET.len()) {
        let c = char::from(REFERRAL_ALPHABET[index]);
        prop_assert!(c.is_ascii_digit() || c.is_ascii_uppercase());
    }
}
