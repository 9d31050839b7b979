use rust_decimal::Decimal;

use oseme_tiers::{
    check_eligibility,
    error::OsemeError,
    policy::TierPolicy,
    state::{Gate, TierLevel},
};

use crate::common::fixtures::{fresh_profile, verified_profile};

pub mod common;

mod verdicts {
    use super::*;

    #[test]
    fn basic_is_always_open() {
        // A profile with nothing verified and no scores at all
        let mut profile = fresh_profile();
        profile.trust_score = None;
        // Basic has no gates
        let verdict = check_eligibility(TierLevel::Basic, &profile).unwrap();
        assert!(verdict.eligible);
        assert!(verdict.missing_requirements.is_empty());
        assert!(verdict.unmet_gates.is_empty());
    }

    #[test]
    fn trust_missing_identity_only() {
        // Social verified, trust score above 700, identity missing
        let mut profile = verified_profile();
        profile.identity_verified = false;
        profile.trust_score = Some(Decimal::from(750));
        // Only the identity message comes back
        let verdict = check_eligibility(TierLevel::Trust, &profile).unwrap();
        assert!(!verdict.eligible);
        assert_eq!(
            verdict.missing_requirements,
            vec!["Identity verification required".to_string()]
        );
        assert_eq!(verdict.unmet_gates, vec![Gate::Identity]);
    }

    #[test]
    fn trust_score_message_reports_current_value() {
        let mut profile = verified_profile();
        profile.trust_score = Some(Decimal::from(650));
        let verdict = check_eligibility(TierLevel::Trust, &profile).unwrap();
        assert_eq!(
            verdict.missing_requirements,
            vec!["Trust score of 700+ required (current: 650)".to_string()]
        );
    }

    #[test]
    fn fully_verified_profile_passes_every_tier() {
        let profile = verified_profile();
        for tier in TierLevel::ALL.iter() {
            let verdict = check_eligibility(*tier, &profile).unwrap();
            assert!(verdict.eligible, "{} rejected a fully verified profile", tier);
        }
    }

    #[test]
    fn premium_reports_every_gate_in_order() {
        // Nothing verified, trust score zero
        let verdict = check_eligibility(TierLevel::Premium, &fresh_profile()).unwrap();
        assert_eq!(
            verdict.missing_requirements,
            vec![
                "Identity verification required".to_string(),
                "Social media verification required".to_string(),
                "Credit score of 750+ required".to_string(),
                "Institutional backing/endorsement required".to_string(),
                "Accredited investor status required".to_string(),
                "Legal entity registration required".to_string(),
                "Trust score of 950+ required (current: 0)".to_string(),
                "Previous staking/participation history required".to_string(),
            ]
        );
        assert_eq!(verdict.unmet_gates, Gate::ORDER.to_vec());
    }

    #[test]
    fn super_trust_credit_score_gate() {
        // Credit score below the 650 threshold
        let mut profile = verified_profile();
        profile.credit_score = Some(649);
        let verdict = check_eligibility(TierLevel::SuperTrust, &profile).unwrap();
        assert_eq!(
            verdict.missing_requirements,
            vec!["Credit score of 650+ required".to_string()]
        );
        // No score at all is treated the same way
        profile.credit_score = None;
        let verdict = check_eligibility(TierLevel::SuperTrust, &profile).unwrap();
        assert_eq!(verdict.unmet_gates, vec![Gate::CreditScore]);
        // Premium's own threshold applies on the stricter tier
        profile.credit_score = Some(700);
        let verdict = check_eligibility(TierLevel::Premium, &profile).unwrap();
        assert_eq!(
            verdict.missing_requirements,
            vec!["Credit score of 750+ required".to_string()]
        );
    }
}

mod thresholds {
    use super::*;

    #[test]
    fn equal_score_passes() {
        let mut profile = verified_profile();
        profile.trust_score = Some(Decimal::from(700));
        assert!(check_eligibility(TierLevel::Trust, &profile).unwrap().eligible);
        profile.credit_score = Some(650);
        profile.trust_score = Some(Decimal::from(850));
        assert!(check_eligibility(TierLevel::SuperTrust, &profile).unwrap().eligible);
    }

    #[test]
    fn fractional_score_just_below_threshold_fails() {
        let mut profile = verified_profile();
        profile.trust_score = Some(Decimal::new(699_999, 3));
        let verdict = check_eligibility(TierLevel::Trust, &profile).unwrap();
        assert!(!verdict.eligible);
        assert_eq!(
            verdict.missing_requirements,
            vec!["Trust score of 700+ required (current: 699.999)".to_string()]
        );
        // 700.000 compares equal to 700
        profile.trust_score = Some(Decimal::new(700_000, 3));
        assert!(check_eligibility(TierLevel::Trust, &profile).unwrap().eligible);
    }
}

mod errors {
    use super::*;

    #[test]
    fn missing_trust_score_is_incomplete() {
        let mut profile = verified_profile();
        profile.trust_score = None;
        for tier in [TierLevel::Trust, TierLevel::SuperTrust, TierLevel::Premium].iter() {
            let err = check_eligibility(*tier, &profile).unwrap_err();
            assert!(matches!(err, OsemeError::IncompleteProfile("trustScore")));
        }
    }

    #[test]
    fn unknown_tier_names_are_rejected() {
        assert!(matches!(
            "gold".parse::<TierLevel>(),
            Err(OsemeError::InvalidTier(_))
        ));
        assert!(matches!(
            oseme_tiers::state::parse_tier("7"),
            Err(OsemeError::InvalidTier(_))
        ));
        assert_eq!(
            oseme_tiers::state::parse_tier("super_trust").unwrap(),
            TierLevel::SuperTrust
        );
        assert_eq!(oseme_tiers::state::parse_tier("3").unwrap(), TierLevel::Premium);
    }
}

#[test]
fn evaluation_is_pure() {
    // Same inputs, same verdict, profile untouched
    let mut profile = verified_profile();
    profile.social_verified = false;
    let before = profile.clone();
    let policy = TierPolicy::builtin();
    let first = policy.check_eligibility(TierLevel::SuperTrust, &profile).unwrap();
    let second = policy.check_eligibility(TierLevel::SuperTrust, &profile).unwrap();
    assert_eq!(first, second);
    assert_eq!(profile, before);
}

#[test]
fn profile_json_defaults() {
    // Absent flags default to false, absent scores to None
    let profile: oseme_tiers::profile::UserProfile = serde_json::from_str(
        r#"{"address": "SeedPubey1111111111111111111111111111111111", "identityVerified": true, "trustScore": "720.5"}"#,
    )
    .unwrap();
    assert!(profile.identity_verified);
    assert!(!profile.social_verified);
    assert_eq!(profile.credit_score, None);
    assert_eq!(profile.trust_score, Some(Decimal::new(7205, 1)));
    let verdict = check_eligibility(TierLevel::Trust, &profile).unwrap();
    assert_eq!(verdict.unmet_gates, vec![Gate::Social]);
}
