use borsh::BorshSerialize;
use rust_decimal::Decimal;
use solana_program::pubkey::Pubkey;

use oseme_tiers::{
    error::OsemeError,
    group::{discriminator, GroupAccount, GroupModel, GroupStatus, GroupSummary, MemberAccount},
    pda,
    policy::TierPolicy,
    profile::{participation_credit_score, Participation},
    state::{TierLevel, SECONDS_IN_DAY},
};

use crate::common::fixtures::{creator, member, program_id};

pub mod common;

fn group_account() -> GroupAccount {
    let program_id = program_id();
    let group = pda::find_group(42, &program_id).unwrap();
    GroupAccount {
        group_id: 42,
        model: GroupModel::Trust,
        creator: creator(),
        member_cap: 15,
        current_turn_index: 1,
        cycle_days: 21,
        payout_order: vec![creator(), member()],
        escrow_vault: pda::find_escrow(&group.address, &program_id).unwrap().address,
        stake_vault: Some(pda::find_stake(&group.address, &program_id).unwrap().address),
        status: GroupStatus::Active,
        total_members: 2,
        current_turn_start: 1_700_000_000,
        contribution_amount: 250_000_000,
        total_pool: 500_000_000,
        trust_score: 70,
        created_at: 1_699_000_000,
        bump: group.bump,
    }
}

fn account_data<T: BorshSerialize>(name: &str, account: &T) -> Vec<u8> {
    let mut data = discriminator(name).to_vec();
    data.extend(account.try_to_vec().unwrap());
    data
}

mod decoding {
    use super::*;

    #[test]
    fn group_round_trip() {
        let group = group_account();
        let mut data = account_data("Group", &group);
        // Accounts are allocated with spare room
        data.extend_from_slice(&[0; 64]);
        let decoded = GroupAccount::from_data(&data).unwrap();
        assert_eq!(decoded, group);
        assert_eq!(decoded.current_recipient(), Some(&member()));
        assert_eq!(decoded.turn_ends_at().unwrap(), 1_700_000_000 + 21 * SECONDS_IN_DAY);
        assert!(!decoded.is_full());
    }

    #[test]
    fn member_round_trip() {
        let record = MemberAccount {
            group: pda::find_group(42, &program_id()).unwrap().address,
            user: member(),
            stake_amount: 2_500_000_000,
            contributed_turns: vec![true, false, true],
            missed_count: 1,
            trust_delta: -2,
            join_timestamp: 1_699_000_100,
            is_creator: false,
            bump: 255,
        };
        let decoded = MemberAccount::from_data(&account_data("Member", &record)).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.contributions(), 2);
        assert_eq!(
            decoded.participation(&group_account()),
            Participation {
                tier: TierLevel::Trust,
                contributions: 2
            }
        );
    }

    #[test]
    fn discriminator_is_checked() {
        // Member bytes handed to the group decoder
        let data = account_data("Member", &group_account());
        assert!(matches!(
            GroupAccount::from_data(&data),
            Err(OsemeError::AccountDiscriminatorMismatch("Group"))
        ));
        assert!(matches!(
            GroupAccount::from_data(&[1, 2, 3]),
            Err(OsemeError::AccountDiscriminatorMismatch("Group"))
        ));
    }

    #[test]
    fn truncated_account() {
        let data = account_data("Group", &group_account());
        assert!(matches!(
            GroupAccount::from_data(&data[..40]),
            Err(OsemeError::AccountDecode(_))
        ));
    }

    #[test]
    fn discriminators_differ() {
        assert_ne!(discriminator("Group"), discriminator("Member"));
        assert_eq!(discriminator("Group"), discriminator("Group"));
    }
}

mod summaries {
    use super::*;

    #[test]
    fn group_summary() {
        let address = Pubkey::new_unique();
        let summary = GroupSummary::new(address, &group_account(), TierPolicy::builtin()).unwrap();
        assert_eq!(summary.tier, TierLevel::Trust);
        assert_eq!(summary.contribution, Decimal::from(250));
        assert_eq!(summary.total_pool, Decimal::from(500));
        assert_eq!(summary.current_recipient, Some(member().to_string()));
        assert_eq!(summary.insurance_coverage, Decimal::from(25_000));
        assert!(summary.yield_eligible);
    }

    #[test]
    fn recipient_past_the_payout_order() {
        let mut group = group_account();
        group.current_turn_index = 5;
        let summary =
            GroupSummary::new(Pubkey::new_unique(), &group, TierPolicy::builtin()).unwrap();
        assert_eq!(summary.current_recipient, None);
    }

    #[test]
    fn turn_end_past_i64() {
        // Hostile account data must not panic the summary
        let mut group = group_account();
        group.current_turn_start = i64::MAX - 10;
        group.cycle_days = 30;
        let decoded = GroupAccount::from_data(&account_data("Group", &group)).unwrap();
        assert!(matches!(
            decoded.turn_ends_at(),
            Err(OsemeError::TimestampOverflow(_))
        ));
        assert!(matches!(
            GroupSummary::new(Pubkey::new_unique(), &decoded, TierPolicy::builtin()),
            Err(OsemeError::TimestampOverflow(_))
        ));
    }
}

mod credit_score {
    use super::*;

    #[test]
    fn no_history() {
        assert_eq!(participation_credit_score(&[]), 0);
    }

    #[test]
    fn single_basic_group() {
        // 500 + 50 + 25 * 4 + 50
        let history = [Participation {
            tier: TierLevel::Basic,
            contributions: 4,
        }];
        assert_eq!(participation_credit_score(&history), 700);
    }

    #[test]
    fn average_contributions_round_down() {
        // 500 + 100 + 25 * 1.5 + 150 = 787.5
        let history = [
            Participation {
                tier: TierLevel::Basic,
                contributions: 1,
            },
            Participation {
                tier: TierLevel::Trust,
                contributions: 2,
            },
        ];
        assert_eq!(participation_credit_score(&history), 787);
    }

    #[test]
    fn capped_at_850() {
        let history = [Participation {
            tier: TierLevel::Premium,
            contributions: 12,
        }];
        assert_eq!(participation_credit_score(&history), 850);
    }
}
