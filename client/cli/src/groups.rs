use std::{collections::HashMap, sync::Arc};

use {
    oseme_tiers::{
        group::{GroupAccount, GroupSummary, MemberAccount},
        pda,
        policy::TierPolicy,
        profile::participation_credit_score,
    },
    serde::Serialize,
    solana_client::rpc_client::RpcClient,
    solana_program::pubkey::Pubkey,
    tokio::task,
    tracing::{debug, info},
};

use crate::{
    error::{CliError, CliResult},
    settings::FETCH_ATTEMPTS,
    utils::retry,
};

/// Anything that can hand back raw account data
pub trait AccountSource: Send + Sync + 'static {
    fn account_data(&self, key: &Pubkey) -> CliResult<Vec<u8>>;
}

impl AccountSource for RpcClient {
    fn account_data(&self, key: &Pubkey) -> CliResult<Vec<u8>> {
        self.get_account_with_commitment(key, self.commitment())?
            .value
            .map(|account| account.data)
            .ok_or(CliError::AccountNotFound(*key))
    }
}

/// Fixed account set, keyed by address
impl AccountSource for HashMap<Pubkey, Vec<u8>> {
    fn account_data(&self, key: &Pubkey) -> CliResult<Vec<u8>> {
        self.get(key).cloned().ok_or(CliError::AccountNotFound(*key))
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MemberReport {
    pub user: String,
    pub contributions: u32,
    pub missed: u8,
    pub is_creator: bool,
    // Score this single membership contributes on its own
    pub participation_score: u16,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    pub summary: GroupSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberReport>,
}

async fn fetch_member<S: AccountSource>(
    source: Arc<S>,
    group: GroupAccount,
    address: Pubkey,
    user: Pubkey,
    program_id: Pubkey,
) -> CliResult<MemberReport> {
    let key = pda::find_member(&address, &user, &program_id)?.address;
    let data = retry(FETCH_ATTEMPTS, || source.account_data(&key)).await?;
    let member = MemberAccount::from_data(&data)?;
    debug!("Member {} of group {}", user, group.group_id);
    Ok(MemberReport {
        user: user.to_string(),
        contributions: member.contributions(),
        missed: member.missed_count,
        is_creator: member.is_creator,
        participation_score: participation_credit_score(&[member.participation(&group)]),
    })
}

/// Fetches group `group_id` and, optionally, every member in its payout order
pub async fn fetch_group<S: AccountSource>(
    source: Arc<S>,
    policy: &TierPolicy,
    group_id: u64,
    program_id: &Pubkey,
    with_members: bool,
) -> CliResult<GroupReport> {
    let address = pda::find_group(group_id, program_id)?.address;
    let data = retry(FETCH_ATTEMPTS, || source.account_data(&address)).await?;
    let group = GroupAccount::from_data(&data)?;
    info!(
        "Group {} at {}: {}/{} members",
        group_id, address, group.total_members, group.member_cap
    );

    let mut members = Vec::new();
    if with_members {
        let mut join_handles = Vec::with_capacity(group.payout_order.len());
        for user in group.payout_order.iter() {
            join_handles.push(task::spawn(fetch_member(
                source.clone(),
                group.clone(),
                address,
                *user,
                *program_id,
            )));
        }
        for handle in join_handles {
            members.push(handle.await??);
        }
    }

    Ok(GroupReport {
        summary: GroupSummary::new(address, &group, policy)?,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use borsh::BorshSerialize;
    use oseme_tiers::group::{discriminator, GroupModel, GroupStatus};

    fn account<T: BorshSerialize>(name: &str, value: &T) -> Vec<u8> {
        let mut data = discriminator(name).to_vec();
        data.extend(value.try_to_vec().unwrap());
        data
    }

    fn setup(program_id: &Pubkey, users: &[Pubkey]) -> HashMap<Pubkey, Vec<u8>> {
        let address = pda::find_group(7, program_id).unwrap().address;
        let group = GroupAccount {
            group_id: 7,
            model: GroupModel::SuperTrust,
            creator: users[0],
            member_cap: 10,
            current_turn_index: 0,
            cycle_days: 14,
            payout_order: users.to_vec(),
            escrow_vault: Pubkey::new_unique(),
            stake_vault: None,
            status: GroupStatus::Active,
            total_members: users.len() as u8,
            current_turn_start: 1_700_000_000,
            contribution_amount: 1_000_000_000,
            total_pool: 0,
            trust_score: 90,
            created_at: 1_700_000_000,
            bump: 255,
        };
        let mut accounts = HashMap::new();
        accounts.insert(address, account("Group", &group));
        for (i, user) in users.iter().enumerate() {
            let member = MemberAccount {
                group: address,
                user: *user,
                stake_amount: 5_000_000_000,
                contributed_turns: vec![true; i + 1],
                missed_count: 0,
                trust_delta: 0,
                join_timestamp: 1_700_000_000,
                is_creator: i == 0,
                bump: 255,
            };
            let key = pda::find_member(&address, user, program_id).unwrap().address;
            accounts.insert(key, account("Member", &member));
        }
        accounts
    }

    #[tokio::test]
    async fn group_with_members() {
        // Setup a super trust group with two members
        let program_id = oseme_tiers::id();
        let users = [Pubkey::new_unique(), Pubkey::new_unique()];
        let source = Arc::new(setup(&program_id, &users));
        // Fetch it
        let report = fetch_group(source, TierPolicy::builtin(), 7, &program_id, true)
            .await
            .unwrap();
        assert_eq!(report.summary.group_id, 7);
        assert_eq!(report.summary.members, 2);
        assert_eq!(report.members.len(), 2);
        assert!(report.members[0].is_creator);
        assert_eq!(report.members[1].contributions, 2);
        // 500 + 50 + 25 * 2 + 150
        assert_eq!(report.members[1].participation_score, 750);
    }

    #[tokio::test]
    async fn missing_group() {
        let source = Arc::new(HashMap::<Pubkey, Vec<u8>>::new());
        let err = fetch_group(source, TierPolicy::builtin(), 7, &oseme_tiers::id(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::AccountNotFound(_)));
    }

    #[tokio::test]
    async fn missing_member() {
        // Group exists but one member record is gone
        let program_id = oseme_tiers::id();
        let users = [Pubkey::new_unique(), Pubkey::new_unique()];
        let mut accounts = setup(&program_id, &users);
        let address = pda::find_group(7, &program_id).unwrap().address;
        accounts.remove(&pda::find_member(&address, &users[1], &program_id).unwrap().address);
        // Summary alone still works
        let source = Arc::new(accounts);
        fetch_group(source.clone(), TierPolicy::builtin(), 7, &program_id, false)
            .await
            .unwrap();
        // Members do not
        let err = fetch_group(source, TierPolicy::builtin(), 7, &program_id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::AccountNotFound(_)));
    }
}
