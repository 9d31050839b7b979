//! Remediation plans for users who do not yet qualify for a tier.
//!
//! A flow lists one step per verification gate of the tier. Trust score and
//! staking history are earned through participation, so they never produce a
//! step. Each step moves `pending -> in_progress -> completed | failed`; a
//! failed step is replaced by a fresh one rather than reopened.
use std::fmt;

use serde::{Deserialize, Serialize};
use solana_program::pubkey::Pubkey;
use tracing::debug;

use crate::error::{OsemeError, OsemeResult};
use crate::policy::EligibilityVerdict;
use crate::state::{requirements, Gate, TierLevel, SECONDS_IN_DAY};
use crate::utils::pubkey_string;

const MINUTE: u64 = 60;
const DAY: u64 = SECONDS_IN_DAY as u64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Identity,
    Social,
    CreditScore,
    InstitutionalBacking,
    AccreditedInvestor,
    LegalEntity,
}

impl StepKind {
    pub fn for_gate(gate: Gate) -> Option<StepKind> {
        match gate {
            Gate::Identity => Some(StepKind::Identity),
            Gate::Social => Some(StepKind::Social),
            Gate::CreditScore => Some(StepKind::CreditScore),
            Gate::InstitutionalBacking => Some(StepKind::InstitutionalBacking),
            Gate::AccreditedInvestor => Some(StepKind::AccreditedInvestor),
            Gate::LegalEntity => Some(StepKind::LegalEntity),
            Gate::TrustScore | Gate::StakingHistory => None,
        }
    }

    pub fn gate(&self) -> Gate {
        match self {
            StepKind::Identity => Gate::Identity,
            StepKind::Social => Gate::Social,
            StepKind::CreditScore => Gate::CreditScore,
            StepKind::InstitutionalBacking => Gate::InstitutionalBacking,
            StepKind::AccreditedInvestor => Gate::AccreditedInvestor,
            StepKind::LegalEntity => Gate::LegalEntity,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StepKind::Identity => "Identity Verification",
            StepKind::Social => "Social Media Verification",
            StepKind::CreditScore => "Credit Score Verification",
            StepKind::InstitutionalBacking => "Institutional Endorsement",
            StepKind::AccreditedInvestor => "Accredited Investor Verification",
            StepKind::LegalEntity => "Legal Entity Registration",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StepKind::Identity => "Complete KYC verification with government-issued ID",
            StepKind::Social => "Connect and verify your social media accounts",
            StepKind::CreditScore => "Verify your credit score through our partner",
            StepKind::InstitutionalBacking => {
                "Provide institutional backing or professional endorsement"
            }
            StepKind::AccreditedInvestor => "Verify accredited investor status",
            StepKind::LegalEntity => "Register and verify legal entity status",
        }
    }

    pub fn estimate(&self) -> EstimatedDuration {
        match self {
            StepKind::Identity => EstimatedDuration::minutes(5, 10),
            StepKind::Social => EstimatedDuration::minutes(2, 5),
            StepKind::CreditScore => EstimatedDuration::minutes(1, 2),
            StepKind::InstitutionalBacking => EstimatedDuration::business_days(1, 3),
            StepKind::AccreditedInvestor => EstimatedDuration::business_days(1, 2),
            StepKind::LegalEntity => EstimatedDuration::business_days(2, 5),
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Identity => "identity",
            StepKind::Social => "social",
            StepKind::CreditScore => "credit",
            StepKind::InstitutionalBacking => "institutional",
            StepKind::AccreditedInvestor => "accredited",
            StepKind::LegalEntity => "entity",
        };
        f.write_str(name)
    }
}

/// Best-effort duration range of an out-of-band check, in seconds
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedDuration {
    pub min_secs: u64,
    pub max_secs: u64,
    pub business_days: bool,
}

impl EstimatedDuration {
    pub const fn minutes(min: u64, max: u64) -> Self {
        Self {
            min_secs: min * MINUTE,
            max_secs: max * MINUTE,
            business_days: false,
        }
    }

    pub const fn business_days(min: u64, max: u64) -> Self {
        Self {
            min_secs: min * DAY,
            max_secs: max * DAY,
            business_days: true,
        }
    }

    /// Upper bound rounded up to whole days
    pub fn max_days(&self) -> u64 {
        (self.max_secs + DAY - 1) / DAY
    }
}

impl fmt::Display for EstimatedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.business_days {
            write!(f, "{}-{} business days", self.min_secs / DAY, self.max_secs / DAY)
        } else {
            write!(f, "{}-{} minutes", self.min_secs / MINUTE, self.max_secs / MINUTE)
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStep {
    pub kind: StepKind,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
    pub estimated_duration: EstimatedDuration,
    pub completed_at: Option<i64>,
    pub error: Option<String>,
}

impl VerificationStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            description: kind.description().to_string(),
            status: StepStatus::Pending,
            estimated_duration: kind.estimate(),
            completed_at: None,
            error: None,
        }
    }

    fn transition(&mut self, to: StepStatus) -> OsemeResult {
        let allowed = match self.status {
            StepStatus::Pending => to == StepStatus::InProgress,
            StepStatus::InProgress => to.is_terminal(),
            // Failed steps come back only through a restart
            StepStatus::Completed | StepStatus::Failed => false,
        };
        if !allowed {
            return Err(OsemeError::InvalidStepTransition {
                kind: self.kind,
                from: self.status,
                to,
            });
        }
        debug!("Verification step {} {} -> {}", self.kind, self.status, to);
        self.status = to;
        Ok(())
    }

    /// The out-of-band check has been started
    pub fn start(&mut self) -> OsemeResult {
        self.transition(StepStatus::InProgress)
    }

    pub fn complete(&mut self, now: i64) -> OsemeResult {
        self.transition(StepStatus::Completed)?;
        self.completed_at = Some(now);
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> OsemeResult {
        self.transition(StepStatus::Failed)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Initiated,
    InProgress,
    Completed,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationFlow {
    pub tier: TierLevel,
    #[serde(with = "pubkey_string")]
    pub user_address: Pubkey,
    pub steps: Vec<VerificationStep>,
    pub created_at: i64,
    // Display heuristic, not a deadline
    pub estimated_completion: i64,
}

impl VerificationFlow {
    /// Lists every verification step applicable to `tier`, all pending
    pub fn new(tier: TierLevel, user_address: Pubkey, now: i64) -> Self {
        let steps: Vec<VerificationStep> = requirements(tier)
            .gates()
            .into_iter()
            .filter_map(StepKind::for_gate)
            .map(VerificationStep::new)
            .collect();
        let estimated_completion = now + estimated_days(&steps) as i64 * SECONDS_IN_DAY;
        debug!(
            "Verification flow for {} at {}: {} steps",
            user_address,
            tier,
            steps.len()
        );
        Self {
            tier,
            user_address,
            steps,
            created_at: now,
            estimated_completion,
        }
    }

    pub fn status(&self) -> FlowStatus {
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            FlowStatus::Failed
        } else if self.steps.iter().all(|s| s.status == StepStatus::Completed) {
            FlowStatus::Completed
        } else if self.steps.iter().all(|s| s.status == StepStatus::Pending) {
            FlowStatus::Initiated
        } else {
            FlowStatus::InProgress
        }
    }

    /// Time the last step completed, once every step has
    pub fn completed_at(&self) -> Option<i64> {
        if self.status() != FlowStatus::Completed {
            return None;
        }
        self.steps.iter().filter_map(|s| s.completed_at).max()
    }

    pub fn step(&self, kind: StepKind) -> OsemeResult<&VerificationStep> {
        self.steps
            .iter()
            .find(|s| s.kind == kind)
            .ok_or(OsemeError::UnknownStep(kind))
    }

    pub fn step_mut(&mut self, kind: StepKind) -> OsemeResult<&mut VerificationStep> {
        self.steps
            .iter_mut()
            .find(|s| s.kind == kind)
            .ok_or(OsemeError::UnknownStep(kind))
    }

    /// Replaces a failed step with a new pending attempt
    pub fn restart_step(&mut self, kind: StepKind) -> OsemeResult<&mut VerificationStep> {
        let step = self.step_mut(kind)?;
        if step.status != StepStatus::Failed {
            return Err(OsemeError::InvalidStepTransition {
                kind,
                from: step.status,
                to: StepStatus::Pending,
            });
        }
        *step = VerificationStep::new(kind);
        Ok(step)
    }

    /// Steps whose gate is still unmet according to `verdict`
    pub fn outstanding<'a>(
        &'a self,
        verdict: &'a EligibilityVerdict,
    ) -> impl Iterator<Item = &'a VerificationStep> + 'a {
        self.steps
            .iter()
            .filter(move |s| verdict.unmet_gates.contains(&s.kind.gate()))
    }
}

/// Longest step estimate in whole days, never less than one
fn estimated_days(steps: &[VerificationStep]) -> u64 {
    steps
        .iter()
        .map(|s| s.estimated_duration.max_days())
        .max()
        .unwrap_or(0)
        .max(1)
}
