//! Scenario files: a list of votes and cancellations replayed against a
//! service whose host state is a single `u64` register.

use anyhow::Context;
use quorum_engine::{
    EngineConfig, GuardOutcome, GuardedCall, QuorumEngine, QuorumError, QuorumEvent, QuorumKind,
    QuorumService, Withdrawal,
};
use quorum_types::Principal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Fingerprint name of the guarded register write.
pub const SET_VALUE: &str = "set_value";

/// Host state guarded by the engine during a replay.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Register {
    pub value: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One scenario step, tagged by `op`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Vote to replace the beneficiaries; `quorum` overrides the majority.
    Transfer {
        caller: Principal,
        beneficiaries: Vec<Principal>,
        #[serde(default)]
        quorum: Option<usize>,
    },
    /// Vote to write `value` into the register.
    SetValue {
        caller: Principal,
        value: u64,
        #[serde(default = "default_quorum")]
        quorum: QuorumKind,
    },
    /// Withdraw `caller`'s vote from the pending operation at `index`.
    Cancel { caller: Principal, index: usize },
}

fn default_quorum() -> QuorumKind {
    QuorumKind::Many
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::SetValue { .. } => "set_value",
            Self::Cancel { .. } => "cancel",
        }
    }

    pub fn caller(&self) -> &Principal {
        match self {
            Self::Transfer { caller, .. }
            | Self::SetValue { caller, .. }
            | Self::Cancel { caller, .. } => caller,
        }
    }
}

impl Scenario {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

// ── Reports ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Executed,
    Pending { votes: usize, required: usize },
    Downgraded { fingerprint: String, remaining: usize },
    Cancelled { fingerprint: String },
    Rejected { error: String },
}

impl From<GuardOutcome<()>> for StepOutcome {
    fn from(outcome: GuardOutcome<()>) -> Self {
        match outcome {
            GuardOutcome::Executed(()) => Self::Executed,
            GuardOutcome::Pending { votes, required } => Self::Pending { votes, required },
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => f.write_str("executed"),
            Self::Pending { votes, required } => write!(f, "pending ({votes}/{required})"),
            Self::Downgraded { fingerprint, remaining } => {
                write!(f, "vote withdrawn from {fingerprint}, {remaining} left")
            }
            Self::Cancelled { fingerprint } => write!(f, "{fingerprint} cancelled"),
            Self::Rejected { error } => write!(f, "rejected: {error}"),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub caller: Principal,
    pub outcome: StepOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub steps: Vec<StepReport>,
    pub beneficiaries: Vec<Principal>,
    pub generation: u64,
    pub pending: Vec<String>,
    pub value: u64,
}

impl fmt::Display for ReplayReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "#{:<3} {:<9} {}  {}", step.index, step.op, step.caller, step.outcome)?;
        }
        writeln!(f, "beneficiaries (generation {}):", self.generation)?;
        for principal in &self.beneficiaries {
            writeln!(f, "  {principal}")?;
        }
        writeln!(f, "pending operations: {}", self.pending.len())?;
        for fingerprint in &self.pending {
            writeln!(f, "  {fingerprint}")?;
        }
        write!(f, "register: {}", self.value)
    }
}

// ── Replay ─────────────────────────────────────────────────────────────

/// Run every step against a fresh engine built from `config`.
///
/// A rejected step is reported in place and replay moves on.
pub fn replay(config: &EngineConfig, scenario: &Scenario) -> Result<ReplayReport, QuorumError> {
    let service = QuorumService::new(QuorumEngine::from_config(config)?, Register::default());
    service.subscribe(Box::new(|event: &QuorumEvent| debug!(?event, "engine event")));

    let steps = scenario
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let outcome = apply(&service, step).unwrap_or_else(|e| {
                warn!(step = index, op = step.name(), error = %e, "step rejected");
                StepOutcome::Rejected {
                    error: e.to_string(),
                }
            });
            StepReport {
                index,
                op: step.name(),
                caller: *step.caller(),
                outcome,
            }
        })
        .collect::<Vec<_>>();
    info!(steps = steps.len(), "scenario replayed");

    Ok(service.read(|engine, register| ReplayReport {
        steps,
        beneficiaries: engine.beneficiaries().to_vec(),
        generation: engine.generation(),
        pending: engine
            .pending_operations()
            .iter()
            .map(ToString::to_string)
            .collect(),
        value: register.value,
    }))
}

fn apply(service: &QuorumService<Register>, step: &Step) -> Result<StepOutcome, QuorumError> {
    match step {
        Step::Transfer {
            caller,
            beneficiaries,
            quorum: None,
        } => service
            .transfer_beneficiaries(caller, beneficiaries.clone())
            .map(StepOutcome::from),
        Step::Transfer {
            caller,
            beneficiaries,
            quorum: Some(how_many),
        } => service
            .transfer_beneficiaries_with_quorum(caller, beneficiaries.clone(), *how_many)
            .map(StepOutcome::from),
        Step::SetValue {
            caller,
            value,
            quorum,
        } => {
            let call = GuardedCall::new(SET_VALUE, &(value, quorum), *quorum)?;
            service
                .execute(caller, &call, |_, _, register: &mut Register| {
                    register.value = *value;
                    Ok::<_, QuorumError>(())
                })
                .map(StepOutcome::from)
        }
        Step::Cancel { caller, index } => {
            let fingerprint = service.pending_at(*index)?;
            Ok(match service.cancel_pending(caller, &fingerprint)? {
                Withdrawal::Downgraded { remaining } => StepOutcome::Downgraded {
                    fingerprint: fingerprint.to_string(),
                    remaining,
                },
                Withdrawal::Dropped => StepOutcome::Cancelled {
                    fingerprint: fingerprint.to_string(),
                },
            })
        }
    }
}
