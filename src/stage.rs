//! Run Stage State Machine
//!
//! The orchestrator walks a fixed sequence of stages. `RunContext` owns the
//! current stage, only allows forward transitions to the immediate next
//! stage, and records what happened in each stage.
//!
//! # Stage Flow
//!
//! ```text
//! NotStarted
//!     ↓
//! NetworkConfig   (failures are logged, never fatal)
//!     ↓
//! CliApps         (package manager setup failure is fatal)
//!     ↓
//! GuiApps         (package manager setup failure is fatal)
//!     ↓
//! ProfileSetup    (optional, non-fatal)
//!     ↓
//! Completed
//!
//! (Any non-terminal stage can transition to Failed)
//! ```

use chrono::{DateTime, Local, TimeDelta};
use std::fmt;
use thiserror::Error;

/// Run stages in sequential order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Nothing has run yet
    NotStarted = 0,
    /// Hostname, static IP, DNS
    NetworkConfig = 1,
    /// Scoop and the CLI app catalog
    CliApps = 2,
    /// WinGet and the GUI app catalog
    GuiApps = 3,
    /// Optional PowerShell profile script
    ProfileSetup = 4,
    /// All stages done (terminal state)
    Completed = 5,
    /// A fatal failure stopped the run (terminal state)
    Failed = 255,
}

impl Stage {
    /// Numeric order of this stage (0-5, 255 for Failed)
    #[inline]
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Returns true if this is a terminal state (Completed or Failed)
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a setup failure in this stage aborts the whole run.
    ///
    /// Later app categories depend on the package manager being present, so
    /// only the package manager stages are fatal.
    #[inline]
    pub const fn is_fatal_on_failure(self) -> bool {
        matches!(self, Self::CliApps | Self::GuiApps)
    }

    /// Returns the next stage in the sequence, or None at a terminal state
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::NotStarted => Some(Self::NetworkConfig),
            Self::NetworkConfig => Some(Self::CliApps),
            Self::CliApps => Some(Self::GuiApps),
            Self::GuiApps => Some(Self::ProfileSetup),
            Self::ProfileSetup => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Human-readable description of this stage
    pub const fn description(self) -> &'static str {
        match self {
            Self::NotStarted => "Not started",
            Self::NetworkConfig => "Network configuration",
            Self::CliApps => "CLI apps (Scoop)",
            Self::GuiApps => "GUI apps (WinGet)",
            Self::ProfileSetup => "PowerShell profile setup",
            Self::Completed => "Bootstrap complete",
            Self::Failed => "Bootstrap failed",
        }
    }

    /// The stages that do work, in run order
    pub const fn work_stages() -> &'static [Self] {
        &[
            Self::NetworkConfig,
            Self::CliApps,
            Self::GuiApps,
            Self::ProfileSetup,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// What happened in a stage that ran to its end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    Skipped,
    /// Failed without stopping the run
    Failed(String),
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Errors that can occur during state transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageTransitionError {
    /// Attempted to skip one or more stages
    #[error("Cannot skip from {from} to {to}")]
    SkippedStage { from: Stage, to: Stage },

    /// Attempted to go backwards
    #[error("Cannot go backwards from {from} to {to}")]
    BackwardTransition { from: Stage, to: Stage },

    /// Attempted to transition from a terminal state
    #[error("Cannot transition from terminal state {from}")]
    FromTerminalState { from: Stage },

    /// Attempted to transition to the same state
    #[error("Already at stage {stage}")]
    AlreadyAtStage { stage: Stage },
}

impl From<StageTransitionError> for crate::error::BootstrapError {
    fn from(err: StageTransitionError) -> Self {
        crate::error::BootstrapError::Stage(err.to_string())
    }
}

/// One entry of the run history
#[derive(Debug, Clone, PartialEq, Eq)]
struct StageRecord {
    stage: Stage,
    entered_at: DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
    outcome: Option<StageOutcome>,
}

/// Tracks the current stage and the per-stage history (outcome and timing)
/// of a run.
///
/// # Example
///
/// ```
/// use winstrap::stage::{RunContext, Stage};
///
/// let mut ctx = RunContext::new();
/// ctx.advance().unwrap();
/// assert_eq!(ctx.current_stage(), Stage::NetworkConfig);
///
/// // Cannot skip stages
/// assert!(ctx.transition_to(Stage::GuiApps).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RunContext {
    current: Stage,
    failed_at: Option<Stage>,
    history: Vec<StageRecord>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            current: Stage::NotStarted,
            failed_at: None,
            history: Vec::with_capacity(Stage::work_stages().len() + 1),
        }
    }

    #[inline]
    pub fn current_stage(&self) -> Stage {
        self.current
    }

    /// Stage at which the fatal failure occurred, if any
    #[inline]
    pub fn failed_at(&self) -> Option<Stage> {
        self.failed_at
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current == Stage::Completed
    }

    #[inline]
    pub fn is_failed(&self) -> bool {
        self.current == Stage::Failed
    }

    /// Advance to the next stage in sequence.
    ///
    /// # Errors
    ///
    /// - `FromTerminalState` if already at Completed or Failed
    pub fn advance(&mut self) -> Result<Stage, StageTransitionError> {
        let next = self
            .current
            .next()
            .ok_or(StageTransitionError::FromTerminalState { from: self.current })?;
        self.enter(next);
        Ok(next)
    }

    /// Transition to a specific stage, which must be the next one.
    ///
    /// # Errors
    ///
    /// - `FromTerminalState` if current is a terminal state
    /// - `AlreadyAtStage` if target is the current stage
    /// - `BackwardTransition` if target is before current
    /// - `SkippedStage` if target is not the immediate next stage
    pub fn transition_to(&mut self, target: Stage) -> Result<Stage, StageTransitionError> {
        if self.current.is_terminal() {
            return Err(StageTransitionError::FromTerminalState { from: self.current });
        }
        if target == self.current {
            return Err(StageTransitionError::AlreadyAtStage { stage: target });
        }
        if target == Stage::Failed || self.current.next() != Some(target) {
            if target != Stage::Failed && target.order() < self.current.order() {
                return Err(StageTransitionError::BackwardTransition {
                    from: self.current,
                    to: target,
                });
            }
            return Err(StageTransitionError::SkippedStage {
                from: self.current,
                to: target,
            });
        }
        self.enter(target);
        Ok(target)
    }

    /// Record how the current stage ended
    pub fn record_outcome(&mut self, outcome: StageOutcome) {
        if let Some(record) = self.history.iter_mut().rev().find(|r| r.stage == self.current) {
            record.finished_at = Some(Local::now());
            record.outcome = Some(outcome);
        }
    }

    /// Mark the run as failed at the current stage.
    ///
    /// # Errors
    ///
    /// - `FromTerminalState` if already at Completed or Failed
    pub fn fail(&mut self) -> Result<(), StageTransitionError> {
        if self.current.is_terminal() {
            return Err(StageTransitionError::FromTerminalState { from: self.current });
        }
        self.failed_at = Some(self.current);
        self.enter(Stage::Failed);
        Ok(())
    }

    /// Outcomes of the work stages that have been recorded, in run order
    pub fn outcomes(&self) -> Vec<(Stage, StageOutcome)> {
        self.history
            .iter()
            .filter_map(|r| r.outcome.clone().map(|o| (r.stage, o)))
            .collect()
    }

    /// Time spent in each stage that recorded an outcome, in run order
    pub fn durations(&self) -> Vec<(Stage, TimeDelta)> {
        self.history
            .iter()
            .filter_map(|r| r.finished_at.map(|end| (r.stage, end - r.entered_at)))
            .collect()
    }

    fn enter(&mut self, stage: Stage) {
        self.history.push(StageRecord {
            stage,
            entered_at: Local::now(),
            finished_at: None,
            outcome: None,
        });
        self.current = stage;
    }
}
