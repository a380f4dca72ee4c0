//! Bootstrap orchestration.
//!
//! Runs the work stages in order (network, CLI apps, GUI apps, profile) on
//! top of the `RunContext` state machine, gates each stage, and applies the
//! failure policy: package-manager setup failures stop the run, everything
//! else is reported and the run moves on.

use crate::catalog::{AppCatalog, Selection};
use crate::command_runner::{run_args, CommandRunner};
use crate::commands::profile::ProfileSetupArgs;
use crate::config_file::{load_catalog_or_default, load_network_or_default, ConfigPaths};
use crate::console::Console;
use crate::error::Result;
use crate::menu::{prompt_network_settings, resolve_selection};
use crate::network::{apply_settings, NetworkSettings};
use crate::package_manager::{install_selection, InstallReport, ManagerKind};
use crate::stage::{RunContext, Stage, StageOutcome};
use chrono::TimeDelta;
use std::path::PathBuf;
use tracing::{info, warn};

/// Everything a run needs to know up front
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub paths: ConfigPaths,
    /// Never prompt: run every stage, use overrides or whole catalogs
    pub assume_yes: bool,
    pub skip_network: bool,
    pub skip_cli_apps: bool,
    pub skip_gui_apps: bool,
    pub skip_profile: bool,
    /// Pre-selected Scoop categories
    pub cli_categories: Vec<String>,
    /// Pre-selected WinGet categories
    pub gui_categories: Vec<String>,
    /// Select every category of both catalogs
    pub all_apps: bool,
    /// Network values from the command line, layered over the config file
    pub network_overrides: NetworkSettings,
    /// Profile script to use instead of the one in the config directory
    pub profile_script: Option<PathBuf>,
    /// Current computer name, used to skip a no-op rename
    pub current_hostname: Option<String>,
}

impl RunOptions {
    fn skips(&self, stage: Stage) -> bool {
        match stage {
            Stage::NetworkConfig => self.skip_network,
            Stage::CliApps => self.skip_cli_apps,
            Stage::GuiApps => self.skip_gui_apps,
            Stage::ProfileSetup => self.skip_profile,
            _ => false,
        }
    }

    fn categories(&self, kind: ManagerKind) -> &[String] {
        match kind {
            ManagerKind::Scoop => &self.cli_categories,
            ManagerKind::Winget => &self.gui_categories,
        }
    }

    fn profile_script_path(&self) -> PathBuf {
        self.profile_script
            .clone()
            .unwrap_or_else(|| self.paths.profile_script())
    }
}

/// How a run ended
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Outcome of each stage that was part of the run, in order
    pub outcomes: Vec<(Stage, StageOutcome)>,
    /// Time spent in each stage that has an outcome
    pub durations: Vec<(Stage, TimeDelta)>,
    pub apps: InstallReport,
    /// Stage whose failure stopped the run
    pub failed_at: Option<Stage>,
    /// Error that stopped the run
    pub fatal_error: Option<String>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.failed_at.is_none()
    }

    /// Process exit code: 0 unless a fatal failure stopped the run
    pub fn exit_code(&self) -> i32 {
        if self.succeeded() { 0 } else { 1 }
    }

    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, o)| o)
    }

    pub fn duration(&self, stage: Stage) -> Option<TimeDelta> {
        self.durations
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, d)| *d)
    }

    /// Print the end-of-run report
    pub fn print(&self, console: &mut Console) {
        console.heading("Summary");
        for (stage, outcome) in &self.outcomes {
            match self.duration(*stage) {
                Some(elapsed) => console.line(format!(
                    "  {:<28} {} ({:.1}s)",
                    stage.description(),
                    outcome,
                    elapsed.num_milliseconds() as f64 / 1000.0
                )),
                None => console.line(format!("  {:<28} {}", stage.description(), outcome)),
            }
        }

        if self.apps.attempted() > 0 {
            console.line("");
            console.line(format!("  Installed:         {}", self.apps.installed.len()));
            console.line(format!(
                "  Already installed: {}",
                self.apps.already_installed.len()
            ));
            console.line(format!("  Failed:            {}", self.apps.failed.len()));
            for (name, reason) in &self.apps.failed {
                console.line(format!("    - {}: {}", name, reason));
            }
        }
        console.line("");

        match (self.failed_at, self.fatal_error.as_deref()) {
            (Some(stage), Some(reason)) => {
                console.error(format!("Bootstrap failed during {}: {}", stage, reason));
            }
            (Some(stage), None) => console.error(format!("Bootstrap failed during {}", stage)),
            (None, _) => console.success("Bootstrap complete"),
        }
    }
}

/// Drives the stages of one run
pub struct Orchestrator<'a> {
    options: RunOptions,
    runner: &'a dyn CommandRunner,
    console: &'a mut Console,
    ctx: RunContext,
    apps: InstallReport,
    fatal_error: Option<String>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(options: RunOptions, runner: &'a dyn CommandRunner, console: &'a mut Console) -> Self {
        Self {
            options,
            runner,
            console,
            ctx: RunContext::new(),
            apps: InstallReport::default(),
            fatal_error: None,
        }
    }

    /// Run every work stage
    pub fn run(self) -> Result<RunSummary> {
        self.run_stages(Stage::work_stages())
    }

    /// Run only the network stage
    pub fn run_network(self) -> Result<RunSummary> {
        self.run_stages(&[Stage::NetworkConfig])
    }

    /// Run only the app stage of one package manager
    pub fn run_apps(self, kind: ManagerKind) -> Result<RunSummary> {
        self.run_stages(&[kind.stage()])
    }

    /// Walk all work stages in order, executing the `selected` ones.
    ///
    /// Stage errors are handled here according to the failure policy; the
    /// returned `Err` only signals a broken state transition.
    fn run_stages(mut self, selected: &[Stage]) -> Result<RunSummary> {
        if self.runner.is_dry_run() {
            self.console
                .warning("Dry run: changes are logged, not executed");
        }
        // Gates only apply to a full run
        let gated = selected.len() > 1;

        for stage in Stage::work_stages() {
            self.ctx.transition_to(*stage)?;
            if !selected.contains(stage) {
                continue;
            }

            self.console.heading(stage.description());
            let outcome = match self.execute(*stage, gated) {
                Ok(outcome) => outcome,
                Err(e) if stage.is_fatal_on_failure() => {
                    self.console.error(format!("{} failed: {}", stage, e));
                    self.ctx.record_outcome(StageOutcome::Failed(e.to_string()));
                    self.fatal_error = Some(e.to_string());
                    self.ctx.fail()?;
                    return Ok(self.into_summary());
                }
                Err(e) => {
                    self.console
                        .warning(format!("{} failed: {}; continuing", stage, e));
                    StageOutcome::Failed(e.to_string())
                }
            };
            info!(stage = %stage, outcome = %outcome, "Stage finished");
            self.ctx.record_outcome(outcome);
        }

        self.ctx.advance()?;
        Ok(self.into_summary())
    }

    fn execute(&mut self, stage: Stage, gated: bool) -> Result<StageOutcome> {
        if self.options.skips(stage) {
            self.console
                .info(format!("Skipping {} (disabled on the command line)", stage));
            return Ok(StageOutcome::Skipped);
        }
        if gated && !self.options.assume_yes && !self.console.confirm(gate_question(stage), true)? {
            self.console.info(format!("Skipping {}", stage));
            return Ok(StageOutcome::Skipped);
        }

        match stage {
            Stage::NetworkConfig => self.network_stage(),
            Stage::CliApps => self.app_stage(ManagerKind::Scoop),
            Stage::GuiApps => self.app_stage(ManagerKind::Winget),
            Stage::ProfileSetup => self.profile_stage(),
            _ => Ok(StageOutcome::Skipped),
        }
    }

    fn network_stage(&mut self) -> Result<StageOutcome> {
        let mut settings = load_network_or_default(self.options.paths.network(), self.console);

        let mut overrides = self.options.network_overrides.clone();
        for message in overrides.drop_invalid() {
            self.console
                .warning(format!("Command-line override: {}", message));
        }
        settings.merge(&overrides);

        if self.options.assume_yes {
            if settings.ip_address.is_some() && settings.gateway.is_none() {
                self.console.warning(
                    "IP address given without a gateway; skipping static IP configuration",
                );
                settings.ip_address = None;
                settings.subnet_mask = None;
            }
        } else {
            settings = prompt_network_settings(
                self.console,
                &settings,
                self.options.current_hostname.as_deref(),
            )?;
        }

        // Mask and gateway only mean something with an address
        if settings.ip_address.is_none() {
            settings.subnet_mask = None;
            settings.gateway = None;
        }
        if settings.is_empty() {
            self.console.info("No network changes requested");
            return Ok(StageOutcome::Skipped);
        }

        apply_settings(
            &settings,
            self.options.current_hostname.as_deref(),
            self.runner,
            self.console,
        )?;
        Ok(StageOutcome::Completed)
    }

    fn app_stage(&mut self, kind: ManagerKind) -> Result<StageOutcome> {
        let catalog = load_catalog_or_default(
            kind.catalog_path(&self.options.paths),
            || kind.default_catalog(),
            self.console,
        );
        let selection = self.choose_selection(kind, &catalog)?;
        if selection.is_empty() {
            self.console
                .info(format!("No {} selected", kind.catalog_label()));
            return Ok(StageOutcome::Skipped);
        }
        self.console.info(format!(
            "{} {} selected from {} categories",
            selection.total_entries(),
            kind.catalog_label(),
            selection.categories().len()
        ));

        let manager = kind.manager();
        manager.ensure_ready(self.runner, self.console)?;
        manager.prepare(&selection, self.runner, self.console)?;

        let report = install_selection(manager.as_ref(), &selection, self.runner, self.console);
        let failed = report.failed.len();
        self.apps.merge(report);

        if failed > 0 {
            warn!("{} {} failed to install", failed, kind.catalog_label());
            return Ok(StageOutcome::Failed(format!(
                "{} of {} apps failed to install",
                failed,
                selection.total_entries()
            )));
        }
        Ok(StageOutcome::Completed)
    }

    /// Selection from the command line, the whole catalog under `--yes`, or
    /// the interactive menu
    fn choose_selection(&mut self, kind: ManagerKind, catalog: &AppCatalog) -> Result<Selection> {
        let names = self.options.categories(kind);
        let preselected = if self.options.all_apps {
            Some(Selection::all(catalog))
        } else if !names.is_empty() {
            let (selection, unknown) = Selection::from_overrides(catalog, names);
            for name in unknown {
                self.console.warning(format!(
                    "Unknown {} category '{}' ignored",
                    kind.label(),
                    name
                ));
            }
            Some(selection)
        } else if self.options.assume_yes {
            Some(Selection::all(catalog))
        } else {
            None
        };
        resolve_selection(self.console, catalog, preselected)
    }

    fn profile_stage(&mut self) -> Result<StageOutcome> {
        let script = self.options.profile_script_path();
        if !script.is_file() {
            self.console.info(format!(
                "No profile script at {}, skipping",
                script.display()
            ));
            return Ok(StageOutcome::Skipped);
        }

        self.console
            .info(format!("Running profile setup script {}", script.display()));
        let args = ProfileSetupArgs { script };
        run_args(self.runner, &args)?.ensure_success("Profile setup script")?;
        self.console.success("Profile setup complete");
        Ok(StageOutcome::Completed)
    }

    fn into_summary(self) -> RunSummary {
        RunSummary {
            outcomes: self.ctx.outcomes(),
            durations: self.ctx.durations(),
            apps: self.apps,
            failed_at: self.ctx.failed_at(),
            fatal_error: self.fatal_error,
        }
    }
}

fn gate_question(stage: Stage) -> &'static str {
    match stage {
        Stage::NetworkConfig => "Configure network settings?",
        Stage::CliApps => "Install CLI apps with Scoop?",
        Stage::GuiApps => "Install GUI apps with WinGet?",
        Stage::ProfileSetup => "Run the PowerShell profile setup?",
        _ => "Continue?",
    }
}
