//! Package Manager Integration
//!
//! Scoop installs the CLI catalog, WinGet the GUI catalog. Both sit behind
//! the `PackageManager` trait so the orchestrator can run the two app stages
//! with the same code:
//!
//! 1. `ensure_ready`: make sure the tool exists (Scoop is bootstrapped if
//!    missing, WinGet must already be present). Failure here is fatal.
//! 2. `prepare`: one-time setup for a selection (Scoop buckets).
//! 3. `install`: one app at a time; failures are collected, not fatal.

use crate::catalog::{AppCatalog, AppEntry, Selection};
use crate::command_runner::{run_args, CommandOutput, CommandRunner};
use crate::commands::scoop::{bucket_of, ScoopBootstrapArgs, ScoopBucketAddArgs, ScoopInstallArgs, SCOOP};
use crate::commands::winget::{WingetInstallArgs, WingetVersionArgs, WINGET};
use crate::config_file::ConfigPaths;
use crate::console::Console;
use crate::error::{BootstrapError, Result};
use crate::stage::Stage;
use std::path::PathBuf;
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info};

/// Which package manager (and therefore which catalog) a stage uses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, clap::ValueEnum,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ManagerKind {
    /// CLI apps through Scoop
    Scoop,
    /// GUI apps through WinGet
    Winget,
}

impl ManagerKind {
    /// Product name for console output
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scoop => "Scoop",
            Self::Winget => "WinGet",
        }
    }

    /// Short description of the catalog this manager installs
    pub const fn catalog_label(self) -> &'static str {
        match self {
            Self::Scoop => "CLI apps",
            Self::Winget => "GUI apps",
        }
    }

    /// The run stage driven by this manager
    pub const fn stage(self) -> Stage {
        match self {
            Self::Scoop => Stage::CliApps,
            Self::Winget => Stage::GuiApps,
        }
    }

    pub fn catalog_path(self, paths: &ConfigPaths) -> PathBuf {
        match self {
            Self::Scoop => paths.scoop_apps(),
            Self::Winget => paths.winget_apps(),
        }
    }

    /// Built-in catalog used when the config file is unusable
    pub fn default_catalog(self) -> AppCatalog {
        match self {
            Self::Scoop => AppCatalog::scoop_defaults(),
            Self::Winget => AppCatalog::winget_defaults(),
        }
    }

    pub fn manager(self) -> Box<dyn PackageManager> {
        match self {
            Self::Scoop => Box::new(Scoop),
            Self::Winget => Box::new(Winget),
        }
    }
}

/// Result of a single successful install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed,
    AlreadyInstalled,
}

/// Operations the app stages need from a package manager
pub trait PackageManager {
    fn kind(&self) -> ManagerKind;

    /// Make sure the tool can be used, installing it if supported.
    ///
    /// # Errors
    ///
    /// A `Collaborator` error if the tool is unavailable. The run cannot
    /// continue without it.
    fn ensure_ready(&self, runner: &dyn CommandRunner, console: &mut Console) -> Result<()>;

    /// One-time setup before installing `selection`
    fn prepare(
        &self,
        _selection: &Selection,
        _runner: &dyn CommandRunner,
        _console: &mut Console,
    ) -> Result<()> {
        Ok(())
    }

    /// Install one app
    fn install(&self, entry: &AppEntry, runner: &dyn CommandRunner) -> Result<InstallOutcome>;
}

/// Map an install command's output to an outcome.
///
/// Both tools print "already installed" for a no-op install; WinGet also
/// exits nonzero in that case.
fn install_outcome(output: &CommandOutput, context: &str) -> Result<InstallOutcome> {
    if output.mentions("already installed") {
        return Ok(InstallOutcome::AlreadyInstalled);
    }
    output.ensure_success(context)?;
    Ok(InstallOutcome::Installed)
}

/// Scoop, bootstrapped through its official installer when missing
#[derive(Debug, Clone, Copy, Default)]
pub struct Scoop;

impl Scoop {
    /// Distinct buckets required by `selection`, in first-use order
    pub fn required_buckets(selection: &Selection) -> Vec<String> {
        let mut buckets: Vec<String> = Vec::new();
        for (_, entry) in selection.iter() {
            if let Some(bucket) = bucket_of(entry.install_id())
                && !buckets.iter().any(|b| b == bucket)
            {
                buckets.push(bucket.to_string());
            }
        }
        buckets
    }
}

impl PackageManager for Scoop {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Scoop
    }

    fn ensure_ready(&self, runner: &dyn CommandRunner, console: &mut Console) -> Result<()> {
        if let Some(path) = runner.locate(SCOOP) {
            console.info(format!("Scoop is already installed ({})", path.display()));
            return Ok(());
        }

        console.info("Scoop not found, running the Scoop installer");
        run_args(runner, &ScoopBootstrapArgs)?.ensure_success("Scoop installer")?;

        if runner.is_dry_run() {
            return Ok(());
        }
        if runner.locate(SCOOP).is_none() {
            return Err(BootstrapError::collaborator(
                "Scoop installer finished but scoop could not be found",
            ));
        }
        console.success("Scoop installed");
        Ok(())
    }

    fn prepare(
        &self,
        selection: &Selection,
        runner: &dyn CommandRunner,
        console: &mut Console,
    ) -> Result<()> {
        let buckets = Self::required_buckets(selection);
        if buckets.is_empty() {
            return Ok(());
        }

        // Buckets are git repositories
        if runner.locate("git").is_none() {
            console.info("Installing git (required for Scoop buckets)");
            let args = ScoopInstallArgs {
                package: "git".to_string(),
            };
            let output = run_args(runner, &args)?;
            install_outcome(&output, "scoop install git")?;
        }

        for bucket in buckets {
            let output = run_args(runner, &ScoopBucketAddArgs { bucket: bucket.clone() })?;
            if output.mentions("already exists") {
                debug!("Bucket {} already added", bucket);
                continue;
            }
            output.ensure_success(&format!("scoop bucket add {}", bucket))?;
            console.info(format!("Added Scoop bucket {}", bucket));
        }
        Ok(())
    }

    fn install(&self, entry: &AppEntry, runner: &dyn CommandRunner) -> Result<InstallOutcome> {
        let args = ScoopInstallArgs {
            package: entry.install_id().to_string(),
        };
        let output = run_args(runner, &args)?;
        install_outcome(&output, &format!("scoop install {}", args.package))
    }
}

/// WinGet, which ships with App Installer and is never bootstrapped
#[derive(Debug, Clone, Copy, Default)]
pub struct Winget;

impl PackageManager for Winget {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Winget
    }

    fn ensure_ready(&self, runner: &dyn CommandRunner, console: &mut Console) -> Result<()> {
        if runner.locate(WINGET).is_none() {
            return Err(BootstrapError::collaborator(
                "winget not found; install App Installer from the Microsoft Store",
            ));
        }
        let output = run_args(runner, &WingetVersionArgs)?;
        output.ensure_success("winget --version")?;
        console.info(format!("WinGet {} available", output.stdout.trim()));
        Ok(())
    }

    fn install(&self, entry: &AppEntry, runner: &dyn CommandRunner) -> Result<InstallOutcome> {
        let args = WingetInstallArgs {
            id: entry.install_id().to_string(),
        };
        let output = run_args(runner, &args)?;
        install_outcome(&output, &format!("winget install {}", args.id))
    }
}

/// Per-app results of one app stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<String>,
    pub already_installed: Vec<String>,
    /// App name and failure reason
    pub failed: Vec<(String, String)>,
}

impl InstallReport {
    pub fn attempted(&self) -> usize {
        self.installed.len() + self.already_installed.len() + self.failed.len()
    }

    pub fn merge(&mut self, other: InstallReport) {
        self.installed.extend(other.installed);
        self.already_installed.extend(other.already_installed);
        self.failed.extend(other.failed);
    }
}

/// Install every entry of `selection` in order.
///
/// A failing app is reported as a warning and the next one is attempted.
pub fn install_selection(
    manager: &dyn PackageManager,
    selection: &Selection,
    runner: &dyn CommandRunner,
    console: &mut Console,
) -> InstallReport {
    let mut report = InstallReport::default();
    let total = selection.total_entries();

    for (i, (category, entry)) in selection.iter().enumerate() {
        let name = entry.display_name().to_string();
        console.info(format!("[{}/{}] Installing {} ({})", i + 1, total, name, category));
        match manager.install(entry, runner) {
            Ok(InstallOutcome::Installed) => {
                console.success(format!("{} installed", name));
                report.installed.push(name);
            }
            Ok(InstallOutcome::AlreadyInstalled) => {
                console.info(format!("{} is already installed", name));
                report.already_installed.push(name);
            }
            Err(e) => {
                console.warning(format!("Failed to install {}: {}", name, e));
                report.failed.push((name, e.to_string()));
            }
        }
    }

    info!(
        manager = manager.kind().label(),
        installed = report.installed.len(),
        already = report.already_installed.len(),
        failed = report.failed.len(),
        "App stage finished"
    );
    report
}
