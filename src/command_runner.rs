//! Type-Safe Command Execution
//!
//! Every external tool winstrap touches (scoop, winget, PowerShell cmdlets)
//! is described by a struct implementing `CommandArgs` and executed through a
//! `CommandRunner`. Stages never build `std::process::Command` themselves, so
//! dry-run mode and tests can swap the runner out.
//!
//! # Runners
//!
//! - `SystemRunner` spawns the process and captures its output.
//! - `DryRunRunner` logs destructive commands instead of running them and
//!   still executes read-only ones so the preview stays realistic.

use crate::error::{BootstrapError, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Trait for typed command arguments.
///
/// # Contract
///
/// - `program()`: executable name, resolved on PATH at execution time.
/// - `to_cli_args()`: arguments exactly as the program expects them.
/// - `is_destructive()`: whether running the command changes the machine.
///   Destructive commands are skipped in dry-run mode.
pub trait CommandArgs {
    /// Executable name (e.g. "winget")
    fn program(&self) -> &'static str;

    /// Convert struct fields to command-line arguments
    fn to_cli_args(&self) -> Vec<String>;

    /// Whether the command modifies system state
    fn is_destructive(&self) -> bool {
        true
    }

    /// Build the runnable command description
    fn to_spec(&self) -> CommandSpec {
        CommandSpec {
            program: self.program().to_string(),
            args: self.to_cli_args(),
            destructive: self.is_destructive(),
        }
    }
}

/// A fully built command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub destructive: bool,
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Output from a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated without one).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// A successful run with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
            success: true,
        }
    }

    /// A failed run with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            success: false,
        }
    }

    /// Check if the command succeeded and return a collaborator error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            return Ok(());
        }
        let code = self.exit_code.unwrap_or(-1);
        let detail = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };
        Err(BootstrapError::collaborator(format!(
            "{} failed (exit code {}): {}",
            context, code, detail
        )))
    }

    /// Case-insensitive search of stdout and stderr
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.stdout.to_ascii_lowercase().contains(&needle)
            || self.stderr.to_ascii_lowercase().contains(&needle)
    }
}

/// Executes command specs on behalf of the stages
pub trait CommandRunner {
    /// Run a command to completion and capture its output.
    ///
    /// A nonzero exit is reported through `CommandOutput::success`; `Err`
    /// means the command could not be started at all.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Find a program on PATH or in a per-user tool directory
    fn locate(&self, program: &str) -> Option<PathBuf> {
        locate_program(program)
    }

    /// True if destructive commands are only being previewed
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Per-user install locations that a fresh installer only adds to the PATH
/// of new sessions
fn user_tool_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(root) = env::var_os("SCOOP") {
        dirs.push(PathBuf::from(root).join("shims"));
    }
    if let Some(home) = env::var_os("USERPROFILE") {
        dirs.push(PathBuf::from(home).join("scoop").join("shims"));
    }
    dirs
}

/// Resolve `program` on PATH, then in the per-user tool directories
pub fn locate_program(program: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(program) {
        return Some(path);
    }
    let dirs = user_tool_dirs();
    if dirs.is_empty() {
        return None;
    }
    let search = env::join_paths(dirs).ok()?;
    let cwd = env::current_dir().ok()?;
    which::which_in(program, Some(search), cwd).ok()
}

/// Run typed arguments through a runner
pub fn run_args<A: CommandArgs + ?Sized>(runner: &dyn CommandRunner, args: &A) -> Result<CommandOutput> {
    runner.run(&args.to_spec())
}

/// Runner that really executes commands
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        info!("Executing: {}", spec);

        // Resolving through PATHEXT lets shims such as scoop.cmd run directly
        let program = self
            .locate(&spec.program)
            .unwrap_or_else(|| PathBuf::from(&spec.program));

        let output = Command::new(&program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                BootstrapError::collaborator(format!("Failed to start {}: {}", spec.program, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(program = spec.program.as_str(), "{}", line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!(program = spec.program.as_str(), stream = "stderr", "{}", line);
        }

        let exit_code = output.status.code();
        if output.status.success() {
            info!("{} finished successfully", spec.program);
        } else {
            info!("{} failed with exit code {}", spec.program, exit_code.unwrap_or(-1));
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success: output.status.success(),
        })
    }
}

/// Runner that previews destructive commands.
///
/// Destructive commands are logged and reported as successful with empty
/// output. Read-only commands (version checks, adapter queries) still run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunRunner {
    inner: SystemRunner,
}

impl CommandRunner for DryRunRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if spec.destructive {
            info!("[dry-run] would execute: {}", spec);
            Ok(CommandOutput::ok(""))
        } else {
            self.inner.run(spec)
        }
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
