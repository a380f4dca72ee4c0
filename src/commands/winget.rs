//! Type-safe arguments for WinGet.

use crate::command_runner::CommandArgs;

/// WinGet executable
pub const WINGET: &str = "winget";

/// `winget --version`, used to check that WinGet is usable.
#[derive(Debug, Clone, Default)]
pub struct WingetVersionArgs;

impl CommandArgs for WingetVersionArgs {
    fn program(&self) -> &'static str {
        WINGET
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["--version".to_string()]
    }

    /// Version check is READ-ONLY.
    fn is_destructive(&self) -> bool {
        false
    }
}

/// Type-safe arguments for an unattended `winget install`.
#[derive(Debug, Clone)]
pub struct WingetInstallArgs {
    /// Exact package id, e.g. `Mozilla.Firefox`.
    pub id: String,
}

impl CommandArgs for WingetInstallArgs {
    fn program(&self) -> &'static str {
        WINGET
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "install".to_string(),
            "--id".to_string(),
            self.id.clone(),
            "-e".to_string(),
            "--silent".to_string(),
            "--accept-package-agreements".to_string(),
            "--accept-source-agreements".to_string(),
        ]
    }
}
