//! Type-safe arguments for the PowerShell profile setup script.

use super::POWERSHELL;
use crate::command_runner::CommandArgs;
use std::path::PathBuf;

/// Runs a profile setup script with `powershell -File`.
#[derive(Debug, Clone)]
pub struct ProfileSetupArgs {
    /// Path to the `.ps1` script.
    pub script: PathBuf,
}

impl CommandArgs for ProfileSetupArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec![
            "-NoProfile".to_string(),
            "-ExecutionPolicy".to_string(),
            "Bypass".to_string(),
            "-File".to_string(),
            self.script.display().to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_args_use_file() {
        let args = ProfileSetupArgs {
            script: PathBuf::from("config/profile-setup.ps1"),
        };
        let cli_args = args.to_cli_args();
        let file_pos = cli_args.iter().position(|a| a == "-File").unwrap();
        assert_eq!(cli_args[file_pos + 1], "config/profile-setup.ps1");
        assert!(args.is_destructive());
    }
}
