//! Type-safe arguments for Scoop.
//!
//! - `ScoopBootstrapArgs` runs the official installer through PowerShell
//! - `ScoopBucketAddArgs` for `scoop bucket add`
//! - `ScoopInstallArgs` for `scoop install`

use super::{powershell_args, POWERSHELL};
use crate::command_runner::CommandArgs;

/// Scoop executable (a `.cmd` shim on Windows, resolved via PATHEXT)
pub const SCOOP: &str = "scoop";

/// Runs `get.scoop.sh` as the elevated user.
///
/// Scoop refuses to install from an administrator shell unless
/// `-RunAsAdmin` is passed, and bootstrap sessions are usually elevated.
#[derive(Debug, Clone, Default)]
pub struct ScoopBootstrapArgs;

impl CommandArgs for ScoopBootstrapArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        powershell_args("iex \"& {$(irm get.scoop.sh)} -RunAsAdmin\"")
    }
}

/// Type-safe arguments for `scoop bucket add <bucket>`.
#[derive(Debug, Clone)]
pub struct ScoopBucketAddArgs {
    /// Bucket name, e.g. `extras`.
    pub bucket: String,
}

impl CommandArgs for ScoopBucketAddArgs {
    fn program(&self) -> &'static str {
        SCOOP
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["bucket".to_string(), "add".to_string(), self.bucket.clone()]
    }
}

/// Type-safe arguments for `scoop install <package>`.
#[derive(Debug, Clone)]
pub struct ScoopInstallArgs {
    /// Package name, optionally bucket-qualified (`extras/vscode`).
    pub package: String,
}

impl CommandArgs for ScoopInstallArgs {
    fn program(&self) -> &'static str {
        SCOOP
    }

    fn to_cli_args(&self) -> Vec<String> {
        vec!["install".to_string(), self.package.clone()]
    }
}

/// Bucket prefix of a `bucket/app` package name
pub fn bucket_of(package: &str) -> Option<&str> {
    match package.split_once('/') {
        Some((bucket, app)) if !bucket.is_empty() && !app.is_empty() => Some(bucket),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_args() {
        let args = ScoopInstallArgs {
            package: "git".to_string(),
        };
        assert_eq!(args.program(), "scoop");
        assert_eq!(args.to_cli_args(), vec!["install", "git"]);
        assert!(args.is_destructive());
        assert!(bucket_of(&args.package).is_none());
    }

    #[test]
    fn test_bucket_qualified_package() {
        let args = ScoopInstallArgs {
            package: "extras/vscode".to_string(),
        };
        assert_eq!(bucket_of(&args.package), Some("extras"));
        assert_eq!(args.to_cli_args(), vec!["install", "extras/vscode"]);
    }

    #[test]
    fn test_bucket_of_rejects_degenerate_names() {
        assert_eq!(bucket_of("/vscode"), None);
        assert_eq!(bucket_of("extras/"), None);
        assert_eq!(bucket_of("git"), None);
    }

    #[test]
    fn test_bucket_add_args() {
        let args = ScoopBucketAddArgs {
            bucket: "extras".to_string(),
        };
        assert_eq!(args.to_cli_args(), vec!["bucket", "add", "extras"]);
    }

    #[test]
    fn test_bootstrap_runs_through_powershell() {
        let args = ScoopBootstrapArgs;
        assert_eq!(args.program(), "powershell");
        let script = args.to_cli_args().pop().unwrap();
        assert!(script.contains("get.scoop.sh"));
        assert!(script.contains("-RunAsAdmin"));
    }
}
