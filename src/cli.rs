//! Command-line interface definitions and their mapping onto `RunOptions`.

use crate::config_file::ConfigPaths;
use crate::network::NetworkSettings;
use crate::orchestrator::RunOptions;
use crate::package_manager::ManagerKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// winstrap - bootstrap a fresh Windows machine
#[derive(Parser, Debug)]
#[command(name = "winstrap")]
#[command(about = "Configure networking and install curated CLI and GUI apps on Windows")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: show what would be executed without making changes.
    ///
    /// Installs, renames and network changes are skipped and logged.
    /// Read-only commands (winget --version, adapter lookup) still execute
    /// so the preview is realistic.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Never prompt: run every stage with config-file values and overrides
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Directory holding the JSON config files and the profile script
    #[arg(long, global = true, env = "WINSTRAP_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Directory for run transcripts
    #[arg(long, global = true, env = "WINSTRAP_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run every bootstrap stage (default)
    Run(RunArgs),
    /// Configure hostname, static IP and DNS only
    Network(NetworkArgs),
    /// Install apps with one package manager only
    Apps {
        /// Package manager to use
        #[arg(value_enum)]
        manager: ManagerKind,

        /// Categories to install without prompting (comma-separated)
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Install every category without prompting
        #[arg(long)]
        all: bool,
    },
    /// Print both app catalogs as the selection menu numbers them
    List,
    /// Load every config file and report problems
    Validate,
}

/// Flags of the full run
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Skip the network stage
    #[arg(long)]
    pub skip_network: bool,

    /// Skip the Scoop stage
    #[arg(long)]
    pub skip_cli_apps: bool,

    /// Skip the WinGet stage
    #[arg(long)]
    pub skip_gui_apps: bool,

    /// Skip the profile setup stage
    #[arg(long)]
    pub skip_profile: bool,

    /// Scoop categories to install without prompting (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub cli_categories: Vec<String>,

    /// WinGet categories to install without prompting (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub gui_categories: Vec<String>,

    /// Install every category of both catalogs without prompting
    #[arg(long)]
    pub all_apps: bool,

    /// Profile script to run instead of <config-dir>/profile-setup.ps1
    #[arg(long)]
    pub profile_script: Option<PathBuf>,

    #[command(flatten)]
    pub network: NetworkArgs,
}

/// Network values that override network-config.json
#[derive(Args, Debug, Default, Clone)]
pub struct NetworkArgs {
    /// New computer name
    #[arg(long)]
    pub hostname: Option<String>,

    /// Static IPv4 address
    #[arg(long)]
    pub ip: Option<String>,

    /// Subnet mask for the static address
    #[arg(long)]
    pub subnet_mask: Option<String>,

    /// Default gateway for the static address
    #[arg(long)]
    pub gateway: Option<String>,

    /// DNS server
    #[arg(long)]
    pub dns: Option<String>,
}

impl NetworkArgs {
    pub fn to_settings(&self) -> NetworkSettings {
        NetworkSettings {
            hostname: self.hostname.clone(),
            ip_address: self.ip.clone(),
            subnet_mask: self.subnet_mask.clone(),
            gateway: self.gateway.clone(),
            dns_server: self.dns.clone(),
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Options shared by every command
    fn base_options(&self) -> RunOptions {
        RunOptions {
            paths: ConfigPaths::new(&self.config_dir),
            assume_yes: self.yes,
            current_hostname: std::env::var("COMPUTERNAME").ok(),
            ..Default::default()
        }
    }

    /// Options for a full run
    pub fn run_options(&self, args: &RunArgs) -> RunOptions {
        RunOptions {
            skip_network: args.skip_network,
            skip_cli_apps: args.skip_cli_apps,
            skip_gui_apps: args.skip_gui_apps,
            skip_profile: args.skip_profile,
            cli_categories: args.cli_categories.clone(),
            gui_categories: args.gui_categories.clone(),
            all_apps: args.all_apps,
            profile_script: args.profile_script.clone(),
            network_overrides: args.network.to_settings(),
            ..self.base_options()
        }
    }

    /// Options for the network-only command
    pub fn network_options(&self, args: &NetworkArgs) -> RunOptions {
        RunOptions {
            network_overrides: args.to_settings(),
            ..self.base_options()
        }
    }

    /// Options for the single package manager command
    pub fn apps_options(&self, kind: ManagerKind, categories: &[String], all: bool) -> RunOptions {
        let mut options = RunOptions {
            all_apps: all,
            ..self.base_options()
        };
        match kind {
            ManagerKind::Scoop => options.cli_categories = categories.to_vec(),
            ManagerKind::Winget => options.gui_categories = categories.to_vec(),
        }
        options
    }

    pub fn config_paths(&self) -> ConfigPaths {
        ConfigPaths::new(&self.config_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_no_args() {
        // No command means a full run
        let cli = Cli::try_parse_from(["winstrap"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["winstrap", "list", "--dry-run", "--no-color"]).unwrap();
        assert!(cli.dry_run);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Some(Commands::List)));
    }

    #[test]
    fn test_run_flags_and_categories() {
        let cli = Cli::try_parse_from([
            "winstrap",
            "--yes",
            "run",
            "--skip-profile",
            "--cli-categories",
            "essential,shell",
            "--ip",
            "10.0.0.5",
            "--gateway",
            "10.0.0.1",
        ])
        .unwrap();
        let Some(Commands::Run(args)) = &cli.command else {
            panic!("expected run command");
        };
        let options = cli.run_options(args);
        assert!(options.assume_yes);
        assert!(options.skip_profile);
        assert_eq!(options.cli_categories, vec!["essential", "shell"]);
        assert_eq!(options.network_overrides.ip_address.as_deref(), Some("10.0.0.5"));
        assert_eq!(options.network_overrides.gateway.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_apps_command() {
        let cli = Cli::try_parse_from(["winstrap", "apps", "winget", "--categories", "browsers"]).unwrap();
        let Some(Commands::Apps { manager, categories, all }) = &cli.command else {
            panic!("expected apps command");
        };
        assert_eq!(*manager, ManagerKind::Winget);
        let options = cli.apps_options(*manager, categories, *all);
        assert_eq!(options.gui_categories, vec!["browsers"]);
        assert!(options.cli_categories.is_empty());
    }

    #[test]
    fn test_apps_rejects_unknown_manager() {
        assert!(Cli::try_parse_from(["winstrap", "apps", "chocolatey"]).is_err());
    }

    #[test]
    fn test_config_dir_flag() {
        let cli = Cli::try_parse_from(["winstrap", "--config-dir", "C:\\setup", "validate"]).unwrap();
        assert_eq!(cli.config_paths().dir(), std::path::Path::new("C:\\setup"));
    }
}
