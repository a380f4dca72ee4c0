//! winstrap library
//!
//! Core of the Windows bootstrapper: config loading, interactive selection,
//! typed external commands and the staged orchestrator. The binary in
//! `main.rs` is a thin `clap` front end over these modules.

pub mod catalog;
pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod config_file;
pub mod console;
pub mod error;
pub mod inspect;
pub mod menu;
pub mod network;
pub mod orchestrator;
pub mod package_manager;
pub mod stage;
pub mod transcript;
pub mod validate;

// Re-export main types for convenience
pub use catalog::{AppCatalog, AppEntry, Category, Selection};
pub use command_runner::{
    CommandArgs, CommandOutput, CommandRunner, CommandSpec, DryRunRunner, SystemRunner,
};
pub use config_file::{load_catalog, load_network, ConfigPaths, NetworkLoad};
pub use console::{prompt_validated, Console};
pub use error::{BootstrapError, Result};
pub use network::{NetworkField, NetworkSettings};
pub use orchestrator::{Orchestrator, RunOptions, RunSummary};
pub use package_manager::{InstallOutcome, InstallReport, ManagerKind, PackageManager};
pub use stage::{RunContext, Stage, StageOutcome, StageTransitionError};
pub use transcript::Transcript;
pub use validate::{is_valid_hostname, is_valid_ipv4};
