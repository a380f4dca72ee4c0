//! Type-safe command argument modules.
//!
//! This module contains structs that implement `CommandArgs` for each external
//! tool winstrap drives. Each struct maps Rust fields to the exact arguments
//! the tool expects, so a misspelled flag is a compile error rather than a
//! failed install.

pub mod network;
pub mod profile;
pub mod scoop;
pub mod winget;

/// Windows PowerShell executable
pub const POWERSHELL: &str = "powershell";

/// Arguments that run `script` in a non-interactive PowerShell session
pub fn powershell_args(script: &str) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-ExecutionPolicy".to_string(),
        "Bypass".to_string(),
        "-Command".to_string(),
        script.to_string(),
    ]
}

/// Quote a value as a PowerShell single-quoted string literal
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
