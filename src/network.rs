//! Network settings and the network configuration stage.
//!
//! `NetworkSettings` mirrors `network-config.json`. Every field is optional;
//! an IP address needs a gateway to form a complete static configuration.
//! Applying the settings is delegated to PowerShell cmdlets through the
//! command layer; this module only decides which cmdlets to run.

use crate::command_runner::{run_args, CommandRunner};
use crate::commands::network::{FindAdapterArgs, RenameComputerArgs, SetDnsArgs, SetStaticIpArgs};
use crate::console::Console;
use crate::error::{BootstrapError, Result};
use crate::validate::{subnet_prefix_length, validate_hostname, validate_ipv4, validate_subnet_mask};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info};

/// Subnet mask used when an IP address is configured without one
pub const DEFAULT_SUBNET_MASK: &str = "255.255.255.0";

/// Optional network settings for the machine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_mask: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server: Option<String>,
}

/// The recognized fields of `network-config.json`, in prompt order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum NetworkField {
    Hostname,
    IpAddress,
    SubnetMask,
    Gateway,
    DnsServer,
}

impl NetworkField {
    /// Name used in prompts and warnings
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hostname => "Hostname",
            Self::IpAddress => "IP address",
            Self::SubnetMask => "Subnet mask",
            Self::Gateway => "Gateway",
            Self::DnsServer => "DNS server",
        }
    }

    /// Validate a candidate value for this field
    pub fn validate(self, value: &str) -> Result<()> {
        match self {
            Self::Hostname => validate_hostname(value),
            Self::SubnetMask => validate_subnet_mask(value),
            Self::IpAddress | Self::Gateway | Self::DnsServer => validate_ipv4(self.label(), value),
        }
    }
}

/// A complete static IPv4 assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIp {
    pub ip_address: String,
    pub prefix_length: u8,
    pub gateway: String,
}

impl NetworkSettings {
    /// Current value of a field
    pub fn get(&self, field: NetworkField) -> Option<&str> {
        match field {
            NetworkField::Hostname => self.hostname.as_deref(),
            NetworkField::IpAddress => self.ip_address.as_deref(),
            NetworkField::SubnetMask => self.subnet_mask.as_deref(),
            NetworkField::Gateway => self.gateway.as_deref(),
            NetworkField::DnsServer => self.dns_server.as_deref(),
        }
    }

    /// Mutable slot of a field
    pub fn slot_mut(&mut self, field: NetworkField) -> &mut Option<String> {
        match field {
            NetworkField::Hostname => &mut self.hostname,
            NetworkField::IpAddress => &mut self.ip_address,
            NetworkField::SubnetMask => &mut self.subnet_mask,
            NetworkField::Gateway => &mut self.gateway,
            NetworkField::DnsServer => &mut self.dns_server,
        }
    }

    /// Drop every field that fails validation.
    ///
    /// Returns one warning message per dropped field.
    pub fn drop_invalid(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        for field in NetworkField::iter() {
            let slot = self.slot_mut(field);
            if let Some(value) = slot.as_deref()
                && let Err(e) = field.validate(value)
            {
                let reason = match e {
                    BootstrapError::Validation(msg) => msg,
                    other => other.to_string(),
                };
                warnings.push(format!("Ignoring {}: {}", field, reason));
                *slot = None;
            }
        }
        warnings
    }

    /// True if no field is set
    pub fn is_empty(&self) -> bool {
        self.hostname.is_none()
            && self.ip_address.is_none()
            && self.subnet_mask.is_none()
            && self.gateway.is_none()
            && self.dns_server.is_none()
    }

    /// Overlay every field that is set in `overrides`
    pub fn merge(&mut self, overrides: &NetworkSettings) {
        fn overlay(target: &mut Option<String>, source: &Option<String>) {
            if source.is_some() {
                target.clone_from(source);
            }
        }
        overlay(&mut self.hostname, &overrides.hostname);
        overlay(&mut self.ip_address, &overrides.ip_address);
        overlay(&mut self.subnet_mask, &overrides.subnet_mask);
        overlay(&mut self.gateway, &overrides.gateway);
        overlay(&mut self.dns_server, &overrides.dns_server);
    }

    /// The configured subnet mask, or the default
    pub fn subnet_mask_or_default(&self) -> &str {
        self.subnet_mask.as_deref().unwrap_or(DEFAULT_SUBNET_MASK)
    }

    /// The static IP assignment these settings describe.
    ///
    /// `Ok(None)` when no IP address is set. An IP address without a gateway,
    /// or with a non-contiguous mask, is a validation error.
    pub fn static_ip(&self) -> Result<Option<StaticIp>> {
        let Some(ip_address) = self.ip_address.as_ref() else {
            return Ok(None);
        };
        let Some(gateway) = self.gateway.as_ref() else {
            return Err(BootstrapError::validation(format!(
                "IP address {} is set but no gateway was provided",
                ip_address
            )));
        };
        let mask = self.subnet_mask_or_default();
        let prefix_length = subnet_prefix_length(mask).ok_or_else(|| {
            BootstrapError::validation(format!("Subnet mask '{}' is not valid", mask))
        })?;
        Ok(Some(StaticIp {
            ip_address: ip_address.clone(),
            prefix_length,
            gateway: gateway.clone(),
        }))
    }
}

/// Apply `settings` to the machine.
///
/// Each step (rename, static IP, DNS) is attempted independently; failures
/// are reported as warnings and summarized in the returned error so the
/// caller can record the stage as failed without aborting the run.
pub fn apply_settings(
    settings: &NetworkSettings,
    current_hostname: Option<&str>,
    runner: &dyn CommandRunner,
    console: &mut Console,
) -> Result<()> {
    if settings.is_empty() {
        console.info("No network settings to apply");
        return Ok(());
    }

    let mut failures = Vec::new();

    if let Some(hostname) = settings.hostname.as_deref() {
        if let Err(e) = rename_computer(hostname, current_hostname, runner, console) {
            console.warning(format!("Hostname change failed: {}", e));
            failures.push("hostname");
        }
    }

    let needs_adapter = settings.ip_address.is_some() || settings.dns_server.is_some();
    let adapter = if needs_adapter {
        match find_adapter(runner) {
            Ok(index) => Some(index),
            Err(e) => {
                console.warning(format!("Could not find an active network adapter: {}", e));
                failures.push("adapter");
                None
            }
        }
    } else {
        None
    };

    if let Some(index) = adapter {
        match settings.static_ip() {
            Ok(Some(plan)) => match set_static_ip(index, &plan, runner) {
                Ok(()) => console.success(format!(
                    "Static IP {}/{} via {} configured",
                    plan.ip_address, plan.prefix_length, plan.gateway
                )),
                Err(e) => {
                    console.warning(format!("Static IP configuration failed: {}", e));
                    failures.push("static IP");
                }
            },
            Ok(None) => debug!("No static IP requested"),
            Err(e) => {
                console.warning(format!("Skipping static IP: {}", e));
                failures.push("static IP");
            }
        }

        if let Some(server) = settings.dns_server.as_deref() {
            let args = SetDnsArgs {
                interface_index: index,
                server: server.to_string(),
            };
            match run_args(runner, &args).and_then(|out| out.ensure_success("Set-DnsClientServerAddress")) {
                Ok(()) => console.success(format!("DNS server set to {}", server)),
                Err(e) => {
                    console.warning(format!("DNS configuration failed: {}", e));
                    failures.push("DNS");
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(BootstrapError::collaborator(format!(
            "network steps failed: {}",
            failures.join(", ")
        )))
    }
}

fn rename_computer(
    hostname: &str,
    current_hostname: Option<&str>,
    runner: &dyn CommandRunner,
    console: &mut Console,
) -> Result<()> {
    if current_hostname.is_some_and(|current| current.eq_ignore_ascii_case(hostname)) {
        console.info(format!("Hostname is already {}", hostname));
        return Ok(());
    }
    let args = RenameComputerArgs {
        new_name: hostname.to_string(),
    };
    run_args(runner, &args)?.ensure_success("Rename-Computer")?;
    console.success(format!("Computer renamed to {}", hostname));
    console.warning("A restart is required for the new hostname to take effect");
    Ok(())
}

fn find_adapter(runner: &dyn CommandRunner) -> Result<u32> {
    let output = run_args(runner, &FindAdapterArgs)?;
    output.ensure_success("Get-NetAdapter")?;
    let index = FindAdapterArgs::parse_index(&output.stdout)
        .ok_or_else(|| BootstrapError::collaborator("no adapter with status 'Up'"))?;
    info!("Using network adapter with interface index {}", index);
    Ok(index)
}

fn set_static_ip(index: u32, plan: &StaticIp, runner: &dyn CommandRunner) -> Result<()> {
    let args = SetStaticIpArgs {
        interface_index: index,
        ip_address: plan.ip_address.clone(),
        prefix_length: plan.prefix_length,
        gateway: plan.gateway.clone(),
    };
    run_args(runner, &args)?.ensure_success("New-NetIPAddress")
}
