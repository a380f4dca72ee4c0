//! Type-safe arguments for the network cmdlets.
//!
//! All of these run through Windows PowerShell:
//! - `RenameComputerArgs` for `Rename-Computer`
//! - `FindAdapterArgs` for `Get-NetAdapter` (read-only)
//! - `SetStaticIpArgs` for `New-NetIPAddress` (after clearing old config)
//! - `SetDnsArgs` for `Set-DnsClientServerAddress`
//!
//! Values are expected to be validated before they reach these structs; they
//! are still quoted so a stray quote cannot break out of the script.

use super::{powershell_args, ps_quote, POWERSHELL};
use crate::command_runner::CommandArgs;

// ============================================================================
// Rename Computer
// ============================================================================

/// Type-safe arguments for `Rename-Computer`.
#[derive(Debug, Clone)]
pub struct RenameComputerArgs {
    /// New computer name (validated hostname).
    pub new_name: String,
}

impl CommandArgs for RenameComputerArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        powershell_args(&format!(
            "Rename-Computer -NewName {} -Force -ErrorAction Stop",
            ps_quote(&self.new_name)
        ))
    }
}

// ============================================================================
// Find Adapter
// ============================================================================

/// Prints the interface index of the first adapter that is `Up`.
#[derive(Debug, Clone, Default)]
pub struct FindAdapterArgs;

impl FindAdapterArgs {
    /// Parse the interface index printed by the query
    pub fn parse_index(stdout: &str) -> Option<u32> {
        stdout
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .and_then(|l| l.parse().ok())
    }
}

impl CommandArgs for FindAdapterArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        powershell_args(
            "Get-NetAdapter | Where-Object Status -eq 'Up' | Sort-Object ifIndex | \
             Select-Object -First 1 -ExpandProperty ifIndex",
        )
    }

    /// Adapter query is READ-ONLY.
    fn is_destructive(&self) -> bool {
        false
    }
}

// ============================================================================
// Static IP
// ============================================================================

/// Type-safe arguments for assigning a static IPv4 address.
///
/// Disables DHCP on the interface and removes existing IPv4 addresses and
/// the default route before adding the new address, otherwise
/// `New-NetIPAddress` fails on an already-configured adapter.
#[derive(Debug, Clone)]
pub struct SetStaticIpArgs {
    /// Interface index from `FindAdapterArgs`.
    pub interface_index: u32,
    /// IPv4 address.
    pub ip_address: String,
    /// CIDR prefix length derived from the subnet mask.
    pub prefix_length: u8,
    /// Default gateway.
    pub gateway: String,
}

impl CommandArgs for SetStaticIpArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        let idx = self.interface_index;
        let script = [
            format!("Set-NetIPInterface -InterfaceIndex {idx} -Dhcp Disabled -ErrorAction Stop"),
            format!(
                "Remove-NetIPAddress -InterfaceIndex {idx} -AddressFamily IPv4 -Confirm:$false -ErrorAction SilentlyContinue"
            ),
            format!(
                "Remove-NetRoute -InterfaceIndex {idx} -DestinationPrefix '0.0.0.0/0' -Confirm:$false -ErrorAction SilentlyContinue"
            ),
            format!(
                "New-NetIPAddress -InterfaceIndex {idx} -IPAddress {} -PrefixLength {} -DefaultGateway {} -ErrorAction Stop | Out-Null",
                ps_quote(&self.ip_address),
                self.prefix_length,
                ps_quote(&self.gateway)
            ),
        ]
        .join("; ");
        powershell_args(&script)
    }
}

// ============================================================================
// DNS
// ============================================================================

/// Type-safe arguments for `Set-DnsClientServerAddress`.
#[derive(Debug, Clone)]
pub struct SetDnsArgs {
    /// Interface index from `FindAdapterArgs`.
    pub interface_index: u32,
    /// DNS server address.
    pub server: String,
}

impl CommandArgs for SetDnsArgs {
    fn program(&self) -> &'static str {
        POWERSHELL
    }

    fn to_cli_args(&self) -> Vec<String> {
        powershell_args(&format!(
            "Set-DnsClientServerAddress -InterfaceIndex {} -ServerAddresses {} -ErrorAction Stop",
            self.interface_index,
            ps_quote(&self.server)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_of(args: &impl CommandArgs) -> String {
        args.to_cli_args().pop().unwrap()
    }

    #[test]
    fn test_rename_computer_script() {
        let args = RenameComputerArgs {
            new_name: "web-01".to_string(),
        };
        assert_eq!(args.program(), "powershell");
        assert!(script_of(&args).contains("Rename-Computer -NewName 'web-01' -Force"));
        assert!(args.is_destructive());
    }

    #[test]
    fn test_find_adapter_is_read_only() {
        assert!(!FindAdapterArgs.is_destructive());
        assert!(script_of(&FindAdapterArgs).contains("Get-NetAdapter"));
    }

    #[test]
    fn test_parse_adapter_index() {
        assert_eq!(FindAdapterArgs::parse_index("12\r\n"), Some(12));
        assert_eq!(FindAdapterArgs::parse_index("\n  7  \n"), Some(7));
        assert_eq!(FindAdapterArgs::parse_index(""), None);
        assert_eq!(FindAdapterArgs::parse_index("Ethernet"), None);
    }

    #[test]
    fn test_static_ip_script() {
        let args = SetStaticIpArgs {
            interface_index: 12,
            ip_address: "192.168.1.50".to_string(),
            prefix_length: 24,
            gateway: "192.168.1.1".to_string(),
        };
        let script = script_of(&args);
        assert!(script.contains("-Dhcp Disabled"));
        assert!(script.contains("Remove-NetIPAddress -InterfaceIndex 12"));
        assert!(script.contains(
            "New-NetIPAddress -InterfaceIndex 12 -IPAddress '192.168.1.50' -PrefixLength 24 -DefaultGateway '192.168.1.1'"
        ));
        // Old addresses must be cleared before the new one is added
        let remove = script.find("Remove-NetIPAddress").unwrap();
        let add = script.find("New-NetIPAddress").unwrap();
        assert!(remove < add);
    }

    #[test]
    fn test_dns_script() {
        let args = SetDnsArgs {
            interface_index: 3,
            server: "1.1.1.1".to_string(),
        };
        assert!(script_of(&args)
            .contains("Set-DnsClientServerAddress -InterfaceIndex 3 -ServerAddresses '1.1.1.1'"));
    }
}
