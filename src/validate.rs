//! Input validators for network settings.
//!
//! Pure predicates used by the config loader (to drop bad fields) and the
//! network prompts (to reprompt). None of these panic or touch the system.

use crate::error::{BootstrapError, Result};
use std::net::Ipv4Addr;

/// Longest hostname Windows accepts (NetBIOS limit).
pub const MAX_HOSTNAME_LEN: usize = 15;

/// Returns true if `s` is a usable Windows computer name.
///
/// 1-15 characters, ASCII letters, digits and hyphens only, and no leading or
/// trailing hyphen. Surrounding whitespace makes the name invalid.
pub fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_HOSTNAME_LEN {
        return false;
    }
    if s.starts_with('-') || s.ends_with('-') {
        return false;
    }
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Returns true if `s` is a dotted-quad IPv4 address.
///
/// Exactly four decimal octets in `0..=255`. Whitespace, signs, empty octets
/// and leading zeros are rejected.
pub fn is_valid_ipv4(s: &str) -> bool {
    s.parse::<Ipv4Addr>().is_ok()
}

/// Convert a dotted-quad subnet mask into a CIDR prefix length.
///
/// Returns `None` if the mask is not valid IPv4 or its one bits are not
/// contiguous from the left (e.g. `255.0.255.0`).
pub fn subnet_prefix_length(mask: &str) -> Option<u8> {
    let bits = u32::from(mask.parse::<Ipv4Addr>().ok()?);
    if bits.leading_ones() + bits.trailing_zeros() != 32 {
        return None;
    }
    u8::try_from(bits.leading_ones()).ok()
}

/// Validate a hostname, producing a message suitable for a reprompt warning.
pub fn validate_hostname(s: &str) -> Result<()> {
    if s.trim().is_empty() {
        return Err(BootstrapError::validation("Hostname cannot be empty"));
    }
    if s.len() > MAX_HOSTNAME_LEN {
        return Err(BootstrapError::validation(format!(
            "Hostname '{}' is longer than {} characters",
            s, MAX_HOSTNAME_LEN
        )));
    }
    if !is_valid_hostname(s) {
        return Err(BootstrapError::validation(format!(
            "Hostname '{}' may only contain letters, digits and hyphens, and cannot start or end with a hyphen",
            s
        )));
    }
    Ok(())
}

/// Validate an IPv4 field. `field` names the setting in the message.
pub fn validate_ipv4(field: &str, s: &str) -> Result<()> {
    if is_valid_ipv4(s) {
        Ok(())
    } else {
        Err(BootstrapError::validation(format!(
            "{} '{}' is not a valid IPv4 address",
            field, s
        )))
    }
}

/// Validate a subnet mask: a valid IPv4 address with contiguous one bits.
pub fn validate_subnet_mask(s: &str) -> Result<()> {
    validate_ipv4("Subnet mask", s)?;
    if subnet_prefix_length(s).is_none() {
        return Err(BootstrapError::validation(format!(
            "Subnet mask '{}' is not contiguous",
            s
        )));
    }
    Ok(())
}
