//! Utility functions for target expansion and DNSBL query names.
//!
//! Turns the user's target (one IPv4 address or a /24) into the list of
//! addresses to probe, and builds reversed-IP query names for each zone.

use crate::error::DnsblCheckError;
use crate::types::ExpandedInput;
use ipnetwork::IpNetwork;
use std::net::{IpAddr, Ipv4Addr};

/// The only prefix length accepted for subnet targets.
pub const SUPPORTED_PREFIX: u8 = 24;

/// Expand a target into the addresses to probe.
///
/// - Without a `/`, the input must be an IPv4 literal (an IPv4-mapped IPv6
///   literal is accepted and canonicalised). Produces one address.
/// - With a `/`, the input must be IPv4 CIDR with prefix length 24.
///   Produces the 256 addresses of the network in ascending order.
///
/// # Examples
///
/// ```rust
/// use dnsbl_check_lib::expand_input;
///
/// let single = expand_input("203.0.113.5").unwrap();
/// assert_eq!(single.addresses, vec!["203.0.113.5"]);
///
/// let subnet = expand_input("203.0.113.77/24").unwrap();
/// assert_eq!(subnet.addresses.len(), 256);
/// assert_eq!(subnet.label, "203.0.113.0/24");
/// ```
///
/// # Errors
///
/// - `InvalidAddress` for a bad single address
/// - `InvalidSubnet` for malformed CIDR syntax
/// - `UnsupportedPrefixLength` for anything other than an IPv4 /24
pub fn expand_input(input: &str) -> Result<ExpandedInput, DnsblCheckError> {
    let input = input.trim();

    if !input.contains('/') {
        let addr = parse_ipv4(input).ok_or_else(|| DnsblCheckError::invalid_address(input))?;
        let canonical = addr.to_string();
        return Ok(ExpandedInput {
            addresses: vec![canonical.clone()],
            label: canonical,
        });
    }

    if !is_strict_cidr(input) {
        return Err(DnsblCheckError::invalid_subnet(input));
    }

    let network: IpNetwork = input
        .parse()
        .map_err(|_| DnsblCheckError::invalid_subnet(input))?;

    let network = match network {
        IpNetwork::V4(net) if net.prefix() == SUPPORTED_PREFIX => net,
        other => {
            return Err(DnsblCheckError::UnsupportedPrefixLength {
                prefix: other.prefix(),
            })
        }
    };

    let [a, b, c, _] = network.network().octets();
    let addresses = (0..=255u8)
        .map(|d| Ipv4Addr::new(a, b, c, d).to_string())
        .collect();

    Ok(ExpandedInput {
        addresses,
        label: format!("{}/{}", network.network(), network.prefix()),
    })
}

/// A full IP literal, one `/`, and a prefix made only of decimal digits.
///
/// `ipnetwork` on its own accepts a signed prefix (`/+24`) and shorthand
/// addresses (`10.1/16`).
fn is_strict_cidr(input: &str) -> bool {
    match input.split_once('/') {
        Some((addr, prefix)) => {
            addr.parse::<IpAddr>().is_ok()
                && !prefix.is_empty()
                && prefix.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Parse an IPv4 literal, accepting IPv4-mapped IPv6 forms.
fn parse_ipv4(input: &str) -> Option<Ipv4Addr> {
    match input.parse::<IpAddr>().ok()? {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    }
}

/// Reverse the four dot-separated components of an address.
///
/// Returns `None` unless the address splits into exactly four components.
/// The components themselves are not re-validated.
pub fn reverse_address(address: &str) -> Option<String> {
    let parts: Vec<&str> = address.split('.').collect();
    if parts.len() != 4 {
        return None;
    }
    Some(format!("{}.{}.{}.{}", parts[3], parts[2], parts[1], parts[0]))
}

/// Build the DNSBL query name for an address and zone.
///
/// ```rust
/// use dnsbl_check_lib::build_query_name;
///
/// let name = build_query_name("203.0.113.5", "bl.spamcop.net").unwrap();
/// assert_eq!(name, "5.113.0.203.bl.spamcop.net");
/// ```
pub fn build_query_name(address: &str, domain: &str) -> Result<String, DnsblCheckError> {
    let reversed =
        reverse_address(address).ok_or_else(|| DnsblCheckError::malformed_address(address))?;
    Ok(format!("{}.{}", reversed, domain))
}
