use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

use crate::utils::error::{ExtError, Result};

/// Formats four octets, first octet first, as a dotted quad.
pub fn ntoa(octets: [u8; 4]) -> String {
    Ipv4Addr::from(octets).to_string()
}

/// Formats an address held the way it sits in a little-endian `in_addr`:
/// the low byte is the first octet.
pub fn ntoa_u32(ip: u32) -> String {
    ntoa(ip.to_le_bytes())
}

/// Resolves `host` to an IPv4 address. Dotted quads are parsed directly;
/// anything else goes through the system resolver and the first IPv4
/// result is used.
pub fn aton(host: &str) -> Result<Ipv4Addr> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }

    let lookup_failed = || ExtError::HostLookup {
        host: host.to_string(),
    };
    let addrs = (host, 0).to_socket_addrs().map_err(|e| {
        tracing::debug!("lookup of {} failed: {}", host, e);
        lookup_failed()
    })?;

    addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(lookup_failed)
}

/// Same as [`aton`], returning the address in `ntoa_u32` layout.
pub fn aton_u32(host: &str) -> Result<u32> {
    aton(host).map(|ip| u32::from_le_bytes(ip.octets()))
}
