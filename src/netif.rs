//! Local interface discovery for the host advertised to phones.

use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

/// Interface name and one of its addresses.
pub type InterfaceAddr = (String, IpAddr);

/// Addresses of every local interface. Empty when enumeration fails.
#[must_use]
pub fn discover() -> Vec<InterfaceAddr> {
    match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(err) => {
            debug!("Failed to list network interfaces: {err}");
            Vec::new()
        }
    }
}

/// First LAN address: IPv4, not loopback, not link-local, not a docker bridge
/// and not on the tailnet.
#[must_use]
pub fn lan_address(interfaces: &[InterfaceAddr]) -> Option<Ipv4Addr> {
    interfaces.iter().find_map(|(name, addr)| match addr {
        IpAddr::V4(ip)
            if !ip.is_loopback()
                && !ip.is_link_local()
                && !ip.is_unspecified()
                && !is_tailnet(*ip)
                && !name.to_lowercase().contains("docker") =>
        {
            Some(*ip)
        }
        _ => None,
    })
}

/// First address inside the Tailscale CGNAT range `100.64.0.0/10`.
#[must_use]
pub fn tailnet_address(interfaces: &[InterfaceAddr]) -> Option<Ipv4Addr> {
    interfaces.iter().find_map(|(_, addr)| match addr {
        IpAddr::V4(ip) if is_tailnet(*ip) => Some(*ip),
        _ => None,
    })
}

#[must_use]
pub const fn is_tailnet(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    a == 100 && (b & 0xc0) == 64
}
