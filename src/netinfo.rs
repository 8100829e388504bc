use crate::error::NetInfoError;
use crate::runner::Runner;
use ipnet::IpNet;
use serde::Deserialize;
use std::net::Ipv4Addr;

const LOOPBACK: &str = "lo";

/// One interface as printed by `ip -json addr`.
#[derive(Debug, Deserialize)]
pub struct Interface {
    pub ifname: String,
    #[serde(default)]
    pub addr_info: Vec<AddrInfo>,
}

#[derive(Debug, Deserialize)]
pub struct AddrInfo {
    pub family: String,
    pub local: String,
    pub prefixlen: u8,
}

/// Returns the network containing the first IPv4 address on a non-loopback interface.
/// Parameters: `runner` (&impl Runner) command runner used for `ip`.
/// Returns: Result<IpNet> network with host bits cleared, or a NetInfoError.
pub fn detect_local_subnet(runner: &impl Runner) -> Result<IpNet, NetInfoError> {
    // `ip -json` keeps interface order, so "first" is the kernel's order.
    let out = runner
        .run_capture("ip", &["-json", "addr"])
        .map_err(NetInfoError::Command)?;
    let interfaces: Vec<Interface> = serde_json::from_str(&out)?;
    first_ipv4_network(&interfaces)
}

pub fn first_ipv4_network(interfaces: &[Interface]) -> Result<IpNet, NetInfoError> {
    // Interfaces without an `inet` entry (tunnels, v6-only) are passed over.
    for iface in interfaces.iter().filter(|i| i.ifname != LOOPBACK) {
        let Some(addr) = iface.addr_info.iter().find(|a| a.family == "inet") else {
            continue;
        };

        let invalid = || NetInfoError::InvalidAddress {
            iface: iface.ifname.clone(),
            address: addr.local.clone(),
            prefix_len: addr.prefixlen,
        };
        let ip: Ipv4Addr = addr.local.parse().map_err(|_| invalid())?;
        let net = IpNet::new(ip.into(), addr.prefixlen).map_err(|_| invalid())?;
        tracing::debug!(iface = %iface.ifname, %net, "found IPv4 network");
        return Ok(net.trunc());
    }

    Err(NetInfoError::NoIpv4Address)
}
