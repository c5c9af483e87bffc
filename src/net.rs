//! Outbound address discovery for the startup hint log

use std::net::{IpAddr, UdpSocket};

use crate::error::Result;

/// Best-effort local outbound IP, discovered by connecting a UDP
/// socket to a public address. No packet is actually sent.
pub fn outbound_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}
