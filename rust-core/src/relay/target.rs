//! Shared UDP destination
//!
//! The address and port are stored together as one `SocketAddr` behind a
//! lock, so a reader never sees a new port paired with an old address.

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TargetError {
    #[error("UDP port {0} is outside 1-65535")]
    PortOutOfRange(i64),

    #[error("Failed to resolve address '{host}': {source}")]
    Unresolvable {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Address '{0}' did not resolve to any endpoint")]
    NoEndpoint(String),
}

/// Cloneable handle to the process-wide datagram destination
#[derive(Debug, Clone, Default)]
pub struct UdpTarget {
    addr: Arc<RwLock<Option<SocketAddr>>>,
}

impl UdpTarget {
    /// Unset target; datagrams are skipped until configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and apply a new destination
    ///
    /// On error the previous destination stays in effect.
    pub fn configure(&self, ip: &str, port: i64) -> Result<SocketAddr, TargetError> {
        let addr = resolve(ip, port)?;
        self.set(addr);
        Ok(addr)
    }

    pub fn set(&self, addr: SocketAddr) {
        if let Ok(mut guard) = self.addr.write() {
            *guard = Some(addr);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.addr.write() {
            *guard = None;
        }
    }

    /// Current destination, if any
    pub fn get(&self) -> Option<SocketAddr> {
        self.addr.read().ok().and_then(|guard| *guard)
    }

    pub fn is_configured(&self) -> bool {
        self.get().is_some()
    }
}

/// Resolve `ip` (literal or host name) with a validated port
pub fn resolve(ip: &str, port: i64) -> Result<SocketAddr, TargetError> {
    let port = u16::try_from(port)
        .ok()
        .filter(|&p| p != 0)
        .ok_or(TargetError::PortOutOfRange(port))?;

    let mut endpoints = (ip, port)
        .to_socket_addrs()
        .map_err(|source| TargetError::Unresolvable {
            host: ip.to_string(),
            source,
        })?;

    endpoints
        .next()
        .ok_or_else(|| TargetError::NoEndpoint(ip.to_string()))
}
