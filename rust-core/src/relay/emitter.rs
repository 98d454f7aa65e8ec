//! Dual-sink emitter: local event plus one UDP datagram per tick
//!
//! Both sinks are best effort. Nothing here reports failure to the caller
//! and nothing blocks the capture loop.

use super::events::{CaptureEvent, EventBus};
use super::target::UdpTarget;
use crate::spectrum::BandLevels;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

pub struct Emitter {
    events: EventBus,
    target: UdpTarget,
    socket_v4: Option<UdpSocket>,
    socket_v6: Option<UdpSocket>,
    sent: u64,
    dropped: u64,
}

impl Emitter {
    pub fn new(events: EventBus, target: UdpTarget) -> Self {
        Self {
            events,
            target,
            socket_v4: None,
            socket_v6: None,
            sent: 0,
            dropped: 0,
        }
    }

    /// Publish `levels` locally and send them to the configured target
    pub fn emit(&mut self, levels: BandLevels) {
        self.events.publish(&CaptureEvent::FftData(levels));

        let Some(addr) = self.target.get() else {
            return;
        };
        match self.send_datagram(&levels, addr) {
            Ok(()) => self.sent += 1,
            Err(e) => {
                self.dropped += 1;
                log::debug!("Dropped datagram to {}: {}", addr, e);
            }
        }
    }

    /// Datagrams handed to the OS
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Datagrams lost to bind or send errors
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn send_datagram(&mut self, levels: &BandLevels, addr: SocketAddr) -> io::Result<()> {
        let payload = levels.to_datagram();
        let socket = self.socket_for(addr)?;
        socket.send_to(&payload, addr)?;
        Ok(())
    }

    /// Lazily bind one non-blocking socket per address family
    fn socket_for(&mut self, addr: SocketAddr) -> io::Result<&UdpSocket> {
        let slot = if addr.is_ipv4() {
            &mut self.socket_v4
        } else {
            &mut self.socket_v6
        };

        let socket = match slot.take() {
            Some(socket) => socket,
            None => {
                let local: SocketAddr = if addr.is_ipv4() {
                    (Ipv4Addr::UNSPECIFIED, 0).into()
                } else {
                    (Ipv6Addr::UNSPECIFIED, 0).into()
                };
                let socket = UdpSocket::bind(local)?;
                socket.set_nonblocking(true)?;
                log::debug!("Bound emitter socket {:?}", socket.local_addr());
                socket
            }
        };
        let socket: &UdpSocket = slot.insert(socket);
        Ok(socket)
    }
}
