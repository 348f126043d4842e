//! Stateless frame inspection
//!
//! Single-pass policy check over the first bytes of a frame: no
//! reassembly, no connection tracking. Truncated packets fail closed
//! where a required field would be read out of bounds; traffic the
//! policy has no opinion on (non-IP EtherTypes, unknown protocols)
//! passes through.

use super::BoundedSet;
use crate::protocol::ethernet::Frame;
use crate::protocol::ipv4::{Ipv4Header, Protocol};
use crate::protocol::tcp::TcpHeader;
use crate::protocol::udp::UdpHeader;
use crate::protocol::EtherType;
use crate::Result;
use tracing::{debug, trace};

/// Capacity of the blocked destination-port list
pub const MAX_BLOCKED_PORTS: usize = 20;

/// Inspection verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward the frame
    Accept,
    /// Drop the frame silently
    Drop,
}

/// Protocol- and port-level packet inspector
#[derive(Debug, Clone)]
pub struct FrameInspector {
    block_icmp: bool,
    block_tcp: bool,
    block_udp: bool,
    blocked_ports: BoundedSet<u16, MAX_BLOCKED_PORTS>,
}

impl FrameInspector {
    pub fn new() -> Self {
        Self {
            block_icmp: false,
            block_tcp: false,
            block_udp: false,
            blocked_ports: BoundedSet::new("blocked port list"),
        }
    }

    /// Enable or disable blocking for one transport protocol.
    pub fn set_protocol_blocked(&mut self, protocol: Protocol, blocked: bool) {
        match protocol {
            Protocol::Icmp => self.block_icmp = blocked,
            Protocol::Tcp => self.block_tcp = blocked,
            Protocol::Udp => self.block_udp = blocked,
        }
    }

    pub fn is_protocol_blocked(&self, protocol: Protocol) -> bool {
        match protocol {
            Protocol::Icmp => self.block_icmp,
            Protocol::Tcp => self.block_tcp,
            Protocol::Udp => self.block_udp,
        }
    }

    /// Add a destination port to the blocked list.
    pub fn add_blocked_port(&mut self, port: u16) -> Result<()> {
        self.blocked_ports.insert(port)
    }

    pub fn is_port_blocked(&self, port: u16) -> bool {
        self.blocked_ports.contains(&port)
    }

    pub fn blocked_port_count(&self) -> usize {
        self.blocked_ports.len()
    }

    /// Decide whether a frame may be forwarded.
    ///
    /// Inspection never fails; it always yields a verdict.
    pub fn inspect(&self, frame_bytes: &[u8]) -> Verdict {
        let frame = match Frame::parse(frame_bytes) {
            Ok(f) => f,
            Err(_) => {
                trace!(len = frame_bytes.len(), "frame too short to inspect");
                return Verdict::Drop;
            }
        };

        // Non-IP traffic is outside this inspector's policy
        match EtherType::from_u16(frame.ethertype()) {
            Some(EtherType::Ipv4) => {}
            _ => return Verdict::Accept,
        }

        let ip = match Ipv4Header::parse(frame.payload()) {
            Ok(h) => h,
            Err(_) => {
                trace!("IPv4 header short or truncated");
                return Verdict::Drop;
            }
        };

        let protocol = match Protocol::from_u8(ip.protocol()) {
            Some(p) => p,
            // Unknown transport protocol: no policy, pass through
            None => return Verdict::Accept,
        };

        if self.is_protocol_blocked(protocol) {
            debug!(?protocol, "blocked protocol");
            return Verdict::Drop;
        }

        // The port check is skipped when the transport header's port
        // field is not fully present.
        let dst_port = match protocol {
            Protocol::Tcp => TcpHeader::parse(ip.payload()).ok().map(|h| h.dst_port()),
            Protocol::Udp => UdpHeader::parse(ip.payload()).ok().map(|h| h.dst_port()),
            Protocol::Icmp => None,
        };
        if let Some(port) = dst_port {
            if self.is_port_blocked(port) {
                debug!(port, "blocked destination port");
                return Verdict::Drop;
            }
        }

        Verdict::Accept
    }
}

impl Default for FrameInspector {
    fn default() -> Self {
        Self::new()
    }
}
