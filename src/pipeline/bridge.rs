//! Pipeline composition
//!
//! Strictly linear per frame: admission check, inspection check,
//! optional payload transform, then the frame goes back to the
//! transport collaborator. A rejected frame short-circuits the rest of
//! the pipeline and produces no output.

use std::sync::Arc;

use tracing::debug;

use super::cipher::PayloadCipher;
use super::inspector::{FrameInspector, Verdict};
use super::mac_filter::MacFilter;
use crate::protocol::ethernet::{Frame, HEADER_SIZE};
use crate::telemetry::PipelineStats;

/// Which interface a frame is traveling toward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Host to network: payload is encrypted when the cipher is active
    Outbound,
    /// Network to host: payload is decrypted when the cipher is active
    Inbound,
}

/// Why a frame was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Too short to hold an Ethernet envelope
    MalformedFrame,
    /// Source address denied by admission control
    SourceAddress,
    /// Destination address denied by admission control
    DestinationAddress,
    /// Rejected by protocol/port inspection
    Inspection,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DropReason::MalformedFrame => "malformed frame",
            DropReason::SourceAddress => "source address denied",
            DropReason::DestinationAddress => "destination address denied",
            DropReason::Inspection => "rejected by inspection",
        };
        f.write_str(text)
    }
}

/// Outcome of running one frame through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineAction {
    /// Hand these bytes to the transport for the opposite interface
    Forward { frame: Vec<u8> },
    /// Produce no output
    Drop { reason: DropReason },
}

/// The composed security pipeline for one bridge
pub struct SecurityPipeline {
    mac_filter: MacFilter,
    inspector: FrameInspector,
    cipher: PayloadCipher,
    stats: Arc<PipelineStats>,
}

impl SecurityPipeline {
    pub fn new() -> Self {
        Self {
            mac_filter: MacFilter::new(),
            inspector: FrameInspector::new(),
            cipher: PayloadCipher::new(),
            stats: Arc::new(PipelineStats::new()),
        }
    }

    pub fn mac_filter(&self) -> &MacFilter {
        &self.mac_filter
    }

    pub fn mac_filter_mut(&mut self) -> &mut MacFilter {
        &mut self.mac_filter
    }

    pub fn inspector(&self) -> &FrameInspector {
        &self.inspector
    }

    pub fn inspector_mut(&mut self) -> &mut FrameInspector {
        &mut self.inspector
    }

    pub fn cipher(&self) -> &PayloadCipher {
        &self.cipher
    }

    pub fn cipher_mut(&mut self) -> &mut PayloadCipher {
        &mut self.cipher
    }

    pub fn stats(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    /// Run one frame through admission, inspection and the optional
    /// transform.
    ///
    /// The source address is always checked; the destination only when
    /// unicast, since broadcast and multicast delivery is not subject
    /// to per-station admission. Stages after the first rejection never
    /// run.
    pub fn process(&self, frame_bytes: &[u8], direction: Direction) -> PipelineAction {
        let frame = match Frame::parse(frame_bytes) {
            Ok(f) => f,
            Err(_) => {
                self.stats.dropped_malformed.inc();
                debug!(len = frame_bytes.len(), "dropping malformed frame");
                return PipelineAction::Drop {
                    reason: DropReason::MalformedFrame,
                };
            }
        };

        let src = frame.src_mac();
        if !self.mac_filter.is_allowed(&src) {
            self.stats.dropped_address.inc();
            return PipelineAction::Drop {
                reason: DropReason::SourceAddress,
            };
        }

        let dst = frame.dst_mac();
        if dst.is_unicast() && !self.mac_filter.is_allowed(&dst) {
            self.stats.dropped_address.inc();
            return PipelineAction::Drop {
                reason: DropReason::DestinationAddress,
            };
        }

        if self.inspector.inspect(frame_bytes) == Verdict::Drop {
            self.stats.dropped_inspection.inc();
            return PipelineAction::Drop {
                reason: DropReason::Inspection,
            };
        }

        let mut out = frame_bytes.to_vec();
        if self.cipher.is_enabled() && self.cipher.has_key() {
            // The envelope stays cleartext so the peer bridge can still
            // switch the frame; only the payload is transformed.
            match direction {
                Direction::Outbound => {
                    let mut payload = out.split_off(HEADER_SIZE);
                    self.cipher.encrypt(&mut payload);
                    out.append(&mut payload);
                    self.stats.payloads_encrypted.inc();
                }
                Direction::Inbound => {
                    self.cipher.decrypt(&mut out[HEADER_SIZE..]);
                    self.stats.payloads_decrypted.inc();
                }
            }
        }

        self.stats.frames_forwarded.inc();
        PipelineAction::Forward { frame: out }
    }
}

impl Default for SecurityPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::cipher::KEY_SIZE;
    use crate::pipeline::FilterMode;
    use crate::protocol::ethernet::FrameBuilder;
    use crate::protocol::ipv4::Protocol;
    use crate::protocol::{EtherType, MacAddr};

    const DST: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    const SRC: MacAddr = MacAddr([0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);

    fn arp_frame() -> Vec<u8> {
        FrameBuilder::new()
            .dst_mac(DST)
            .src_mac(SRC)
            .ethertype(EtherType::Arp as u16)
            .payload(&[0u8; 28])
            .build()
    }

    fn udp_frame(dst_port: u16) -> Vec<u8> {
        let mut ip = vec![0u8; 20];
        ip[0] = 0x45;
        ip[2..4].copy_from_slice(&28u16.to_be_bytes());
        ip[8] = 64;
        ip[9] = 17;
        ip[12..16].copy_from_slice(&[10, 0, 0, 1]);
        ip[16..20].copy_from_slice(&[10, 0, 0, 2]);
        let mut udp = vec![0u8; 8];
        udp[0..2].copy_from_slice(&40000u16.to_be_bytes());
        udp[2..4].copy_from_slice(&dst_port.to_be_bytes());
        ip.extend_from_slice(&udp);

        FrameBuilder::new()
            .dst_mac(DST)
            .src_mac(SRC)
            .ethertype(EtherType::Ipv4 as u16)
            .payload(&ip)
            .build()
    }

    #[test]
    fn test_passes_untouched_by_default() {
        let pipeline = SecurityPipeline::new();
        let frame = arp_frame();

        match pipeline.process(&frame, Direction::Outbound) {
            PipelineAction::Forward { frame: out } => assert_eq!(out, frame),
            other => panic!("expected forward, got {other:?}"),
        }
        assert_eq!(pipeline.stats().frames_forwarded.get(), 1);
    }

    #[test]
    fn test_short_frame_dropped() {
        let pipeline = SecurityPipeline::new();
        let action = pipeline.process(&[0u8; 5], Direction::Inbound);
        assert_eq!(
            action,
            PipelineAction::Drop {
                reason: DropReason::MalformedFrame
            }
        );
        assert_eq!(pipeline.stats().dropped_malformed.get(), 1);
    }

    #[test]
    fn test_blocked_source_short_circuits() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.mac_filter_mut().add_blocked(SRC).unwrap();

        let action = pipeline.process(&arp_frame(), Direction::Outbound);
        assert_eq!(
            action,
            PipelineAction::Drop {
                reason: DropReason::SourceAddress
            }
        );
        assert_eq!(pipeline.stats().dropped_address.get(), 1);
        assert_eq!(pipeline.stats().frames_forwarded.get(), 0);
    }

    #[test]
    fn test_blocked_destination() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.mac_filter_mut().add_blocked(DST).unwrap();

        let action = pipeline.process(&arp_frame(), Direction::Outbound);
        assert_eq!(
            action,
            PipelineAction::Drop {
                reason: DropReason::DestinationAddress
            }
        );
    }

    #[test]
    fn test_broadcast_destination_skips_admission() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.mac_filter_mut().set_mode(FilterMode::Whitelist);
        pipeline.mac_filter_mut().add_allowed(SRC).unwrap();

        let frame = FrameBuilder::new()
            .dst_mac(MacAddr::BROADCAST)
            .src_mac(SRC)
            .ethertype(EtherType::Arp as u16)
            .payload(&[0u8; 28])
            .build();

        // Broadcast dst is not in the whitelist but must still pass
        assert!(matches!(
            pipeline.process(&frame, Direction::Outbound),
            PipelineAction::Forward { .. }
        ));
    }

    #[test]
    fn test_inspection_drop() {
        let mut pipeline = SecurityPipeline::new();
        pipeline
            .inspector_mut()
            .set_protocol_blocked(Protocol::Udp, true);

        let action = pipeline.process(&udp_frame(53), Direction::Inbound);
        assert_eq!(
            action,
            PipelineAction::Drop {
                reason: DropReason::Inspection
            }
        );
        assert_eq!(pipeline.stats().dropped_inspection.get(), 1);
    }

    #[test]
    fn test_outbound_encrypts_payload_only() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.cipher_mut().set_key(&[0x42; KEY_SIZE]).unwrap();

        let frame = udp_frame(53);
        let out = match pipeline.process(&frame, Direction::Outbound) {
            PipelineAction::Forward { frame } => frame,
            other => panic!("expected forward, got {other:?}"),
        };

        // Envelope untouched, payload transformed and padded
        assert_eq!(&out[..HEADER_SIZE], &frame[..HEADER_SIZE]);
        assert_ne!(&out[HEADER_SIZE..], &frame[HEADER_SIZE..]);
        assert_eq!((out.len() - HEADER_SIZE) % 16, 0);
        assert_eq!(pipeline.stats().payloads_encrypted.get(), 1);
    }

    #[test]
    fn test_outbound_then_inbound_roundtrip() {
        let key = [0x42u8; KEY_SIZE];

        let mut sender = SecurityPipeline::new();
        sender.cipher_mut().set_key(&key).unwrap();
        let mut receiver = SecurityPipeline::new();
        receiver.cipher_mut().set_key(&key).unwrap();

        // 32-byte payload: already block-aligned, no padding growth
        let payload = [0xC3u8; 32];
        let frame = FrameBuilder::new()
            .dst_mac(DST)
            .src_mac(SRC)
            .ethertype(0x88B5)
            .payload(&payload)
            .build();

        let sealed = match sender.process(&frame, Direction::Outbound) {
            PipelineAction::Forward { frame } => frame,
            other => panic!("expected forward, got {other:?}"),
        };
        let opened = match receiver.process(&sealed, Direction::Inbound) {
            PipelineAction::Forward { frame } => frame,
            other => panic!("expected forward, got {other:?}"),
        };

        assert_eq!(opened, frame);
        assert_eq!(receiver.stats().payloads_decrypted.get(), 1);
    }

    #[test]
    fn test_dropped_frame_not_transformed() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.cipher_mut().set_key(&[0x42; KEY_SIZE]).unwrap();
        pipeline
            .inspector_mut()
            .set_protocol_blocked(Protocol::Udp, true);

        let action = pipeline.process(&udp_frame(53), Direction::Outbound);
        assert!(matches!(action, PipelineAction::Drop { .. }));
        assert_eq!(pipeline.stats().payloads_encrypted.get(), 0);
    }

    #[test]
    fn test_disabled_cipher_forwards_verbatim() {
        let mut pipeline = SecurityPipeline::new();
        pipeline.cipher_mut().set_key(&[0x42; KEY_SIZE]).unwrap();
        pipeline.cipher_mut().set_enabled(false);

        let frame = udp_frame(53);
        match pipeline.process(&frame, Direction::Outbound) {
            PipelineAction::Forward { frame: out } => assert_eq!(out, frame),
            other => panic!("expected forward, got {other:?}"),
        }
    }
}
