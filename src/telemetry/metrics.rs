//! Frame-processing statistics
//!
//! Thread-safe counters for the pipeline stages. The pipeline itself is
//! single-threaded; atomics let a management thread read statistics
//! without coordinating with the frame path.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-pipeline statistics
#[derive(Debug, Default)]
pub struct PipelineStats {
    /// Frames that passed every stage and were handed to the transport.
    pub frames_forwarded: Counter,
    /// Frames too short or unparseable at the envelope.
    pub dropped_malformed: Counter,
    /// Frames denied by address admission (source or destination).
    pub dropped_address: Counter,
    /// Frames denied by protocol/port inspection.
    pub dropped_inspection: Counter,
    /// Payloads transformed on the outbound path.
    pub payloads_encrypted: Counter,
    /// Payloads transformed on the inbound path.
    pub payloads_decrypted: Counter,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total frames dropped across all stages.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_malformed.get() + self.dropped_address.get() + self.dropped_inspection.get()
    }
}
