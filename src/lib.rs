//! secbridge - Dual-Interface Bridge Security Pipeline
//!
//! Per-frame admission control, stateless packet inspection, and an
//! optional block-cipher transform for Ethernet frames crossing a
//! two-interface bridge. Frame transport is owned by the caller.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod protocol;
pub mod telemetry;

pub use error::{Error, Result};
