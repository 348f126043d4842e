//! Per-frame security pipeline
//!
//! Three decision stages applied to every frame crossing the bridge:
//! MAC-address admission, protocol/port inspection, and an optional
//! block-cipher payload transform.

mod bounded;
mod bridge;
mod cipher;
mod inspector;
mod mac_filter;

pub use bounded::BoundedSet;
pub use bridge::{Direction, DropReason, PipelineAction, SecurityPipeline};
pub use cipher::{PayloadCipher, BLOCK_SIZE, KEY_SIZE};
pub use inspector::{FrameInspector, Verdict, MAX_BLOCKED_PORTS};
pub use mac_filter::{FilterMode, MacFilter, MAX_ALLOWED_ADDRS, MAX_BLOCKED_ADDRS};
