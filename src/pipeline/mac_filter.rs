//! MAC-address admission control
//!
//! Maintains bounded allow/block lists of hardware addresses and a
//! whitelist/blacklist mode. Consulted for every frame; mutated only
//! from the configuration surface.

use super::BoundedSet;
use crate::protocol::MacAddr;
use crate::Result;
use tracing::debug;

/// Capacity of the allowed-address list
pub const MAX_ALLOWED_ADDRS: usize = 10;
/// Capacity of the blocked-address list
pub const MAX_BLOCKED_ADDRS: usize = 10;

/// Admission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Default-allow; only listed addresses are blocked
    #[default]
    Blacklist,
    /// Default-deny; only listed addresses are admitted
    Whitelist,
}

/// Address filter with bounded allow/block lists
#[derive(Debug, Clone)]
pub struct MacFilter {
    allowed: BoundedSet<MacAddr, MAX_ALLOWED_ADDRS>,
    blocked: BoundedSet<MacAddr, MAX_BLOCKED_ADDRS>,
    mode: FilterMode,
}

impl MacFilter {
    pub fn new() -> Self {
        Self {
            allowed: BoundedSet::new("allowed address list"),
            blocked: BoundedSet::new("blocked address list"),
            mode: FilterMode::Blacklist,
        }
    }

    /// Add an address to the allowed list.
    pub fn add_allowed(&mut self, addr: MacAddr) -> Result<()> {
        self.allowed.insert(addr)
    }

    /// Add an address to the blocked list.
    pub fn add_blocked(&mut self, addr: MacAddr) -> Result<()> {
        self.blocked.insert(addr)
    }

    /// Switch admission mode. Takes effect on the next check.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn allowed_count(&self) -> usize {
        self.allowed.len()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// Admission decision for a single address.
    ///
    /// The blocked list is checked first and wins unconditionally, so a
    /// misconfigured overlap between the two lists can never admit a
    /// blocked address. In whitelist mode anything unlisted is denied;
    /// in blacklist mode anything unblocked is admitted.
    pub fn is_allowed(&self, addr: &MacAddr) -> bool {
        if self.blocked.contains(addr) {
            debug!(%addr, "address is in the blocked list");
            return false;
        }

        match self.mode {
            FilterMode::Whitelist => {
                if self.allowed.contains(addr) {
                    true
                } else {
                    debug!(%addr, "address is not in the whitelist");
                    false
                }
            }
            FilterMode::Blacklist => true,
        }
    }
}

impl Default for MacFilter {
    fn default() -> Self {
        Self::new()
    }
}
