//! Common protocol types

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Hardware (MAC) address, 6 bytes. Equality is exact byte-for-byte match.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Group bit (LSB of the first octet)
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_unicast(&self) -> bool {
        !self.is_multicast()
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    /// Accepts "aa:bb:cc:dd:ee:ff", "aa-bb-cc-dd-ee-ff" and "aabbccddeeff".
    fn from_str(s: &str) -> Result<Self> {
        let hex: String = if s.contains(':') || s.contains('-') {
            let parts: Vec<&str> = s.split([':', '-']).collect();
            if parts.len() != 6 || parts.iter().any(|p| p.len() != 2) {
                return Err(Error::Parse(format!("invalid MAC address: {s}")));
            }
            parts.concat()
        } else {
            s.to_string()
        };

        if hex.len() != 12 {
            return Err(Error::Parse(format!("invalid MAC address length: {s}")));
        }

        let mut bytes = [0u8; 6];
        for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
            let digits = std::str::from_utf8(chunk)
                .map_err(|_| Error::Parse(format!("invalid MAC address: {s}")))?;
            bytes[i] = u8::from_str_radix(digits, 16)
                .map_err(|_| Error::Parse(format!("invalid hex in MAC address: {s}")))?;
        }
        Ok(MacAddr(bytes))
    }
}

/// EtherType values the pipeline cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum EtherType {
    Ipv4 = 0x0800,
    Arp = 0x0806,
    Ipv6 = 0x86DD,
}

impl EtherType {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0x0800 => Some(EtherType::Ipv4),
            0x0806 => Some(EtherType::Arp),
            0x86DD => Some(EtherType::Ipv6),
            _ => None,
        }
    }
}
