//! Payload cipher (the "VPN" layer)
//!
//! Raw AES-256 block transforms over an already-established static key.
//! Blocks are transformed independently with no chaining and no IV
//! (ECB). That provides confidentiality only against the weakest threat
//! model: identical plaintext blocks produce identical ciphertext
//! blocks, and nothing is authenticated. A production deployment must
//! replace this with an authenticated, IV-driven mode.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::Aes256;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Required key length in bytes (AES-256)
pub const KEY_SIZE: usize = 32;
/// Cipher block length in bytes
pub const BLOCK_SIZE: usize = 16;

/// Holds the active cipher schedule and an enabled flag.
///
/// When disabled (or before a key is set) both transforms are
/// pass-throughs, so the pipeline composes the same way regardless of
/// configuration. Round keys are zeroized when the schedule is dropped
/// or replaced.
pub struct PayloadCipher {
    cipher: Option<Aes256>,
    enabled: bool,
}

impl PayloadCipher {
    pub fn new() -> Self {
        Self {
            cipher: None,
            enabled: false,
        }
    }

    /// Install a 256-bit key, replacing any previous one, and enable
    /// the cipher.
    ///
    /// A wrong-sized key fails without touching existing state; a key
    /// the primitive rejects leaves the cipher disabled.
    pub fn set_key(&mut self, key: &[u8]) -> Result<()> {
        if key.len() != KEY_SIZE {
            return Err(Error::InvalidKeySize {
                expected: KEY_SIZE,
                actual: key.len(),
            });
        }

        match Aes256::new_from_slice(key) {
            Ok(cipher) => {
                self.cipher = Some(cipher);
                self.enabled = true;
                debug!("payload cipher key installed");
                Ok(())
            }
            Err(e) => {
                self.cipher = None;
                self.enabled = false;
                warn!("cipher schedule setup failed: {e}");
                Err(Error::CipherSetup(e.to_string()))
            }
        }
    }

    /// Toggle the transform without touching key material.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn has_key(&self) -> bool {
        self.cipher.is_some()
    }

    fn active(&self) -> Option<&Aes256> {
        if self.enabled {
            self.cipher.as_ref()
        } else {
            None
        }
    }

    /// Encrypt a buffer in place, zero-padding it to a block boundary
    /// first. Pass-through when disabled.
    pub fn encrypt(&self, buffer: &mut Vec<u8>) {
        let Some(cipher) = self.active() else {
            return;
        };

        let padded_len = buffer.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
        buffer.resize(padded_len, 0);

        for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
            cipher.encrypt_block(GenericArray::from_mut_slice(block));
        }
    }

    /// Decrypt every complete block of a buffer in place. A trailing
    /// partial block is left untouched. Pass-through when disabled.
    pub fn decrypt(&self, buffer: &mut [u8]) {
        let Some(cipher) = self.active() else {
            return;
        };

        for block in buffer.chunks_exact_mut(BLOCK_SIZE) {
            cipher.decrypt_block(GenericArray::from_mut_slice(block));
        }
    }
}

impl Default for PayloadCipher {
    fn default() -> Self {
        Self::new()
    }
}
