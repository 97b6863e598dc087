//! Payload obfuscation.
//!
//! Request bodies (and the sync-time blob in the partner login response)
//! are Blowfish-ECB encrypted and hex-encoded on the wire. The cipher is
//! consumed behind the [`BodyCipher`] trait so the session and pipeline
//! never depend on the algorithm; tests swap in an identity cipher.

use blowfish::Blowfish;
use blowfish::cipher::generic_array::GenericArray;
use blowfish::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::{Error, Result};

const BLOCK_SIZE: usize = 8;

/// Symmetric cipher contract for wire payloads.
///
/// Deterministic, no side effects; keys come from the active
/// [`DeviceProfile`](crate::DeviceProfile).
pub trait BodyCipher: Send + Sync {
    /// Encrypt plaintext bytes into their wire representation.
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt wire bytes back into plaintext.
    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>>;
}

/// Blowfish-ECB with zero padding, hex-encoded ciphertext.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlowfishCipher;

impl BlowfishCipher {
    fn state(key: &[u8]) -> Result<Blowfish> {
        Blowfish::new_from_slice(key).map_err(|_| Error::Cipher("invalid key length".to_string()))
    }
}

impl BodyCipher for BlowfishCipher {
    fn encrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let bf = Self::state(key)?;

        let mut out = Vec::with_capacity(data.len().next_multiple_of(BLOCK_SIZE));
        for chunk in data.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block[..chunk.len()].copy_from_slice(chunk);
            let block = GenericArray::from_mut_slice(&mut block);
            bf.encrypt_block(block);
            out.extend_from_slice(block);
        }

        Ok(hex::encode(out).into_bytes())
    }

    fn decrypt(&self, data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
        let bf = Self::state(key)?;

        let raw = hex::decode(data).map_err(|e| Error::Cipher(format!("bad hex: {e}")))?;
        if raw.len() % BLOCK_SIZE != 0 {
            return Err(Error::Cipher("ciphertext not block-aligned".to_string()));
        }

        let mut out = Vec::with_capacity(raw.len());
        for chunk in raw.chunks_exact(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);
            let block = GenericArray::from_mut_slice(&mut block);
            bf.decrypt_block(block);
            out.extend_from_slice(block);
        }

        // Strip the zero padding from the final block.
        while out.last() == Some(&0) {
            out.pop();
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"6#26FRL$ZWD";

    #[test]
    fn round_trip_restores_plaintext() {
        let cipher = BlowfishCipher;
        let plain = br#"{"username":"listener","password":"secret"}"#;
        let wire = cipher.encrypt(plain, KEY).unwrap();
        assert_ne!(wire.as_slice(), plain.as_slice());
        let back = cipher.decrypt(&wire, KEY).unwrap();
        assert_eq!(back, plain);
    }

    #[test]
    fn ciphertext_is_hex_ascii() {
        let cipher = BlowfishCipher;
        let wire = cipher.encrypt(b"hello", KEY).unwrap();
        assert!(wire.iter().all(|b| b.is_ascii_hexdigit()));
        // One padded 8-byte block, hex doubles it.
        assert_eq!(wire.len(), 16);
    }

    #[test]
    fn encryption_is_deterministic() {
        let cipher = BlowfishCipher;
        let a = cipher.encrypt(b"same input", KEY).unwrap();
        let b = cipher.encrypt(b"same input", KEY).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let cipher = BlowfishCipher;
        assert!(cipher.decrypt(b"not hex at all!!", KEY).is_err());
    }
}
