//! Encrypted, compressed encoding of the archive tier.
//!
//! Blob format: `ivHex:cipherHex`, where the IV is 16 random bytes (32 hex
//! chars) and the ciphertext is AES-256-CBC/PKCS#7 over gzip'd JSON. The key
//! is the SHA-256 digest of the secret.

use std::io::{Read, Write};

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::config::Secret;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// IV length in bytes.
pub const IV_LEN: usize = 16;

const KEY_LEN: usize = 32;

/// Errors that can occur while encoding or decoding a blob.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Malformed blob: {0}")]
    Framing(String),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("Cipher initialization failed: {0}")]
    Cipher(String),

    /// Bad padding after decryption: wrong key or corrupt ciphertext.
    #[error("Decryption failed")]
    Decryption,
}

/// Symmetric codec keyed by a single secret.
#[derive(Clone)]
pub struct SnapshotCodec {
    key: [u8; KEY_LEN],
}

impl SnapshotCodec {
    pub fn new(secret: &Secret) -> Self {
        Self {
            key: Sha256::digest(secret.expose().as_bytes()).into(),
        }
    }

    /// Serialize, compress and encrypt `value` under a fresh IV.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CodecError> {
        let json = serde_json::to_vec(value)?;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        let compressed = encoder.finish()?;

        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| CodecError::Cipher(e.to_string()))?
            .encrypt_padded_vec_mut::<Pkcs7>(&compressed);

        Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
    }

    /// Decode a blob, or `None` if it is malformed, corrupt, or was written
    /// under a different secret.
    pub fn decode<T: DeserializeOwned>(&self, blob: &str) -> Option<T> {
        match self.try_decode(blob) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "Failed to decode blob");
                None
            }
        }
    }

    /// Like [`decode`](Self::decode) but reports why decoding failed.
    pub fn try_decode<T: DeserializeOwned>(&self, blob: &str) -> Result<T, CodecError> {
        let (iv_hex, cipher_hex) = blob
            .trim()
            .split_once(':')
            .ok_or_else(|| CodecError::Framing("missing ':' separator".to_string()))?;

        let iv = hex::decode(iv_hex)?;
        if iv.len() != IV_LEN {
            return Err(CodecError::Framing(format!(
                "IV must be {} bytes, got {}",
                IV_LEN,
                iv.len()
            )));
        }
        let ciphertext = hex::decode(cipher_hex)?;

        let compressed = Aes256CbcDec::new_from_slices(&self.key, &iv)
            .map_err(|e| CodecError::Cipher(e.to_string()))?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CodecError::Decryption)?;

        let mut json = Vec::new();
        GzDecoder::new(compressed.as_slice()).read_to_end(&mut json)?;

        Ok(serde_json::from_slice(&json)?)
    }
}
