// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Self-contained AES-256-GCM tokens.
//!
//! Layout before url-safe base64 encoding:
//!
//! ```text
//! version (1) | issued-at unix seconds, big endian (8) | nonce (12) | ciphertext | tag (16)
//! ```
//!
//! The version byte and timestamp are bound to the ciphertext as associated
//! data, so altering any byte of the token fails authentication.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use ciphervault_core::{Algorithm, CipherBackend, CipherVaultError, SecretKey};
use ring::aead::NONCE_LEN;

use crate::crypto::{self, TAG_LEN};

/// Leading byte of every token.
pub const TOKEN_VERSION: u8 = 0x81;

const HEADER_LEN: usize = 1 + 8;

/// Backend for [`Algorithm::Aes256Gcm`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenCipher;

impl TokenCipher {
    fn header(issued_at: u64) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[0] = TOKEN_VERSION;
        header[1..].copy_from_slice(&issued_at.to_be_bytes());
        header
    }

    /// Unix time (seconds) recorded inside a token, without verifying it.
    #[cfg(test)]
    fn issued_at(token: &str) -> Result<u64, CipherVaultError> {
        let raw = decode(token)?;
        let mut ts = [0u8; 8];
        ts.copy_from_slice(&raw[1..HEADER_LEN]);
        Ok(u64::from_be_bytes(ts))
    }
}

fn decode(token: &str) -> Result<Vec<u8>, CipherVaultError> {
    let raw = URL_SAFE
        .decode(token.trim())
        .map_err(|e| CipherVaultError::InvalidCiphertext(format!("token is not base64: {e}")))?;
    if raw.len() < HEADER_LEN + NONCE_LEN + TAG_LEN {
        return Err(CipherVaultError::InvalidCiphertext(
            "token is too short".to_string(),
        ));
    }
    if raw[0] != TOKEN_VERSION {
        return Err(CipherVaultError::InvalidCiphertext(format!(
            "unknown token version 0x{:02x}",
            raw[0]
        )));
    }
    Ok(raw)
}

impl CipherBackend for TokenCipher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Aes256Gcm
    }

    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<String, CipherVaultError> {
        let issued_at = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default();
        let header = Self::header(issued_at);
        let (ciphertext, nonce) = crypto::seal(Algorithm::Aes256Gcm, key, &header, plaintext)?;

        let mut token = Vec::with_capacity(HEADER_LEN + NONCE_LEN + ciphertext.len());
        token.extend_from_slice(&header);
        token.extend_from_slice(&nonce);
        token.extend_from_slice(&ciphertext);
        Ok(URL_SAFE.encode(token))
    }

    fn decrypt(&self, key: &SecretKey, ciphertext: &str) -> Result<Vec<u8>, CipherVaultError> {
        let raw = decode(ciphertext)?;
        let (header, rest) = raw.split_at(HEADER_LEN);
        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);

        let plaintext = crypto::open(Algorithm::Aes256Gcm, key, &nonce_bytes, header, sealed)?;
        Ok(plaintext.to_vec())
    }
}
