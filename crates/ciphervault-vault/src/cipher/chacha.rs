// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ChaCha20-Poly1305 backend: standard base64 of `nonce (12) | ciphertext | tag (16)`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use ciphervault_core::{Algorithm, CipherBackend, CipherVaultError, SecretKey};
use ring::aead::NONCE_LEN;

use crate::crypto::{self, TAG_LEN};

/// Backend for [`Algorithm::ChaCha20Poly1305`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ChaChaCipher;

impl CipherBackend for ChaChaCipher {
    fn algorithm(&self) -> Algorithm {
        Algorithm::ChaCha20Poly1305
    }

    fn encrypt(&self, key: &SecretKey, plaintext: &[u8]) -> Result<String, CipherVaultError> {
        let (ciphertext, nonce) = crypto::seal(Algorithm::ChaCha20Poly1305, key, &[], plaintext)?;
        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(out))
    }

    fn decrypt(&self, key: &SecretKey, ciphertext: &str) -> Result<Vec<u8>, CipherVaultError> {
        let raw = STANDARD.decode(ciphertext.trim()).map_err(|e| {
            CipherVaultError::InvalidCiphertext(format!("ciphertext is not base64: {e}"))
        })?;
        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherVaultError::InvalidCiphertext(
                "ciphertext is shorter than nonce and tag".to_string(),
            ));
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        nonce_bytes.copy_from_slice(nonce);

        let plaintext = crypto::open(Algorithm::ChaCha20Poly1305, key, &nonce_bytes, &[], sealed)?;
        Ok(plaintext.to_vec())
    }
}
