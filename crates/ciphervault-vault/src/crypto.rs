// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AEAD seal/open operations and CSPRNG helpers.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for both GCM and Poly1305.

use ciphervault_core::{Algorithm, CipherVaultError, KEY_LEN, SecretKey};
use ring::aead::{self, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

/// Length of the authentication tag appended by both supported AEADs.
pub const TAG_LEN: usize = 16;

fn ring_algorithm(algorithm: Algorithm) -> &'static aead::Algorithm {
    match algorithm {
        Algorithm::Aes256Gcm => &aead::AES_256_GCM,
        Algorithm::ChaCha20Poly1305 => &aead::CHACHA20_POLY1305,
    }
}

fn less_safe_key(algorithm: Algorithm, key: &SecretKey) -> Result<LessSafeKey, CipherVaultError> {
    let unbound = UnboundKey::new(ring_algorithm(algorithm), key.expose())
        .map_err(|_| CipherVaultError::Crypto(format!("failed to create {algorithm} key")))?;
    Ok(LessSafeKey::new(unbound))
}

/// Fill `buf` from the system CSPRNG.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CipherVaultError> {
    SystemRandom::new()
        .fill(buf)
        .map_err(|_| CipherVaultError::Crypto("system random source unavailable".to_string()))
}

/// Generate a random 32-byte symmetric key.
pub fn generate_random_key() -> Result<SecretKey, CipherVaultError> {
    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    fill_random(bytes.as_mut())?;
    Ok(SecretKey::from_bytes(&bytes))
}

/// Encrypt with a random nonce, authenticating `aad` alongside the plaintext.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(
    algorithm: Algorithm,
    key: &SecretKey,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; NONCE_LEN]), CipherVaultError> {
    let key = less_safe_key(algorithm, key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    fill_random(&mut nonce_bytes)?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| CipherVaultError::Crypto(format!("{algorithm} encryption failed")))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and verify. Any tag mismatch is reported as
/// [`CipherVaultError::AuthenticationFailure`].
pub fn open(
    algorithm: Algorithm,
    key: &SecretKey,
    nonce_bytes: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CipherVaultError> {
    let key = less_safe_key(algorithm, key)?;
    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let len = key
        .open_in_place(nonce, Aad::from(aad), &mut in_out)
        .map_err(|_| CipherVaultError::AuthenticationFailure { algorithm })?
        .len();
    in_out.truncate(len);
    Ok(in_out)
}
