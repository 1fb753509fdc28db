// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Algorithm-agnostic cipher dispatch.
//!
//! The keystore names its active algorithm by string identifier. The
//! dispatcher resolves that identifier against the configured backends and
//! refuses anything it does not know, rather than falling back to a default.
//!
//! Ciphertexts produced here are tagged with the producing algorithm
//! (`<algorithm>:<body>`), so they stay decryptable after a rotation.
//! Untagged input is decrypted with the keystore's current algorithm.

pub mod chacha;
pub mod token;

use std::fmt;
use std::str::FromStr;

use ciphervault_core::{Algorithm, CipherBackend, CipherVaultError, SecretKey};

pub use chacha::ChaChaCipher;
pub use token::TokenCipher;

/// Separates the algorithm tag from the ciphertext body. Neither base64
/// alphabet contains it.
const TAG_SEPARATOR: char = ':';

/// A ciphertext artifact, optionally tagged with the algorithm that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext {
    pub algorithm: Option<Algorithm>,
    pub body: String,
}

impl Ciphertext {
    pub fn tagged(algorithm: Algorithm, body: String) -> Self {
        Self {
            algorithm: Some(algorithm),
            body,
        }
    }

    pub fn untagged(body: impl Into<String>) -> Self {
        Self {
            algorithm: None,
            body: body.into(),
        }
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.algorithm {
            Some(algorithm) => write!(f, "{algorithm}{TAG_SEPARATOR}{}", self.body),
            None => f.write_str(&self.body),
        }
    }
}

impl FromStr for Ciphertext {
    type Err = CipherVaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CipherVaultError::InvalidCiphertext(
                "ciphertext is empty".to_string(),
            ));
        }
        match s.split_once(TAG_SEPARATOR) {
            Some((tag, body)) => Ok(Self::tagged(Algorithm::parse(tag)?, body.to_string())),
            None => Ok(Self::untagged(s)),
        }
    }
}

fn backend_for(algorithm: Algorithm) -> Box<dyn CipherBackend> {
    match algorithm {
        Algorithm::Aes256Gcm => Box::new(TokenCipher),
        Algorithm::ChaCha20Poly1305 => Box::new(ChaChaCipher),
    }
}

/// Routes encrypt/decrypt calls to the backend for an algorithm identifier.
pub struct CipherDispatcher {
    backends: Vec<Box<dyn CipherBackend>>,
}

impl fmt::Debug for CipherDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherDispatcher")
            .field("supported", &self.supported())
            .finish()
    }
}

impl CipherDispatcher {
    /// Dispatcher over the built-in backends for `algorithms`, in that order.
    pub fn new(algorithms: &[Algorithm]) -> Self {
        Self::with_backends(algorithms.iter().copied().map(backend_for).collect())
    }

    /// Dispatcher over caller-supplied backends.
    pub fn with_backends(backends: Vec<Box<dyn CipherBackend>>) -> Self {
        Self { backends }
    }

    /// Supported algorithms in configuration order.
    pub fn supported(&self) -> Vec<Algorithm> {
        self.backends.iter().map(|b| b.algorithm()).collect()
    }

    /// Resolve an identifier to a configured algorithm.
    pub fn resolve(&self, id: &str) -> Result<Algorithm, CipherVaultError> {
        let algorithm = Algorithm::parse(id)?;
        self.backend(algorithm)?;
        Ok(algorithm)
    }

    pub fn backend(&self, algorithm: Algorithm) -> Result<&dyn CipherBackend, CipherVaultError> {
        self.backends
            .iter()
            .find(|b| b.algorithm() == algorithm)
            .map(|b| b.as_ref())
            .ok_or_else(|| CipherVaultError::UnknownAlgorithm(algorithm.to_string()))
    }

    /// Encrypt UTF-8 text under the algorithm named `algorithm_id`.
    pub fn encrypt(
        &self,
        algorithm_id: &str,
        key: &SecretKey,
        plaintext: &str,
    ) -> Result<Ciphertext, CipherVaultError> {
        let algorithm = self.resolve(algorithm_id)?;
        let body = self.backend(algorithm)?.encrypt(key, plaintext.as_bytes())?;
        Ok(Ciphertext::tagged(algorithm, body))
    }

    /// The algorithm `decrypt` would use: the recorded tag, else `current_id`.
    pub fn algorithm_for(
        &self,
        current_id: &str,
        ciphertext: &Ciphertext,
    ) -> Result<Algorithm, CipherVaultError> {
        match ciphertext.algorithm {
            Some(algorithm) => Ok(algorithm),
            None => self.resolve(current_id),
        }
    }

    /// Decrypt a ciphertext, preferring its recorded algorithm over `current_id`.
    pub fn decrypt(
        &self,
        current_id: &str,
        key: &SecretKey,
        ciphertext: &Ciphertext,
    ) -> Result<String, CipherVaultError> {
        let algorithm = self.algorithm_for(current_id, ciphertext)?;
        let plaintext = self.backend(algorithm)?.decrypt(key, &ciphertext.body)?;
        String::from_utf8(plaintext).map_err(|_| {
            CipherVaultError::InvalidCiphertext("decrypted text is not valid UTF-8".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::generate_random_key;
    use proptest::prelude::*;

    fn dispatcher() -> CipherDispatcher {
        CipherDispatcher::new(&[Algorithm::Aes256Gcm, Algorithm::ChaCha20Poly1305])
    }

    #[test]
    fn roundtrip_empty_and_multibyte_text() {
        let d = dispatcher();
        let key = generate_random_key().unwrap();
        for algorithm in d.supported() {
            for text in ["", "hello world", "héllo wörld ✓ 秘密 🔐"] {
                let ct = d.encrypt(&algorithm.to_string(), &key, text).unwrap();
                assert_eq!(ct.algorithm, Some(algorithm));
                assert_eq!(d.decrypt("unused", &key, &ct).unwrap(), text);
            }
        }
    }

    #[test]
    fn wrong_key_is_authentication_failure() {
        let d = dispatcher();
        let key = generate_random_key().unwrap();
        let other = generate_random_key().unwrap();
        for algorithm in d.supported() {
            let ct = d.encrypt(&algorithm.to_string(), &key, "secret").unwrap();
            let err = d.decrypt("unused", &other, &ct).unwrap_err();
            assert!(matches!(err, CipherVaultError::AuthenticationFailure { .. }));
        }
    }

    #[test]
    fn unknown_identifier_is_reported() {
        let d = dispatcher();
        let key = generate_random_key().unwrap();
        let err = d.encrypt("fernet", &key, "x").unwrap_err();
        assert!(matches!(err, CipherVaultError::UnknownAlgorithm(ref id) if id == "fernet"));
    }

    #[test]
    fn unconfigured_algorithm_is_reported() {
        let d = CipherDispatcher::new(&[Algorithm::Aes256Gcm]);
        let key = generate_random_key().unwrap();
        let err = d.encrypt("chacha20-poly1305", &key, "x").unwrap_err();
        assert!(matches!(err, CipherVaultError::UnknownAlgorithm(_)));
    }

    #[test]
    fn tag_wins_over_current_algorithm() {
        let d = dispatcher();
        let key = generate_random_key().unwrap();
        let ct = d.encrypt("aes256-gcm", &key, "hello world").unwrap();

        // Tagged: decrypts even though the keystore has moved on.
        assert_eq!(
            d.decrypt("chacha20-poly1305", &key, &ct).unwrap(),
            "hello world"
        );

        // Untagged: falls back to the current algorithm and fails closed.
        let bare = Ciphertext::untagged(ct.body.clone());
        assert!(d.decrypt("chacha20-poly1305", &key, &bare).is_err());
        assert_eq!(d.decrypt("aes256-gcm", &key, &bare).unwrap(), "hello world");
    }

    #[test]
    fn ciphertext_text_form() {
        let ct = Ciphertext::tagged(Algorithm::ChaCha20Poly1305, "QUJD".to_string());
        assert_eq!(ct.to_string(), "chacha20-poly1305:QUJD");
        assert_eq!("chacha20-poly1305:QUJD\n".parse::<Ciphertext>().unwrap(), ct);
        assert_eq!(
            "QUJD".parse::<Ciphertext>().unwrap(),
            Ciphertext::untagged("QUJD")
        );
        assert!(matches!(
            "rot13:QUJD".parse::<Ciphertext>(),
            Err(CipherVaultError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            "   ".parse::<Ciphertext>(),
            Err(CipherVaultError::InvalidCiphertext(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn any_text_roundtrips(text in ".*", use_chacha in any::<bool>()) {
            let d = dispatcher();
            let key = generate_random_key().unwrap();
            let id = if use_chacha { "chacha20-poly1305" } else { "aes256-gcm" };
            let ct = d.encrypt(id, &key, &text).unwrap();
            let reparsed: Ciphertext = ct.to_string().parse().unwrap();
            prop_assert_eq!(d.decrypt(id, &key, &reparsed).unwrap(), text);
        }
    }
}
