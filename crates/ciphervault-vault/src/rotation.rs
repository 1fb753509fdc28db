// SPDX-FileCopyrightText: 2026 CipherVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Algorithm rotation.

use ciphervault_core::{Algorithm, AlgorithmPicker, CipherVaultError};

use crate::document::{KeystoreDocument, RotationEvent};
use crate::persist::now_iso;

/// Result of a rotation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationOutcome {
    /// `current_algo` changed; the event was appended to the history.
    Rotated(RotationEvent),
    /// No supported algorithm other than the current one exists.
    NoAlternative { current: Algorithm },
}

/// Switch `doc` to a different supported algorithm chosen by `picker`.
///
/// Appends the transition to `rotation_history` and the outgoing algorithm
/// to every key's `algo_history`. The document is untouched on error or
/// when there is no alternative.
pub fn rotate_algorithm(
    doc: &mut KeystoreDocument,
    supported: &[Algorithm],
    picker: &mut dyn AlgorithmPicker,
) -> Result<RotationOutcome, CipherVaultError> {
    let current = Algorithm::parse(&doc.current_algo)?;
    if !supported.contains(&current) {
        return Err(CipherVaultError::UnknownAlgorithm(doc.current_algo.clone()));
    }

    let candidates: Vec<Algorithm> = supported
        .iter()
        .copied()
        .filter(|a| *a != current)
        .collect();
    let Some(next) = picker.pick(&candidates) else {
        return Ok(RotationOutcome::NoAlternative { current });
    };
    if !candidates.contains(&next) {
        return Err(CipherVaultError::UnknownAlgorithm(next.to_string()));
    }

    let event = RotationEvent {
        when: now_iso(),
        from: current.to_string(),
        to: next.to_string(),
    };
    for record in doc.keys.values_mut() {
        record.algo_history.push(event.from.clone());
    }
    doc.current_algo = event.to.clone();
    doc.rotation_history.push(event.clone());
    Ok(RotationOutcome::Rotated(event))
}
