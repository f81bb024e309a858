//! Integrity verification for downloaded artefacts.
//!
//! The digest is computed over the complete payload exactly as retrieved,
//! then compared against the digest pinned in the catalog. A mismatch is
//! final: the payload is untrusted and must not be installed or retried.
//! Only [`verify`] can produce a [`VerifiedArtefact`], and the installer
//! accepts nothing else.

use super::sha256_digest::Sha256Digest;

/// The recomputed digest differs from the pinned one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("checksum mismatch: expected {expected}, got {actual}")]
pub struct ChecksumMismatch {
    /// The digest pinned in the catalog.
    pub expected: Sha256Digest,
    /// The digest of the bytes actually received.
    pub actual: Sha256Digest,
}

/// A payload whose digest matched the pinned value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtefact {
    bytes: Vec<u8>,
    sha256: Sha256Digest,
}

impl VerifiedArtefact {
    /// The verified bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The digest the bytes were verified against.
    #[must_use]
    pub const fn sha256(&self) -> &Sha256Digest {
        &self.sha256
    }
}

/// Verify `bytes` against the pinned digest.
///
/// [`Sha256Digest`] values are stored in lower case, so the comparison is
/// insensitive to the case the digest was written in.
///
/// # Errors
///
/// Returns [`ChecksumMismatch`] if the digests differ.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::artefact::sha256_digest::Sha256Digest;
/// use terraform_demux_installer::artefact::verification::verify;
///
/// let pinned = Sha256Digest::of(b"payload");
/// assert!(verify(b"payload".to_vec(), &pinned).is_ok());
/// assert!(verify(b"tampered".to_vec(), &pinned).is_err());
/// ```
pub fn verify(bytes: Vec<u8>, expected: &Sha256Digest) -> Result<VerifiedArtefact, ChecksumMismatch> {
    let actual = Sha256Digest::of(&bytes);
    if &actual != expected {
        log::warn!("checksum mismatch: expected {expected}, got {actual}");
        return Err(ChecksumMismatch {
            expected: expected.clone(),
            actual,
        });
    }
    log::debug!("verified {} bytes against {}", bytes.len(), expected.short());
    Ok(VerifiedArtefact {
        bytes,
        sha256: actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PAYLOAD: &[u8] = b"terraform-demux archive";

    #[test]
    fn matching_payload_is_verified() {
        let pinned = Sha256Digest::of(PAYLOAD);
        let verified = verify(PAYLOAD.to_vec(), &pinned).expect("digest matches");
        assert_eq!(verified.bytes(), PAYLOAD);
        assert_eq!(verified.sha256(), &pinned);
    }

    #[test]
    fn uppercase_pinned_digest_still_matches() {
        let upper = Sha256Digest::of(PAYLOAD).as_str().to_ascii_uppercase();
        let pinned = Sha256Digest::try_from(upper).expect("valid hex");
        assert!(verify(PAYLOAD.to_vec(), &pinned).is_ok());
    }

    #[rstest]
    #[case::truncated(&PAYLOAD[..PAYLOAD.len() - 1])]
    #[case::extended(b"terraform-demux archive\n")]
    #[case::one_byte_flipped(b"terraform-demux archivE")]
    #[case::empty(b"")]
    fn any_other_payload_is_rejected(#[case] tampered: &[u8]) {
        let pinned = Sha256Digest::of(PAYLOAD);
        let err = verify(tampered.to_vec(), &pinned).expect_err("tampered");
        assert_eq!(err.expected, pinned);
        assert_eq!(err.actual, Sha256Digest::of(tampered));
    }

    #[test]
    fn mismatch_message_names_both_digests() {
        let pinned = Sha256Digest::try_from("a".repeat(64)).expect("valid");
        let err = verify(PAYLOAD.to_vec(), &pinned).expect_err("mismatch");
        let message = err.to_string();
        assert!(message.contains(&"a".repeat(64)));
        assert!(message.contains(Sha256Digest::of(PAYLOAD).as_str()));
    }
}
