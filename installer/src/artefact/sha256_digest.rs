//! SHA-256 digest newtype for artefact verification.
//!
//! Validates that the value is a 64-character hexadecimal string
//! representing a 256-bit hash digest. Upper-case input is accepted and
//! normalised to lower case, so equality is case-insensitive.

use super::error::{ArtefactError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// A validated hex-encoded SHA-256 digest string.
///
/// # Examples
///
/// ```
/// use terraform_demux_installer::artefact::sha256_digest::Sha256Digest;
///
/// let hex = "A".repeat(64);
/// let digest: Sha256Digest = hex.as_str().try_into().unwrap();
/// assert_eq!(digest.as_str(), "a".repeat(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Compute the digest of an in-memory payload.
    ///
    /// # Examples
    ///
    /// ```
    /// use terraform_demux_installer::artefact::sha256_digest::Sha256Digest;
    ///
    /// let digest = Sha256Digest::of(b"");
    /// assert!(digest.as_str().starts_with("e3b0c442"));
    /// ```
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(format!("{:x}", Sha256::digest(bytes)))
    }

    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this is the all-zero stand-in used before a release's
    /// checksums are published. No payload hashes to it in practice.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.bytes().all(|b| b == b'0')
    }

    /// Return an abbreviated form (`first8...last7`) for progress output.
    #[must_use]
    pub fn short(&self) -> String {
        let head: String = self.0.chars().take(8).collect();
        let tail: String = self.0.chars().skip(DIGEST_HEX_LEN - 7).collect();
        format!("{head}...{tail}")
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha256(value)?;
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl From<Sha256Digest> for String {
    fn from(value: Sha256Digest) -> Self {
        value.0
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is a well-formed hex-encoded SHA-256 digest.
fn validate_sha256(value: &str) -> Result<()> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!(
                "expected {DIGEST_HEX_LEN} hex characters, got {}",
                value.len()
            ),
        });
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(ArtefactError::InvalidSha256Digest {
            reason: format!("non-hex character '{bad}'"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_digest() -> String {
        "a".repeat(64)
    }

    #[test]
    fn accepts_valid_sixty_four_char_hex() {
        let digest = Sha256Digest::try_from(valid_digest().as_str());
        assert!(digest.is_ok());
    }

    #[test]
    fn rejects_too_short() {
        let result = Sha256Digest::try_from("abcdef");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_too_long() {
        let long = "a".repeat(65);
        let result = Sha256Digest::try_from(long.as_str());
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        let mut bad = "a".repeat(63);
        bad.push('g');
        let result = Sha256Digest::try_from(bad.as_str());
        assert!(matches!(
            result,
            Err(ArtefactError::InvalidSha256Digest { .. })
        ));
    }

    #[test]
    fn uppercase_hex_is_normalised() {
        let upper = Sha256Digest::try_from("ABCDEF".repeat(10) + "ABCD").expect("valid");
        let lower = Sha256Digest::try_from("abcdef".repeat(10) + "abcd").expect("valid");
        assert_eq!(upper, lower);
    }

    #[test]
    fn of_matches_known_empty_digest() {
        let digest = Sha256Digest::of(b"");
        assert_eq!(
            digest.as_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn short_form_keeps_head_and_tail() {
        let digest = Sha256Digest::try_from(
            "ef19f8d928a654b20e502d157313ee3694eb0af536d553231bea9e119fd9bb91",
        )
        .expect("valid");
        assert_eq!(digest.short(), "ef19f8d9...fd9bb91");
    }

    #[test]
    fn display_shows_full_digest() {
        let hex = valid_digest();
        let digest = Sha256Digest::try_from(hex.as_str()).expect("known good");
        assert_eq!(format!("{digest}"), hex);
    }

    #[test]
    fn deserializes_from_string() {
        let json = format!("\"{}\"", "B".repeat(64));
        let digest: Sha256Digest = serde_json::from_str(&json).expect("valid digest");
        assert_eq!(digest.as_str(), "b".repeat(64));
    }
}
