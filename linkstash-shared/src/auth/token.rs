/// Opaque bearer-token generation and digesting
///
/// Auth tokens are 64-character random strings over a base62 alphabet,
/// generated from an explicit OS-backed cryptographic RNG. Only the SHA-256
/// hex digest is persisted, keyed by `(user, digest)`; the plaintext is
/// returned to the caller exactly once at issue time and is never
/// retrievable again.
///
/// # Example
///
/// ```
/// use linkstash_shared::auth::token::{digest_token, TokenGenerator, TOKEN_LENGTH};
///
/// let mut generator = TokenGenerator::new();
/// let token = generator.generate();
/// assert_eq!(token.len(), TOKEN_LENGTH);
///
/// // The digest is what gets stored; it is deterministic per token.
/// assert_eq!(digest_token(&token), digest_token(&token));
/// ```

use rand::{rngs::OsRng, Rng};
use sha2::{Digest, Sha256};

/// Length of a generated auth token (characters)
pub const TOKEN_LENGTH: usize = 64;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Token generator backed by an explicit cryptographically-secure RNG
///
/// The RNG is owned here rather than pulled from a shared global so the
/// randomness source of the credential store is visible at the call site.
pub struct TokenGenerator {
    rng: OsRng,
}

impl TokenGenerator {
    /// Creates a generator backed by the operating system RNG
    pub fn new() -> Self {
        TokenGenerator { rng: OsRng }
    }

    /// Generates a new 64-character opaque token
    ///
    /// Key space: 62^64, comfortably beyond brute-force reach.
    pub fn generate(&mut self) -> String {
        (0..TOKEN_LENGTH)
            .map(|_| {
                let idx = self.rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the SHA-256 hex digest of a token
///
/// This is the only form of a token that is ever persisted.
pub fn digest_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token_length_and_charset() {
        let mut generator = TokenGenerator::new();
        let token = generator.generate();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn test_generate_token_uniqueness() {
        let mut generator = TokenGenerator::new();
        let a = generator.generate();
        let b = generator.generate();

        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_token_deterministic() {
        let digest = digest_token("some-token");

        assert_eq!(digest.len(), 64); // SHA-256 hex
        assert_eq!(digest, digest_token("some-token"));
        assert_ne!(digest, digest_token("other-token"));
    }
}
