use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of a payload, used to fingerprint uploaded and
/// downloaded assets in logs and run reports.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// First 12 hex characters of a digest, for log lines.
pub fn short_digest(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex() {
        // SHA-256 for "hello world"
        assert_eq!(
            sha256_hex(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_sha256_hex_empty() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_short_digest() {
        assert_eq!(short_digest("b94d27b9934d3e08a52e"), "b94d27b9934d");
        assert_eq!(short_digest("abc"), "abc");
        assert_eq!(short_digest("ééééééé"), "éééééé");
        // Byte 12 falls inside a char
        assert_eq!(short_digest("aéééééé"), "aéééééé");
    }
}
