//! Cryptographic Utilities

use rand::{Rng, RngCore};

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rand::rng().fill_bytes(&mut bytes);
    bytes
}

/// Generate a uniformly random numeric code of exactly `digits` characters.
///
/// Leading zeros are kept, so every value in `0..10^digits` is possible.
pub fn random_numeric_code(digits: u32) -> String {
    let upper = 10u64.pow(digits);
    let value = rand::rng().random_range(0..upper);
    format!("{:0width$}", value, width = digits as usize)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32);
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_numeric_code_shape() {
        for _ in 0..200 {
            let code = random_numeric_code(6);
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_numeric_code_varies() {
        let codes: std::collections::HashSet<_> =
            (0..50).map(|_| random_numeric_code(6)).collect();
        assert!(codes.len() > 1);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"123456", b"12345"));
        assert!(!constant_time_eq(b"", b"0"));
    }
}
