//! Salted password hashing
//!
//! Hash and salt are stored as separate hex columns on the user row.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generate a random salt and the salted hash for a password
///
/// Returns (hash_hex, salt_hex).
pub fn hash_password(password: &str) -> (String, String) {
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = hex_encode(&salt_bytes);
    let hash = salted_hash(password, &salt);
    (hash, salt)
}

/// Check a password against a stored hash/salt pair
pub fn verify_password(password: &str, stored_hash: &str, salt: &str) -> bool {
    salted_hash(password, salt) == stored_hash
}

fn salted_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let (hash, salt) = hash_password("hunter2");

        assert!(verify_password("hunter2", &hash, &salt));
        assert!(!verify_password("hunter3", &hash, &salt));
    }

    #[test]
    fn test_same_password_different_salts() {
        let (hash_a, salt_a) = hash_password("hunter2");
        let (hash_b, salt_b) = hash_password("hunter2");

        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }
}
