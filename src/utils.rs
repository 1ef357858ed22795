use sha2::{Digest, Sha256};

/// Creates a truncated, salted hash of an identifier for safe logging.
///
/// User ids and emails never appear in logs in the clear; this gives a stable
/// short handle for correlating log lines instead.
///
/// # Arguments
/// * `id` - The identifier to hash (e.g., user id, email).
/// * `salt` - A salt value from the application's configuration.
pub fn log_safe_id(id: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(id.as_bytes());
    let hash = hasher.finalize();

    // Take first 4 bytes and format each as hex
    hash[..4]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<String>()
}
