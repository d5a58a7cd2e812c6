use sha2::{Digest, Sha256};

// Stable digest of an email so log lines can be correlated without the address
pub fn email_digest(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}
