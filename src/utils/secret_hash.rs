use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// 用户池的SECRET_HASH: base64(HMAC-SHA256(username + client_id, client_secret))
pub fn secret_hash(username: &str, client_id: &str, client_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_hash_is_deterministic() {
        let a = secret_hash("daniel@example.com", "client-id", "client-secret");
        let b = secret_hash("daniel@example.com", "client-id", "client-secret");
        assert_eq!(a, b);
    }

    #[test]
    fn test_secret_hash_varies_by_username() {
        let a = secret_hash("a@example.com", "client-id", "client-secret");
        let b = secret_hash("b@example.com", "client-id", "client-secret");
        assert_ne!(a, b);
    }

    #[test]
    fn test_secret_hash_is_valid_base64_of_32_bytes() {
        let h = secret_hash("daniel@example.com", "client-id", "client-secret");
        let raw = STANDARD.decode(&h).unwrap();
        assert_eq!(raw.len(), 32);
    }
}
