use ring::digest::{Context, SHA256};

pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Double SHA-256, used for transaction ids, header hashes and merkle nodes
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256_digest(&sha256_digest(data))
}

/// Hash two 32-byte nodes together as a merkle parent
pub fn sha256d_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    sha256d(&combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXLOWER;

    #[test]
    fn test_sha256d_known_vector() {
        // SHA256d("hello")
        let hash = sha256d(b"hello");
        assert_eq!(
            HEXLOWER.encode(&hash),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_pair_is_order_sensitive() {
        let a = [0x11u8; 32];
        let b = [0x22u8; 32];
        assert_ne!(sha256d_pair(&a, &b), sha256d_pair(&b, &a));

        let mut combined = Vec::new();
        combined.extend_from_slice(&a);
        combined.extend_from_slice(&b);
        assert_eq!(sha256d_pair(&a, &b), sha256d(&combined));
    }
}
