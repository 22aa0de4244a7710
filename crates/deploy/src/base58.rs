//! Base58Check encoding with the Tezos type prefixes.

use anyhow::{Context, Result, bail};
use sha2::{Digest, Sha256};

/// `edsk`: Ed25519 seed (32 bytes).
pub(crate) const ED25519_SEED: &[u8] = &[13, 15, 58, 7];
/// `edsk`: expanded Ed25519 secret key (64 bytes).
pub(crate) const ED25519_SECRET_KEY: &[u8] = &[43, 246, 78, 7];
/// `edpk`: Ed25519 public key (32 bytes).
pub(crate) const ED25519_PUBLIC_KEY: &[u8] = &[13, 15, 37, 217];
/// `tz1`: Ed25519 public key hash (20 bytes).
pub(crate) const ED25519_PUBLIC_KEY_HASH: &[u8] = &[6, 161, 159];
/// `edsig`: Ed25519 signature (64 bytes).
pub(crate) const ED25519_SIGNATURE: &[u8] = &[9, 245, 205, 134, 18];
/// `B`: block hash (32 bytes).
pub(crate) const BLOCK_HASH: &[u8] = &[1, 52];

/// Encodes `prefix || payload` with a 4-byte double-SHA-256 checksum.
pub(crate) fn encode(prefix: &[u8], payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(prefix.len() + payload.len() + 4);
    data.extend_from_slice(prefix);
    data.extend_from_slice(payload);
    let checksum = Sha256::digest(Sha256::digest(&data));
    data.extend_from_slice(&checksum[..4]);
    bs58::encode(data).into_string()
}

/// Decodes a Base58Check string, verifying the checksum. Returns the payload
/// with its type prefix still attached.
pub(crate) fn decode(input: &str) -> Result<Vec<u8>> {
    let data = bs58::decode(input)
        .into_vec()
        .with_context(|| format!("{input} is not valid base58"))?;
    if data.len() < 4 {
        bail!("{input} is too short to carry a base58 checksum");
    }
    let (payload, checksum) = data.split_at(data.len() - 4);
    let expected = Sha256::digest(Sha256::digest(payload));
    if checksum != &expected[..4] {
        bail!("{input} has a bad base58 checksum");
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let payload = [7u8; 20];
        let encoded = encode(ED25519_PUBLIC_KEY_HASH, &payload);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(&decoded[..3], ED25519_PUBLIC_KEY_HASH);
        assert_eq!(&decoded[3..], payload);
    }

    #[test]
    fn test_tz1_prefix_renders() {
        let encoded = encode(ED25519_PUBLIC_KEY_HASH, &[0u8; 20]);
        assert!(encoded.starts_with("tz1"));
    }

    #[test]
    fn test_corrupted_checksum_is_rejected() {
        let mut encoded = encode(ED25519_PUBLIC_KEY_HASH, &[7u8; 20]);
        // Flip the last character to another base58 character.
        let last = encoded.pop().unwrap();
        encoded.push(if last == '1' { '2' } else { '1' });
        assert!(decode(&encoded).is_err());
    }

    #[test]
    fn test_non_base58_input_is_rejected() {
        assert!(decode("0OIl").is_err());
    }
}
