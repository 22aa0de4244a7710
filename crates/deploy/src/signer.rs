//! Operation signing.
//!
//! The deployment flow never inspects key material: it hands watermarked
//! operation bytes to a [`Signer`] and gets a signature back. The only
//! implementation here keeps an Ed25519 key in memory, parsed from an
//! `edsk` secret key string.

use anyhow::{Context, Result, bail};
use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer as _, SigningKey};

use crate::{Address, base58};

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;

/// Watermark prepended to manager operations before hashing.
pub const GENERIC_OPERATION_WATERMARK: u8 = 0x03;

/// A detached Ed25519 signature over an operation digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    bytes: [u8; 64],
}

impl OperationSignature {
    /// The raw signature bytes appended to forged bytes for injection.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }

    /// The `edsig...` rendering used in the preapply request.
    pub fn to_base58(&self) -> String {
        base58::encode(base58::ED25519_SIGNATURE, &self.bytes)
    }
}

/// Cryptographic authority over an account, able to authorize operations.
pub trait Signer {
    /// The `tz1...` address of the signing account.
    fn address(&self) -> &Address;

    /// The `edpk...` public key, published by a reveal operation.
    fn public_key(&self) -> &str;

    /// Signs `Blake2b-256(watermark || bytes)`.
    fn sign(&self, watermark: u8, bytes: &[u8]) -> Result<OperationSignature>;
}

/// A signer holding an Ed25519 secret key in memory.
pub struct InMemorySigner {
    key: SigningKey,
    public_key: String,
    address: Address,
}

impl InMemorySigner {
    /// Parses an `edsk` secret key (either the 32-byte seed form or the
    /// 64-byte expanded form). Bad key material is rejected here, on first
    /// use, not by the configuration gate.
    pub fn from_secret_key(secret_key: &str) -> Result<Self> {
        let raw = base58::decode(secret_key.trim()).context("Failed to decode the secret key")?;

        let key = if let Some(seed) = raw.strip_prefix(base58::ED25519_SEED) {
            let seed: &[u8; 32] = seed
                .try_into()
                .ok()
                .context("Ed25519 seed must be exactly 32 bytes")?;
            SigningKey::from_bytes(seed)
        } else if let Some(pair) = raw.strip_prefix(base58::ED25519_SECRET_KEY) {
            let pair: &[u8; 64] = pair
                .try_into()
                .ok()
                .context("Expanded Ed25519 secret key must be exactly 64 bytes")?;
            SigningKey::from_keypair_bytes(pair)
                .context("Expanded secret key is inconsistent with its public half")?
        } else {
            bail!("Unsupported secret key format (expected an edsk key)");
        };

        let verifying_key = key.verifying_key();
        let public_key = base58::encode(base58::ED25519_PUBLIC_KEY, verifying_key.as_bytes());

        let mut hasher = Blake2b160::new();
        hasher.update(verifying_key.as_bytes());
        let public_key_hash = hasher.finalize();
        let address = Address::from(base58::encode(
            base58::ED25519_PUBLIC_KEY_HASH,
            &public_key_hash,
        ));

        Ok(Self {
            key,
            public_key,
            address,
        })
    }
}

impl Signer for InMemorySigner {
    fn address(&self) -> &Address {
        &self.address
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }

    fn sign(&self, watermark: u8, bytes: &[u8]) -> Result<OperationSignature> {
        let mut hasher = Blake2b256::new();
        hasher.update([watermark]);
        hasher.update(bytes);
        let digest = hasher.finalize();

        let signature = self.key.sign(&digest);
        Ok(OperationSignature {
            bytes: signature.to_bytes(),
        })
    }
}

impl std::fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySigner")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
