//! Signer capability and the Ed25519 wallet behind it.
//!
//! # Security
//! - Private keys are loaded from hex strings or environment variables only
//! - Keys are never logged or serialized
//!
//! # Signing scheme
//! ```text
//! digest    = blake2b256([0, 0, 0] || tx_bytes)      (transaction intent)
//! signature = 0x00 || ed25519(digest) || public_key  (base64, 97 bytes)
//! address   = blake2b256(0x00 || public_key)
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::{Signer as _, SigningKey};

use crate::blockchain::error::{RpcError, RpcResult};
use crate::blockchain::types::SuiAddress;

type Blake2b256 = Blake2b<U32>;

/// Signature scheme flag for Ed25519.
const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope, version, app id.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Capability to authorize transactions for one address.
pub trait TransactionSigner: Send + Sync {
    /// Address whose coins this signer can spend.
    fn address(&self) -> SuiAddress;

    /// Sign BCS transaction bytes, returning the base64 serialized signature.
    fn sign_transaction(&self, tx_bytes: &[u8]) -> RpcResult<String>;
}

/// Sign node-built transaction bytes given as base64.
pub fn sign_serialized(signer: &dyn TransactionSigner, tx_bytes: &str) -> RpcResult<String> {
    let raw = STANDARD
        .decode(tx_bytes)
        .map_err(|e| RpcError::Signing(format!("txBytes is not base64: {e}")))?;
    signer.sign_transaction(&raw)
}

/// Ed25519 keypair signer.
pub struct Ed25519Signer {
    key: SigningKey,
    address: SuiAddress,
}

impl Ed25519Signer {
    /// Create a signer from a hex-encoded 32-byte secret key.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> RpcResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let mut secret = [0u8; 32];
        hex::decode_to_slice(key_hex, &mut secret)
            .map_err(|e| RpcError::Signing(format!("Invalid private key format: {}", e)))?;

        let key = SigningKey::from_bytes(&secret);
        let address = derive_address(&key.verifying_key().to_bytes());

        tracing::info!(address = %address, "Signer initialized");

        Ok(Self { key, address })
    }

    /// Load the signer key from environment variable `var`.
    pub fn from_env(var: &str) -> RpcResult<Self> {
        let private_key = std::env::var(var)
            .map_err(|_| RpcError::Signing(format!("Environment variable {} not set", var)))?;

        Self::from_private_key(&private_key)
    }

    /// Raw Ed25519 public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }
}

impl TransactionSigner for Ed25519Signer {
    fn address(&self) -> SuiAddress {
        self.address
    }

    fn sign_transaction(&self, tx_bytes: &[u8]) -> RpcResult<String> {
        let digest = transaction_digest(tx_bytes);
        let signature = self.key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());

        Ok(STANDARD.encode(serialized))
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Address owned by an Ed25519 public key.
pub fn derive_address(public_key: &[u8; 32]) -> SuiAddress {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key);
    SuiAddress::new(hasher.finalize().into())
}

fn transaction_digest(tx_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(TRANSACTION_INTENT);
    hasher.update(tx_bytes);
    hasher.finalize().into()
}
