//! secp256k1 signing and public key recovery

use crate::{keccak256, CryptoError};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use weave_primitives::{Address, H256};

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

/// Recoverable ECDSA signature in the `(v, r, s)` layout
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component
    pub r: [u8; 32],
    /// s component
    pub s: [u8; 32],
    /// recovery id, 27 or 28
    pub v: u8,
}

impl Signature {
    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Raw recovery id (0 or 1), or `None` for a `v` outside {27, 28}
    pub fn recovery_id(&self) -> Option<u8> {
        match self.v {
            27 | 28 => Some(self.v - 27),
            _ => None,
        }
    }
}

/// Sign a message hash, producing a low-s signature
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Recover the signer address of `message_hash`.
///
/// High-s signatures are accepted and normalized before recovery.
pub fn recover_address(message_hash: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    let raw_id = signature
        .recovery_id()
        .ok_or(CryptoError::InvalidRecoveryId(signature.v))?;
    let mut recovery_id =
        RecoveryId::from_byte(raw_id).ok_or(CryptoError::InvalidRecoveryId(signature.v))?;

    let r: k256::FieldBytes = signature.r.into();
    let s: k256::FieldBytes = signature.s.into();
    let mut k256_sig = K256Signature::from_scalars(r, s)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    if let Some(normalized) = k256_sig.normalize_s() {
        k256_sig = normalized;
        recovery_id = RecoveryId::from_byte(recovery_id.to_byte() ^ 1)
            .ok_or(CryptoError::InvalidRecoveryId(signature.v))?;
    }

    let key = VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &k256_sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;
    Ok(public_key_to_address(&key))
}

/// Derive the account address of a public key
pub fn public_key_to_address(public_key: &VerifyingKey) -> Address {
    // Uncompressed point: 0x04 || x || y
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(addr_bytes)
}
