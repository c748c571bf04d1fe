//! Signer recovery precompile

use super::{padded, PrecompileError, PrecompiledContract};
use weave_crypto::{recover_address, Signature};
use weave_primitives::H256;

const ECRECOVER_GAS: u64 = 3000;

/// 0x01: recover the signer of `(hash, v, r, s)`.
///
/// Malformed signatures are not a failure; they produce empty output.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcRecover;

impl PrecompiledContract for EcRecover {
    fn gas_for_data(&self, _input: &[u8]) -> u64 {
        ECRECOVER_GAS
    }

    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let input = padded(input, 0, 128);

        // v is a full word; only 27 and 28 are accepted
        if input[32..63].iter().any(|b| *b != 0) {
            return Ok(Vec::new());
        }
        let v = input[63];

        let mut hash = [0u8; 32];
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        hash.copy_from_slice(&input[..32]);
        r.copy_from_slice(&input[64..96]);
        s.copy_from_slice(&input[96..128]);

        let signature = Signature::new(r, s, v);
        match recover_address(&H256::from_bytes(hash), &signature) {
            Ok(address) => {
                let mut out = vec![0u8; 32];
                out[12..].copy_from_slice(address.as_bytes());
                Ok(out)
            }
            Err(_) => Ok(Vec::new()),
        }
    }
}
