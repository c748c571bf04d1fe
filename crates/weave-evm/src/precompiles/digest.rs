//! SHA-256 and RIPEMD-160 precompiles

use super::{linear_cost, PrecompileError, PrecompiledContract};
use weave_crypto::{ripemd160, sha256};

/// 0x02: SHA-256 digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256;

impl PrecompiledContract for Sha256 {
    fn gas_for_data(&self, input: &[u8]) -> u64 {
        linear_cost(60, 12, input.len())
    }

    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        Ok(sha256(input).to_vec())
    }
}

/// 0x03: RIPEMD-160 digest, left-padded to 32 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct Ripemd160;

impl PrecompiledContract for Ripemd160 {
    fn gas_for_data(&self, input: &[u8]) -> u64 {
        linear_cost(600, 120, input.len())
    }

    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let mut out = vec![0u8; 32];
        out[12..].copy_from_slice(&ripemd160(input));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        let out = Sha256.execute(&[]).unwrap();
        assert_eq!(
            hex::encode(out),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(Sha256.gas_for_data(&[]), 60);
        assert_eq!(Sha256.gas_for_data(&[0; 64]), 84);
    }

    #[test]
    fn test_ripemd160_padded() {
        let out = Ripemd160.execute(&[]).unwrap();
        assert_eq!(out.len(), 32);
        assert_eq!(&out[..12], &[0u8; 12]);
        assert_eq!(
            hex::encode(&out[12..]),
            "9c1185a5c5e9fc54612808977ee8f548b2258d31"
        );
        assert_eq!(Ripemd160.gas_for_data(&[1]), 720);
    }
}
