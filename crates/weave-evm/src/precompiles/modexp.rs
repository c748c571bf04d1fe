//! Big-integer modular exponentiation (EIP-198)

use super::{padded, PrecompileError, PrecompiledContract};
use num_bigint::BigUint;
use weave_primitives::U256;

/// Operand length accepted by [`ModExp::execute`]
const MAX_OPERAND_LEN: u64 = 1 << 24;

/// 0x05: `base ^ exp % modulus` over arbitrary-length big-endian operands
#[derive(Debug, Clone, Copy, Default)]
pub struct ModExp;

#[derive(Debug, Clone, Copy)]
struct Header {
    base_len: u64,
    exp_len: u64,
    mod_len: u64,
}

impl Header {
    fn parse(input: &[u8]) -> Self {
        Self {
            base_len: read_len(input, 0),
            exp_len: read_len(input, 32),
            mod_len: read_len(input, 64),
        }
    }
}

fn read_len(input: &[u8], offset: usize) -> u64 {
    let value = U256::from_big_endian(&padded(input, offset, 32));
    if value.bits() > 64 {
        u64::MAX
    } else {
        value.low_u64()
    }
}

fn mult_complexity(x: u64) -> u128 {
    let x = x as u128;
    if x <= 64 {
        x * x
    } else if x <= 1024 {
        x * x / 4 + 96 * x - 3072
    } else {
        (x.saturating_mul(x) / 16)
            .saturating_add(480 * x)
            .saturating_sub(199_680)
    }
}

/// Bit length of the exponent adjusted per EIP-198, before the `max(_, 1)`
fn adjusted_exp_len(input: &[u8], header: &Header) -> u64 {
    let head_len = header.exp_len.min(32) as usize;
    let head_bits = usize::try_from(96u64.saturating_add(header.base_len))
        .map(|offset| BigUint::from_bytes_be(&padded(input, offset, head_len)).bits())
        .unwrap_or(0);
    let head = head_bits.saturating_sub(1);
    if header.exp_len <= 32 {
        head
    } else {
        (header.exp_len - 32).saturating_mul(8).saturating_add(head)
    }
}

fn operand_len(len: u64) -> Result<usize, PrecompileError> {
    if len > MAX_OPERAND_LEN {
        return Err(PrecompileError::InvalidInput(format!(
            "operand length {len} too large"
        )));
    }
    Ok(len as usize)
}

impl PrecompiledContract for ModExp {
    fn gas_for_data(&self, input: &[u8]) -> u64 {
        let header = Header::parse(input);
        let complexity = mult_complexity(header.base_len.max(header.mod_len));
        let exponent = adjusted_exp_len(input, &header).max(1) as u128;
        let gas = complexity.saturating_mul(exponent) / 20;
        u64::try_from(gas).unwrap_or(u64::MAX)
    }

    fn execute(&self, input: &[u8]) -> Result<Vec<u8>, PrecompileError> {
        let header = Header::parse(input);
        if header.base_len == 0 && header.mod_len == 0 {
            return Ok(Vec::new());
        }
        let base_len = operand_len(header.base_len)?;
        let exp_len = operand_len(header.exp_len)?;
        let mod_len = operand_len(header.mod_len)?;

        let base = BigUint::from_bytes_be(&padded(input, 96, base_len));
        let exponent = BigUint::from_bytes_be(&padded(input, 96 + base_len, exp_len));
        let modulus = BigUint::from_bytes_be(&padded(input, 96 + base_len + exp_len, mod_len));

        let mut out = vec![0u8; mod_len];
        if modulus.bits() == 0 {
            return Ok(out);
        }
        let result = base.modpow(&exponent, &modulus).to_bytes_be();
        out[mod_len - result.len()..].copy_from_slice(&result);
        Ok(out)
    }
}
