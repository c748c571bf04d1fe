//! Bytecode interpreter
//!
//! Each step goes through validate, price, charge, execute and advance. A
//! fault in any phase ends the frame via [`Program::fault`]; the interpreter
//! itself never returns an error to the host.

use crate::analysis::JumpDestCache;
use crate::chain_spec::ChainSpec;
use crate::context::{BlockHashOracle, CallContext, Environment};
use crate::error::{EvmError, EvmResult};
use crate::gas::{mem_needed, FeeSchedule};
use crate::opcode::Opcode;
use crate::program::{source_slice, Program};
use crate::result::{ExecutionResult, Log};
use crate::word::Word;
use bytes::Bytes;
use tracing::{debug, trace};
use weave_crypto::keccak256;
use weave_primitives::U256;
use weave_state::Repository;

/// Price of one instruction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cost {
    /// Total gas charged, including gas forwarded to a callee
    pub gas: u64,
    /// Memory bytes the instruction touches
    pub memory: u64,
    /// Gas forwarded to a callee (CALL family only)
    pub call_gas: u64,
    /// Deferred refund adjustment (SSTORE only)
    pub refund: i64,
}

impl Cost {
    fn add(&mut self, gas: u64) {
        self.gas = self.gas.saturating_add(gas);
    }

    fn touch(&mut self, fees: &FeeSchedule, old_size: usize, needed: u64, copy_size: u64) {
        self.add(fees.memory_gas(old_size, needed, copy_size));
        self.memory = self.memory.max(needed);
    }
}

/// Interpreter bound to one fork and one block/transaction environment.
///
/// Holds no per-frame state; the same value drives a frame and all of its
/// nested calls.
pub struct Evm<'a> {
    pub(crate) spec: &'a ChainSpec,
    pub(crate) env: &'a Environment,
    pub(crate) block_hashes: Option<&'a dyn BlockHashOracle>,
    pub(crate) jump_dests: JumpDestCache,
}

impl<'a> Evm<'a> {
    /// Create an interpreter with a private jump-destination cache
    pub fn new(spec: &'a ChainSpec, env: &'a Environment) -> Self {
        Self {
            spec,
            env,
            block_hashes: None,
            jump_dests: JumpDestCache::new(),
        }
    }

    /// Answer BLOCKHASH from `oracle`
    pub fn with_block_hashes(mut self, oracle: &'a dyn BlockHashOracle) -> Self {
        self.block_hashes = Some(oracle);
        self
    }

    /// Share a jump-destination cache with other interpreters
    pub fn with_jump_cache(mut self, cache: JumpDestCache) -> Self {
        self.jump_dests = cache;
        self
    }

    /// Fork rules
    pub fn spec(&self) -> &ChainSpec {
        self.spec
    }

    /// Block and transaction environment
    pub fn env(&self) -> &Environment {
        self.env
    }

    /// Build a frame for `code`, reusing cached jump analysis
    pub fn program<'r>(
        &self,
        code: Bytes,
        ctx: CallContext,
        repo: &'r mut dyn Repository,
    ) -> Program<'r> {
        let table = self.jump_dests.get_or_analyze(&code);
        Program::with_jump_table(code, table, ctx, repo)
    }

    /// Run `code` to completion in a fresh frame
    pub fn execute(
        &self,
        code: Bytes,
        ctx: CallContext,
        repo: &mut dyn Repository,
    ) -> ExecutionResult {
        let mut program = self.program(code, ctx, repo);
        self.run(&mut program);
        program.into_result()
    }

    /// Step `program` until it stops
    pub fn run(&self, program: &mut Program<'_>) {
        debug!(
            depth = program.ctx.depth,
            address = %program.ctx.address,
            gas = program.ctx.gas,
            "frame enter"
        );
        while !program.stopped {
            self.step(program);
        }
        debug!(
            depth = program.ctx.depth,
            gas_used = program.result.gas_used,
            reverted = program.result.reverted,
            error = program.result.exception.as_ref().map(|e| e.to_string()),
            "frame exit"
        );
    }

    /// Execute one instruction; a fault stops the frame
    pub fn step(&self, program: &mut Program<'_>) {
        if let Err(error) = self.try_step(program) {
            debug!(depth = program.ctx.depth, pc = program.pc, %error, "frame fault");
            program.fault(error);
        }
    }

    fn try_step(&self, program: &mut Program<'_>) -> EvmResult<()> {
        let Some(byte) = program.current_byte() else {
            program.stop();
            return Ok(());
        };
        let op = Opcode::from_byte(byte)
            .filter(|op| self.spec.is_enabled(*op))
            .ok_or(EvmError::InvalidOpcode(byte))?;
        program.stack.verify_underflow(op.stack_inputs())?;
        program
            .stack
            .verify_overflow(op.stack_inputs(), op.stack_outputs())?;

        let cost = self.price(program, op)?;
        trace!(
            depth = program.ctx.depth,
            pc = program.pc,
            op = op.name(),
            cost = cost.gas,
            gas_left = program.gas_left(),
            stack = program.stack.len(),
            "step"
        );
        program.result.spend_gas(cost.gas)?;
        program.result.add_future_refund(cost.refund);
        program.memory.extend_to(cost.memory as usize);

        self.execute_op(program, op, &cost)
    }

    // ==================== Pricing ====================

    pub(crate) fn price(&self, program: &Program<'_>, op: Opcode) -> EvmResult<Cost> {
        let fees = &self.spec.fee_schedule;
        let stack = &program.stack;
        let old_size = program.memory.size();
        let mut cost = Cost {
            gas: fees.tier_cost(op.tier()),
            ..Default::default()
        };

        match op {
            Opcode::STOP => cost.gas = fees.stop,
            Opcode::SUICIDE => {
                cost.gas = fees.suicide;
                let beneficiary = stack.peek(0)?.to_address();
                let new_account = if self.spec.eip161_empty_accounts {
                    program.repo.is_dead(&beneficiary)
                        && !program.repo.get_balance(&program.ctx.address).is_zero()
                } else {
                    !program.repo.exists(&beneficiary)
                };
                if new_account {
                    cost.add(fees.new_acct_suicide);
                }
            }
            Opcode::SSTORE => {
                let (gas, refund) = self.sstore_cost(program)?;
                cost.gas = gas;
                cost.refund = refund;
            }
            Opcode::SLOAD => cost.gas = fees.sload,
            Opcode::BALANCE => cost.gas = fees.balance,
            Opcode::EXTCODESIZE => cost.gas = fees.ext_code_size,
            Opcode::EXTCODEHASH => cost.gas = fees.ext_code_hash,
            Opcode::BLOCKHASH => cost.gas = fees.blockhash,
            Opcode::MSTORE | Opcode::MLOAD => {
                cost.touch(fees, old_size, mem_needed(stack.peek(0)?, Word::from(32u64))?, 0);
            }
            Opcode::MSTORE8 => {
                cost.touch(fees, old_size, mem_needed(stack.peek(0)?, Word::ONE)?, 0);
            }
            Opcode::RETURN | Opcode::REVERT => {
                cost.gas = fees.stop;
                cost.touch(fees, old_size, mem_needed(stack.peek(0)?, stack.peek(1)?)?, 0);
            }
            Opcode::SHA3 => {
                let size = stack.peek(1)?;
                cost.gas = fees.sha3;
                cost.touch(fees, old_size, mem_needed(stack.peek(0)?, size)?, 0);
                cost.add(fees.sha3_word * size.to_u64_saturating().div_ceil(32));
            }
            Opcode::CALLDATACOPY | Opcode::RETURNDATACOPY | Opcode::CODECOPY => {
                let size = stack.peek(2)?;
                let needed = mem_needed(stack.peek(0)?, size)?;
                cost.touch(fees, old_size, needed, size.to_u64_saturating());
            }
            Opcode::EXTCODECOPY => {
                let size = stack.peek(3)?;
                cost.gas = fees.ext_code_copy;
                let needed = mem_needed(stack.peek(1)?, size)?;
                cost.touch(fees, old_size, needed, size.to_u64_saturating());
            }
            Opcode::EXP => cost.gas = fees.exp_cost(stack.peek(1)?),
            Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4 => {
                let size = stack.peek(1)?;
                // Huge payloads fail before the memory bound is evaluated
                let data_cost = size.as_u256().saturating_mul(U256::from(fees.log_data));
                if data_cost > U256::from(program.gas_left()) {
                    return Err(EvmError::OutOfGas);
                }
                cost.gas = fees.log
                    + fees.log_topic * op.log_topics() as u64
                    + fees.log_data * size.to_u64_saturating();
                cost.touch(fees, old_size, mem_needed(stack.peek(0)?, size)?, 0);
            }
            Opcode::CREATE => {
                cost.gas = fees.create;
                cost.touch(fees, old_size, mem_needed(stack.peek(1)?, stack.peek(2)?)?, 0);
            }
            Opcode::CREATE2 => {
                let size = stack.peek(2)?;
                cost.gas = fees.create;
                cost.touch(fees, old_size, mem_needed(stack.peek(1)?, size)?, 0);
                cost.add(fees.sha3_word * size.to_u64_saturating().div_ceil(32));
            }
            Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => {
                self.price_call(program, op, &mut cost)?;
            }
            _ => {}
        }

        Ok(cost)
    }

    fn price_call(&self, program: &Program<'_>, op: Opcode, cost: &mut Cost) -> EvmResult<()> {
        let fees = &self.spec.fee_schedule;
        let stack = &program.stack;
        let requested = stack.peek(0)?;
        let target = stack.peek(1)?.to_address();
        let value = if op.call_has_value() {
            stack.peek(2)?
        } else {
            Word::ZERO
        };

        cost.gas = fees.call;
        if op == Opcode::CALL {
            let new_account = if self.spec.eip161_empty_accounts {
                !value.is_zero() && program.repo.is_dead(&target)
            } else {
                !program.repo.exists(&target)
            };
            if new_account {
                cost.add(fees.new_acct_call);
            }
        }
        if !value.is_zero() {
            cost.add(fees.vt_call);
        }

        let args = if op.call_has_value() { 3 } else { 2 };
        let input = mem_needed(stack.peek(args)?, stack.peek(args + 1)?)?;
        let output = mem_needed(stack.peek(args + 2)?, stack.peek(args + 3)?)?;
        cost.touch(fees, program.memory.size(), input.max(output), 0);

        let available = program
            .gas_left()
            .checked_sub(cost.gas)
            .ok_or(EvmError::OutOfGas)?;
        let cap = self.spec.max_forwardable(available);
        cost.call_gas = match requested.to_u64_strict() {
            Some(gas) if gas <= cap => gas,
            _ if self.spec.eip150_call_gas => cap,
            _ => return Err(EvmError::OutOfGas),
        };
        cost.add(cost.call_gas);
        Ok(())
    }

    /// SSTORE fee and deferred refund delta
    fn sstore_cost(&self, program: &Program<'_>) -> EvmResult<(u64, i64)> {
        let fees = &self.spec.fee_schedule;
        let address = program.ctx.address;
        let key = program.stack.peek(0)?.to_h256();
        let new = program.stack.peek(1)?.to_h256();
        let current = program.repo.get_storage_row(&address, &key);
        let refund_sstore = fees.refund_sstore as i64;

        if !self.spec.sstore_net_metering {
            return Ok(if current.is_zero() && !new.is_zero() {
                (fees.set_sstore, 0)
            } else if !current.is_zero() && new.is_zero() {
                (fees.clear_sstore, refund_sstore)
            } else {
                (fees.reset_sstore, 0)
            });
        }

        if new == current {
            return Ok((fees.reuse_sstore, 0));
        }
        let original = program.repo.get_original_storage_row(&address, &key);
        if current == original {
            if original.is_zero() {
                return Ok((fees.set_sstore, 0));
            }
            let refund = if new.is_zero() { refund_sstore } else { 0 };
            return Ok((fees.clear_sstore, refund));
        }

        // Dirty slot
        let mut refund = 0;
        if !original.is_zero() {
            if current.is_zero() {
                refund -= refund_sstore;
            } else if new.is_zero() {
                refund += refund_sstore;
            }
        }
        if original == new {
            let restored = if original.is_zero() {
                fees.set_sstore
            } else {
                fees.clear_sstore
            };
            refund += restored as i64 - fees.reuse_sstore as i64;
        }
        Ok((fees.reuse_sstore, refund))
    }

    // ==================== Execution ====================

    fn execute_op(&self, program: &mut Program<'_>, op: Opcode, cost: &Cost) -> EvmResult<()> {
        match op {
            Opcode::STOP => program.stop(),

            // Arithmetic
            Opcode::ADD => binary(program, Word::add)?,
            Opcode::MUL => binary(program, Word::mul)?,
            Opcode::SUB => binary(program, Word::sub)?,
            Opcode::DIV => binary(program, Word::div)?,
            Opcode::SDIV => binary(program, Word::sdiv)?,
            Opcode::MOD => binary(program, Word::rem)?,
            Opcode::SMOD => binary(program, Word::smod)?,
            Opcode::ADDMOD => ternary(program, Word::addmod)?,
            Opcode::MULMOD => ternary(program, Word::mulmod)?,
            Opcode::EXP => binary(program, Word::exp)?,
            Opcode::SIGNEXTEND => binary(program, |k, value| match k.to_u64_strict() {
                Some(k) if k < 32 => value.sign_extend(k as usize).unwrap_or(value),
                _ => value,
            })?,

            // Comparison and bitwise logic
            Opcode::LT => compare(program, Word::lt)?,
            Opcode::GT => compare(program, Word::gt)?,
            Opcode::SLT => compare(program, Word::slt)?,
            Opcode::SGT => compare(program, Word::sgt)?,
            Opcode::EQ => compare(program, Word::eq)?,
            Opcode::ISZERO => unary(program, |a| Word::from(a.is_zero()))?,
            Opcode::AND => binary(program, Word::and)?,
            Opcode::OR => binary(program, Word::or)?,
            Opcode::XOR => binary(program, Word::xor)?,
            Opcode::NOT => unary(program, Word::bnot)?,
            Opcode::BYTE => binary(program, |index, value| value.byte(index))?,
            Opcode::SHL => binary(program, |shift, value| value.shl(shift))?,
            Opcode::SHR => binary(program, |shift, value| value.shr(shift))?,
            Opcode::SAR => binary(program, |shift, value| value.sar(shift))?,

            Opcode::SHA3 => {
                let offset = program.stack.pop()?.to_usize_saturating();
                let size = program.stack.pop()?.to_usize_saturating();
                let data = program.memory.read(offset, size);
                program.stack.push(Word::from(keccak256(&data)))?;
            }

            // Environment
            Opcode::ADDRESS => program.stack.push(Word::from(program.ctx.address))?,
            Opcode::BALANCE => {
                let address = program.stack.pop()?.to_address();
                let balance = program.repo.get_balance(&address);
                program.stack.push(Word::from(balance))?;
            }
            Opcode::ORIGIN => program.stack.push(Word::from(self.env.tx.origin))?,
            Opcode::CALLER => program.stack.push(Word::from(program.ctx.caller))?,
            Opcode::CALLVALUE => program.stack.push(Word::from(program.ctx.value))?,
            Opcode::CALLDATALOAD => {
                let offset = program.stack.pop()?;
                let value = program.ctx.data_word(offset);
                program.stack.push(value)?;
            }
            Opcode::CALLDATASIZE => program.stack.push(Word::from(program.ctx.data.len()))?,
            Opcode::CALLDATACOPY => {
                let (dest, offset, size) = pop_copy_args(program)?;
                let source = source_slice(&program.ctx.data, offset, size);
                program.memory.write_padded(dest, size, source);
            }
            Opcode::CODESIZE => program.stack.push(Word::from(program.code.len()))?,
            Opcode::CODECOPY => {
                let (dest, offset, size) = pop_copy_args(program)?;
                let source = source_slice(&program.code, offset, size);
                program.memory.write_padded(dest, size, source);
            }
            Opcode::GASPRICE => program.stack.push(Word::from(self.env.tx.gas_price))?,
            Opcode::EXTCODESIZE => {
                let address = program.stack.pop()?.to_address();
                let size = program.repo.get_code(&address).len();
                program.stack.push(Word::from(size))?;
            }
            Opcode::EXTCODECOPY => {
                let address = program.stack.pop()?.to_address();
                let (dest, offset, size) = pop_copy_args(program)?;
                let code = program.repo.get_code(&address);
                program
                    .memory
                    .write_padded(dest, size, source_slice(&code, offset, size));
            }
            Opcode::RETURNDATASIZE => {
                program.stack.push(Word::from(program.return_buffer.len()))?
            }
            Opcode::RETURNDATACOPY => {
                let dest = program.stack.pop()?;
                let offset = program.stack.pop()?;
                let size = program.stack.pop()?;
                let available = program.return_buffer.len();
                let in_bounds = offset
                    .as_u256()
                    .checked_add(size.as_u256())
                    .is_some_and(|end| end <= U256::from(available));
                if !in_bounds {
                    return Err(EvmError::ReturnDataOutOfBounds {
                        offset,
                        size,
                        available,
                    });
                }
                let start = offset.to_usize_saturating();
                let end = start + size.to_usize_saturating();
                let data = program.return_buffer.slice(start..end);
                program.memory.write(dest.to_usize_saturating(), &data);
            }
            Opcode::EXTCODEHASH => {
                let address = program.stack.pop()?.to_address();
                let hash = if program.repo.is_dead(&address) {
                    Word::ZERO
                } else {
                    Word::from(program.repo.get_code_hash(&address))
                };
                program.stack.push(hash)?;
            }

            // Block
            Opcode::BLOCKHASH => {
                let number = program.stack.pop()?;
                let hash = self.env.block.block_hash(self.block_hashes, number);
                program.stack.push(Word::from(hash))?;
            }
            Opcode::COINBASE => program.stack.push(Word::from(self.env.block.coinbase))?,
            Opcode::TIMESTAMP => program.stack.push(Word::from(self.env.block.timestamp))?,
            Opcode::NUMBER => program.stack.push(Word::from(self.env.block.number))?,
            Opcode::DIFFICULTY => program.stack.push(Word::from(self.env.block.difficulty))?,
            Opcode::GASLIMIT => program.stack.push(Word::from(self.env.block.gas_limit))?,

            // Stack, memory, storage and flow
            Opcode::POP => {
                program.stack.pop()?;
            }
            Opcode::MLOAD => {
                let offset = program.stack.pop()?.to_usize_saturating();
                let value = program.memory.read_word(offset);
                program.stack.push(value)?;
            }
            Opcode::MSTORE => {
                let offset = program.stack.pop()?.to_usize_saturating();
                let value = program.stack.pop()?;
                program.memory.write_word(offset, value);
            }
            Opcode::MSTORE8 => {
                let offset = program.stack.pop()?.to_usize_saturating();
                let value = program.stack.pop()?;
                program.memory.write_byte(offset, value.to_be_bytes()[31]);
            }
            Opcode::SLOAD => {
                let key = program.stack.pop()?.to_h256();
                let value = program.repo.get_storage_row(&program.ctx.address, &key);
                program.stack.push(Word::from(value))?;
            }
            Opcode::SSTORE => {
                program.verify_mutable()?;
                let key = program.stack.pop()?.to_h256();
                let value = program.stack.pop()?.to_h256();
                let address = program.ctx.address;
                program.repo.put_storage_row(&address, key, value);
            }
            Opcode::JUMP => {
                let dest = program.stack.pop()?;
                program.pc = program.verify_jump(dest)?;
                return Ok(());
            }
            Opcode::JUMPI => {
                let dest = program.stack.pop()?;
                let condition = program.stack.pop()?;
                if !condition.is_zero() {
                    program.pc = program.verify_jump(dest)?;
                    return Ok(());
                }
            }
            Opcode::PC => program.stack.push(Word::from(program.pc))?,
            Opcode::MSIZE => program.stack.push(Word::from(program.memory.size()))?,
            Opcode::GAS => program.stack.push(Word::from(program.gas_left()))?,
            Opcode::JUMPDEST => {}

            // Logging
            Opcode::LOG0 | Opcode::LOG1 | Opcode::LOG2 | Opcode::LOG3 | Opcode::LOG4 => {
                program.verify_mutable()?;
                let offset = program.stack.pop()?.to_usize_saturating();
                let size = program.stack.pop()?.to_usize_saturating();
                let topics = (0..op.log_topics())
                    .map(|_| program.stack.pop().map(Word::to_h256))
                    .collect::<EvmResult<Vec<_>>>()?;
                let data = Bytes::from(program.memory.read(offset, size));
                let address = program.ctx.address;
                program.result.add_log(Log {
                    address,
                    topics,
                    data,
                });
            }

            // System
            Opcode::CREATE | Opcode::CREATE2 => self.create(program, op)?,
            Opcode::CALL | Opcode::CALLCODE | Opcode::DELEGATECALL | Opcode::STATICCALL => {
                self.call(program, op, cost)?
            }
            Opcode::RETURN | Opcode::REVERT => {
                let offset = program.stack.pop()?.to_usize_saturating();
                let size = program.stack.pop()?.to_usize_saturating();
                program.result.output = Bytes::from(program.memory.read(offset, size));
                if op == Opcode::REVERT {
                    program.result.set_revert();
                }
                program.stop();
            }
            Opcode::SUICIDE => self.suicide(program)?,

            _ if op.push_size() > 0 => {
                let size = op.push_size();
                let value = program.immediate(size);
                program.stack.push(value)?;
                program.pc += 1 + size;
                return Ok(());
            }
            _ if op.dup_depth() > 0 => program.stack.dup(op.dup_depth())?,
            _ if op.swap_depth() > 0 => program.stack.swap(op.swap_depth())?,

            // INVALID
            _ => return Err(EvmError::InvalidOpcode(op as u8)),
        }

        program.pc += 1;
        Ok(())
    }
}

fn unary(program: &mut Program<'_>, f: impl FnOnce(Word) -> Word) -> EvmResult<()> {
    let a = program.stack.pop()?;
    program.stack.push(f(a))
}

fn binary(program: &mut Program<'_>, f: impl FnOnce(Word, Word) -> Word) -> EvmResult<()> {
    let a = program.stack.pop()?;
    let b = program.stack.pop()?;
    program.stack.push(f(a, b))
}

fn ternary(program: &mut Program<'_>, f: impl FnOnce(Word, Word, Word) -> Word) -> EvmResult<()> {
    let a = program.stack.pop()?;
    let b = program.stack.pop()?;
    let c = program.stack.pop()?;
    program.stack.push(f(a, b, c))
}

fn compare(program: &mut Program<'_>, f: impl FnOnce(Word, Word) -> bool) -> EvmResult<()> {
    let a = program.stack.pop()?;
    let b = program.stack.pop()?;
    program.stack.push(Word::from(f(a, b)))
}

/// `(memory offset, source offset, size)` of a *COPY instruction
fn pop_copy_args(program: &mut Program<'_>) -> EvmResult<(usize, Word, usize)> {
    let dest = program.stack.pop()?.to_usize_saturating();
    let offset = program.stack.pop()?;
    let size = program.stack.pop()?.to_usize_saturating();
    Ok((dest, offset, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_primitives::{Address, H256};
    use weave_state::{AccountState, InMemoryRepository};

    const CONTRACT: u64 = 0xc0de;

    fn run_with(
        spec: &ChainSpec,
        repo: &mut InMemoryRepository,
        code: &[u8],
        gas: u64,
    ) -> ExecutionResult {
        let env = Environment::default();
        let evm = Evm::new(spec, &env);
        let ctx = CallContext::new(
            Address::from_low_u64_be(CONTRACT),
            Address::from_low_u64_be(1),
            U256::zero(),
            Bytes::new(),
            gas,
        );
        evm.execute(Bytes::copy_from_slice(code), ctx, repo)
    }

    fn run(code: &[u8], gas: u64) -> ExecutionResult {
        let mut repo = InMemoryRepository::new();
        run_with(&ChainSpec::default(), &mut repo, code, gas)
    }

    /// Run `code` and return the word it stores at memory 0 and returns
    fn eval(code: &[u8]) -> Word {
        let mut full = code.to_vec();
        // PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
        full.extend_from_slice(&[0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3]);
        let result = run(&full, 100_000);
        assert!(result.is_success(), "{:?}", result.exception);
        Word::from_bytes(&result.output)
    }

    // ==================== Control ====================

    #[test]
    fn test_stop_and_end_of_code() {
        let result = run(&[0x00], 100);
        assert!(result.is_success());
        assert_eq!(result.gas_used, 0);

        // PUSH1 1 then run off the end
        let result = run(&[0x60, 0x01], 100);
        assert!(result.is_success());
        assert_eq!(result.gas_used, 3);
    }

    #[test]
    fn test_jump_and_jumpi() {
        // PUSH1 4 JUMP INVALID JUMPDEST PUSH1 7 ...
        assert_eq!(eval(&[0x60, 0x04, 0x56, 0xfe, 0x5b, 0x60, 0x07]), Word::from(7u64));
        // PUSH1 0 PUSH1 7 JUMPI PUSH1 1 JUMPDEST: falls through
        let value = eval(&[0x60, 0x00, 0x60, 0x07, 0x57, 0x60, 0x01, 0x5b]);
        assert_eq!(value, Word::ONE);
    }

    #[test]
    fn test_bad_jump_forfeits_gas() {
        let result = run(&[0x60, 0x03, 0x56, 0x00], 1000);
        assert!(matches!(
            result.exception,
            Some(EvmError::BadJumpDestination(_))
        ));
        assert_eq!(result.gas_used, 1000);
    }

    #[test]
    fn test_jump_into_push_data() {
        // PUSH1 4 JUMP PUSH1 0x5b: the 0x5b is an immediate
        let result = run(&[0x60, 0x04, 0x56, 0x60, 0x5b], 1000);
        assert!(result.exception.is_some());
    }

    #[test]
    fn test_invalid_opcode() {
        let result = run(&[0xfe], 500);
        assert_eq!(result.exception, Some(EvmError::InvalidOpcode(0xfe)));
        let result = run(&[0x0c], 500);
        assert_eq!(result.exception, Some(EvmError::InvalidOpcode(0x0c)));
    }

    #[test]
    fn test_fork_gated_opcode() {
        let mut repo = InMemoryRepository::new();
        // PUSH1 1 PUSH1 1 SHL
        let code = [0x60, 0x01, 0x60, 0x01, 0x1b];
        let result = run_with(&ChainSpec::byzantium(), &mut repo, &code, 1000);
        assert_eq!(result.exception, Some(EvmError::InvalidOpcode(0x1b)));
        let result = run_with(&ChainSpec::constantinople(), &mut repo, &code, 1000);
        assert!(result.is_success());
    }

    // ==================== Arithmetic ====================

    #[test]
    fn test_arithmetic() {
        // 2 + 3
        assert_eq!(eval(&[0x60, 0x03, 0x60, 0x02, 0x01]), Word::from(5u64));
        // 10 - 4 (a = top)
        assert_eq!(eval(&[0x60, 0x04, 0x60, 0x0a, 0x03]), Word::from(6u64));
        // 10 / 0
        assert_eq!(eval(&[0x60, 0x00, 0x60, 0x0a, 0x04]), Word::ZERO);
        // 2 ** 10
        assert_eq!(eval(&[0x60, 0x0a, 0x60, 0x02, 0x0a]), Word::from(1024u64));
        // (5 + 7) % 8
        assert_eq!(eval(&[0x60, 0x08, 0x60, 0x07, 0x60, 0x05, 0x08]), Word::from(4u64));
    }

    #[test]
    fn test_signextend() {
        // SIGNEXTEND(0, 0xff) = -1
        assert_eq!(eval(&[0x60, 0xff, 0x60, 0x00, 0x0b]), Word::MAX);
        // k >= 32 leaves the value unchanged
        assert_eq!(eval(&[0x60, 0xff, 0x60, 0x40, 0x0b]), Word::from(0xffu64));
    }

    #[test]
    fn test_comparison_and_shifts() {
        // 1 < 2
        assert_eq!(eval(&[0x60, 0x02, 0x60, 0x01, 0x10]), Word::ONE);
        // 1 << 4
        assert_eq!(eval(&[0x60, 0x01, 0x60, 0x04, 0x1b]), Word::from(16u64));
        // BYTE(31, 0xab)
        assert_eq!(eval(&[0x60, 0xab, 0x60, 0x1f, 0x1a]), Word::from(0xabu64));
    }

    // ==================== Memory and hashing ====================

    #[test]
    fn test_sha3_empty() {
        // PUSH1 0 PUSH1 0 SHA3
        let value = eval(&[0x60, 0x00, 0x60, 0x00, 0x20]);
        assert_eq!(value, Word::from(weave_crypto::EMPTY_KECCAK));
    }

    #[test]
    fn test_msize_and_memory_gas() {
        // PUSH1 0 MLOAD POP MSIZE
        assert_eq!(eval(&[0x60, 0x00, 0x51, 0x50, 0x59]), Word::from(32u64));

        // PUSH1 1 PUSH1 0 MSTORE: 3 + 3 + 3 + 3 (one word)
        let result = run(&[0x60, 0x01, 0x60, 0x00, 0x52], 100);
        assert_eq!(result.gas_used, 12);
    }

    #[test]
    fn test_memory_bound_overflow() {
        // PUSH4 0xffffffff MLOAD
        let result = run(&[0x63, 0xff, 0xff, 0xff, 0xff, 0x51], 1_000_000);
        assert_eq!(result.exception, Some(EvmError::GasOverflow));
    }

    #[test]
    fn test_returndatacopy_out_of_bounds() {
        // PUSH1 1 PUSH1 0 PUSH1 0 RETURNDATACOPY with an empty buffer
        let result = run(&[0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0x3e], 1000);
        assert!(matches!(
            result.exception,
            Some(EvmError::ReturnDataOutOfBounds { available: 0, .. })
        ));
    }

    #[test]
    fn test_calldata_zero_fill() {
        let spec = ChainSpec::default();
        let env = Environment::default();
        let evm = Evm::new(&spec, &env);
        let mut repo = InMemoryRepository::new();
        let ctx = CallContext::new(
            Address::from_low_u64_be(CONTRACT),
            Address::ZERO,
            U256::zero(),
            Bytes::from_static(&[0xaa]),
            10_000,
        );
        // PUSH1 0 CALLDATALOAD PUSH1 0 MSTORE PUSH1 32 PUSH1 0 RETURN
        let code = [0x60, 0x00, 0x35, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3];
        let result = evm.execute(Bytes::copy_from_slice(&code), ctx, &mut repo);
        assert_eq!(result.output[0], 0xaa);
        assert!(result.output[1..].iter().all(|b| *b == 0));
    }

    // ==================== Stack ====================

    #[test]
    fn test_stack_underflow() {
        let result = run(&[0x01], 100);
        assert!(matches!(
            result.exception,
            Some(EvmError::StackUnderflow { required: 2, size: 0 })
        ));
    }

    #[test]
    fn test_stack_overflow() {
        // 1025 x PUSH1 0
        let code: Vec<u8> = std::iter::repeat([0x60, 0x00]).take(1025).flatten().collect();
        let result = run(&code, 1_000_000);
        assert_eq!(result.exception, Some(EvmError::StackOverflow));
    }

    #[test]
    fn test_truncated_push_pads_right() {
        // PUSH2 0xaa (missing one byte) stops after pushing 0xaa00
        let result = run(&[0x61, 0xaa], 100);
        assert!(result.is_success());
        assert_eq!(result.gas_used, 3);
    }

    // ==================== Gas ====================

    #[test]
    fn test_out_of_gas() {
        let result = run(&[0x60, 0x01, 0x60, 0x01, 0x01], 8);
        assert_eq!(result.exception, Some(EvmError::OutOfGas));
        assert_eq!(result.gas_used, 8);
    }

    #[test]
    fn test_gas_opcode_after_charge() {
        // GAS costs 2 and reports what is left after paying it
        assert_eq!(eval(&[0x5a]), Word::from(100_000u64 - 2));
    }

    // ==================== Storage ====================

    fn slot(n: u64) -> H256 {
        H256::from_low_u64_be(n)
    }

    #[test]
    fn test_sstore_legacy_costs() {
        let spec = ChainSpec::petersburg();
        let mut repo = InMemoryRepository::new();
        // PUSH1 1 PUSH1 0 SSTORE: set
        let result = run_with(&spec, &mut repo, &[0x60, 0x01, 0x60, 0x00, 0x55], 100_000);
        assert_eq!(result.gas_used, 20006);
        assert_eq!(
            repo.get_storage_row(&Address::from_low_u64_be(CONTRACT), &slot(0)),
            slot(1)
        );

        // PUSH1 0 PUSH1 0 SSTORE: clear with refund
        let result = run_with(&spec, &mut repo, &[0x60, 0x00, 0x60, 0x00, 0x55], 100_000);
        assert_eq!(result.gas_used, 5006);
        assert_eq!(result.future_refund, 15000);
    }

    #[test]
    fn test_sstore_net_metering() {
        let spec = ChainSpec::constantinople();
        let mut root = InMemoryRepository::new();
        root.insert_account(
            Address::from_low_u64_be(CONTRACT),
            AccountState::with_balance(U256::zero()),
        );
        // set 1 then reset to 0 in the same frame: 20000 + 200, refund 19800
        let code = [0x60, 0x01, 0x60, 0x00, 0x55, 0x60, 0x00, 0x60, 0x00, 0x55];
        let mut track = root.start_tracking();
        let env = Environment::default();
        let evm = Evm::new(&spec, &env);
        let ctx = CallContext::new(
            Address::from_low_u64_be(CONTRACT),
            Address::from_low_u64_be(1),
            U256::zero(),
            Bytes::new(),
            100_000,
        );
        let result = evm.execute(Bytes::copy_from_slice(&code), ctx, &mut *track);
        assert!(result.is_success());
        assert_eq!(result.gas_used, 20000 + 200 + 12);
        assert_eq!(result.future_refund, 19800);
    }

    #[test]
    fn test_sstore_in_static_frame() {
        let spec = ChainSpec::default();
        let env = Environment::default();
        let evm = Evm::new(&spec, &env);
        let mut repo = InMemoryRepository::new();
        let mut ctx = CallContext::new(
            Address::from_low_u64_be(CONTRACT),
            Address::from_low_u64_be(1),
            U256::zero(),
            Bytes::new(),
            100_000,
        );
        ctx.is_static = true;
        let result = evm.execute(
            Bytes::from_static(&[0x60, 0x01, 0x60, 0x00, 0x55]),
            ctx,
            &mut repo,
        );
        assert_eq!(result.exception, Some(EvmError::StaticCallModification));
    }

    // ==================== Logs and revert ====================

    #[test]
    fn test_log_topics() {
        // PUSH1 0xaa PUSH1 0 PUSH1 0 LOG1
        let result = run(&[0x60, 0xaa, 0x60, 0x00, 0x60, 0x00, 0xa1], 10_000);
        assert!(result.is_success());
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].topics, vec![slot(0xaa)]);
        assert_eq!(result.gas_used, 9 + 375 + 375);
    }

    #[test]
    fn test_log_huge_payload_fails_fast() {
        // PUSH32 max PUSH1 0 LOG0
        let mut code = vec![0x7f];
        code.extend_from_slice(&[0xff; 32]);
        code.extend_from_slice(&[0x60, 0x00, 0xa0]);
        let result = run(&code, 10_000);
        assert_eq!(result.exception, Some(EvmError::OutOfGas));
    }

    #[test]
    fn test_revert_keeps_gas_and_output() {
        // PUSH1 0x2a PUSH1 0 MSTORE PUSH1 32 PUSH1 0 REVERT
        let code = [0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xfd];
        let result = run(&code, 1000);
        assert!(result.is_revert());
        assert!(result.exception.is_none());
        assert_eq!(result.gas_used, 18);
        assert_eq!(Word::from_bytes(&result.output), Word::from(0x2au64));
    }
}
