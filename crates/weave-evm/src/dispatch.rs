//! Nested call, create and self-destruct
//!
//! Every nested effect follows the same shape: verify depth and balance,
//! open an overlay and record an internal transaction, run the callee, then
//! commit or roll back and settle gas with the parent frame.

use crate::context::CallContext;
use crate::error::{EvmError, EvmResult};
use crate::interpreter::{Cost, Evm};
use crate::opcode::Opcode;
use crate::precompiles::PrecompiledContract;
use crate::program::Program;
use crate::result::{CallType, ExecutionResult, InternalTransaction};
use crate::word::Word;
use bytes::Bytes;
use rlp::RlpStream;
use tracing::debug;
use weave_crypto::keccak256;
use weave_primitives::{Address, H256, U256};
use weave_state::Repository;

/// Address of a contract created by `sender` at `nonce` (CREATE)
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(sender);
    stream.append(&nonce);
    Address::from_word(keccak256(&stream.out()).as_bytes())
}

/// Address of a contract created by `sender` with `salt` and `init_code` (CREATE2)
pub fn create2_address(sender: &Address, salt: &H256, init_code: &[u8]) -> Address {
    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(sender.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    preimage.extend_from_slice(keccak256(init_code).as_bytes());
    Address::from_word(keccak256(&preimage).as_bytes())
}

/// Operands of one CALL-family instruction
#[derive(Debug, Clone)]
struct MessageCall {
    call_type: CallType,
    /// Account whose code runs
    code_address: Address,
    /// Account whose storage and balance the callee acts on
    context_address: Address,
    value: U256,
    /// Gas handed to the callee, stipend included
    gas: u64,
    input: Bytes,
    out_offset: usize,
    out_size: usize,
}

impl<'a> Evm<'a> {
    /// Depth and balance checks shared by calls and creates
    fn verify_call(&self, program: &Program<'_>, value: U256) -> EvmResult<()> {
        if program.ctx.depth >= self.spec.max_call_depth {
            return Err(EvmError::CallDepthExceeded);
        }
        if program.repo.get_balance(&program.ctx.address) < value {
            return Err(EvmError::InsufficientBalance);
        }
        Ok(())
    }

    // ==================== Calls ====================

    pub(crate) fn call(&self, program: &mut Program<'_>, op: Opcode, cost: &Cost) -> EvmResult<()> {
        program.return_buffer = Bytes::new();

        // Requested gas was already resolved into `cost.call_gas`
        program.stack.pop()?;
        let code_address = program.stack.pop()?.to_address();
        let value = if op.call_has_value() {
            program.stack.pop()?.as_u256()
        } else {
            U256::zero()
        };
        let in_offset = program.stack.pop()?.to_usize_saturating();
        let in_size = program.stack.pop()?.to_usize_saturating();
        let out_offset = program.stack.pop()?.to_usize_saturating();
        let out_size = program.stack.pop()?.to_usize_saturating();

        if op == Opcode::CALL && !value.is_zero() {
            program.verify_mutable()?;
        }

        let mut gas = cost.call_gas;
        if !value.is_zero() {
            gas = gas.saturating_add(self.spec.fee_schedule.stipend_call);
        }
        let owner = program.ctx.address;
        let (call_type, context_address) = match op {
            Opcode::CALLCODE => (CallType::CallCode, owner),
            Opcode::DELEGATECALL => (CallType::DelegateCall, owner),
            Opcode::STATICCALL => (CallType::StaticCall, code_address),
            _ => (CallType::Call, code_address),
        };
        let msg = MessageCall {
            call_type,
            code_address,
            context_address,
            value,
            gas,
            input: Bytes::from(program.memory.read(in_offset, in_size)),
            out_offset,
            out_size,
        };

        if let Err(error) = self.verify_call(program, msg.value) {
            debug!(depth = program.ctx.depth, %error, "call rejected");
            let mut tx = self.internal_transaction(program, &msg);
            tx.reject_with(error);
            program.result.add_internal_transaction(tx);
            program.stack.push(Word::ZERO)?;
            program.result.refund_gas(msg.gas);
            return Ok(());
        }

        match self.spec.precompiles.get(&msg.code_address) {
            Some(contract) => self.call_precompile(program, &msg, contract),
            None => self.call_code(program, &msg),
        }
    }

    fn internal_transaction(&self, program: &Program<'_>, msg: &MessageCall) -> InternalTransaction {
        InternalTransaction::new(
            msg.call_type,
            program.ctx.depth,
            program.ctx.address,
            msg.code_address,
            msg.value,
            msg.gas,
            msg.input.clone(),
        )
    }

    fn call_code(&self, program: &mut Program<'_>, msg: &MessageCall) -> EvmResult<()> {
        let owner = program.ctx.address;
        let depth = program.ctx.depth;
        let code = program.repo.get_code(&msg.code_address);
        let tx = self.internal_transaction(program, msg);
        let position = program.result.add_internal_transaction(tx);

        let mut track = program.repo.start_tracking();
        track.transfer(&owner, &msg.context_address, msg.value);

        if code.is_empty() {
            track.commit();
            drop(track);
            program.stack.push(Word::ONE)?;
            program.result.refund_gas(msg.gas);
            return Ok(());
        }

        let (caller, value) = if msg.call_type == CallType::DelegateCall {
            (program.ctx.caller, program.ctx.value)
        } else {
            (owner, msg.value)
        };
        let ctx = CallContext {
            address: msg.context_address,
            caller,
            value,
            data: msg.input.clone(),
            gas: msg.gas,
            is_static: msg.call_type == CallType::StaticCall || program.ctx.is_static,
            depth: depth + 1,
        };

        let mut child_result = {
            let mut child = self.program(code, ctx, &mut *track);
            self.run(&mut child);
            child.into_result()
        };

        if child_result.is_success() {
            track.commit();
        } else {
            program
                .result
                .fail_internal_transaction(position, child_result.exception.clone());
            child_result.reject_internal_transactions();
            track.rollback();
        }
        drop(track);

        let success = child_result.is_success();
        let gas_left = child_result.gas_left();
        let output = child_result.output.clone();
        program.result.merge(child_result);

        program.stack.push(Word::from(success))?;
        program
            .memory
            .write_limited(msg.out_offset, msg.out_size, &output);
        program.return_buffer = output;
        program.result.refund_gas(gas_left);
        Ok(())
    }

    fn call_precompile(
        &self,
        program: &mut Program<'_>,
        msg: &MessageCall,
        contract: &dyn PrecompiledContract,
    ) -> EvmResult<()> {
        let owner = program.ctx.address;
        let required = contract.gas_for_data(&msg.input);
        let tx = self.internal_transaction(program, msg);
        let position = program.result.add_internal_transaction(tx);

        let mut track = program.repo.start_tracking();
        track.transfer(&owner, &msg.context_address, msg.value);

        if required > msg.gas {
            track.rollback();
            drop(track);
            program
                .result
                .fail_internal_transaction(position, Some(EvmError::OutOfGas));
            return program.stack.push(Word::ZERO);
        }

        match contract.execute(&msg.input) {
            Ok(output) => {
                track.commit();
                drop(track);
                program.result.refund_gas(msg.gas - required);
                program.stack.push(Word::ONE)?;
                program
                    .memory
                    .write_limited(msg.out_offset, msg.out_size, &output);
                program.return_buffer = Bytes::from(output);
            }
            Err(error) => {
                debug!(address = %msg.code_address, %error, "precompile failed");
                track.rollback();
                drop(track);
                program
                    .result
                    .fail_internal_transaction(position, Some(EvmError::Precompile(error)));
                program.stack.push(Word::ZERO)?;
            }
        }
        Ok(())
    }

    // ==================== Creates ====================

    pub(crate) fn create(&self, program: &mut Program<'_>, op: Opcode) -> EvmResult<()> {
        program.verify_mutable()?;
        program.return_buffer = Bytes::new();

        let value = program.stack.pop()?.as_u256();
        let offset = program.stack.pop()?.to_usize_saturating();
        let size = program.stack.pop()?.to_usize_saturating();
        let salt = if op == Opcode::CREATE2 {
            Some(program.stack.pop()?.to_h256())
        } else {
            None
        };

        let owner = program.ctx.address;
        let depth = program.ctx.depth;
        let init_code = Bytes::from(program.memory.read(offset, size));
        let (call_type, new_address) = match salt {
            Some(salt) => (
                CallType::Create2,
                create2_address(&owner, &salt, &init_code),
            ),
            None => (
                CallType::Create,
                contract_address(&owner, program.repo.get_nonce(&owner)),
            ),
        };

        if let Err(error) = self.verify_call(program, value) {
            debug!(depth, %error, "create rejected");
            let mut tx =
                InternalTransaction::new(call_type, depth, owner, new_address, value, 0, init_code);
            tx.reject_with(error);
            program.result.add_internal_transaction(tx);
            return program.stack.push(Word::ZERO);
        }
        let collision = program.repo.is_contract_exist(&new_address);

        // Survives a failed create
        program.repo.increase_nonce(&owner);

        let gas_limit = self.spec.max_forwardable(program.gas_left());
        program.result.spend_gas(gas_limit)?;
        let position = program.result.add_internal_transaction(InternalTransaction::new(
            call_type,
            depth,
            owner,
            new_address,
            value,
            gas_limit,
            init_code.clone(),
        ));

        let mut track = program.repo.start_tracking();
        let mut result = if collision {
            let mut result = ExecutionResult::new(gas_limit);
            result.set_fault(EvmError::CreateCollision(new_address));
            result
        } else {
            let old_balance = track.get_balance(&new_address);
            track.create_account(&new_address);
            if self.spec.eip161_empty_accounts {
                track.increase_nonce(&new_address);
            }
            track.add_balance(&new_address, old_balance);
            track.transfer(&owner, &new_address, value);

            if init_code.is_empty() {
                ExecutionResult::new(gas_limit)
            } else {
                let ctx = CallContext {
                    address: new_address,
                    caller: owner,
                    value,
                    data: Bytes::new(),
                    gas: gas_limit,
                    is_static: false,
                    depth: depth + 1,
                };
                let mut child = self.program(init_code, ctx, &mut *track);
                self.run(&mut child);
                child.into_result()
            }
        };
        self.deposit_code(&mut *track, &new_address, &mut result);

        if result.is_success() {
            track.commit();
            drop(track);
            program.stack.push(Word::from(new_address))?;
        } else {
            program
                .result
                .fail_internal_transaction(position, result.exception.clone());
            result.reject_internal_transactions();
            track.rollback();
            drop(track);
            program.stack.push(Word::ZERO)?;
            if result.is_revert() {
                program.return_buffer = result.output.clone();
            }
        }

        if result.exception.is_none() {
            program.result.refund_gas(result.gas_left());
        }
        debug!(
            depth,
            address = %new_address,
            success = result.is_success(),
            "contract create"
        );
        program.result.merge(result);
        Ok(())
    }

    /// Charge for and store the code returned by a successful init frame.
    ///
    /// When the deposit cannot be paid the contract either stays empty at no
    /// charge or the create faults, depending on the fork.
    pub fn deposit_code(
        &self,
        repo: &mut dyn Repository,
        address: &Address,
        result: &mut ExecutionResult,
    ) {
        if !result.is_success() {
            return;
        }
        let code = result.output.clone();
        let deposit = (code.len() as u64).saturating_mul(self.spec.fee_schedule.create_data);

        if deposit > result.gas_left() {
            if self.spec.create_empty_contract_on_oog {
                repo.save_code(address, Bytes::new());
            } else {
                result.set_fault(EvmError::DepositOutOfGas { required: deposit });
            }
            return;
        }
        if let Some(limit) = self.spec.max_code_size {
            if code.len() > limit {
                result.set_fault(EvmError::CodeSizeExceeded {
                    size: code.len(),
                    limit,
                });
                return;
            }
        }
        if result.spend_gas(deposit).is_ok() {
            repo.save_code(address, code);
        }
    }

    // ==================== Self-destruct ====================

    pub(crate) fn suicide(&self, program: &mut Program<'_>) -> EvmResult<()> {
        program.verify_mutable()?;
        let beneficiary = program.stack.pop()?.to_address();
        let owner = program.ctx.address;
        let balance = program.repo.get_balance(&owner);

        program.result.add_internal_transaction(InternalTransaction::new(
            CallType::Suicide,
            program.ctx.depth,
            owner,
            beneficiary,
            balance,
            0,
            Bytes::new(),
        ));

        if beneficiary == owner {
            program.repo.set_balance(&owner, U256::zero());
        } else {
            program.repo.transfer(&owner, &beneficiary, balance);
        }
        program.result.add_deleted_account(owner);
        program.stop();
        Ok(())
    }
}
