//! Transaction executor

use crate::error::{ExecutorError, ExecutorResult};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use weave_evm::{
    contract_address, BlockContext, CallContext, ChainSpec, Environment, EvmError, Evm,
    ExecutionResult, InternalTransaction, JumpDestCache, Log, TxContext,
};
use weave_primitives::{Address, H256, U256};
use weave_state::Repository;

/// A signed transfer, call or contract creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Recovered sender
    pub sender: Address,
    /// Recipient, `None` for contract creation
    pub to: Option<Address>,
    /// Sender nonce
    pub nonce: u64,
    /// Value transferred to the recipient or new contract
    pub value: U256,
    /// Calldata, or init code for a creation
    pub data: Bytes,
    /// Gas limit
    pub gas_limit: u64,
    /// Price per unit of gas
    pub gas_price: U256,
}

impl Transaction {
    /// Whether this transaction deploys a contract
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }

    /// Gas purchase cost, `None` on overflow
    pub fn gas_cost(&self) -> Option<U256> {
        U256::from(self.gas_limit).checked_mul(self.gas_price)
    }
}

/// Final classification of an included transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Completed without fault or REVERT
    Success,
    /// Ended by REVERT; gas charged, state unchanged
    Revert,
    /// Ended by a fault; all gas charged, state unchanged
    Failure,
}

/// Outcome of an included transaction
#[derive(Debug, Clone)]
pub struct TransactionReceipt {
    /// Final status
    pub status: TxStatus,
    /// Gas charged after refunds, including intrinsic gas
    pub gas_used: u64,
    /// Return data (revert data for [`TxStatus::Revert`])
    pub output: Bytes,
    /// Logs, empty unless successful
    pub logs: Vec<Log>,
    /// Address of the deployed contract
    pub contract_address: Option<Address>,
    /// Nested calls, creates and self-destructs
    pub internal_transactions: Vec<InternalTransaction>,
    /// Fault that ended the top-level frame
    pub error: Option<EvmError>,
}

impl TransactionReceipt {
    /// Whether the transaction succeeded
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// Receipts of a batch executed under one block
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One receipt per transaction, in order
    pub receipts: Vec<TransactionReceipt>,
    /// Total gas used
    pub gas_used: u64,
}

/// Executes transactions of one block against a [`Repository`]
pub struct TransactionExecutor {
    spec: ChainSpec,
    block: BlockContext,
    block_hashes: HashMap<u64, H256>,
    jump_dests: JumpDestCache,
}

impl TransactionExecutor {
    /// Create an executor for `block` under `spec`
    pub fn new(spec: ChainSpec, block: BlockContext) -> Self {
        Self {
            spec,
            block,
            block_hashes: HashMap::new(),
            jump_dests: JumpDestCache::new(),
        }
    }

    /// Answer BLOCKHASH from `hashes`
    pub fn with_block_hashes(mut self, hashes: HashMap<u64, H256>) -> Self {
        self.block_hashes = hashes;
        self
    }

    /// Share a jump-destination cache with other executors
    pub fn with_jump_cache(mut self, cache: JumpDestCache) -> Self {
        self.jump_dests = cache;
        self
    }

    /// Fork rules
    pub fn spec(&self) -> &ChainSpec {
        &self.spec
    }

    /// Block the executor runs in
    pub fn block(&self) -> &BlockContext {
        &self.block
    }

    /// Execute `txs` in order inside one overlay.
    ///
    /// A rejected transaction or an exhausted block gas limit rolls the whole
    /// batch back.
    pub fn execute_batch(
        &self,
        repo: &mut dyn Repository,
        txs: &[Transaction],
    ) -> ExecutorResult<BatchResult> {
        let mut track = repo.start_tracking();
        let mut receipts = Vec::with_capacity(txs.len());
        let mut gas_used = 0u64;

        for tx in txs {
            let reserved = gas_used.saturating_add(tx.gas_limit);
            if self.block.gas_limit > 0 && reserved > self.block.gas_limit {
                track.rollback();
                return Err(ExecutorError::BlockGasLimitExceeded {
                    used: reserved,
                    limit: self.block.gas_limit,
                });
            }
            match self.execute(&mut *track, tx) {
                Ok(receipt) => {
                    gas_used += receipt.gas_used;
                    receipts.push(receipt);
                }
                Err(error) => {
                    track.rollback();
                    return Err(error);
                }
            }
        }

        track.commit();
        Ok(BatchResult { receipts, gas_used })
    }

    /// Execute one transaction.
    ///
    /// An `Err` means the transaction was rejected and `repo` is untouched.
    /// Otherwise it was included: gas is charged even when the receipt
    /// reports a revert or a fault.
    pub fn execute(
        &self,
        repo: &mut dyn Repository,
        tx: &Transaction,
    ) -> ExecutorResult<TransactionReceipt> {
        let intrinsic = match self.validate(repo, tx) {
            Ok(intrinsic) => intrinsic,
            Err(error) => {
                warn!(sender = %tx.sender, nonce = tx.nonce, %error, "transaction rejected");
                return Err(error);
            }
        };
        let gas_cost = tx.gas_cost().ok_or(ExecutorError::CostOverflow)?;

        repo.increase_nonce(&tx.sender);
        let bought = repo.sub_balance(&tx.sender, gas_cost);
        debug_assert!(bought, "validated balance must cover the gas purchase");

        let env = Environment {
            block: self.block.clone(),
            tx: TxContext {
                origin: tx.sender,
                gas_price: tx.gas_price,
            },
        };
        let evm = Evm::new(&self.spec, &env)
            .with_block_hashes(&self.block_hashes)
            .with_jump_cache(self.jump_dests.clone());

        let gas = tx.gas_limit - intrinsic;
        let (mut result, created) = {
            let mut track = repo.start_transaction();
            let outcome = match tx.to {
                Some(to) => (self.call(&evm, &mut *track, tx, to, gas), None),
                None => {
                    let address = contract_address(&tx.sender, tx.nonce);
                    (self.create(&evm, &mut *track, tx, address, gas), Some(address))
                }
            };
            if outcome.0.is_success() {
                track.commit();
            } else {
                track.rollback();
            }
            outcome
        };

        let success = result.is_success();
        if !success {
            result.reject_internal_transactions();
        }

        let mut gas_used = intrinsic + result.gas_used;
        if success {
            let deleted = result.deleted_accounts.len() as u64;
            let refund = (result.future_refund.max(0) as u64).saturating_add(
                self.spec
                    .fee_schedule
                    .suicide_refund
                    .saturating_mul(deleted),
            );
            gas_used -= refund.min(gas_used / 2);
        }

        repo.add_balance(
            &tx.sender,
            U256::from(tx.gas_limit - gas_used) * tx.gas_price,
        );
        repo.add_balance(&self.block.coinbase, U256::from(gas_used) * tx.gas_price);

        if success {
            for address in &result.deleted_accounts {
                debug!(%address, "deleting self-destructed account");
                repo.delete(address);
            }
        }

        let status = if success {
            TxStatus::Success
        } else if result.is_revert() {
            TxStatus::Revert
        } else {
            TxStatus::Failure
        };
        info!(
            sender = %tx.sender,
            nonce = tx.nonce,
            ?status,
            gas_used,
            error = result.exception.as_ref().map(|e| e.to_string()),
            "transaction executed"
        );

        Ok(TransactionReceipt {
            status,
            gas_used,
            output: result.output,
            logs: if success { result.logs } else { Vec::new() },
            contract_address: created.filter(|_| success),
            internal_transactions: result.internal_transactions,
            error: result.exception,
        })
    }

    /// Check nonce, intrinsic gas and balance; returns the intrinsic gas
    fn validate(&self, repo: &dyn Repository, tx: &Transaction) -> ExecutorResult<u64> {
        let expected = repo.get_nonce(&tx.sender);
        if tx.nonce != expected {
            return Err(ExecutorError::NonceMismatch {
                expected,
                got: tx.nonce,
            });
        }

        let intrinsic = self
            .spec
            .fee_schedule
            .intrinsic_gas(&tx.data, tx.is_create());
        if intrinsic > tx.gas_limit {
            return Err(ExecutorError::IntrinsicGas {
                required: intrinsic,
                limit: tx.gas_limit,
            });
        }

        let required = tx
            .gas_cost()
            .and_then(|cost| cost.checked_add(tx.value))
            .ok_or(ExecutorError::CostOverflow)?;
        let available = repo.get_balance(&tx.sender);
        if available < required {
            return Err(ExecutorError::InsufficientBalance {
                required,
                available,
            });
        }
        Ok(intrinsic)
    }

    /// Transfer value and run the recipient's code or precompile
    fn call(
        &self,
        evm: &Evm<'_>,
        repo: &mut dyn Repository,
        tx: &Transaction,
        to: Address,
        gas: u64,
    ) -> ExecutionResult {
        let moved = repo.transfer(&tx.sender, &to, tx.value);
        debug_assert!(moved, "validated balance must cover the call value");

        if let Some(contract) = self.spec.precompiles.get(&to) {
            let mut result = ExecutionResult::new(gas);
            let required = contract.gas_for_data(&tx.data);
            if let Err(error) = result.spend_gas(required) {
                result.set_fault(error);
                return result;
            }
            match contract.execute(&tx.data) {
                Ok(output) => result.output = Bytes::from(output),
                Err(error) => result.set_fault(error.into()),
            }
            return result;
        }

        let code = repo.get_code(&to);
        if code.is_empty() {
            return ExecutionResult::new(gas);
        }
        let ctx = CallContext::new(to, tx.sender, tx.value, tx.data.clone(), gas);
        evm.execute(code, ctx, repo)
    }

    /// Open the new account, run the init code and deposit the returned code
    fn create(
        &self,
        evm: &Evm<'_>,
        repo: &mut dyn Repository,
        tx: &Transaction,
        address: Address,
        gas: u64,
    ) -> ExecutionResult {
        if repo.is_contract_exist(&address) {
            let mut result = ExecutionResult::new(gas);
            result.set_fault(EvmError::CreateCollision(address));
            return result;
        }

        let old_balance = repo.get_balance(&address);
        repo.create_account(&address);
        if self.spec.eip161_empty_accounts {
            repo.increase_nonce(&address);
        }
        repo.add_balance(&address, old_balance);
        let moved = repo.transfer(&tx.sender, &address, tx.value);
        debug_assert!(moved, "validated balance must cover the endowment");

        let mut result = if tx.data.is_empty() {
            ExecutionResult::new(gas)
        } else {
            let ctx = CallContext::new(address, tx.sender, tx.value, Bytes::new(), gas);
            evm.execute(tx.data.clone(), ctx, repo)
        };
        evm.deposit_code(repo, &address, &mut result);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_state::{AccountState, InMemoryRepository};

    const GWEI: u64 = 1_000_000_000;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::exp10(18)
    }

    fn executor() -> TransactionExecutor {
        let block = BlockContext {
            coinbase: addr(0xc0),
            number: 1,
            gas_limit: 10_000_000,
            ..Default::default()
        };
        TransactionExecutor::new(ChainSpec::default(), block)
    }

    fn funded(balance: U256) -> InMemoryRepository {
        let mut repo = InMemoryRepository::new();
        repo.insert_account(addr(0xa), AccountState::with_balance(balance));
        repo
    }

    fn transfer(value: U256, gas_limit: u64) -> Transaction {
        Transaction {
            sender: addr(0xa),
            to: Some(addr(0xb)),
            nonce: 0,
            value,
            data: Bytes::new(),
            gas_limit,
            gas_price: U256::from(GWEI),
        }
    }

    // ==================== Validation ====================

    #[test]
    fn test_nonce_mismatch_rejected() {
        let mut repo = funded(ether(1));
        let tx = Transaction {
            nonce: 5,
            ..transfer(U256::zero(), 21_000)
        };
        assert_eq!(
            executor().execute(&mut repo, &tx).unwrap_err(),
            ExecutorError::NonceMismatch {
                expected: 0,
                got: 5
            }
        );
        assert_eq!(repo.get_balance(&addr(0xa)), ether(1));
    }

    #[test]
    fn test_intrinsic_gas_rejected() {
        let mut repo = funded(ether(1));
        let tx = Transaction {
            data: Bytes::from_static(&[0x00, 0x01]),
            ..transfer(U256::zero(), 21_000)
        };
        assert_eq!(
            executor().execute(&mut repo, &tx).unwrap_err(),
            ExecutorError::IntrinsicGas {
                required: 21_000 + 4 + 68,
                limit: 21_000
            }
        );
        assert_eq!(repo.get_nonce(&addr(0xa)), 0);
    }

    #[test]
    fn test_insufficient_balance_rejected() {
        let mut repo = funded(ether(1));
        let err = executor()
            .execute(&mut repo, &transfer(ether(1), 21_000))
            .unwrap_err();
        assert!(matches!(err, ExecutorError::InsufficientBalance { .. }));
        assert_eq!(repo.get_balance(&addr(0xa)), ether(1));
        assert_eq!(repo.get_nonce(&addr(0xa)), 0);
    }

    #[test]
    fn test_cost_overflow_rejected() {
        let mut repo = funded(ether(1));
        let tx = Transaction {
            gas_price: U256::MAX,
            ..transfer(U256::zero(), 21_000)
        };
        assert_eq!(
            executor().execute(&mut repo, &tx).unwrap_err(),
            ExecutorError::CostOverflow
        );
    }

    // ==================== Transfers ====================

    #[test]
    fn test_plain_transfer() {
        let mut repo = funded(ether(10));
        let receipt = executor()
            .execute(&mut repo, &transfer(ether(1), 22_000))
            .unwrap();

        assert!(receipt.is_success());
        assert_eq!(receipt.gas_used, 21_000);
        let fee = U256::from(21_000u64 * GWEI);
        assert_eq!(repo.get_balance(&addr(0xa)), ether(9) - fee);
        assert_eq!(repo.get_balance(&addr(0xb)), ether(1));
        assert_eq!(repo.get_balance(&addr(0xc0)), fee);
        assert_eq!(repo.get_nonce(&addr(0xa)), 1);
    }

    #[test]
    fn test_precompile_recipient() {
        let mut repo = funded(ether(1));
        let tx = Transaction {
            to: Some(addr(4)),
            data: Bytes::from_static(&[1, 2, 3]),
            ..transfer(U256::zero(), 30_000)
        };
        let receipt = executor().execute(&mut repo, &tx).unwrap();

        assert!(receipt.is_success());
        assert_eq!(receipt.output.as_ref(), &[1, 2, 3]);
        assert_eq!(receipt.gas_used, 21_000 + 3 * 68 + 15 + 3);
    }

    // ==================== Contract Calls ====================

    #[test]
    fn test_revert_charges_gas_and_keeps_value() {
        let mut repo = funded(ether(1));
        // PUSH1 1 PUSH1 0 SSTORE PUSH1 0 PUSH1 0 REVERT
        let code = [0x60, 0x01, 0x60, 0x00, 0x55, 0x60, 0x00, 0x60, 0x00, 0xfd];
        repo.insert_account(
            addr(0xb),
            AccountState {
                code: Bytes::copy_from_slice(&code),
                ..Default::default()
            },
        );

        let receipt = executor()
            .execute(&mut repo, &transfer(U256::from(7), 100_000))
            .unwrap();

        assert_eq!(receipt.status, TxStatus::Revert);
        assert_eq!(receipt.gas_used, 21_000 + 3 + 3 + 20_000 + 3 + 3);
        assert!(receipt.error.is_none());
        assert_eq!(repo.get_balance(&addr(0xb)), U256::zero());
        assert_eq!(repo.get_storage_row(&addr(0xb), &H256::ZERO), H256::ZERO);
        assert_eq!(repo.get_nonce(&addr(0xa)), 1);
    }

    #[test]
    fn test_fault_forfeits_all_gas() {
        let mut repo = funded(ether(1));
        repo.insert_account(
            addr(0xb),
            AccountState {
                code: Bytes::from_static(&[0xfe]),
                ..Default::default()
            },
        );

        let receipt = executor()
            .execute(&mut repo, &transfer(U256::zero(), 50_000))
            .unwrap();

        assert_eq!(receipt.status, TxStatus::Failure);
        assert_eq!(receipt.gas_used, 50_000);
        assert_eq!(receipt.error, Some(EvmError::InvalidOpcode(0xfe)));
        assert_eq!(
            repo.get_balance(&addr(0xc0)),
            U256::from(50_000u64 * GWEI)
        );
    }

    #[test]
    fn test_storage_clear_refund_is_capped() {
        let mut repo = funded(ether(1));
        // PUSH1 0 PUSH1 0 SSTORE
        repo.insert_account(
            addr(0xb),
            AccountState {
                code: Bytes::from_static(&[0x60, 0x00, 0x60, 0x00, 0x55]),
                ..Default::default()
            },
        );
        repo.put_storage_row(&addr(0xb), H256::ZERO, H256::from_low_u64_be(1));

        let spec = ChainSpec::petersburg();
        let receipt = TransactionExecutor::new(spec, BlockContext::default())
            .execute(&mut repo, &transfer(U256::zero(), 100_000))
            .unwrap();

        let raw = 21_000 + 3 + 3 + 5_000;
        assert!(receipt.is_success());
        assert_eq!(receipt.gas_used, raw - raw / 2);
        assert_eq!(repo.get_storage_row(&addr(0xb), &H256::ZERO), H256::ZERO);
    }

    #[test]
    fn test_self_destruct_deletes_account() {
        let mut repo = funded(ether(1));
        // PUSH1 0xee SELFDESTRUCT
        let mut contract = AccountState::with_balance(U256::from(500));
        contract.code = Bytes::from_static(&[0x60, 0xee, 0xff]);
        repo.insert_account(addr(0xb), contract);

        let receipt = executor()
            .execute(&mut repo, &transfer(U256::zero(), 100_000))
            .unwrap();

        assert!(receipt.is_success());
        assert!(!repo.exists(&addr(0xb)));
        assert_eq!(repo.get_balance(&addr(0xee)), U256::from(500));
        assert_eq!(receipt.gas_used, 21_000 + 3 + 5_000 + 25_000 - 24_000);
    }

    // ==================== Creation ====================

    #[test]
    fn test_create_deploys_code() {
        let mut repo = funded(ether(1));
        // returns the single byte 0x00
        let init = [0x60, 0x00, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3];
        let tx = Transaction {
            to: None,
            data: Bytes::copy_from_slice(&init),
            ..transfer(U256::from(9), 100_000)
        };

        let receipt = executor().execute(&mut repo, &tx).unwrap();

        let expected = contract_address(&addr(0xa), 0);
        assert!(receipt.is_success(), "{:?}", receipt.error);
        assert_eq!(receipt.contract_address, Some(expected));
        assert_eq!(repo.get_code(&expected).as_ref(), &[0x00]);
        assert_eq!(repo.get_balance(&expected), U256::from(9));
        assert_eq!(repo.get_nonce(&expected), 1);
        assert_eq!(repo.get_nonce(&addr(0xa)), 1);
    }

    #[test]
    fn test_create_collision_fails() {
        let mut repo = funded(ether(1));
        let target = contract_address(&addr(0xa), 0);
        repo.insert_account(
            target,
            AccountState {
                code: Bytes::from_static(&[0x00]),
                ..Default::default()
            },
        );
        let tx = Transaction {
            to: None,
            ..transfer(U256::zero(), 60_000)
        };

        let receipt = executor().execute(&mut repo, &tx).unwrap();

        assert_eq!(receipt.status, TxStatus::Failure);
        assert_eq!(receipt.gas_used, 60_000);
        assert_eq!(receipt.contract_address, None);
        assert_eq!(receipt.error, Some(EvmError::CreateCollision(target)));
    }

    // ==================== Batches ====================

    #[test]
    fn test_batch_accumulates_gas() {
        let mut repo = funded(ether(10));
        let txs = [
            transfer(ether(1), 21_000),
            Transaction {
                nonce: 1,
                ..transfer(ether(1), 21_000)
            },
        ];
        let batch = executor().execute_batch(&mut repo, &txs).unwrap();

        assert_eq!(batch.receipts.len(), 2);
        assert_eq!(batch.gas_used, 42_000);
        assert_eq!(repo.get_balance(&addr(0xb)), ether(2));
    }

    /// Contract storing its first calldata word at slot 0
    fn store_word_contract(repo: &mut InMemoryRepository) {
        // PUSH1 0 CALLDATALOAD PUSH1 0 SSTORE
        repo.insert_account(
            addr(0xb),
            AccountState {
                code: Bytes::from_static(&[0x60, 0x00, 0x35, 0x60, 0x00, 0x55]),
                ..Default::default()
            },
        );
    }

    fn store_word(nonce: u64, value: u64) -> Transaction {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        Transaction {
            nonce,
            data: Bytes::copy_from_slice(&word),
            ..transfer(U256::zero(), 100_000)
        }
    }

    #[test]
    fn test_batch_prices_storage_per_transaction() {
        let intrinsic = 21_000 + 31 * 4 + 68;
        let first = intrinsic + 3 + 3 + 3 + 20_000;
        let second = intrinsic + 3 + 3 + 3 + 5_000;
        let txs = [store_word(0, 1), store_word(1, 2)];

        let mut sequential = funded(ether(1));
        store_word_contract(&mut sequential);
        let exec = executor();
        let one = exec.execute(&mut sequential, &txs[0]).unwrap();
        let two = exec.execute(&mut sequential, &txs[1]).unwrap();
        assert_eq!((one.gas_used, two.gas_used), (first, second));

        let mut batched = funded(ether(1));
        store_word_contract(&mut batched);
        let batch = exec.execute_batch(&mut batched, &txs).unwrap();
        assert_eq!(batch.receipts[0].gas_used, first);
        assert_eq!(batch.receipts[1].gas_used, second);
        assert_eq!(
            batched.get_storage_row(&addr(0xb), &H256::ZERO),
            H256::from_low_u64_be(2)
        );
    }

    #[test]
    fn test_uncommitted_block_writes_are_transaction_originals() {
        let mut repo = funded(ether(1));
        // PUSH1 2 PUSH1 0 SSTORE
        repo.insert_account(
            addr(0xc),
            AccountState {
                code: Bytes::from_static(&[0x60, 0x02, 0x60, 0x00, 0x55]),
                ..Default::default()
            },
        );
        repo.put_storage_row(&addr(0xc), H256::ZERO, H256::from_low_u64_be(1));
        let tx = Transaction {
            to: Some(addr(0xc)),
            ..transfer(U256::zero(), 100_000)
        };

        let mut block = repo.start_tracking();
        block.put_storage_row(&addr(0xc), H256::ZERO, H256::from_low_u64_be(3));
        let receipt = executor().execute(&mut *block, &tx).unwrap();

        // 3 -> 2 on a clean slot is a reset, not a dirty write
        assert_eq!(receipt.gas_used, 21_000 + 3 + 3 + 5_000);
    }

    #[test]
    fn test_batch_rejection_rolls_back() {
        let mut root = funded(ether(10));
        let txs = [
            transfer(ether(1), 21_000),
            transfer(ether(1), 21_000),
        ];

        let mut track = root.start_tracking();
        let err = executor().execute_batch(&mut *track, &txs).unwrap_err();
        track.commit();
        drop(track);

        assert!(matches!(err, ExecutorError::NonceMismatch { .. }));
        assert_eq!(root.get_balance(&addr(0xb)), U256::zero());
        assert_eq!(root.get_nonce(&addr(0xa)), 0);
    }

    #[test]
    fn test_batch_block_gas_limit() {
        let mut repo = funded(ether(10));
        let block = BlockContext {
            gas_limit: 30_000,
            ..Default::default()
        };
        let txs = [
            transfer(ether(1), 21_000),
            Transaction {
                nonce: 1,
                ..transfer(ether(1), 21_000)
            },
        ];
        let err = TransactionExecutor::new(ChainSpec::default(), block)
            .execute_batch(&mut repo, &txs)
            .unwrap_err();
        assert_eq!(
            err,
            ExecutorError::BlockGasLimitExceeded {
                used: 42_000,
                limit: 30_000
            }
        );
    }
}
