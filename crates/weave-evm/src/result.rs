//! Frame outcome: gas accounting, output, logs and call trace

use crate::error::{EvmError, EvmResult};
use crate::opcode::Opcode;
use bytes::Bytes;
use std::collections::BTreeSet;
use weave_primitives::{Address, H256, U256};

/// Log entry emitted by LOG0-LOG4
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    /// Emitting contract
    pub address: Address,
    /// Topics (0-4)
    pub topics: Vec<H256>,
    /// Payload
    pub data: Bytes,
}

/// Kind of nested effect recorded in the call trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallType {
    /// CALL
    Call,
    /// CALLCODE
    CallCode,
    /// DELEGATECALL
    DelegateCall,
    /// STATICCALL
    StaticCall,
    /// CREATE
    Create,
    /// CREATE2
    Create2,
    /// SUICIDE
    Suicide,
}

impl CallType {
    /// Trace kind of a CALL-family or CREATE-family opcode
    pub fn from_opcode(op: Opcode) -> Option<Self> {
        match op {
            Opcode::CALL => Some(CallType::Call),
            Opcode::CALLCODE => Some(CallType::CallCode),
            Opcode::DELEGATECALL => Some(CallType::DelegateCall),
            Opcode::STATICCALL => Some(CallType::StaticCall),
            Opcode::CREATE => Some(CallType::Create),
            Opcode::CREATE2 => Some(CallType::Create2),
            Opcode::SUICIDE => Some(CallType::Suicide),
            _ => None,
        }
    }

    /// Lowercase name used in traces
    pub fn as_str(self) -> &'static str {
        match self {
            CallType::Call => "call",
            CallType::CallCode => "callcode",
            CallType::DelegateCall => "delegatecall",
            CallType::StaticCall => "staticcall",
            CallType::Create => "create",
            CallType::Create2 => "create2",
            CallType::Suicide => "suicide",
        }
    }
}

/// One attempted nested call, create or self-destruct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalTransaction {
    /// Effect kind
    pub call_type: CallType,
    /// Depth of the frame that issued it
    pub depth: usize,
    /// Sequence number within the issuing frame
    pub index: usize,
    /// Issuing account
    pub sender: Address,
    /// Target account (new contract address for creates)
    pub receiver: Address,
    /// Value moved
    pub value: U256,
    /// Gas handed to the callee
    pub gas: u64,
    /// Calldata or init code
    pub data: Bytes,
    /// Unwound by a failure in this or an enclosing frame
    pub rejected: bool,
    /// Fault that stopped the effect itself; `None` after a REVERT or when
    /// only an enclosing frame failed
    pub error: Option<EvmError>,
}

impl InternalTransaction {
    /// Unrejected record; `index` is stamped when it is added to a result
    pub fn new(
        call_type: CallType,
        depth: usize,
        sender: Address,
        receiver: Address,
        value: U256,
        gas: u64,
        data: Bytes,
    ) -> Self {
        Self {
            call_type,
            depth,
            index: 0,
            sender,
            receiver,
            value,
            gas,
            data,
            rejected: false,
            error: None,
        }
    }

    /// Mark as unwound
    pub fn reject(&mut self) {
        self.rejected = true;
    }

    /// Mark as unwound by `error`
    pub fn reject_with(&mut self, error: EvmError) {
        self.rejected = true;
        self.error = Some(error);
    }
}

/// Outcome of one frame
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Gas the frame started with
    pub gas_limit: u64,
    /// Gas consumed so far
    pub gas_used: u64,
    /// RETURN / REVERT data
    pub output: Bytes,
    /// Fault that ended the frame
    pub exception: Option<EvmError>,
    /// Ended by REVERT
    pub reverted: bool,
    /// Emitted logs
    pub logs: Vec<Log>,
    /// Self-destructed accounts
    pub deleted_accounts: BTreeSet<Address>,
    /// Nested calls, creates and self-destructs, including those of child frames
    pub internal_transactions: Vec<InternalTransaction>,
    /// Deferred refund; net-metered SSTORE can drive it negative
    pub future_refund: i64,
}

impl ExecutionResult {
    /// Fresh result for a frame given `gas_limit`
    pub fn new(gas_limit: u64) -> Self {
        Self {
            gas_limit,
            ..Default::default()
        }
    }

    /// Gas still available
    pub fn gas_left(&self) -> u64 {
        self.gas_limit.saturating_sub(self.gas_used)
    }

    /// Consume `amount`, failing without change when not enough is left
    pub fn spend_gas(&mut self, amount: u64) -> EvmResult<()> {
        if amount > self.gas_left() {
            return Err(EvmError::OutOfGas);
        }
        self.gas_used += amount;
        Ok(())
    }

    /// Return `amount` of previously consumed gas
    pub fn refund_gas(&mut self, amount: u64) {
        self.gas_used = self.gas_used.saturating_sub(amount);
    }

    /// Consume everything that is left
    pub fn spend_all_gas(&mut self) {
        self.gas_used = self.gas_limit;
    }

    /// Adjust the deferred refund
    pub fn add_future_refund(&mut self, delta: i64) {
        self.future_refund += delta;
    }

    /// Drop the deferred refund
    pub fn reset_future_refund(&mut self) {
        self.future_refund = 0;
    }

    /// Record the fault that ended the frame
    pub fn set_exception(&mut self, error: EvmError) {
        self.exception = Some(error);
    }

    /// Record a fault: all gas, the deferred refund and the output are forfeited
    pub fn set_fault(&mut self, error: EvmError) {
        self.spend_all_gas();
        self.reset_future_refund();
        self.output = Bytes::new();
        self.set_exception(error);
    }

    /// Mark the frame as reverted
    pub fn set_revert(&mut self) {
        self.reverted = true;
    }

    /// Ended by REVERT
    pub fn is_revert(&self) -> bool {
        self.reverted
    }

    /// Ended without fault and without REVERT
    pub fn is_success(&self) -> bool {
        self.exception.is_none() && !self.reverted
    }

    /// Append a log entry
    pub fn add_log(&mut self, log: Log) {
        self.logs.push(log);
    }

    /// Schedule `address` for deletion at the end of the transaction
    pub fn add_deleted_account(&mut self, address: Address) {
        self.deleted_accounts.insert(address);
    }

    /// Append `tx`, stamping its sequence index; returns its position
    pub fn add_internal_transaction(&mut self, mut tx: InternalTransaction) -> usize {
        let position = self.internal_transactions.len();
        tx.index = position;
        self.internal_transactions.push(tx);
        position
    }

    /// Mark the record at `position` as unwound, keeping the fault that
    /// stopped it
    pub fn fail_internal_transaction(&mut self, position: usize, error: Option<EvmError>) {
        if let Some(tx) = self.internal_transactions.get_mut(position) {
            match error {
                Some(error) => tx.reject_with(error),
                None => tx.reject(),
            }
        }
    }

    /// Mark every record as unwound
    pub fn reject_internal_transactions(&mut self) {
        for tx in &mut self.internal_transactions {
            tx.reject();
        }
    }

    /// Fold a child frame's result into this one.
    ///
    /// The child's trace is always kept. Logs, deletions and the deferred
    /// refund only carry over when the child succeeded.
    pub fn merge(&mut self, child: ExecutionResult) {
        let success = child.is_success();
        self.internal_transactions.extend(child.internal_transactions);
        if success {
            self.logs.extend(child.logs);
            self.deleted_accounts.extend(child.deleted_accounts);
            self.future_refund += child.future_refund;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn call_tx(n: u64) -> InternalTransaction {
        InternalTransaction::new(
            CallType::Call,
            1,
            addr(1),
            addr(n),
            U256::zero(),
            100,
            Bytes::new(),
        )
    }

    fn child_with_effects() -> ExecutionResult {
        let mut child = ExecutionResult::new(1000);
        child.add_log(Log {
            address: addr(2),
            ..Default::default()
        });
        child.add_deleted_account(addr(2));
        child.add_future_refund(15000);
        child.add_internal_transaction(call_tx(3));
        child
    }

    // ==================== Gas ====================

    #[test]
    fn test_spend_and_refund() {
        let mut result = ExecutionResult::new(100);
        result.spend_gas(60).unwrap();
        assert_eq!(result.gas_left(), 40);
        assert_eq!(result.spend_gas(41), Err(EvmError::OutOfGas));
        assert_eq!(result.gas_used, 60);

        result.refund_gas(10);
        assert_eq!(result.gas_left(), 50);
        result.spend_all_gas();
        assert_eq!(result.gas_left(), 0);
    }

    #[test]
    fn test_future_refund_signed() {
        let mut result = ExecutionResult::new(0);
        result.add_future_refund(4800);
        result.add_future_refund(-15000);
        assert_eq!(result.future_refund, -10200);
        result.reset_future_refund();
        assert_eq!(result.future_refund, 0);
    }

    // ==================== Merge ====================

    #[test]
    fn test_merge_successful_child() {
        let mut parent = ExecutionResult::new(5000);
        parent.merge(child_with_effects());

        assert_eq!(parent.logs.len(), 1);
        assert!(parent.deleted_accounts.contains(&addr(2)));
        assert_eq!(parent.future_refund, 15000);
        assert_eq!(parent.internal_transactions.len(), 1);
    }

    #[test]
    fn test_merge_reverted_child_keeps_trace_only() {
        let mut parent = ExecutionResult::new(5000);
        let mut child = child_with_effects();
        child.set_revert();
        child.reject_internal_transactions();
        parent.merge(child);

        assert!(parent.logs.is_empty());
        assert!(parent.deleted_accounts.is_empty());
        assert_eq!(parent.future_refund, 0);
        assert_eq!(parent.internal_transactions.len(), 1);
        assert!(parent.internal_transactions[0].rejected);
    }

    #[test]
    fn test_merge_faulted_child() {
        let mut parent = ExecutionResult::new(5000);
        let mut child = child_with_effects();
        child.set_exception(EvmError::OutOfGas);
        assert!(!child.is_success());
        assert!(!child.is_revert());
        parent.merge(child);
        assert!(parent.logs.is_empty());
    }

    // ==================== Internal transactions ====================

    #[test]
    fn test_internal_transaction_indexes() {
        let mut result = ExecutionResult::new(0);
        assert_eq!(result.add_internal_transaction(call_tx(2)), 0);
        assert_eq!(result.add_internal_transaction(call_tx(3)), 1);
        assert_eq!(result.internal_transactions[1].index, 1);

        result.fail_internal_transaction(1, None);
        assert!(!result.internal_transactions[0].rejected);
        assert!(result.internal_transactions[1].rejected);
    }

    #[test]
    fn test_failed_internal_transaction_keeps_fault() {
        let mut result = ExecutionResult::new(0);
        result.add_internal_transaction(call_tx(2));
        result.add_internal_transaction(call_tx(3));

        result.fail_internal_transaction(0, Some(EvmError::OutOfGas));
        result.fail_internal_transaction(1, None);
        assert!(result.internal_transactions[0].rejected);
        assert_eq!(result.internal_transactions[0].error, Some(EvmError::OutOfGas));
        assert!(result.internal_transactions[1].rejected);
        assert_eq!(result.internal_transactions[1].error, None);

        // An enclosing unwind leaves the recorded fault alone
        result.reject_internal_transactions();
        assert_eq!(result.internal_transactions[0].error, Some(EvmError::OutOfGas));
    }

    #[test]
    fn test_call_type_names() {
        assert_eq!(CallType::from_opcode(Opcode::CREATE2), Some(CallType::Create2));
        assert_eq!(CallType::from_opcode(Opcode::ADD), None);
        assert_eq!(CallType::DelegateCall.as_str(), "delegatecall");
    }
}
