//! Execution frame

use crate::analysis::JumpTable;
use crate::context::CallContext;
use crate::error::{EvmError, EvmResult};
use crate::memory::Memory;
use crate::result::ExecutionResult;
use crate::stack::Stack;
use crate::word::Word;
use bytes::Bytes;
use std::sync::Arc;
use weave_state::Repository;

/// Mutable state of one call or create activation.
///
/// The frame borrows its state overlay exclusively for its whole life; only
/// the [`ExecutionResult`] and committed state outlive it.
pub struct Program<'r> {
    pub(crate) code: Bytes,
    pub(crate) jump_table: Arc<JumpTable>,
    pub(crate) pc: usize,
    pub(crate) stack: Stack,
    pub(crate) memory: Memory,
    pub(crate) ctx: CallContext,
    pub(crate) repo: &'r mut dyn Repository,
    pub(crate) return_buffer: Bytes,
    pub(crate) result: ExecutionResult,
    pub(crate) stopped: bool,
}

impl<'r> Program<'r> {
    /// Frame running `code` against `repo`, analyzing jump destinations on the spot
    pub fn new(code: Bytes, ctx: CallContext, repo: &'r mut dyn Repository) -> Self {
        let jump_table = Arc::new(JumpTable::analyze(&code));
        Self::with_jump_table(code, jump_table, ctx, repo)
    }

    /// Frame reusing an already computed jump table
    pub fn with_jump_table(
        code: Bytes,
        jump_table: Arc<JumpTable>,
        ctx: CallContext,
        repo: &'r mut dyn Repository,
    ) -> Self {
        let result = ExecutionResult::new(ctx.gas);
        Self {
            code,
            jump_table,
            pc: 0,
            stack: Stack::new(),
            memory: Memory::new(),
            ctx,
            repo,
            return_buffer: Bytes::new(),
            result,
            stopped: false,
        }
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Code being executed
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// Data stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Scratch memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Call parameters
    pub fn context(&self) -> &CallContext {
        &self.ctx
    }

    /// Output of the most recent nested call
    pub fn return_buffer(&self) -> &Bytes {
        &self.return_buffer
    }

    /// Result accumulated so far
    pub fn result(&self) -> &ExecutionResult {
        &self.result
    }

    /// Gas still available
    pub fn gas_left(&self) -> u64 {
        self.result.gas_left()
    }

    /// Check if the frame has halted
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Finish the frame, releasing the state borrow
    pub fn into_result(self) -> ExecutionResult {
        self.result
    }

    pub(crate) fn stop(&mut self) {
        self.stopped = true;
    }

    /// Abort the frame: forfeit all gas and the deferred refund
    pub(crate) fn fault(&mut self, error: EvmError) {
        self.result.set_fault(error);
        self.stop();
    }

    pub(crate) fn current_byte(&self) -> Option<u8> {
        self.code.get(self.pc).copied()
    }

    /// Immediate operand of a PUSH at the current pc, zero-padded past the end of code
    pub(crate) fn immediate(&self, len: usize) -> Word {
        let start = (self.pc + 1).min(self.code.len());
        let end = (self.pc + 1 + len).min(self.code.len());
        let mut buf = [0u8; 32];
        buf[..end - start].copy_from_slice(&self.code[start..end]);
        Word::from_bytes(&buf[..len])
    }

    /// Resolve a JUMP target
    pub(crate) fn verify_jump(&self, dest: Word) -> EvmResult<usize> {
        match dest.to_u32_strict() {
            Some(pc) if self.jump_table.is_valid(pc as usize) => Ok(pc as usize),
            _ => Err(EvmError::BadJumpDestination(dest)),
        }
    }

    /// Fail when the frame may not modify state
    pub(crate) fn verify_mutable(&self) -> EvmResult<()> {
        if self.ctx.is_static {
            return Err(EvmError::StaticCallModification);
        }
        Ok(())
    }
}

/// `len` bytes of `source` from `offset`, cut short at the end of `source`
pub(crate) fn source_slice(source: &[u8], offset: Word, len: usize) -> &[u8] {
    match offset.to_u64_strict() {
        Some(offset) if (offset as usize) < source.len() => {
            let offset = offset as usize;
            let end = offset.saturating_add(len).min(source.len());
            &source[offset..end]
        }
        _ => &[],
    }
}
