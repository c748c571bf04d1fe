//! Operand stack

use crate::error::{EvmError, EvmResult};
use crate::word::Word;

/// Maximum number of items on the stack
pub const STACK_LIMIT: usize = 1024;

/// Bounded LIFO of words
#[derive(Clone, Debug)]
pub struct Stack {
    data: Vec<Word>,
}

impl Stack {
    /// Create a new empty stack
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(32),
        }
    }

    /// Fail unless at least `required` items are present
    pub fn verify_underflow(&self, required: usize) -> EvmResult<()> {
        if self.data.len() < required {
            return Err(EvmError::StackUnderflow {
                required,
                size: self.data.len(),
            });
        }
        Ok(())
    }

    /// Fail if popping `pops` then pushing `pushes` would exceed the limit
    pub fn verify_overflow(&self, pops: usize, pushes: usize) -> EvmResult<()> {
        if self.data.len() - pops.min(self.data.len()) + pushes > STACK_LIMIT {
            return Err(EvmError::StackOverflow);
        }
        Ok(())
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: Word) -> EvmResult<()> {
        if self.data.len() >= STACK_LIMIT {
            return Err(EvmError::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> EvmResult<Word> {
        self.data.pop().ok_or(EvmError::StackUnderflow {
            required: 1,
            size: 0,
        })
    }

    /// Peek at a specific depth (0 = top)
    pub fn peek(&self, depth: usize) -> EvmResult<Word> {
        if depth >= self.data.len() {
            return Err(EvmError::StackUnderflow {
                required: depth + 1,
                size: self.data.len(),
            });
        }
        Ok(self.data[self.data.len() - 1 - depth])
    }

    /// Swap top with item at depth (1 = second item)
    pub fn swap(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth >= len {
            return Err(EvmError::StackUnderflow {
                required: depth + 1,
                size: len,
            });
        }
        self.data.swap(len - 1, len - 1 - depth);
        Ok(())
    }

    /// Duplicate item at depth to top (1 = top)
    pub fn dup(&mut self, depth: usize) -> EvmResult<()> {
        let len = self.data.len();
        if depth == 0 || depth > len {
            return Err(EvmError::StackUnderflow {
                required: depth,
                size: len,
            });
        }
        self.push(self.data[len - depth])
    }

    /// Get current stack size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if stack is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Items from bottom to top
    pub fn as_slice(&self) -> &[Word] {
        &self.data
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}
