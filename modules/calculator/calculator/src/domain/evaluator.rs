//! Fixed-capacity RPN stack evaluator
//!
//! One evaluator serves exactly one expression. It lives on the stack of the
//! call that owns it and is never shared.

use std::fmt;

use tracing::trace;

use super::error::EvaluatorError;

/// Number of slots in an evaluator. One slot is held in reserve, so at most
/// `STACK_CAPACITY - 1` operands can be resident at once.
pub const STACK_CAPACITY: usize = 16;

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Apply the operator with IEEE-754 semantics; division by zero yields
    /// an infinity or NaN rather than an error.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Subtract => left - right,
            Self::Multiply => left * right,
            Self::Divide => left / right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        };
        f.write_str(symbol)
    }
}

/// A single element of an RPN expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token {
    Operand(f64),
    Operator(Operator),
}

/// Bounded RPN evaluator backed by an inline array.
#[derive(Debug, Clone)]
pub struct StackEvaluator<const N: usize = STACK_CAPACITY> {
    slots: [f64; N],
    len: usize,
}

impl<const N: usize> Default for StackEvaluator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StackEvaluator<N> {
    /// Create an empty evaluator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: [0.0; N],
            len: 0,
        }
    }

    /// Most operands that may be resident at once.
    #[must_use]
    pub const fn max_operands() -> usize {
        N.saturating_sub(1)
    }

    /// Number of operands currently on the stack.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Push a literal operand.
    ///
    /// # Errors
    /// `StackFull` when `max_operands()` operands are already resident.
    /// The stack is left unchanged.
    pub fn push_operand(&mut self, value: f64) -> Result<(), EvaluatorError> {
        if self.len >= Self::max_operands() {
            return Err(EvaluatorError::StackFull {
                max_operands: Self::max_operands(),
            });
        }
        self.slots[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Pop the right then the left operand and push `left op right`.
    ///
    /// # Errors
    /// `InsufficientOperands` when fewer than two operands are resident.
    /// The stack is left unchanged.
    pub fn push_operator(&mut self, op: Operator) -> Result<(), EvaluatorError> {
        if self.len < 2 {
            return Err(EvaluatorError::InsufficientOperands {
                available: self.len,
            });
        }
        let right = self.slots[self.len - 1];
        let left = self.slots[self.len - 2];
        let value = op.apply(left, right);
        trace!(%op, left, right, value, "applied operator");

        // Two slots were just freed, so this push cannot hit the bound.
        self.len -= 2;
        self.push_operand(value)
    }

    /// Feed one token.
    ///
    /// # Errors
    /// See [`Self::push_operand`] and [`Self::push_operator`].
    pub fn push(&mut self, token: Token) -> Result<(), EvaluatorError> {
        match token {
            Token::Operand(value) => self.push_operand(value),
            Token::Operator(op) => self.push_operator(op),
        }
    }

    /// Final value of a complete expression.
    ///
    /// # Errors
    /// `IncompleteExpression` unless exactly one operand is resident.
    pub fn result(&self) -> Result<f64, EvaluatorError> {
        if self.len != 1 {
            return Err(EvaluatorError::IncompleteExpression {
                remaining: self.len,
            });
        }
        Ok(self.slots[0])
    }
}
