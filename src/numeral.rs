use compact_str::{CompactString, ToCompactString};
use thiserror::Error;

use crate::keypad::Operation;

pub trait Numeral: Copy + PartialEq + std::fmt::Debug + Send + 'static {
    // Whether the keypad carries a decimal point button for this kind
    const DECIMAL_POINT: bool;

    fn parse(text: &str) -> Option<Self>;
    fn render(self) -> CompactString;
    fn is_representable(self) -> bool;
    fn apply(op: Operation, lhs: Self, rhs: Self) -> Result<Self, ArithmeticError>;
}

impl Numeral for i64 {
    const DECIMAL_POINT: bool = false;

    fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn render(self) -> CompactString {
        self.to_compact_string()
    }

    fn is_representable(self) -> bool {
        true
    }

    fn apply(op: Operation, lhs: Self, rhs: Self) -> Result<Self, ArithmeticError> {
        match op {
            Operation::Add => lhs.checked_add(rhs).ok_or(ArithmeticError::Overflow),
            Operation::Sub => lhs.checked_sub(rhs).ok_or(ArithmeticError::Overflow),
            Operation::Mul => lhs.checked_mul(rhs).ok_or(ArithmeticError::Overflow),
            Operation::Div => {
                if rhs == 0 {
                    Err(ArithmeticError::DivideByZero)
                } else {
                    lhs.checked_div(rhs).ok_or(ArithmeticError::Overflow)
                }
            }
        }
    }
}

impl Numeral for f64 {
    const DECIMAL_POINT: bool = true;

    fn parse(text: &str) -> Option<Self> {
        text.parse().ok()
    }

    fn render(self) -> CompactString {
        // Negative zero shows as plain zero
        if self == 0.0 {
            CompactString::new("0")
        } else {
            self.to_compact_string()
        }
    }

    fn is_representable(self) -> bool {
        self.is_finite()
    }

    fn apply(op: Operation, lhs: Self, rhs: Self) -> Result<Self, ArithmeticError> {
        // Division by zero follows float semantics; the non-finite result is
        // rejected later when it is formatted for the display.
        Ok(match op {
            Operation::Add => lhs + rhs,
            Operation::Sub => lhs - rhs,
            Operation::Mul => lhs * rhs,
            Operation::Div => lhs / rhs,
        })
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Division by zero")]
    DivideByZero,
    #[error("Result out of range")]
    Overflow,
}
