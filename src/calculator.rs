use compact_str::CompactString;

use crate::display::{self, Display};
use crate::eval::{EvalError, Evaluate, Request};
use crate::keypad::{Key, Operation};
use crate::ledger::{Entry, Ledger};
use crate::numeral::Numeral;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    OperatorPending,
    Finished,
    Error,
}

// The input side of the calculator: one instance per session, fed one key at
// a time. The evaluator call is the only await point, so a key press is
// always fully applied before the next one is accepted.
pub struct Calculator<N: Numeral, E> {
    evaluator: E,
    display: Display,
    ledger: Ledger<N>,
    first: Option<N>,
    second: Option<N>,
    // Last second operand, kept so a repeated "=" reapplies the operation
    pre: Option<N>,
    operation: Option<Operation>,
    decimal_used: bool,
    // A fresh digit replaces the display instead of extending it
    clear_next: bool,
    // Set once an operator consumed the entry; digits unlock it again
    entry_locked: bool,
    finished: bool,
}

impl<N: Numeral, E: Evaluate<N>> Calculator<N, E> {
    pub fn new(evaluator: E) -> Self {
        Calculator {
            evaluator,
            display: Display::default(),
            ledger: Ledger::default(),
            first: None,
            second: None,
            pre: None,
            operation: None,
            decimal_used: false,
            clear_next: false,
            entry_locked: false,
            finished: false,
        }
    }

    pub fn display_text(&self) -> &str {
        self.display.text()
    }

    pub fn trail(&self) -> String {
        self.ledger.render()
    }

    pub fn phase(&self) -> Phase {
        if self.display.is_error() {
            Phase::Error
        } else if self.finished {
            Phase::Finished
        } else if self.entry_locked && self.operation.is_some() {
            Phase::OperatorPending
        } else {
            Phase::Entering
        }
    }

    pub async fn press(&mut self, key: Key) {
        tracing::trace!(?key, "key press");
        match key {
            Key::Digit(_) | Key::Point => self.press_entry(key),
            _ => self.press_operation(key).await,
        }
    }

    fn press_entry(&mut self, key: Key) {
        // The integer keypad carries no point button at all
        if key == Key::Point && !N::DECIMAL_POINT {
            return;
        }

        if !self.finished {
            self.entry_locked = false;
            if self.display.is_cleared() || self.clear_next {
                self.display.begin_entry();
                self.clear_next = false;
            }
            if self.display.len() < display::WIDTH {
                match key {
                    Key::Point if self.decimal_used => {}
                    Key::Point => {
                        // An entry cannot start with a bare point
                        if self.display.is_cleared() {
                            self.display.append('0');
                        }
                        self.display.append('.');
                        self.decimal_used = true;
                    }
                    Key::Digit(d) => self.display.append(digit_char(d)),
                    _ => {}
                }
            }
        } else {
            // First digit after "=" or an error starts a fresh calculation
            self.reset();
            self.display.begin_entry();
            match key {
                Key::Point => {
                    self.display.append('0');
                    self.display.append('.');
                    self.decimal_used = true;
                }
                Key::Digit(d) => self.display.append(digit_char(d)),
                _ => {}
            }
            self.clear_next = false;
            self.entry_locked = false;
            self.finished = false;
        }
    }

    async fn press_operation(&mut self, key: Key) {
        if !self.finished {
            // An errored display refuses everything but the clears
            if self.display.is_error() && !key.is_clear_class() {
                return;
            }
            self.handle_operation(key).await;
        } else {
            let snapshot = CompactString::new(self.display.text());
            if key != Key::Equals {
                self.reset();
            } else if !self.display.is_error() {
                // The shown result becomes the first operand of the next run
                self.first = N::parse(self.display.text());
            }
            self.display.restore(&snapshot);
            if !self.display.is_error() || key.is_clear_class() {
                self.handle_operation(key).await;
            }
            self.finished = false;
        }
    }

    async fn handle_operation(&mut self, key: Key) {
        match key {
            Key::Op(op) => self.chain_operator(op).await,
            Key::Equals => {
                if !self.finished {
                    self.second = N::parse(self.display.text());
                } else {
                    self.second = self.pre.take();
                }
                self.evaluate_final().await;
            }
            Key::ClearEntry => self.display.reset_entry(),
            Key::Clear => self.reset(),
            _ => {}
        }
        self.clear_next = true;
    }

    async fn chain_operator(&mut self, op: Operation) {
        if !self.entry_locked {
            if let Some(value) = N::parse(self.display.text()) {
                self.ledger.push(Entry::Operand(value));
                self.ledger.push(Entry::Operator(op));
                if self.first.is_none() {
                    self.first = Some(value);
                } else {
                    self.second = Some(value);
                }
            }
            if self.first.is_some() && self.second.is_some() {
                // Running total, computed with the operator pressed earlier
                self.evaluate_chained().await;
                if self.display.is_error() {
                    return;
                }
            }
            self.operation = Some(op);
            self.decimal_used = false;
            self.entry_locked = true;
        } else {
            // Operator changed without a digit in between: swap, don't extend
            self.operation = Some(op);
            self.ledger.replace_last(Entry::Operator(op));
        }
    }

    async fn evaluate_chained(&mut self) {
        let Some(second) = self.second else { return };
        let request = Request {
            first: self.first,
            operation: self.operation,
            second,
        };
        match self.evaluator.evaluate(request).await {
            Ok(result) => {
                self.reset_operands();
                self.first = Some(result);
                self.show_result(result);
            }
            Err(error) => self.fail(error),
        }
    }

    async fn evaluate_final(&mut self) {
        let Some(second) = self.second else { return };
        if self.operation.is_some() && self.first.is_none() {
            return;
        }
        let request = Request {
            first: self.first,
            operation: self.operation,
            second,
        };
        match self.evaluator.evaluate(request).await {
            Ok(result) => {
                self.ledger.clear();
                self.pre = Some(second);
                self.finished = true;
                self.show_result(result);
            }
            Err(error) => self.fail(error),
        }
    }

    fn show_result(&mut self, value: N) {
        match display::fit(value) {
            Ok(text) => {
                if self.display.set(&text).is_err() {
                    self.enter_error();
                }
            }
            Err(_) => self.enter_error(),
        }
    }

    fn fail(&mut self, error: EvalError) {
        tracing::warn!(%error, "evaluation failed");
        self.enter_error();
    }

    // Overflow and failed evaluations share one terminal: everything is
    // cleared, the sentinel shown, and the machine finished until a digit
    // or a clear comes in
    fn enter_error(&mut self) {
        self.reset();
        self.display.mark_error();
        self.finished = true;
    }

    fn reset(&mut self) {
        self.ledger.clear();
        self.display.reset_entry();
        self.reset_operands();
        self.operation = None;
    }

    fn reset_operands(&mut self) {
        self.first = None;
        self.second = None;
        self.pre = None;
        self.decimal_used = false;
    }
}

fn digit_char(d: u8) -> char {
    (b'0' + d) as char
}
