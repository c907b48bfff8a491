use crate::keypad::Operation;
use crate::numeral::Numeral;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entry<N> {
    Operand(N),
    Operator(Operation),
}

// The visual trail of the calculation in progress. A projection only; the
// state machine never reads a calculation back out of it.
#[derive(Debug)]
pub struct Ledger<N> {
    entries: Vec<Entry<N>>,
}

impl<N: Numeral> Default for Ledger<N> {
    fn default() -> Self {
        Ledger {
            entries: Vec::new(),
        }
    }
}

impl<N: Numeral> Ledger<N> {
    pub fn push(&mut self, entry: Entry<N>) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<Entry<N>> {
        self.entries.pop()
    }

    // The one correction the trail admits: swapping whatever sits at the tail
    pub fn replace_last(&mut self, entry: Entry<N>) {
        self.entries.pop();
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            if !out.is_empty() {
                out.push(' ');
            }
            match entry {
                Entry::Operand(value) => out.push_str(&value.render()),
                Entry::Operator(op) => out.push(op.symbol()),
            }
        }
        out
    }
}
