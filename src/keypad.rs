use compact_str::CompactString;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '*',
            Operation::Div => '/',
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Point,
    Op(Operation),
    Equals,
    ClearEntry,
    Clear,
}

impl Key {
    pub fn is_clear_class(self) -> bool {
        matches!(self, Key::Clear | Key::ClearEntry)
    }

    pub fn from_label(label: &str) -> Result<Key, KeyError> {
        match label {
            "." => Ok(Key::Point),
            "+" => Ok(Key::Op(Operation::Add)),
            "-" => Ok(Key::Op(Operation::Sub)),
            "*" => Ok(Key::Op(Operation::Mul)),
            "/" => Ok(Key::Op(Operation::Div)),
            "=" => Ok(Key::Equals),
            "CE" => Ok(Key::ClearEntry),
            "C" => Ok(Key::Clear),
            _ => match label.as_bytes() {
                [d @ b'0'..=b'9'] => Ok(Key::Digit(d - b'0')),
                _ => Err(KeyError::UnknownLabel(label.into())),
            },
        }
    }
}

pub fn scan(line: &str) -> Result<Vec<Key>, KeyError> {
    let mut keys = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '0'..='9' => keys.push(Key::Digit(c as u8 - b'0')),
            '.' => keys.push(Key::Point),
            '+' => keys.push(Key::Op(Operation::Add)),
            '-' => keys.push(Key::Op(Operation::Sub)),
            '*' => keys.push(Key::Op(Operation::Mul)),
            '/' => keys.push(Key::Op(Operation::Div)),
            '=' => keys.push(Key::Equals),
            // C on its own clears everything, the CE digraph only the entry
            'C' => {
                if chars.next_if(|&n| n == 'E').is_some() {
                    keys.push(Key::ClearEntry);
                } else {
                    keys.push(Key::Clear);
                }
            }
            // Ignore whitespace
            _ if c.is_whitespace() => {}
            _ => return Err(KeyError::UnknownKey(c)),
        }
    }

    Ok(keys)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("Unknown key: {0}")]
    UnknownKey(char),
    #[error("Unknown button label: {0}")]
    UnknownLabel(CompactString),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_key_sequence() {
        let result = scan("12+3=");
        assert_eq!(
            result,
            Ok(vec![
                Key::Digit(1),
                Key::Digit(2),
                Key::Op(Operation::Add),
                Key::Digit(3),
                Key::Equals,
            ])
        );
    }

    #[test]
    fn test_scan_clear_digraph() {
        let result = scan("1 CE C .");
        assert_eq!(
            result,
            Ok(vec![Key::Digit(1), Key::ClearEntry, Key::Clear, Key::Point])
        );
    }

    #[test]
    fn test_scan_clear_before_digit() {
        // 'C' followed by anything other than 'E' stays a full clear
        assert_eq!(scan("C5"), Ok(vec![Key::Clear, Key::Digit(5)]));
        assert_eq!(scan("CEC"), Ok(vec![Key::ClearEntry, Key::Clear]));
    }

    #[test]
    fn test_scan_unknown_key() {
        assert_eq!(scan("1%2"), Err(KeyError::UnknownKey('%')));
    }

    #[test]
    fn test_from_label() {
        assert_eq!(Key::from_label("7"), Ok(Key::Digit(7)));
        assert_eq!(Key::from_label("CE"), Ok(Key::ClearEntry));
        assert_eq!(Key::from_label("*"), Ok(Key::Op(Operation::Mul)));
        assert_eq!(
            Key::from_label("10"),
            Err(KeyError::UnknownLabel("10".into()))
        );
    }
}
