//! Depth-tracking scans over the textual encoding of a formula.
//!
//! These locate the structural separators of a formula without parsing it: the
//! interval of a temporal operator, the connective of a parenthesized binary
//! formula and the separators of an n-ary list. Malformed input is reported as
//! [`LocateError::Unbalanced`] or [`LocateError::UnexpectedSymbol`], never as
//! [`LocateError::NotFound`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("unbalanced bracket at position {position}")]
    Unbalanced { position: usize },
    #[error("unexpected symbol `{symbol}` at position {position}")]
    UnexpectedSymbol { symbol: char, position: usize },
    #[error("no {what} found")]
    NotFound { what: &'static str },
}

/// Byte positions of `[`, `,` and `]` of an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSpan {
    pub open: usize,
    pub comma: usize,
    pub close: usize,
}

const CONNECTIVES: [char; 6] = ['v', '&', '=', '>', 'U', 'R'];

fn check_symbol(symbol: char, position: usize) -> Result<(), LocateError> {
    let known = symbol.is_ascii_digit()
        || CONNECTIVES.contains(&symbol)
        || matches!(
            symbol,
            'p' | 'T' | 'F' | '!' | 'G' | '~' | '(' | ')' | '[' | ']' | ','
        );
    if known {
        Ok(())
    } else {
        Err(LocateError::UnexpectedSymbol { symbol, position })
    }
}

/// Finds the first interval `[a,b]` in `text`.
pub fn locate_interval(text: &str) -> Result<IntervalSpan, LocateError> {
    let mut open = None;
    let mut comma = None;
    for (position, symbol) in text.char_indices() {
        check_symbol(symbol, position)?;
        match (open, comma, symbol) {
            (None, _, '[') => open = Some(position),
            (None, _, _) => (),
            (Some(_), None, ',') => comma = Some(position),
            (Some(open), Some(comma), ']') if comma > open + 1 && position > comma + 1 => {
                return Ok(IntervalSpan {
                    open,
                    comma,
                    close: position,
                });
            }
            (Some(_), _, digit) if digit.is_ascii_digit() => (),
            (Some(_), _, symbol) => {
                return Err(LocateError::UnexpectedSymbol { symbol, position });
            }
        }
    }
    match open {
        Some(position) => Err(LocateError::Unbalanced { position }),
        None => Err(LocateError::NotFound { what: "interval" }),
    }
}

/// Finds the connective of a parenthesized binary formula `(α ∘ β)`: the first
/// connective at depth zero relative to the enclosing pair of parentheses.
pub fn locate_primary_connective(text: &str) -> Result<usize, LocateError> {
    let mut symbols = text.char_indices();
    match symbols.next() {
        Some((_, '(')) => (),
        Some((position, symbol)) => {
            return Err(LocateError::UnexpectedSymbol { symbol, position });
        }
        None => return Err(LocateError::NotFound { what: "connective" }),
    }

    let mut open_parens = vec![0];
    let mut connective = None;
    for (position, symbol) in symbols {
        check_symbol(symbol, position)?;
        if open_parens.is_empty() {
            // trailing text after the enclosing pair was closed
            return Err(LocateError::UnexpectedSymbol { symbol, position });
        }
        match symbol {
            '(' => open_parens.push(position),
            ')' => {
                open_parens.pop();
            }
            c if open_parens.len() == 1 && connective.is_none() && CONNECTIVES.contains(&c) => {
                connective = Some(position);
            }
            _ => (),
        }
    }

    if let Some(&position) = open_parens.last() {
        return Err(LocateError::Unbalanced { position });
    }
    connective.ok_or(LocateError::NotFound { what: "connective" })
}

/// Finds the first separating `,` in the entries of an n-ary list, skipping commas
/// nested in parentheses or intervals.
pub fn locate_array_separator(text: &str) -> Result<usize, LocateError> {
    let mut open = Vec::new();
    let mut separator = None;
    for (position, symbol) in text.char_indices() {
        check_symbol(symbol, position)?;
        match symbol {
            '(' | '[' => open.push((symbol, position)),
            ')' | ']' => {
                let expected = if symbol == ')' { '(' } else { '[' };
                match open.pop() {
                    Some((opening, _)) if opening == expected => (),
                    _ => return Err(LocateError::Unbalanced { position }),
                }
            }
            ',' if open.is_empty() && separator.is_none() => separator = Some(position),
            _ => (),
        }
    }

    if let Some(&(_, position)) = open.last() {
        return Err(LocateError::Unbalanced { position });
    }
    separator.ok_or(LocateError::NotFound {
        what: "list separator",
    })
}
