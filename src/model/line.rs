use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{Position, SymbolKind};

/// The referenced-package sentinel for predeclared objects.
pub const UNIVERSE: &str = "universe";

/// Errors from parsing a serialized symbol line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    #[error("invalid line {0:?}")]
    InvalidLine(String),
    #[error("invalid kind {0:?}")]
    InvalidKind(String),
}

/// One occurrence of a symbol, in its canonical single-line form:
///
/// ```text
/// <file>:<line>:<col>: <ownerPkg> <referPkg> [local]<expr><kind>[+][ <type>]
/// ```
///
/// The kind token follows the expression with no separating space; `+`
/// marks a definition (the occurrence is the referenced declaration); the
/// trailing type text is present only when type printing was requested.
/// `Display` and [`SymbolLine::parse`] agree on this grammar, so every
/// populated field survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolLine {
    pub pos: Position,
    pub owner_pkg: String,
    pub refer_pkg: String,
    /// Reserved: accepted and preserved by the parser, never set by the
    /// extractor.
    pub local: bool,
    pub expr: String,
    pub kind: SymbolKind,
    pub definition: bool,
    pub type_text: Option<String>,
}

impl fmt::Display for SymbolLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {} ", self.pos, self.owner_pkg, self.refer_pkg)?;
        if self.local {
            write!(f, "local")?;
        }
        write!(f, "{}{}", self.expr, self.kind)?;
        if self.definition {
            write!(f, "+")?;
        }
        if let Some(t) = &self.type_text {
            write!(f, " {}", t)?;
        }
        Ok(())
    }
}

impl FromStr for SymbolLine {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolLine::parse(s)
    }
}

impl SymbolLine {
    /// Parse one serialized line.
    ///
    /// Shape violations return [`LineError`] carrying the offending text.
    /// A numeric field too large for `usize` means the input was not
    /// produced by the serializer and aborts.
    pub fn parse(line: &str) -> Result<SymbolLine, LineError> {
        if line.contains('\n') {
            return Err(LineError::InvalidLine(line.to_string()));
        }
        let (file, rest) = split_field(line, ':', line)?;
        let (line_no, rest) = split_field(rest, ':', line)?;
        let (column, rest) = split_field(rest, ':', line)?;
        if !digits_ok(line_no) || !digits_ok(column) {
            return Err(LineError::InvalidLine(line.to_string()));
        }
        let pos = Position::new(file, parse_number(line_no, line), parse_number(column, line));

        let rest = skip_space(rest, line)?;
        let (owner_pkg, rest) = take_word(rest, line)?;
        let rest = skip_space(rest, line)?;
        let (refer_pkg, rest) = take_word(rest, line)?;
        let rest = skip_space(rest, line)?;
        let (token, rest) = take_word(rest, line)?;

        let type_text = if rest.is_empty() {
            None
        } else {
            let t = skip_space(rest, line)?;
            if t.is_empty() {
                return Err(LineError::InvalidLine(line.to_string()));
            }
            Some(t.to_string())
        };

        // token = [local]<expr><kind>[+]
        let mut t = token;
        let definition = match t.strip_suffix('+') {
            Some(stripped) => {
                t = stripped;
                true
            }
            None => false,
        };
        let local = match t.strip_prefix("local") {
            Some(stripped) => {
                t = stripped;
                true
            }
            None => false,
        };
        let (expr, kind) = split_kind(t).ok_or_else(|| LineError::InvalidKind(token.to_string()))?;
        if expr.is_empty() || expr.contains('+') {
            return Err(LineError::InvalidLine(line.to_string()));
        }

        Ok(SymbolLine {
            pos,
            owner_pkg: owner_pkg.to_string(),
            refer_pkg: refer_pkg.to_string(),
            local,
            expr: expr.to_string(),
            kind,
            definition,
            type_text,
        })
    }
}

/// Split off the text before the next `sep`; both halves must be non-empty
/// on the left and present on the right.
fn split_field<'a>(s: &'a str, sep: char, line: &str) -> Result<(&'a str, &'a str), LineError> {
    match s.split_once(sep) {
        Some((field, rest)) if !field.is_empty() => Ok((field, rest)),
        _ => Err(LineError::InvalidLine(line.to_string())),
    }
}

/// A digit run that survived shape validation; failure to convert means
/// the line lied about being serializer output.
fn parse_number(digits: &str, line: &str) -> usize {
    match digits.parse() {
        Ok(n) => n,
        Err(_) => panic!("symbol line {:?}: numeric field {:?} out of range", line, digits),
    }
}

fn skip_space<'a>(s: &'a str, line: &str) -> Result<&'a str, LineError> {
    let trimmed = s.trim_start();
    if trimmed.len() == s.len() {
        return Err(LineError::InvalidLine(line.to_string()));
    }
    Ok(trimmed)
}

fn take_word<'a>(s: &'a str, line: &str) -> Result<(&'a str, &'a str), LineError> {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    if end == 0 {
        return Err(LineError::InvalidLine(line.to_string()));
    }
    Ok((&s[..end], &s[end..]))
}

/// Split `<expr><kind>` at the kind suffix. The four kind tokens end in
/// distinct characters, so at most one can match.
fn split_kind(t: &str) -> Option<(&str, SymbolKind)> {
    for kind in SymbolKind::ALL {
        if let Some(expr) = t.strip_suffix(kind.as_str()) {
            return Some((expr, kind));
        }
    }
    None
}

fn digits_ok(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
