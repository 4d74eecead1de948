use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// The kind of a referenced object, as it appears in serialized lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Const,
    Type,
    Var,
    Func,
}

impl SymbolKind {
    pub const ALL: [SymbolKind; 4] = [
        SymbolKind::Const,
        SymbolKind::Type,
        SymbolKind::Var,
        SymbolKind::Func,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Const => "const",
            SymbolKind::Type => "type",
            SymbolKind::Var => "var",
            SymbolKind::Func => "func",
        }
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "const" => Ok(SymbolKind::Const),
            "type" => Ok(SymbolKind::Type),
            "var" => Ok(SymbolKind::Var),
            "func" => Ok(SymbolKind::Func),
            _ => Err(format!("unknown symbol kind: {}", s)),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors raised while turning command-line input into a run configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown symbol kind {0:?}")]
    UnknownKind(String),
}

/// An immutable filter over symbol kinds.
///
/// Parsed from a comma-separated list such as `func,type`; admits exactly
/// the kinds listed. The default mask admits everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindMask(u8);

impl KindMask {
    pub fn all() -> KindMask {
        KindMask::of(&SymbolKind::ALL)
    }

    pub fn of(kinds: &[SymbolKind]) -> KindMask {
        let mut bits = 0u8;
        for kind in kinds {
            bits |= 1 << (*kind as u8);
        }
        KindMask(bits)
    }

    /// Parse a comma-separated kind list. Every token must name a kind;
    /// an empty token is as unknown as a misspelled one.
    pub fn parse(s: &str) -> Result<KindMask, ConfigError> {
        let mut mask = KindMask(0);
        for token in s.split(',') {
            let kind = token
                .parse::<SymbolKind>()
                .map_err(|_| ConfigError::UnknownKind(token.to_string()))?;
            mask.0 |= 1 << (kind as u8);
        }
        Ok(mask)
    }

    pub fn contains(self, kind: SymbolKind) -> bool {
        self.0 & (1 << (kind as u8)) != 0
    }
}

impl Default for KindMask {
    fn default() -> Self {
        KindMask::all()
    }
}

/// A 1-based source position. Positions attached to emitted occurrences
/// always carry a non-empty file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Position {
        Position {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

pub mod line;
