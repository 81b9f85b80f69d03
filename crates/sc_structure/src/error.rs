use std::fmt;

use crate::NAIDX;

/// Errors raised while reading or rendering secondary structures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// An opening bracket without a matching closing bracket.
    UnmatchedOpening { position: NAIDX, symbol: char },

    /// A character outside the dot-bracket alphabet.
    InvalidSymbol { position: NAIDX, symbol: char },

    /// A base pair that does not fit into a structure of the given length.
    PairOutOfRange { i: NAIDX, j: NAIDX, length: usize },

    /// A base listed in more than one pair.
    PositionConflict { position: NAIDX },

    /// Two inputs that must have the same length do not.
    LengthMismatch { expected: usize, found: usize },

    /// Generic malformed input, e.g. a missing linker or an unpaired
    /// position where a pair was required.
    Malformed(String),

    /// F1 comparison of two structures without any base pairs.
    DegenerateComparison,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::UnmatchedOpening { position, symbol } => 
                write!(f, "Bad dot-bracket structure: unmatched '{symbol}' at position {position}."),
            StructureError::InvalidSymbol { position, symbol } => 
                write!(f, "Invalid dot-bracket symbol '{symbol}' at position {position}."),
            StructureError::PairOutOfRange { i, j, length } => 
                write!(f, "Base pair ({i},{j}) does not fit a structure of length {length}."),
            StructureError::PositionConflict { position } => 
                write!(f, "Position {position} is listed in more than one base pair."),
            StructureError::LengthMismatch { expected, found } => 
                write!(f, "Length mismatch: expected {expected}, found {found}."),
            StructureError::Malformed(msg) => write!(f, "Malformed input: {msg}"),
            StructureError::DegenerateComparison => 
                write!(f, "F1 is undefined: neither structure contains a base pair."),
        }
    }
}

impl std::error::Error for StructureError {}

