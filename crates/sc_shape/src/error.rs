use std::fmt;

use sc_structure::NAIDX;
use sc_structure::Stem;
use sc_structure::StructureError;

/// Errors raised by a structure predictor, passed through unchanged.
pub type PredictorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum ShapeError {
    /// Malformed structure input.
    Structure(StructureError),

    /// Structure, sequence or reactivities differ in length.
    LengthMismatch { expected: usize, found: usize },

    /// A position that must carry a reactivity has none.
    MissingData { position: NAIDX },

    /// A reactivity token that is neither a number nor `NULL`.
    InvalidValue(String),

    /// Paired, loop, bulge and interior-loop bases do not add up to the
    /// span of the stem.
    Decomposition { stem: Stem, counted: usize },

    /// The structure predictor failed.
    Prediction(PredictorError),

    /// Invalid or unreadable parameters.
    Config(String),
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::Structure(e) => write!(f, "{e}"),
            ShapeError::LengthMismatch { expected, found } => 
                write!(f, "Length mismatch: expected {expected}, found {found}."),
            ShapeError::MissingData { position } => 
                write!(f, "No reactivity at position {position}."),
            ShapeError::InvalidValue(tok) => write!(f, "Invalid reactivity value: '{tok}'"),
            ShapeError::Decomposition { stem, counted } => 
                write!(f, "Decomposition of stem {stem} covers {counted} of {} bases.", stem.span_len()),
            ShapeError::Prediction(e) => write!(f, "Structure prediction failed: {e}"),
            ShapeError::Config(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ShapeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShapeError::Structure(e) => Some(e),
            ShapeError::Prediction(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<StructureError> for ShapeError {
    fn from(e: StructureError) -> Self {
        ShapeError::Structure(e)
    }
}

impl From<serde_json::Error> for ShapeError {
    fn from(e: serde_json::Error) -> Self {
        ShapeError::Config(e.to_string())
    }
}

