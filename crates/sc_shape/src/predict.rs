//! The structure prediction seam.

use crate::PredictorError;
use crate::Reactivity;

/// Predicts a dot-bracket structure for a sequence window, optionally
/// guided by reactivities of the same length. The returned structure must
/// have the length of the window.
///
/// Implementations typically call out to a folding program; timeouts and
/// retries are their own business.
pub trait StructurePredictor {
    fn predict(&self, sequence: &str, reactivities: Option<&[Reactivity]>) -> Result<String, PredictorError>;
}

impl<F> StructurePredictor for F 
where F: Fn(&str, Option<&[Reactivity]>) -> Result<String, PredictorError>,
{
    fn predict(&self, sequence: &str, reactivities: Option<&[Reactivity]>) -> Result<String, PredictorError> {
        self(sequence, reactivities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_predictor() {
        let unfolded = |seq: &str, _: Option<&[Reactivity]>| -> Result<String, PredictorError> {
            Ok(".".repeat(seq.len()))
        };
        assert_eq!(unfolded.predict("ACGU", None).unwrap(), "....");
    }
}
