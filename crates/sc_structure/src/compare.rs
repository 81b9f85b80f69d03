//! Pairwise comparison of secondary structures.

use nohash_hasher::IntSet;

use crate::NAIDX;
use crate::P1KEY;
use crate::Pair;
use crate::PairList;
use crate::StructureError;
use crate::to_base_pairs;

/// True if `pred` matches `truth` exactly, or with one end shifted by at
/// most `shift` positions while the other end matches exactly.
pub fn correct_pair(pred: &Pair, truth: &Pair, shift: NAIDX) -> bool {
    (pred.i().abs_diff(truth.i()) <= shift && pred.j() == truth.j()) ||
    (pred.i() == truth.i() && pred.j().abs_diff(truth.j()) <= shift)
}

/// Confusion counts of a predicted versus a reference structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct F1Counts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl F1Counts {
    /// 2·TP / (2·TP + FP + FN). Undefined if neither structure has a pair.
    pub fn f1(&self) -> Result<f64, StructureError> {
        let tp2 = 2 * self.true_positives;
        let denom = tp2 + self.false_positives + self.false_negatives;
        if denom == 0 {
            return Err(StructureError::DegenerateComparison);
        }
        Ok(tp2 as f64 / denom as f64)
    }
}

fn pair_keys(pairs: &PairList) -> IntSet<P1KEY> {
    pairs.iter().map(Pair::key).collect()
}

/// Count matching and non-matching pairs of two dot-bracket strings of
/// equal length, allowing a one-sided shift of `shift` positions.
pub fn compare_structures(pred_dot: &str, true_dot: &str, shift: NAIDX) -> Result<F1Counts, StructureError> {
    let pred = to_base_pairs(pred_dot)?;
    let truth = to_base_pairs(true_dot)?;
    if pred.length() != truth.length() {
        return Err(StructureError::LengthMismatch { 
            expected: truth.length(), 
            found: pred.length() 
        });
    }

    let pred_keys = pair_keys(&pred);
    let true_keys = pair_keys(&truth);
    let true_positives = pred.iter()
        .filter(|p| true_keys.contains(&p.key()) 
            || (shift > 0 && truth.iter().any(|t| correct_pair(p, t, shift))))
        .count();
    let false_negatives = truth.iter()
        .filter(|t| !(pred_keys.contains(&t.key()) 
            || (shift > 0 && pred.iter().any(|p| correct_pair(p, t, shift)))))
        .count();
    Ok(F1Counts {
        true_positives,
        false_positives: pred.len() - true_positives,
        false_negatives,
    })
}

/// F1 score of a predicted structure against a reference structure.
///
/// Fails with `DegenerateComparison` if both structures are unpaired;
/// callers that want a defined value for that case must handle it.
pub fn dot_f1(pred_dot: &str, true_dot: &str, shift: NAIDX) -> Result<f64, StructureError> {
    compare_structures(pred_dot, true_dot, shift)?.f1()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_pair() {
        let truth = Pair::new(10, 20);
        assert!(correct_pair(&Pair::new(10, 20), &truth, 0));
        assert!(correct_pair(&Pair::new(11, 20), &truth, 1));
        assert!(correct_pair(&Pair::new(10, 19), &truth, 1));
        assert!(!correct_pair(&Pair::new(11, 20), &truth, 0));
        // Only one side may shift.
        assert!(!correct_pair(&Pair::new(11, 21), &truth, 1));
        assert!(!correct_pair(&Pair::new(8, 20), &truth, 1));
    }

    #[test]
    fn test_dot_f1_identical() {
        for dot in ["((..))", "..((((...))))..((...))", "((..[[..))..]]"] {
            assert_eq!(dot_f1(dot, dot, 0), Ok(1.0));
        }
    }

    #[test]
    fn test_dot_f1_partial() {
        // TP = 2, FP = 1, FN = 0.
        let c = compare_structures("(((..)))", ".((..)).", 0).unwrap();
        assert_eq!(c, F1Counts { true_positives: 2, false_positives: 1, false_negatives: 0 });
        assert_eq!(c.f1(), Ok(0.8));

        // Shifted by one on the 3' side.
        assert_eq!(dot_f1("((...)).", "((....))", 0), Ok(0.0));
        let c = compare_structures("((...)).", "((....))", 1).unwrap();
        assert_eq!(c.true_positives, 2);
        assert_eq!(c.false_negatives, 0);
        assert_eq!(c.f1(), Ok(1.0));
    }

    #[test]
    fn test_exact_and_shifted_matches() {
        // (1,11) and (2,10) match exactly, the pseudoknot is off by one.
        let pred  = "((.<<....))>>";
        let truth = "((..<<...))>>";
        let c = compare_structures(pred, truth, 0).unwrap();
        assert_eq!(c, F1Counts { true_positives: 2, false_positives: 2, false_negatives: 2 });
        let c = compare_structures(pred, truth, 1).unwrap();
        assert_eq!(c, F1Counts { true_positives: 4, false_positives: 0, false_negatives: 0 });
    }

    #[test]
    fn test_dot_f1_degenerate() {
        assert_eq!(dot_f1("....", "....", 1), Err(StructureError::DegenerateComparison));
        assert_eq!(dot_f1("(..)", "....", 1), Ok(0.0));
    }

    #[test]
    fn test_dot_f1_errors() {
        assert!(matches!(dot_f1("(..)", "(...)", 0), 
            Err(StructureError::LengthMismatch { expected: 5, found: 4 })));
        assert!(matches!(dot_f1("(..", "...", 0), 
            Err(StructureError::UnmatchedOpening { .. })));
    }
}
