//! SHAPE-structure agreement of a stem-loop.
//!
//! Low reactivities support pairing, high reactivities support unpaired
//! bases. The stem-loop is split into gap-free helices, the hairpin loop,
//! bulges and interior loops; each part contributes a score, and
//! bonuses or penalties where its reactivities clearly agree or disagree
//! with the structure. The sum is divided by the number of bases in the
//! stem-loop.
//!

use std::fmt;

use sc_structure::NAIDX;
use sc_structure::Stem;
use sc_structure::find_bulges_and_interior_loops;
use sc_structure::find_stems;

use crate::Reactivity;
use crate::ScoreParams;
use crate::ShapeError;
use crate::require_data;
use crate::value_at;

/// Weight of the top-2 mean against the overall mean.
const TOP_WEIGHT: f64 = 0.6;

/// The individual terms behind a score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub stem_score: f64,
    pub stem_penalty: f64,
    pub stem_base: usize,
    pub loop_score: f64,
    pub loop_bonus: f64,
    pub loop_penalty: f64,
    pub loop_base: usize,
    pub bulge_score: f64,
    pub bulge_bonus: f64,
    pub bulge_base: usize,
    pub interior_score: f64,
    pub interior_bonus: f64,
    pub interior_base: usize,
    /// Number of bases from `left_start` to `right_end`.
    pub span: usize,
}

impl ScoreBreakdown {
    /// Number of bases assigned to any of the four parts.
    pub fn counted(&self) -> usize {
        self.stem_base + self.loop_base + self.bulge_base + self.interior_base
    }

    /// The unrounded score.
    pub fn total(&self) -> f64 {
        let sum = (self.stem_score - self.stem_penalty) 
            + (self.loop_score + self.loop_bonus - self.loop_penalty) 
            + (self.bulge_score + self.bulge_bonus) 
            + (self.interior_score + self.interior_bonus);
        sum / self.span as f64
    }

    /// The score, rounded to three decimals.
    pub fn score(&self) -> f64 {
        (self.total() * 1000.0).round() / 1000.0
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "stem_score: {:.3}; stem_penalty: {:.0}; stem_base: {}", 
            self.stem_score, self.stem_penalty, self.stem_base)?;
        writeln!(f, "loop_score: {:.3}; loop_bonus: {:.0}; loop_penalty: {:.3}; loop_base: {}", 
            self.loop_score, self.loop_bonus, self.loop_penalty, self.loop_base)?;
        writeln!(f, "bulge_score: {:.3}; bulge_bonus: {:.0}; bulge_base: {}", 
            self.bulge_score, self.bulge_bonus, self.bulge_base)?;
        write!(f, "intLoop_score: {:.3}; intLoop_bonus: {:.0}; intLoop_base: {}", 
            self.interior_score, self.interior_bonus, self.interior_base)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean of the two largest values of a sorted, non-empty slice.
fn top2_mean(sorted: &[f64]) -> f64 {
    mean(&sorted[sorted.len().saturating_sub(2)..])
}

fn sorted_values(values: &[Reactivity], positions: impl Iterator<Item = NAIDX>) -> Result<Vec<f64>, ShapeError> {
    let mut v = positions.map(|p| value_at(values, p)).collect::<Result<Vec<_>, _>>()?;
    v.sort_by(f64::total_cmp);
    Ok(v)
}

/// Mean of the paired bases right outside `start..=end`.
fn flank_mean(values: &[Reactivity], start: NAIDX, end: NAIDX) -> Result<f64, ShapeError> {
    Ok((value_at(values, start - 1)? + value_at(values, end + 1)?) / 2.0)
}

/// Compute all terms of the agreement score of `stem` in `dot`.
///
/// Fails if the reactivities do not match the structure length, or if any
/// position of the stem-loop has no data.
pub fn score_breakdown(
    dot: &str, 
    values: &[Reactivity], 
    stem: &Stem, 
    params: &ScoreParams
) -> Result<ScoreBreakdown, ShapeError> {
    if dot.len() != values.len() {
        return Err(ShapeError::LengthMismatch { expected: dot.len(), found: values.len() });
    }
    let sub = stem.slice(dot)?;
    require_data(values, stem.left_start, stem.right_end)?;
    let r = |p: NAIDX| value_at(values, p);

    let mut bd = ScoreBreakdown { span: stem.span_len(), ..Default::default() };

    // Gap-free helices.
    for fix in find_stems(sub, 0, 1)? {
        let fix = fix.shifted(stem.left_start - 1);
        let len = fix.left_len();
        debug_assert_eq!(len, fix.right_len());

        if len == 1 {
            bd.stem_score += (1.0 - r(fix.left_start)?) + (1.0 - r(fix.right_start)?);
            bd.stem_base += 2;
            continue;
        }

        let mut ave_inner = 0.0;
        if len > 2 {
            let inner = sorted_values(values, (fix.left_start + 1..fix.left_end)
                .chain(fix.right_start + 1..fix.right_end))?;
            let top = top2_mean(&inner);
            ave_inner = (1.0 - top) * TOP_WEIGHT + (1.0 - mean(&inner)) * (1.0 - TOP_WEIGHT);
            if top > params.stem_inter_cutoff {
                bd.stem_penalty += params.inter_penalty;
            }
        }

        let flank = sorted_values(values, [fix.left_start, fix.left_end, fix.right_start, fix.right_end].into_iter())?;
        let ave_flank = 1.0 - mean(&flank);
        if top2_mean(&flank) > params.stem_flanking_cutoff {
            bd.stem_penalty += params.flanking_penalty;
        }

        bd.stem_score += ave_inner * ((len - 2) * 2) as f64 + ave_flank * 4.0;
        bd.stem_base += len * 2;
    }

    // Hairpin loop.
    let hairpin = sorted_values(values, stem.left_end + 1..stem.right_start)?;
    bd.loop_base = stem.loop_len();
    if let Some(&max) = hairpin.last() {
        let top = top2_mean(&hairpin);
        let ave = top * TOP_WEIGHT + mean(&hairpin) * (1.0 - TOP_WEIGHT);
        bd.loop_score = ave * bd.loop_base as f64;
        if top > params.loop_cutoff {
            bd.loop_bonus = params.loop_bonus;
        }
        if max < params.loop_max_cutoff {
            bd.loop_penalty = (1.0 - max) * hairpin.len() as f64;
        }
    }

    let loops = find_bulges_and_interior_loops(dot, stem)?;

    for b in &loops.bulges {
        let sides = [
            (b.left_start, b.left_end, flank_mean(values, b.left_start, b.left_end)?), 
            (b.right_start, b.right_end, flank_mean(values, b.right_start, b.right_end)?),
        ];
        for (start, end, flank) in sides {
            let side = sorted_values(values, start..=end)?;
            if mean(&side) - flank > params.bulge_cutoff {
                bd.bulge_bonus += params.bulge_bonus_factor * side.len() as f64;
            } else {
                bd.bulge_score += side.iter().sum::<f64>();
            }
            bd.bulge_base += side.len();
        }
    }

    for il in &loops.interior_loops {
        let flank = flank_mean(values, il.start, il.end)?;
        let side = sorted_values(values, il.start..=il.end)?;
        if mean(&side) - flank > params.interloop_cutoff {
            bd.interior_bonus += params.interloop_factor * side.len() as f64;
        } else {
            bd.interior_score += side.iter().sum::<f64>();
        }
        bd.interior_base += side.len();
    }

    if bd.counted() != bd.span {
        return Err(ShapeError::Decomposition { stem: *stem, counted: bd.counted() });
    }
    log::debug!("SHAPE score terms of stem {stem}:\n{bd}");
    Ok(bd)
}

/// SHAPE-structure agreement score of a stem-loop, rounded to three
/// decimals. Higher is better.
pub fn score_stem(
    dot: &str, 
    values: &[Reactivity], 
    stem: &Stem, 
    params: &ScoreParams
) -> Result<f64, ShapeError> {
    Ok(score_breakdown(dot, values, stem, params)?.score())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOT: &str = "....(((((((((...))))))..))).....((.((((((...)))))).))..";

    fn profile(f: impl Fn(usize, u8) -> f64) -> Vec<Reactivity> {
        DOT.bytes().enumerate().map(|(k, c)| Some(f(k + 1, c))).collect()
    }

    /// Unpaired bases reactive, paired bases protected.
    fn agreeing() -> Vec<Reactivity> {
        profile(|p, c| if c == b'.' { 0.5 + 0.05 * (p % 7) as f64 } else { 0.02 * (p % 5) as f64 })
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_score_agreeing_profile() {
        let v = agreeing();
        let p = ScoreParams::default();
        assert_eq!(score_stem(DOT, &v, &Stem::new(5, 13, 17, 27), &p).unwrap(), 1.081);
        assert_eq!(score_stem(DOT, &v, &Stem::new(33, 41, 45, 53), &p).unwrap(), 0.856);
        assert_eq!(score_stem(DOT, &v, &Stem::new(36, 41, 45, 50), &p).unwrap(), 0.875);
    }

    #[test]
    fn test_breakdown_partitions_span() {
        let v = agreeing();
        let bd = score_breakdown(DOT, &v, &Stem::new(5, 13, 17, 27), &ScoreParams::default()).unwrap();
        assert_eq!(bd.span, 23);
        assert_eq!((bd.stem_base, bd.loop_base, bd.bulge_base, bd.interior_base), (18, 3, 0, 2));
        assert!(close(bd.stem_score, 17.176));
        assert!(close(bd.loop_score, 1.695));
        // The interior loop (23,24) is far more reactive than its flanks.
        assert_eq!(bd.interior_bonus, 6.0);
        assert_eq!(bd.interior_score, 0.0);

        let bd = score_breakdown(DOT, &v, &Stem::new(33, 41, 45, 53), &ScoreParams::default()).unwrap();
        assert_eq!((bd.stem_base, bd.loop_base, bd.bulge_base, bd.interior_base), (16, 3, 2, 0));
        assert!(close(bd.bulge_score, 1.1));
    }

    #[test]
    fn test_score_flat_profile() {
        // An unreactive hairpin loop is penalized.
        let v = profile(|_, _| 0.1);
        let p = ScoreParams::default();
        let bd = score_breakdown(DOT, &v, &Stem::new(5, 13, 17, 27), &p).unwrap();
        assert!(close(bd.loop_penalty, 2.7));
        assert_eq!(bd.score(), 0.609);
        assert_eq!(score_stem(DOT, &v, &Stem::new(33, 41, 45, 53), &p).unwrap(), 0.581);
    }

    #[test]
    fn test_score_reactive_stem() {
        let v = profile(|_, _| 0.9);
        let bd = score_breakdown(DOT, &v, &Stem::new(5, 13, 17, 27), &ScoreParams::default()).unwrap();
        // Two helices, each with interior and flank penalties.
        assert_eq!(bd.stem_penalty, 8.0);
        assert_eq!(bd.loop_bonus, 2.0);
        assert_eq!(bd.score(), 0.013);
    }

    #[test]
    fn test_score_bonuses() {
        let v = profile(|p, _| match p {
            23 | 24 | 35 | 51 => 0.95,
            14..=16 | 42..=44 => 0.85,
            _ => 0.05,
        });
        let p = ScoreParams::default();
        let bd = score_breakdown(DOT, &v, &Stem::new(33, 41, 45, 53), &p).unwrap();
        assert_eq!(bd.bulge_bonus, 4.0);
        assert_eq!(bd.loop_bonus, 2.0);
        assert_eq!(bd.score(), 1.131);
        assert_eq!(score_stem(DOT, &v, &Stem::new(5, 13, 17, 27), &p).unwrap(), 1.202);

        // Stricter cutoffs remove the bonuses.
        let strict = ScoreParams { bulge_cutoff: 0.95, loop_cutoff: 0.95, ..p };
        let bd = score_breakdown(DOT, &v, &Stem::new(33, 41, 45, 53), &strict).unwrap();
        assert_eq!(bd.bulge_bonus, 0.0);
        assert_eq!(bd.loop_bonus, 0.0);
        assert!(close(bd.bulge_score, 1.9));
    }

    #[test]
    fn test_score_missing_data() {
        let mut v = agreeing();
        v[20] = None;
        let p = ScoreParams::default();
        assert!(matches!(score_stem(DOT, &v, &Stem::new(5, 13, 17, 27), &p), 
            Err(ShapeError::MissingData { position: 21 })));
        // Outside the stem-loop, missing data is fine.
        assert!(score_stem(DOT, &v, &Stem::new(33, 41, 45, 53), &p).is_ok());
    }

    #[test]
    fn test_score_length_mismatch() {
        let v = agreeing();
        let p = ScoreParams::default();
        assert!(matches!(score_stem(&DOT[1..], &v, &Stem::new(5, 13, 17, 27), &p), 
            Err(ShapeError::LengthMismatch { .. })));
        assert!(matches!(score_stem(DOT, &v, &Stem::new(33, 41, 45, 60), &p), 
            Err(ShapeError::Structure(_))));
    }

    #[test]
    fn test_score_inverted_stem() {
        let v = vec![Some(0.2); DOT.len()];
        let inverted = Stem { left_start: 5, left_end: 20, right_start: 17, right_end: 27 };
        assert!(matches!(score_stem(DOT, &v, &inverted, &ScoreParams::default()),
            Err(ShapeError::Structure(sc_structure::StructureError::Malformed(_)))));
    }

    #[test]
    fn test_decomposition_mismatch() {
        // A span that cuts through helices does not partition.
        let dot = "((((...))))";
        let v: Vec<Reactivity> = vec![Some(0.1); dot.len()];
        let stem = Stem::new(2, 4, 8, 11);
        assert!(matches!(score_stem(dot, &v, &stem, &ScoreParams::default()),
            Err(ShapeError::Decomposition { counted: 9, .. })));
    }
}
