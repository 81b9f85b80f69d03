//! Sliding-window scan for stem-loops.
//!
//! Windows of `window_size` bases are placed every `window_step` bases.
//! Each window is folded by a `StructurePredictor`, its stem-loops are
//! trimmed and (with reactivities) scored. Hits from overlapping windows
//! are then reduced: of two overlapping hits, the one with the better
//! score (or, without reactivities, the longer span) survives.
//!
//! Windows are independent. With the `parallel` feature they are folded
//! on the rayon thread pool; the result does not depend on completion
//! order.
//!

use serde::Deserialize;
use serde::Serialize;

use sc_structure::NAIDX;
use sc_structure::Stem;
use sc_structure::find_stem_loops;
use sc_structure::trim_stem;

use crate::Reactivity;
use crate::ScoreParams;
use crate::ShapeError;
use crate::StructurePredictor;
use crate::coverage;
use crate::require_data;
use crate::score_stem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Largest hairpin loop of a reported stem-loop.
    pub max_loop_len: usize,
    /// Largest gap within a stem arm.
    pub max_stem_gap: usize,
    /// Shortest stem arm before trimming.
    pub min_stem_len: usize,
    /// 0-based offset of the first window.
    pub start: usize,
    /// 0-based, exclusive end of the scanned region. Defaults to the
    /// sequence length.
    pub end: Option<usize>,
    pub window_size: usize,
    pub window_step: usize,
    /// Skip windows whose reactivity coverage is below `min_coverage`.
    pub skip_low_coverage: bool,
    pub min_coverage: f64,
    /// Shortest gap-free helix at the outer end of a trimmed stem.
    pub min_fix_stem_len: usize,
    /// Smallest `left_end - left_start` of a trimmed stem.
    pub min_left_extent: usize,
    pub params: ScoreParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_loop_len: 8,
            max_stem_gap: 3,
            min_stem_len: 5,
            start: 0,
            end: None,
            window_size: 200,
            window_step: 100,
            skip_low_coverage: true,
            min_coverage: 0.3,
            min_fix_stem_len: 3,
            min_left_extent: 5,
            params: ScoreParams::default(),
        }
    }
}

impl ScanConfig {
    /// Defaults, overridden by the fields present in `json`.
    pub fn from_json(json: &str) -> Result<Self, ShapeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Window start offsets for a sequence of length `length`.
    pub fn window_starts(&self, length: usize) -> Result<Vec<usize>, ShapeError> {
        if self.window_size == 0 || self.window_step == 0 {
            return Err(ShapeError::Config("window size and step must be positive".to_string()));
        }
        let end = self.end.unwrap_or(length);
        if end > length {
            return Err(ShapeError::Config(format!("end {end} exceeds sequence length {length}")));
        }
        // start + window_size / 2 < end, without rounding.
        Ok((self.start..)
            .step_by(self.window_step)
            .take_while(|&s| 2 * s + self.window_size < 2 * end)
            .collect())
    }
}

/// A stem-loop found in one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowHit {
    /// The trimmed stem in sequence coordinates (1-based).
    pub stem: Stem,
    /// The predicted structure of the stem-loop.
    pub dot: String,
    /// SHAPE agreement, if reactivities were given.
    pub score: Option<f64>,
}

/// How to choose between overlapping hits, and how to order the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    /// Keep the higher score, sort by descending score.
    Score,
    /// Keep the longer span, sort by position.
    Span,
}

/// Remove overlapping hits and sort the remainder.
///
/// Hits are ordered by descending `left_start`, then adjacent overlapping
/// hits are reduced to the better one. On ties the later one is kept.
pub fn merge_overlapping(mut hits: Vec<WindowHit>, rank: RankBy) -> Vec<WindowHit> {
    hits.sort_by(|a, b| b.stem.left_start.cmp(&a.stem.left_start));
    let mut k = 1;
    while k < hits.len() {
        let (prev, next) = (&hits[k - 1], &hits[k]);
        if !prev.stem.overlaps(&next.stem) {
            k += 1;
            continue;
        }
        let keep_prev = match rank {
            RankBy::Score => prev.score > next.score,
            RankBy::Span => prev.stem.span_len() > next.stem.span_len(),
        };
        hits.remove(if keep_prev { k } else { k - 1 });
    }

    match rank {
        RankBy::Score => hits.sort_by(|a, b| {
            let (sa, sb) = (a.score.unwrap_or(f64::NEG_INFINITY), b.score.unwrap_or(f64::NEG_INFINITY));
            sb.total_cmp(&sa)
        }),
        RankBy::Span => hits.sort_by_key(|h| h.stem.left_start),
    }
    hits
}

fn scan_window<P>(
    sequence: &str,
    reactivities: Option<&[Reactivity]>,
    predictor: &P,
    config: &ScanConfig,
    start: usize,
) -> Result<Vec<WindowHit>, ShapeError> 
where P: StructurePredictor + ?Sized,
{
    let stop = (start + config.window_size).min(sequence.len());
    let window = &sequence[start..stop];
    let values = reactivities.map(|r| &r[start..stop]);

    if let Some(values) = values {
        let cov = coverage(values);
        if config.skip_low_coverage && cov < config.min_coverage {
            log::debug!("Window {}-{}: skipped, reactivity coverage {:.2}.", start + 1, stop, cov);
            return Ok(Vec::new());
        }
    }

    let dot = predictor.predict(window, values).map_err(ShapeError::Prediction)?;
    if dot.len() != window.len() {
        return Err(ShapeError::LengthMismatch { expected: window.len(), found: dot.len() });
    }

    let mut hits = Vec::new();
    let stem_loops = find_stem_loops(&dot, config.max_loop_len, config.max_stem_gap, config.min_stem_len)?;
    for stem_loop in stem_loops {
        let Some(stem) = trim_stem(&dot, &stem_loop, config.min_fix_stem_len)? else {
            continue;
        };
        if ((stem.left_end - stem.left_start) as usize) < config.min_left_extent {
            continue;
        }
        let score = match values {
            Some(values) => {
                if require_data(values, stem.left_start, stem.right_end).is_err() {
                    log::trace!("Window {}-{}: stem {} lacks reactivities.", start + 1, stop, stem);
                    continue;
                }
                Some(score_stem(&dot, values, &stem, &config.params)?)
            }
            None => None,
        };
        hits.push(WindowHit {
            stem: stem.shifted(start as NAIDX),
            dot: stem.slice(&dot)?.to_string(),
            score,
        });
    }
    log::debug!("Window {}-{}: {} stem-loops.", start + 1, stop, hits.len());
    Ok(hits)
}

/// Scan `sequence` for stem-loops with a sliding window.
///
/// With reactivities, hits are scored and ranked by descending score;
/// without, they are ranked by position. Predictor errors are returned
/// unchanged, wrapped in `ShapeError::Prediction`.
pub fn scan_stem_loops<P>(
    sequence: &str,
    reactivities: Option<&[Reactivity]>,
    predictor: &P,
    config: &ScanConfig,
) -> Result<Vec<WindowHit>, ShapeError> 
where P: StructurePredictor + Sync + ?Sized,
{
    if !sequence.is_ascii() {
        return Err(ShapeError::InvalidValue("sequence contains non-ASCII symbols".to_string()));
    }
    if let Some(r) = reactivities {
        if r.len() != sequence.len() {
            return Err(ShapeError::LengthMismatch { expected: sequence.len(), found: r.len() });
        }
    }
    let starts = config.window_starts(sequence.len())?;
    log::info!("Scanning {} windows of {} nt.", starts.len(), config.window_size);

    #[cfg(feature = "parallel")]
    let per_window: Vec<Result<Vec<WindowHit>, ShapeError>> = {
        use rayon::prelude::*;
        starts.into_par_iter()
            .map(|s| scan_window(sequence, reactivities, predictor, config, s))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let per_window: Vec<Result<Vec<WindowHit>, ShapeError>> = starts.into_iter()
        .map(|s| scan_window(sequence, reactivities, predictor, config, s))
        .collect();

    // Errors are reported for the first failing window.
    let mut hits = Vec::new();
    for result in per_window {
        hits.extend(result?);
    }

    let rank = if reactivities.is_some() { RankBy::Score } else { RankBy::Span };
    Ok(merge_overlapping(hits, rank))
}
