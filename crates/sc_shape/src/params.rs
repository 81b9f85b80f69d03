//! Scoring parameters.
//!
//! Cutoffs are compared against reactivity means, bonuses and penalties
//! are added to (or subtracted from) the summed score before it is
//! normalized by the stem length. Any subset can be overridden from JSON:
//!
//! ```
//! use sc_shape::ScoreParams;
//! let p = ScoreParams::from_json(r#"{ "loop_bonus": 3.0 }"#).unwrap();
//! assert_eq!(p.loop_bonus, 3.0);
//! assert_eq!(p.loop_cutoff, 0.7);
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::ShapeError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreParams {
    /// Stem interior: top-2 mean above this is penalized (lower is stricter).
    pub stem_inter_cutoff: f64,
    pub inter_penalty: f64,
    /// Stem flanks: top-2 mean above this is penalized (lower is stricter).
    pub stem_flanking_cutoff: f64,
    pub flanking_penalty: f64,
    /// Hairpin loop: top-2 mean above this earns a bonus (higher is stricter).
    pub loop_cutoff: f64,
    pub loop_bonus: f64,
    /// Hairpin loop: a maximum below this is penalized (higher is stricter).
    pub loop_max_cutoff: f64,
    /// Bulge side: excess over its flanks above this earns a bonus.
    pub bulge_cutoff: f64,
    pub bulge_bonus_factor: f64,
    /// Interior loop: excess over its flanks above this earns a bonus.
    pub interloop_cutoff: f64,
    pub interloop_factor: f64,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            stem_inter_cutoff: 0.7,
            inter_penalty: 2.0,
            stem_flanking_cutoff: 0.8,
            flanking_penalty: 2.0,
            loop_cutoff: 0.7,
            loop_bonus: 2.0,
            loop_max_cutoff: 0.4,
            bulge_cutoff: 0.6,
            bulge_bonus_factor: 2.0,
            interloop_cutoff: 0.6,
            interloop_factor: 3.0,
        }
    }
}

impl ScoreParams {
    /// Defaults, overridden by the fields present in `json`.
    pub fn from_json(json: &str) -> Result<Self, ShapeError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override() {
        let p = ScoreParams::from_json(r#"{"bulge_cutoff": 0.5, "interloop_factor": 1}"#).unwrap();
        assert_eq!(p.bulge_cutoff, 0.5);
        assert_eq!(p.interloop_factor, 1.0);
        assert_eq!(p.stem_inter_cutoff, ScoreParams::default().stem_inter_cutoff);
    }

    #[test]
    fn test_json_roundtrip() {
        let p = ScoreParams::default();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(ScoreParams::from_json(&json).unwrap(), p);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(ScoreParams::from_json("{ loop_bonus: }"), Err(ShapeError::Config(_))));
        assert!(matches!(ScoreParams::from_json(r#"{"loop_bonus": "high"}"#), Err(ShapeError::Config(_))));
    }
}
