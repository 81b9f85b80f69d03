//! Reactivity profiles.
//!
//! A profile holds one value per position, `None` where the experiment
//! produced no data (written as `NULL` in text form).
//!

use sc_structure::NAIDX;
use sc_structure::alignment::GAP;

use crate::ShapeError;

/// A per-position reactivity, `None` marks missing data.
pub type Reactivity = Option<f64>;

/// Text form of a missing value.
pub const NO_DATA: &str = "NULL";

/// Parse a single token, `NULL` (any case) is missing data.
pub fn parse_reactivity(token: &str) -> Result<Reactivity, ShapeError> {
    if token.eq_ignore_ascii_case(NO_DATA) {
        return Ok(None);
    }
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ShapeError::InvalidValue(token.to_string())),
    }
}

/// Parse a whitespace- or comma-separated profile.
pub fn parse_reactivities(text: &str) -> Result<Vec<Reactivity>, ShapeError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tok| !tok.is_empty())
        .map(parse_reactivity)
        .collect()
}

/// Fraction of positions that carry data. Zero for an empty profile.
pub fn coverage(values: &[Reactivity]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| v.is_some()).count() as f64 / values.len() as f64
}

/// The value at 1-based position `p`, or `MissingData`.
pub fn value_at(values: &[Reactivity], p: NAIDX) -> Result<f64, ShapeError> {
    (p as usize).checked_sub(1)
        .and_then(|k| values.get(k).copied().flatten())
        .ok_or(ShapeError::MissingData { position: p })
}

/// Ensure that every position in `start..=end` (1-based) carries data.
pub fn require_data(values: &[Reactivity], start: NAIDX, end: NAIDX) -> Result<(), ShapeError> {
    (start..=end).try_for_each(|p| value_at(values, p).map(|_| ()))
}

/// Spread a profile over a gapped alignment row; gaps get no data.
pub fn aligned_reactivities(values: &[Reactivity], aligned_seq: &str) -> Result<Vec<Reactivity>, ShapeError> {
    let residues = aligned_seq.chars().filter(|&c| c != GAP).count();
    if residues != values.len() {
        return Err(ShapeError::LengthMismatch { expected: residues, found: values.len() });
    }
    let mut iter = values.iter();
    Ok(aligned_seq.chars()
        .map(|c| if c == GAP { None } else { iter.next().copied().flatten() })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reactivities() {
        let v = parse_reactivities("0.1 NULL,0.75\n null 1e-2").unwrap();
        assert_eq!(v, vec![Some(0.1), None, Some(0.75), None, Some(0.01)]);
        assert!(matches!(parse_reactivities("0.1 abc"), Err(ShapeError::InvalidValue(t)) if t == "abc"));
        assert!(parse_reactivities("NaN").is_err());
        assert!(parse_reactivities("").unwrap().is_empty());
    }

    #[test]
    fn test_coverage() {
        assert_eq!(coverage(&[]), 0.0);
        assert_eq!(coverage(&[Some(0.1), None, Some(0.2), None]), 0.5);
        assert_eq!(coverage(&[None, None]), 0.0);
    }

    #[test]
    fn test_require_data() {
        let v = vec![Some(0.1), Some(0.2), None, Some(0.4)];
        assert!(require_data(&v, 1, 2).is_ok());
        assert!(matches!(require_data(&v, 2, 4), Err(ShapeError::MissingData { position: 3 })));
        assert!(matches!(value_at(&v, 0), Err(ShapeError::MissingData { position: 0 })));
        assert!(matches!(value_at(&v, 5), Err(ShapeError::MissingData { position: 5 })));
        assert_eq!(value_at(&v, 4).unwrap(), 0.4);
    }

    #[test]
    fn test_aligned_reactivities() {
        let v = vec![Some(0.1), None, Some(0.3)];
        let a = aligned_reactivities(&v, "A--C-G").unwrap();
        assert_eq!(a, vec![Some(0.1), None, None, None, None, Some(0.3)]);
        assert!(aligned_reactivities(&v, "A-C").is_err());
    }
}
