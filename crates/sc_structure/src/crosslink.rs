//! Candidate TT (psoralen-type) cross-linking sites.
//!
//! A pyrimidine at one end of a pair can cross-link to a T/U that is
//! stacked next to the partner base on the opposite strand. For every
//! pair (i, j) we report the shifted position pairs where that happens.
//!

use itertools::Itertools;

use crate::NAIDX;
use crate::StructureError;
use crate::to_base_pairs;

fn is_t(b: u8) -> bool {
    matches!(b.to_ascii_uppercase(), b'T' | b'U')
}

/// Cross-linkable position pairs (1-based), sorted by the first position
/// and free of duplicates.
pub fn tt_crosslink_sites(sequence: &str, dot: &str) -> Result<Vec<(NAIDX, NAIDX)>, StructureError> {
    let pairs = to_base_pairs(dot)?;
    let seq = sequence.as_bytes();
    if seq.len() != pairs.length() {
        return Err(StructureError::LengthMismatch { 
            expected: pairs.length(), 
            found: seq.len() 
        });
    }
    let n = seq.len() as NAIDX;
    let base = |p: NAIDX| seq[p as usize - 1];

    let mut sites = Vec::new();
    for pair in pairs.iter() {
        let (i, j) = (pair.i(), pair.j());
        let top_t = is_t(base(j));
        let bot_t = is_t(base(i));

        if top_t && i > 1 && is_t(base(i - 1)) {
            sites.push((i - 1, j));
        }
        if top_t && is_t(base(i + 1)) {
            sites.push((i + 1, j));
        }
        if bot_t && j < n && is_t(base(j + 1)) {
            sites.push((i, j + 1));
        }
        if bot_t && is_t(base(j - 1)) {
            sites.push((i, j - 1));
        }
    }
    // Sites within a closing pair (i+1 == j) would link a base to itself.
    sites.retain(|&(a, b)| a < b);
    sites.sort_by_key(|&(a, _)| a);
    Ok(sites.into_iter().unique().collect())
}
