//! Stems, stem-loops, bulges and interior loops.
//!
//! A `Stem` is described by its two arms: `left_start..=left_end` on the
//! 5' side pairs with `right_start..=right_end` on the 3' side, where
//! `left_start` pairs with `right_end` and `left_end` with `right_start`.
//! Within an arm there may be gaps of unpaired bases, bounded by the
//! `max_gap` parameter of `find_stems`.
//!

use std::fmt;
use serde::Deserialize;
use serde::Serialize;

use crate::NAIDX;
use crate::DotBracket;
use crate::StructureError;
use crate::parse_symbols;
use crate::to_base_pairs;

/// A helix with (possibly gapped) arms, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stem {
    pub left_start: NAIDX,
    pub left_end: NAIDX,
    pub right_start: NAIDX,
    pub right_end: NAIDX,
}

impl Stem {
    pub fn new(left_start: NAIDX, left_end: NAIDX, right_start: NAIDX, right_end: NAIDX) -> Self {
        debug_assert!(left_start <= left_end && left_end < right_start && right_start <= right_end);
        Stem { left_start, left_end, right_start, right_end }
    }

    /// Number of positions covered by the 5' arm.
    pub fn left_len(&self) -> usize {
        (self.left_end - self.left_start + 1) as usize
    }

    /// Number of positions covered by the 3' arm.
    pub fn right_len(&self) -> usize {
        (self.right_end - self.right_start + 1) as usize
    }

    /// Number of positions enclosed by the innermost pair.
    pub fn loop_len(&self) -> usize {
        (self.right_start - self.left_end - 1) as usize
    }

    /// Number of positions from `left_start` to `right_end`.
    pub fn span_len(&self) -> usize {
        (self.right_end - self.left_start + 1) as usize
    }

    /// True if the spans of both stems share at least one position.
    pub fn overlaps(&self, other: &Stem) -> bool {
        self.left_start <= other.right_end && other.left_start <= self.right_end
    }

    /// The same stem, moved `offset` positions downstream.
    pub fn shifted(&self, offset: NAIDX) -> Self {
        Stem {
            left_start: self.left_start + offset,
            left_end: self.left_end + offset,
            right_start: self.right_start + offset,
            right_end: self.right_end + offset,
        }
    }

    /// Fails with `Malformed` unless `left_start <= left_end < right_start
    /// <= right_end` and the stem fits into a structure of `length`.
    pub fn check(&self, length: usize) -> Result<(), StructureError> {
        let ordered = 0 < self.left_start 
            && self.left_start <= self.left_end 
            && self.left_end < self.right_start 
            && self.right_start <= self.right_end;
        if !ordered {
            return Err(StructureError::Malformed(format!("stem {self} has inverted boundaries")));
        }
        if self.right_end as usize > length {
            return Err(StructureError::Malformed(
                format!("stem {self} exceeds structure of length {length}")));
        }
        Ok(())
    }

    /// The dot-bracket columns covered by this stem.
    pub fn slice<'a>(&self, dot: &'a str) -> Result<&'a str, StructureError> {
        self.check(dot.len())?;
        (self.left_start as usize).checked_sub(1)
            .and_then(|start| dot.get(start..self.right_end as usize))
            .ok_or_else(|| StructureError::Malformed(
                format!("stem {self} exceeds structure of length {}", dot.len())))
    }

    fn qualifies(&self, min_len: usize) -> bool {
        self.left_len() >= min_len && self.right_len() >= min_len
    }
}

impl fmt::Display for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{},{})", self.left_start, self.left_end, self.right_start, self.right_end)
    }
}

/// Unpaired bases on both strands between two paired regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bulge {
    pub left_start: NAIDX,
    pub left_end: NAIDX,
    pub right_start: NAIDX,
    pub right_end: NAIDX,
}

impl Bulge {
    pub fn left_len(&self) -> usize {
        (self.left_end - self.left_start + 1) as usize
    }

    pub fn right_len(&self) -> usize {
        (self.right_end - self.right_start + 1) as usize
    }
}

/// Unpaired bases on one strand only, facing a paired region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteriorLoop {
    pub start: NAIDX,
    pub end: NAIDX,
}

impl InteriorLoop {
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Unpaired regions within the arms of a stem, in the order the walk
/// from the loop outwards encountered them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopDecomposition {
    pub bulges: Vec<Bulge>,
    pub interior_loops: Vec<InteriorLoop>,
}

impl LoopDecomposition {
    /// Total number of unpaired positions in bulges and interior loops.
    pub fn unpaired_len(&self) -> usize {
        self.bulges.iter().map(|b| b.left_len() + b.right_len()).sum::<usize>()
            + self.interior_loops.iter().map(|l| l.len()).sum::<usize>()
    }
}

/// Find stems: runs of pairs where consecutive pairs are nested and at
/// most `max_gap` unpaired positions apart on either arm. Stems with an
/// arm shorter than `min_len` are dropped.
pub fn find_stems(dot: &str, max_gap: usize, min_len: usize) -> Result<Vec<Stem>, StructureError> {
    let pairs = to_base_pairs(dot)?;
    let mut stems = Vec::new();
    let mut iter = pairs.iter();
    let Some(first) = iter.next() else {
        return Ok(stems);
    };

    let mut current = Stem::new(first.i(), first.i(), first.j(), first.j());
    for pair in iter {
        let left_gap = (pair.i() - current.left_end - 1) as usize;
        let nested = pair.j() < current.right_start;
        if !nested || left_gap > max_gap || (current.right_start - pair.j() - 1) as usize > max_gap {
            if current.qualifies(min_len) {
                stems.push(current);
            }
            current = Stem::new(pair.i(), pair.i(), pair.j(), pair.j());
        } else {
            current.left_end = pair.i();
            current.right_start = pair.j();
        }
    }
    if current.qualifies(min_len) {
        stems.push(current);
    }
    Ok(stems)
}

/// Trim short helices from the outer end of a stem. 
///
/// The stem is split into gap-free sub-stems; the outermost sub-stem with
/// at least `min_fix_len` pairs becomes the new outer boundary, the loop
/// boundary (`left_end`, `right_start`) is kept. Returns `None` if no
/// sub-stem is long enough, or if the first long enough sub-stem is a
/// helix enclosed by the loop rather than part of the arms.
pub fn trim_stem(dot: &str, stem: &Stem, min_fix_len: usize) -> Result<Option<Stem>, StructureError> {
    let sub = stem.slice(dot)?;
    let offset = stem.left_start - 1;
    Ok(find_stems(sub, 0, 1)?
        .into_iter()
        .find(|fix| fix.left_len() >= min_fix_len)
        .filter(|fix| fix.left_end + offset <= stem.left_end)
        .map(|fix| Stem::new(
            fix.left_start + offset, 
            stem.left_end, 
            stem.right_start, 
            fix.right_end + offset)))
}

/// Stems that close a hairpin loop of at most `max_loop_len` positions.
pub fn find_stem_loops(
    dot: &str, 
    max_loop_len: usize, 
    max_gap: usize, 
    min_len: usize
) -> Result<Vec<Stem>, StructureError> {
    Ok(find_stems(dot, max_gap, min_len)?
        .into_iter()
        .filter(|s| s.loop_len() <= max_loop_len)
        .collect())
}

/// Walk from the loop boundary of a stem outwards and collect the unpaired
/// regions in its arms. Unpaired runs on one side only are interior loops,
/// runs on both sides at the same step are bulges.
pub fn find_bulges_and_interior_loops(
    dot: &str, 
    stem: &Stem
) -> Result<LoopDecomposition, StructureError> {
    let symbols = parse_symbols(dot)?;
    stem.check(symbols.len())?;
    let unpaired = |p: NAIDX| symbols[p as usize - 1] == DotBracket::Unpaired;

    let (ls, re) = (stem.left_start, stem.right_end);
    let mut result = LoopDecomposition::default();
    let mut i = stem.left_end;
    let mut j = stem.right_start;
    loop {
        while i >= ls && j <= re && !unpaired(i) && !unpaired(j) {
            i -= 1;
            j += 1;
        }
        if i < ls || j > re {
            break;
        }
        match (unpaired(i), unpaired(j)) {
            (false, true) => {
                let start = j;
                j += 1;
                while j <= re && unpaired(j) {
                    j += 1;
                }
                result.interior_loops.push(InteriorLoop { start, end: j - 1 });
            }
            (true, false) => {
                let end = i;
                i -= 1;
                while i >= ls && unpaired(i) {
                    i -= 1;
                }
                result.interior_loops.push(InteriorLoop { start: i + 1, end });
            }
            (true, true) => {
                let (left_end, right_start) = (i, j);
                i -= 1;
                j += 1;
                while j <= re && unpaired(j) {
                    j += 1;
                }
                while i >= ls && unpaired(i) {
                    i -= 1;
                }
                result.bulges.push(Bulge { 
                    left_start: i + 1, 
                    left_end, 
                    right_start, 
                    right_end: j - 1 
                });
            }
            (false, false) => unreachable!("paired columns are consumed above"),
        }
    }
    Ok(result)
}
