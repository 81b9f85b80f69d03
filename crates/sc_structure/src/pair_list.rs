//! Pair, PairList and PairMap definitions. 
//!
//! Beware that these representations are **1-based**, matching the
//! columns of a dot-bracket string: position `i` is symbol `i - 1`.
//!
//! A `Pair` is defined by two indices (`NAIDX`) which can be packed into a
//! single integer key (`P1KEY`), used for exact pair lookups in `IntSet`s.
//! 

use std::fmt;
use nohash_hasher::IntMap;
use nohash_hasher::IntSet;

use crate::StructureError;
use crate::NAIDX;
use crate::P1KEY;
use crate::to_base_pairs;


/// A base pair (i, j) with i < j.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    i: NAIDX,
    j: NAIDX,
}

impl Pair {
    /// Create a new pair (i, j). Panics in debug if i >= j.
    pub fn new(i: NAIDX, j: NAIDX) -> Self {
        debug_assert!(0 < i && i < j);
        Pair { i, j }
    }

    /// Return the 5'-side position.
    pub fn i(&self) -> NAIDX {
        self.i
    }

    /// Return the 3'-side position.
    pub fn j(&self) -> NAIDX {
        self.j
    }

    /// True if the two pairs interleave, i.e. form a pseudoknot.
    pub fn crosses(&self, other: &Pair) -> bool {
        (self.i < other.i && other.i < self.j && self.j < other.j) ||
        (other.i < self.i && self.i < other.j && other.j < self.j)
    }

    /// Compact 64-bit key encoding both positions.
    pub fn key(&self) -> P1KEY {
        ((self.i as P1KEY) << NAIDX::BITS) | (self.j as P1KEY)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.i, self.j)
    }
}

/// The base pairs of a structure, sorted by their 5'-side position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairList {
    length: usize,
    pairs: Vec<Pair>,
}

impl PairList {
    /// Build a pair list from arbitrary (i, j) tuples. Tuples with `i >= j`
    /// are dropped, tuples outside `1..=length` or reusing a position are
    /// rejected.
    pub fn from_tuples<I>(length: usize, tuples: I) -> Result<Self, StructureError>
    where I: IntoIterator<Item = (NAIDX, NAIDX)>,
    {
        let mut seen: IntSet<NAIDX> = IntSet::default();
        let mut pairs = Vec::new();
        for (i, j) in tuples {
            if i >= j {
                continue;
            }
            if i == 0 || j as usize > length {
                return Err(StructureError::PairOutOfRange { i, j, length });
            }
            for p in [i, j] {
                if !seen.insert(p) {
                    return Err(StructureError::PositionConflict { position: p });
                }
            }
            pairs.push(Pair::new(i, j));
        }
        pairs.sort_unstable();
        Ok(PairList { length, pairs })
    }

    pub(crate) fn from_sorted(length: usize, pairs: Vec<Pair>) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].i() < w[1].i()));
        PairList { length, pairs }
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> + '_ {
        self.pairs.iter()
    }

    /// Number of base pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Length of the underlying structure.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The set of all positions that take part in a pair.
    pub fn paired_positions(&self) -> IntSet<NAIDX> {
        self.pairs.iter().flat_map(|p| [p.i(), p.j()]).collect()
    }

    /// The pairs as plain (i, j) tuples.
    pub fn to_tuples(&self) -> Vec<(NAIDX, NAIDX)> {
        self.pairs.iter().map(|p| (p.i(), p.j())).collect()
    }
}

impl TryFrom<&str> for PairList {
    type Error = StructureError;

    fn try_from(dot: &str) -> Result<Self, Self::Error> {
        to_base_pairs(dot)
    }
}

impl fmt::Display for PairList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for pair in &self.pairs {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{pair}")?;
            first = false;
        }
        Ok(())
    }
}

/// Symmetric position -> partner lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairMap {
    partners: IntMap<NAIDX, NAIDX>,
}

impl PairMap {
    /// The partner of position `i`, if it is paired.
    pub fn get(&self, i: NAIDX) -> Option<NAIDX> {
        self.partners.get(&i).copied()
    }

    pub fn is_paired(&self, i: NAIDX) -> bool {
        self.partners.contains_key(&i)
    }

    /// Number of paired positions (twice the number of pairs).
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Iterator over (position, partner) in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (NAIDX, NAIDX)> + '_ {
        self.partners.iter().map(|(&i, &j)| (i, j))
    }
}

impl From<&PairList> for PairMap {
    fn from(pl: &PairList) -> Self {
        let mut partners = IntMap::default();
        for pair in pl.iter() {
            partners.insert(pair.i(), pair.j());
            partners.insert(pair.j(), pair.i());
        }
        PairMap { partners }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_keys() {
        let pairs = [Pair::new(1, 42), Pair::new(1, 43), Pair::new(42, 70_000), Pair::new(70_000, 4_000_000)];
        let keys: IntSet<P1KEY> = pairs.iter().map(Pair::key).collect();
        assert_eq!(keys.len(), pairs.len());
        // Keys sort like pairs.
        assert!(pairs.windows(2).all(|w| w[0].key() < w[1].key()));
        assert_eq!(Pair::new(70_000, 4_000_000).key(), (70_000 << 32) | 4_000_000);
    }

    #[test]
    fn test_pair_crosses() {
        assert!(Pair::new(1, 10).crosses(&Pair::new(5, 15)));
        assert!(Pair::new(5, 15).crosses(&Pair::new(1, 10)));
        assert!(!Pair::new(1, 10).crosses(&Pair::new(2, 9)));
        assert!(!Pair::new(1, 4).crosses(&Pair::new(5, 9)));
    }

    #[test]
    fn test_pair_list_from_tuples() {
        let pl = PairList::from_tuples(10, [(4, 7), (3, 8), (9, 2)]).unwrap();
        assert_eq!(pl.length(), 10);
        assert_eq!(pl.pairs(), &[Pair::new(3, 8), Pair::new(4, 7)]);
        assert_eq!(format!("{pl}"), "(3,8),(4,7)");
    }

    #[test]
    fn test_pair_list_rejects_bad_tuples() {
        assert_eq!(PairList::from_tuples(5, [(1, 6)]),
            Err(StructureError::PairOutOfRange { i: 1, j: 6, length: 5 }));
        assert_eq!(PairList::from_tuples(5, [(0, 3)]),
            Err(StructureError::PairOutOfRange { i: 0, j: 3, length: 5 }));
        assert_eq!(PairList::from_tuples(8, [(1, 5), (2, 5)]),
            Err(StructureError::PositionConflict { position: 5 }));
    }

    #[test]
    fn test_pair_map_from_pair_list() {
        let pl = PairList::try_from("((..))").unwrap();
        let pm = PairMap::from(&pl);
        assert_eq!(pm.len(), 4);
        assert_eq!(pm.get(1), Some(6));
        assert_eq!(pm.get(6), Some(1));
        assert_eq!(pm.get(3), None);
        assert!(pm.is_paired(5));
    }
}
