//! Duplexes and pseudoknot layers.
//!
//! A duplex is a run of stacked pairs (possibly with unpaired bulges) that
//! is not interrupted by any other paired base. Two duplexes are
//! incompatible if their outermost pairs cross. Resolving all
//! incompatibilities is a vertex cover problem on the crossing graph; we
//! use the greedy heuristic: repeatedly move the duplex with the most
//! remaining crossings (ties: the one with fewer pairs) into its own
//! pseudoknot layer. This is not guaranteed to use the minimum number
//! of layers, but structures rarely contain many crossing duplexes.
//!

use std::cmp::Reverse;
use ahash::AHashMap;
use nohash_hasher::IntSet;

use crate::NAIDX;
use crate::Pair;

/// A run of stacked pairs, sorted by 5'-side position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplex {
    pairs: Vec<Pair>,
}

impl Duplex {
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// The outermost (first) pair.
    pub fn first(&self) -> Pair {
        self.pairs[0]
    }

    /// Number of pairs in the duplex.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True if the outermost pairs of both duplexes cross.
    pub fn crosses(&self, other: &Duplex) -> bool {
        self.first().crosses(&other.first())
    }
}

/// Group pairs into duplexes. Pairs with `i >= j` cannot exist, the input
/// order does not matter.
pub fn collect_duplexes(pairs: &[Pair]) -> Vec<Duplex> {
    let mut pairs = pairs.to_vec();
    pairs.sort_unstable_by_key(|p| p.i());
    let paired: IntSet<NAIDX> = pairs.iter().flat_map(|p| [p.i(), p.j()]).collect();

    let mut duplexes = Vec::new();
    let mut current: Vec<Pair> = Vec::new();
    for pair in pairs {
        let Some(&prev) = current.last() else {
            current.push(pair);
            continue;
        };
        let left_break = (prev.i() + 1..pair.i()).any(|k| paired.contains(&k));
        // A pair that does not nest inside the previous one starts anew.
        let right_break = pair.j() >= prev.j() 
            || (pair.j() + 1..prev.j()).any(|k| paired.contains(&k));
        if left_break || right_break {
            duplexes.push(Duplex { pairs: std::mem::take(&mut current) });
        }
        current.push(pair);
    }
    if !current.is_empty() {
        duplexes.push(Duplex { pairs: current });
    }
    duplexes
}

/// All index pairs (a, b), a < b, of duplexes that cross each other.
pub fn incompatible_duplexes(duplexes: &[Duplex]) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for (a, da) in duplexes.iter().enumerate() {
        for (b, db) in duplexes.iter().enumerate().skip(a + 1) {
            if da.crosses(db) {
                edges.push((a, b));
            }
        }
    }
    edges
}

/// Duplexes of a structure, split into the nested layer and an ordered
/// list of pseudoknot layers (one duplex per layer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoknotLayers {
    duplexes: Vec<Duplex>,
    pseudoknotted: Vec<usize>,
}

impl PseudoknotLayers {
    /// All duplexes, sorted by their first pair.
    pub fn duplexes(&self) -> &[Duplex] {
        &self.duplexes
    }

    /// Indices into `duplexes()` of pseudoknotted duplexes, in the order
    /// they were resolved.
    pub fn pseudoknot_indices(&self) -> &[usize] {
        &self.pseudoknotted
    }

    /// Pseudoknotted duplexes, in the order they were resolved.
    pub fn pseudoknotted(&self) -> impl Iterator<Item = &Duplex> + '_ {
        self.pseudoknotted.iter().map(|&k| &self.duplexes[k])
    }

    /// Duplexes that stay in the nested layer.
    pub fn nested(&self) -> impl Iterator<Item = &Duplex> + '_ {
        self.duplexes.iter()
            .enumerate()
            .filter(|(k, _)| !self.pseudoknotted.contains(k))
            .map(|(_, d)| d)
    }

    pub fn is_pseudoknot_free(&self) -> bool {
        self.pseudoknotted.is_empty()
    }
}

/// Greedy cover of the crossing graph. Returns duplex indices in the order
/// they are removed.
fn resolve_incompatible(duplexes: &[Duplex], mut edges: Vec<(usize, usize)>) -> Vec<usize> {
    let mut found = Vec::new();
    while !edges.is_empty() {
        // Degrees, kept in order of first appearance in the edge list.
        let mut degrees: Vec<(usize, usize)> = Vec::new();
        let mut slot: AHashMap<usize, usize> = AHashMap::default();
        for &(a, b) in &edges {
            for d in [a, b] {
                match slot.get(&d) {
                    Some(&s) => degrees[s].1 += 1,
                    None => {
                        slot.insert(d, degrees.len());
                        degrees.push((d, 1));
                    }
                }
            }
        }
        // max_by_key returns the last of equal elements.
        let Some(&(pick, _)) = degrees.iter()
            .max_by_key(|&&(d, deg)| (deg, Reverse(duplexes[d].len()))) else {
            break;
        };
        log::trace!("Pseudoknotted duplex {} starting at {}.", pick, duplexes[pick].first());
        found.push(pick);
        edges.retain(|&(a, b)| a != pick && b != pick);
    }
    found
}

/// Split a set of base pairs into nested duplexes and pseudoknot layers.
pub fn parse_pseudoknots(pairs: &[Pair]) -> PseudoknotLayers {
    let duplexes = collect_duplexes(pairs);
    let edges = incompatible_duplexes(&duplexes);
    let pseudoknotted = resolve_incompatible(&duplexes, edges);
    PseudoknotLayers { duplexes, pseudoknotted }
}
