//! The sc_structure crate.
//!
//! Secondary structure representations and their decomposition:
//!  - dot-bracket notation <-> base-pair lists and maps
//!  - duplexes and pseudoknot layers
//!  - stems, stem-loops, bulges and interior loops
//!  - pairwise structure comparison (F1)
//!
//! All positions are **1-based**, as in dot-bracket columns.
//!

/// Helpers for structures projected onto alignments.
pub mod alignment;

mod error;
mod dotbracket;
mod pair_list;
mod pseudoknot;
mod stems;
mod compare;
mod crosslink;

pub use error::*;
pub use dotbracket::*;
pub use pair_list::*;
pub use pseudoknot::*;
pub use stems::*;
pub use compare::*;
pub use crosslink::*;


/// Nucleic Acid INdeX: we use `u32`, since sliding-window scans report
/// positions in genome coordinates. `P1KEY` needs to be *twice as large*
/// (in bits) as `NAIDX`, since pairs `(NAIDX, NAIDX)` are compacted into
/// one `P1KEY`.
pub type NAIDX = u32;

/// Pair key. Must be >= 2×`NAIDX` in bit width so we can safely pack two indices.
pub type P1KEY = u64;

/// Compile-time sanity check: 2×NAIDX bits must fit into P1KEY.
const _: () = {
    debug_assert!(2 * NAIDX::BITS <= P1KEY::BITS);
};

