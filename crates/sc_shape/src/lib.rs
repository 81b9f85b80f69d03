//! The sc_shape crate.
//!
//! Chemical probing (SHAPE) data applied to secondary structures:
//!  - reactivity profiles with missing values
//!  - a SHAPE-structure agreement score for stem-loops
//!  - a sliding-window scan for well-supported stem-loops
//!
//! Structure prediction itself is not part of this crate, it enters the
//! scan through the `StructurePredictor` trait.
//!

mod error;
mod reactivity;
mod params;
mod score;
mod predict;
mod scan;

pub use error::*;
pub use reactivity::*;
pub use params::*;
pub use score::*;
pub use predict::*;
pub use scan::*;

