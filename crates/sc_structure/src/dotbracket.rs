//! Dot-bracket notation.
//!
//! Four bracket families pair positions: `()`, `[]`, `{}` and `<>`. The
//! symbols `.-_=:,` mark unpaired positions. A closing bracket pairs with
//! the most recent *open bracket of the same family*, which need not be
//! the top of the stack. Closing brackets without a partner are ignored.
//!

use std::fmt;

use crate::NAIDX;
use crate::Pair;
use crate::PairList;
use crate::PairMap;
use crate::StructureError;
use crate::parse_pseudoknots;

/// The symbols that mark unpaired positions.
pub const UNPAIRED_SYMBOLS: &str = ".-_=:,";

/// Bracket families used to render pseudoknot layers, in order.
const PSEUDOKNOT_FAMILIES: [Bracket; 3] = [Bracket::Angle, Bracket::Curly, Bracket::Square];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bracket {
    Round,  // ()
    Square, // []
    Curly,  // {}
    Angle,  // <>
}

impl Bracket {
    pub fn open(&self) -> char {
        match self {
            Bracket::Round => '(',
            Bracket::Square => '[',
            Bracket::Curly => '{',
            Bracket::Angle => '<',
        }
    }

    pub fn close(&self) -> char {
        match self {
            Bracket::Round => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
            Bracket::Angle => '>',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotBracket {
    Unpaired,
    Open(Bracket),
    Close(Bracket),
}

impl DotBracket {
    pub fn is_unpaired(&self) -> bool {
        matches!(self, DotBracket::Unpaired)
    }
}

impl TryFrom<char> for DotBracket {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        use Bracket::*;
        Ok(match c {
            '(' => DotBracket::Open(Round),
            '[' => DotBracket::Open(Square),
            '{' => DotBracket::Open(Curly),
            '<' => DotBracket::Open(Angle),
            ')' => DotBracket::Close(Round),
            ']' => DotBracket::Close(Square),
            '}' => DotBracket::Close(Curly),
            '>' => DotBracket::Close(Angle),
            c if UNPAIRED_SYMBOLS.contains(c) => DotBracket::Unpaired,
            c => return Err(c),
        })
    }
}

impl From<DotBracket> for char {
    fn from(db: DotBracket) -> Self {
        match db {
            DotBracket::Unpaired => '.',
            DotBracket::Open(b) => b.open(),
            DotBracket::Close(b) => b.close(),
        }
    }
}

/// Parse every column of a dot-bracket string into a `DotBracket` symbol.
pub fn parse_symbols(dot: &str) -> Result<Vec<DotBracket>, StructureError> {
    dot.chars()
        .enumerate()
        .map(|(k, c)| DotBracket::try_from(c)
            .map_err(|symbol| StructureError::InvalidSymbol { 
                position: k as NAIDX + 1, 
                symbol 
            }))
        .collect()
}

/// Match brackets of all families. Returns pairs in order of closing.
fn match_brackets(dot: &str) -> Result<(usize, Vec<Pair>), StructureError> {
    let symbols = parse_symbols(dot)?;
    // Open brackets are removed by index, not strictly popped.
    let mut stack: Vec<(NAIDX, Bracket)> = Vec::new();
    let mut pairs = Vec::new();

    for (k, &symbol) in symbols.iter().enumerate() {
        let pos = k as NAIDX + 1;
        match symbol {
            DotBracket::Unpaired => (),
            DotBracket::Open(b) => stack.push((pos, b)),
            DotBracket::Close(b) => {
                if let Some(idx) = stack.iter().rposition(|&(_, o)| o == b) {
                    let (i, _) = stack.remove(idx);
                    pairs.push(Pair::new(i, pos));
                }
            }
        }
    }

    if let Some(&(position, b)) = stack.first() {
        log::debug!("Bad dot-bracket structure: {} unmatched brackets.", stack.len());
        return Err(StructureError::UnmatchedOpening { position, symbol: b.open() });
    }
    Ok((symbols.len(), pairs))
}

/// Convert a dot-bracket string into its sorted list of base pairs.
///
/// ```
/// use sc_structure::to_base_pairs;
/// let pl = to_base_pairs("..((..))..").unwrap();
/// assert_eq!(pl.to_tuples(), vec![(3, 8), (4, 7)]);
/// ```
pub fn to_base_pairs(dot: &str) -> Result<PairList, StructureError> {
    let (length, mut pairs) = match_brackets(dot)?;
    pairs.sort_unstable();
    Ok(PairList::from_sorted(length, pairs))
}

/// Convert a dot-bracket string into a symmetric position -> partner map.
pub fn to_base_pair_map(dot: &str) -> Result<PairMap, StructureError> {
    Ok(PairMap::from(&to_base_pairs(dot)?))
}

/// A rendered dot-bracket string, together with the number of
/// pseudoknot layers that were needed to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    dot: String,
    pseudoknot_layers: usize,
}

impl Rendering {
    pub fn dot(&self) -> &str {
        &self.dot
    }

    pub fn into_dot(self) -> String {
        self.dot
    }

    pub fn pseudoknot_layers(&self) -> usize {
        self.pseudoknot_layers
    }

    /// True if bracket families had to be reused across pseudoknot layers.
    /// Such strings do not parse back into the same pairs.
    pub fn is_ambiguous(&self) -> bool {
        self.pseudoknot_layers > PSEUDOKNOT_FAMILIES.len()
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dot)
    }
}

/// Render base pairs as dot-bracket string of the given length.
///
/// Nested pairs use `()`, every pseudoknotted duplex gets its own layer,
/// drawn with `<>`, `{}` and `[]` in turn.
pub fn render_dot_bracket<I>(pairs: I, length: usize) -> Result<Rendering, StructureError> 
where I: IntoIterator<Item = (NAIDX, NAIDX)>,
{
    Ok(PairList::from_tuples(length, pairs)?.to_dot_bracket())
}

/// Render base pairs as dot-bracket string, see `render_dot_bracket`.
pub fn to_dot_bracket<I>(pairs: I, length: usize) -> Result<String, StructureError> 
where I: IntoIterator<Item = (NAIDX, NAIDX)>,
{
    Ok(render_dot_bracket(pairs, length)?.into_dot())
}

impl PairList {
    /// Render this list as dot-bracket string.
    pub fn to_dot_bracket(&self) -> Rendering {
        let mut dbv = vec![DotBracket::Unpaired; self.length()];
        for pair in self.iter() {
            dbv[pair.i() as usize - 1] = DotBracket::Open(Bracket::Round);
            dbv[pair.j() as usize - 1] = DotBracket::Close(Bracket::Round);
        }

        let layers = parse_pseudoknots(self.pairs());
        let pseudoknot_layers = layers.pseudoknotted().count();
        if pseudoknot_layers > PSEUDOKNOT_FAMILIES.len() {
            log::warn!("Too many pseudoknot layers: {} > {}, bracket families are reused.", 
                pseudoknot_layers, PSEUDOKNOT_FAMILIES.len());
        }
        for (k, duplex) in layers.pseudoknotted().enumerate() {
            let b = PSEUDOKNOT_FAMILIES[k % PSEUDOKNOT_FAMILIES.len()];
            for pair in duplex.pairs() {
                dbv[pair.i() as usize - 1] = DotBracket::Open(b);
                dbv[pair.j() as usize - 1] = DotBracket::Close(b);
            }
        }

        Rendering {
            dot: dbv.into_iter().map(char::from).collect(),
            pseudoknot_layers,
        }
    }
}
