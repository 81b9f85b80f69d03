//! Structures in the context of sequence alignments.
//!
//! Alignment rows use `-` for gaps. Sequences are compared
//! case-insensitively, with U and T treated as the same base.
//!

use crate::NAIDX;
use crate::Pair;
use crate::StructureError;
use crate::to_base_pairs;

/// The alignment gap symbol.
pub const GAP: char = '-';

/// Linker that separates the two halves of a fold-back duplex.
pub const LINKER: &str = "III";

fn normalize(b: u8) -> u8 {
    match b.to_ascii_uppercase() {
        b'U' => b'T',
        x => x,
    }
}

/// Watson-Crick or wobble pair.
pub fn is_canonical(a: u8, b: u8) -> bool {
    matches!((normalize(a), normalize(b)), 
        (b'A', b'T') | (b'T', b'A') | 
        (b'C', b'G') | (b'G', b'C') | 
        (b'G', b'T') | (b'T', b'G'))
}

/// Project a dot-bracket string onto a gapped alignment row.
pub fn aligned_dot(dot: &str, aligned_seq: &str) -> Result<String, StructureError> {
    let residues = aligned_seq.chars().filter(|&c| c != GAP).count();
    if residues != dot.chars().count() {
        return Err(StructureError::LengthMismatch { 
            expected: residues, 
            found: dot.chars().count() 
        });
    }
    let mut symbols = dot.chars();
    Ok(aligned_seq.chars()
        .map(|c| if c == GAP { GAP } else { symbols.next().unwrap_or(GAP) })
        .collect())
}

/// Locate `sub_seq` in the ungapped version of an alignment row. Returns
/// the 1-based, inclusive alignment columns of its first and last residue.
pub fn align_find(aligned_seq: &str, sub_seq: &str) -> Option<(usize, usize)> {
    if sub_seq.is_empty() {
        return None;
    }
    let columns: Vec<usize> = aligned_seq.chars()
        .enumerate()
        .filter(|&(_, c)| c != GAP)
        .map(|(k, _)| k)
        .collect();
    let clean: String = aligned_seq.chars().filter(|&c| c != GAP).collect();
    // Byte offset to residue index.
    let start = clean[..clean.find(sub_seq)?].chars().count();
    let end = start + sub_seq.chars().count() - 1;
    Some((columns[start] + 1, columns[end] + 1))
}

/// A fold-back duplex written as two aligned strands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplexAlignment {
    /// The 5' strand, with gaps opposite to unmatched 3' bases.
    pub left: String,
    /// The 3' strand, reversed, with gaps opposite to unmatched 5' bases.
    pub right: String,
    /// `|` for paired columns, blank otherwise.
    pub symbols: String,
}

/// Align the two halves of a duplex that is joined by an `III` linker.
/// The 5' half may only open pairs, the 3' half may only close them.
pub fn duplex_alignment(seq: &str, dot: &str) -> Result<DuplexAlignment, StructureError> {
    if seq.len() != dot.len() {
        return Err(StructureError::LengthMismatch { expected: seq.len(), found: dot.len() });
    }
    let linker = seq.find(LINKER)
        .ok_or_else(|| StructureError::Malformed(format!("no {LINKER} linker in sequence")))?;
    let (seq, dot) = (seq.as_bytes(), dot.as_bytes());
    let left_seq = &seq[..linker];
    let left_dot = &dot[..linker];
    let right_seq: Vec<u8> = seq[linker + LINKER.len()..].iter().rev().copied().collect();
    let right_dot: Vec<u8> = dot[linker + LINKER.len()..].iter().rev().copied().collect();

    if left_dot.contains(&b')') || right_dot.contains(&b'(') {
        return Err(StructureError::Malformed("pairs within a single strand".to_string()));
    }
    let opened = left_dot.iter().filter(|&&c| c == b'(').count();
    let closed = right_dot.iter().filter(|&&c| c == b')').count();
    if opened != closed {
        return Err(StructureError::Malformed(
            format!("{opened} opening versus {closed} closing brackets")));
    }

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut symbols = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left_seq.len() && j < right_seq.len() {
        match (left_dot[i], right_dot[j]) {
            (b'(', b')') => {
                left.push(left_seq[i]);
                right.push(right_seq[j]);
                symbols.push(b'|');
                i += 1;
                j += 1;
            }
            (b'(', _) => {
                left.push(b'-');
                right.push(right_seq[j]);
                symbols.push(b' ');
                j += 1;
            }
            (_, b')') => {
                left.push(left_seq[i]);
                right.push(b'-');
                symbols.push(b' ');
                i += 1;
            }
            _ => {
                left.push(left_seq[i]);
                right.push(right_seq[j]);
                symbols.push(b' ');
                i += 1;
                j += 1;
            }
        }
    }
    for &b in &left_seq[i..] {
        left.push(b);
        right.push(b'-');
    }
    for &b in &right_seq[j..] {
        left.push(b'-');
        right.push(b);
    }

    Ok(DuplexAlignment {
        left: String::from_utf8_lossy(&left).into_owned(),
        right: String::from_utf8_lossy(&right).into_owned(),
        symbols: String::from_utf8_lossy(&symbols).into_owned(),
    })
}

/// How a reference base pair fares in another aligned sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Covariation {
    /// Identical bases.
    Conserved,
    /// Different bases that still pair.
    Covaried,
    /// The bases cannot pair.
    Broken,
}

/// Classify every pair of the reference structure in an aligned sequence.
/// All reference pairs must be canonical.
pub fn classify_covariation(
    ref_seq: &str, 
    other_seq: &str, 
    ref_dot: &str
) -> Result<Vec<(Pair, Covariation)>, StructureError> {
    let (rs, os) = (ref_seq.as_bytes(), other_seq.as_bytes());
    for len in [os.len(), ref_dot.len()] {
        if len != rs.len() {
            return Err(StructureError::LengthMismatch { expected: rs.len(), found: len });
        }
    }
    let pairs = to_base_pairs(ref_dot)?;

    pairs.iter().map(|&pair| {
        let (i, j) = (pair.i() as usize - 1, pair.j() as usize - 1);
        if !is_canonical(rs[i], rs[j]) {
            return Err(StructureError::Malformed(
                format!("reference pair {pair} is not canonical")));
        }
        let old = (normalize(rs[i]), normalize(rs[j]));
        let new = (normalize(os[i]), normalize(os[j]));
        let class = if !is_canonical(os[i], os[j]) {
            Covariation::Broken
        } else if old == new {
            Covariation::Conserved
        } else {
            Covariation::Covaried
        };
        Ok((pair, class))
    }).collect()
}

/// Positions (1-based) that are unpaired in the reference structure and
/// carry a different base in the other sequence.
pub fn loop_mutations(ref_seq: &str, other_seq: &str, ref_dot: &str) -> Result<Vec<NAIDX>, StructureError> {
    for len in [other_seq.len(), ref_dot.len()] {
        if len != ref_seq.len() {
            return Err(StructureError::LengthMismatch { expected: ref_seq.len(), found: len });
        }
    }
    Ok(ref_seq.bytes()
        .zip(other_seq.bytes())
        .zip(ref_dot.bytes())
        .enumerate()
        .filter(|&(_, ((r, o), d))| d == b'.' && normalize(r) != normalize(o))
        .map(|(k, _)| k as NAIDX + 1)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_dot() {
        assert_eq!(aligned_dot("((..))", "AC-GU-UG").unwrap(), "((-..-))");
        assert!(aligned_dot("((..))", "AC-GU").is_err());
    }

    #[test]
    fn test_align_find() {
        assert_eq!(align_find("A-CG", "CG"), Some((3, 4)));
        assert_eq!(align_find("AC--GUA", "CGU"), Some((2, 6)));
        assert_eq!(align_find("AC--GUA", "A"), Some((1, 1)));
        assert_eq!(align_find("AC--GUA", "UU"), None);
        assert_eq!(align_find("ACGU", ""), None);
        // Columns count characters, not bytes.
        assert_eq!(align_find("ψ-AC-G", "CG"), Some((4, 6)));
        assert_eq!(align_find("Aψ--ψG", "ψG"), Some((5, 6)));
    }

    #[test]
    fn test_duplex_alignment() {
        let seq = "GCAUCIIIGAUGC";
        let dot = "((.((...)))).";
        let da = duplex_alignment(seq, dot).unwrap();
        assert_eq!(da.left,    "-GCAUC");
        assert_eq!(da.right,   "CGU-AG");
        assert_eq!(da.symbols, " || ||");
    }

    #[test]
    fn test_duplex_alignment_errors() {
        assert!(duplex_alignment("GCAUC", "((.))").is_err());
        assert!(duplex_alignment("GCIIIGC", "()...()").is_err());
        assert!(duplex_alignment("GCIIIGC", "((...).").is_err());
    }

    #[test]
    fn test_classify_covariation() {
        let ref_seq = "GCAAAGC";
        let dot     = "((...))";
        let other   = "AUAAAAC";
        let classes = classify_covariation(ref_seq, other, dot).unwrap();
        assert_eq!(classes, vec![
            (Pair::new(1, 7), Covariation::Broken),
            (Pair::new(2, 6), Covariation::Covaried),
        ]);
        let same = classify_covariation(ref_seq, ref_seq, dot).unwrap();
        assert!(same.iter().all(|&(_, c)| c == Covariation::Conserved));
        assert!(classify_covariation("GAAAAAA", other, dot).is_err());
        assert_eq!(loop_mutations(ref_seq, other, dot).unwrap(), Vec::<NAIDX>::new());
        assert_eq!(loop_mutations(ref_seq, "GCAUAGC", dot).unwrap(), vec![4]);
        assert_eq!(loop_mutations(ref_seq, "GCAUAG", dot),
            Err(StructureError::LengthMismatch { expected: 7, found: 6 }));
    }
}
