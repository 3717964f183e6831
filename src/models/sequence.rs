use core::str::FromStr;
use std::fmt;

use crate::utils::errors::TxError;

/// A single DNA nucleotide (A C G T N)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nucleotide {
    A,
    C,
    G,
    T,
    N,
}

impl Nucleotide {
    /// Parses a nucleotide, accepting lowercase letters and `U` for `T`
    pub fn new(c: &char) -> Result<Self, TxError> {
        match c.to_ascii_uppercase() {
            'A' => Ok(Self::A),
            'C' => Ok(Self::C),
            'G' => Ok(Self::G),
            'T' | 'U' => Ok(Self::T),
            'N' => Ok(Self::N),
            _ => Err(TxError::InvalidNucleotide(*c)),
        }
    }

    /// Parses a nucleotide, treating every other character as `N`
    ///
    /// Sequences from the genome store can contain IUPAC ambiguity codes
    /// (`R`, `Y`, ...), which never translate to a defined amino acid.
    pub fn lenient(c: &char) -> Self {
        Self::new(c).unwrap_or(Self::N)
    }

    /// Position of the nucleotide in the T-C-A-G ordering of codon tables
    ///
    /// `N` has no position.
    pub(crate) fn codon_table_index(&self) -> Option<usize> {
        match self {
            Self::T => Some(0),
            Self::C => Some(1),
            Self::A => Some(2),
            Self::G => Some(3),
            Self::N => None,
        }
    }
}

impl From<Nucleotide> for char {
    fn from(n: Nucleotide) -> char {
        match n {
            Nucleotide::A => 'A',
            Nucleotide::C => 'C',
            Nucleotide::G => 'G',
            Nucleotide::T => 'T',
            Nucleotide::N => 'N',
        }
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

/// A nucleotide sequence ready for translation
///
/// ```rust
/// use core::str::FromStr;
/// use txdb::models::{Nucleotide, Sequence};
///
/// let seq = Sequence::from_str("ATGc").unwrap();
/// assert_eq!(seq.len(), 4);
/// assert_eq!(seq[3], Nucleotide::C);
/// assert_eq!(seq.to_string(), "ATGC");
///
/// assert!(Sequence::from_str("ATGR").is_err());
/// assert_eq!(Sequence::from_lenient("ATGR").to_string(), "ATGN");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequence {
    sequence: Vec<Nucleotide>,
}

impl FromStr for Sequence {
    type Err = TxError;
    fn from_str(s: &str) -> Result<Self, TxError> {
        let sequence = s
            .chars()
            .map(|c| Nucleotide::new(&c))
            .collect::<Result<Vec<Nucleotide>, TxError>>()?;
        Ok(Sequence { sequence })
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s: String = self.sequence.iter().map(|n| char::from(*n)).collect();
        write!(f, "{}", s)
    }
}

impl Sequence {
    /// Parses a sequence, see [`Nucleotide::lenient`]
    pub fn from_lenient(s: &str) -> Self {
        Sequence {
            sequence: s.chars().map(|c| Nucleotide::lenient(&c)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

impl AsRef<[Nucleotide]> for Sequence {
    fn as_ref(&self) -> &[Nucleotide] {
        &self.sequence
    }
}

impl<Idx> std::ops::Index<Idx> for Sequence
where
    Idx: std::slice::SliceIndex<[Nucleotide]>,
{
    type Output = Idx::Output;

    fn index(&self, idx: Idx) -> &Self::Output {
        &self.sequence[idx]
    }
}

/// Returns the reverse complement of a nucleotide string
///
/// Ambiguity codes are complemented according to IUPAC, unknown characters are kept.
/// The case of every character is preserved.
///
/// # Examples
/// ```rust
/// use txdb::models::reverse_complement;
///
/// assert_eq!(reverse_complement("AACgtR"), "YacGTT");
/// ```
pub fn reverse_complement(seq: &str) -> String {
    seq.chars()
        .rev()
        .map(|c| {
            let comp = match c.to_ascii_uppercase() {
                'A' => 'T',
                'C' => 'G',
                'G' => 'C',
                'T' | 'U' => 'A',
                'R' => 'Y',
                'Y' => 'R',
                'K' => 'M',
                'M' => 'K',
                'B' => 'V',
                'V' => 'B',
                'D' => 'H',
                'H' => 'D',
                other => other,
            };
            if c.is_ascii_lowercase() {
                comp.to_ascii_lowercase()
            } else {
                comp
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sequence() {
        let seq = Sequence::from_str("ATGGCuTAA").unwrap();
        assert_eq!(seq.len(), 9);
        assert_eq!(seq.to_string(), "ATGGCTTAA");
        assert_eq!(&seq[6..9], &[Nucleotide::T, Nucleotide::A, Nucleotide::A]);
    }

    #[test]
    fn test_invalid_sequence() {
        assert!(matches!(
            Sequence::from_str("ACGX"),
            Err(TxError::InvalidNucleotide('X'))
        ));
        assert_eq!(Sequence::from_lenient("ACGXy").to_string(), "ACGNN");
        assert!(Sequence::from_lenient("").is_empty());
    }

    #[test]
    fn test_codon_table_index() {
        let indices: Vec<Option<usize>> = [Nucleotide::T, Nucleotide::C, Nucleotide::A, Nucleotide::G, Nucleotide::N]
            .iter()
            .map(|n| n.codon_table_index())
            .collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn test_reverse_complement_str() {
        assert_eq!(reverse_complement("ACGT"), "ACGT");
        assert_eq!(reverse_complement("AAAN"), "NTTT");
        assert_eq!(reverse_complement("acgTT"), "AAcgt");
        assert_eq!(reverse_complement(""), "");
    }
}
