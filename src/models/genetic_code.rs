use std::fmt;

use crate::models::sequence::Nucleotide;
use crate::models::AminoAcid;
use crate::utils::errors::TxError;

/// Amino acids of the 64 codons in NCBI order
///
/// The first base selects a block of 16 (T, C, A, G), the second a block
/// of 4 within it and the third the position inside that block.
/// https://www.ncbi.nlm.nih.gov/Taxonomy/Utils/wprintgc.cgi
type CodonTable = [AminoAcid; 64];

const STANDARD_CODE: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const VERTEBRATE_MITOCHONDRIAL_CODE: &str =
    "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG";

/// Named translation tables, with their NCBI `transl_table` id
const KNOWN_CODES: [(&str, &str, &str); 9] = [
    ("standard", "1", STANDARD_CODE),
    ("vertebrate mitochondrial", "2", VERTEBRATE_MITOCHONDRIAL_CODE),
    ("yeast mitochondrial", "3", "FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    ("mold mitochondrial", "4", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    ("invertebrate mitochondrial", "5", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSSSVVVVAAAADDEEGGGG"),
    ("ciliate nuclear", "6", "FFLLSSSSYYQQCC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG"),
    ("echinoderm mitochondrial", "9", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIIMTTTTNNNKSSSSVVVVAAAADDEEGGGG"),
    ("bacterial", "11", STANDARD_CODE),
    ("ascidian mitochondrial", "13", "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSSGGVVVVAAAADDEEGGGG"),
];

/// Translates codons into amino acids
///
/// Only the codon-to-amino-acid table differs between codes, alternative
/// start codons are not modelled.
///
/// # Examples
/// ```
/// use txdb::models::{AminoAcid, GeneticCode, Nucleotide};
/// let code = GeneticCode::default();
/// assert_eq!(
///     code.translate(&[Nucleotide::A, Nucleotide::T, Nucleotide::G])
///         .unwrap(),
///     AminoAcid::M
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneticCode {
    table: CodonTable,
}

impl Default for GeneticCode {
    /// The [standard genetic code](https://en.wikipedia.org/wiki/DNA_codon_table)
    fn default() -> GeneticCode {
        GeneticCode::from_table(STANDARD_CODE).unwrap_or(GeneticCode {
            table: [AminoAcid::X; 64],
        })
    }
}

impl fmt::Display for GeneticCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let letters: String = self.table.iter().map(|aa| aa.single_letter()).collect();
        write!(f, "{}", letters)
    }
}

impl GeneticCode {
    /// Builds a genetic code from its 64 one-letter amino acids in NCBI order
    ///
    /// # Examples
    /// ```
    /// use txdb::models::{AminoAcid, GeneticCode, Nucleotide};
    /// // yeast mitochondria read CTN as threonine
    /// let code = GeneticCode::from_table("FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG").unwrap();
    /// assert_eq!(
    ///     code.translate(&[Nucleotide::C, Nucleotide::T, Nucleotide::G]).unwrap(),
    ///     AminoAcid::T
    /// );
    /// ```
    pub fn from_table(letters: &str) -> Result<GeneticCode, TxError> {
        if letters.chars().count() != 64 {
            return Err(TxError::InvalidGeneticCode(format!(
                "expected 64 amino acids, got {}",
                letters.chars().count()
            )));
        }
        let mut table = [AminoAcid::X; 64];
        for (slot, letter) in table.iter_mut().zip(letters.chars()) {
            *slot = match AminoAcid::try_from(letter) {
                Ok(AminoAcid::X) | Ok(AminoAcid::U) | Err(_) => {
                    return Err(TxError::InvalidGeneticCode(format!(
                        "{} is not a codon table amino acid",
                        letter
                    )))
                }
                Ok(aa) => aa,
            };
        }
        Ok(GeneticCode { table })
    }

    /// The [vertebrate mitochondrial code](https://en.wikipedia.org/wiki/Vertebrate_mitochondrial_code)
    pub fn vertebrate_mitochondrial() -> GeneticCode {
        GeneticCode::from_table(VERTEBRATE_MITOCHONDRIAL_CODE).unwrap_or_default()
    }

    /// Resolves a genetic code from a configuration value
    ///
    /// Accepts the lowercase name of a known code (`"vertebrate mitochondrial"`),
    /// its NCBI `transl_table` id (`"2"`) or a raw table of 64 amino acids.
    ///
    /// # Examples
    /// ```
    /// use txdb::models::GeneticCode;
    ///
    /// assert_eq!(GeneticCode::guess("2").unwrap(), GeneticCode::vertebrate_mitochondrial());
    /// assert_eq!(
    ///     GeneticCode::guess("vertebrate mitochondrial").unwrap(),
    ///     GeneticCode::vertebrate_mitochondrial()
    /// );
    /// assert!(GeneticCode::guess("martian").is_err());
    /// ```
    pub fn guess(code: &str) -> Result<GeneticCode, TxError> {
        let name = code.trim().to_ascii_lowercase();
        if name == "default" {
            return Ok(GeneticCode::default());
        }
        if let Some((_, _, table)) = KNOWN_CODES
            .iter()
            .find(|(known, id, _)| *known == name || *id == name)
        {
            return GeneticCode::from_table(table);
        }
        GeneticCode::from_table(code.trim()).map_err(|_| {
            TxError::InvalidGeneticCode(format!("genetic code {} is not known", code))
        })
    }

    /// Translates a codon, failing for codons with an `N`
    ///
    /// # Examples
    /// ```
    /// use txdb::models::{AminoAcid, GeneticCode, Nucleotide};
    /// let code = GeneticCode::default();
    /// let aa = code.translate(&[Nucleotide::A, Nucleotide::T, Nucleotide::G]).unwrap();
    /// assert_eq!(aa, AminoAcid::M);
    /// ```
    pub fn translate(&self, codon: &[Nucleotide; 3]) -> Result<AminoAcid, TxError> {
        let mut idx = 0;
        for n in codon {
            let pos = n.codon_table_index().ok_or_else(|| {
                TxError::InvalidNucleotide(char::from(*n))
            })?;
            idx = idx * 4 + pos;
        }
        Ok(self.table[idx])
    }

    /// Translates a codon, returning [`AminoAcid::X`] for ambiguous or incomplete codons
    ///
    /// # Examples
    /// ```
    /// use txdb::models::{AminoAcid, GeneticCode, Nucleotide};
    /// let code = GeneticCode::default();
    /// assert_eq!(code.translate_lenient(&[Nucleotide::A, Nucleotide::N, Nucleotide::G]), AminoAcid::X);
    /// assert_eq!(code.translate_lenient(&[Nucleotide::T, Nucleotide::G, Nucleotide::G]), AminoAcid::W);
    /// ```
    pub fn translate_lenient(&self, codon: &[Nucleotide]) -> AminoAcid {
        match codon {
            [a, b, c] => self.translate(&[*a, *b, *c]).unwrap_or(AminoAcid::X),
            _ => AminoAcid::X,
        }
    }

    /// Returns true for a complete codon that translates to a stop
    pub fn is_stop_codon(&self, codon: &[Nucleotide]) -> bool {
        self.translate_lenient(codon) == AminoAcid::Ter
    }
}

#[cfg(test)]
mod tests {
    use core::str::FromStr;

    use super::*;
    use crate::models::Sequence;

    fn codon(s: &str) -> Sequence {
        Sequence::from_str(s).unwrap()
    }

    #[test]
    fn test_standard_code() {
        let code = GeneticCode::default();
        assert_eq!(code.to_string(), STANDARD_CODE);
        assert_eq!(code.translate_lenient(&codon("ATG")[..]), AminoAcid::M);
        assert_eq!(code.translate_lenient(&codon("TTT")[..]), AminoAcid::F);
        assert_eq!(code.translate_lenient(&codon("GGG")[..]), AminoAcid::G);
        assert!(code.is_stop_codon(&codon("TGA")[..]));
        assert!(!code.is_stop_codon(&codon("AGA")[..]));
        assert!(!code.is_stop_codon(&codon("TAAT")[..]));
    }

    #[test]
    fn test_mitochondrial_code() {
        let code = GeneticCode::vertebrate_mitochondrial();
        assert_eq!(code.to_string(), VERTEBRATE_MITOCHONDRIAL_CODE);
        assert_eq!(code.translate_lenient(&codon("TGA")[..]), AminoAcid::W);
        assert!(code.is_stop_codon(&codon("AGA")[..]));
        assert!(code.is_stop_codon(&codon("AGG")[..]));
    }

    #[test]
    fn test_translate_ambiguous() {
        let code = GeneticCode::default();
        assert!(matches!(
            code.translate(&[Nucleotide::A, Nucleotide::N, Nucleotide::G]),
            Err(TxError::InvalidNucleotide('N'))
        ));
        assert_eq!(code.translate_lenient(&codon("AT")[..]), AminoAcid::X);
    }

    #[test]
    fn test_known_codes_are_valid() {
        for (name, id, table) in KNOWN_CODES {
            let code = GeneticCode::guess(name).unwrap();
            assert_eq!(code.to_string(), table);
            assert_eq!(GeneticCode::guess(id).unwrap(), code);
        }
        assert_eq!(GeneticCode::guess("Standard").unwrap(), GeneticCode::default());
        assert_eq!(GeneticCode::guess("default").unwrap(), GeneticCode::default());
    }

    #[test]
    fn test_invalid_code() {
        assert!(GeneticCode::from_table("FFLL").is_err());
        assert!(GeneticCode::from_table(&"X".repeat(64)).is_err());
        assert!(matches!(
            GeneticCode::guess("martian"),
            Err(TxError::InvalidGeneticCode(_))
        ));
        let raw = "FFLLSSSSYY**CCWWTTTTPPPPHHQQRRRRIIMMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
        assert_eq!(GeneticCode::guess(raw).unwrap().to_string(), raw);
    }
}
