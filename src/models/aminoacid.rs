use core::fmt::Display;

use crate::utils::errors::TxError;

/// The amino acids of a peptide
///
/// Besides the 20 standard amino acids this includes selenocysteine (`U`),
/// the stop (`Ter`, `*`) and `X` for codons that cannot be translated.
///
/// # Examples
///
/// ```
/// use txdb::models::AminoAcid;
///
/// assert_eq!(AminoAcid::try_from("Met").unwrap(), AminoAcid::M);
/// assert_eq!(AminoAcid::try_from('*').unwrap(), AminoAcid::Ter);
/// assert_eq!(AminoAcid::U.to_string(), "Sec");
/// assert_eq!(AminoAcid::U.single_letter(), 'U');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AminoAcid {
    Ter,
    A,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    K,
    L,
    M,
    N,
    P,
    Q,
    R,
    S,
    T,
    V,
    W,
    Y,
    U,
    X,
}

const CODES: [(AminoAcid, char, &str); 23] = [
    (AminoAcid::Ter, '*', "Ter"),
    (AminoAcid::A, 'A', "Ala"),
    (AminoAcid::C, 'C', "Cys"),
    (AminoAcid::D, 'D', "Asp"),
    (AminoAcid::E, 'E', "Glu"),
    (AminoAcid::F, 'F', "Phe"),
    (AminoAcid::G, 'G', "Gly"),
    (AminoAcid::H, 'H', "His"),
    (AminoAcid::I, 'I', "Ile"),
    (AminoAcid::K, 'K', "Lys"),
    (AminoAcid::L, 'L', "Leu"),
    (AminoAcid::M, 'M', "Met"),
    (AminoAcid::N, 'N', "Asn"),
    (AminoAcid::P, 'P', "Pro"),
    (AminoAcid::Q, 'Q', "Gln"),
    (AminoAcid::R, 'R', "Arg"),
    (AminoAcid::S, 'S', "Ser"),
    (AminoAcid::T, 'T', "Thr"),
    (AminoAcid::V, 'V', "Val"),
    (AminoAcid::W, 'W', "Trp"),
    (AminoAcid::Y, 'Y', "Tyr"),
    (AminoAcid::U, 'U', "Sec"),
    (AminoAcid::X, 'X', "Xaa"),
];

impl AminoAcid {
    // the enum discriminants follow the order of `CODES`
    fn codes(&self) -> (AminoAcid, char, &'static str) {
        CODES[*self as usize]
    }

    /// One-letter code, `*` for the stop
    pub fn single_letter(&self) -> char {
        self.codes().1
    }
}

/// Three-letter code
impl AsRef<str> for AminoAcid {
    fn as_ref(&self) -> &str {
        self.codes().2
    }
}

impl Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = TxError;
    fn try_from(c: char) -> Result<AminoAcid, TxError> {
        CODES
            .iter()
            .find(|(_, letter, _)| *letter == c)
            .map(|(aa, _, _)| *aa)
            .ok_or_else(|| TxError::InvalidAminoAcid(c.to_string()))
    }
}

/// Parses one- and three-letter codes, plus `Stop`
impl TryFrom<&str> for AminoAcid {
    type Error = TxError;
    fn try_from(s: &str) -> Result<AminoAcid, TxError> {
        if s == "Stop" {
            return Ok(AminoAcid::Ter);
        }
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return AminoAcid::try_from(c);
        }
        CODES
            .iter()
            .find(|(_, _, three)| *three == s)
            .map(|(aa, _, _)| *aa)
            .ok_or_else(|| TxError::InvalidAminoAcid(s.to_string()))
    }
}
