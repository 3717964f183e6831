//! The in-memory annotation models
//!
//! The central object is the [`Transcript`] aggregate. It owns an ordered list of
//! [`Exon`]s and an optional [`Translation`] and derives its genomic extent, its
//! [coordinate mapper](`crate::mapper::TranscriptMapper`) and its coding boundaries
//! from them.
//!
//! All genomic coordinates are 1-based and inclusive and relative to the
//! [`Slice`] the feature is placed on.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::errors::TxError;

mod aminoacid;
mod attribute;
mod exon;
mod feature;
mod genetic_code;
mod sequence;
mod slice;
mod transcript;
mod translation;
mod xref;

pub use crate::models::aminoacid::AminoAcid;
pub use crate::models::attribute::{Attribute, SeqEdit, RNA_EDIT_CODE};
pub use crate::models::exon::Exon;
pub use crate::models::feature::{AlignFeature, SupportingFeature};
pub use crate::models::genetic_code::GeneticCode;
pub use crate::models::sequence::{reverse_complement, Nucleotide, Sequence};
pub use crate::models::slice::{CoordSystem, SequenceProvider, Slice};
pub use crate::models::transcript::{
    Intron, Lazy, Transcript, TranscriptBuilder, TranscriptKind, TranscriptLoader,
    TranscriptState,
};
pub use crate::models::translation::{Translation, PEPTIDE_EDIT_CODES};
pub(crate) use crate::models::translation::check_offset;
pub use crate::models::xref::DbEntry;

/// Surrogate id of a row in the store
pub type DbId = i64;

/// The strand of a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Strand {
    /// Returns the integer representation used in the store (`1` or `-1`)
    pub fn as_int(&self) -> i64 {
        match self {
            Strand::Plus => 1,
            Strand::Minus => -1,
        }
    }

    /// Parses the integer representation used in the store
    ///
    /// ```rust
    /// use txdb::models::Strand;
    /// assert_eq!(Strand::from_int(-1).unwrap(), Strand::Minus);
    /// assert!(Strand::from_int(0).is_err());
    /// ```
    pub fn from_int(value: i64) -> Result<Self, TxError> {
        match value {
            1 => Ok(Strand::Plus),
            -1 => Ok(Strand::Minus),
            _ => Err(TxError::validation(format!("invalid strand {}", value))),
        }
    }

    /// Returns the opposite strand
    pub fn reverse(&self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    /// Combines two strands the way signs are multiplied
    ///
    /// A feature on the minus strand of a minus-strand reference lies on
    /// the plus strand of the underlying sequence.
    pub fn combine(&self, other: Strand) -> Self {
        if *self == other {
            Strand::Plus
        } else {
            Strand::Minus
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}
