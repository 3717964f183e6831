use serde::{Deserialize, Serialize};

use crate::models::{DbId, Slice, Strand};

/// An alignment of external evidence (a cDNA, EST or protein) onto the genome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignFeature {
    db_id: Option<DbId>,
    pub slice: Slice,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub hit_name: String,
    pub hit_start: i64,
    pub hit_end: i64,
    pub score: Option<f64>,
    pub cigar: String,
}

impl AlignFeature {
    pub fn new<S: Into<String>>(
        slice: Slice,
        start: i64,
        end: i64,
        strand: Strand,
        hit_name: S,
        hit_start: i64,
        hit_end: i64,
    ) -> Self {
        let cigar = format!("{}M", end - start + 1);
        AlignFeature {
            db_id: None,
            slice,
            start,
            end,
            strand,
            hit_name: hit_name.into(),
            hit_start,
            hit_end,
            score: None,
            cigar,
        }
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn set_db_id(&mut self, id: Option<DbId>) {
        self.db_id = id;
    }
}

/// Evidence supporting a transcript model
///
/// Only nucleotide and protein alignments can be persisted, every
/// other kind of evidence is carried as `Other` and rejected by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SupportingFeature {
    DnaAlign(AlignFeature),
    ProteinAlign(AlignFeature),
    Other { kind: String, feature: AlignFeature },
}

impl SupportingFeature {
    /// Name of the feature table in the store
    pub fn feature_type(&self) -> &str {
        match self {
            SupportingFeature::DnaAlign(_) => "dna_align_feature",
            SupportingFeature::ProteinAlign(_) => "protein_align_feature",
            SupportingFeature::Other { kind, .. } => kind,
        }
    }

    pub fn feature(&self) -> &AlignFeature {
        match self {
            SupportingFeature::DnaAlign(f)
            | SupportingFeature::ProteinAlign(f)
            | SupportingFeature::Other { feature: f, .. } => f,
        }
    }

    pub fn feature_mut(&mut self) -> &mut AlignFeature {
        match self {
            SupportingFeature::DnaAlign(f)
            | SupportingFeature::ProteinAlign(f)
            | SupportingFeature::Other { feature: f, .. } => f,
        }
    }
}
