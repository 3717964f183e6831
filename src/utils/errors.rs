//! Error types
//!
//! | Error | Raised by |
//! | --- | --- |
//! | [`TxError`] | the in-memory models: validation, structural invariants, sequence handling |
//! | [`StoreError`] | the adaptors that read and write the relational store |
//! | [`ConfigError`] | loading a [`DbConfig`](`crate::config::DbConfig`) |
//!
//! Soft data gaps (e.g. an exon sequence that cannot be resolved) are never
//! errors; they are logged via `log::warn!` and substituted.

use thiserror::Error;

use crate::models::DbId;

/// Errors of the in-memory transcript model
#[derive(Debug, Error)]
pub enum TxError {
    /// An argument has the wrong shape, e.g. an inverted interval
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The exon cannot be inserted without overlapping its neighbours
    #[error("exon {exon} overlaps with exon {existing} of the transcript")]
    ExonOverlap { exon: String, existing: String },

    /// A translation offset does not fall inside its exon
    #[error("translation {boundary} offset {offset} is outside exon {exon} (length {length})")]
    TranslationBoundary {
        boundary: &'static str,
        offset: i64,
        exon: String,
        length: i64,
    },

    /// The operation requires a coding transcript
    #[error("transcript {0} has no translation")]
    NoTranslation(String),

    /// An RNA or peptide edit does not fit onto the sequence
    #[error("edit {start}-{end} is outside of the sequence (length {length})")]
    EditOutOfRange { start: usize, end: usize, length: usize },

    #[error("invalid nucleotide {0}")]
    InvalidNucleotide(char),

    #[error("invalid amino acid {0}")]
    InvalidAminoAcid(String),

    #[error("invalid genetic code: {0}")]
    InvalidGeneticCode(String),
}

impl TxError {
    /// Shortcut for a [`TxError::Validation`]
    pub fn validation<S: ToString>(msg: S) -> Self {
        TxError::Validation(msg.to_string())
    }
}

/// Errors of the persistence adaptors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sql(#[from] rusqlite::Error),

    #[error(transparent)]
    Model(#[from] TxError),

    /// Wrong argument, e.g. a stable id without version
    #[error("invalid argument: {0}")]
    Validation(String),

    /// The store content contradicts the object being written or read
    #[error("data integrity: {0}")]
    Integrity(String),

    /// A feature or transcript kind the adaptor cannot handle
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: DbId },
}

impl StoreError {
    pub fn validation<S: ToString>(msg: S) -> Self {
        StoreError::Validation(msg.to_string())
    }

    pub fn integrity<S: ToString>(msg: S) -> Self {
        StoreError::Integrity(msg.to_string())
    }
}

/// Errors while reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    GeneticCode(#[from] TxError),
}
