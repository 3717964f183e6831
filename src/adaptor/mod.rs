//! Persistence of the annotation models in a relational store
//!
//! The [`TranscriptAdaptor`] writes and reads [`Transcript`](`crate::models::Transcript`)s.
//! It reaches every other table only through the narrow traits of this
//! module, so each collaborator can be replaced independently. The crate
//! ships SQLite implementations for all of them, created from a
//! [`DbConnection`].
//!
//! ```rust
//! use txdb::adaptor::{DbConnection, SliceProvider};
//! use txdb::tests::transcripts::{chromosome_slice, coord_system};
//!
//! let db = DbConnection::open_in_memory().unwrap();
//! let slices = db.slice_adaptor();
//! slices.store_seq_region(&chromosome_slice(), None).unwrap();
//!
//! let slice = slices.fetch_by_region(&coord_system(), "1").unwrap().unwrap();
//! assert_eq!(slice.length(), 1000);
//! assert!(slice.seq_region_id().is_some());
//! ```
use crate::models::{
    Attribute, CoordSystem, DbEntry, DbId, Exon, Slice, SupportingFeature, Translation,
};
use crate::utils::errors::StoreError;

mod attribute;
mod db;
mod dbentry;
mod exon;
mod feature;
pub mod schema;
mod slice;
mod transcript;
mod translation;

pub use crate::adaptor::attribute::AttributeAdaptor;
pub use crate::adaptor::db::DbConnection;
pub use crate::adaptor::dbentry::DbEntryAdaptor;
pub use crate::adaptor::exon::ExonAdaptor;
pub use crate::adaptor::feature::SupportingFeatureAdaptor;
pub use crate::adaptor::slice::SliceAdaptor;
pub use crate::adaptor::transcript::TranscriptAdaptor;
pub use crate::adaptor::translation::TranslationAdaptor;

/// Object type of transcripts in the `object_xref` table
pub const TRANSCRIPT_OBJECT: &str = "Transcript";

/// Resolves slices and seq regions
pub trait SliceProvider {
    /// Returns the slice spanning the whole seq region `seq_region_name` in `coord_system`
    fn fetch_by_region(
        &self,
        coord_system: &CoordSystem,
        seq_region_name: &str,
    ) -> Result<Option<Slice>, StoreError>;

    /// Returns the slice spanning the whole seq region with the given id
    fn fetch_by_seq_region_id(&self, seq_region_id: DbId) -> Result<Option<Slice>, StoreError>;

    /// Returns the id of the seq region of `slice`, registering it if unknown
    fn seq_region_id(&self, slice: &Slice) -> Result<DbId, StoreError>;
}

/// Stores and reads exons
///
/// Exon rows are shared between transcripts, the `exon_transcript` linkage
/// records which transcripts use an exon.
pub trait ExonStore {
    /// Stores the exon and sets its id
    ///
    /// An exon with identical location and phases is re-used.
    fn store(&self, exon: &mut Exon) -> Result<DbId, StoreError>;

    /// Returns the exons of a transcript, ordered by rank
    fn fetch_all_by_transcript_id(&self, transcript_id: DbId) -> Result<Vec<Exon>, StoreError>;

    /// Returns the number of transcripts that use the exon
    fn transcript_count(&self, exon_id: DbId) -> Result<i64, StoreError>;

    /// Deletes the exon row and clears the id of `exon`
    fn remove(&self, exon: &mut Exon) -> Result<(), StoreError>;
}

/// Stores and reads translations, including their attributes
pub trait TranslationStore {
    /// Stores the translation of a transcript
    ///
    /// Both exons of the translation must already be stored.
    fn store(&self, translation: &mut Translation, transcript_id: DbId)
        -> Result<DbId, StoreError>;

    /// Returns the translation of a transcript, its exons resolved against `exons`
    fn fetch_by_transcript_id(
        &self,
        transcript_id: DbId,
        exons: &[Exon],
    ) -> Result<Option<Translation>, StoreError>;

    fn remove(&self, translation: &mut Translation) -> Result<(), StoreError>;
}

/// Stores and reads cross-references
pub trait DbEntryStore {
    /// Stores the entry, if needed, and links it to an object
    fn store(
        &self,
        entry: &mut DbEntry,
        object_id: DbId,
        object_type: &str,
    ) -> Result<DbId, StoreError>;

    /// Returns the id of an already stored, identical entry
    fn exists(&self, entry: &DbEntry) -> Result<Option<DbId>, StoreError>;

    fn fetch_by_dbid(&self, id: DbId) -> Result<Option<DbEntry>, StoreError>;

    fn fetch_all_by_object(
        &self,
        object_id: DbId,
        object_type: &str,
    ) -> Result<Vec<DbEntry>, StoreError>;

    /// Removes the link between the entry and an object, the entry itself is kept
    fn remove_from_object(
        &self,
        entry: &DbEntry,
        object_id: DbId,
        object_type: &str,
    ) -> Result<(), StoreError>;
}

/// The object an [`Attribute`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOwner {
    Transcript(DbId),
    Translation(DbId),
}

/// Stores and reads typed attributes
pub trait AttributeStore {
    fn store(&self, owner: AttributeOwner, attributes: &[Attribute]) -> Result<(), StoreError>;

    fn fetch_all(&self, owner: AttributeOwner) -> Result<Vec<Attribute>, StoreError>;

    fn remove_all(&self, owner: AttributeOwner) -> Result<(), StoreError>;
}

/// Stores supporting evidence and links it to transcripts
pub trait SupportingFeatureStore {
    /// Stores the feature and sets its id
    ///
    /// Only DNA and protein alignments are supported.
    fn store(&self, feature: &mut SupportingFeature) -> Result<DbId, StoreError>;

    fn link(&self, transcript_id: DbId, feature: &SupportingFeature) -> Result<(), StoreError>;

    fn fetch_all_by_transcript_id(
        &self,
        transcript_id: DbId,
    ) -> Result<Vec<SupportingFeature>, StoreError>;

    /// Removes all links of a transcript, the features are kept
    fn remove_links(&self, transcript_id: DbId) -> Result<(), StoreError>;
}
