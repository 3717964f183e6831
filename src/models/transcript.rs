use std::cell::{Cell, OnceCell};
use std::fmt;

use log::{debug, warn};

use crate::adaptor::SliceProvider;
use crate::mapper::TranscriptMapper;
use crate::models::translation::check_offset;
use crate::models::{
    Attribute, CoordSystem, DbEntry, DbId, Exon, SeqEdit, Slice, Strand, SupportingFeature,
    Translation, RNA_EDIT_CODE,
};
use crate::utils::errors::{StoreError, TxError};

/// A lazily loaded collection of a [`Transcript`]
///
/// Collections of transcripts built in memory are always loaded. Collections
/// of transcripts fetched from the store are filled by
/// [`Transcript::ensure_loaded`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lazy<T> {
    value: T,
    loaded: bool,
}

impl<T> Lazy<T> {
    pub fn loaded(value: T) -> Self {
        Lazy {
            value,
            loaded: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the value, `None` if it was not loaded yet
    pub fn get(&self) -> Option<&T> {
        if self.loaded {
            Some(&self.value)
        } else {
            None
        }
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.loaded = true;
    }

    fn value(&self) -> &T {
        &self.value
    }

    fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Default> Lazy<T> {
    pub fn unloaded() -> Self {
        Lazy {
            value: T::default(),
            loaded: false,
        }
    }
}

/// The kind of a transcript
///
/// Prediction transcripts (ab-initio gene predictions) are stored in
/// their own tables and are rejected by the
/// [`TranscriptAdaptor`](`crate::adaptor::TranscriptAdaptor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranscriptKind {
    #[default]
    Regular,
    Prediction,
}

/// The lifecycle state of a [`Transcript`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptState {
    /// No exons
    Unbuilt,
    /// Exons and the derived genomic extent are consistent
    Assembled,
    /// The exons changed, but the genomic extent was not recalculated
    Mutated,
    /// Removed from the store
    Deleted,
}

/// The genomic interval between two consecutive exons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intron {
    pub slice: Slice,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
}

impl Intron {
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Loads the lazy collections of a stored [`Transcript`]
pub trait TranscriptLoader {
    /// Returns the exons of the transcript in transcript order
    fn load_exons(&self, transcript_id: DbId) -> Result<Vec<Exon>, StoreError>;

    /// Returns the translation, its exons resolved against `exons`
    fn load_translation(
        &self,
        transcript_id: DbId,
        exons: &[Exon],
    ) -> Result<Option<Translation>, StoreError>;

    fn load_attributes(&self, transcript_id: DbId) -> Result<Vec<Attribute>, StoreError>;

    fn load_xrefs(&self, transcript_id: DbId) -> Result<Vec<DbEntry>, StoreError>;

    fn load_supporting_features(
        &self,
        transcript_id: DbId,
    ) -> Result<Vec<SupportingFeature>, StoreError>;
}

type CachedSpan = Cell<Option<Option<(i64, i64)>>>;

/// A transcript, the central aggregate of the annotation model
///
/// The transcript owns an ordered list of [`Exon`]s (5' to 3', i.e. ascending
/// start on the plus strand and descending start on the minus strand) and an
/// optional [`Translation`]. Its genomic extent, its coordinate mapper and its
/// coding boundaries are derived from the exons and cached. Every structural
/// change drops the cached values.
///
/// A transcript is not `Sync`, the caches use interior mutability.
///
/// # Examples
///
/// ```rust
/// use txdb::models::{CoordSystem, Exon, Slice, Strand, TranscriptBuilder, TranscriptState};
///
/// let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 1000);
/// let mut tx = TranscriptBuilder::new()
///     .stable_id("ENST0001", 1)
///     .biotype("lncRNA")
///     .build()
///     .unwrap();
/// assert_eq!(tx.state(), TranscriptState::Unbuilt);
///
/// tx.add_exon(Exon::new(slice.clone(), 200, 260, Strand::Plus).unwrap()).unwrap();
/// tx.add_exon(Exon::new(slice.clone(), 100, 150, Strand::Plus).unwrap()).unwrap();
/// assert_eq!((tx.start(), tx.end()), (100, 260));
/// assert_eq!(tx.exons()[0].start(), 100);
///
/// // overlapping exons are rejected
/// assert!(tx.add_exon(Exon::new(slice, 140, 160, Strand::Plus).unwrap()).is_err());
/// assert_eq!(tx.exons().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Transcript {
    kind: TranscriptKind,
    db_id: Option<DbId>,
    gene_id: Option<DbId>,
    stable_id: Option<String>,
    version: Option<u32>,
    biotype: String,
    confidence: String,
    description: Option<String>,
    display_xref: Option<DbEntry>,
    slice: Option<Slice>,
    start: i64,
    end: i64,
    strand: Strand,
    exons: Lazy<Vec<Exon>>,
    translation: Lazy<Option<Translation>>,
    attributes: Lazy<Vec<Attribute>>,
    xrefs: Lazy<Vec<DbEntry>>,
    supporting_features: Lazy<Vec<SupportingFeature>>,
    edits_enabled: bool,
    removed: bool,
    extent_stale: bool,
    mapper: OnceCell<TranscriptMapper>,
    cdna_coding: CachedSpan,
    coding_region: CachedSpan,
}

impl Transcript {
    /// Creates an empty transcript, all collections loaded
    pub fn new(kind: TranscriptKind) -> Self {
        Transcript {
            kind,
            db_id: None,
            gene_id: None,
            stable_id: None,
            version: None,
            biotype: String::new(),
            confidence: String::new(),
            description: None,
            display_xref: None,
            slice: None,
            start: 0,
            end: 0,
            strand: Strand::Plus,
            exons: Lazy::loaded(vec![]),
            translation: Lazy::loaded(None),
            attributes: Lazy::loaded(vec![]),
            xrefs: Lazy::loaded(vec![]),
            supporting_features: Lazy::loaded(vec![]),
            edits_enabled: true,
            removed: false,
            extent_stale: false,
            mapper: OnceCell::new(),
            cdna_coding: Cell::new(None),
            coding_region: Cell::new(None),
        }
    }

    /// Creates a transcript from a stored row, no collection is loaded
    pub(crate) fn from_store(
        db_id: DbId,
        slice: Slice,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Self {
        let mut tx = Transcript::new(TranscriptKind::Regular);
        tx.db_id = Some(db_id);
        tx.slice = Some(slice);
        tx.start = start;
        tx.end = end;
        tx.strand = strand;
        tx.exons = Lazy::unloaded();
        tx.translation = Lazy::unloaded();
        tx.attributes = Lazy::unloaded();
        tx.xrefs = Lazy::unloaded();
        tx.supporting_features = Lazy::unloaded();
        tx
    }

    pub fn kind(&self) -> TranscriptKind {
        self.kind
    }

    pub fn is_prediction(&self) -> bool {
        self.kind == TranscriptKind::Prediction
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub(crate) fn set_db_id(&mut self, id: Option<DbId>) {
        self.db_id = id;
    }

    /// The id of the gene the transcript is stored for
    pub fn gene_id(&self) -> Option<DbId> {
        self.gene_id
    }

    pub(crate) fn set_gene_id(&mut self, id: Option<DbId>) {
        self.gene_id = id;
    }

    pub fn stable_id(&self) -> Option<&str> {
        self.stable_id.as_deref()
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Sets the stable id and its version
    ///
    /// The store rejects a stable id without a version.
    pub fn set_stable_id(&mut self, stable_id: Option<String>, version: Option<u32>) {
        self.stable_id = stable_id;
        self.version = version;
    }

    pub fn biotype(&self) -> &str {
        &self.biotype
    }

    pub fn set_biotype<S: Into<String>>(&mut self, biotype: S) {
        self.biotype = biotype.into();
    }

    pub fn confidence(&self) -> &str {
        &self.confidence
    }

    pub fn set_confidence<S: Into<String>>(&mut self, confidence: S) {
        self.confidence = confidence.into();
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn display_xref(&self) -> Option<&DbEntry> {
        self.display_xref.as_ref()
    }

    pub fn set_display_xref(&mut self, xref: Option<DbEntry>) {
        self.display_xref = xref;
    }

    pub fn edits_enabled(&self) -> bool {
        self.edits_enabled
    }

    /// Enables or disables RNA edits for sequence and coding boundaries
    pub fn set_edits_enabled(&mut self, enabled: bool) {
        if enabled != self.edits_enabled {
            self.edits_enabled = enabled;
            self.invalidate_caches();
        }
    }

    /// The slice the exons are placed on
    pub fn slice(&self) -> Option<&Slice> {
        self.slice.as_ref()
    }

    /// Lowest exon start
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Highest exon end
    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn state(&self) -> TranscriptState {
        if self.removed {
            TranscriptState::Deleted
        } else if self.extent_stale {
            TranscriptState::Mutated
        } else if self.exons.is_loaded() && self.exons.value().is_empty() {
            TranscriptState::Unbuilt
        } else {
            TranscriptState::Assembled
        }
    }

    /// Returns the exons in transcript order
    ///
    /// The list is empty while the exons of a stored transcript are not loaded.
    pub fn exons(&self) -> &[Exon] {
        self.exons.value()
    }

    /// Returns true if every lazy collection is loaded
    pub fn is_loaded(&self) -> bool {
        self.exons.is_loaded()
            && self.translation.is_loaded()
            && self.attributes.is_loaded()
            && self.xrefs.is_loaded()
            && self.supporting_features.is_loaded()
    }

    pub(crate) fn exons_mut(&mut self) -> &mut [Exon] {
        self.exons.value_mut()
    }

    pub fn translation(&self) -> Option<&Translation> {
        self.translation.value().as_ref()
    }

    pub(crate) fn translation_mut(&mut self) -> Option<&mut Translation> {
        self.translation.value_mut().as_mut()
    }

    pub fn is_coding(&self) -> bool {
        self.translation().is_some()
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.attributes.value()
    }

    pub(crate) fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        self.attributes.value_mut()
    }

    pub fn xrefs(&self) -> &[DbEntry] {
        self.xrefs.value()
    }

    pub(crate) fn xrefs_mut(&mut self) -> &mut Vec<DbEntry> {
        self.xrefs.value_mut()
    }

    pub fn supporting_features(&self) -> &[SupportingFeature] {
        self.supporting_features.value()
    }

    pub(crate) fn supporting_features_mut(&mut self) -> &mut Vec<SupportingFeature> {
        self.supporting_features.value_mut()
    }

    /// Adds a transcript attribute
    ///
    /// RNA edit attributes must carry a valid [`SeqEdit`] value.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<(), TxError> {
        self.require_loaded(self.attributes.is_loaded(), "attributes")?;
        if attribute.code == RNA_EDIT_CODE {
            attribute.seq_edit()?;
            self.invalidate_caches();
        }
        self.attributes.value_mut().push(attribute);
        Ok(())
    }

    pub fn add_xref(&mut self, xref: DbEntry) -> Result<(), TxError> {
        self.require_loaded(self.xrefs.is_loaded(), "xrefs")?;
        self.xrefs.value_mut().push(xref);
        Ok(())
    }

    pub fn add_supporting_feature(&mut self, feature: SupportingFeature) -> Result<(), TxError> {
        self.require_loaded(self.supporting_features.is_loaded(), "supporting features")?;
        self.supporting_features.value_mut().push(feature);
        Ok(())
    }

    /// Returns all RNA edits of the transcript
    pub fn seq_edits(&self) -> Result<Vec<SeqEdit>, TxError> {
        self.attributes()
            .iter()
            .filter(|attr| attr.code == RNA_EDIT_CODE)
            .map(|attr| attr.seq_edit())
            .collect()
    }

    /// Loads every collection that is not loaded yet
    ///
    /// Transcripts that are not stored have nothing to load, their
    /// collections are marked as loaded.
    pub fn ensure_loaded(&mut self, loader: &dyn TranscriptLoader) -> Result<(), StoreError> {
        let id = match self.db_id {
            Some(id) => id,
            None => {
                self.exons.loaded = true;
                self.translation.loaded = true;
                self.attributes.loaded = true;
                self.xrefs.loaded = true;
                self.supporting_features.loaded = true;
                return Ok(());
            }
        };
        if !self.exons.is_loaded() {
            debug!("Loading exons of transcript {}", id);
            self.exons.set(loader.load_exons(id)?);
            self.recalculate_coordinates();
        }
        if !self.translation.is_loaded() {
            let translation = loader.load_translation(id, self.exons.value())?;
            self.translation.set(translation);
            self.invalidate_caches();
        }
        if !self.attributes.is_loaded() {
            self.attributes.set(loader.load_attributes(id)?);
            self.invalidate_caches();
        }
        if !self.xrefs.is_loaded() {
            self.xrefs.set(loader.load_xrefs(id)?);
        }
        if !self.supporting_features.is_loaded() {
            self.supporting_features
                .set(loader.load_supporting_features(id)?);
        }
        Ok(())
    }

    /// Inserts an exon at its position in transcript order
    ///
    /// The exon must be on the same slice and strand as the existing exons
    /// and must not overlap or touch the same position as any of them. On
    /// failure the exon list is unchanged.
    pub fn add_exon(&mut self, exon: Exon) -> Result<(), TxError> {
        self.require_loaded(self.exons.is_loaded(), "exons")?;
        let exons = self.exons.value();

        if let Some(first) = exons.first() {
            if first.strand() != exon.strand() {
                return Err(TxError::validation(format!(
                    "exon {} is not on strand {} of the transcript",
                    exon,
                    first.strand()
                )));
            }
            if !first.slice().is_same_location(exon.slice()) {
                return Err(TxError::validation(format!(
                    "exon {} is not on slice {} of the transcript",
                    exon,
                    first.slice()
                )));
            }
        }

        let idx = match exon.strand() {
            Strand::Plus => exons.partition_point(|e| e.start() <= exon.start()),
            Strand::Minus => exons.partition_point(|e| e.start() >= exon.start()),
        };
        let neighbours = [
            idx.checked_sub(1).and_then(|i| exons.get(i)),
            exons.get(idx),
        ];
        for existing in neighbours.into_iter().flatten() {
            if existing.overlaps(&exon) {
                return Err(TxError::ExonOverlap {
                    exon: exon.to_string(),
                    existing: existing.to_string(),
                });
            }
        }

        self.exons.value_mut().insert(idx, exon);
        self.recalculate_coordinates();
        Ok(())
    }

    /// Replaces `old` by `new`, keeping its position in the exon list
    ///
    /// If `old` is the start or end exon of the translation, the translation
    /// is re-targeted to `new`. The genomic extent is *not* recalculated,
    /// the transcript stays [`TranscriptState::Mutated`] until
    /// [`Transcript::recalculate_coordinates`] is called.
    pub fn swap_exon(&mut self, old: &Exon, new: Exon) -> Result<(), TxError> {
        self.require_loaded(self.exons.is_loaded(), "exons")?;
        self.require_loaded(self.translation.is_loaded(), "translation")?;
        let key = old.hashkey();
        let idx = self
            .exons
            .value()
            .iter()
            .position(|e| e.hashkey() == key)
            .ok_or_else(|| {
                TxError::validation(format!("exon {} is not part of the transcript", old))
            })?;

        if let Some(translation) = self.translation.value_mut() {
            if translation.start_exon().hashkey() == key {
                translation.set_start_exon(new.clone());
            }
            if translation.end_exon().hashkey() == key {
                translation.set_end_exon(new.clone());
            }
        }
        self.exons.value_mut()[idx] = new;
        self.extent_stale = true;
        self.invalidate_caches();
        Ok(())
    }

    /// Removes all exons and resets the genomic extent
    ///
    /// The translation is kept, but cannot be resolved until matching
    /// exons are added again.
    pub fn flush_exons(&mut self) {
        self.exons.set(vec![]);
        self.recalculate_coordinates();
    }

    /// Derives start, end, strand and slice from the exons
    pub fn recalculate_coordinates(&mut self) {
        let exons = self.exons.value();
        match exons.first() {
            Some(first) => {
                self.strand = first.strand();
                self.slice = Some(first.slice().clone());
                self.start = exons.iter().map(|e| e.start()).min().unwrap_or_default();
                self.end = exons.iter().map(|e| e.end()).max().unwrap_or_default();
            }
            None if self.exons.is_loaded() => {
                self.start = 0;
                self.end = 0;
            }
            None => {}
        }
        self.extent_stale = false;
        self.invalidate_caches();
    }

    /// Sets or removes the translation
    ///
    /// Both exons of the translation must be part of the transcript and the
    /// start exon must not come after the end exon.
    pub fn set_translation(&mut self, translation: Option<Translation>) -> Result<(), TxError> {
        self.require_loaded(self.exons.is_loaded(), "exons")?;
        if let Some(tl) = &translation {
            let start_idx = self.exon_index(tl.start_exon()).ok_or_else(|| {
                TxError::validation(format!(
                    "translation start exon {} is not part of the transcript",
                    tl.start_exon()
                ))
            })?;
            let end_idx = self.exon_index(tl.end_exon()).ok_or_else(|| {
                TxError::validation(format!(
                    "translation end exon {} is not part of the transcript",
                    tl.end_exon()
                ))
            })?;
            if start_idx > end_idx {
                return Err(TxError::validation(format!(
                    "translation start exon {} is after its end exon {}",
                    tl.start_exon(),
                    tl.end_exon()
                )));
            }
            check_offset("start", tl.start(), tl.start_exon())?;
            check_offset("end", tl.end(), tl.end_exon())?;
        }
        self.translation.set(translation);
        self.invalidate_caches();
        Ok(())
    }

    /// Sets the translation without validating it against the exons
    pub(crate) fn set_translation_unchecked(&mut self, translation: Option<Translation>) {
        self.translation.set(translation);
        self.invalidate_caches();
    }

    /// Returns the index of the exon in the exon list, matched by its hashkey
    pub fn exon_index(&self, exon: &Exon) -> Option<usize> {
        let key = exon.hashkey();
        self.exons().iter().position(|e| e.hashkey() == key)
    }

    /// Returns the introns in transcript order
    pub fn introns(&self) -> Vec<Intron> {
        self.exons()
            .windows(2)
            .filter_map(|pair| {
                let (start, end) = match pair[0].strand() {
                    Strand::Plus => (pair[0].end() + 1, pair[1].start() - 1),
                    Strand::Minus => (pair[1].end() + 1, pair[0].start() - 1),
                };
                if start > end {
                    return None;
                }
                Some(Intron {
                    slice: pair[0].slice().clone(),
                    start,
                    end,
                    strand: pair[0].strand(),
                })
            })
            .collect()
    }

    /// Length of the spliced, unedited transcript
    pub fn length(&self) -> i64 {
        self.exons().iter().map(|e| e.length()).sum()
    }

    /// Returns the coordinate mapper, building it on first use
    pub fn mapper(&self) -> &TranscriptMapper {
        self.mapper
            .get_or_init(|| TranscriptMapper::new(self.exons(), self.raw_cdna_coding()))
    }

    /// First coding position in cDNA coordinates, `None` for non-coding transcripts
    ///
    /// If edits are enabled, RNA edits upstream of the coding start shift it.
    pub fn cdna_coding_start(&self) -> Option<i64> {
        self.cdna_coding().map(|(start, _)| start)
    }

    /// Last coding position in cDNA coordinates, `None` for non-coding transcripts
    pub fn cdna_coding_end(&self) -> Option<i64> {
        self.cdna_coding().map(|(_, end)| end)
    }

    /// Lowest genomic position of the coding region
    pub fn coding_region_start(&self) -> Option<i64> {
        self.coding_region().map(|(start, _)| start)
    }

    /// Highest genomic position of the coding region
    pub fn coding_region_end(&self) -> Option<i64> {
        self.coding_region().map(|(_, end)| end)
    }

    fn cdna_coding(&self) -> Option<(i64, i64)> {
        if let Some(cached) = self.cdna_coding.get() {
            return cached;
        }
        let value = self.raw_cdna_coding().map(|(mut start, mut end)| {
            if self.edits_enabled {
                for edit in self.sorted_seq_edits() {
                    let diff = edit.length_diff();
                    if diff == 0 {
                        continue;
                    }
                    let edit_start = edit.start() as i64 + 1;
                    if edit_start < start {
                        start += diff;
                    }
                    if edit_start <= end {
                        end += diff;
                    }
                }
            }
            (start, end)
        });
        self.cdna_coding.set(Some(value));
        value
    }

    /// Coding boundaries in cDNA coordinates of the unedited transcript
    fn raw_cdna_coding(&self) -> Option<(i64, i64)> {
        let translation = self.translation()?;
        let exons = self.exons();
        let start_idx = self.exon_index(translation.start_exon())?;
        let end_idx = self.exon_index(translation.end_exon())?;
        let upstream = |idx: usize| -> i64 { exons[..idx].iter().map(|e| e.length()).sum() };
        Some((
            upstream(start_idx) + translation.start(),
            upstream(end_idx) + translation.end(),
        ))
    }

    fn coding_region(&self) -> Option<(i64, i64)> {
        if let Some(cached) = self.coding_region.get() {
            return cached;
        }
        let value = self.translation().map(|tl| {
            let (first, last) = (tl.start_exon(), tl.end_exon());
            match first.strand() {
                Strand::Plus => (
                    first.start() + tl.start() - 1,
                    last.start() + tl.end() - 1,
                ),
                Strand::Minus => (last.end() - tl.end() + 1, first.end() - tl.start() + 1),
            }
        });
        self.coding_region.set(Some(value));
        value
    }

    /// RNA edits sorted by descending start, stable for equal starts
    ///
    /// Malformed edits are skipped with a warning.
    pub(crate) fn sorted_seq_edits(&self) -> Vec<SeqEdit> {
        let mut edits: Vec<SeqEdit> = self
            .attributes()
            .iter()
            .filter(|attr| attr.code == RNA_EDIT_CODE)
            .filter_map(|attr| match attr.seq_edit() {
                Ok(edit) => Some(edit),
                Err(err) => {
                    warn!("Skipping RNA edit of transcript {}: {}", self, err);
                    None
                }
            })
            .collect();
        edits.sort_by(|a, b| b.start().cmp(&a.start()));
        edits
    }

    /// Re-expresses the transcript on another slice of the same seq region
    ///
    /// Returns `None` if the exons are not loaded, or if any exon does not
    /// lie within `target`. The copy keeps the stored id, all cached values
    /// are dropped.
    pub fn transfer(&self, target: &Slice) -> Option<Transcript> {
        if !self.exons.is_loaded() || !self.translation.is_loaded() {
            debug!("Unable to transfer transcript {}, exons are not loaded", self);
            return None;
        }
        let exons = self
            .exons()
            .iter()
            .map(|exon| exon.transfer(target))
            .collect::<Option<Vec<Exon>>>()?;

        let translation = match self.translation() {
            Some(tl) => {
                let mut copy = tl.clone();
                copy.set_start_exon(tl.start_exon().transfer(target)?);
                copy.set_end_exon(tl.end_exon().transfer(target)?);
                Some(copy)
            }
            None => None,
        };

        let mut copy = self.clone();
        copy.exons.set(exons);
        copy.translation.set(translation);
        if copy.exons().is_empty() {
            copy.slice = Some(target.clone());
        }
        copy.recalculate_coordinates();
        Some(copy)
    }

    /// Re-expresses the transcript on the whole seq region in `coord_system`
    ///
    /// The provider is asked for the seq region of the transcript in the
    /// target coordinate system. Returns `None` if the region is unknown or
    /// the exons cannot be placed on it.
    pub fn transform(
        &self,
        coord_system: &CoordSystem,
        provider: &dyn SliceProvider,
    ) -> Result<Option<Transcript>, StoreError> {
        let current = match &self.slice {
            Some(slice) => slice,
            None => return Ok(None),
        };
        match provider.fetch_by_region(coord_system, current.seq_region_name())? {
            Some(target) => Ok(self.transfer(&target)),
            None => Ok(None),
        }
    }

    /// Clears the stored identity after removal from the store
    pub(crate) fn mark_deleted(&mut self) {
        self.db_id = None;
        self.gene_id = None;
        self.removed = true;
    }

    fn invalidate_caches(&mut self) {
        self.mapper = OnceCell::new();
        self.cdna_coding.set(None);
        self.coding_region.set(None);
    }

    fn require_loaded(&self, loaded: bool, collection: &str) -> Result<(), TxError> {
        if loaded {
            Ok(())
        } else {
            Err(TxError::validation(format!(
                "the {} of transcript {} are not loaded",
                collection, self
            )))
        }
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.stable_id, self.db_id) {
            (Some(stable_id), _) => write!(f, "{}", stable_id),
            (None, Some(id)) => write!(f, "#{}", id),
            (None, None) => write!(f, "<unstored>"),
        }
    }
}

/// Builds a [`Transcript`] in memory
///
/// # Examples
///
/// ```rust
/// use txdb::models::{CoordSystem, Exon, Slice, Strand, TranscriptBuilder, Translation};
///
/// let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 1000);
/// let first = Exon::new(slice.clone(), 100, 150, Strand::Plus).unwrap();
/// let last = Exon::new(slice, 200, 260, Strand::Plus).unwrap();
///
/// let tx = TranscriptBuilder::new()
///     .stable_id("ENST0001", 1)
///     .biotype("protein_coding")
///     .exon(first.clone())
///     .exon(last.clone())
///     .translation(Translation::new(first, 10, last, 50).unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.cdna_coding_start(), Some(10));
/// assert_eq!(tx.cdna_coding_end(), Some(101));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuilder {
    kind: TranscriptKind,
    stable_id: Option<(String, u32)>,
    biotype: Option<String>,
    confidence: Option<String>,
    description: Option<String>,
    display_xref: Option<DbEntry>,
    edits_enabled: Option<bool>,
    exons: Vec<Exon>,
    translation: Option<Translation>,
    attributes: Vec<Attribute>,
    xrefs: Vec<DbEntry>,
    supporting_features: Vec<SupportingFeature>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prediction(mut self) -> Self {
        self.kind = TranscriptKind::Prediction;
        self
    }

    pub fn stable_id<S: Into<String>>(mut self, stable_id: S, version: u32) -> Self {
        self.stable_id = Some((stable_id.into(), version));
        self
    }

    pub fn biotype<S: Into<String>>(mut self, biotype: S) -> Self {
        self.biotype = Some(biotype.into());
        self
    }

    pub fn confidence<S: Into<String>>(mut self, confidence: S) -> Self {
        self.confidence = Some(confidence.into());
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn display_xref(mut self, xref: DbEntry) -> Self {
        self.display_xref = Some(xref);
        self
    }

    pub fn edits_enabled(mut self, enabled: bool) -> Self {
        self.edits_enabled = Some(enabled);
        self
    }

    /// Adds an exon, exons can be added in any order
    pub fn exon(mut self, exon: Exon) -> Self {
        self.exons.push(exon);
        self
    }

    pub fn exons(mut self, exons: Vec<Exon>) -> Self {
        self.exons.extend(exons);
        self
    }

    pub fn translation(mut self, translation: Translation) -> Self {
        self.translation = Some(translation);
        self
    }

    pub fn attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn xref(mut self, xref: DbEntry) -> Self {
        self.xrefs.push(xref);
        self
    }

    pub fn supporting_feature(mut self, feature: SupportingFeature) -> Self {
        self.supporting_features.push(feature);
        self
    }

    /// Builds the transcript and validates exons and translation
    pub fn build(self) -> Result<Transcript, TxError> {
        let mut tx = Transcript::new(self.kind);
        if let Some((stable_id, version)) = self.stable_id {
            tx.set_stable_id(Some(stable_id), Some(version));
        }
        if let Some(biotype) = self.biotype {
            tx.set_biotype(biotype);
        }
        if let Some(confidence) = self.confidence {
            tx.set_confidence(confidence);
        }
        tx.set_description(self.description);
        tx.set_display_xref(self.display_xref);
        if let Some(enabled) = self.edits_enabled {
            tx.set_edits_enabled(enabled);
        }
        for exon in self.exons {
            tx.add_exon(exon)?;
        }
        tx.set_translation(self.translation)?;
        for attribute in self.attributes {
            tx.add_attribute(attribute)?;
        }
        for xref in self.xrefs {
            tx.add_xref(xref)?;
        }
        for feature in self.supporting_features {
            tx.add_supporting_feature(feature)?;
        }
        Ok(tx)
    }
}
