use log::{debug, warn};
use rusqlite::OptionalExtension;

use crate::adaptor::{
    AttributeAdaptor, AttributeOwner, AttributeStore, DbConnection, DbEntryAdaptor, DbEntryStore,
    ExonAdaptor, ExonStore, SliceAdaptor, SliceProvider, SupportingFeatureAdaptor,
    SupportingFeatureStore, TranslationAdaptor, TranslationStore, TRANSCRIPT_OBJECT,
};
use crate::models::{
    Attribute, DbEntry, DbId, Exon, Strand, SupportingFeature, Transcript, TranscriptLoader,
    TranscriptState, Translation,
};
use crate::utils::errors::StoreError;

const SELECT_TRANSCRIPT: &str = "SELECT t.transcript_id, t.gene_id, t.seq_region_id,
    t.seq_region_start, t.seq_region_end, t.seq_region_strand, t.display_xref_id,
    t.biotype, t.confidence, t.description, s.stable_id, s.version
    FROM transcript t
    LEFT JOIN transcript_stable_id s ON s.transcript_id = t.transcript_id";

struct TranscriptRow {
    id: DbId,
    gene_id: Option<DbId>,
    seq_region_id: DbId,
    start: i64,
    end: i64,
    strand: i64,
    display_xref_id: Option<DbId>,
    biotype: String,
    confidence: String,
    description: Option<String>,
    stable_id: Option<String>,
    version: Option<u32>,
}

fn transcript_row(row: &rusqlite::Row) -> rusqlite::Result<TranscriptRow> {
    Ok(TranscriptRow {
        id: row.get(0)?,
        gene_id: row.get(1)?,
        seq_region_id: row.get(2)?,
        start: row.get(3)?,
        end: row.get(4)?,
        strand: row.get(5)?,
        display_xref_id: row.get(6)?,
        biotype: row.get(7)?,
        confidence: row.get(8)?,
        description: row.get(9)?,
        stable_id: row.get(10)?,
        version: row.get(11)?,
    })
}

/// Reads and writes [`Transcript`]s and everything they own
///
/// Writing a transcript touches many tables. With
/// [`atomic_writes`](`crate::config::DbConfig::atomic_writes`) enabled,
/// [`store`](`TranscriptAdaptor::store`) and [`remove`](`TranscriptAdaptor::remove`)
/// either write all rows or none. The transcript itself is only updated
/// (ids assigned or cleared) if the operation succeeds.
///
/// The adaptor also acts as the [`TranscriptLoader`] for the transcripts it fetches.
///
/// # Examples
///
/// ```rust
/// use txdb::adaptor::DbConnection;
/// use txdb::models::TranscriptState;
/// use txdb::tests::transcripts::standard_transcript;
///
/// let db = DbConnection::open_in_memory().unwrap();
/// let adaptor = db.transcript_adaptor();
///
/// let mut tx = standard_transcript();
/// adaptor.store(&mut tx, 1).unwrap();
///
/// let mut fetched = adaptor.fetch_by_stable_id("ENST00000000001").unwrap().unwrap();
/// assert_eq!(fetched.biotype(), "protein_coding");
/// assert!(!fetched.is_loaded());
///
/// adaptor.remove(&mut fetched).unwrap();
/// assert_eq!(fetched.state(), TranscriptState::Deleted);
/// assert!(adaptor.list_dbids().unwrap().is_empty());
/// ```
pub struct TranscriptAdaptor<'a> {
    db: &'a DbConnection,
    slices: Box<dyn SliceProvider + 'a>,
    exons: Box<dyn ExonStore + 'a>,
    translations: Box<dyn TranslationStore + 'a>,
    dbentries: Box<dyn DbEntryStore + 'a>,
    attributes: Box<dyn AttributeStore + 'a>,
    features: Box<dyn SupportingFeatureStore + 'a>,
}

impl<'a> TranscriptAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        TranscriptAdaptor {
            db,
            slices: Box::new(SliceAdaptor::new(db)),
            exons: Box::new(ExonAdaptor::new(db)),
            translations: Box::new(TranslationAdaptor::new(db)),
            dbentries: Box::new(DbEntryAdaptor::new(db)),
            attributes: Box::new(AttributeAdaptor::new(db)),
            features: Box::new(SupportingFeatureAdaptor::new(db)),
        }
    }

    /// Stores the transcript with all exons, its translation, xrefs,
    /// supporting features and attributes for the gene `gene_id`
    ///
    /// Returns the id of the transcript. Storing an already stored
    /// transcript is a no-op.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnsupportedType`] for prediction transcripts and
    ///   supporting features other than DNA or protein alignments
    /// - [`StoreError::Validation`] for transcripts without exons or with a
    ///   stable id without version
    /// - [`StoreError::Integrity`] if an exon of the translation is not part
    ///   of the transcript
    pub fn store(&self, transcript: &mut Transcript, gene_id: DbId) -> Result<DbId, StoreError> {
        if let Some(id) = transcript.db_id() {
            debug!("Transcript {} is already stored as {}", transcript, id);
            return Ok(id);
        }
        if transcript.is_prediction() {
            return Err(StoreError::UnsupportedType(format!(
                "prediction transcript {} must be stored by a prediction adaptor",
                transcript
            )));
        }

        let mut work = transcript.clone();
        let id = self.db.atomic(|| self.store_rows(&mut work, gene_id))?;
        *transcript = work;
        debug!("Stored transcript {} as {}", transcript, id);
        Ok(id)
    }

    fn store_rows(&self, tx: &mut Transcript, gene_id: DbId) -> Result<DbId, StoreError> {
        if tx.exons().is_empty() {
            return Err(StoreError::validation(format!(
                "transcript {} has no exons",
                tx
            )));
        }
        if tx.state() == TranscriptState::Mutated {
            tx.recalculate_coordinates();
        }
        let slice = tx
            .slice()
            .cloned()
            .ok_or_else(|| StoreError::validation(format!("transcript {} has no slice", tx)))?;

        for exon in tx.exons_mut() {
            self.exons.store(exon)?;
        }

        let conn = self.db.connection();
        let seq_region_id = self.slices.seq_region_id(&slice)?;
        let (start, end, strand) = slice.to_seq_region(tx.start(), tx.end(), tx.strand());
        conn.execute(
            "INSERT INTO transcript (gene_id, seq_region_id, seq_region_start, seq_region_end,
            seq_region_strand, biotype, confidence, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                gene_id,
                seq_region_id,
                start,
                end,
                strand.as_int(),
                tx.biotype(),
                tx.confidence(),
                tx.description(),
            ),
        )?;
        let id = conn.last_insert_rowid();

        let stored: Vec<Exon> = tx.exons().to_vec();
        if let Some(translation) = tx.translation_mut() {
            let start_exon = stored_exon(&stored, translation.start_exon())?;
            let end_exon = stored_exon(&stored, translation.end_exon())?;
            translation.set_start_exon(start_exon);
            translation.set_end_exon(end_exon);
            self.translations.store(translation, id)?;
        }

        for xref in tx.xrefs_mut() {
            self.dbentries.store(xref, id, TRANSCRIPT_OBJECT)?;
        }
        if let Some(mut display) = tx.display_xref().cloned() {
            match self.stored_xref_id(&display)? {
                Some(xref_id) => {
                    conn.execute(
                        "UPDATE transcript SET display_xref_id = ?1 WHERE transcript_id = ?2",
                        (xref_id, id),
                    )?;
                    display.set_db_id(Some(xref_id));
                    tx.set_display_xref(Some(display));
                }
                None => warn!(
                    "Display xref {} of transcript {} is not stored, the transcript has no display xref",
                    display, tx
                ),
            }
        }

        for (idx, exon) in tx.exons().iter().enumerate() {
            let exon_id = exon
                .db_id()
                .ok_or_else(|| StoreError::integrity(format!("exon {} is not stored", exon)))?;
            conn.execute(
                "INSERT INTO exon_transcript (exon_id, transcript_id, rank) VALUES (?1, ?2, ?3)",
                (exon_id, id, idx as i64 + 1),
            )?;
        }

        if let Some(stable_id) = tx.stable_id() {
            let version = tx.version().ok_or_else(|| {
                StoreError::validation(format!(
                    "stable id {} of transcript has no version",
                    stable_id
                ))
            })?;
            conn.execute(
                "INSERT INTO transcript_stable_id (transcript_id, stable_id, version)
                VALUES (?1, ?2, ?3)",
                (id, stable_id, version),
            )?;
        }

        for feature in tx.supporting_features_mut() {
            self.features.store(feature)?;
            self.features.link(id, feature)?;
        }

        self.attributes
            .store(AttributeOwner::Transcript(id), tx.attributes())?;

        tx.set_db_id(Some(id));
        tx.set_gene_id(Some(gene_id));
        Ok(id)
    }

    fn stored_xref_id(&self, xref: &DbEntry) -> Result<Option<DbId>, StoreError> {
        match xref.db_id() {
            Some(id) => Ok(Some(id)),
            None => self.dbentries.exists(xref),
        }
    }

    /// Removes the transcript and everything only it owns
    ///
    /// Exons that are shared with other transcripts and xrefs are kept,
    /// only their links to the transcript are removed. Afterwards the
    /// transcript has no id and is [`TranscriptState::Deleted`].
    /// Removing a transcript that is not stored only logs a warning.
    pub fn remove(&self, transcript: &mut Transcript) -> Result<(), StoreError> {
        if transcript.is_prediction() {
            return Err(StoreError::UnsupportedType(format!(
                "prediction transcript {} must be removed by a prediction adaptor",
                transcript
            )));
        }
        let id = match transcript.db_id() {
            Some(id) => id,
            None => {
                warn!("Transcript {} is not stored, nothing to remove", transcript);
                return Ok(());
            }
        };
        transcript.ensure_loaded(self)?;

        let mut work = transcript.clone();
        self.db.atomic(|| self.remove_rows(&mut work, id))?;
        work.mark_deleted();
        *transcript = work;
        debug!("Removed transcript {}", id);
        Ok(())
    }

    fn remove_rows(&self, tx: &mut Transcript, id: DbId) -> Result<(), StoreError> {
        self.features.remove_links(id)?;
        for xref in tx.xrefs() {
            self.dbentries
                .remove_from_object(xref, id, TRANSCRIPT_OBJECT)?;
        }
        if let Some(translation) = tx.translation_mut() {
            self.translations.remove(translation)?;
        }
        for exon in tx.exons_mut() {
            if let Some(exon_id) = exon.db_id() {
                if self.exons.transcript_count(exon_id)? <= 1 {
                    self.exons.remove(exon)?;
                } else {
                    debug!("Keeping exon {}, it is shared with other transcripts", exon_id);
                }
            }
        }

        let conn = self.db.connection();
        conn.execute("DELETE FROM exon_transcript WHERE transcript_id = ?1", [id])?;
        conn.execute(
            "DELETE FROM transcript_stable_id WHERE transcript_id = ?1",
            [id],
        )?;
        self.attributes.remove_all(AttributeOwner::Transcript(id))?;
        conn.execute("DELETE FROM transcript WHERE transcript_id = ?1", [id])?;
        Ok(())
    }

    /// Writes display xref, description, biotype and confidence of a stored transcript
    ///
    /// All other changes are ignored.
    pub fn update(&self, transcript: &Transcript) -> Result<(), StoreError> {
        let id = transcript.db_id().ok_or_else(|| {
            StoreError::validation(format!("transcript {} is not stored", transcript))
        })?;
        let display_xref_id = match transcript.display_xref() {
            Some(xref) => {
                let xref_id = self.stored_xref_id(xref)?;
                if xref_id.is_none() {
                    warn!(
                        "Display xref {} of transcript {} is not stored, removing the display xref",
                        xref, transcript
                    );
                }
                xref_id
            }
            None => None,
        };
        let updated = self.db.connection().execute(
            "UPDATE transcript
            SET display_xref_id = ?1, description = ?2, biotype = ?3, confidence = ?4
            WHERE transcript_id = ?5",
            (
                display_xref_id,
                transcript.description(),
                transcript.biotype(),
                transcript.confidence(),
                id,
            ),
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound {
                kind: "transcript",
                id,
            });
        }
        Ok(())
    }

    /// Returns the transcript with the given id, its collections are not loaded
    pub fn fetch_by_dbid(&self, id: DbId) -> Result<Option<Transcript>, StoreError> {
        let row = self
            .db
            .connection()
            .query_row(
                &format!("{} WHERE t.transcript_id = ?1", SELECT_TRANSCRIPT),
                [id],
                transcript_row,
            )
            .optional()?;
        row.map(|row| self.to_transcript(row)).transpose()
    }

    /// Returns the latest version of the transcript with the given stable id
    pub fn fetch_by_stable_id(&self, stable_id: &str) -> Result<Option<Transcript>, StoreError> {
        let row = self
            .db
            .connection()
            .query_row(
                &format!(
                    "{} WHERE s.stable_id = ?1 ORDER BY s.version DESC LIMIT 1",
                    SELECT_TRANSCRIPT
                ),
                [stable_id],
                transcript_row,
            )
            .optional()?;
        row.map(|row| self.to_transcript(row)).transpose()
    }

    /// Returns all transcripts of a gene, ordered by id
    pub fn fetch_all_by_gene_id(&self, gene_id: DbId) -> Result<Vec<Transcript>, StoreError> {
        let mut stmt = self.db.connection().prepare(&format!(
            "{} WHERE t.gene_id = ?1 ORDER BY t.transcript_id",
            SELECT_TRANSCRIPT
        ))?;
        let rows = stmt
            .query_map([gene_id], transcript_row)?
            .collect::<Result<Vec<TranscriptRow>, _>>()?;
        rows.into_iter().map(|row| self.to_transcript(row)).collect()
    }

    /// Returns the transcript that owns the translation with the given id
    pub fn fetch_by_translation_id(
        &self,
        translation_id: DbId,
    ) -> Result<Option<Transcript>, StoreError> {
        let transcript_id: Option<DbId> = self
            .db
            .connection()
            .query_row(
                "SELECT transcript_id FROM translation WHERE translation_id = ?1",
                [translation_id],
                |row| row.get(0),
            )
            .optional()?;
        match transcript_id {
            Some(id) => self.fetch_by_dbid(id),
            None => Ok(None),
        }
    }

    /// Returns the ids of all stored transcripts in ascending order
    pub fn list_dbids(&self) -> Result<Vec<DbId>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT transcript_id FROM transcript ORDER BY transcript_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<DbId>, _>>()?;
        Ok(ids)
    }

    /// Returns all distinct stable ids in lexicographic order
    pub fn list_stable_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .db
            .connection()
            .prepare("SELECT DISTINCT stable_id FROM transcript_stable_id ORDER BY stable_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    fn to_transcript(&self, row: TranscriptRow) -> Result<Transcript, StoreError> {
        let slice = self
            .slices
            .fetch_by_seq_region_id(row.seq_region_id)?
            .ok_or(StoreError::NotFound {
                kind: "seq region",
                id: row.seq_region_id,
            })?;
        let mut tx = Transcript::from_store(
            row.id,
            slice,
            row.start,
            row.end,
            Strand::from_int(row.strand)?,
        );
        tx.set_gene_id(row.gene_id);
        tx.set_stable_id(row.stable_id, row.version);
        tx.set_biotype(row.biotype);
        tx.set_confidence(row.confidence);
        tx.set_description(row.description);
        tx.set_edits_enabled(self.db.config().edits_enabled);
        if let Some(xref_id) = row.display_xref_id {
            match self.dbentries.fetch_by_dbid(xref_id)? {
                Some(xref) => tx.set_display_xref(Some(xref)),
                None => warn!(
                    "Display xref {} of transcript {} does not exist",
                    xref_id, tx
                ),
            }
        }
        Ok(tx)
    }
}

/// Returns the stored exon matching `exon` by its hashkey
fn stored_exon(stored: &[Exon], exon: &Exon) -> Result<Exon, StoreError> {
    let key = exon.hashkey();
    stored
        .iter()
        .find(|e| e.hashkey() == key)
        .cloned()
        .ok_or_else(|| {
            StoreError::integrity(format!(
                "translation exon {} is not an exon of the transcript",
                exon
            ))
        })
}

impl TranscriptLoader for TranscriptAdaptor<'_> {
    fn load_exons(&self, transcript_id: DbId) -> Result<Vec<Exon>, StoreError> {
        self.exons.fetch_all_by_transcript_id(transcript_id)
    }

    fn load_translation(
        &self,
        transcript_id: DbId,
        exons: &[Exon],
    ) -> Result<Option<Translation>, StoreError> {
        self.translations.fetch_by_transcript_id(transcript_id, exons)
    }

    fn load_attributes(&self, transcript_id: DbId) -> Result<Vec<Attribute>, StoreError> {
        self.attributes
            .fetch_all(AttributeOwner::Transcript(transcript_id))
    }

    fn load_xrefs(&self, transcript_id: DbId) -> Result<Vec<DbEntry>, StoreError> {
        self.dbentries
            .fetch_all_by_object(transcript_id, TRANSCRIPT_OBJECT)
    }

    fn load_supporting_features(
        &self,
        transcript_id: DbId,
    ) -> Result<Vec<SupportingFeature>, StoreError> {
        self.features.fetch_all_by_transcript_id(transcript_id)
    }
}
