use log::debug;
use rusqlite::OptionalExtension;

use crate::adaptor::{AttributeAdaptor, AttributeOwner, AttributeStore, DbConnection, TranslationStore};
use crate::models::{DbId, Exon, Translation};
use crate::utils::errors::StoreError;

/// Translation rows, their stable ids and attributes
pub struct TranslationAdaptor<'a> {
    db: &'a DbConnection,
    attributes: AttributeAdaptor<'a>,
}

struct TranslationRow {
    id: DbId,
    start: i64,
    start_exon_id: DbId,
    end: i64,
    end_exon_id: DbId,
    stable_id: Option<String>,
    version: Option<u32>,
}

impl<'a> TranslationAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        TranslationAdaptor {
            db,
            attributes: AttributeAdaptor::new(db),
        }
    }

    /// Returns the id of the transcript a translation belongs to
    pub fn transcript_id(&self, translation_id: DbId) -> Result<Option<DbId>, StoreError> {
        let id = self
            .db
            .connection()
            .query_row(
                "SELECT transcript_id FROM translation WHERE translation_id = ?1",
                [translation_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

fn resolve_exon(exons: &[Exon], id: DbId, translation_id: DbId) -> Result<Exon, StoreError> {
    exons
        .iter()
        .find(|exon| exon.db_id() == Some(id))
        .cloned()
        .ok_or_else(|| {
            StoreError::integrity(format!(
                "exon {} of translation {} is not part of its transcript",
                id, translation_id
            ))
        })
}

impl TranslationStore for TranslationAdaptor<'_> {
    fn store(
        &self,
        translation: &mut Translation,
        transcript_id: DbId,
    ) -> Result<DbId, StoreError> {
        let start_exon_id = translation.start_exon().db_id().ok_or_else(|| {
            StoreError::integrity(format!(
                "start exon {} of the translation is not stored",
                translation.start_exon()
            ))
        })?;
        let end_exon_id = translation.end_exon().db_id().ok_or_else(|| {
            StoreError::integrity(format!(
                "end exon {} of the translation is not stored",
                translation.end_exon()
            ))
        })?;
        if translation.stable_id().is_some() && translation.version().is_none() {
            return Err(StoreError::validation(
                "translation has a stable id without version",
            ));
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO translation (transcript_id, seq_start, start_exon_id, seq_end, end_exon_id)
            VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                transcript_id,
                translation.start(),
                start_exon_id,
                translation.end(),
                end_exon_id,
            ),
        )?;
        let id = conn.last_insert_rowid();
        if let (Some(stable_id), Some(version)) = (translation.stable_id(), translation.version()) {
            conn.execute(
                "INSERT INTO translation_stable_id (translation_id, stable_id, version)
                VALUES (?1, ?2, ?3)",
                (id, stable_id, version),
            )?;
        }
        self.attributes
            .store(AttributeOwner::Translation(id), translation.attributes())?;
        debug!("Stored translation {} of transcript {}", id, transcript_id);
        translation.set_db_id(Some(id));
        Ok(id)
    }

    fn fetch_by_transcript_id(
        &self,
        transcript_id: DbId,
        exons: &[Exon],
    ) -> Result<Option<Translation>, StoreError> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT t.translation_id, t.seq_start, t.start_exon_id, t.seq_end, t.end_exon_id,
                s.stable_id, s.version
                FROM translation t
                LEFT JOIN translation_stable_id s ON s.translation_id = t.translation_id
                WHERE t.transcript_id = ?1",
                [transcript_id],
                |row| {
                    Ok(TranslationRow {
                        id: row.get(0)?,
                        start: row.get(1)?,
                        start_exon_id: row.get(2)?,
                        end: row.get(3)?,
                        end_exon_id: row.get(4)?,
                        stable_id: row.get(5)?,
                        version: row.get(6)?,
                    })
                },
            )
            .optional()?;
        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let start_exon = resolve_exon(exons, row.start_exon_id, row.id)?;
        let end_exon = resolve_exon(exons, row.end_exon_id, row.id)?;
        let mut translation = Translation::unchecked(start_exon, row.start, end_exon, row.end);
        translation.set_db_id(Some(row.id));
        translation.set_stable_id(row.stable_id, row.version);
        translation.set_attributes(self.attributes.fetch_all(AttributeOwner::Translation(row.id))?);
        Ok(Some(translation))
    }

    fn remove(&self, translation: &mut Translation) -> Result<(), StoreError> {
        let id = match translation.db_id() {
            Some(id) => id,
            None => return Ok(()),
        };
        self.attributes.remove_all(AttributeOwner::Translation(id))?;
        let conn = self.db.connection();
        conn.execute(
            "DELETE FROM translation_stable_id WHERE translation_id = ?1",
            [id],
        )?;
        conn.execute("DELETE FROM translation WHERE translation_id = ?1", [id])?;
        translation.set_db_id(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::ExonStore;
    use crate::models::Attribute;
    use crate::tests::transcripts::standard_transcript;

    fn stored_exons(db: &DbConnection) -> Vec<Exon> {
        let exons = db.exon_adaptor();
        let mut stored = standard_transcript().exons().to_vec();
        for exon in stored.iter_mut() {
            exons.store(exon).unwrap();
        }
        stored
    }

    #[test]
    fn test_store_and_fetch() {
        let db = DbConnection::open_in_memory().unwrap();
        let exons = stored_exons(&db);
        let adaptor = db.translation_adaptor();

        let mut translation = Translation::new(exons[0].clone(), 10, exons[1].clone(), 50)
            .unwrap()
            .with_stable_id("ENSP01", 3);
        translation.add_attribute(Attribute::new("_selenocysteine", "Selenocysteine", "5 6 U"));
        let id = adaptor.store(&mut translation, 11).unwrap();
        assert_eq!(translation.db_id(), Some(id));
        assert_eq!(adaptor.transcript_id(id).unwrap(), Some(11));

        let fetched = adaptor.fetch_by_transcript_id(11, &exons).unwrap().unwrap();
        assert_eq!(fetched, translation);

        assert!(adaptor.fetch_by_transcript_id(12, &exons).unwrap().is_none());
    }

    #[test]
    fn test_unstored_exon() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.translation_adaptor();
        let tx = standard_transcript();
        let mut translation = tx.translation().unwrap().clone();
        assert!(matches!(
            adaptor.store(&mut translation, 1),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn test_fetch_with_foreign_exon() {
        let db = DbConnection::open_in_memory().unwrap();
        let exons = stored_exons(&db);
        let adaptor = db.translation_adaptor();
        let mut translation =
            Translation::new(exons[0].clone(), 10, exons[1].clone(), 50).unwrap();
        adaptor.store(&mut translation, 11).unwrap();
        assert!(matches!(
            adaptor.fetch_by_transcript_id(11, &exons[..1]),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn test_remove() {
        let db = DbConnection::open_in_memory().unwrap();
        let exons = stored_exons(&db);
        let adaptor = db.translation_adaptor();
        let mut translation = Translation::new(exons[0].clone(), 10, exons[1].clone(), 50)
            .unwrap()
            .with_stable_id("ENSP01", 1);
        adaptor.store(&mut translation, 11).unwrap();
        adaptor.remove(&mut translation).unwrap();
        assert!(translation.db_id().is_none());
        assert!(adaptor.fetch_by_transcript_id(11, &exons).unwrap().is_none());
    }
}
