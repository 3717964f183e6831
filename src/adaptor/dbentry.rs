use log::debug;
use rusqlite::OptionalExtension;

use crate::adaptor::{DbConnection, DbEntryStore};
use crate::models::{DbEntry, DbId};
use crate::utils::errors::StoreError;

/// Cross-references and their links to annotation objects
///
/// An entry is identified by its external database and primary accession.
/// Storing an entry that already exists only adds the link.
pub struct DbEntryAdaptor<'a> {
    db: &'a DbConnection,
}

const SELECT_XREF: &str =
    "SELECT x.xref_id, x.external_db, x.dbprimary_acc, x.display_label, x.version, x.description
    FROM xref x";

fn entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<DbEntry> {
    let mut entry = DbEntry::new(
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, String>(3)?,
    );
    entry.version = row.get(4)?;
    entry.description = row.get(5)?;
    entry.set_db_id(Some(row.get(0)?));
    Ok(entry)
}

impl<'a> DbEntryAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        DbEntryAdaptor { db }
    }
}

impl DbEntryStore for DbEntryAdaptor<'_> {
    fn store(
        &self,
        entry: &mut DbEntry,
        object_id: DbId,
        object_type: &str,
    ) -> Result<DbId, StoreError> {
        let conn = self.db.connection();
        let id = match self.exists(entry)? {
            Some(id) => id,
            None => {
                conn.execute(
                    "INSERT INTO xref (external_db, dbprimary_acc, display_label, version, description)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                    (
                        &entry.external_db,
                        &entry.primary_id,
                        &entry.display_id,
                        &entry.version,
                        &entry.description,
                    ),
                )?;
                debug!("Stored xref {}", entry);
                conn.last_insert_rowid()
            }
        };
        conn.execute(
            "INSERT OR IGNORE INTO object_xref (ensembl_id, ensembl_object_type, xref_id)
            VALUES (?1, ?2, ?3)",
            (object_id, object_type, id),
        )?;
        entry.set_db_id(Some(id));
        Ok(id)
    }

    fn exists(&self, entry: &DbEntry) -> Result<Option<DbId>, StoreError> {
        let id = self
            .db
            .connection()
            .query_row(
                "SELECT xref_id FROM xref WHERE external_db = ?1 AND dbprimary_acc = ?2",
                (&entry.external_db, &entry.primary_id),
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn fetch_by_dbid(&self, id: DbId) -> Result<Option<DbEntry>, StoreError> {
        let entry = self
            .db
            .connection()
            .query_row(
                &format!("{} WHERE x.xref_id = ?1", SELECT_XREF),
                [id],
                entry_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    fn fetch_all_by_object(
        &self,
        object_id: DbId,
        object_type: &str,
    ) -> Result<Vec<DbEntry>, StoreError> {
        let mut stmt = self.db.connection().prepare(&format!(
            "{} JOIN object_xref ox ON ox.xref_id = x.xref_id
            WHERE ox.ensembl_id = ?1 AND ox.ensembl_object_type = ?2
            ORDER BY ox.object_xref_id",
            SELECT_XREF
        ))?;
        let entries = stmt
            .query_map((object_id, object_type), entry_from_row)?
            .collect::<Result<Vec<DbEntry>, _>>()?;
        Ok(entries)
    }

    fn remove_from_object(
        &self,
        entry: &DbEntry,
        object_id: DbId,
        object_type: &str,
    ) -> Result<(), StoreError> {
        let id = match entry.db_id() {
            Some(id) => Some(id),
            None => self.exists(entry)?,
        };
        if let Some(id) = id {
            self.db.connection().execute(
                "DELETE FROM object_xref
                WHERE ensembl_id = ?1 AND ensembl_object_type = ?2 AND xref_id = ?3",
                (object_id, object_type, id),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptor::TRANSCRIPT_OBJECT;

    #[test]
    fn test_store_and_link() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.dbentry_adaptor();
        let mut hgnc = DbEntry::new("HGNC", "HGNC:0001", "TEST1");
        hgnc.description = Some("test gene".to_string());
        let mut copy = hgnc.clone();

        assert!(adaptor.exists(&hgnc).unwrap().is_none());
        let id = adaptor.store(&mut hgnc, 1, TRANSCRIPT_OBJECT).unwrap();
        assert_eq!(adaptor.exists(&hgnc).unwrap(), Some(id));

        // the same entry on another object is not duplicated
        assert_eq!(adaptor.store(&mut copy, 2, TRANSCRIPT_OBJECT).unwrap(), id);
        // storing a link twice is a no-op
        adaptor.store(&mut copy, 2, TRANSCRIPT_OBJECT).unwrap();

        let fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
        assert_eq!(fetched, hgnc);
        assert_eq!(
            adaptor.fetch_all_by_object(2, TRANSCRIPT_OBJECT).unwrap(),
            vec![hgnc.clone()]
        );
        assert!(adaptor.fetch_all_by_object(2, "Translation").unwrap().is_empty());

        adaptor
            .remove_from_object(&hgnc, 1, TRANSCRIPT_OBJECT)
            .unwrap();
        assert!(adaptor.fetch_all_by_object(1, TRANSCRIPT_OBJECT).unwrap().is_empty());
        assert_eq!(adaptor.fetch_all_by_object(2, TRANSCRIPT_OBJECT).unwrap().len(), 1);
        assert!(adaptor.fetch_by_dbid(id).unwrap().is_some());
    }
}
