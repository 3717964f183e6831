use log::{debug, warn};
use rusqlite::OptionalExtension;

use crate::adaptor::{DbConnection, SliceProvider};
use crate::models::{CoordSystem, DbId, SequenceProvider, Slice};
use crate::utils::errors::StoreError;

/// Coordinate systems, seq regions and their DNA sequence
///
/// A coordinate system without version is stored with an empty version.
pub struct SliceAdaptor<'a> {
    db: &'a DbConnection,
}

impl<'a> SliceAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        SliceAdaptor { db }
    }

    /// Returns the id of the coordinate system, creating it if needed
    pub fn coord_system_id(&self, coord_system: &CoordSystem) -> Result<DbId, StoreError> {
        let conn = self.db.connection();
        let version = coord_system.version.as_deref().unwrap_or_default();
        let id: Option<DbId> = conn
            .query_row(
                "SELECT coord_system_id FROM coord_system WHERE name = ?1 AND version = ?2",
                (&coord_system.name, version),
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = id {
            return Ok(id);
        }
        conn.execute(
            "INSERT INTO coord_system (name, version) VALUES (?1, ?2)",
            (&coord_system.name, version),
        )?;
        debug!("Added coordinate system {}", coord_system);
        Ok(conn.last_insert_rowid())
    }

    /// Registers the seq region of `slice` and optionally its forward-strand sequence
    ///
    /// An existing sequence is replaced.
    pub fn store_seq_region(&self, slice: &Slice, sequence: Option<&str>) -> Result<DbId, StoreError> {
        if let Some(seq) = sequence {
            if seq.len() as i64 != slice.seq_region_length() {
                return Err(StoreError::validation(format!(
                    "sequence of length {} does not match seq region {} of length {}",
                    seq.len(),
                    slice.seq_region_name(),
                    slice.seq_region_length()
                )));
            }
        }
        let id = self.seq_region_id(slice)?;
        if let Some(seq) = sequence {
            self.db.connection().execute(
                "INSERT OR REPLACE INTO dna (seq_region_id, sequence) VALUES (?1, ?2)",
                (id, seq),
            )?;
        }
        Ok(id)
    }

    fn find_seq_region(&self, slice: &Slice) -> Result<Option<(DbId, i64)>, StoreError> {
        let cs = slice.coord_system();
        let found = self
            .db
            .connection()
            .query_row(
                "SELECT sr.seq_region_id, sr.length
                FROM seq_region sr
                JOIN coord_system cs ON cs.coord_system_id = sr.coord_system_id
                WHERE sr.name = ?1 AND cs.name = ?2 AND cs.version = ?3",
                (
                    slice.seq_region_name(),
                    &cs.name,
                    cs.version.as_deref().unwrap_or_default(),
                ),
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(found)
    }
}

impl SliceProvider for SliceAdaptor<'_> {
    fn fetch_by_region(
        &self,
        coord_system: &CoordSystem,
        seq_region_name: &str,
    ) -> Result<Option<Slice>, StoreError> {
        let lookup = Slice::whole(coord_system.clone(), seq_region_name, 1);
        Ok(self
            .find_seq_region(&lookup)?
            .map(|(id, length)| {
                Slice::whole(coord_system.clone(), seq_region_name, length).with_seq_region_id(id)
            }))
    }

    fn fetch_by_seq_region_id(&self, seq_region_id: DbId) -> Result<Option<Slice>, StoreError> {
        let row: Option<(String, i64, String, String)> = self
            .db
            .connection()
            .query_row(
                "SELECT sr.name, sr.length, cs.name, cs.version
                FROM seq_region sr
                JOIN coord_system cs ON cs.coord_system_id = sr.coord_system_id
                WHERE sr.seq_region_id = ?1",
                [seq_region_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        Ok(row.map(|(name, length, cs_name, cs_version)| {
            let version = if cs_version.is_empty() {
                None
            } else {
                Some(cs_version.as_str())
            };
            Slice::whole(CoordSystem::new(cs_name, version), name, length)
                .with_seq_region_id(seq_region_id)
        }))
    }

    fn seq_region_id(&self, slice: &Slice) -> Result<DbId, StoreError> {
        if let Some(id) = slice.seq_region_id() {
            return Ok(id);
        }
        if let Some((id, length)) = self.find_seq_region(slice)? {
            if length != slice.seq_region_length() {
                return Err(StoreError::integrity(format!(
                    "seq region {} is stored with length {}, not {}",
                    slice.seq_region_name(),
                    length,
                    slice.seq_region_length()
                )));
            }
            return Ok(id);
        }
        let cs_id = self.coord_system_id(slice.coord_system())?;
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO seq_region (name, coord_system_id, length) VALUES (?1, ?2, ?3)",
            (slice.seq_region_name(), cs_id, slice.seq_region_length()),
        )?;
        debug!("Added seq region {}", slice.seq_region_name());
        Ok(conn.last_insert_rowid())
    }
}

impl SequenceProvider for SliceAdaptor<'_> {
    fn fetch_sequence(&self, slice: &Slice, start: i64, end: i64) -> Option<String> {
        if start < 1 || start > end {
            return None;
        }
        let lookup = || -> Result<Option<String>, StoreError> {
            let id = match slice.seq_region_id() {
                Some(id) => id,
                None => match self.find_seq_region(slice)? {
                    Some((id, _)) => id,
                    None => return Ok(None),
                },
            };
            let seq = self
                .db
                .connection()
                .query_row(
                    "SELECT substr(sequence, ?2, ?3) FROM dna WHERE seq_region_id = ?1",
                    (id, start, end - start + 1),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(seq)
        };
        match lookup() {
            Ok(Some(seq)) if seq.len() as i64 == end - start + 1 => Some(seq),
            Ok(_) => None,
            Err(err) => {
                warn!(
                    "Unable to read sequence of {}:{}-{}: {}",
                    slice.seq_region_name(),
                    start,
                    end,
                    err
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sequences::chromosome;
    use crate::tests::transcripts::{chromosome_slice, coord_system};

    #[test]
    fn test_seq_region_roundtrip() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.slice_adaptor();
        let id = adaptor.store_seq_region(&chromosome_slice(), None).unwrap();
        assert_eq!(adaptor.seq_region_id(&chromosome_slice()).unwrap(), id);

        let slice = adaptor.fetch_by_seq_region_id(id).unwrap().unwrap();
        assert_eq!(slice.name(), chromosome_slice().name());
        assert_eq!(slice.coord_system(), &coord_system());

        assert!(adaptor.fetch_by_seq_region_id(id + 1).unwrap().is_none());
        assert!(adaptor
            .fetch_by_region(&CoordSystem::new("chromosome", None), "1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_seq_region_length_mismatch() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.slice_adaptor();
        adaptor.store_seq_region(&chromosome_slice(), None).unwrap();
        let longer = Slice::whole(coord_system(), "1", 2000);
        assert!(matches!(
            adaptor.seq_region_id(&longer),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn test_sequence() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.slice_adaptor();
        assert!(adaptor
            .store_seq_region(&chromosome_slice(), Some("ACGT"))
            .is_err());
        adaptor
            .store_seq_region(&chromosome_slice(), Some(&chromosome()))
            .unwrap();

        let slice = chromosome_slice();
        assert_eq!(
            adaptor.fetch_sequence(&slice, 1, 6),
            Some("TGAGCC".to_string())
        );
        assert_eq!(adaptor.fetch_sequence(&slice, 995, 1005), None);
        let unknown = Slice::whole(coord_system(), "2", 1000);
        assert_eq!(adaptor.fetch_sequence(&unknown, 1, 6), None);
    }
}
