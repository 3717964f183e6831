use std::collections::HashMap;

use log::debug;
use rusqlite::OptionalExtension;

use crate::adaptor::{DbConnection, ExonStore, SliceAdaptor, SliceProvider};
use crate::models::{DbId, Exon, Slice, Strand};
use crate::utils::errors::StoreError;

/// Exon rows and their stable ids
///
/// Exons are stored with absolute seq-region coordinates and are fetched
/// onto the slice spanning their whole seq region.
pub struct ExonAdaptor<'a> {
    db: &'a DbConnection,
    slices: SliceAdaptor<'a>,
}

struct ExonRow {
    id: DbId,
    seq_region_id: DbId,
    start: i64,
    end: i64,
    strand: i64,
    phase: i8,
    end_phase: i8,
    stable_id: Option<String>,
    version: Option<u32>,
}

impl<'a> ExonAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        ExonAdaptor {
            db,
            slices: SliceAdaptor::new(db),
        }
    }

    /// Returns the id of a stored exon with identical location and phases
    pub fn find_identical(&self, exon: &Exon) -> Result<Option<DbId>, StoreError> {
        let seq_region_id = self.slices.seq_region_id(exon.slice())?;
        let (start, end, strand) = exon.seq_region_location();
        let id = self
            .db
            .connection()
            .query_row(
                "SELECT exon_id FROM exon
                WHERE seq_region_id = ?1 AND seq_region_start = ?2 AND seq_region_end = ?3
                AND seq_region_strand = ?4 AND phase = ?5 AND end_phase = ?6",
                (
                    seq_region_id,
                    start,
                    end,
                    strand.as_int(),
                    exon.phase(),
                    exon.end_phase(),
                ),
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn to_exon(&self, row: ExonRow, slices: &mut HashMap<DbId, Slice>) -> Result<Exon, StoreError> {
        if !slices.contains_key(&row.seq_region_id) {
            let slice = self
                .slices
                .fetch_by_seq_region_id(row.seq_region_id)?
                .ok_or(StoreError::NotFound {
                    kind: "seq region",
                    id: row.seq_region_id,
                })?;
            slices.insert(row.seq_region_id, slice);
        }
        let slice = slices[&row.seq_region_id].clone();
        let mut exon = Exon::new(slice, row.start, row.end, Strand::from_int(row.strand)?)?
            .with_phase(row.phase, row.end_phase)?;
        if let (Some(stable_id), Some(version)) = (row.stable_id, row.version) {
            exon = exon.with_stable_id(stable_id, version);
        }
        exon.set_db_id(Some(row.id));
        Ok(exon)
    }
}

impl ExonStore for ExonAdaptor<'_> {
    fn store(&self, exon: &mut Exon) -> Result<DbId, StoreError> {
        if let Some(id) = exon.db_id() {
            return Ok(id);
        }
        if let Some(id) = self.find_identical(exon)? {
            debug!("Re-using stored exon {} for {}", id, exon);
            exon.set_db_id(Some(id));
            return Ok(id);
        }
        if exon.stable_id().is_some() && exon.version().is_none() {
            return Err(StoreError::validation(format!(
                "exon {} has a stable id without version",
                exon
            )));
        }

        let seq_region_id = self.slices.seq_region_id(exon.slice())?;
        let (start, end, strand) = exon.seq_region_location();
        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO exon (seq_region_id, seq_region_start, seq_region_end,
            seq_region_strand, phase, end_phase) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                seq_region_id,
                start,
                end,
                strand.as_int(),
                exon.phase(),
                exon.end_phase(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        if let (Some(stable_id), Some(version)) = (exon.stable_id(), exon.version()) {
            conn.execute(
                "INSERT INTO exon_stable_id (exon_id, stable_id, version) VALUES (?1, ?2, ?3)",
                (id, stable_id, version),
            )?;
        }
        exon.set_db_id(Some(id));
        Ok(id)
    }

    fn fetch_all_by_transcript_id(&self, transcript_id: DbId) -> Result<Vec<Exon>, StoreError> {
        let mut stmt = self.db.connection().prepare(
            "SELECT e.exon_id, e.seq_region_id, e.seq_region_start, e.seq_region_end,
            e.seq_region_strand, e.phase, e.end_phase, s.stable_id, s.version
            FROM exon_transcript et
            JOIN exon e ON e.exon_id = et.exon_id
            LEFT JOIN exon_stable_id s ON s.exon_id = e.exon_id
            WHERE et.transcript_id = ?1
            ORDER BY et.rank",
        )?;
        let rows = stmt
            .query_map([transcript_id], |row| {
                Ok(ExonRow {
                    id: row.get(0)?,
                    seq_region_id: row.get(1)?,
                    start: row.get(2)?,
                    end: row.get(3)?,
                    strand: row.get(4)?,
                    phase: row.get(5)?,
                    end_phase: row.get(6)?,
                    stable_id: row.get(7)?,
                    version: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<ExonRow>, _>>()?;

        let mut slices = HashMap::new();
        rows.into_iter()
            .map(|row| self.to_exon(row, &mut slices))
            .collect()
    }

    fn transcript_count(&self, exon_id: DbId) -> Result<i64, StoreError> {
        let count = self.db.connection().query_row(
            "SELECT COUNT(DISTINCT transcript_id) FROM exon_transcript WHERE exon_id = ?1",
            [exon_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn remove(&self, exon: &mut Exon) -> Result<(), StoreError> {
        let id = match exon.db_id() {
            Some(id) => id,
            None => return Ok(()),
        };
        let conn = self.db.connection();
        conn.execute("DELETE FROM exon_stable_id WHERE exon_id = ?1", [id])?;
        conn.execute("DELETE FROM exon WHERE exon_id = ?1", [id])?;
        debug!("Removed exon {}", id);
        exon.set_db_id(None);
        Ok(())
    }
}
