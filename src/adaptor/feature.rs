use log::{debug, warn};
use rusqlite::OptionalExtension;

use crate::adaptor::{DbConnection, SliceAdaptor, SliceProvider, SupportingFeatureStore};
use crate::models::{AlignFeature, DbId, Strand, SupportingFeature};
use crate::utils::errors::StoreError;

const DNA_ALIGN: &str = "dna_align_feature";
const PROTEIN_ALIGN: &str = "protein_align_feature";

/// DNA and protein alignments supporting transcripts
pub struct SupportingFeatureAdaptor<'a> {
    db: &'a DbConnection,
    slices: SliceAdaptor<'a>,
}

struct FeatureRow {
    seq_region_id: DbId,
    start: i64,
    end: i64,
    strand: i64,
    hit_name: String,
    hit_start: i64,
    hit_end: i64,
    score: Option<f64>,
    cigar: String,
}

/// Returns the feature table, rejecting features that cannot be stored
fn table(feature: &SupportingFeature) -> Result<&'static str, StoreError> {
    match feature {
        SupportingFeature::DnaAlign(_) => Ok(DNA_ALIGN),
        SupportingFeature::ProteinAlign(_) => Ok(PROTEIN_ALIGN),
        SupportingFeature::Other { kind, .. } => Err(StoreError::UnsupportedType(format!(
            "supporting feature of type {}",
            kind
        ))),
    }
}

impl<'a> SupportingFeatureAdaptor<'a> {
    pub fn new(db: &'a DbConnection) -> Self {
        SupportingFeatureAdaptor {
            db,
            slices: SliceAdaptor::new(db),
        }
    }

    fn fetch(&self, table: &str, id: DbId) -> Result<Option<AlignFeature>, StoreError> {
        let row = self
            .db
            .connection()
            .query_row(
                &format!(
                    "SELECT seq_region_id, seq_region_start, seq_region_end, seq_region_strand,
                    hit_name, hit_start, hit_end, score, cigar_line
                    FROM {} WHERE {}_id = ?1",
                    table, table
                ),
                [id],
                |row| {
                    Ok(FeatureRow {
                        seq_region_id: row.get(0)?,
                        start: row.get(1)?,
                        end: row.get(2)?,
                        strand: row.get(3)?,
                        hit_name: row.get(4)?,
                        hit_start: row.get(5)?,
                        hit_end: row.get(6)?,
                        score: row.get(7)?,
                        cigar: row.get(8)?,
                    })
                },
            )
            .optional()?;
        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };
        let slice = self
            .slices
            .fetch_by_seq_region_id(row.seq_region_id)?
            .ok_or(StoreError::NotFound {
                kind: "seq region",
                id: row.seq_region_id,
            })?;
        let mut feature = AlignFeature::new(
            slice,
            row.start,
            row.end,
            Strand::from_int(row.strand)?,
            row.hit_name,
            row.hit_start,
            row.hit_end,
        );
        feature.score = row.score;
        feature.cigar = row.cigar;
        feature.set_db_id(Some(id));
        Ok(Some(feature))
    }
}

impl SupportingFeatureStore for SupportingFeatureAdaptor<'_> {
    fn store(&self, feature: &mut SupportingFeature) -> Result<DbId, StoreError> {
        let table = table(feature)?;
        if let Some(id) = feature.feature().db_id() {
            return Ok(id);
        }
        let align = feature.feature_mut();
        let seq_region_id = self.slices.seq_region_id(&align.slice)?;
        let (start, end, strand) = align.slice.to_seq_region(align.start, align.end, align.strand);
        let conn = self.db.connection();
        conn.execute(
            &format!(
                "INSERT INTO {} (seq_region_id, seq_region_start, seq_region_end,
                seq_region_strand, hit_name, hit_start, hit_end, score, cigar_line)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                table
            ),
            (
                seq_region_id,
                start,
                end,
                strand.as_int(),
                &align.hit_name,
                align.hit_start,
                align.hit_end,
                align.score,
                &align.cigar,
            ),
        )?;
        let id = conn.last_insert_rowid();
        debug!("Stored {} {} for {}", table, id, align.hit_name);
        align.set_db_id(Some(id));
        Ok(id)
    }

    fn link(&self, transcript_id: DbId, feature: &SupportingFeature) -> Result<(), StoreError> {
        let table = table(feature)?;
        let id = feature.feature().db_id().ok_or_else(|| {
            StoreError::integrity(format!(
                "{} {} is not stored",
                table,
                feature.feature().hit_name
            ))
        })?;
        self.db.connection().execute(
            "INSERT OR IGNORE INTO transcript_supporting_feature (transcript_id, feature_type, feature_id)
            VALUES (?1, ?2, ?3)",
            (transcript_id, table, id),
        )?;
        Ok(())
    }

    fn fetch_all_by_transcript_id(
        &self,
        transcript_id: DbId,
    ) -> Result<Vec<SupportingFeature>, StoreError> {
        let mut stmt = self.db.connection().prepare(
            "SELECT feature_type, feature_id FROM transcript_supporting_feature
            WHERE transcript_id = ?1
            ORDER BY rowid",
        )?;
        let links = stmt
            .query_map([transcript_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, DbId>(1)?))
            })?
            .collect::<Result<Vec<(String, DbId)>, _>>()?;

        let mut features = vec![];
        for (feature_type, id) in links {
            let feature = match feature_type.as_str() {
                DNA_ALIGN => self.fetch(DNA_ALIGN, id)?.map(SupportingFeature::DnaAlign),
                PROTEIN_ALIGN => self
                    .fetch(PROTEIN_ALIGN, id)?
                    .map(SupportingFeature::ProteinAlign),
                other => {
                    warn!(
                        "Skipping supporting feature {} of unknown type {} for transcript {}",
                        id, other, transcript_id
                    );
                    continue;
                }
            };
            match feature {
                Some(feature) => features.push(feature),
                None => warn!(
                    "Supporting feature {} {} of transcript {} does not exist",
                    feature_type, id, transcript_id
                ),
            }
        }
        Ok(features)
    }

    fn remove_links(&self, transcript_id: DbId) -> Result<(), StoreError> {
        self.db.connection().execute(
            "DELETE FROM transcript_supporting_feature WHERE transcript_id = ?1",
            [transcript_id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::transcripts::chromosome_slice;

    fn alignment(hit_name: &str) -> AlignFeature {
        AlignFeature::new(chromosome_slice(), 100, 150, Strand::Plus, hit_name, 1, 51)
    }

    #[test]
    fn test_store_and_fetch() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.supporting_feature_adaptor();

        let mut cdna = SupportingFeature::DnaAlign(alignment("BC000001.1"));
        let mut protein = SupportingFeature::ProteinAlign(alignment("P00001.1"));
        adaptor.store(&mut cdna).unwrap();
        adaptor.store(&mut protein).unwrap();
        adaptor.link(5, &protein).unwrap();
        adaptor.link(5, &cdna).unwrap();

        let features = adaptor.fetch_all_by_transcript_id(5).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].feature_type(), "protein_align_feature");
        assert_eq!(features[1].feature().hit_name, "BC000001.1");
        assert_eq!(features[1].feature().cigar, "51M");
        assert_eq!(features[1].feature().db_id(), cdna.feature().db_id());

        adaptor.remove_links(5).unwrap();
        assert!(adaptor.fetch_all_by_transcript_id(5).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_feature() {
        let db = DbConnection::open_in_memory().unwrap();
        let adaptor = db.supporting_feature_adaptor();
        let mut repeat = SupportingFeature::Other {
            kind: "repeat_feature".to_string(),
            feature: alignment("AluY"),
        };
        assert!(matches!(
            adaptor.store(&mut repeat),
            Err(StoreError::UnsupportedType(_))
        ));
        assert!(matches!(
            adaptor.link(1, &repeat),
            Err(StoreError::UnsupportedType(_))
        ));
    }
}
