//! Schema of the annotation store and its patches
//!
//! A new database is created with the base schema (version 1) and brought
//! to the current version by applying all patches. Every applied patch is
//! recorded in the `meta` table (`meta_key = 'patch'`), so applying the
//! patches again is a no-op.
//!
//! | Patch | Change |
//! | --- | --- |
//! | `patch_1_2_a` | adds `transcript.description` |
//! | `patch_1_2_b` | adds the supporting evidence tables |
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

use crate::utils::errors::StoreError;

/// Schema version after all patches are applied
pub const SCHEMA_VERSION: u32 = 2;

const BASE_SCHEMA: &str = "
CREATE TABLE meta (
    meta_id INTEGER PRIMARY KEY,
    meta_key TEXT NOT NULL,
    meta_value TEXT NOT NULL,
    UNIQUE (meta_key, meta_value)
);

CREATE TABLE coord_system (
    coord_system_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    version TEXT NOT NULL DEFAULT '',
    UNIQUE (name, version)
);

CREATE TABLE seq_region (
    seq_region_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    coord_system_id INTEGER NOT NULL REFERENCES coord_system (coord_system_id),
    length INTEGER NOT NULL,
    UNIQUE (name, coord_system_id)
);

CREATE TABLE dna (
    seq_region_id INTEGER PRIMARY KEY REFERENCES seq_region (seq_region_id),
    sequence TEXT NOT NULL
);

CREATE TABLE exon (
    exon_id INTEGER PRIMARY KEY,
    seq_region_id INTEGER NOT NULL,
    seq_region_start INTEGER NOT NULL,
    seq_region_end INTEGER NOT NULL,
    seq_region_strand INTEGER NOT NULL,
    phase INTEGER NOT NULL,
    end_phase INTEGER NOT NULL
);
CREATE INDEX exon_location ON exon (seq_region_id, seq_region_start);

CREATE TABLE exon_stable_id (
    exon_id INTEGER PRIMARY KEY,
    stable_id TEXT NOT NULL,
    version INTEGER NOT NULL
);

CREATE TABLE transcript (
    transcript_id INTEGER PRIMARY KEY,
    gene_id INTEGER,
    seq_region_id INTEGER NOT NULL,
    seq_region_start INTEGER NOT NULL,
    seq_region_end INTEGER NOT NULL,
    seq_region_strand INTEGER NOT NULL,
    display_xref_id INTEGER,
    biotype TEXT NOT NULL DEFAULT '',
    confidence TEXT NOT NULL DEFAULT ''
);
CREATE INDEX transcript_gene ON transcript (gene_id);

CREATE TABLE transcript_stable_id (
    transcript_id INTEGER PRIMARY KEY,
    stable_id TEXT NOT NULL,
    version INTEGER NOT NULL
);
CREATE INDEX transcript_stable_id_idx ON transcript_stable_id (stable_id);

CREATE TABLE exon_transcript (
    exon_id INTEGER NOT NULL,
    transcript_id INTEGER NOT NULL,
    rank INTEGER NOT NULL,
    PRIMARY KEY (exon_id, transcript_id, rank)
);
CREATE INDEX exon_transcript_transcript ON exon_transcript (transcript_id);

CREATE TABLE translation (
    translation_id INTEGER PRIMARY KEY,
    transcript_id INTEGER NOT NULL,
    seq_start INTEGER NOT NULL,
    start_exon_id INTEGER NOT NULL,
    seq_end INTEGER NOT NULL,
    end_exon_id INTEGER NOT NULL
);
CREATE INDEX translation_transcript ON translation (transcript_id);

CREATE TABLE translation_stable_id (
    translation_id INTEGER PRIMARY KEY,
    stable_id TEXT NOT NULL,
    version INTEGER NOT NULL
);

CREATE TABLE attrib_type (
    attrib_type_id INTEGER PRIMARY KEY,
    code TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE transcript_attrib (
    transcript_id INTEGER NOT NULL,
    attrib_type_id INTEGER NOT NULL,
    value TEXT NOT NULL
);
CREATE INDEX transcript_attrib_idx ON transcript_attrib (transcript_id);

CREATE TABLE translation_attrib (
    translation_id INTEGER NOT NULL,
    attrib_type_id INTEGER NOT NULL,
    value TEXT NOT NULL
);
CREATE INDEX translation_attrib_idx ON translation_attrib (translation_id);

CREATE TABLE xref (
    xref_id INTEGER PRIMARY KEY,
    external_db TEXT NOT NULL,
    dbprimary_acc TEXT NOT NULL,
    display_label TEXT NOT NULL,
    version TEXT NOT NULL DEFAULT '0',
    description TEXT,
    UNIQUE (external_db, dbprimary_acc)
);

CREATE TABLE object_xref (
    object_xref_id INTEGER PRIMARY KEY,
    ensembl_id INTEGER NOT NULL,
    ensembl_object_type TEXT NOT NULL,
    xref_id INTEGER NOT NULL,
    UNIQUE (ensembl_id, ensembl_object_type, xref_id)
);
";

/// A schema patch, identified by the versions it upgrades and a letter
pub struct Patch {
    pub from: u32,
    pub to: u32,
    pub letter: char,
    pub sql: &'static str,
}

impl Patch {
    /// Returns the identifier that is recorded in the `meta` table, e.g. `patch_1_2_a`
    pub fn name(&self) -> String {
        format!("patch_{}_{}_{}", self.from, self.to, self.letter)
    }
}

/// All patches, in the order they must be applied
pub const PATCHES: [Patch; 2] = [
    Patch {
        from: 1,
        to: 2,
        letter: 'a',
        sql: "ALTER TABLE transcript ADD COLUMN description TEXT;",
    },
    Patch {
        from: 1,
        to: 2,
        letter: 'b',
        sql: "
CREATE TABLE IF NOT EXISTS dna_align_feature (
    dna_align_feature_id INTEGER PRIMARY KEY,
    seq_region_id INTEGER NOT NULL,
    seq_region_start INTEGER NOT NULL,
    seq_region_end INTEGER NOT NULL,
    seq_region_strand INTEGER NOT NULL,
    hit_name TEXT NOT NULL,
    hit_start INTEGER NOT NULL,
    hit_end INTEGER NOT NULL,
    score REAL,
    cigar_line TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS protein_align_feature (
    protein_align_feature_id INTEGER PRIMARY KEY,
    seq_region_id INTEGER NOT NULL,
    seq_region_start INTEGER NOT NULL,
    seq_region_end INTEGER NOT NULL,
    seq_region_strand INTEGER NOT NULL,
    hit_name TEXT NOT NULL,
    hit_start INTEGER NOT NULL,
    hit_end INTEGER NOT NULL,
    score REAL,
    cigar_line TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS transcript_supporting_feature (
    transcript_id INTEGER NOT NULL,
    feature_type TEXT NOT NULL,
    feature_id INTEGER NOT NULL,
    UNIQUE (transcript_id, feature_type, feature_id)
);
",
    },
];

/// Returns true if the database contains the `meta` table
pub fn has_schema(conn: &Connection) -> Result<bool, StoreError> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

/// Creates the base schema (version 1) in an empty database
pub fn create_base_schema(conn: &Connection) -> Result<(), StoreError> {
    info!("Creating annotation schema version 1");
    conn.execute_batch(BASE_SCHEMA)?;
    conn.execute(
        "INSERT INTO meta (meta_key, meta_value) VALUES ('schema_version', '1')",
        [],
    )?;
    Ok(())
}

/// Returns the schema version recorded in the `meta` table
pub fn schema_version(conn: &Connection) -> Result<u32, StoreError> {
    let version: Option<String> = conn
        .query_row(
            "SELECT meta_value FROM meta WHERE meta_key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    version
        .and_then(|v| v.parse::<u32>().ok())
        .ok_or_else(|| StoreError::integrity("schema_version missing from meta table"))
}

/// Returns the names of all applied patches
pub fn applied_patches(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT meta_value FROM meta WHERE meta_key = 'patch' ORDER BY meta_value")?;
    let patches = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(patches)
}

/// Applies every patch that is not recorded yet and updates the schema version
///
/// Returns the names of the patches that were applied.
pub fn apply_patches(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let applied = applied_patches(conn)?;
    let mut new_patches = vec![];
    for patch in PATCHES.iter() {
        let name = patch.name();
        if applied.contains(&name) {
            debug!("Patch {} is already applied", name);
            continue;
        }
        info!("Applying schema patch {}", name);
        conn.execute_batch(patch.sql)?;
        conn.execute(
            "INSERT INTO meta (meta_key, meta_value) VALUES ('patch', ?1)",
            [&name],
        )?;
        conn.execute(
            "UPDATE meta SET meta_value = ?1 WHERE meta_key = 'schema_version'",
            [patch.to.to_string()],
        )?;
        new_patches.push(name);
    }
    Ok(new_patches)
}

/// Creates the full schema in an empty database
pub fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    create_base_schema(conn)?;
    apply_patches(conn)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
        let mut stmt = conn
            .prepare(&format!("SELECT name FROM pragma_table_info('{}')", table))
            .unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|c| c.unwrap())
            .collect();
        columns.iter().any(|c| c == column)
    }

    #[test]
    fn test_create_schema() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!has_schema(&conn).unwrap());
        create_schema(&conn).unwrap();
        assert!(has_schema(&conn).unwrap());
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert_eq!(
            applied_patches(&conn).unwrap(),
            vec!["patch_1_2_a".to_string(), "patch_1_2_b".to_string()]
        );
        assert!(has_column(&conn, "transcript", "description"));
    }

    #[test]
    fn test_patch_old_schema() {
        let conn = Connection::open_in_memory().unwrap();
        create_base_schema(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 1);
        assert!(!has_column(&conn, "transcript", "description"));

        let applied = apply_patches(&conn).unwrap();
        assert_eq!(applied.len(), 2);
        assert!(has_column(&conn, "transcript", "description"));
        assert!(has_column(&conn, "transcript_supporting_feature", "feature_type"));

        // patches are recorded and not applied twice
        assert!(apply_patches(&conn).unwrap().is_empty());
        assert_eq!(schema_version(&conn).unwrap(), 2);
    }
}
