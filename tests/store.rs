use txdb::adaptor::{schema, DbConnection};
use txdb::config::DbConfig;
use txdb::models::{
    AlignFeature, Attribute, Exon, GeneticCode, SeqEdit, Slice, Strand, SupportingFeature,
    TranscriptBuilder, TranscriptState,
};
use txdb::tests::sequences::{chromosome, genome};
use txdb::tests::transcripts::{
    annotated_transcript, chromosome_slice, coord_system, minus_strand_transcript,
    non_coding_transcript, standard_transcript,
};
use txdb::utils::errors::StoreError;

fn count(db: &DbConnection, table: &str) -> i64 {
    db.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
}

fn cdna_alignment() -> SupportingFeature {
    SupportingFeature::DnaAlign(AlignFeature::new(
        chromosome_slice(),
        100,
        150,
        Strand::Plus,
        "BC000001.1",
        1,
        51,
    ))
}

#[test]
fn store_and_fetch_roundtrip() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();

    let mut tx = annotated_transcript();
    tx.add_attribute(Attribute::rna_edit(&SeqEdit::new(5, 5, "AAA").unwrap()))
        .unwrap();
    tx.add_supporting_feature(cdna_alignment()).unwrap();
    let id = adaptor.store(&mut tx, 7).unwrap();

    let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
    assert!(!fetched.is_loaded());
    assert_eq!(fetched.stable_id(), Some("ENST00000000001"));
    assert_eq!(fetched.version(), Some(1));
    assert_eq!(fetched.gene_id(), Some(7));
    assert_eq!(fetched.description(), Some("Test-Transcript"));
    assert_eq!((fetched.start(), fetched.end()), (100, 260));

    fetched.ensure_loaded(&adaptor).unwrap();
    assert!(fetched.is_loaded());
    let keys: Vec<String> = fetched.exons().iter().map(|e| e.hashkey()).collect();
    let expected: Vec<String> = tx.exons().iter().map(|e| e.hashkey()).collect();
    assert_eq!(keys, expected);
    assert_eq!(fetched.exons()[0].stable_id(), Some("ENSE00000000001"));

    let translation = fetched.translation().unwrap();
    assert_eq!(translation.stable_id(), Some("ENSP00000000001"));
    assert_eq!((translation.start(), translation.end()), (10, 50));

    // the RNA edit is loaded and shifts the coding region
    assert_eq!(fetched.attributes().len(), 1);
    assert_eq!(fetched.cdna_coding_start(), Some(13));
    assert_eq!(fetched.cdna_coding_end(), Some(104));
    assert_eq!(fetched.coding_region_start(), Some(109));

    assert_eq!(fetched.xrefs().len(), 2);
    assert_eq!(fetched.display_xref().unwrap().display_id, "TEST1");
    assert_eq!(fetched.supporting_features().len(), 1);
    assert_eq!(fetched.supporting_features()[0].feature().hit_name, "BC000001.1");

    assert_eq!(
        fetched.translate(&genome(), &GeneticCode::default()).unwrap(),
        tx.translate(&genome(), &GeneticCode::default()).unwrap()
    );
}

#[test]
fn minus_strand_roundtrip() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = minus_strand_transcript();
    let id = adaptor.store(&mut tx, 1).unwrap();

    let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
    fetched.ensure_loaded(&adaptor).unwrap();
    assert_eq!(fetched.strand(), Strand::Minus);
    assert_eq!(fetched.exons()[0].start(), 210);
    assert_eq!(fetched.coding_region_start(), Some(111));
    assert_eq!(fetched.coding_region_end(), Some(251));
    assert_eq!(
        fetched.spliced_sequence(&genome()),
        tx.spliced_sequence(&genome())
    );
    assert_eq!(
        fetched.translate(&genome(), &GeneticCode::default()).unwrap(),
        "SIAQLLRGVPQFSASPRRDNPDAFWGLGCF"
    );
}

#[test]
fn fetched_transcript_accepts_new_exons() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = standard_transcript();
    let id = adaptor.store(&mut tx, 1).unwrap();

    let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
    fetched.ensure_loaded(&adaptor).unwrap();
    assert!(fetched.exons()[0].slice().seq_region_id().is_some());

    fetched
        .add_exon(Exon::new(chromosome_slice(), 400, 450, Strand::Plus).unwrap())
        .unwrap();
    assert_eq!(fetched.exons().len(), 3);
    assert_eq!((fetched.start(), fetched.end()), (100, 450));

    let other = Slice::whole(coord_system(), "2", 1000);
    assert!(fetched
        .add_exon(Exon::new(other, 500, 550, Strand::Plus).unwrap())
        .is_err());
    assert_eq!(fetched.exons().len(), 3);
}

#[test]
fn shared_exons_are_removed_with_the_last_transcript() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();

    let mut coding = standard_transcript();
    let mut non_coding = non_coding_transcript();
    adaptor.store(&mut coding, 1).unwrap();
    adaptor.store(&mut non_coding, 1).unwrap();
    assert_eq!(count(&db, "exon"), 2);
    assert_eq!(count(&db, "exon_transcript"), 4);
    assert_eq!(coding.exons()[0].db_id(), non_coding.exons()[0].db_id());

    adaptor.remove(&mut coding).unwrap();
    assert_eq!(coding.state(), TranscriptState::Deleted);
    assert_eq!(coding.db_id(), None);
    assert_eq!(count(&db, "exon"), 2);
    assert_eq!(count(&db, "translation"), 0);
    assert_eq!(count(&db, "translation_stable_id"), 0);

    let mut remaining = adaptor
        .fetch_by_stable_id("ENST00000000003")
        .unwrap()
        .unwrap();
    remaining.ensure_loaded(&adaptor).unwrap();
    assert_eq!(remaining.exons().len(), 2);

    adaptor.remove(&mut remaining).unwrap();
    for table in [
        "exon",
        "exon_stable_id",
        "exon_transcript",
        "transcript",
        "transcript_stable_id",
    ] {
        assert_eq!(count(&db, table), 0, "{} is not empty", table);
    }
}

#[test]
fn remove_keeps_xrefs() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = annotated_transcript();
    tx.add_supporting_feature(cdna_alignment()).unwrap();
    adaptor.store(&mut tx, 1).unwrap();
    adaptor.remove(&mut tx).unwrap();

    assert_eq!(count(&db, "xref"), 2);
    assert_eq!(count(&db, "object_xref"), 0);
    assert_eq!(count(&db, "dna_align_feature"), 1);
    assert_eq!(count(&db, "transcript_supporting_feature"), 0);
    assert_eq!(count(&db, "transcript_attrib"), 0);
}

#[test]
fn failed_store_is_rolled_back() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();

    let mut tx = standard_transcript();
    tx.set_stable_id(Some("ENST00000000001".to_string()), None);
    assert!(matches!(
        adaptor.store(&mut tx, 1),
        Err(StoreError::Validation(_))
    ));
    assert_eq!(tx.db_id(), None);
    assert!(tx.exons().iter().all(|e| e.db_id().is_none()));
    assert_eq!(count(&db, "transcript"), 0);
    assert_eq!(count(&db, "exon"), 0);
    assert_eq!(count(&db, "translation"), 0);
}

#[test]
fn failed_store_without_atomic_writes_leaves_rows() {
    let config = DbConfig {
        atomic_writes: false,
        ..Default::default()
    };
    let db = DbConnection::open(&config).unwrap();
    let adaptor = db.transcript_adaptor();

    let mut tx = standard_transcript();
    tx.set_stable_id(Some("ENST00000000001".to_string()), None);
    assert!(adaptor.store(&mut tx, 1).is_err());
    assert_eq!(tx.db_id(), None);
    assert_eq!(count(&db, "transcript"), 1);
    assert_eq!(count(&db, "exon"), 2);
    assert_eq!(count(&db, "transcript_stable_id"), 0);
}

#[test]
fn unsupported_supporting_feature() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = standard_transcript();
    tx.add_supporting_feature(SupportingFeature::Other {
        kind: "repeat_feature".to_string(),
        feature: AlignFeature::new(chromosome_slice(), 100, 150, Strand::Plus, "AluY", 1, 51),
    })
    .unwrap();
    assert!(matches!(
        adaptor.store(&mut tx, 1),
        Err(StoreError::UnsupportedType(_))
    ));
    assert_eq!(count(&db, "transcript"), 0);
}

#[test]
fn prediction_transcripts_are_rejected() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut prediction = TranscriptBuilder::new()
        .prediction()
        .exon(Exon::new(chromosome_slice(), 100, 150, Strand::Plus).unwrap())
        .build()
        .unwrap();
    assert!(matches!(
        adaptor.store(&mut prediction, 1),
        Err(StoreError::UnsupportedType(_))
    ));
    assert!(matches!(
        adaptor.remove(&mut prediction),
        Err(StoreError::UnsupportedType(_))
    ));
}

#[test]
fn removing_unstored_transcript_is_a_no_op() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = standard_transcript();
    adaptor.remove(&mut tx).unwrap();
    assert_eq!(tx.state(), TranscriptState::Assembled);
}

#[test]
fn fetch_by_gene_and_translation() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut first = standard_transcript();
    let mut second = minus_strand_transcript();
    let mut other_gene = non_coding_transcript();
    let first_id = adaptor.store(&mut first, 1).unwrap();
    let second_id = adaptor.store(&mut second, 1).unwrap();
    adaptor.store(&mut other_gene, 2).unwrap();

    let ids: Vec<_> = adaptor
        .fetch_all_by_gene_id(1)
        .unwrap()
        .iter()
        .map(|tx| tx.db_id())
        .collect();
    assert_eq!(ids, vec![Some(first_id), Some(second_id)]);

    let translation_id = second.translation().unwrap().db_id().unwrap();
    let owner = adaptor
        .fetch_by_translation_id(translation_id)
        .unwrap()
        .unwrap();
    assert_eq!(owner.db_id(), Some(second_id));

    assert_eq!(
        adaptor.list_stable_ids().unwrap(),
        vec!["ENST00000000001", "ENST00000000002", "ENST00000000003"]
    );
    assert_eq!(adaptor.list_dbids().unwrap().len(), 3);
}

#[test]
fn edits_can_be_disabled_by_config() {
    let config = DbConfig {
        edits_enabled: false,
        ..Default::default()
    };
    let db = DbConnection::open(&config).unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = standard_transcript();
    tx.add_attribute(Attribute::rna_edit(&SeqEdit::new(5, 5, "AAA").unwrap()))
        .unwrap();
    let id = adaptor.store(&mut tx, 1).unwrap();

    let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
    fetched.ensure_loaded(&adaptor).unwrap();
    assert!(!fetched.edits_enabled());
    assert_eq!(fetched.cdna_coding_end(), Some(101));
    assert_eq!(fetched.edited_sequence(&genome()).unwrap().len(), 112);
}

#[test]
fn malformed_stored_rna_edit_is_skipped() {
    let db = DbConnection::open_in_memory().unwrap();
    let adaptor = db.transcript_adaptor();
    let mut tx = standard_transcript();
    tx.add_attribute(Attribute::rna_edit(&SeqEdit::new(5, 5, "AAA").unwrap()))
        .unwrap();
    let id = adaptor.store(&mut tx, 1).unwrap();
    db.connection()
        .execute("UPDATE transcript_attrib SET value = 'x y' WHERE transcript_id = ?1", [id])
        .unwrap();

    let mut fetched = adaptor.fetch_by_dbid(id).unwrap().unwrap();
    fetched.ensure_loaded(&adaptor).unwrap();
    assert_eq!(fetched.attributes().len(), 1);
    assert!(fetched.seq_edits().is_err());

    // neither the sequence nor the coding boundaries see the edit
    assert_eq!(
        fetched.edited_sequence(&genome()).unwrap(),
        fetched.spliced_sequence(&genome())
    );
    assert_eq!(fetched.cdna_coding_start(), Some(10));
    assert_eq!(fetched.cdna_coding_end(), Some(101));
    assert_eq!(
        fetched.translate(&genome(), &GeneticCode::default()).unwrap(),
        "CRNNRVPKMHLGYPKQYLLKIAERRVIIVL"
    );
}

#[test]
fn sequence_from_the_store() {
    let db = DbConnection::open_in_memory().unwrap();
    let slices = db.slice_adaptor();
    slices
        .store_seq_region(&chromosome_slice(), Some(&chromosome()))
        .unwrap();
    let tx = standard_transcript();
    assert_eq!(
        tx.translate(&slices, &GeneticCode::default()).unwrap(),
        tx.translate(&genome(), &GeneticCode::default()).unwrap()
    );
}

#[test]
fn transform_onto_the_whole_seq_region() {
    let db = DbConnection::open_in_memory().unwrap();
    let slices = db.slice_adaptor();
    slices.store_seq_region(&chromosome_slice(), None).unwrap();

    let window = Slice::new(coord_system(), "1", 51, 300, Strand::Plus, 1000).unwrap();
    let on_window = standard_transcript().transfer(&window).unwrap();
    assert_eq!((on_window.start(), on_window.end()), (50, 210));

    let whole = on_window
        .transform(&coord_system(), &slices)
        .unwrap()
        .unwrap();
    assert_eq!((whole.start(), whole.end()), (100, 260));
    assert!(whole.slice().unwrap().seq_region_id().is_some());
    assert_eq!(whole.coding_region_start(), Some(109));

    let unknown = txdb::models::CoordSystem::new("contig", None);
    assert!(on_window.transform(&unknown, &slices).unwrap().is_none());
}

#[test]
fn old_databases_are_patched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        schema::create_base_schema(&conn).unwrap();
    }

    let config = DbConfig {
        apply_patches: false,
        ..DbConfig::with_path(&path)
    };
    {
        let db = DbConnection::open(&config).unwrap();
        assert_eq!(schema::schema_version(db.connection()).unwrap(), 1);
    }

    let db = DbConnection::open(&DbConfig::with_path(&path)).unwrap();
    assert_eq!(
        schema::schema_version(db.connection()).unwrap(),
        schema::SCHEMA_VERSION
    );
    let adaptor = db.transcript_adaptor();
    let mut tx = annotated_transcript();
    tx.add_supporting_feature(cdna_alignment()).unwrap();
    adaptor.store(&mut tx, 1).unwrap();
}
