use crate::models::{
    CoordSystem, DbEntry, Exon, Slice, Strand, Transcript, TranscriptBuilder, Translation,
};

/// The coordinate system of all fixtures
pub fn coord_system() -> CoordSystem {
    CoordSystem::new("chromosome", Some("GRCh38"))
}

/// The whole fixture chromosome `1`
pub fn chromosome_slice() -> Slice {
    Slice::whole(coord_system(), "1", 1000)
}

fn exon(start: i64, end: i64, strand: Strand) -> Exon {
    Exon::new(chromosome_slice(), start, end, strand).unwrap()
}

/// A coding transcript on the plus strand
///
/// | Exon | Start | End | cDNA |
/// | --- | --- | --- | --- |
/// | 1 | 100 | 150 | 1-51 |
/// | 2 | 200 | 260 | 52-112 |
///
/// The translation starts at offset 10 of exon 1 and ends at offset 50 of
/// exon 2, i.e. cDNA 10-101.
pub fn standard_transcript() -> Transcript {
    let first = exon(100, 150, Strand::Plus).with_stable_id("ENSE00000000001", 1);
    let last = exon(200, 260, Strand::Plus).with_stable_id("ENSE00000000002", 1);
    TranscriptBuilder::new()
        .stable_id("ENST00000000001", 1)
        .biotype("protein_coding")
        .confidence("KNOWN")
        .description("Test-Transcript")
        .exon(first.clone())
        .exon(last.clone())
        .translation(
            Translation::new(first, 10, last, 50)
                .unwrap()
                .with_stable_id("ENSP00000000001", 1),
        )
        .build()
        .unwrap()
}

/// A coding transcript on the minus strand
///
/// | Exon | Start | End | cDNA |
/// | --- | --- | --- | --- |
/// | 1 | 210 | 260 | 1-51 |
/// | 2 | 100 | 160 | 52-112 |
///
/// The translation starts at offset 10 of exon 1 and ends at offset 50 of
/// exon 2, i.e. cDNA 10-101.
pub fn minus_strand_transcript() -> Transcript {
    let first = exon(210, 260, Strand::Minus).with_stable_id("ENSE00000000003", 1);
    let last = exon(100, 160, Strand::Minus).with_stable_id("ENSE00000000004", 1);
    TranscriptBuilder::new()
        .stable_id("ENST00000000002", 1)
        .biotype("protein_coding")
        .confidence("KNOWN")
        .exon(last.clone())
        .exon(first.clone())
        .translation(Translation::new(first, 10, last, 50).unwrap())
        .build()
        .unwrap()
}

/// A non-coding transcript with the exons of [`standard_transcript`]
pub fn non_coding_transcript() -> Transcript {
    TranscriptBuilder::new()
        .stable_id("ENST00000000003", 1)
        .biotype("lncRNA")
        .exon(exon(100, 150, Strand::Plus))
        .exon(exon(200, 260, Strand::Plus))
        .build()
        .unwrap()
}

/// The [`standard_transcript`] with two cross-references, the first one
/// used as display xref
pub fn annotated_transcript() -> Transcript {
    let hgnc = DbEntry::new("HGNC", "HGNC:0001", "TEST1");
    let refseq = DbEntry::new("RefSeq_mRNA", "NM_000001", "NM_000001.1");
    let mut tx = standard_transcript();
    tx.add_xref(hgnc.clone()).unwrap();
    tx.add_xref(refseq).unwrap();
    tx.set_display_xref(Some(hgnc));
    tx
}
