use criterion::{black_box, criterion_group, criterion_main, Criterion};

use txdb::mapper::TranscriptMapper;
use txdb::models::{CoordSystem, Exon, Slice, Strand};

/// A transcript with 50 exons of 100 bp, separated by 900 bp introns
fn exons() -> Vec<Exon> {
    let slice = Slice::whole(CoordSystem::new("chromosome", None), "1", 100_000);
    (0..50)
        .map(|i| Exon::new(slice.clone(), i * 1000 + 1, i * 1000 + 100, Strand::Plus).unwrap())
        .collect()
}

fn genomic_to_cdna_bench(c: &mut Criterion) {
    let mapper = TranscriptMapper::new(&exons(), Some((51, 4950)));
    c.bench_function("genomic to cDNA across all exons", |b| {
        b.iter(|| mapper.genomic_to_cdna(black_box(1), black_box(50_000), Strand::Plus))
    });
}

fn peptide_to_genomic_bench(c: &mut Criterion) {
    let mapper = TranscriptMapper::new(&exons(), Some((51, 4950)));
    c.bench_function("peptide to genomic", |b| {
        b.iter(|| mapper.peptide_to_genomic(black_box(100), black_box(1200)))
    });
}

fn build_mapper_bench(c: &mut Criterion) {
    let exons = exons();
    c.bench_function("build mapper", |b| {
        b.iter(|| TranscriptMapper::new(black_box(&exons), Some((51, 4950))))
    });
}

criterion_group!(
    mapper,
    genomic_to_cdna_bench,
    peptide_to_genomic_bench,
    build_mapper_bench,
);
criterion_main!(mapper);
