use criterion::{black_box, criterion_group, criterion_main, Criterion};

use txdb::models::GeneticCode;
use txdb::tests::sequences::genome;
use txdb::tests::transcripts::{minus_strand_transcript, standard_transcript};

fn translate_bench(c: &mut Criterion) {
    let genome = genome();
    let code = GeneticCode::default();
    let plus = standard_transcript();
    let minus = minus_strand_transcript();
    c.bench_function("translate plus strand", |b| {
        b.iter(|| black_box(&plus).translate(&genome, &code).unwrap())
    });
    c.bench_function("translate minus strand", |b| {
        b.iter(|| black_box(&minus).translate(&genome, &code).unwrap())
    });
}

fn edited_sequence_bench(c: &mut Criterion) {
    let genome = genome();
    let tx = standard_transcript();
    c.bench_function("edited sequence", |b| {
        b.iter(|| black_box(&tx).edited_sequence(&genome).unwrap())
    });
}

criterion_group!(translate, translate_bench, edited_sequence_bench,);
criterion_main!(translate);
