//! Criterion benchmarks for the compress/uncompress passes over a level with
//! a realistic mix of run-ordered and permuted blocks.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use dofpack::{DofLevelBuilder, VariantCatalog, VariantId};

const NUM_CELLS: usize = 50_000;

/// Builds a level where roughly 80% of active blocks are arithmetic runs and
/// every fifth cell slot is inactive, mimicking a partially refined level.
fn build_level(catalog: &VariantCatalog) -> dofpack::DofLevel {
    let q1 = VariantId::new(0).unwrap();
    let mut builder = DofLevelBuilder::new();
    let mut next_dof: u64 = 0;
    for cell in 0..NUM_CELLS {
        if cell % 5 == 4 {
            builder.push_inactive();
            continue;
        }
        let mut dofs: Vec<u64> = (next_dof..next_dof + 4).collect();
        next_dof += 4;
        if cell % 5 == 3 {
            dofs.swap(0, 3);
        }
        builder.push_cell(q1, &dofs);
    }
    builder.build(catalog).unwrap()
}

fn bench_compress(c: &mut Criterion) {
    let catalog = VariantCatalog::from_lengths(2, &[4]);
    let level = build_level(&catalog);

    c.bench_function("compress_data_50k_cells", |b| {
        b.iter_batched(
            || level.clone(),
            |mut level| level.compress_data(&catalog).unwrap(),
            BatchSize::LargeInput,
        )
    });
}

fn bench_uncompress(c: &mut Criterion) {
    let catalog = VariantCatalog::from_lengths(2, &[4]);
    let mut compressed = build_level(&catalog);
    compressed.compress_data(&catalog).unwrap();

    c.bench_function("uncompress_data_50k_cells", |b| {
        b.iter_batched(
            || compressed.clone(),
            |mut level| level.uncompress_data(&catalog).unwrap(),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_compress, bench_uncompress);
criterion_main!(benches);
