mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vox_field::grid::{Grid, ResizeMode};
use vox_field::voxel::Scalar;

const SOURCE_SIZE: usize = 64;
const TARGET_SIZES: [usize; 4] = [128, 48, 16, 8];

fn noise_volume(size: usize, seed: u64) -> Grid<Scalar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid: Grid<Scalar> = Grid::cube(size);
    grid.for_each_mut(|v| *v = Scalar(rng.random_range(0.0..1.0)));
    grid
}

fn resize_benches(c: &mut Criterion) {
    let source = noise_volume(SOURCE_SIZE, 0x5CA1E);

    for (label, mode) in [
        ("nearest", ResizeMode::Nearest),
        ("trilinear", ResizeMode::Trilinear),
    ] {
        let mut group = c.benchmark_group(format!("resampling/{label}"));

        for &target in &TARGET_SIZES {
            group.throughput(common::voxels_throughput(target * target * target));
            group.bench_with_input(BenchmarkId::from_parameter(target), &target, |b, _| {
                let mut output: Grid<Scalar> = Grid::cube(target);
                b.iter(|| {
                    source.resize(&mut output, mode);
                    black_box(output.get(0, 0, 0));
                });
            });
        }

        group.finish();
    }
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = resize_benches
}
criterion_main!(benches);
