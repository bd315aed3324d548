//! Segment a blob with flood fill, persist it sparsely, and load it back.
use vox_field::grid::Grid;
use vox_field::voxel::{Scalar, Voxel};
use vox_field_examples::{init_tracing, save_slice_png, sphere_volume};

const SIZE: usize = 64;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut volume = sphere_volume(SIZE, 0.3, 0.8);
    let mid = (SIZE / 2) as i32;

    // Grow the segment from the blob center; the drift tolerance walks the
    // soft falloff all the way to the blob edge.
    volume.flood_fill(mid, mid, mid, SIZE as i32, 0.05, Scalar(1.0));
    save_slice_png(&volume, mid, "floodfill-segment.png")?;

    let mut segmented = 0usize;
    volume.for_each_mut(|v| {
        if *v == Scalar(1.0) {
            segmented += 1;
        }
    });
    println!("segmented {segmented} voxels");

    // Persist only the segment and restore it into a fresh grid.
    let path = std::env::temp_dir().join("floodfill-segment.sparse.vol");
    let path = path.to_string_lossy().into_owned();
    volume.save_sparse(&path, |v| v == Scalar(1.0))?;

    let mut restored: Grid<Scalar> = Grid::cube(SIZE);
    restored.open(&path)?;

    let mut stored = 0usize;
    restored.for_each_mut(|v| {
        if *v != Scalar::ZERO {
            stored += 1;
        }
    });
    println!("restored {stored} voxels from {path}");

    Ok(())
}
