//! Downsample a volume past the 2x decimation threshold (forcing mip
//! reduction) and compare against naive nearest sampling.
use vox_field::grid::{Grid, ResizeMode};
use vox_field::voxel::Scalar;
use vox_field_examples::{init_tracing, save_slice_png, sphere_volume};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let source = sphere_volume(96, 0.4, 1.0);
    save_slice_png(&source, 48, "resample-source.png")?;

    // 96 -> 12 is an 8x decimation per axis; trilinear pre-halves each axis
    // until the remaining ratio is interpolatable.
    let mut trilinear: Grid<Scalar> = Grid::cube(12);
    source.resize(&mut trilinear, ResizeMode::Trilinear);

    let mut nearest: Grid<Scalar> = Grid::cube(12);
    source.resize(&mut nearest, ResizeMode::Nearest);

    // Blow both back up for a side-by-side look at the aliasing.
    let mut trilinear_big: Grid<Scalar> = Grid::cube(96);
    trilinear.resize(&mut trilinear_big, ResizeMode::Trilinear);
    save_slice_png(&trilinear_big, 48, "resample-trilinear.png")?;

    let mut nearest_big: Grid<Scalar> = Grid::cube(96);
    nearest.resize(&mut nearest_big, ResizeMode::Trilinear);
    save_slice_png(&nearest_big, 48, "resample-nearest.png")?;

    Ok(())
}
