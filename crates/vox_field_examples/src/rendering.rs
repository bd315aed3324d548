//! Shared helpers for the example binaries: tracing setup, synthetic test
//! volumes, and PNG slice dumps.
use anyhow::Context;
use glam::Vec3;
use image::GrayImage;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use vox_field::grid::Grid;
use vox_field::voxel::Scalar;

/// Install a fmt subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A cubic volume holding a soft-edged sphere of `value` at the center.
pub fn sphere_volume(size: usize, radius_fraction: f32, value: f32) -> Grid<Scalar> {
    let mut grid: Grid<Scalar> = Grid::cube(size);
    let center = Vec3::splat(size as f32 / 2.0);
    let radius = radius_fraction * size as f32;

    for z in 0..size as i32 {
        for y in 0..size as i32 {
            for x in 0..size as i32 {
                let p = Vec3::new(x as f32, y as f32, z as f32);
                let d = (p - center).length();
                if d < radius {
                    // Keep a solid edge so the blob stays separable from the
                    // zero background.
                    let falloff = 1.0 - 0.5 * (d / radius).powi(2);
                    grid.set(x, y, z, Scalar(value * falloff));
                }
            }
        }
    }
    grid
}

/// A cubic volume of seeded uniform noise in `[low, high)`.
pub fn noise_volume(size: usize, seed: u64, low: f32, high: f32) -> Grid<Scalar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid: Grid<Scalar> = Grid::cube(size);
    grid.for_each_mut(|v| *v = Scalar(rng.random_range(low..high)));
    grid
}

/// Write the z-slice of a scalar grid as an 8-bit grayscale PNG.
pub fn save_slice_png(grid: &Grid<Scalar>, z: i32, path: &str) -> anyhow::Result<()> {
    let width = grid.width() as u32;
    let height = grid.height() as u32;
    let mut image = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let value = grid.get(x as i32, y as i32, z).value().clamp(0.0, 1.0);
            image.put_pixel(x, y, image::Luma([(value * 255.0) as u8]));
        }
    }
    image
        .save(path)
        .with_context(|| format!("writing slice image {path}"))?;
    println!("wrote {path}");
    Ok(())
}
