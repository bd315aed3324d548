//! Stretch a low-contrast volume with per-slice CLAHE.
use vox_field::voxel::Scalar;
use vox_field_examples::{init_tracing, noise_volume, save_slice_png};

const SIZE: usize = 64;

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Compressed dynamic range with a dim horizontal ramp.
    let mut volume = noise_volume(SIZE, 7, 0.45, 0.55);
    for z in 0..SIZE as i32 {
        for y in 0..SIZE as i32 {
            for x in 0..SIZE as i32 {
                let ramp = 0.1 * x as f32 / SIZE as f32;
                let value = volume.get(x, y, z).value() + ramp;
                volume.set(x, y, z, Scalar(value));
            }
        }
    }
    let mid = (SIZE / 2) as i32;
    save_slice_png(&volume, mid, "clahe-input.png")?;

    volume.clahe(64, 17, 3.0)?;
    save_slice_png(&volume, mid, "clahe-output.png")?;

    Ok(())
}
