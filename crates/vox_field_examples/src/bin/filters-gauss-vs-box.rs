//! Blur a noisy sphere with a separable Gauss kernel and a generic box
//! stencil, dumping the center slice of each result.
use vox_field::grid::Grid;
use vox_field::kernel::Kernel;
use vox_field::voxel::Scalar;
use vox_field_examples::{init_tracing, save_slice_png, sphere_volume};

const SIZE: usize = 64;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut source = sphere_volume(SIZE, 0.35, 1.0);
    // Salt the sphere with structured speckle so the blurs have texture to
    // remove.
    let mut flip = false;
    source.for_each_mut(|v| {
        if flip && v.value() > 0.0 {
            *v = Scalar(v.value() * 0.6);
        }
        flip = !flip;
    });
    let mid = (SIZE / 2) as i32;
    save_slice_png(&source, mid, "filters-input.png")?;

    // Separable Gaussian: three 1D passes.
    let mut gauss: Kernel<Scalar> = Kernel::cube(7)?;
    gauss.fill_gauss(1.5, 0, 0, 0);
    let mut blurred: Grid<Scalar> = Grid::cube(SIZE);
    gauss.filter(&source, &mut blurred);
    save_slice_png(&blurred, mid, "filters-gauss.png")?;

    // Dense box stencil through the generic path, normalized by its cell
    // count so the output stays in range.
    let mut bx: Kernel<Scalar> = Kernel::cube(5)?;
    bx.fill_values(&vec![Scalar(1.0 / 125.0); 125])?;
    let mut boxed: Grid<Scalar> = Grid::cube(SIZE);
    bx.filter(&source, &mut boxed);
    save_slice_png(&boxed, mid, "filters-box.png")?;

    Ok(())
}
