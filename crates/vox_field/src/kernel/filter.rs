//! Convolution and morphological filtering.
//!
//! Separable kernels run three sequential 1D passes; everything else goes
//! through a generic gather-and-reduce loop whose reduction is one of a
//! closed set of strategies. Both paths confine themselves to the source's
//! active bounding box (the tightest box of non-zero voxels) and *skip*
//! taps that fall outside it: boundary taps are omitted from the reduction,
//! not zero-padded, not renormalized.
use tracing::debug;

use crate::grid::Grid;
use crate::kernel::Kernel;
use crate::voxel::Voxel;

/// Tolerance for re-verifying the separable cache before taking the fast
/// path.
const SEPARABLE_EPSILON: f32 = 1e-6;

/// Reduction strategy applied to the gathered taps of the generic path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reduction {
    /// Plain convolution: sum of the weighted taps.
    Sum,
    /// Erosion: smallest tap.
    Min,
    /// Dilation: largest tap.
    Max,
    /// Median filtering: middle tap by partial selection.
    Median,
}

impl<V: Voxel> Kernel<V> {
    /// Convolve `source` into `output`.
    ///
    /// Takes the separable three-pass path when the cache verifies within
    /// `1e-6`, otherwise falls back to the generic path with
    /// [`Reduction::Sum`].
    pub fn filter(&self, source: &Grid<V>, output: &mut Grid<V>) {
        if self.is_separable(SEPARABLE_EPSILON) {
            debug!("separable kernel, filtering in three 1D passes");
            self.filter_separable(source, output);
        } else {
            debug!("kernel is not separable, using generic convolution");
            self.filter_reduce(source, output, Reduction::Sum);
        }
    }

    /// Morphological erosion: [`Reduction::Min`] over the stencil.
    ///
    /// Always the generic path; min is not expressible as an outer-product
    /// convolution.
    pub fn erode(&self, source: &Grid<V>, output: &mut Grid<V>) {
        self.filter_reduce(source, output, Reduction::Min);
    }

    /// Morphological dilation: [`Reduction::Max`] over the stencil.
    pub fn dilate(&self, source: &Grid<V>, output: &mut Grid<V>) {
        self.filter_reduce(source, output, Reduction::Max);
    }

    /// Median filter over the stencil.
    pub fn median(&self, source: &Grid<V>, output: &mut Grid<V>) {
        self.filter_reduce(source, output, Reduction::Median);
    }

    fn filter_separable(&self, source: &Grid<V>, output: &mut Grid<V>) {
        let Some(axes) = self.separable_axes() else {
            return;
        };
        let bounds = source.bounds_where(|v| v != V::ZERO);
        let (cx, cy, cz) = self.center();
        let mut temp: Grid<V> = Grid::new(output.width(), output.height(), output.depth());

        // x direction: source -> output
        for z in bounds.z_min..bounds.z_max {
            for y in bounds.y_min..bounds.y_max {
                for x in bounds.x_min..bounds.x_max {
                    let mut value = V::ZERO;
                    for (i, weight) in axes.x.iter().enumerate() {
                        let sx = x + i as i32 - cx;
                        if sx < bounds.x_min || sx >= bounds.x_max {
                            continue;
                        }
                        value += *weight * source.get(sx, y, z);
                    }
                    output.set(x, y, z, value);
                }
            }
        }

        // y direction: output -> temp
        for z in bounds.z_min..bounds.z_max {
            for y in bounds.y_min..bounds.y_max {
                for x in bounds.x_min..bounds.x_max {
                    let mut value = V::ZERO;
                    for (i, weight) in axes.y.iter().enumerate() {
                        let sy = y + i as i32 - cy;
                        if sy < bounds.y_min || sy >= bounds.y_max {
                            continue;
                        }
                        value += *weight * output.get(x, sy, z);
                    }
                    temp.set(x, y, z, value);
                }
            }
        }

        // z direction: temp -> output
        for z in bounds.z_min..bounds.z_max {
            for y in bounds.y_min..bounds.y_max {
                for x in bounds.x_min..bounds.x_max {
                    let mut value = V::ZERO;
                    for (i, weight) in axes.z.iter().enumerate() {
                        let sz = z + i as i32 - cz;
                        if sz < bounds.z_min || sz >= bounds.z_max {
                            continue;
                        }
                        value += *weight * temp.get(x, y, sz);
                    }
                    output.set(x, y, z, value);
                }
            }
        }
    }

    /// Generic gather-and-reduce convolution.
    ///
    /// The destination scan is inclusive of the box maximum per axis, one
    /// layer beyond the half-open convention used elsewhere; writes landing
    /// out of bounds fall to `set`'s no-op.
    fn filter_reduce(&self, source: &Grid<V>, output: &mut Grid<V>, reduction: Reduction) {
        let bounds = source.bounds_where(|v| v != V::ZERO);
        if bounds.is_empty() {
            return;
        }

        let (cx, cy, cz) = self.center();
        let (ksx, ksy, ksz) = (
            self.cells().width() as i32,
            self.cells().height() as i32,
            self.cells().depth() as i32,
        );
        let mut taps: Vec<V> = Vec::with_capacity(self.cells().voxel_count());

        for dz in bounds.z_min..=bounds.z_max {
            for dy in bounds.y_min..=bounds.y_max {
                for dx in bounds.x_min..=bounds.x_max {
                    taps.clear();
                    for kz in 0..ksz {
                        let sz = dz + kz - cz;
                        if sz < bounds.z_min || sz >= bounds.z_max {
                            continue;
                        }
                        for ky in 0..ksy {
                            let sy = dy + ky - cy;
                            if sy < bounds.y_min || sy >= bounds.y_max {
                                continue;
                            }
                            for kx in 0..ksx {
                                let sx = dx + kx - cx;
                                if sx < bounds.x_min || sx >= bounds.x_max {
                                    continue;
                                }
                                taps.push(self.cells().get(kx, ky, kz) * source.get(sx, sy, sz));
                            }
                        }
                    }
                    output.set(dx, dy, dz, reduce(&mut taps, reduction));
                }
            }
        }
    }
}

fn reduce<V: Voxel>(taps: &mut [V], reduction: Reduction) -> V {
    if taps.is_empty() {
        return V::ZERO;
    }
    match reduction {
        Reduction::Sum => {
            let mut sum = V::ZERO;
            for tap in taps.iter() {
                sum += *tap;
            }
            sum
        }
        Reduction::Min => taps
            .iter()
            .copied()
            .reduce(|a, b| if b.sort_key() < a.sort_key() { b } else { a })
            .unwrap_or(V::ZERO),
        Reduction::Max => taps
            .iter()
            .copied()
            .reduce(|a, b| if b.sort_key() > a.sort_key() { b } else { a })
            .unwrap_or(V::ZERO),
        Reduction::Median => {
            let mid = taps.len() / 2;
            taps.select_nth_unstable_by(mid, |a, b| a.sort_key().total_cmp(&b.sort_key()));
            taps[mid]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Scalar;

    fn ones(size: usize) -> Grid<Scalar> {
        let mut grid: Grid<Scalar> = Grid::cube(size);
        grid.fill(Scalar(1.0));
        grid
    }

    #[test]
    fn separable_box_sums_taps_and_skips_outside_the_box() {
        let source = ones(4);
        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_box(Scalar(1.0));
        assert!(kernel.is_separable(1e-6));

        let mut output: Grid<Scalar> = Grid::cube(4);
        kernel.filter(&source, &mut output);

        // Fully surrounded: all 27 unit taps contribute.
        assert!(output.get(1, 1, 1).approx_eq(Scalar(27.0), 1e-4));
        assert!(output.get(2, 2, 2).approx_eq(Scalar(27.0), 1e-4));

        // Corner: 2 in-box taps per axis. Skipped taps are omitted, not
        // padded or renormalized.
        assert!(output.get(0, 0, 0).approx_eq(Scalar(8.0), 1e-4));

        // Face-adjacent edge: 2 * 3 * 3 taps.
        assert!(output.get(0, 1, 1).approx_eq(Scalar(18.0), 1e-4));
    }

    #[test]
    fn separable_filtering_is_linear() {
        let mut a: Grid<Scalar> = Grid::cube(4);
        let mut b: Grid<Scalar> = Grid::cube(4);
        let mut sum: Grid<Scalar> = Grid::cube(4);
        let mut value = 0.05;
        a.for_each_mut(|v| {
            *v = Scalar(value);
            value = (value + 0.07) % 0.9;
        });
        let mut value = 0.3;
        b.for_each_mut(|v| {
            *v = Scalar(value);
            value = (value + 0.11) % 0.8;
        });
        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    sum.set(x, y, z, a.get(x, y, z) + b.get(x, y, z));
                }
            }
        }

        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_box(Scalar(1.0));

        let mut fa: Grid<Scalar> = Grid::cube(4);
        let mut fb: Grid<Scalar> = Grid::cube(4);
        let mut fsum: Grid<Scalar> = Grid::cube(4);
        kernel.filter(&a, &mut fa);
        kernel.filter(&b, &mut fb);
        kernel.filter(&sum, &mut fsum);

        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    let lhs = fsum.get(x, y, z).value();
                    let rhs = fa.get(x, y, z).value() + fb.get(x, y, z).value();
                    assert!((lhs - rhs).abs() < 1e-4, "({x},{y},{z}): {lhs} vs {rhs}");
                }
            }
        }
    }

    #[test]
    fn erode_never_takes_the_separable_path() {
        let source = ones(4);
        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_box(Scalar(1.0));
        assert!(kernel.is_separable(1e-6));

        let mut output: Grid<Scalar> = Grid::cube(4);
        kernel.erode(&source, &mut output);

        // The separable sum at a corner would be 8; the min of the gathered
        // unit products is 1.
        assert_eq!(output.get(0, 0, 0), Scalar(1.0));
        assert_eq!(output.get(1, 1, 1), Scalar(1.0));
    }

    #[test]
    fn erode_spreads_a_hole() {
        let mut source = ones(5);
        source.set(2, 2, 2, Scalar::ZERO);

        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_box(Scalar(1.0));

        let mut output: Grid<Scalar> = Grid::cube(5);
        kernel.erode(&source, &mut output);

        assert_eq!(output.get(1, 2, 2), Scalar::ZERO);
        assert_eq!(output.get(2, 2, 2), Scalar::ZERO);
        assert_eq!(output.get(0, 0, 0), Scalar(1.0));
    }

    #[test]
    fn dilate_spreads_a_peak_along_the_stencil() {
        let mut source: Grid<Scalar> = Grid::cube(5);
        source.fill(Scalar(0.5));
        source.set(2, 2, 2, Scalar(1.0));

        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_cross(Scalar(1.0));

        let mut output: Grid<Scalar> = Grid::cube(5);
        kernel.dilate(&source, &mut output);

        // Face neighbors see the peak through the cross arms.
        assert_eq!(output.get(3, 2, 2), Scalar(1.0));
        assert_eq!(output.get(2, 1, 2), Scalar(1.0));
        // Diagonal neighbors do not.
        assert_eq!(output.get(3, 3, 2), Scalar(0.5));
    }

    #[test]
    fn median_suppresses_an_outlier() {
        let mut source: Grid<Scalar> = Grid::cube(3);
        source.fill(Scalar(0.5));
        source.set(1, 1, 1, Scalar(1.0));

        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_box(Scalar(1.0));

        let mut output: Grid<Scalar> = Grid::cube(3);
        kernel.median(&source, &mut output);

        assert_eq!(output.get(1, 1, 1), Scalar(0.5));
    }

    #[test]
    fn filtering_an_all_zero_source_leaves_the_output_untouched() {
        let source: Grid<Scalar> = Grid::cube(4);
        let mut kernel: Kernel<Scalar> = Kernel::cube(3).unwrap();
        kernel.fill_disk(Scalar(1.0));

        let mut output: Grid<Scalar> = Grid::cube(4);
        output.fill(Scalar(0.25));
        kernel.filter(&source, &mut output);

        output.for_each(|x, y, z| assert_eq!(output.get(x, y, z), Scalar(0.25)));
    }

    #[test]
    fn generic_convolution_matches_the_separable_result_for_a_box() {
        let mut source: Grid<Scalar> = Grid::cube(4);
        let mut value = 0.1;
        source.for_each_mut(|v| {
            *v = Scalar(value);
            value = (value + 0.13) % 1.0;
        });

        let mut cached: Kernel<Scalar> = Kernel::cube(3).unwrap();
        cached.fill_box(Scalar(1.0));
        let mut dense: Kernel<Scalar> = Kernel::cube(3).unwrap();
        dense.fill_values(&[Scalar(1.0); 27]).unwrap();

        let mut fast: Grid<Scalar> = Grid::cube(4);
        let mut slow: Grid<Scalar> = Grid::cube(4);
        cached.filter(&source, &mut fast);
        dense.filter(&source, &mut slow);

        for z in 0..4 {
            for y in 0..4 {
                for x in 0..4 {
                    let a = fast.get(x, y, z).value();
                    let b = slow.get(x, y, z).value();
                    assert!((a - b).abs() < 1e-4, "({x},{y},{z}): {a} vs {b}");
                }
            }
        }
    }
}
