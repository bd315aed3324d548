//! Grid resampling with fixed-point stepping and mip pre-reduction.
use tracing::debug;

use crate::grid::Grid;
use crate::voxel::Voxel;

/// Resampling strategy for [`Grid::resize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResizeMode {
    /// Pick the source cell under the midpoint of each destination cell.
    Nearest,
    /// Corner-anchored trilinear interpolation, preceded by 2-tap box-filter
    /// halving of any axis decimated by more than 2x.
    Trilinear,
}

/// 16.16 fixed-point step above which an axis is mip-halved before
/// trilinear sampling (a 2x decimation ratio).
const MIP_STEP: u64 = 0x20000;

const FRACTION_MASK: u64 = 0xffff;
const FRACTION_SCALE: f32 = 65536.0;

impl<V: Voxel> Grid<V> {
    /// Populate `dst` by resampling this grid.
    ///
    /// Stepping runs in 16.16 fixed point. Nearest mode anchors steps at the
    /// cell midpoint (`step = (src << 16) / dst`); trilinear mode anchors so
    /// corner voxels align (`step = ((src - 1) << 16) / dst`) and reads the
    /// eight surrounding samples through three sequential mix rounds along
    /// z, then y, then x.
    pub fn resize(&self, dst: &mut Grid<V>, mode: ResizeMode) {
        if dst.is_empty() {
            return;
        }
        match mode {
            ResizeMode::Nearest => self.resize_nearest(dst),
            ResizeMode::Trilinear => self.resize_trilinear(dst),
        }
    }

    fn resize_nearest(&self, dst: &mut Grid<V>) {
        let dx = ((self.width() as u64) << 16) / dst.width() as u64;
        let dy = ((self.height() as u64) << 16) / dst.height() as u64;
        let dz = ((self.depth() as u64) << 16) / dst.depth() as u64;

        let mut sz = dz / 2;
        for z in 0..dst.depth() as i32 {
            let mut sy = dy / 2;
            for y in 0..dst.height() as i32 {
                let mut sx = dx / 2;
                for x in 0..dst.width() as i32 {
                    dst.set(
                        x,
                        y,
                        z,
                        self.get((sx >> 16) as i32, (sy >> 16) as i32, (sz >> 16) as i32),
                    );
                    sx += dx;
                }
                sy += dy;
            }
            sz += dz;
        }
    }

    fn resize_trilinear(&self, dst: &mut Grid<V>) {
        let mut dx = ((self.width().saturating_sub(1) as u64) << 16) / dst.width() as u64;
        let mut dy = ((self.height().saturating_sub(1) as u64) << 16) / dst.height() as u64;
        let mut dz = ((self.depth().saturating_sub(1) as u64) << 16) / dst.depth() as u64;

        // Decimating by more than 2x would skip source voxels entirely, so
        // halve the offending axes of a temporary copy until the remaining
        // ratio is interpolatable.
        let mip = if dx > MIP_STEP || dy > MIP_STEP || dz > MIP_STEP {
            debug!(
                "mip reducing {}x{}x{} source before trilinear resize",
                self.width(),
                self.height(),
                self.depth()
            );
            let mut mip = self.clone();
            while dx > MIP_STEP {
                mip.halve_x();
                dx >>= 1;
            }
            while dy > MIP_STEP {
                mip.halve_y();
                dy >>= 1;
            }
            while dz > MIP_STEP {
                mip.halve_z();
                dz >>= 1;
            }
            Some(mip)
        } else {
            None
        };
        let src = mip.as_ref().unwrap_or(self);

        let mut sz = dz / 2;
        for z in 0..dst.depth() as i32 {
            let hz = (sz >> 16) as i32;
            let lz = (sz & FRACTION_MASK) as f32 / FRACTION_SCALE;
            let mut sy = dy / 2;
            for y in 0..dst.height() as i32 {
                let hy = (sy >> 16) as i32;
                let ly = (sy & FRACTION_MASK) as f32 / FRACTION_SCALE;
                let mut sx = dx / 2;
                for x in 0..dst.width() as i32 {
                    let hx = (sx >> 16) as i32;
                    let lx = (sx & FRACTION_MASK) as f32 / FRACTION_SCALE;

                    let mut x0y0z0 = src.get(hx, hy, hz);
                    let x0y0z1 = src.get(hx, hy, hz + 1);
                    let mut x0y1z0 = src.get(hx, hy + 1, hz);
                    let x0y1z1 = src.get(hx, hy + 1, hz + 1);
                    let mut x1y0z0 = src.get(hx + 1, hy, hz);
                    let x1y0z1 = src.get(hx + 1, hy, hz + 1);
                    let mut x1y1z0 = src.get(hx + 1, hy + 1, hz);
                    let x1y1z1 = src.get(hx + 1, hy + 1, hz + 1);

                    x0y0z0.mix(x0y0z1, lz);
                    x0y1z0.mix(x0y1z1, lz);
                    x1y0z0.mix(x1y0z1, lz);
                    x1y1z0.mix(x1y1z1, lz);

                    x0y0z0.mix(x0y1z0, ly);
                    x1y0z0.mix(x1y1z0, ly);

                    x0y0z0.mix(x1y0z0, lx);

                    dst.set(x, y, z, x0y0z0);
                    sx += dx;
                }
                sy += dy;
            }
            sz += dz;
        }
    }

    /// One 2-tap box-filter halving pass along x, in place. Cells past the
    /// halved extent go stale; callers confine sampling to the reduced
    /// region via the halved step.
    fn halve_x(&mut self) {
        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    let mut a = self.get(x * 2, y, z);
                    let b = self.get(x * 2 + 1, y, z);
                    a.mix(b, 0.5);
                    self.set(x, y, z, a);
                }
            }
        }
    }

    fn halve_y(&mut self) {
        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    let mut a = self.get(x, y * 2, z);
                    let b = self.get(x, y * 2 + 1, z);
                    a.mix(b, 0.5);
                    self.set(x, y, z, a);
                }
            }
        }
    }

    fn halve_z(&mut self) {
        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    let mut a = self.get(x, y, z * 2);
                    let b = self.get(x, y, z * 2 + 1);
                    a.mix(b, 0.5);
                    self.set(x, y, z, a);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::Scalar;

    #[test]
    fn nearest_with_equal_dims_is_the_identity() {
        let mut src: Grid<Scalar> = Grid::new(4, 4, 4);
        let mut value = 0.0;
        src.for_each_mut(|v| {
            *v = Scalar(value);
            value += 1.0 / 64.0;
        });

        let mut dst: Grid<Scalar> = Grid::new(4, 4, 4);
        src.resize(&mut dst, ResizeMode::Nearest);

        src.for_each(|x, y, z| assert_eq!(dst.get(x, y, z), src.get(x, y, z)));
    }

    #[test]
    fn nearest_downsampling_picks_midpoint_cells() {
        let mut src: Grid<Scalar> = Grid::new(4, 1, 1);
        for x in 0..4 {
            src.set(x, 0, 0, Scalar(x as f32));
        }

        let mut dst: Grid<Scalar> = Grid::new(2, 1, 1);
        src.resize(&mut dst, ResizeMode::Nearest);

        assert_eq!(dst.get(0, 0, 0), Scalar(1.0));
        assert_eq!(dst.get(1, 0, 0), Scalar(3.0));
    }

    #[test]
    fn trilinear_down_then_up_preserves_a_constant_fill() {
        let mut src: Grid<Scalar> = Grid::new(8, 8, 8);
        src.fill(Scalar(0.6));

        let mut small: Grid<Scalar> = Grid::new(4, 4, 4);
        src.resize(&mut small, ResizeMode::Trilinear);

        let mut back: Grid<Scalar> = Grid::new(8, 8, 8);
        small.resize(&mut back, ResizeMode::Trilinear);

        back.for_each(|x, y, z| {
            assert!(
                back.get(x, y, z).approx_eq(Scalar(0.6), 1e-4),
                "({x},{y},{z}) = {:?}",
                back.get(x, y, z)
            );
        });
    }

    #[test]
    fn mip_reduced_down_then_up_preserves_a_constant_fill() {
        // 16 -> 2 is an 8x decimation; the x/y/z steps all exceed 0x20000 and
        // force two halving passes per axis.
        let mut src: Grid<Scalar> = Grid::new(16, 16, 16);
        src.fill(Scalar(0.4));

        let mut small: Grid<Scalar> = Grid::new(2, 2, 2);
        src.resize(&mut small, ResizeMode::Trilinear);

        let mut back: Grid<Scalar> = Grid::new(16, 16, 16);
        small.resize(&mut back, ResizeMode::Trilinear);

        back.for_each(|x, y, z| {
            assert!(
                back.get(x, y, z).approx_eq(Scalar(0.4), 1e-4),
                "({x},{y},{z}) = {:?}",
                back.get(x, y, z)
            );
        });
    }

    #[test]
    fn trilinear_upsampling_interpolates_between_samples() {
        let mut src: Grid<Scalar> = Grid::new(2, 1, 1);
        src.set(0, 0, 0, Scalar(0.0));
        src.set(1, 0, 0, Scalar(1.0));

        let mut dst: Grid<Scalar> = Grid::new(4, 1, 1);
        src.resize(&mut dst, ResizeMode::Trilinear);

        // step = (1 << 16) / 4; samples at fractions 1/8, 3/8, 5/8, 7/8.
        let expected = [0.125, 0.375, 0.625, 0.875];
        for (x, want) in expected.iter().enumerate() {
            let got = dst.get(x as i32, 0, 0);
            assert!(
                got.approx_eq(Scalar(*want), 1e-3),
                "x={x}: {got:?} != {want}"
            );
        }
    }

    #[test]
    fn resize_into_an_empty_grid_is_a_no_op() {
        let src: Grid<Scalar> = Grid::cube(4);
        let mut dst: Grid<Scalar> = Grid::new(0, 4, 4);
        src.resize(&mut dst, ResizeMode::Trilinear);
        assert_eq!(dst.voxel_count(), 0);
    }
}
