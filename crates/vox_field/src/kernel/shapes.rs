//! Shape generators populating a kernel's stencil cells.
//!
//! Each generator first clears any separable cache, then writes the cells.
//! Box, edge-detect and Gauss shapes factor into per-axis vectors and
//! (re)build the cache; the remaining shapes are inherently non-separable.
use crate::error::{Error, Result};
use crate::kernel::{Kernel, SeparableAxes};
use crate::voxel::Voxel;

/// Grid axis, used to pick the engaged direction of an edge-detect kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    X,
    Y,
    Z,
}

const SQRT_2_PI_INV: f64 = 0.398_942_280_401_432_677_939_946_059_935;

/// 1D Gaussian or one of its derivatives.
///
/// `order` 0/1/2 selects the function, first or second derivative; -1 is
/// the neutral axis (constant 1); anything else evaluates to 0.
fn gauss(x: f64, sigma: f64, order: i32) -> f64 {
    let t = x / sigma;
    match order {
        -1 => 1.0,
        0 => SQRT_2_PI_INV * (-0.5 * t * t).exp() / sigma,
        1 => -x * SQRT_2_PI_INV * (-0.5 * t * t).exp() / (sigma * sigma * sigma),
        2 => {
            (x * x - sigma * sigma) * SQRT_2_PI_INV * (-0.5 * t * t).exp()
                / (sigma * sigma * sigma * sigma * sigma)
        }
        _ => 0.0,
    }
}

/// Per-axis edge-detect tap: sign of the offset from the center on the
/// engaged axis, neutral 1 elsewhere.
fn edge_tap(i: i32, center: i32, engaged: bool) -> f32 {
    if !engaged {
        return 1.0;
    }
    if i > center {
        1.0
    } else if i < center {
        -1.0
    } else {
        0.0
    }
}

impl<V: Voxel> Kernel<V> {
    /// Uniform fill; separable as the outer product of three constant
    /// cube-root vectors.
    pub fn fill_box(&mut self, value: V) -> &mut Self {
        self.clear_separable();
        self.cells_mut().fill(value);

        let factor = value.cbrt();
        let (sx, sy, sz) = self.dims();
        self.set_separable(SeparableAxes {
            x: vec![factor; sx],
            y: vec![factor; sy],
            z: vec![factor; sz],
        });
        self
    }

    /// Ellipsoid stencil: `sum((d / (size/2))^2) < 1` relative to the center.
    /// Non-separable.
    pub fn fill_disk(&mut self, value: V) -> &mut Self {
        self.clear_separable();
        let (sx, sy, sz) = self.dims();
        let (cx, cy, cz) = self.center();
        let rx = (sx * sx) as f64 / 4.0;
        let ry = (sy * sy) as f64 / 4.0;
        let rz = (sz * sz) as f64 / 4.0;

        for z in 0..sz as i32 {
            for y in 0..sy as i32 {
                for x in 0..sx as i32 {
                    let dx = (x - cx) as f64;
                    let dy = (y - cy) as f64;
                    let dz = (z - cz) as f64;
                    if dx * dx / rx + dy * dy / ry + dz * dz / rz < 1.0 {
                        self.cells_mut().set(x, y, z, value);
                    }
                }
            }
        }
        self
    }

    /// The three axis lines through the center, excluding the center point
    /// itself. Non-separable.
    pub fn fill_cross(&mut self, value: V) -> &mut Self {
        self.clear_separable();
        let (sx, sy, sz) = self.dims();
        let (cx, cy, cz) = self.center();

        for z in 0..sz as i32 {
            for y in 0..sy as i32 {
                for x in 0..sx as i32 {
                    let on_center = (x == cx) as u32 + (y == cy) as u32 + (z == cz) as u32;
                    if on_center == 2 {
                        self.cells_mut().set(x, y, z, value);
                    }
                }
            }
        }
        self
    }

    /// L1 ball: `sum(|d| / (size/2)) < 1`. Non-separable.
    pub fn fill_diamond(&mut self, value: V) -> &mut Self {
        self.clear_separable();
        let (sx, sy, sz) = self.dims();
        let (cx, cy, cz) = self.center();
        let rx = sx as f64 / 2.0;
        let ry = sy as f64 / 2.0;
        let rz = sz as f64 / 2.0;

        for z in 0..sz as i32 {
            for y in 0..sy as i32 {
                for x in 0..sx as i32 {
                    let dx = (x - cx).abs() as f64;
                    let dy = (y - cy).abs() as f64;
                    let dz = (z - cz).abs() as f64;
                    if dx / rx + dy / ry + dz / rz < 1.0 {
                        self.cells_mut().set(x, y, z, value);
                    }
                }
            }
        }
        self
    }

    /// The main diagonal `x == y == z`. Non-separable.
    pub fn fill_identity(&mut self, value: V) -> &mut Self {
        self.clear_separable();
        let (sx, sy, sz) = self.dims();

        for z in 0..sz as i32 {
            for y in 0..sy as i32 {
                for x in 0..sx as i32 {
                    if x == y && y == z {
                        self.cells_mut().set(x, y, z, value);
                    }
                }
            }
        }
        self
    }

    /// Signed edge-detect stencil along `direction`: taps are -1 below the
    /// center, +1 above, 0 at it; the other axes contribute a neutral 1.
    /// Builds the separable cache directly, then materializes the dense
    /// product.
    pub fn fill_edge_detect(&mut self, direction: Axis) -> &mut Self {
        self.clear_separable();
        let (sx, sy, sz) = self.dims();
        let (cx, cy, cz) = self.center();

        let axes = SeparableAxes {
            x: (0..sx as i32)
                .map(|i| V::splat(edge_tap(i, cx, direction == Axis::X)))
                .collect(),
            y: (0..sy as i32)
                .map(|i| V::splat(edge_tap(i, cy, direction == Axis::Y)))
                .collect(),
            z: (0..sz as i32)
                .map(|i| V::splat(edge_tap(i, cz, direction == Axis::Z)))
                .collect(),
        };
        self.materialize(&axes);
        self.set_separable(axes);
        self
    }

    /// Gaussian (or Gaussian-derivative) stencil with the separable cache
    /// retained.
    ///
    /// `order_*` picks the derivative per axis: 0 for the Gaussian itself,
    /// 1 or 2 for its derivatives, -1 for a neutral axis.
    pub fn fill_gauss(&mut self, sigma: f64, order_x: i32, order_y: i32, order_z: i32) -> &mut Self {
        let axes = self.gauss_axes(sigma, order_x, order_y, order_z);
        self.clear_separable();
        self.materialize(&axes);
        self.set_separable(axes);
        self
    }

    /// Gaussian stencil stored dense only; the caller opts out of the
    /// separable filtering path.
    pub fn fill_gauss_dense(
        &mut self,
        sigma: f64,
        order_x: i32,
        order_y: i32,
        order_z: i32,
    ) -> &mut Self {
        let axes = self.gauss_axes(sigma, order_x, order_y, order_z);
        self.clear_separable();
        self.materialize(&axes);
        self
    }

    /// Caller-supplied dense stencil in canonical row-major order
    /// (x fastest). Non-separable.
    ///
    /// Fails with a configuration error unless `values` holds exactly one
    /// entry per cell.
    pub fn fill_values(&mut self, values: &[V]) -> Result<&mut Self> {
        let count = self.cells().voxel_count();
        if values.len() != count {
            return Err(Error::InvalidConfig(format!(
                "kernel expects {count} cell values, got {}",
                values.len()
            )));
        }

        self.clear_separable();
        let mut next = values.iter().copied();
        self.cells_mut().for_each_mut(|cell| {
            // Length was checked above.
            if let Some(value) = next.next() {
                *cell = value;
            }
        });
        Ok(self)
    }

    fn gauss_axes(&self, sigma: f64, order_x: i32, order_y: i32, order_z: i32) -> SeparableAxes<V> {
        let (cx, cy, cz) = self.center();
        let (sx, sy, sz) = self.dims();
        SeparableAxes {
            x: (0..sx as i32)
                .map(|i| V::splat(gauss(-((i - cx) as f64), sigma, order_x) as f32))
                .collect(),
            y: (0..sy as i32)
                .map(|i| V::splat(gauss(-((i - cy) as f64), sigma, order_y) as f32))
                .collect(),
            z: (0..sz as i32)
                .map(|i| V::splat(gauss(-((i - cz) as f64), sigma, order_z) as f32))
                .collect(),
        }
    }

    /// Write the dense outer product of `axes` into the cells.
    fn materialize(&mut self, axes: &SeparableAxes<V>) {
        let (sx, sy, sz) = self.dims();
        for z in 0..sz {
            let fz = axes.z[z];
            for y in 0..sy {
                let fy = axes.y[y];
                for x in 0..sx {
                    let fx = axes.x[x];
                    self.cells_mut().set(x as i32, y as i32, z as i32, fx * fy * fz);
                }
            }
        }
    }

    #[inline]
    fn dims(&self) -> (usize, usize, usize) {
        (
            self.cells().width(),
            self.cells().height(),
            self.cells().depth(),
        )
    }
}
