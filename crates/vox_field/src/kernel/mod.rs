//! Convolution kernels: a small grid interpreted as a stencil.
//!
//! A [`Kernel`] owns a [`Grid`] of weights plus an explicit center offset
//! (not necessarily the geometric center) and, for shapes that factor into
//! an outer product of three 1D vectors, a separable cache that unlocks the
//! fast three-pass filtering path.
//!
//! Lifecycle: construct with a size (and optionally a center), populate with
//! exactly one shape generator, then hand to the filter operations
//! read-only. Every non-separable generator clears the cache.
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::voxel::Voxel;

pub mod filter;
pub mod shapes;

pub use filter::Reduction;
pub use shapes::Axis;

/// Upper bound on any kernel axis; shape generators run on fixed-capacity
/// scratch of this many elements per axis.
pub const MAX_KERNEL_DIM: usize = 1024;

/// Per-axis factor vectors of a separable kernel: for every cell,
/// `value(x, y, z) ~= x_axis[x] * y_axis[y] * z_axis[z]`.
#[derive(Clone, Debug)]
pub struct SeparableAxes<V> {
    pub x: Vec<V>,
    pub y: Vec<V>,
    pub z: Vec<V>,
}

/// A convolution stencil with an explicit center.
#[derive(Clone, Debug)]
pub struct Kernel<V> {
    cells: Grid<V>,
    cx: i32,
    cy: i32,
    cz: i32,
    separable: Option<SeparableAxes<V>>,
}

impl<V: Voxel> Kernel<V> {
    /// Create a kernel centered at `size/2` per axis.
    ///
    /// Fails with a configuration error when any axis exceeds
    /// [`MAX_KERNEL_DIM`].
    pub fn new(sx: usize, sy: usize, sz: usize) -> Result<Self> {
        Self::with_center(sx, sy, sz, (sx / 2) as i32, (sy / 2) as i32, (sz / 2) as i32)
    }

    /// Create a cubic kernel centered at `size/2`.
    pub fn cube(size: usize) -> Result<Self> {
        Self::new(size, size, size)
    }

    /// Create a kernel with an explicit center offset.
    pub fn with_center(sx: usize, sy: usize, sz: usize, cx: i32, cy: i32, cz: i32) -> Result<Self> {
        if sx > MAX_KERNEL_DIM || sy > MAX_KERNEL_DIM || sz > MAX_KERNEL_DIM {
            return Err(Error::InvalidConfig(format!(
                "kernel axis {}x{}x{} exceeds the {MAX_KERNEL_DIM} element scratch capacity",
                sx, sy, sz
            )));
        }
        Ok(Self {
            cells: Grid::new(sx, sy, sz),
            cx,
            cy,
            cz,
            separable: None,
        })
    }

    /// The stencil cells.
    #[inline]
    pub fn cells(&self) -> &Grid<V> {
        &self.cells
    }

    /// The center offset `(cx, cy, cz)`.
    #[inline]
    pub fn center(&self) -> (i32, i32, i32) {
        (self.cx, self.cy, self.cz)
    }

    /// The cached per-axis factor vectors, if a separable generator
    /// populated this kernel.
    #[inline]
    pub fn separable_axes(&self) -> Option<&SeparableAxes<V>> {
        self.separable.as_ref()
    }

    /// Whether the cells really factor into the cached outer product,
    /// re-verified cell by cell within `epsilon`.
    ///
    /// The cache flag alone is never trusted; this check gates the fast
    /// three-pass filtering path.
    pub fn is_separable(&self, epsilon: f32) -> bool {
        let Some(axes) = &self.separable else {
            return false;
        };
        for z in 0..self.cells.depth() {
            let fz = axes.z[z];
            for y in 0..self.cells.height() {
                let fy = axes.y[y];
                for x in 0..self.cells.width() {
                    let fx = axes.x[x];
                    let cell = self.cells.get(x as i32, y as i32, z as i32);
                    if !cell.approx_eq(fx * fy * fz, epsilon) {
                        return false;
                    }
                }
            }
        }
        true
    }

    pub(crate) fn clear_separable(&mut self) {
        self.separable = None;
    }

    pub(crate) fn set_separable(&mut self, axes: SeparableAxes<V>) {
        self.separable = Some(axes);
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Grid<V> {
        &mut self.cells
    }
}
