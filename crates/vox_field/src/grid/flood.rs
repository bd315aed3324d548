//! Bounded flood fill over the grid.
use glam::IVec3;

use crate::grid::Grid;
use crate::voxel::Voxel;

/// Relative 6-connected (face) neighbor offsets.
const NEIGHBORS: [IVec3; 6] = [
    IVec3::new(0, 0, 1),
    IVec3::new(0, 1, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(0, 0, -1),
    IVec3::new(0, -1, 0),
    IVec3::new(-1, 0, 0),
];

impl<V: Voxel> Grid<V> {
    /// Grow a 6-connected region from the seed `(x, y, z)`, overwriting it
    /// with `fill`.
    ///
    /// A neighbor joins the region iff it is in bounds, does not already
    /// equal `fill` (tolerance 0), lies within `threshold` of the value of
    /// the voxel most recently popped from the stack (not the seed value,
    /// so the effective tolerance drifts across gradients), and its squared
    /// Euclidean distance from the seed is strictly below `max_radius^2`.
    /// Every popped voxel is set to `fill` immediately.
    ///
    /// Uses an explicit stack rather than recursion so memory stays bounded
    /// on large grids.
    pub fn flood_fill(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        max_radius: i32,
        threshold: f32,
        fill: V,
    ) {
        let seed = IVec3::new(x, y, z);
        if self.position_is_outside(seed) {
            return;
        }
        if self.get(x, y, z).approx_eq(fill, 0.0) {
            return;
        }

        let max_squared = max_radius * max_radius;
        let mut stack = vec![seed];

        while let Some(at) = stack.pop() {
            let current = self.get(at.x, at.y, at.z);
            self.set(at.x, at.y, at.z, fill);

            for offset in NEIGHBORS {
                let next = at + offset;
                if self.position_is_outside(next) {
                    continue;
                }
                let value = self.get(next.x, next.y, next.z);
                if value.approx_eq(fill, 0.0) {
                    continue;
                }
                if !value.approx_eq(current, threshold) {
                    continue;
                }
                let delta = next - seed;
                if delta.length_squared() < max_squared {
                    stack.push(next);
                }
            }
        }
    }

    #[inline]
    fn position_is_outside(&self, p: IVec3) -> bool {
        p.x < 0
            || p.x as usize >= self.width()
            || p.y < 0
            || p.y as usize >= self.height()
            || p.z < 0
            || p.z as usize >= self.depth()
    }
}
