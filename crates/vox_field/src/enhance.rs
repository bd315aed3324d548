//! Contrast-limited adaptive histogram equalization.
//!
//! Applied independently per z-slice; true 3D equalization is not
//! implemented. Each slice is equalized against a sliding square window
//! whose histogram is updated incrementally: as the window's x-position
//! advances, the column leaving the window is subtracted and the column
//! entering it is added, with the vertical extent clipped to the slice and
//! the live cell count tracked as the window area.
use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::voxel::Scalar;

impl Grid<Scalar> {
    /// Equalize every z-slice in place.
    ///
    /// For each output pixel the window histogram is clipped at
    /// `clip_limit * area / bins` per bin, the clipped-off mass is spread
    /// uniformly across all bins, and the pixel becomes the CDF up to its
    /// own bin (plus the spread term) divided by the window area.
    ///
    /// Reads a snapshot of the grid, so in-progress writes never
    /// contaminate the sliding histogram of later columns.
    pub fn clahe(&mut self, bins: usize, window_size: usize, clip_limit: f32) -> Result<()> {
        if bins == 0 {
            return Err(Error::InvalidConfig("clahe bins must be >= 1".into()));
        }
        if window_size == 0 {
            return Err(Error::InvalidConfig(
                "clahe window size must be >= 1".into(),
            ));
        }
        if clip_limit <= 0.0 {
            return Err(Error::InvalidConfig(
                "clahe clip limit must be positive".into(),
            ));
        }

        let radius = ((window_size - 1) / 2) as i32;
        let src = self.clone();
        let width = src.width() as i32;
        let height = src.height() as i32;
        let slices = src.depth() as i32;
        debug!("clahe over {slices} slices (bins: {bins}, radius: {radius})");

        // One extra bucket so a value of exactly 1.0 lands past the last
        // regular bin; it counts towards the area but is excluded from
        // clipping and the CDF.
        let mut histogram = vec![0i32; bins + 1];
        let mut clipped = vec![0i32; bins + 1];

        for z in 0..slices {
            let mut area = 0i32;
            histogram.fill(0);

            for y in 0..height {
                let y_min = (y - radius).max(0);
                let y_max = (y + radius + 1).min(height);

                for x in -radius..width + radius {
                    // Remove the column leaving the window on the left.
                    let leaving = x - radius;
                    if leaving >= 0 {
                        for yy in y_min..y_max {
                            histogram[bin_index(bins, src.get(leaving, yy, z))] -= 1;
                        }
                        area -= y_max - y_min;
                    }

                    // Add the column entering on the right.
                    let entering = x + radius;
                    if entering < width {
                        for yy in y_min..y_max {
                            histogram[bin_index(bins, src.get(entering, yy, z))] += 1;
                        }
                        area += y_max - y_min;
                    }

                    if x < 0 || x >= width {
                        continue;
                    }

                    let own_bin = bin_index(bins, src.get(x, y, z));
                    clipped.copy_from_slice(&histogram);

                    let limit = (clip_limit * area as f32 / bins as f32) as i32;
                    let mut excess = 0.0f32;
                    for bucket in clipped.iter_mut().take(bins) {
                        let over = *bucket - limit;
                        if over > 0 {
                            excess += over as f32;
                            *bucket = limit;
                        }
                    }

                    let spread = excess / bins as f32;
                    let mut cdf = 0.0f32;
                    for bucket in clipped.iter().take(own_bin) {
                        cdf += *bucket as f32 + spread;
                    }

                    self.set(x, y, z, Scalar(cdf / area as f32));
                }
            }
        }
        Ok(())
    }
}

/// Histogram bucket of a value, saturating into `[0, bins]`.
#[inline]
fn bin_index(bins: usize, value: Scalar) -> usize {
    ((bins as f32 * value.value()) as usize).min(bins)
}
