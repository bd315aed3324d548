//! Whole-grid value operations: normalization, band thresholding, and
//! spherical cut/crop.
use glam::Vec3;

use crate::grid::Grid;
use crate::voxel::{Scalar, Voxel};

impl Grid<Scalar> {
    /// Rescale every value linearly so the observed minimum maps to 0 and
    /// the maximum to 1. A degenerate value range leaves the grid untouched.
    pub fn normalize(&mut self) {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        self.for_each_mut(|v| {
            min = min.min(v.value());
            max = max.max(v.value());
        });

        let range = max - min;
        if range <= f32::EPSILON {
            return;
        }
        self.for_each_mut(|v| *v = Scalar((v.value() - min) / range));
    }

    /// Zero voxels outside a value band, optionally rescaling the kept band.
    ///
    /// With `min < max` the band `[min, max]` is kept and everything else is
    /// zeroed; `normalize` rescales the kept band to `[0, 1]`. With
    /// `min >= max` the roles invert: values strictly inside `(max, min)`
    /// are zeroed and `normalize` compacts the surviving outer ranges
    /// together.
    pub fn threshold(&mut self, min: f32, max: f32, normalize: bool) {
        if min < max {
            self.for_each_mut(|v| {
                let value = v.value();
                if value < min || value > max {
                    *v = Scalar::ZERO;
                } else if normalize {
                    *v = Scalar((value - min) / (max - min));
                }
            });
        } else {
            self.for_each_mut(|v| {
                let value = v.value();
                if value < min && value > max {
                    *v = Scalar::ZERO;
                } else if normalize {
                    let mut value = value;
                    if value > min {
                        value -= min - max;
                    }
                    *v = Scalar(value / (1.0 - (min - max)));
                }
            });
        }
    }
}

impl<V: Voxel> Grid<V> {
    /// Zero voxels inside (`crop = false`) or outside (`crop = true`) a
    /// sphere.
    ///
    /// `center` is in normalized volume coordinates (each component scaled
    /// by its own axis length); `radius` is a fraction of the grid depth.
    pub fn cut_sphere(&mut self, center: Vec3, radius: f32, crop: bool) {
        let scale = Vec3::new(
            self.width() as f32,
            self.height() as f32,
            self.depth() as f32,
        );
        let cut = center * scale;
        let r = radius * self.depth() as f32;

        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    let p = Vec3::new(x as f32, y as f32, z as f32);
                    if crop == ((p - cut).length() >= r) {
                        self.set(x, y, z, V::ZERO);
                    }
                }
            }
        }
    }
}
