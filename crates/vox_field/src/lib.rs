#![forbid(unsafe_code)]
//! vox_field: Dense voxel grid engine with kernel filtering, resampling,
//! region growing, and local contrast enhancement.
//!
//! Modules:
//! - voxel: value types stored on the lattice (scalar and 4-channel vector)
//! - grid: the dense 3D container, bounds, flood fill, resampling, persistence
//! - kernel: convolution stencils, shape generators, separable and generic filtering
//! - enhance: per-slice contrast-limited adaptive histogram equalization
//! - ops: normalization, band thresholding, spherical cut/crop
//!
//! For examples and docs, see README and docs.rs.
pub mod config;
pub mod enhance;
pub mod error;
pub mod grid;
pub mod kernel;
pub mod ops;
pub mod voxel;

/// Convenient re-exports for common types. Import with `use vox_field::prelude::*;`.
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::error::{Error, Result};
    pub use crate::grid::{Aabb, Grid, ResizeMode};
    pub use crate::kernel::{Axis, Kernel, Reduction, SeparableAxes, MAX_KERNEL_DIM};
    pub use crate::voxel::{Scalar, Vector, Voxel};
}
