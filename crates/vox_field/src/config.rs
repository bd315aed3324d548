//! Engine configuration.
//!
//! An [`EngineConfig`] is constructed once and passed in explicitly; there
//! is no process-wide mutable default for resolutions.
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::voxel::Voxel;

/// Resolutions for the working volume and its thumbnail preview.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Edge length of the cubic working volume, in voxels.
    pub resolution: usize,
    /// Edge length of the cubic thumbnail volume, in voxels.
    pub thumb_resolution: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolution: 512,
            thumb_resolution: 192,
        }
    }
}

impl EngineConfig {
    /// Creates a new [`EngineConfig`] with the specified volume resolution.
    pub fn new(resolution: usize) -> Self {
        Self {
            resolution,
            ..Default::default()
        }
    }

    /// Sets the working volume resolution.
    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Sets the thumbnail resolution.
    pub fn with_thumb_resolution(mut self, thumb_resolution: usize) -> Self {
        self.thumb_resolution = thumb_resolution;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(Error::InvalidConfig("resolution must be > 0".into()));
        }
        if self.thumb_resolution == 0 {
            return Err(Error::InvalidConfig("thumb_resolution must be > 0".into()));
        }
        if self.thumb_resolution > self.resolution {
            return Err(Error::InvalidConfig(
                "thumb_resolution must not exceed resolution".into(),
            ));
        }
        Ok(())
    }

    /// A zero-filled working volume at the configured resolution.
    pub fn volume<V: Voxel>(&self) -> Grid<V> {
        Grid::cube(self.resolution)
    }

    /// A zero-filled thumbnail volume at the configured resolution.
    pub fn thumbnail<V: Voxel>(&self) -> Grid<V> {
        Grid::cube(self.thumb_resolution)
    }
}
