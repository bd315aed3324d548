//! Binary persistence for grids.
//!
//! Little-endian layout:
//!
//! ```text
//! u16 width | u16 height | u16 depth | u64 stored_count
//! stored_count < width*height*depth:
//!     stored_count x u64 linear index, then stored_count x voxel payload
//! otherwise:
//!     width*height*depth x voxel payload (row-major, x fastest)
//! ```
//!
//! The voxel payload width is defined per voxel type; the scalar payload is
//! exactly one byte.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::info;

use crate::error::{Error, Result};
use crate::grid::{Grid, ResizeMode};
use crate::voxel::Voxel;

/// Largest dimension the u16 header can carry.
const MAX_FILE_DIM: usize = u16::MAX as usize;

impl<V: Voxel> Grid<V> {
    /// Write every voxel in the dense layout.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        self.write_header(&mut out, self.voxel_count() as u64)?;

        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    self.get(x, y, z).write_to(&mut out)?;
                }
            }
        }
        out.flush()?;
        info!(
            "saved {}x{}x{} volume ({} voxels, dense)",
            self.width(),
            self.height(),
            self.depth(),
            self.voxel_count()
        );
        Ok(())
    }

    /// Write only the voxels satisfying `accept`, as explicit
    /// (index, payload) pairs.
    ///
    /// `accept` must be a pure function of the voxel value.
    pub fn save_sparse<P, F>(&self, path: P, accept: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: Fn(V) -> bool,
    {
        let mut positions = Vec::new();
        for z in 0..self.depth() as i32 {
            for y in 0..self.height() as i32 {
                for x in 0..self.width() as i32 {
                    if accept(self.get(x, y, z)) {
                        let pos = x as u64
                            + self.width() as u64 * (y as u64 + self.height() as u64 * z as u64);
                        positions.push(pos);
                    }
                }
            }
        }

        let mut out = BufWriter::new(File::create(path.as_ref())?);
        self.write_header(&mut out, positions.len() as u64)?;
        for &pos in &positions {
            out.write_u64::<LittleEndian>(pos)?;
        }
        for &pos in &positions {
            let (x, y, z) = self.decompose(pos);
            self.get(x, y, z).write_to(&mut out)?;
        }
        out.flush()?;
        info!(
            "saved {}x{}x{} volume ({} of {} voxels, sparse)",
            self.width(),
            self.height(),
            self.depth(),
            positions.len(),
            self.voxel_count()
        );
        Ok(())
    }

    /// Load a volume, trilinear-resizing into this grid when the stored
    /// dimensions differ from its own.
    ///
    /// Header failures leave this grid unmodified.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut input = BufReader::new(File::open(path.as_ref())?);

        let sx = input.read_u16::<LittleEndian>()? as usize;
        let sy = input.read_u16::<LittleEndian>()? as usize;
        let sz = input.read_u16::<LittleEndian>()? as usize;
        let count = input.read_u64::<LittleEndian>()?;

        let total = (sx * sy * sz) as u64;
        if count > total {
            return Err(Error::InvalidHeader(format!(
                "stored count {count} exceeds the {sx}x{sy}x{sz} extent"
            )));
        }

        let mut loaded: Grid<V> = Grid::new(sx, sy, sz);
        if count < total {
            let mut positions = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let pos = input.read_u64::<LittleEndian>()?;
                if pos >= total {
                    return Err(Error::InvalidHeader(format!(
                        "sparse index {pos} exceeds the {sx}x{sy}x{sz} extent"
                    )));
                }
                positions.push(pos);
            }
            for pos in positions {
                let (x, y, z) = loaded.decompose(pos);
                let value = V::read_from(&mut input)?;
                loaded.set(x, y, z, value);
            }
        } else {
            for z in 0..sz as i32 {
                for y in 0..sy as i32 {
                    for x in 0..sx as i32 {
                        let value = V::read_from(&mut input)?;
                        loaded.set(x, y, z, value);
                    }
                }
            }
        }

        info!(
            "loaded {sx}x{sy}x{sz} volume ({count} of {total} voxels stored)"
        );

        if loaded.width() == self.width()
            && loaded.height() == self.height()
            && loaded.depth() == self.depth()
        {
            *self = loaded;
        } else {
            loaded.resize(self, ResizeMode::Trilinear);
        }
        Ok(())
    }

    fn write_header<W: Write>(&self, out: &mut W, count: u64) -> Result<()> {
        if self.width() > MAX_FILE_DIM || self.height() > MAX_FILE_DIM || self.depth() > MAX_FILE_DIM
        {
            return Err(Error::InvalidConfig(format!(
                "{}x{}x{} exceeds the u16 header dimension limit",
                self.width(),
                self.height(),
                self.depth()
            )));
        }
        out.write_u16::<LittleEndian>(self.width() as u16)?;
        out.write_u16::<LittleEndian>(self.height() as u16)?;
        out.write_u16::<LittleEndian>(self.depth() as u16)?;
        out.write_u64::<LittleEndian>(count)?;
        Ok(())
    }

    #[inline]
    fn decompose(&self, pos: u64) -> (i32, i32, i32) {
        let mut rest = pos as usize;
        let x = (rest % self.width()) as i32;
        rest /= self.width();
        let y = (rest % self.height()) as i32;
        rest /= self.height();
        (x, y, rest as i32)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::voxel::Scalar;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vox_field_{}_{name}.vol", std::process::id()))
    }

    fn patterned_grid() -> Grid<Scalar> {
        let mut grid: Grid<Scalar> = Grid::new(5, 4, 3);
        let mut value = 0.0;
        grid.for_each_mut(|v| {
            *v = Scalar(value);
            value = (value + 0.37) % 1.0;
        });
        grid
    }

    #[test]
    fn dense_roundtrip_preserves_dims_and_values_within_quantization() {
        let path = scratch_file("dense");
        let grid = patterned_grid();
        grid.save(&path).unwrap();

        let mut loaded: Grid<Scalar> = Grid::new(5, 4, 3);
        loaded.open(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.width(), 5);
        assert_eq!(loaded.height(), 4);
        assert_eq!(loaded.depth(), 3);
        grid.for_each(|x, y, z| {
            let a = grid.get(x, y, z).value();
            let b = loaded.get(x, y, z).value();
            assert!((a - b).abs() <= 1.0 / 255.0, "({x},{y},{z}): {a} vs {b}");
        });
    }

    #[test]
    fn sparse_roundtrip_restores_only_accepted_voxels() {
        let path = scratch_file("sparse");
        let mut grid: Grid<Scalar> = Grid::new(4, 4, 4);
        grid.set(1, 2, 3, Scalar(0.5));
        grid.set(3, 0, 1, Scalar(1.0));
        grid.save_sparse(&path, |v| v != Scalar::ZERO).unwrap();

        let mut loaded: Grid<Scalar> = Grid::new(4, 4, 4);
        loaded.fill(Scalar(0.9));
        loaded.open(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        // The sparse load starts from a zero fill, not the previous content.
        assert_eq!(loaded.get(0, 0, 0), Scalar::ZERO);
        assert!((loaded.get(1, 2, 3).value() - 0.5).abs() <= 1.0 / 255.0);
        assert_eq!(loaded.get(3, 0, 1), Scalar(1.0));
    }

    #[test]
    fn open_resizes_when_stored_dimensions_differ() {
        let path = scratch_file("resized");
        let mut grid: Grid<Scalar> = Grid::new(8, 8, 8);
        grid.fill(Scalar(0.6));
        grid.save(&path).unwrap();

        let mut target: Grid<Scalar> = Grid::new(4, 4, 4);
        target.open(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        target.for_each(|x, y, z| {
            assert!(
                target.get(x, y, z).approx_eq(Scalar(0.6), 2.0 / 255.0),
                "({x},{y},{z}) = {:?}",
                target.get(x, y, z)
            );
        });
    }

    #[test]
    fn invalid_header_leaves_the_target_unmodified() {
        let path = scratch_file("invalid");
        std::fs::write(&path, [1, 0, 1, 0]).unwrap();

        let mut target: Grid<Scalar> = Grid::new(2, 2, 2);
        target.fill(Scalar(0.5));
        let result = target.open(&path);
        let _ = std::fs::remove_file(&path);

        assert!(result.is_err());
        target.for_each(|x, y, z| assert_eq!(target.get(x, y, z), Scalar(0.5)));
    }

    #[test]
    fn oversized_sparse_count_is_rejected() {
        let path = scratch_file("overcount");
        let mut bytes = Vec::new();
        bytes.write_u16::<LittleEndian>(2).unwrap();
        bytes.write_u16::<LittleEndian>(2).unwrap();
        bytes.write_u16::<LittleEndian>(2).unwrap();
        bytes.write_u64::<LittleEndian>(64).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let mut target: Grid<Scalar> = Grid::new(2, 2, 2);
        let result = target.open(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(Error::InvalidHeader(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut target: Grid<Scalar> = Grid::new(2, 2, 2);
        let result = target.open("/nonexistent/vox_field/volume.vol");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
