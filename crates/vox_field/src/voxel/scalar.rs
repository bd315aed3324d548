//! Single-channel scalar voxel.
use std::io::{self, Read, Write};
use std::ops::{Add, AddAssign, Mul, Sub};

use crate::voxel::{dequantize_unit, quantize_unit, Voxel};

/// One scalar sample, nominally in `[0, 1]`.
///
/// The binary encoding is exactly one byte: writing quantizes the clamped
/// value to `[0, 255]` (truncating), reading divides by 255. The 8-bit loss
/// is part of the file format.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Scalar(pub f32);

impl Scalar {
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Voxel for Scalar {
    const ZERO: Self = Scalar(0.0);

    #[inline]
    fn splat(value: f32) -> Self {
        Scalar(value)
    }

    #[inline]
    fn mix(&mut self, other: Self, t: f32) {
        self.0 += (other.0 - self.0) * t;
    }

    #[inline]
    fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.0 - other.0).abs() <= epsilon
    }

    #[inline]
    fn cbrt(self) -> Self {
        Scalar(self.0.cbrt())
    }

    #[inline]
    fn sort_key(self) -> f32 {
        self.0
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut byte = [0u8; 1];
        reader.read_exact(&mut byte)?;
        Ok(Scalar(dequantize_unit(byte[0])))
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[quantize_unit(self.0)])
    }
}

impl Add for Scalar {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Scalar(self.0 + rhs.0)
    }
}

impl AddAssign for Scalar {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Scalar {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Scalar(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Scalar(self.0 * rhs.0)
    }
}

impl Mul<f32> for Scalar {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Scalar(self.0 * rhs)
    }
}
