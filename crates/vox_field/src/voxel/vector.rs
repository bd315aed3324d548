//! Four-channel vector voxel.
use std::io::{self, Read, Write};
use std::ops::{Add, AddAssign, Mul, Sub};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::voxel::Voxel;

/// Four-channel sample, typically a gradient direction in `x/y/z` with a
/// magnitude or opacity in `w`.
///
/// The binary encoding is four little-endian `f32`s (16 bytes); unlike
/// [`Scalar`](crate::voxel::Scalar), channels are not quantized since
/// gradient components are signed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Voxel for Vector {
    const ZERO: Self = Vector::new(0.0, 0.0, 0.0, 0.0);

    #[inline]
    fn splat(value: f32) -> Self {
        Vector::new(value, value, value, value)
    }

    #[inline]
    fn mix(&mut self, other: Self, t: f32) {
        self.x += (other.x - self.x) * t;
        self.y += (other.y - self.y) * t;
        self.z += (other.z - self.z) * t;
        self.w += (other.w - self.w) * t;
    }

    #[inline]
    fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
            && (self.w - other.w).abs() <= epsilon
    }

    #[inline]
    fn cbrt(self) -> Self {
        Vector::new(self.x.cbrt(), self.y.cbrt(), self.z.cbrt(), self.w.cbrt())
    }

    #[inline]
    fn sort_key(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Vector::new(
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
            reader.read_f32::<LittleEndian>()?,
        ))
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_f32::<LittleEndian>(self.x)?;
        writer.write_f32::<LittleEndian>(self.y)?;
        writer.write_f32::<LittleEndian>(self.z)?;
        writer.write_f32::<LittleEndian>(self.w)
    }
}

impl Add for Vector {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Vector::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl AddAssign for Vector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Vector::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Mul for Vector {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Vector::new(
            self.x * rhs.x,
            self.y * rhs.y,
            self.z * rhs.z,
            self.w * rhs.w,
        )
    }
}

impl Mul<f32> for Vector {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f32) -> Self {
        Vector::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_interpolates_every_channel() {
        let mut a = Vector::new(0.0, 1.0, -1.0, 0.5);
        a.mix(Vector::new(1.0, 0.0, 1.0, 0.5), 0.5);
        assert!(a.approx_eq(Vector::new(0.5, 0.5, 0.0, 0.5), 1e-6));
    }

    #[test]
    fn approx_eq_fails_when_any_channel_diverges() {
        let a = Vector::new(0.0, 0.0, 0.0, 0.0);
        assert!(a.approx_eq(Vector::new(0.0, 0.0, 0.0, 0.0005), 1e-3));
        assert!(!a.approx_eq(Vector::new(0.0, 0.0, 0.0, 0.002), 1e-3));
    }

    #[test]
    fn encoding_roundtrips_exactly() {
        let value = Vector::new(-0.25, 0.75, 1.5, 0.125);
        let mut buffer = Vec::new();
        value.write_to(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 16);

        let decoded = Vector::read_from(&mut buffer.as_slice()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn sort_key_is_the_euclidean_norm() {
        let key = Vector::new(3.0, 4.0, 0.0, 0.0).sort_key();
        assert!((key - 5.0).abs() < 1e-6);
    }
}
