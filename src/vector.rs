// ------------------------------------------------------------
// Coordinate vectors
// ------------------------------------------------------------

use std::ops::{Add, Index, Mul};

use serde::{Deserialize, Serialize};

/// An immutable, fixed-length list of coordinates.
///
/// Vectors of different lengths can be combined: missing trailing components
/// read as zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(Vec<f64>);

impl Vector {
    pub fn new(coords: Vec<f64>) -> Self {
        Self(coords)
    }

    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    /// Coordinate along `axis`, or 0 past the end.
    #[inline(always)]
    pub fn coord(&self, axis: usize) -> f64 {
        self.0.get(axis).copied().unwrap_or(0.0)
    }

    /// Squared Euclidean distance over the longer of the two lengths.
    #[inline]
    pub fn squared_distance(&self, other: &Vector) -> f64 {
        squared_distance(&self.0, &other.0)
    }

    pub fn add(&self, other: &Vector) -> Vector {
        let len = self.len().max(other.len());
        Vector((0..len).map(|axis| self.coord(axis) + other.coord(axis)).collect())
    }

    pub fn scale(&self, k: f64) -> Vector {
        Vector(self.0.iter().map(|c| c * k).collect())
    }
}

/// Squared Euclidean distance between two coordinate slices, zero-padding the
/// shorter one.
#[inline]
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().max(b.len());
    let mut ds = 0.0;
    for axis in 0..len {
        let d = a.get(axis).copied().unwrap_or(0.0) - b.get(axis).copied().unwrap_or(0.0);
        ds += d * d;
    }
    ds
}

/// `acc += weight * coords`, growing `acc` when `coords` is longer.
#[inline]
pub(crate) fn accumulate_scaled(acc: &mut Vec<f64>, coords: &[f64], weight: f64) {
    if acc.len() < coords.len() {
        acc.resize(coords.len(), 0.0);
    }
    for (sum, c) in acc.iter_mut().zip(coords) {
        *sum += weight * c;
    }
}

impl From<Vec<f64>> for Vector {
    fn from(coords: Vec<f64>) -> Self {
        Self(coords)
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(coords: [f64; N]) -> Self {
        Self(coords.to_vec())
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.0[axis]
    }
}

impl Add for &Vector {
    type Output = Vector;

    fn add(self, rhs: &Vector) -> Vector {
        Vector::add(self, rhs)
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;

    fn mul(self, k: f64) -> Vector {
        self.scale(k)
    }
}
