// ------------------------------------------------------------
// Nearest-centroid classification
// ------------------------------------------------------------

use serde::Serialize;

use crate::error::{Error, Result};
use crate::vector::Vector;

/// A non-empty, immutable list of reference vectors used as a nearest-neighbor
/// classifier.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CentroidList {
    centroids: Vec<Vector>,
}

impl CentroidList {
    pub fn new(centroids: Vec<Vector>) -> Result<Self> {
        if centroids.is_empty() {
            return Err(Error::EmptyCentroidSet);
        }
        Ok(Self { centroids })
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    pub fn centroids(&self) -> &[Vector] {
        &self.centroids
    }

    pub fn into_inner(self) -> Vec<Vector> {
        self.centroids
    }

    /// Index of the nearest centroid. Ties go to the lowest index.
    pub fn classify(&self, point: &Vector) -> usize {
        self.nearest(point).0
    }

    /// Squared distance to the nearest centroid.
    pub fn nearest_distance(&self, point: &Vector) -> f64 {
        self.nearest(point).1
    }

    fn nearest(&self, point: &Vector) -> (usize, f64) {
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;
        for (idx, centroid) in self.centroids.iter().enumerate() {
            let dist = point.squared_distance(centroid);
            if dist < best_dist {
                best_dist = dist;
                best_idx = idx;
            }
        }
        (best_idx, best_dist)
    }

    /// A new list with `centroid` appended.
    pub(crate) fn with(&self, centroid: Vector) -> Self {
        let mut centroids = self.centroids.clone();
        centroids.push(centroid);
        Self { centroids }
    }
}
