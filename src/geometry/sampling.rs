use std::num::NonZeroU32;

use nalgebra::Unit;

use super::{FloatType, WorldPoint, WorldVector};

/// Jittered square grid of sample points on a rectangle.
///
/// The rectangle is centered on a target point and spanned by two orthonormal vectors.
/// Every cell of the `resolution x resolution` grid receives exactly one sample,
/// placed uniformly at random within the cell.
#[derive(Copy, Clone, Debug)]
pub struct SamplingGrid {
    pub resolution: NonZeroU32,
    pub width: FloatType,
    pub height: FloatType,
}

impl SamplingGrid {
    pub fn new(resolution: NonZeroU32, width: FloatType, height: FloatType) -> SamplingGrid {
        SamplingGrid {
            resolution,
            width,
            height,
        }
    }

    pub fn square(resolution: NonZeroU32, size: FloatType) -> SamplingGrid {
        SamplingGrid::new(resolution, size, size)
    }

    pub fn sample_count(&self) -> usize {
        let n = self.resolution.get() as usize;
        n * n
    }

    /// Generates the jittered sample points.
    /// A grid of resolution 1 returns just the center, without any randomness.
    pub fn points(
        &self,
        center: &WorldPoint,
        right: &Unit<WorldVector>,
        up: &Unit<WorldVector>,
        rng: &mut impl rand::Rng,
    ) -> Vec<WorldPoint> {
        let n = self.resolution.get();
        if n == 1 {
            return vec![*center];
        }

        let cell_width = self.width / n as FloatType;
        let cell_height = self.height / n as FloatType;
        let corner = center
            - right.as_ref() * (self.width / 2.0)
            - up.as_ref() * (self.height / 2.0);

        let mut points = Vec::with_capacity(self.sample_count());
        for row in 0..n {
            for column in 0..n {
                let u = (column as FloatType + rng.random_range(0.0..1.0)) * cell_width;
                let v = (row as FloatType + rng.random_range(0.0..1.0)) * cell_height;
                points.push(corner + right.as_ref() * u + up.as_ref() * v);
            }
        }
        points
    }

    /// Sample points restricted to the disc inscribed into the sampled square.
    /// Points of the jittered grid outside the disc are pulled onto it radially,
    /// so the number of samples stays the same.
    pub fn disc_points(
        &self,
        center: &WorldPoint,
        right: &Unit<WorldVector>,
        up: &Unit<WorldVector>,
        rng: &mut impl rand::Rng,
    ) -> Vec<WorldPoint> {
        let radius = self.width.min(self.height) / 2.0;
        self.points(center, right, up, rng)
            .into_iter()
            .map(|p| {
                let offset = p - center;
                let distance = offset.norm();
                if distance > radius {
                    center + offset * (radius / distance)
                } else {
                    p
                }
            })
            .collect()
    }
}

/// Two unit vectors perpendicular to `n` and to each other.
pub fn orthonormal_basis(n: &Unit<WorldVector>) -> (Unit<WorldVector>, Unit<WorldVector>) {
    // Cross with the axis that is least aligned with n, so that the result is never degenerate
    let helper = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        WorldVector::x()
    } else if n.y.abs() <= n.z.abs() {
        WorldVector::y()
    } else {
        WorldVector::z()
    };
    let u = Unit::new_normalize(n.cross(&helper));
    let v = Unit::new_normalize(n.cross(&u));
    (u, v)
}
