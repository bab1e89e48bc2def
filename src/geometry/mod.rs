mod aabb;
mod ray_box_intersection;
mod sampling;

pub use aabb::AABB;
pub use ray_box_intersection::RayIntersectionExt;
pub use sampling::{SamplingGrid, orthonormal_basis};

use nalgebra::Unit;
use thiserror::Error;

pub type FloatType = f64;

/// Tolerance shared by every approximate comparison in the crate.
pub const EPSILON: FloatType = 1e-10;

/// Distance by which secondary rays are moved away from the surface they start on.
pub const RAY_OFFSET: FloatType = 0.1;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("vector has zero length")]
    ZeroVector,
    #[error("vectors are parallel")]
    Parallel,
    #[error("points coincide")]
    CoincidentPoints,
    #[error("points are collinear")]
    Collinear,
    #[error("polygon vertices are not coplanar")]
    NotCoplanar,
    #[error("polygon is not convex or its vertices are not ordered")]
    NotConvex,
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("radius must be positive")]
    NonPositiveRadius,
    #[error("height must be positive")]
    NonPositiveHeight,
}

pub fn is_zero(x: FloatType) -> bool {
    x.abs() < EPSILON
}

pub fn approx_eq(a: FloatType, b: FloatType) -> bool {
    is_zero(a - b)
}

pub fn points_approx_eq(a: &WorldPoint, b: &WorldPoint) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| approx_eq(*x, *y))
}

/// Vector from `from` to `to`, fails if the points are (approximately) equal.
pub fn checked_sub(to: &WorldPoint, from: &WorldPoint) -> Result<WorldVector, GeometryError> {
    if points_approx_eq(to, from) {
        Err(GeometryError::ZeroVector)
    } else {
        Ok(to - from)
    }
}

pub fn checked_normalize(v: WorldVector) -> Result<Unit<WorldVector>, GeometryError> {
    Unit::try_new(v, EPSILON).ok_or(GeometryError::ZeroVector)
}

/// Cross product that fails on parallel (or zero) input vectors.
/// The test is on the sine of the angle between the inputs, independent of their lengths.
pub fn checked_cross(a: &WorldVector, b: &WorldVector) -> Result<WorldVector, GeometryError> {
    let cross = a.cross(b);
    let scale = a.norm() * b.norm();
    if cross.norm() <= EPSILON * scale {
        Err(GeometryError::Parallel)
    } else {
        Ok(cross)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: Unit<WorldVector>,

    /// Componentwise inverse of the ray direction
    /// Zeros in direction get turned into positive infinity regardless of the sign of the zero
    pub inv_direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: Unit<WorldVector>) -> Ray {
        let inv_direction = direction.map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        Ray {
            origin,
            direction,
            inv_direction,
        }
    }

    /// Ray with a direction that doesn't need to be normalized.
    pub fn towards(origin: WorldPoint, direction: WorldVector) -> Result<Ray, GeometryError> {
        Ok(Ray::new(origin, checked_normalize(direction)?))
    }

    /// Secondary ray starting at a surface point.
    /// The origin is moved by `RAY_OFFSET` along the normal, to the side where the direction points.
    pub fn offset(
        point: WorldPoint,
        direction: Unit<WorldVector>,
        normal: &Unit<WorldVector>,
    ) -> Ray {
        let nd = normal.dot(&direction);
        let origin = if is_zero(nd) {
            point
        } else {
            point + normal.as_ref() * RAY_OFFSET.copysign(nd)
        };
        Ray::new(origin, direction)
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use assert2::{assert, let_assert};
    use proptest::prelude::*;
    use test_strategy::proptest;

    /// Helper macro that creates a wrapper arnound a type that implemetns Deref and Arbitary
    macro_rules! arbitrary_wrapper {
        ( $wrapper_name:ident ( $type:ty ) -> $block:block ) => {
            #[derive(Copy, Clone, Debug)]
            pub struct $wrapper_name(pub $type);

            impl std::ops::Deref for $wrapper_name {
                type Target = $type;
                fn deref(&self) -> &$type {
                    &self.0
                }
            }

            impl Arbitrary for $wrapper_name {
                type Parameters = ();
                type Strategy = proptest::strategy::BoxedStrategy<Self>;
                fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                    $block.prop_map(|x| $wrapper_name(x)).boxed()
                }
            }
        };
    }

    pub fn simple_float() -> BoxedStrategy<FloatType> {
        (-10_000_000i64..10_000_000i64)
            .prop_map(|n| n as FloatType * 1e-6)
            .boxed()
    }

    pub fn simple_positive_float() -> BoxedStrategy<FloatType> {
        (1u64..10_000_000u64)
            .prop_map(|n| n as FloatType * 1e-6)
            .boxed()
    }

    arbitrary_wrapper! {
        NonzeroWorldVectorWrapper(WorldVector) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_filter_map(
                    "vector is zero",
                    |coords| {
                        let vector = WorldVector::new(coords.0, coords.1, coords.2);
                        if vector.norm() < 1e-3 {
                            None
                        } else {
                            Some(vector)
                        }
                    })

        }
    }

    arbitrary_wrapper! {
        WorldPointWrapper(WorldPoint) -> {
            (simple_float(), simple_float(), simple_float())
                .prop_map(|coords| {
                    WorldPoint::new(coords.0, coords.1, coords.2)
                })
        }
    }

    arbitrary_wrapper! {
        RayWrapper(Ray) -> {
            (any::<WorldPointWrapper>(), any::<NonzeroWorldVectorWrapper>())
                .prop_map(|(origin, direction)| {
                    Ray::new(*origin, Unit::new_normalize(*direction))
                })
        }
    }

    #[proptest]
    fn normalize_is_idempotent(v: NonzeroWorldVectorWrapper) {
        let once = checked_normalize(*v).unwrap();
        let twice = checked_normalize(once.into_inner()).unwrap();
        prop_assert!((once.into_inner() - twice.into_inner()).norm() < EPSILON);
    }

    #[proptest]
    fn ray_direction_is_normalized(origin: WorldPointWrapper, direction: NonzeroWorldVectorWrapper) {
        let ray = Ray::towards(*origin, *direction).unwrap();
        prop_assert!((ray.direction.norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn sub_of_equal_points_fails() {
        let p = WorldPoint::new(1.0, 2.0, 3.0);
        let q = WorldPoint::new(1.0, 2.0, 3.0 + EPSILON / 10.0);
        assert!(checked_sub(&p, &q) == Err(GeometryError::ZeroVector));
    }

    #[test]
    fn sub_of_distinct_points() {
        let p = WorldPoint::new(1.0, 2.0, 3.0);
        let q = WorldPoint::new(0.0, 2.0, 3.0);
        let_assert!(Ok(v) = checked_sub(&p, &q));
        assert!(v == WorldVector::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn normalize_zero_fails() {
        assert!(checked_normalize(WorldVector::zeros()) == Err(GeometryError::ZeroVector));
    }

    #[test]
    fn cross_of_parallel_fails() {
        let a = WorldVector::new(1.0, 2.0, 3.0);
        assert!(checked_cross(&a, &(a * -2.0)) == Err(GeometryError::Parallel));
    }

    #[test]
    fn cross_of_short_vectors() {
        let a = WorldVector::new(1e-6, 0.0, 0.0);
        let b = WorldVector::new(0.0, 1e-6, 0.0);
        let_assert!(Ok(c) = checked_cross(&a, &b));
        assert!(c.z > 0.0);
        assert!(checked_cross(&a, &(a * 3.0)) == Err(GeometryError::Parallel));
    }

    #[test]
    fn cross_of_zero_fails() {
        let a = WorldVector::new(1.0, 2.0, 3.0);
        assert!(checked_cross(&a, &WorldVector::zeros()) == Err(GeometryError::Parallel));
    }

    #[test]
    fn cross_of_axes() {
        let_assert!(Ok(c) = checked_cross(&WorldVector::x(), &WorldVector::y()));
        assert!(c == WorldVector::z());
    }

    #[test]
    fn ray_towards_zero_fails() {
        assert!(Ray::towards(WorldPoint::origin(), WorldVector::zeros()).is_err());
    }

    #[test]
    fn inverse_direction_of_axis_ray() {
        let ray = Ray::towards(WorldPoint::origin(), WorldVector::new(0.0, -2.0, 0.0)).unwrap();
        assert!(ray.inv_direction.x == FloatType::INFINITY);
        assert!(ray.inv_direction.y == -1.0);
        assert!(ray.inv_direction.z == FloatType::INFINITY);
    }

    #[test]
    fn offset_moves_along_normal_towards_direction() {
        let normal = Unit::new_normalize(WorldVector::z());
        let up = Ray::offset(WorldPoint::origin(), normal, &normal);
        assert!(up.origin == WorldPoint::new(0.0, 0.0, RAY_OFFSET));

        let down = Ray::offset(WorldPoint::origin(), -normal, &normal);
        assert!(down.origin == WorldPoint::new(0.0, 0.0, -RAY_OFFSET));
    }
}
