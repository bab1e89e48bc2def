use std::num::NonZeroU32;

use bon::bon;
use nalgebra::Unit;
use thiserror::Error;

use crate::geometry::{
    EPSILON, FloatType, GeometryError, Ray, SamplingGrid, ScreenPoint, ScreenSize, WorldPoint,
    WorldVector, checked_normalize, checked_sub,
};

#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    #[error("missing camera parameter: {0}")]
    MissingField(&'static str),
    #[error("camera parameters {0} and {1} can't be used together")]
    ConflictingFields(&'static str, &'static str),
    #[error("view direction and up vector must be orthogonal")]
    NotOrthogonal,
    #[error("camera {name} must be positive")]
    NonPositive { name: &'static str },
    #[error("camera resolution must be non-zero")]
    ZeroResolution,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Pinhole camera looking at a rectangular view plane.
///
/// Pixel `(j, i)` is column `j`, row `i`, with row 0 at the top of the image.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    location: WorldPoint,

    to: Unit<WorldVector>,
    up: Unit<WorldVector>,
    right: Unit<WorldVector>,

    /// Center of the view plane
    plane_center: WorldPoint,
    distance: FloatType,

    resolution: ScreenSize,
    /// Width and height of a single pixel on the view plane
    pixel_size: (FloatType, FloatType),

    /// Rays per pixel along each axis
    anti_aliasing: NonZeroU32,
}

#[bon]
impl Camera {
    /// Creates the camera from a view direction (`to`) or a point to look at (`target`).
    /// An explicit `to` must be orthogonal to `up`, with a `target` the up vector gets
    /// re-orthogonalized to the resulting view direction instead.
    #[builder]
    pub fn new(
        location: WorldPoint,
        to: Option<WorldVector>,
        target: Option<WorldPoint>,
        up: WorldVector,
        width: FloatType,
        height: FloatType,
        distance: FloatType,
        resolution: ScreenSize,
        #[builder(default = NonZeroU32::MIN)] anti_aliasing: NonZeroU32,
    ) -> Result<Camera, CameraError> {
        let up = checked_normalize(up)?;
        let (to, up) = match (to, target) {
            (Some(to), None) => {
                let to = checked_normalize(to)?;
                if to.dot(&up).abs() > EPSILON {
                    return Err(CameraError::NotOrthogonal);
                }
                (to, up)
            }
            (None, Some(target)) => {
                let to = checked_normalize(checked_sub(&target, &location)?)?;
                let up = up.into_inner() - to.as_ref() * to.dot(&up);
                let up = Unit::try_new(up, EPSILON).ok_or(GeometryError::Parallel)?;
                (to, up)
            }
            (None, None) => return Err(CameraError::MissingField("to or target")),
            (Some(_), Some(_)) => return Err(CameraError::ConflictingFields("to", "target")),
        };

        for (name, value) in [("width", width), ("height", height), ("distance", distance)] {
            if !(value > 0.0) {
                return Err(CameraError::NonPositive { name });
            }
        }
        if resolution.x == 0 || resolution.y == 0 {
            return Err(CameraError::ZeroResolution);
        }

        let right = Unit::new_normalize(to.cross(&up));
        let camera = Camera {
            location,
            to,
            up,
            right,
            plane_center: location + to.as_ref() * distance,
            distance,
            resolution,
            pixel_size: (
                width / resolution.x as FloatType,
                height / resolution.y as FloatType,
            ),
            anti_aliasing,
        };
        log::debug!(
            "Camera at {:?} looking along {:?}, {}x{} pixels, {} rays per pixel",
            location,
            to.into_inner(),
            resolution.x,
            resolution.y,
            camera.rays_per_pixel()
        );
        Ok(camera)
    }
}

impl Camera {
    pub fn location(&self) -> &WorldPoint {
        &self.location
    }

    pub fn direction(&self) -> Unit<WorldVector> {
        self.to
    }

    pub fn up(&self) -> Unit<WorldVector> {
        self.up
    }

    pub fn right(&self) -> Unit<WorldVector> {
        self.right
    }

    pub fn distance(&self) -> FloatType {
        self.distance
    }

    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn anti_aliasing(&self) -> NonZeroU32 {
        self.anti_aliasing
    }

    pub fn rays_per_pixel(&self) -> usize {
        let n = self.anti_aliasing.get() as usize;
        n * n
    }

    /// Center of the pixel on the view plane.
    fn pixel_center(&self, pixel: &ScreenPoint) -> WorldPoint {
        let (pixel_width, pixel_height) = self.pixel_size;
        let x = (pixel.x as FloatType - (self.resolution.x as FloatType - 1.0) / 2.0) * pixel_width;
        let y =
            -(pixel.y as FloatType - (self.resolution.y as FloatType - 1.0) / 2.0) * pixel_height;
        self.plane_center + self.right.as_ref() * x + self.up.as_ref() * y
    }

    fn ray_through(&self, point: &WorldPoint) -> Ray {
        // The view plane is at a positive distance, so the direction is never zero
        Ray::new(self.location, Unit::new_normalize(point - self.location))
    }

    /// Ray through the center of a pixel.
    pub fn construct_ray(&self, pixel: &ScreenPoint) -> Ray {
        self.ray_through(&self.pixel_center(pixel))
    }

    /// Rays for a pixel, one per cell of a jittered `anti_aliasing x anti_aliasing` grid
    /// covering the pixel. Without anti-aliasing this is just the center ray.
    pub fn construct_rays(&self, pixel: &ScreenPoint, rng: &mut impl rand::Rng) -> Vec<Ray> {
        let (pixel_width, pixel_height) = self.pixel_size;
        SamplingGrid::new(self.anti_aliasing, pixel_width, pixel_height)
            .points(&self.pixel_center(pixel), &self.right, &self.up, rng)
            .iter()
            .map(|point| self.ray_through(point))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::{assert, let_assert};
    use rand::{SeedableRng as _, rngs::SmallRng};
    use test_case::test_case;

    /// Builder arguments, defaulting to 3x3 pixels on a 3x3 view plane at distance 1,
    /// looking along -z with y up
    struct Params {
        to: Option<WorldVector>,
        target: Option<WorldPoint>,
        up: WorldVector,
        width: FloatType,
        height: FloatType,
        distance: FloatType,
        resolution: ScreenSize,
        anti_aliasing: NonZeroU32,
    }

    impl Default for Params {
        fn default() -> Self {
            Params {
                to: Some(-WorldVector::z()),
                target: None,
                up: WorldVector::y(),
                width: 3.0,
                height: 3.0,
                distance: 1.0,
                resolution: ScreenSize::new(3, 3),
                anti_aliasing: NonZeroU32::MIN,
            }
        }
    }

    fn build(params: Params) -> Result<Camera, CameraError> {
        Camera::builder()
            .location(WorldPoint::origin())
            .maybe_to(params.to)
            .maybe_target(params.target)
            .up(params.up)
            .width(params.width)
            .height(params.height)
            .distance(params.distance)
            .resolution(params.resolution)
            .anti_aliasing(params.anti_aliasing)
            .build()
    }

    fn small_camera() -> Camera {
        build(Params::default()).unwrap()
    }

    #[test]
    fn center_ray_looks_forward() {
        let camera = small_camera();
        let ray = camera.construct_ray(&ScreenPoint::new(1, 1));
        assert!(ray.origin == WorldPoint::origin());
        assert!((ray.direction.into_inner() + WorldVector::z()).norm() < EPSILON);
        assert!(camera.right().into_inner() == WorldVector::x());
    }

    #[test_case(0, 0, WorldVector::new(-1.0, 1.0, -1.0); "top_left")]
    #[test_case(2, 0, WorldVector::new(1.0, 1.0, -1.0); "top_right")]
    #[test_case(0, 2, WorldVector::new(-1.0, -1.0, -1.0); "bottom_left")]
    #[test_case(1, 2, WorldVector::new(0.0, -1.0, -1.0); "bottom_center")]
    fn pixel_rays(j: u32, i: u32, expected: WorldVector) {
        let camera = small_camera();
        let ray = camera.construct_ray(&ScreenPoint::new(j, i));
        assert!((ray.direction.into_inner() - expected.normalize()).norm() < EPSILON);
    }

    #[test]
    fn left_right_up_down() {
        // X goes right, Y goes away, Z goes up
        let_assert!(
            Ok(camera) = Camera::builder()
                .location(WorldPoint::new(0.0, 0.0, 0.0))
                .to(WorldVector::new(0.0, 1.0, 0.0))
                .up(WorldVector::new(0.0, 0.0, 1.0))
                .width(36e-3)
                .height(27e-3)
                .distance(50e-3)
                .resolution(ScreenSize::new(800, 600))
                .build()
        );

        let ray_left = camera.construct_ray(&ScreenPoint::new(0, 300));
        let ray_right = camera.construct_ray(&ScreenPoint::new(799, 300));
        let ray_up = camera.construct_ray(&ScreenPoint::new(400, 0));
        let ray_down = camera.construct_ray(&ScreenPoint::new(400, 599));

        assert!(ray_left.direction.x < 0.0);
        assert!(ray_right.direction.x > 0.0);
        assert!(ray_up.direction.z > 0.0);
        assert!(ray_down.direction.z < 0.0);
    }

    #[test]
    fn target_reorthogonalizes_up() {
        let_assert!(
            Ok(camera) = Camera::builder()
                .location(WorldPoint::new(0.0, 0.0, 10.0))
                .target(WorldPoint::new(0.0, 10.0, 0.0))
                .up(WorldVector::z())
                .width(1.0)
                .height(1.0)
                .distance(1.0)
                .resolution(ScreenSize::new(10, 10))
                .build()
        );
        assert!(camera.direction().dot(&camera.up()).abs() < EPSILON);
        assert!(camera.up().z > 0.0);
        assert!(camera.right().x > 0.0);
    }

    #[test]
    fn anti_aliasing_rays_stay_in_pixel() {
        let_assert!(
            Ok(camera) = build(Params {
                anti_aliasing: NonZeroU32::new(3).unwrap(),
                ..Default::default()
            })
        );
        let mut rng = SmallRng::seed_from_u64(1);
        let pixel = ScreenPoint::new(2, 0);
        let center = camera.pixel_center(&pixel);

        let rays = camera.construct_rays(&pixel, &mut rng);
        assert!(rays.len() == 9);
        for ray in rays {
            // Back onto the view plane at z = -1
            let point = ray.point_at(1.0 / -ray.direction.z);
            let offset = point - center;
            assert!(offset.x.abs() <= 0.5 + EPSILON);
            assert!(offset.y.abs() <= 0.5 + EPSILON);
            assert!(offset.z.abs() < 1e-9);
        }
    }

    #[test]
    fn single_ray_without_anti_aliasing() {
        let camera = small_camera();
        let mut rng = SmallRng::seed_from_u64(1);
        let rays = camera.construct_rays(&ScreenPoint::new(0, 1), &mut rng);
        assert!(rays.len() == 1);
        let center = camera.construct_ray(&ScreenPoint::new(0, 1));
        assert!(rays[0].direction == center.direction);
    }

    #[test]
    fn not_orthogonal() {
        let result = build(Params {
            to: Some(WorldVector::new(0.0, 1.0, -1.0)),
            ..Default::default()
        });
        assert!(result.unwrap_err() == CameraError::NotOrthogonal);
    }

    #[test]
    fn missing_direction() {
        let result = build(Params {
            to: None,
            ..Default::default()
        });
        assert!(result.unwrap_err() == CameraError::MissingField("to or target"));
    }

    #[test]
    fn conflicting_direction() {
        let result = build(Params {
            target: Some(WorldPoint::new(0.0, 0.0, -1.0)),
            ..Default::default()
        });
        assert!(result.unwrap_err() == CameraError::ConflictingFields("to", "target"));
    }

    #[test]
    fn non_positive_sizes() {
        let width = build(Params {
            width: 0.0,
            ..Default::default()
        });
        assert!(width.unwrap_err() == CameraError::NonPositive { name: "width" });

        let distance = build(Params {
            distance: -1.0,
            ..Default::default()
        });
        assert!(distance.unwrap_err() == CameraError::NonPositive { name: "distance" });

        let height = build(Params {
            height: FloatType::NAN,
            ..Default::default()
        });
        assert!(height.unwrap_err() == CameraError::NonPositive { name: "height" });
    }

    #[test]
    fn zero_resolution() {
        let result = build(Params {
            resolution: ScreenSize::new(0, 3),
            ..Default::default()
        });
        assert!(result.unwrap_err() == CameraError::ZeroResolution);
    }

    #[test]
    fn zero_up_vector() {
        let result = build(Params {
            up: WorldVector::zeros(),
            ..Default::default()
        });
        assert!(result.unwrap_err() == CameraError::Geometry(GeometryError::ZeroVector));
    }
}
