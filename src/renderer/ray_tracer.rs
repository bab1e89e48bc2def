use crate::{
    geometry::{FloatType, Ray},
    scene::{Geometries, Grid, Intersectable as _, Intersection, Scene, closest},
    util::Color,
};

/// Computes the color seen along a ray.
pub trait RayTracer: Sync {
    fn trace_ray<R: rand::Rng>(&self, ray: &Ray, rng: &mut R) -> Color;
}

/// Where a tracer gets its candidate intersections from.
pub trait IntersectionSource: Sync {
    /// Nearest hit within `max_distance`.
    fn closest_intersection(&self, ray: &Ray, max_distance: FloatType) -> Option<Intersection<'_>>;

    /// Hits between a point and a light.
    /// Without `collect_all` it is enough to report the hits of the first occluder found.
    fn occluders(
        &self,
        ray: &Ray,
        max_distance: FloatType,
        collect_all: bool,
    ) -> Option<Vec<Intersection<'_>>>;
}

impl IntersectionSource for Geometries {
    fn closest_intersection(&self, ray: &Ray, max_distance: FloatType) -> Option<Intersection<'_>> {
        closest(self.intersections(ray, max_distance)?)
    }

    fn occluders(
        &self,
        ray: &Ray,
        max_distance: FloatType,
        _collect_all: bool,
    ) -> Option<Vec<Intersection<'_>>> {
        self.intersections(ray, max_distance)
    }
}

impl IntersectionSource for Grid<'_> {
    fn closest_intersection(&self, ray: &Ray, max_distance: FloatType) -> Option<Intersection<'_>> {
        self.closest(ray, max_distance)
    }

    fn occluders(
        &self,
        ray: &Ray,
        max_distance: FloatType,
        collect_all: bool,
    ) -> Option<Vec<Intersection<'_>>> {
        self.traverse(ray, max_distance, collect_all)
    }
}

/// Whitted style ray tracer over a scene.
/// The intersection source decides how the surfaces of the scene are searched.
#[derive(Copy, Clone, Debug)]
pub struct Tracer<'s, S> {
    pub(super) scene: &'s Scene,
    pub(super) source: &'s S,
}

/// Tests every surface of the scene for each ray.
pub type SimpleRayTracer<'s> = Tracer<'s, Geometries>;

/// Searches the surfaces through a voxel grid.
pub type GridRayTracer<'s> = Tracer<'s, Grid<'s>>;

impl<'s> SimpleRayTracer<'s> {
    pub fn new(scene: &'s Scene) -> Self {
        Tracer {
            scene,
            source: &scene.geometries,
        }
    }
}

impl<'s> GridRayTracer<'s> {
    /// The grid must be built over the geometries of the same scene.
    pub fn new(scene: &'s Scene, grid: &'s Grid<'s>) -> Self {
        debug_assert!(std::ptr::eq(grid.geometries(), &scene.geometries));
        Tracer {
            scene,
            source: grid,
        }
    }
}

impl<S: IntersectionSource> RayTracer for Tracer<'_, S> {
    fn trace_ray<R: rand::Rng>(&self, ray: &Ray, rng: &mut R) -> Color {
        match self.source.closest_intersection(ray, FloatType::INFINITY) {
            Some(hit) => self.primary_color(&hit, ray, rng),
            None => self.scene.background,
        }
    }
}
