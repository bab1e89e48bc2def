mod geometries;
pub mod grid;
mod light;
mod material;
pub mod primitives;

pub use geometries::{Geometries, SurfaceIdx};
pub use grid::Grid;
pub use light::{AmbientLight, Light, PointLight};
pub use material::Material;
pub use primitives::{Shape, Surface};

use std::num::NonZeroU32;

use bon::Builder;
use ordered_float::OrderedFloat;

use crate::{
    geometry::{FloatType, Ray, WorldBox, WorldPoint},
    util::{BLACK, Color},
};

/// Single hit of a ray with a surface.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub surface: &'a Surface,
    pub point: WorldPoint,
    /// Distance from the ray origin
    pub distance: FloatType,
}

impl<'a> Intersection<'a> {
    pub fn material(&self) -> &'a Material {
        &self.surface.material
    }
}

/// Something that can be hit by a ray.
pub trait Intersectable {
    /// All hits within `max_distance` from the ray origin.
    /// Returns None rather than an empty vector when nothing was hit.
    fn intersections<'a>(
        &'a self,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Option<Vec<Intersection<'a>>>;

    fn bounding_box(&self) -> WorldBox;
}

/// Intersection nearest to the ray origin, the first one wins on ties.
pub fn closest<'a>(
    intersections: impl IntoIterator<Item = Intersection<'a>>,
) -> Option<Intersection<'a>> {
    intersections
        .into_iter()
        .min_by_key(|i| OrderedFloat(i.distance))
}

/// Limits and sample counts of the recursive tracing.
#[derive(Copy, Clone, Debug, Builder)]
pub struct TracingSettings {
    /// Maximal number of surfaces a path may visit
    #[builder(default = 10)]
    pub max_depth: u32,
    /// Contributions with weight below this are not traced
    #[builder(default = 0.001)]
    pub min_contribution: FloatType,
    /// Resolution of the sampling grid for glossy reflection and blurry refraction
    #[builder(default = NonZeroU32::MIN)]
    pub glossy_samples: NonZeroU32,
    /// Resolution of the sampling grid for soft shadows of area lights
    #[builder(default = NonZeroU32::MIN)]
    pub shadow_samples: NonZeroU32,
    /// Let transparent surfaces pass some light into their shadows
    #[builder(default = true)]
    pub transparent_shadows: bool,
}

impl Default for TracingSettings {
    fn default() -> Self {
        TracingSettings::builder().build()
    }
}

#[derive(Debug)]
pub struct Scene {
    pub background: Color,
    pub ambient_light: AmbientLight,
    pub geometries: Geometries,
    pub lights: Vec<Light>,
    pub tracing: TracingSettings,
}

impl Scene {
    pub fn new(geometries: Geometries) -> Scene {
        Scene {
            background: BLACK,
            ambient_light: AmbientLight::none(),
            geometries,
            lights: Vec::new(),
            tracing: TracingSettings::default(),
        }
    }
}
