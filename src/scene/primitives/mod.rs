mod plane;
mod polygon;
mod sphere;
mod tube;

pub use plane::Plane;
pub use polygon::Polygon;
pub use sphere::Sphere;
pub use tube::{Cylinder, Tube};

use arrayvec::ArrayVec;
use nalgebra::Unit;

use crate::{
    geometry::{EPSILON, FloatType, GeometryError, Ray, WorldBox, WorldPoint, WorldVector},
    util::{BLACK, Color},
};

use super::{Intersectable, Intersection, Material};

/// Ascending distances along a ray where a shape was hit.
pub type HitDistances = ArrayVec<FloatType, 4>;

/// Checks that a distance along the ray is a valid hit.
/// Distances within EPSILON of the origin are rejected, so that a ray starting on a surface
/// doesn't hit it again.
fn is_valid_hit(t: FloatType, max_distance: FloatType) -> bool {
    t > EPSILON && t <= max_distance
}

#[derive(Clone, Debug)]
pub enum Shape {
    Plane(Plane),
    Sphere(Sphere),
    Polygon(Polygon),
    Tube(Tube),
    Cylinder(Cylinder),
}

impl Shape {
    /// Unit normal at a point on the surface.
    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        match self {
            Shape::Plane(s) => s.normal(),
            Shape::Sphere(s) => s.normal(point),
            Shape::Polygon(s) => s.normal(),
            Shape::Tube(s) => s.normal(point),
            Shape::Cylinder(s) => s.normal(point),
        }
    }

    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> HitDistances {
        match self {
            Shape::Plane(s) => s.intersect(ray, max_distance).into_iter().collect(),
            Shape::Sphere(s) => s.intersect(ray, max_distance),
            Shape::Polygon(s) => s.intersect(ray, max_distance).into_iter().collect(),
            Shape::Tube(s) => s.intersect(ray, max_distance),
            Shape::Cylinder(s) => s.intersect(ray, max_distance),
        }
    }

    pub fn bounding_box(&self) -> WorldBox {
        match self {
            Shape::Plane(_) | Shape::Tube(_) => WorldBox::infinite(),
            Shape::Sphere(s) => s.bounding_box(),
            Shape::Polygon(s) => s.bounding_box(),
            Shape::Cylinder(s) => s.bounding_box(),
        }
    }
}

impl From<Plane> for Shape {
    fn from(value: Plane) -> Self {
        Shape::Plane(value)
    }
}

impl From<Sphere> for Shape {
    fn from(value: Sphere) -> Self {
        Shape::Sphere(value)
    }
}

impl From<Polygon> for Shape {
    fn from(value: Polygon) -> Self {
        Shape::Polygon(value)
    }
}

impl From<Tube> for Shape {
    fn from(value: Tube) -> Self {
        Shape::Tube(value)
    }
}

impl From<Cylinder> for Shape {
    fn from(value: Cylinder) -> Self {
        Shape::Cylinder(value)
    }
}

/// A shape together with the way it looks.
#[derive(Clone, Debug)]
pub struct Surface {
    pub shape: Shape,
    pub material: Material,
    pub emission: Color,
}

impl Surface {
    pub fn new(shape: impl Into<Shape>) -> Surface {
        Surface {
            shape: shape.into(),
            material: Material::default(),
            emission: BLACK,
        }
    }

    pub fn sphere(center: WorldPoint, radius: FloatType) -> Result<Surface, GeometryError> {
        Ok(Surface::new(Sphere::new(center, radius)?))
    }

    pub fn triangle(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Result<Surface, GeometryError> {
        Ok(Surface::new(Polygon::triangle(a, b, c)?))
    }

    pub fn with_material(self, material: Material) -> Surface {
        Surface { material, ..self }
    }

    pub fn with_emission(self, emission: Color) -> Surface {
        Surface { emission, ..self }
    }

    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        self.shape.normal(point)
    }
}

impl Intersectable for Surface {
    fn intersections<'a>(
        &'a self,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Option<Vec<Intersection<'a>>> {
        let distances = self.shape.intersect(ray, max_distance);
        if distances.is_empty() {
            return None;
        }
        Some(
            distances
                .into_iter()
                .map(|distance| Intersection {
                    surface: self,
                    point: ray.point_at(distance),
                    distance,
                })
                .collect(),
        )
    }

    fn bounding_box(&self) -> WorldBox {
        self.shape.bounding_box()
    }
}
