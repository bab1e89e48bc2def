use nalgebra::Unit;

use crate::geometry::{
    FloatType, GeometryError, Ray, WorldPoint, WorldVector, checked_cross, checked_normalize,
    checked_sub, is_zero,
};

use super::is_valid_hit;

#[derive(Clone, Debug)]
pub struct Plane {
    point: WorldPoint,
    normal: Unit<WorldVector>,
}

impl Plane {
    pub fn new(point: WorldPoint, normal: WorldVector) -> Result<Plane, GeometryError> {
        Ok(Plane {
            point,
            normal: checked_normalize(normal)?,
        })
    }

    /// Plane through three points, normal follows the right hand rule on a -> b -> c.
    pub fn from_points(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Result<Plane, GeometryError> {
        let coincident = |_| GeometryError::CoincidentPoints;
        let e1 = checked_sub(&b, &a).map_err(coincident)?;
        let e2 = checked_sub(&c, &a).map_err(coincident)?;
        checked_sub(&c, &b).map_err(coincident)?;

        let cross = checked_cross(&e1, &e2).map_err(|_| GeometryError::Collinear)?;

        Ok(Plane {
            point: a,
            normal: Unit::new_normalize(cross),
        })
    }

    pub fn point(&self) -> &WorldPoint {
        &self.point
    }

    pub fn normal(&self) -> Unit<WorldVector> {
        self.normal
    }

    /// Signed distance of the point from the plane, positive on the side the normal points to.
    pub fn signed_distance(&self, p: &WorldPoint) -> FloatType {
        self.normal.dot(&(p - self.point))
    }

    /// Distance along the ray to the plane.
    /// Rays lying in (or parallel to) the plane don't intersect it.
    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> Option<FloatType> {
        let denominator = self.normal.dot(&ray.direction);
        if is_zero(denominator) {
            return None;
        }

        let t = self.normal.dot(&(self.point - ray.origin)) / denominator;
        is_valid_hit(t, max_distance).then_some(t)
    }
}
