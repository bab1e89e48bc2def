use nalgebra::Unit;

use crate::geometry::{
    FloatType, GeometryError, Ray, WorldBox, WorldPoint, WorldVector, is_zero, points_approx_eq,
};

use super::{HitDistances, is_valid_hit};

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType) -> Result<Sphere, GeometryError> {
        if !(radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius);
        }
        Ok(Sphere { center, radius })
    }

    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        Unit::new_normalize(point - self.center)
    }

    /// Solves |O + t*d - C|^2 = r^2.
    /// Returns 0, 1 (tangent, or origin inside) or 2 ascending distances.
    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> HitDistances {
        let mut hits = HitDistances::new();

        if points_approx_eq(&ray.origin, &self.center) {
            if is_valid_hit(self.radius, max_distance) {
                hits.push(self.radius);
            }
            return hits;
        }

        // Geometric solution: distance along the ray to the point closest to the center,
        // and half of the chord length
        let u = self.center - ray.origin;
        let tm = ray.direction.dot(&u);
        let d_squared = u.norm_squared() - tm * tm;
        let th_squared = self.radius * self.radius - d_squared;

        if is_zero(th_squared) {
            if is_valid_hit(tm, max_distance) {
                hits.push(tm);
            }
            return hits;
        }
        if th_squared < 0.0 {
            return hits;
        }

        let th = th_squared.sqrt();
        for t in [tm - th, tm + th] {
            if is_valid_hit(t, max_distance) {
                hits.push(t);
            }
        }
        hits
    }

    pub fn bounding_box(&self) -> WorldBox {
        let r_vec = WorldVector::repeat(self.radius);
        WorldBox {
            min: self.center - r_vec,
            max: self.center + r_vec,
        }
    }
}
