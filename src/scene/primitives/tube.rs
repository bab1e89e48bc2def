use nalgebra::Unit;

use crate::geometry::{
    EPSILON, FloatType, GeometryError, Ray, WorldBox, WorldPoint, WorldVector, approx_eq,
    checked_normalize, is_zero,
};

use super::{HitDistances, Plane, is_valid_hit};

/// Infinite tube of a given radius around an axis.
#[derive(Clone, Debug)]
pub struct Tube {
    axis: Ray,
    radius: FloatType,
}

impl Tube {
    pub fn new(
        origin: WorldPoint,
        direction: WorldVector,
        radius: FloatType,
    ) -> Result<Tube, GeometryError> {
        if !(radius > 0.0) {
            return Err(GeometryError::NonPositiveRadius);
        }
        Ok(Tube {
            axis: Ray::new(origin, checked_normalize(direction)?),
            radius,
        })
    }

    pub fn axis(&self) -> &Ray {
        &self.axis
    }

    pub fn radius(&self) -> FloatType {
        self.radius
    }

    /// Distance of the point's projection onto the axis from the axis origin.
    fn axial_coordinate(&self, point: &WorldPoint) -> FloatType {
        self.axis.direction.dot(&(point - self.axis.origin))
    }

    /// Normalized component of the offset from the axis that is orthogonal to the axis.
    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        let t = self.axial_coordinate(point);
        let projection = if is_zero(t) {
            self.axis.origin
        } else {
            self.axis.point_at(t)
        };
        Unit::new_normalize(point - projection)
    }

    /// Hits with the lateral surface, ascending.
    /// Rays parallel to the axis never hit.
    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> HitDistances {
        let mut hits = HitDistances::new();

        let axis = self.axis.direction.as_ref();
        let d = ray.direction.as_ref();
        let oc = ray.origin - self.axis.origin;

        // Everything projected onto the plane perpendicular to the axis
        let d_perp = d - axis * d.dot(axis);
        let oc_perp = oc - axis * oc.dot(axis);

        let a = d_perp.norm_squared();
        if is_zero(a) {
            return hits;
        }
        let b = 2.0 * oc_perp.dot(&d_perp);
        let c = oc_perp.norm_squared() - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if is_zero(discriminant) {
            let t = -b / (2.0 * a);
            if is_valid_hit(t, max_distance) {
                hits.push(t);
            }
            return hits;
        }
        if discriminant < 0.0 {
            return hits;
        }

        let sqrt_discriminant = discriminant.sqrt();
        for t in [
            (-b - sqrt_discriminant) / (2.0 * a),
            (-b + sqrt_discriminant) / (2.0 * a),
        ] {
            if is_valid_hit(t, max_distance) {
                hits.push(t);
            }
        }
        hits
    }
}

/// Tube cut to a finite height along the axis and closed by two caps.
#[derive(Clone, Debug)]
pub struct Cylinder {
    tube: Tube,
    height: FloatType,
    base: Plane,
    top: Plane,
}

impl Cylinder {
    pub fn new(
        origin: WorldPoint,
        direction: WorldVector,
        radius: FloatType,
        height: FloatType,
    ) -> Result<Cylinder, GeometryError> {
        if !(height > 0.0) {
            return Err(GeometryError::NonPositiveHeight);
        }
        let tube = Tube::new(origin, direction, radius)?;
        let axis = tube.axis.direction;
        let base = Plane::new(origin, -axis.into_inner())?;
        let top = Plane::new(tube.axis.point_at(height), axis.into_inner())?;

        Ok(Cylinder {
            tube,
            height,
            base,
            top,
        })
    }

    pub fn height(&self) -> FloatType {
        self.height
    }

    /// Caps get their plane normal (pointing out of the cylinder), the rest is the tube normal.
    pub fn normal(&self, point: &WorldPoint) -> Unit<WorldVector> {
        let t = self.tube.axial_coordinate(point);
        if is_zero(t) {
            self.base.normal()
        } else if approx_eq(t, self.height) {
            self.top.normal()
        } else {
            self.tube.normal(point)
        }
    }

    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> HitDistances {
        let mut hits: HitDistances = self
            .tube
            .intersect(ray, max_distance)
            .into_iter()
            .filter(|&t| {
                let axial = self.tube.axial_coordinate(&ray.point_at(t));
                axial > EPSILON && axial < self.height - EPSILON
            })
            .collect();

        let radius_squared = self.tube.radius * self.tube.radius;
        for cap in [&self.base, &self.top] {
            if let Some(t) = cap.intersect(ray, max_distance) {
                if (ray.point_at(t) - cap.point()).norm_squared() < radius_squared - EPSILON {
                    hits.push(t);
                }
            }
        }

        hits.sort_by(|a, b| a.total_cmp(b));
        hits
    }

    pub fn bounding_box(&self) -> WorldBox {
        let axis = self.tube.axis.direction;
        // Half extent of the cap disc along each world axis
        let extent = axis.map(|a| self.tube.radius * (1.0 - a * a).max(0.0).sqrt());
        let a = self.base.point();
        let b = self.top.point();
        WorldBox::new(a.inf(b) - extent, a.sup(b) + extent)
    }
}
