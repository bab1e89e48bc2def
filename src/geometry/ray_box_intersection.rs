use crate::geometry::{EPSILON, FloatType, Ray, WorldBox, is_zero};

pub trait RayIntersectionExt {
    /// Calculate first and last ray intersection with the box.
    fn intersect(&self, ray: &Ray) -> Option<(FloatType, FloatType)>;
}

impl RayIntersectionExt for WorldBox {
    /// Calculates ray intersection with the box using the slab method.
    /// Returns minimum and maximum distance along the ray, or None if the ray misses.
    /// The minimum distance is negative if the ray starts inside the box.
    /// Box boundaries count as inside.
    /// Axes where the direction is zero only constrain the origin.
    fn intersect(&self, ray: &Ray) -> Option<(FloatType, FloatType)> {
        let mut min_t = FloatType::NEG_INFINITY;
        let mut max_t = FloatType::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];

            if is_zero(ray.direction[axis]) {
                // Parallel to the slab, the axis doesn't constrain the distance,
                // but the origin has to be between the bounding planes.
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv_direction = ray.inv_direction[axis];
            let to_box_min = (self.min[axis] - origin) * inv_direction;
            let to_box_max = (self.max[axis] - origin) * inv_direction;

            min_t = min_t.max(to_box_min.min(to_box_max));
            max_t = max_t.min(to_box_min.max(to_box_max));
        }

        // Grazing rays get a bit of slack, so that rounding doesn't drop them
        if min_t > max_t + EPSILON || max_t < -EPSILON {
            None
        } else {
            Some((min_t, max_t))
        }
    }
}
