use nalgebra::Unit;

use crate::geometry::{
    EPSILON, FloatType, GeometryError, Ray, WorldBox, WorldPoint, WorldVector, checked_sub,
};

use super::Plane;

/// Convex planar polygon, vertices ordered along its edge.
#[derive(Clone, Debug)]
pub struct Polygon {
    vertices: Vec<WorldPoint>,
    plane: Plane,
}

impl Polygon {
    /// Validates that the vertices form a convex, consistently ordered, planar polygon
    /// without duplicate vertices or collinear consecutive edges.
    pub fn new(vertices: Vec<WorldPoint>) -> Result<Polygon, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }

        let plane = Plane::from_points(vertices[0], vertices[1], vertices[2])?;
        let normal = plane.normal();

        if vertices.len() > 3 {
            for v in &vertices[3..] {
                // Relative to the distance from the first vertex, so that the scale doesn't matter
                let reach = (v - vertices[0]).norm();
                if plane.signed_distance(v).abs() > EPSILON * reach {
                    return Err(GeometryError::NotCoplanar);
                }
            }
        }

        let n = vertices.len();
        let edges = (0..n)
            .map(|i| {
                checked_sub(&vertices[(i + 1) % n], &vertices[i])
                    .map_err(|_| GeometryError::CoincidentPoints)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Every turn between consecutive edges must go the same way around the normal
        for i in 0..n {
            let turn = edges[i].cross(&edges[(i + 1) % n]);
            let direction = turn.dot(&normal);
            if direction.abs() < EPSILON * edges[i].norm() * edges[(i + 1) % n].norm() {
                return Err(GeometryError::Collinear);
            }
            if direction < 0.0 {
                return Err(GeometryError::NotConvex);
            }
        }

        Ok(Polygon { vertices, plane })
    }

    pub fn triangle(a: WorldPoint, b: WorldPoint, c: WorldPoint) -> Result<Polygon, GeometryError> {
        Polygon::new(vec![a, b, c])
    }

    pub fn normal(&self) -> Unit<WorldVector> {
        self.plane.normal()
    }

    /// Ray / polygon intersection.
    /// The ray must cross the plane strictly inside the polygon, hits on edges and vertices
    /// don't count, so that neighboring polygons are not hit twice.
    pub fn intersect(&self, ray: &Ray, max_distance: FloatType) -> Option<FloatType> {
        let t = self.plane.intersect(ray, max_distance)?;

        // Each edge together with the ray origin spans a side plane of a pyramid,
        // the ray must be on the inner side of all of them.
        let n = self.vertices.len();
        let mut sign = 0.0;
        for i in 0..n {
            let a = self.vertices[i] - ray.origin;
            let b = self.vertices[(i + 1) % n] - ray.origin;
            let side_normal = Unit::try_new(a.cross(&b), EPSILON)?;
            let side = ray.direction.dot(&side_normal);

            if side.abs() < EPSILON {
                return None;
            }
            if sign == 0.0 {
                sign = side.signum();
            } else if side.signum() != sign {
                return None;
            }
        }

        Some(t)
    }

    pub fn bounding_box(&self) -> WorldBox {
        WorldBox::from_points(&self.vertices).unwrap_or_else(|| {
            unreachable!("Polygon always has at least three vertices")
        })
    }
}
