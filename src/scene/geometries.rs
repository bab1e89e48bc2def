use index_vec::IndexVec;

use crate::geometry::{FloatType, Ray, WorldBox, WorldPoint};

use super::{Intersectable, Intersection, Surface};

index_vec::define_index_type! {
    pub struct SurfaceIdx = u32;
}

/// Flat collection of surfaces, tested one by one.
#[derive(Clone, Debug, Default)]
pub struct Geometries {
    surfaces: IndexVec<SurfaceIdx, Surface>,
}

impl Geometries {
    pub fn new() -> Geometries {
        Geometries::default()
    }

    pub fn add(&mut self, surface: Surface) -> SurfaceIdx {
        self.surfaces.push(surface)
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    pub fn get(&self, index: SurfaceIdx) -> &Surface {
        &self.surfaces[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.iter()
    }

    pub fn iter_enumerated(&self) -> impl Iterator<Item = (SurfaceIdx, &Surface)> {
        self.surfaces.iter_enumerated()
    }
}

impl Extend<Surface> for Geometries {
    fn extend<T: IntoIterator<Item = Surface>>(&mut self, iter: T) {
        self.surfaces.extend(iter);
    }
}

impl FromIterator<Surface> for Geometries {
    fn from_iter<T: IntoIterator<Item = Surface>>(iter: T) -> Self {
        Geometries {
            surfaces: iter.into_iter().collect(),
        }
    }
}

impl Intersectable for Geometries {
    /// Intersections of all members in insertion order, None if nothing was hit.
    fn intersections<'a>(
        &'a self,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Option<Vec<Intersection<'a>>> {
        let mut result: Option<Vec<Intersection<'a>>> = None;
        for surface in self.surfaces.iter() {
            if let Some(hits) = surface.intersections(ray, max_distance) {
                result.get_or_insert_with(Vec::new).extend(hits);
            }
        }
        result
    }

    /// Bounding box of all members, infinite if any member is unbounded.
    /// An empty collection has a degenerate box at the origin.
    fn bounding_box(&self) -> WorldBox {
        self.surfaces
            .iter()
            .map(|s| s.bounding_box())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| WorldBox::new(WorldPoint::origin(), WorldPoint::origin()))
    }
}
