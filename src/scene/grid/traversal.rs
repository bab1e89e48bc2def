use indexmap::IndexSet;

use crate::{
    geometry::{FloatType, Ray, RayIntersectionExt as _, WorldBox, WorldVector, is_zero},
    scene::{Intersectable, Intersection, SurfaceIdx, closest},
};

use super::{Grid, Layout, VoxelIndex};

/// Voxels pierced by a ray, in the order the ray enters them (3D-DDA).
/// Yields each voxel together with the ray distance at which the ray leaves it.
#[derive(Clone, Debug)]
struct VoxelWalk {
    voxel: VoxelIndex,
    step: VoxelIndex,
    /// Ray distance of the next voxel boundary along each axis
    t_max: WorldVector,
    /// Ray distance between two boundaries along each axis
    t_delta: WorldVector,
    density: i32,
    max_distance: FloatType,
    finished: bool,
}

impl VoxelWalk {
    /// Starts at the voxel where the ray enters the grid (or the voxel of the origin, if inside).
    /// None if the ray misses the grid or enters it beyond `max_distance`.
    fn new(layout: &Layout, ray: &Ray, max_distance: FloatType) -> Option<VoxelWalk> {
        let (entry, _) = layout.bounding_box.intersect(ray)?;
        let entry = entry.max(0.0);
        if entry > max_distance {
            return None;
        }

        let voxel = layout.voxel_of(&ray.point_at(entry));
        let mut step = VoxelIndex::zeros();
        let mut t_max = WorldVector::repeat(FloatType::INFINITY);
        let mut t_delta = WorldVector::repeat(FloatType::INFINITY);

        for axis in 0..3 {
            let d = ray.direction[axis];
            if is_zero(d) {
                continue;
            }
            let size = layout.voxel_size[axis];
            let min = layout.bounding_box.min[axis];
            let boundary_index = if d > 0.0 {
                step[axis] = 1;
                voxel[axis] + 1
            } else {
                step[axis] = -1;
                voxel[axis]
            };
            let boundary = min + boundary_index as FloatType * size;
            t_max[axis] = (boundary - ray.origin[axis]) / d;
            t_delta[axis] = size / d.abs();
        }

        Some(VoxelWalk {
            voxel,
            step,
            t_max,
            t_delta,
            density: layout.density,
            max_distance,
            finished: false,
        })
    }

    /// Axis whose boundary is crossed first, ties go to x, then y, then z.
    fn next_axis(&self) -> usize {
        let t = &self.t_max;
        if t.x <= t.y && t.x <= t.z {
            0
        } else if t.y <= t.z {
            1
        } else {
            2
        }
    }
}

impl Iterator for VoxelWalk {
    type Item = (VoxelIndex, FloatType);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let current = self.voxel;
        let axis = self.next_axis();
        let exit = self.t_max[axis];

        if self.step[axis] == 0 || exit > self.max_distance {
            self.finished = true;
        } else {
            self.voxel[axis] += self.step[axis];
            self.t_max[axis] += self.t_delta[axis];
            if !(0..self.density).contains(&self.voxel[axis]) {
                self.finished = true;
            }
        }

        Some((current, exit))
    }
}

impl<'g> Grid<'g> {
    fn walk(&self, ray: &Ray, max_distance: FloatType) -> Option<VoxelWalk> {
        VoxelWalk::new(self.layout.as_ref()?, ray, max_distance)
    }

    /// Intersects every surface of the bucket that was not tested yet during this query.
    fn test_bucket(
        &self,
        bucket: &[SurfaceIdx],
        ray: &Ray,
        max_distance: FloatType,
        tested: &mut IndexSet<SurfaceIdx>,
        output: &mut Vec<Intersection<'g>>,
    ) {
        let geometries = self.geometries;
        for &index in bucket {
            if !tested.insert(index) {
                continue;
            }
            if let Some(hits) = geometries.get(index).intersections(ray, max_distance) {
                output.extend(hits);
            }
        }
    }

    /// Intersections along the ray, found by walking the voxels in ray order.
    ///
    /// With `collect_all` every hit within `max_distance` is returned, otherwise the walk stops
    /// at the first voxel that produced any hit. Unbounded surfaces are tested in both cases
    /// and their hits come last. Every surface is tested at most once per query.
    /// Returns None when nothing was hit.
    pub fn traverse(
        &self,
        ray: &Ray,
        max_distance: FloatType,
        collect_all: bool,
    ) -> Option<Vec<Intersection<'g>>> {
        let mut result = Vec::new();
        let mut tested = IndexSet::new();

        for (voxel, _) in self.walk(ray, max_distance).into_iter().flatten() {
            let Some(bucket) = self.voxels.get(&voxel) else {
                continue;
            };
            let before = result.len();
            self.test_bucket(bucket, ray, max_distance, &mut tested, &mut result);
            if !collect_all && result.len() > before {
                break;
            }
        }
        self.test_bucket(&self.infinite, ray, max_distance, &mut tested, &mut result);

        (!result.is_empty()).then_some(result)
    }

    /// Nearest intersection along the ray.
    /// The walk ends as soon as the best hit so far lies within the current voxel,
    /// no later voxel can contain anything closer.
    pub fn closest(&self, ray: &Ray, max_distance: FloatType) -> Option<Intersection<'g>> {
        let mut best: Option<Intersection<'g>> = None;
        let mut tested = IndexSet::new();
        let mut hits = Vec::new();

        for (voxel, exit) in self.walk(ray, max_distance).into_iter().flatten() {
            if let Some(bucket) = self.voxels.get(&voxel) {
                self.test_bucket(bucket, ray, max_distance, &mut tested, &mut hits);
                best = closest(best.into_iter().chain(hits.drain(..)));
            }
            if best.is_some_and(|b| b.distance <= exit) {
                break;
            }
        }
        self.test_bucket(&self.infinite, ray, max_distance, &mut tested, &mut hits);

        closest(best.into_iter().chain(hits))
    }
}

impl Intersectable for Grid<'_> {
    fn intersections<'a>(
        &'a self,
        ray: &Ray,
        max_distance: FloatType,
    ) -> Option<Vec<Intersection<'a>>> {
        self.traverse(ray, max_distance, true)
    }

    fn bounding_box(&self) -> WorldBox {
        if !self.infinite.is_empty() {
            WorldBox::infinite()
        } else {
            self.layout
                .map(|l| l.bounding_box)
                .unwrap_or_else(|| self.geometries.bounding_box())
        }
    }
}
