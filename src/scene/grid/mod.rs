//! Uniform voxel grid over a set of surfaces.
//!
//! The grid divides the bounding box of all finite surfaces into `density^3`
//! equally sized voxels and stores in every voxel the surfaces whose bounding box
//! overlaps it. Surfaces without a finite bounding box (planes, tubes) are kept in
//! a separate bucket that is tested on every query.
//!
//! A grid borrows the surfaces it indexes and never changes after it is built,
//! so it can be shared by reference between render threads.

mod building;
mod printing;
mod traversal;

pub use building::{DEGENERATE_PADDING, MAX_DENSITY, VOXELS_PER_SURFACE, density_limit};
pub use printing::GridStatistics;

use indexmap::IndexMap;

use crate::geometry::{FloatType, WorldBox, WorldPoint, WorldVector};

use super::{Geometries, SurfaceIdx};

/// Integer coordinates of a voxel, each in `0..density`.
pub type VoxelIndex = nalgebra::Vector3<i32>;

#[derive(Clone, Debug)]
pub struct Grid<'g> {
    geometries: &'g Geometries,

    /// None if there are no finite surfaces
    layout: Option<Layout>,

    voxels: IndexMap<VoxelIndex, Vec<SurfaceIdx>>,
    infinite: Vec<SurfaceIdx>,
}

/// Placement of the voxels in the world.
#[derive(Copy, Clone, Debug)]
struct Layout {
    bounding_box: WorldBox,
    voxel_size: WorldVector,
    density: i32,
}

impl Layout {
    /// Voxel containing the point, points outside of the grid are clamped to the nearest voxel.
    fn voxel_of(&self, point: &WorldPoint) -> VoxelIndex {
        let relative = (point - self.bounding_box.min).component_div(&self.voxel_size);
        relative.map(|x| (x.floor() as i32).clamp(0, self.density - 1))
    }

    fn voxel_box(&self, voxel: &VoxelIndex) -> WorldBox {
        let min = self.bounding_box.min
            + voxel.map(|i| i as FloatType).component_mul(&self.voxel_size);
        WorldBox::new(min, min + self.voxel_size)
    }

    fn contains(&self, voxel: &VoxelIndex) -> bool {
        voxel.iter().all(|i| (0..self.density).contains(i))
    }
}

impl<'g> Grid<'g> {
    pub fn geometries(&self) -> &'g Geometries {
        self.geometries
    }

    /// Voxels per axis, zero if the grid has no finite surfaces.
    pub fn density(&self) -> u32 {
        self.layout.map_or(0, |l| l.density as u32)
    }

    /// Bounding box of the finite surfaces
    pub fn bounds(&self) -> Option<&WorldBox> {
        self.layout.as_ref().map(|l| &l.bounding_box)
    }

    pub fn voxel_size(&self) -> Option<WorldVector> {
        self.layout.map(|l| l.voxel_size)
    }

    pub fn voxel_of(&self, point: &WorldPoint) -> Option<VoxelIndex> {
        self.layout.map(|l| l.voxel_of(point))
    }

    pub fn voxel_box(&self, voxel: &VoxelIndex) -> Option<WorldBox> {
        self.layout
            .filter(|l| l.contains(voxel))
            .map(|l| l.voxel_box(voxel))
    }

    /// Surfaces stored in a voxel, None for empty voxels.
    pub fn bucket(&self, voxel: &VoxelIndex) -> Option<&[SurfaceIdx]> {
        self.voxels.get(voxel).map(Vec::as_slice)
    }

    /// Surfaces tested on every query.
    pub fn infinite_bucket(&self) -> &[SurfaceIdx] {
        &self.infinite
    }
}
