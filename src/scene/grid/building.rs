use std::num::NonZeroU32;

use indexmap::IndexMap;
use itertools::iproduct;

use crate::{
    geometry::{FloatType, WorldBox, WorldPoint, WorldVector, is_zero},
    scene::{Geometries, Intersectable as _, SurfaceIdx},
};

use super::{Grid, Layout, VoxelIndex};

/// Half thickness given to grid axes along which all finite surfaces are flat.
pub const DEGENERATE_PADDING: FloatType = 1e-6;

/// Upper limit of voxels per axis.
pub const MAX_DENSITY: u32 = 256;

/// Voxel budget per finite surface, limits the grid size for small scenes.
pub const VOXELS_PER_SURFACE: u64 = 512;

impl<'g> Grid<'g> {
    /// Builds the grid with `density` voxels along each axis.
    /// Every finite surface is stored in all voxels its bounding box overlaps.
    ///
    /// The density is lowered to `density_limit` of the number of finite surfaces,
    /// so that the voxel count stays proportional to the scene.
    pub fn build(geometries: &'g Geometries, density: NonZeroU32) -> Grid<'g> {
        let mut finite = Vec::new();
        let mut infinite = Vec::new();
        for (index, surface) in geometries.iter_enumerated() {
            let bounding_box = surface.bounding_box();
            if bounding_box.is_finite() {
                finite.push((index, bounding_box));
            } else {
                infinite.push(index);
            }
        }

        let limit = density_limit(finite.len());
        let density = if density.get() > limit {
            log::warn!(
                "Grid density {density} is too large for {} surfaces, using {limit}",
                finite.len()
            );
            limit
        } else {
            density.get()
        };

        let layout = finite
            .iter()
            .map(|(_, b)| *b)
            .reduce(|a, b| a.union(&b))
            .map(|bounding_box| Layout::new(pad_degenerate(bounding_box), density));

        let mut voxels: IndexMap<VoxelIndex, Vec<SurfaceIdx>> = IndexMap::new();
        if let Some(layout) = &layout {
            for (index, bounding_box) in &finite {
                let low = layout.voxel_of(&bounding_box.min);
                let high = layout.voxel_of(&bounding_box.max);
                for (x, y, z) in iproduct!(low.x..=high.x, low.y..=high.y, low.z..=high.z) {
                    voxels
                        .entry(VoxelIndex::new(x, y, z))
                        .or_default()
                        .push(*index);
                }
            }
        }

        let grid = Grid {
            geometries,
            layout,
            voxels,
            infinite,
        };
        log::info!("Built grid: {}", grid.statistics());
        grid
    }
}

impl Layout {
    fn new(bounding_box: WorldBox, density: u32) -> Layout {
        Layout {
            voxel_size: bounding_box.size() / density as FloatType,
            bounding_box,
            density: density as i32,
        }
    }
}

/// Highest density allowed for a grid over `finite_surfaces` bounded surfaces:
/// the largest `d` with `d^3 <= finite_surfaces * VOXELS_PER_SURFACE`, at most `MAX_DENSITY`.
pub fn density_limit(finite_surfaces: usize) -> u32 {
    let budget = (finite_surfaces.max(1) as u64).saturating_mul(VOXELS_PER_SURFACE);
    let mut limit = ((budget as FloatType).cbrt() as u32).min(MAX_DENSITY);
    while limit > 1 && u64::from(limit).pow(3) > budget {
        limit -= 1;
    }
    while limit < MAX_DENSITY && u64::from(limit + 1).pow(3) <= budget {
        limit += 1;
    }
    limit.max(1)
}

/// Gives some thickness to axes where the box is flat, so that voxels never have zero size.
fn pad_degenerate(bounding_box: WorldBox) -> WorldBox {
    let size = bounding_box.size();
    let padding = size.map(|s| if is_zero(s) { DEGENERATE_PADDING } else { 0.0 });
    WorldBox::new(
        WorldPoint::from(bounding_box.min.coords - padding),
        WorldPoint::from(bounding_box.max.coords + padding),
    )
}
