use std::fmt::Display;

use crate::util::Stats;

use super::Grid;

/// Occupancy summary of a built grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStatistics {
    pub density: u32,
    pub total_voxels: u64,
    pub filled_voxels: usize,
    /// Surfaces per non-empty voxel
    pub bucket_sizes: Stats,
    /// Sum of all bucket sizes, a surface counts once per voxel it is in
    pub references: usize,
    pub infinite_surfaces: usize,
}

impl Grid<'_> {
    pub fn statistics(&self) -> GridStatistics {
        let density = self.density();
        GridStatistics {
            density,
            total_voxels: u64::from(density).pow(3),
            filled_voxels: self.voxels.len(),
            bucket_sizes: self.voxels.values().map(Vec::len).collect(),
            references: self.voxels.values().map(Vec::len).sum(),
            infinite_surfaces: self.infinite.len(),
        }
    }

    pub fn print_statistics(&self) {
        let statistics = self.statistics();
        println!(
            "Voxels: {}^3, {} of {} filled",
            statistics.density, statistics.filled_voxels, statistics.total_voxels
        );
        println!("Bucket sizes: {}", statistics.bucket_sizes);
        println!("Surface references: {}", statistics.references);
        println!("Unbounded surfaces: {}", statistics.infinite_surfaces);
    }
}

impl Display for GridStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}^3 voxels, {} filled, buckets {}, {} unbounded surfaces",
            self.density, self.filled_voxels, self.bucket_sizes, self.infinite_surfaces
        )
    }
}

#[cfg(test)]
mod test {
    use std::num::NonZeroU32;

    use super::*;
    use crate::{
        geometry::WorldPoint,
        scene::{Geometries, Surface},
    };
    use assert2::assert;

    #[test]
    fn counts() {
        let geometries: Geometries = [
            Surface::sphere(WorldPoint::new(0.5, 0.5, 0.5), 0.4).unwrap(),
            Surface::sphere(WorldPoint::new(3.5, 3.5, 3.5), 0.4).unwrap(),
        ]
        .into_iter()
        .collect();
        let grid = Grid::build(&geometries, NonZeroU32::new(4).unwrap());
        let statistics = grid.statistics();

        assert!(statistics.density == 4);
        assert!(statistics.total_voxels == 64);
        assert!(statistics.filled_voxels == 2);
        assert!(statistics.references == 2);
        assert!(statistics.bucket_sizes.max == 1);
        assert!(statistics.infinite_surfaces == 0);
        assert!(statistics.to_string().starts_with("4^3 voxels, 2 filled"));
    }

    #[test]
    fn empty_grid() {
        let geometries = Geometries::new();
        let grid = Grid::build(&geometries, NonZeroU32::MIN);
        let statistics = grid.statistics();
        assert!(statistics.total_voxels == 0);
        assert!(statistics.bucket_sizes.count == 0);
    }
}
