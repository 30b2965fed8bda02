//! Track-to-voxel energy histogramming.
//!
//! Each track is sampled at a fixed spacing along its trajectory, with the
//! track's energy spread evenly over the samples; samples are then binned on
//! a uniform grid. The error of the result scales like the ratio of grid
//! density to sample density.

use std::collections::HashMap;

use units::{mm, ratio_};
use units::todo::Energyf32;

use crate::Length;
use crate::Point3;
use crate::error::Error;
use crate::index::index3_to_1;

/// A uniform binning grid, typically a bit wider than the volume in which
/// the tracks were generated.
#[derive(Clone, Copy, Debug)]
pub struct VoxelGrid {
    pub min: Point3,
    pub spacing: [Length; 3],
    pub n_vox: [usize; 3],
}

impl VoxelGrid {
    pub fn new(min: Point3, max: Point3, spacing: [Length; 3]) -> Result<Self, Error> {
        let mut n_vox = [0; 3];
        for axis in 0..3 {
            if !(spacing[axis] > mm(0.0)) {
                return Err(Error::Config(format!("grid axis {} has non-positive spacing", axis)));
            }
            if max[axis] <= min[axis] {
                return Err(Error::Config(format!("grid axis {} has empty extent", axis)));
            }
            n_vox[axis] = ratio_((max[axis] - min[axis]) / spacing[axis]) as usize;
        }
        Ok(Self { min, spacing, n_vox })
    }

    fn voxel_index(&self, pos: Point3) -> Option<usize> {
        let mut i3 = [0; 3];
        for axis in 0..3 {
            let i = ratio_((pos[axis] - self.min[axis]) / self.spacing[axis]).floor();
            if i < 0.0 || i >= self.n_vox[axis] as f32 { return None; }
            i3[axis] = i as usize;
        }
        Some(index3_to_1(i3, self.n_vox))
    }

    fn voxel_centre(&self, index: usize) -> Point3 {
        let i3 = crate::index::index1_to_3(index, self.n_vox);
        let mut centre = self.min;
        for axis in 0..3 {
            centre[axis] = self.min[axis] + (i3[axis] as f32 + 0.5) * self.spacing[axis];
        }
        centre
    }
}

/// One track with its endpoints, total energy and path length.
#[derive(Clone, Copy, Debug)]
#[allow(nonstandard_style)]
pub struct Track {
    pub start: Point3,
    pub end: Point3,
    pub dE: Energyf32,
    pub dx: Length,
}

/// Histogram the energy of `tracks` onto `grid`.
///
/// Returns the centres of the occupied voxels and the energy collected in
/// each. Samples falling outside the grid are dropped. Tracks too short to
/// produce a single sample contribute nothing.
pub fn voxelize(grid: &VoxelGrid, tracks: &[Track], samples_per_mm: f32)
                -> (Vec<Point3>, Vec<Energyf32>)
{
    let mut content = HashMap::new();
    for track in tracks {
        let n_samples = (units::mm_(track.dx) * samples_per_mm) as usize;
        if n_samples == 0 { continue; }
        let weight = track.dE / n_samples as f32;
        for s in 0..n_samples {
            let t = if n_samples == 1 { 0.0 } else { s as f32 / (n_samples - 1) as f32 };
            let mut pos = track.start;
            for axis in 0..3 {
                pos[axis] = track.start[axis] + t * (track.end[axis] - track.start[axis]);
            }
            if let Some(index) = grid.voxel_index(pos) {
                *content.entry(index).or_insert(0.0) += weight;
            }
        }
    }
    let mut occupied: Vec<_> = content.into_iter().collect();
    occupied.sort_by_key(|&(index, _)| index);
    occupied.into_iter()
            .map(|(index, energy)| (grid.voxel_centre(index), energy))
            .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use units::{mm, mm_};

    fn grid() -> VoxelGrid {
        VoxelGrid::new([mm(0.0); 3], [mm(10.0); 3], [mm(1.0); 3]).unwrap()
    }

    fn track(start: [f32; 3], end: [f32; 3], energy: f32, dx: f32) -> Track {
        Track { start: start.map(mm), end: end.map(mm), dE: energy, dx: mm(dx) }
    }

    #[test]
    fn energy_is_conserved_for_contained_tracks() {
        let tracks = [
            track([1.2, 1.2, 1.2], [8.3, 2.7, 6.1], 4.5, 7.9),
            track([0.5, 9.1, 3.3], [4.4, 0.8, 8.8], 1.25, 10.6),
        ];
        let (_, energies) = voxelize(&grid(), &tracks, 100.0);
        let total: f32 = energies.iter().sum();
        assert_float_eq!(total, 4.5 + 1.25, r2nd <= 1e-4);
    }

    #[test]
    fn short_track_fills_exactly_one_voxel() {
        let tracks = [track([3.2, 4.2, 5.2], [3.4, 4.2, 5.2], 2.0, 0.2)];
        let (centres, energies) = voxelize(&grid(), &tracks, 100.0);
        assert_eq!(centres.len(), 1);
        assert_float_eq!(centres[0].map(mm_), [3.5, 4.5, 5.5], abs_all <= 1e-5);
        assert_float_eq!(energies[0], 2.0, r2nd <= 1e-5);
    }

    #[test]
    fn samples_outside_the_grid_are_dropped() {
        let tracks = [track([-5.0, 5.0, 5.0], [-1.0, 5.0, 5.0], 3.0, 4.0)];
        let (centres, energies) = voxelize(&grid(), &tracks, 100.0);
        assert!(centres.is_empty());
        assert!(energies.is_empty());
    }

    #[test]
    fn too_short_tracks_contribute_nothing() {
        let tracks = [track([5.0, 5.0, 5.0], [5.0, 5.0, 5.0], 3.0, 0.0)];
        let (centres, _) = voxelize(&grid(), &tracks, 100.0);
        assert!(centres.is_empty());
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        assert!(VoxelGrid::new([mm(0.0); 3], [mm(0.0); 3], [mm(1.0); 3]).is_err());
        assert!(VoxelGrid::new([mm(0.0); 3], [mm(10.0); 3], [mm(0.0); 3]).is_err());
    }
}
