//! In-memory form of the photon visibility table.
//!
//! On disk the table is a flat list of `(voxel, channel, visibility, t1)`
//! records. Lookups during processing are per-voxel, so the records are
//! grouped by voxel once, at construction time.

use std::collections::HashMap;

use itertools::Itertools;

use units::todo::{Ratiof32, Timef32};

use crate::error::Error;
use crate::index::index3_to_1;
use crate::Point3;

/// The uniform voxel grid over which photon visibilities were tabulated.
///
/// The grid is centred on the origin of the table frame (`min = -max`), with
/// an even number of divisions along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LutGeometry {
    pub min: Point3,
    pub max: Point3,
    pub n_div: [usize; 3],
}

impl LutGeometry {
    pub fn new(min: Point3, max: Point3, n_div: [usize; 3]) -> Result<Self, Error> {
        for axis in 0..3 {
            if n_div[axis] == 0 {
                return Err(Error::Config(format!("visibility grid axis {} has no divisions", axis)));
            }
            if max[axis] <= min[axis] {
                return Err(Error::Config(format!("visibility grid axis {} has empty extent", axis)));
            }
        }
        Ok(Self { min, max, n_div })
    }

    pub fn n_voxels(&self) -> usize { self.n_div.iter().product() }

    /// Linearized index of the voxel containing `pos` (a table-frame
    /// position).
    ///
    /// Positions outside the envelope produce indices matching no voxel,
    /// possibly negative; such an index is only good for a (missing) lookup.
    pub fn voxel_index(&self, pos: Point3) -> i64 {
        let mut i3 = [0_i64; 3];
        for axis in 0..3 {
            let width = self.max[axis] - self.min[axis];
            let n = self.n_div[axis] as i64;
            i3[axis] = (units::ratio_(pos[axis] / width) * n as f32).floor() as i64 + n / 2;
        }
        index3_to_1(i3, self.n_div.map(|n| n as i64))
    }
}

/// One record of the visibility table: the fraction of photons produced in
/// some voxel that reach `op_channel`, and the travel time of the fastest
/// ones.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LutEntry {
    pub op_channel: u32,
    pub visibility: Ratiof32,
    pub t1: Timef32,
}

/// The visibility table: grid geometry plus per-voxel entry lists.
#[derive(Clone, Debug)]
pub struct LutTable {
    geometry: LutGeometry,
    entries: HashMap<i64, Vec<LutEntry>>,
}

impl LutTable {
    pub fn new(geometry: LutGeometry, entries: impl IntoIterator<Item = (i64, LutEntry)>) -> Self {
        let entries = entries.into_iter().into_group_map();
        Self { geometry, entries }
    }

    pub fn geometry(&self) -> &LutGeometry { &self.geometry }

    /// All entries recorded for `voxel`; empty when the voxel has none, or
    /// when the index does not name a voxel at all.
    pub fn entries_for_voxel(&self, voxel: i64) -> &[LutEntry] {
        self.entries.get(&voxel).map_or(&[], Vec::as_slice)
    }

    pub fn n_entries(&self) -> usize { self.entries.values().map(Vec::len).sum() }

    pub fn max_op_channel(&self) -> Option<u32> {
        self.entries.values().flatten().map(|e| e.op_channel).max()
    }
}
