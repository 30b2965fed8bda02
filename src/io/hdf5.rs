//! Reading and writing the HDF5 tables used by the light-incidence pipeline

use std::path::Path;

use ndarray::{s, Array1};

use units::mm;

use crate::error::Error;
use crate::incidence::{LightResponse, Segment};
use crate::lut::{LutEntry, LutGeometry, LutTable};

/// Optional row bounds for partial table reads: `min` inclusive, `max`
/// exclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Bounds<T> {
    pub fn none() -> Self { Self { min: None, max: None } }
}

impl<T> From<std::ops::Range<T>> for Bounds<T> {
    fn from(r: std::ops::Range<T>) -> Self {
        Self { min: Some(r.start), max: Some(r.end) }
    }
}

pub fn read_table<T: hdf5::H5Type>(filename: &dyn AsRef<Path>, dataset: &str, events: Bounds<usize>) -> hdf5::Result<Array1<T>> {
    let file = ::hdf5::File::open(filename)?;
    let dataset = file.dataset(dataset)?;
    let Bounds { min, max } = events;
    let data = match (min, max) {
        (None    , None    ) => dataset.read_slice_1d::<T,_>(s![  ..  ])?,
        (Some(lo), None    ) => dataset.read_slice_1d::<T,_>(s![lo..  ])?,
        (None    , Some(hi)) => dataset.read_slice_1d::<T,_>(s![  ..hi])?,
        (Some(lo), Some(hi)) => dataset.read_slice_1d::<T,_>(s![lo..hi])?,
     };
    Ok(data)
}

// --------------------------------------------------------------------------------

/// On-disk form of the visibility-grid geometry: a single record with one
/// array field per grid property.
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct Hdf5LutGeometry {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub n_divisions: [u32; 3],
}

/// On-disk form of one visibility record.
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
pub struct Hdf5LutEntry {
    pub voxel: i64,
    pub op_channel: u32,
    pub visibility: f32,
    pub t1: f32,
}

/// Load a visibility table: the `geometry` dataset holds a single
/// `Hdf5LutGeometry` record, the `visibility` dataset the flat entry list.
pub fn load_lut(filename: &dyn AsRef<Path>) -> Result<LutTable, Error> {
    let geometry = read_table::<Hdf5LutGeometry>(filename, "geometry", Bounds::none())?;
    let geometry = geometry.first()
        .ok_or_else(|| Error::Load("visibility table has no geometry record".into()))?;
    let geometry = LutGeometry::new(
        geometry.min.map(mm),
        geometry.max.map(mm),
        geometry.n_divisions.map(|n| n as usize),
    )?;
    let records = read_table::<Hdf5LutEntry>(filename, "visibility", Bounds::none())?;
    Ok(LutTable::new(geometry, records.iter().map(|r| {
        (r.voxel, LutEntry { op_channel: r.op_channel, visibility: r.visibility, t1: r.t1 })
    })))
}

// --------------------------------------------------------------------------------

/// On-disk form of one energy-deposit segment. Positions are the segment
/// midpoints, in cm.
#[derive(hdf5::H5Type, Clone, PartialEq, Debug)]
#[repr(C)]
#[allow(nonstandard_style)]
pub struct Hdf5Segment {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub dE: f32,
}

impl From<Hdf5Segment> for Segment {
    fn from(s: Hdf5Segment) -> Self {
        let Hdf5Segment { x, y, z, dE } = s;
        Self { x, y, z, dE }
    }
}

pub fn read_segments(filename: &dyn AsRef<Path>, dataset: &str, events: Bounds<usize>) -> Result<Vec<Segment>, Error> {
    Ok(read_table::<Hdf5Segment>(filename, dataset, events)?
       .iter().cloned()
       .map(Segment::from)
       .collect())
}

/// Per-segment produced-photon counts, stored as a plain `f32` dataset.
pub fn read_produced_photons(filename: &dyn AsRef<Path>, dataset: &str, events: Bounds<usize>) -> Result<Vec<f32>, Error> {
    Ok(read_table::<f32>(filename, dataset, events)?.to_vec())
}

// --------------------------------------------------------------------------------

/// Write the engine output as two 2-d datasets under the `light` group.
pub fn write_response(filename: &dyn AsRef<Path>, response: &LightResponse) -> hdf5::Result<()> {
    let file = hdf5::File::create(filename)?;
    let group = file.create_group("light")?;
    group.new_dataset_builder().with_data(&response.n_photons_det).create("n_photons_det")?;
    group.new_dataset_builder().with_data(&response.t0_det      ).create("t0_det"       )?;
    Ok(())
}

// ----- TESTS ------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    fn example_geometry() -> Hdf5LutGeometry {
        Hdf5LutGeometry {
            min: [-100.0; 3],
            max: [ 100.0; 3],
            n_divisions: [2; 3],
        }
    }

    fn write_lut_file(path: &Path, geometry: &Hdf5LutGeometry, entries: &[Hdf5LutEntry]) -> hdf5::Result<()> {
        let file = hdf5::File::create(path)?;
        file.new_dataset_builder().with_data(std::slice::from_ref(geometry)).create("geometry")?;
        file.new_dataset_builder().with_data(entries).create("visibility")?;
        Ok(())
    }

    #[test]
    fn lut_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let entries = vec![
            Hdf5LutEntry { voxel: 0, op_channel: 0, visibility: 0.5 , t1: 4.0 },
            Hdf5LutEntry { voxel: 3, op_channel: 7, visibility: 0.125, t1: 9.0 },
            Hdf5LutEntry { voxel: 0, op_channel: 6, visibility: 0.25, t1: 2.0 },
        ];

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("lut.h5");
        write_lut_file(&path, &example_geometry(), &entries)?;

        let lut = load_lut(&path)?;
        assert_eq!(lut.geometry().n_div, [2, 2, 2]);
        assert_eq!(lut.n_entries(), 3);
        assert_eq!(lut.entries_for_voxel(0).len(), 2);
        assert_eq!(lut.entries_for_voxel(3).len(), 1);
        assert!   (lut.entries_for_voxel(1).is_empty());
        Ok(())
    }

    #[test]
    fn missing_geometry_record_is_a_load_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.h5");
        {
            let file = hdf5::File::create(&path)?;
            let empty: Vec<Hdf5LutGeometry> = vec![];
            file.new_dataset_builder().with_data(&empty).create("geometry")?;
            let no_entries: Vec<Hdf5LutEntry> = vec![];
            file.new_dataset_builder().with_data(&no_entries).create("visibility")?;
        }
        assert!(matches!(load_lut(&path), Err(Error::Load(_))));
        Ok(())
    }

    #[test]
    fn segment_roundtrip_with_bounds() -> Result<(), Box<dyn std::error::Error>> {
        let segments = vec![
            Hdf5Segment { x: -5.0, y: -27.0, z:  5.0, dE: 1.25 },
            Hdf5Segment { x:  1.0, y:   2.0, z:  3.0, dE: 0.5  },
            Hdf5Segment { x: -9.0, y:   0.0, z: 35.0, dE: 2.0  },
        ];

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("segments.h5");
        {
            hdf5::File::create(&path)?
                .new_dataset_builder()
                .with_data(&segments)
                .create("segments")?;
        }

        let all = read_segments(&path, "segments", Bounds::none())?;
        assert_eq!(all.len(), 3);
        assert_eq!(all[1], Segment { x: 1.0, y: 2.0, z: 3.0, dE: 0.5 });

        let tail = read_segments(&path, "segments", Bounds::from(1..3))?;
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0], all[1]);
        Ok(())
    }

    #[test]
    fn produced_photons_are_a_plain_dataset() -> Result<(), Box<dyn std::error::Error>> {
        let photons = vec![200.0_f32, 10.0, 0.0];
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("photons.h5");
        {
            hdf5::File::create(&path)?
                .new_dataset_builder()
                .with_data(&photons)
                .create("n_photons")?;
        }
        assert_eq!(read_produced_photons(&path, "n_photons", Bounds::none())?, photons);
        Ok(())
    }
}
