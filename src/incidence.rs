//! The per-segment light-incidence engine.
//!
//! For each energy-deposit segment the engine finds the visibility-table
//! voxel containing it, and folds that voxel's entries into the caller's
//! response buffers: photon counts accumulate additively, earliest-arrival
//! times only ever decrease. Segments are processed in parallel; each one
//! owns its own output row, so no synchronization is needed.

use ndarray::{Array2, ArrayView1, Zip};

use units::cm;
use units::todo::{Energyf32, Lengthf32, Timef32};

use crate::Point3;
use crate::config::Detector;
use crate::error::Error;
use crate::frame::{detector_half, to_lut_frame};
use crate::lut::LutTable;

/// Value marking a channel no photon has reached.
///
/// Downstream consumers of the time table read this exact value as "no
/// signal", so it is part of the output format.
pub const T0_SENTINEL: Timef32 = 20.0;

/// One energy-deposit segment, with its midpoint in detector coordinates
/// (cm).
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(nonstandard_style)]
pub struct Segment {
    pub x: Lengthf32,
    pub y: Lengthf32,
    pub z: Lengthf32,
    pub dE: Energyf32,
}

/// Per-segment, per-channel output of the engine.
///
/// Rows are segments. There are `2 * n_op_channels` columns: the first half
/// stores channels seen from detector half 0, the second half those seen
/// from half 1.
pub struct LightResponse {
    pub n_photons_det: Array2<f32>,
    pub t0_det: Array2<f32>,
}

impl LightResponse {
    pub fn new(n_segments: usize, detector: &Detector) -> Self {
        let shape = (n_segments, 2 * detector.n_op_channels as usize);
        Self {
            n_photons_det: Array2::zeros(shape),
            t0_det: Array2::from_elem(shape, T0_SENTINEL),
        }
    }
}

/// Fold the light produced by `segments` into `response`.
///
/// `n_photons[i]` is the number of photons produced by `segments[i]`.
/// `progress` is called once per completed segment with the segment's row
/// index; rows complete in arbitrary order.
///
/// Running the engine twice over the same buffers doubles the photon counts
/// and leaves each `t0` at the minimum across both runs.
pub fn calculate_light_incidence(
    lut: &LutTable,
    detector: &Detector,
    segments: &[Segment],
    n_photons: &[f32],
    response: &mut LightResponse,
    progress: impl Fn(usize) + Sync,
) -> Result<(), Error> {
    detector.validate(lut)?;
    if segments.len() != n_photons.len() {
        return Err(Error::Config(format!(
            "{} segments but {} produced-photon counts", segments.len(), n_photons.len())));
    }
    let shape = (segments.len(), 2 * detector.n_op_channels as usize);
    if response.n_photons_det.dim() != shape || response.t0_det.dim() != shape {
        return Err(Error::Config(format!(
            "response buffers have shape {:?}, expected {:?}",
            response.n_photons_det.dim(), shape)));
    }

    Zip::indexed(response.n_photons_det.rows_mut())
        .and(response.t0_det.rows_mut())
        .and(ArrayView1::from(segments))
        .and(ArrayView1::from(n_photons))
        .par_for_each(|row, mut photons, mut t0, segment, &n_produced| {
            // Table-frame axis order is (z, y, x); segment positions are cm,
            // everything downstream is mm.
            let pos: Point3 = [cm(segment.z), cm(segment.y), cm(segment.x)];
            let half = detector_half(pos, detector);
            let lut_pos = to_lut_frame(pos, lut.geometry(), detector);
            let voxel = lut.geometry().voxel_index(lut_pos);
            for entry in lut.entries_for_voxel(voxel) {
                let mut channel = entry.op_channel;
                if half == 1 {
                    channel = (channel + detector.half_channels()) % detector.n_op_channels;
                }
                let mut n_photons_read = entry.visibility * n_produced;
                if channel % 12 > 5 {
                    n_photons_read *= detector.lcm_acl_norm;
                }
                // Channels seen from half 1 are stored in the second half of
                // the row, on top of the mirroring above.
                if half == 1 {
                    channel += detector.half_channels();
                }
                let channel = channel as usize;
                photons[channel] += n_photons_read;
                if entry.t1 < t0[channel] {
                    t0[channel] = entry.t1;
                }
            }
            progress(row);
        });
    Ok(())
}
