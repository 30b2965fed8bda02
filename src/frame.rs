//! Translation between detector coordinates and the visibility-table frame.
//!
//! Table-frame positions are ordered `(z, y, x)` with respect to the
//! detector frame; callers perform that permutation when they assemble a
//! position, and everything here operates on the permuted ordering. Beyond
//! the permutation, the table origin is offset from the detector origin by
//! the table minimum along the first axis and by the cathode clearance along
//! the second.

use units::ratio_;

use crate::config::Detector;
use crate::lut::LutGeometry;
use crate::Point3;

/// Which half of the detector a (permuted) position falls in.
///
/// The two halves are mirror images; the visibility table covers only half
/// 0, and hits in half 1 are looked up through the mirror.
pub fn detector_half(pos: Point3, detector: &Detector) -> u8 {
    let half_module = detector.module_width / 2.0;
    let tpc = ratio_(pos[0] / half_module).floor()
        + detector.n_modules as f32 / 2.0 * detector.n_tpc_per_module as f32;
    // 0 or 1 even for positions before the first module
    (tpc as i64).rem_euclid(2) as u8
}

/// Translate a (permuted) detector position into the table frame.
pub fn to_lut_frame(pos: Point3, geometry: &LutGeometry, detector: &Detector) -> Point3 {
    [pos[0] + geometry.min[0],
     pos[1] + detector.cathode_offset,
     pos[2]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Detector;
    use float_eq::assert_float_eq;
    use proptest::prelude::*;
    use rstest::rstest;
    use units::{mm, mm_};

    fn detector() -> Detector {
        Detector {
            n_op_channels: 96,
            module_width: mm(620.0),
            n_modules: 2,
            n_tpc_per_module: 2,
            lcm_acl_norm: 0.5,
            cathode_offset: mm(220.0),
        }
    }

    #[rstest(/**/ pos0  , expected,
             case(  50.0, 0),
             case( 350.0, 1),
             case( -50.0, 1),
             case(-350.0, 0),
             case( 620.0, 0),
             case(   0.0, 0),
    )]
    fn halves_alternate_along_the_first_axis(pos0: f32, expected: u8) {
        let pos = [mm(pos0), mm(0.0), mm(0.0)];
        assert_eq!(detector_half(pos, &detector()), expected);
    }

    #[test]
    fn table_frame_shifts_first_two_axes() {
        let geometry = crate::lut::LutGeometry::new(
            [mm(-100.0); 3], [mm(100.0); 3], [2, 2, 2],
        ).unwrap();
        let shifted = to_lut_frame([mm(50.0), mm(-270.0), mm(-50.0)], &geometry, &detector());
        assert_float_eq!(shifted.map(mm_), [-50.0, -50.0, -50.0], abs_all <= 1e-4);
    }

    proptest! {
        #[test]
        fn half_is_always_zero_or_one(pos0 in -10_000.0_f32..10_000.0) {
            let pos = [mm(pos0), mm(0.0), mm(0.0)];
            prop_assert!(detector_half(pos, &detector()) <= 1);
        }
    }
}
