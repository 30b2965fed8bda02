pub use units::{Length, Ratio, Time};
pub use units::todo::{Energyf32, Lengthf32, Ratiof32, Timef32};

pub use crate::error::Error;
pub use crate::index::{index1_to_3, index3_to_1};

/// A position in the detector or table frame, in that frame's axis order.
pub type Point3 = [Length; 3];
