//! Configuration file parser for the detector description

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};

use units::{mm, Length};
use units::todo::Ratiof32;

use crate::error::Error;
use crate::lut::LutTable;

// TOML understands very few types, so quantities-with-units (`"620 mm"`)
// arrive as strings and are handed to the `uom` parsers.
fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    <&str>::deserialize(deserializer)?
        .parse()
        .map_err(de::Error::custom)
}

/// Static description of the detector layout and its optical channels.
#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct Detector {

    /// Number of optical channels in one mirror half of the detector
    pub n_op_channels: u32,

    /// Full extent of one module along the first (permuted) axis
    #[serde(deserialize_with = "deserialize_uom")]
    pub module_width: Length,

    /// Number of modules in the detector
    pub n_modules: u32,

    /// Number of TPCs per module
    pub n_tpc_per_module: u32,

    /// Throughput correction for the ArCLight channels (the second six in
    /// each group of twelve)
    pub lcm_acl_norm: Ratiof32,

    /// Clearance between the cathode and the tabulated volume
    #[serde(deserialize_with = "deserialize_uom")]
    pub cathode_offset: Length,
}

impl Detector {

    /// Offset between a channel and its mirror image in the other half.
    pub fn half_channels(&self) -> u32 { self.n_op_channels / 2 }

    /// Fail fast on layouts the channel arithmetic cannot support.
    pub fn validate(&self, lut: &LutTable) -> Result<(), Error> {
        if self.n_op_channels == 0 || self.n_op_channels % 2 != 0 {
            return Err(Error::Config(format!(
                "n_op_channels must be even and nonzero, got {}", self.n_op_channels)));
        }
        if (self.n_modules * self.n_tpc_per_module) % 2 != 0 {
            return Err(Error::Config(format!(
                "total TPC count must be even, got {} modules x {} TPCs",
                self.n_modules, self.n_tpc_per_module)));
        }
        if !(self.module_width > mm(0.0)) {
            return Err(Error::Config("module_width must be positive".into()));
        }
        if let Some(max) = lut.max_op_channel() {
            if max >= self.n_op_channels {
                return Err(Error::Config(format!(
                    "visibility table uses channel {} but the detector has only {} channels",
                    max, self.n_op_channels)));
            }
        }
        Ok(())
    }
}

pub fn read_detector_file(path: &Path) -> Result<Detector, Error> {
    let config = fs::read_to_string(path)
        .map_err(|e| Error::Load(format!("couldn't read detector file `{}`: {}", path.display(), e)))?;
    toml::from_str(&config)
        .map_err(|e| Error::Load(format!("couldn't parse detector file `{}`: {}", path.display(), e)))
}
