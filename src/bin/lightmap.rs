// ----------------------------------- CLI -----------------------------------
use clap::Parser;

use arclight::utils::parse_range;

#[derive(Parser, Debug, Clone)]
#[command(name = "lightmap", about = "Map energy deposits onto optical-channel photon counts and arrival times")]
pub struct Cli {

    /// Detector description (TOML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// HDF5 file containing the photon visibility table
    #[arg(short, long)]
    pub lut: PathBuf,

    /// HDF5 file containing energy-deposit segments
    #[arg(short, long)]
    pub input: PathBuf,

    /// The segment dataset location inside the input file
    #[arg(long, default_value = "segments")]
    pub segments_dataset: String,

    /// The produced-photon dataset location inside the input file
    #[arg(long, default_value = "n_photons")]
    pub photons_dataset: String,

    /// Where to write the light response
    #[arg(short, long)]
    pub out: PathBuf,

    /// Which rows of the input datasets should be loaded
    #[arg(short, long, value_parser = parse_range::<usize>)]
    pub event_range: Option<std::ops::Range<usize>>,

    /// Maximum number of rayon threads
    #[arg(short = 'j', long, default_value = "4")]
    pub num_threads: usize,

}

// --------------------------------------------------------------------------------

use std::error::Error;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use arclight::config::read_detector_file;
use arclight::incidence::{calculate_light_incidence, LightResponse};
use arclight::io::hdf5::{load_lut, read_produced_photons, read_segments, write_response, Bounds};
use arclight::utils::{group_digits, timing::Progress};

fn main() -> Result<(), Box<dyn Error>> {

    let args = Cli::parse();

    let mut progress = Progress::new();

    progress.start("Reading detector description");
    let detector = read_detector_file(&args.config)?;
    progress.done();

    progress.start("Loading visibility table");
    let lut = load_lut(&args.lut)?;
    progress.done_with_message(&format!("{} entries in {} voxels",
                                        group_digits(lut.n_entries()),
                                        group_digits(lut.geometry().n_voxels())));

    let bounds = match args.event_range.clone() {
        Some(range) => Bounds::from(range),
        None        => Bounds::none(),
    };

    progress.start("Reading segments");
    let segments  = read_segments        (&args.input, &args.segments_dataset, bounds.clone())?;
    let n_photons = read_produced_photons(&args.input, &args.photons_dataset , bounds        )?;
    progress.done_with_message(&format!("loaded {}", group_digits(segments.len())));

    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.num_threads).build_global() {
        Err(e) => println!("{}", e),
        Ok(_)  => println!("Using up to {} threads.", args.num_threads),
    }

    let mut response = LightResponse::new(segments.len(), &detector);

    let bar = ProgressBar::new(segments.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")
                  .unwrap()
    );
    calculate_light_incidence(&lut, &detector, &segments, &n_photons, &mut response,
                              |_| bar.inc(1))?;
    bar.finish();

    progress.start("Writing light response");
    write_response(&args.out, &response)?;
    progress.done_with_message(&format!("wrote {}", args.out.display()));

    Ok(())
}
