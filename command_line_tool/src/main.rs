use clap::Parser;
use dsift_check::error::Error;
use dsift_check::fixture::{REFERENCE_IMAGE, REFERENCE_MATRIX, SIFT_DATA_DIR};
use dsift_check::{
    DenseSiftConfig, DescriptorExtractor, FixtureDir, RegressionCheck, ToleranceCheck,
    DEFAULT_EPSILON, DEFAULT_ROW_COUNT,
};
use tracing_subscriber::EnvFilter;

/// Command line arguments structure.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Regression check of a dense SIFT extractor against a stored reference."
)]
struct Args {
    /// Directory holding the fixture files
    #[arg(default_value = SIFT_DATA_DIR)]
    fixture_dir: String,

    /// Image fixture name, resolved under the fixture directory
    #[arg(long, default_value = REFERENCE_IMAGE)]
    image: String,

    /// Reference matrix fixture name, resolved under the fixture directory
    #[arg(long, default_value = REFERENCE_MATRIX)]
    reference: String,

    /// Number of leading descriptor rows to compare
    #[arg(long, default_value_t = DEFAULT_ROW_COUNT)]
    rows: usize,

    /// Strict absolute tolerance per compared cell
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    epsilon: f32,

    /// Write a fresh reference matrix instead of comparing
    #[arg(long)]
    capture: bool,

    /// Log per-phase wall times (DSIFT_CHECK_PROFILE=1 does the same)
    #[arg(long)]
    profile: bool,
}

#[cfg(feature = "vlfeat")]
fn build_extractor(config: DenseSiftConfig) -> Option<Box<dyn DescriptorExtractor>> {
    Some(Box::new(dsift_check::VlDenseSift::new(config)))
}

#[cfg(not(feature = "vlfeat"))]
fn build_extractor(_config: DenseSiftConfig) -> Option<Box<dyn DescriptorExtractor>> {
    None
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let mut check = RegressionCheck::new(FixtureDir::new(&args.fixture_dir));
    check.image_file = args.image;
    check.reference_file = args.reference;
    check.check = ToleranceCheck::new(args.rows, args.epsilon);
    if args.profile {
        check.profile = true;
    }

    // The extractor is constructed for the image's shape, so load the
    // fixture up front and hand the decoded matrix to the runner.
    let image = match check.fixtures.load_image(&check.image_file) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Err: {e}");
            return 2;
        }
    };
    let config = DenseSiftConfig::new(image.nrows(), image.ncols());
    let Some(extractor) = build_extractor(config) else {
        eprintln!("Err: built without the `vlfeat` feature, no extractor available");
        return 2;
    };

    if args.capture {
        match check.capture_on(&image, extractor.as_ref()) {
            Ok(report) => {
                println!(
                    "Captured {} descriptors of width {} to {}",
                    report.descriptors,
                    report.descriptor_width,
                    check.fixtures.path(&check.reference_file).display()
                );
                0
            }
            Err(e) => {
                eprintln!("Err: {e}");
                2
            }
        }
    } else {
        match check.run_on(&image, extractor.as_ref()) {
            Ok(report) => {
                println!(
                    "PASS: {} rows of width {} within {:e} (max delta {:e}, {} descriptors total)",
                    report.rows_checked,
                    report.descriptor_width,
                    check.check.epsilon,
                    report.max_delta,
                    report.descriptors_produced
                );
                0
            }
            Err(
                e @ (Error::ToleranceExceeded { .. }
                | Error::RowOutOfRange { .. }
                | Error::WidthMismatch { .. }),
            ) => {
                eprintln!("FAIL: {e}");
                1
            }
            Err(e) => {
                eprintln!("Err: {e}");
                2
            }
        }
    }
}
