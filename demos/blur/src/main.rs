use argh::FromArgs;
use std::path::PathBuf;
use std::time::Instant;

use parblur::imgproc::filter::GaussianBlur;
use parblur::io::functional as F;

#[derive(FromArgs)]
/// Blur an image with a gaussian filter computed by parallel workers
struct Args {
    /// the radius of the gaussian kernel
    #[argh(positional)]
    radius: usize,

    /// path to the input image
    #[argh(positional)]
    infile: PathBuf,

    /// path to the output image
    #[argh(positional)]
    outfile: PathBuf,

    /// the number of worker threads
    #[argh(positional)]
    num_threads: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    // validate the configuration before touching the image
    let blur = GaussianBlur::new(args.radius, args.num_threads)?;

    // read the image
    let image = F::read_image_rgb8(&args.infile)?;
    log::info!("read {} from {}", image.size(), args.infile.display());

    // blur the image
    let mut blurred = image.clone();
    let start = Instant::now();
    blur.apply(&image, &mut blurred)?;
    log::info!(
        "blurred with radius {} on {} threads in {:?}",
        blur.radius(),
        blur.num_workers(),
        start.elapsed()
    );

    // write the result
    F::write_image_rgb8(&args.outfile, &blurred)?;
    log::info!("wrote {}", args.outfile.display());

    Ok(())
}
