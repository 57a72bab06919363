//! `compress-image <filename> <target_size_kb>`

use bytefit_cli::args::ImageArgs;

fn main() {
    let args: ImageArgs = bytefit_cli::parse_args();
    bytefit_cli::init_logging(args.common.verbose);
    bytefit_cli::finish(bytefit_cli::run_image(&args), args.common.json);
}
