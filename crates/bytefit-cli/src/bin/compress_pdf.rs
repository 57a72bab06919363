//! `compress-pdf <input_pdf> <target_size_kb>`

use bytefit_cli::args::PdfArgs;

fn main() {
    let args: PdfArgs = bytefit_cli::parse_args();
    bytefit_cli::init_logging(args.common.verbose);
    bytefit_cli::finish(bytefit_cli::run_pdf(&args), args.common.json);
}
