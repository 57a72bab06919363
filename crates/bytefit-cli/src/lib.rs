//! Shared plumbing for the `compress-image` and `compress-pdf` binaries.
//!
//! Both print two lines on success on stdout:
//!
//! ```text
//! Original: X KB | Target: Y KB | Final: Z KB (exact)
//! FINAL_OUTPUT_PATH::<path>
//! ```
//!
//! and a single `ERROR: ...` line with exit status 1 on failure. Logs go to
//! stderr.

pub mod args;
pub mod output;

use std::fs;
use std::process;

use anyhow::{bail, Context, Result};
use bytefit_core::document::{self, PdfAssembler};
use bytefit_core::{
    compress_document, compress_image, decode_image, feasible_image_budget, kb_to_bytes,
    write_exact, JpegCodec,
};
use clap::error::ErrorKind;
use clap::Parser;

use args::{ImageArgs, PdfArgs};
use output::{output_path, Label, Summary};

/// Parse arguments, reporting anything but help/version as an `ERROR:` line.
pub fn parse_args<A: Parser>() -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or_default()
                .trim_start_matches("error: ");
            println!("ERROR: {message}");
            process::exit(1);
        }
    }
}

pub fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();
}

/// Print the outcome and exit with the matching status.
pub fn finish(result: Result<Summary>, json: bool) -> ! {
    match result {
        Ok(summary) => {
            println!("{}", summary.summary_line());
            println!("{}", summary.path_line());
            if json {
                match serde_json::to_string(&summary) {
                    Ok(line) => println!("REPORT::{line}"),
                    Err(e) => log::warn!("could not serialize report: {e}"),
                }
            }
            process::exit(0)
        }
        Err(e) => {
            println!("ERROR: {e:#}");
            process::exit(1)
        }
    }
}

pub fn run_image(args: &ImageArgs) -> Result<Summary> {
    let target = kb_to_bytes(args.target_size_kb);
    let settings = args.common.settings();

    let source = fs::read(&args.filename)
        .with_context(|| format!("Could not open image: {}", args.filename.display()))?;
    let pixels = decode_image(&source)
        .with_context(|| format!("Could not open image: {}", args.filename.display()))?;
    log::info!(
        "{}: {}x{}, {} bytes",
        args.filename.display(),
        pixels.width,
        pixels.height,
        source.len()
    );

    let out_path = output_path(&args.common.output_dir(), &args.filename, "jpg")?;
    let codec = JpegCodec::new(settings.filter);
    let result = compress_image(&codec, &pixels, source.len(), target, &settings)
        .context("Compression failed")?;

    let report = write_exact(&out_path, &result.unit.data, target, settings.pad_to_exact)
        .with_context(|| format!("Could not write {}", out_path.display()))?;

    Ok(Summary::new(
        source.len(),
        args.target_size_kb,
        target,
        Label::Exact,
        report,
        out_path,
    ))
}

pub fn run_pdf(args: &PdfArgs) -> Result<Summary> {
    let target = kb_to_bytes(args.target_size_kb);
    let settings = bytefit_core::CompressionSettings {
        render_scale: args.render_scale,
        ..args.common.settings()
    };

    if !args.input_pdf.is_file() {
        bail!("input file does not exist: {}", args.input_pdf.display());
    }
    let source = fs::read(&args.input_pdf)
        .with_context(|| format!("Could not read {}", args.input_pdf.display()))?;
    let out_path = output_path(&args.common.output_dir(), &args.input_pdf, "pdf")?;

    if target >= source.len() {
        log::info!("target covers the original; copying");
        let report = write_exact(&out_path, &source, target, settings.pad_to_exact)
            .with_context(|| format!("Could not copy/pad original PDF to {}", out_path.display()))?;
        return Ok(Summary::new(
            source.len(),
            args.target_size_kb,
            target,
            Label::CopiedPadded,
            report,
            out_path,
        ));
    }

    // Reject infeasible targets before paying for rasterization
    let pages = document::page_count(&source)?;
    feasible_image_budget(
        target,
        pages,
        settings.page_overhead,
        settings.min_page_budget,
    )?;

    let rasterizer = match &args.pdfium_dir {
        Some(dir) => bytefit_core::PdfiumRasterizer::with_library_dir(dir),
        None => bytefit_core::PdfiumRasterizer::new(),
    };
    let result = compress_document(
        &rasterizer,
        &PdfAssembler,
        &JpegCodec::new(settings.filter),
        &args.input_pdf,
        target,
        &settings,
    )?;
    log::info!(
        "{} pages at scale {:.3} after {} rounds",
        result.pass.pages.len(),
        result.pass.scale,
        result.pass.rounds
    );

    let report = write_exact(&out_path, &result.bytes, target, settings.pad_to_exact)
        .with_context(|| format!("Could not write {}", out_path.display()))?;

    Ok(Summary::new(
        source.len(),
        args.target_size_kb,
        target,
        Label::Exact,
        report,
        out_path,
    ))
}
