use std::path::PathBuf;

use bytefit_core::settings::defaults;
use bytefit_core::CompressionSettings;
use clap::{Args, Parser};

/// Compress an image to an exact size in KB
#[derive(Parser, Debug)]
#[command(name = "compress-image", author, version)]
pub struct ImageArgs {
    /// Input image (JPEG or PNG)
    pub filename: PathBuf,

    /// Target size in KB (may be fractional)
    #[arg(value_parser = parse_target_kb)]
    pub target_size_kb: f64,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Compress a PDF to an exact size in KB
#[derive(Parser, Debug)]
#[command(name = "compress-pdf", author, version)]
pub struct PdfArgs {
    /// Input PDF
    pub input_pdf: PathBuf,

    /// Target size in KB (may be fractional)
    #[arg(value_parser = parse_target_kb)]
    pub target_size_kb: f64,

    /// Scale at which pages are rasterized
    #[arg(long, default_value_t = defaults::RENDER_SCALE)]
    pub render_scale: f32,

    /// Directory holding the pdfium shared library
    #[arg(long)]
    pub pdfium_dir: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Working root; output goes to <root>/uploads/compressed
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Write output here instead of <root>/uploads/compressed
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not pad the output with filler bytes up to the target size
    #[arg(long)]
    pub no_pad: bool,

    /// Also print a machine-readable JSON report line
    #[arg(long)]
    pub json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.root.join("uploads").join("compressed"))
    }

    pub fn settings(&self) -> CompressionSettings {
        CompressionSettings {
            pad_to_exact: !self.no_pad,
            ..CompressionSettings::default()
        }
    }
}

fn parse_target_kb(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(kb) if kb.is_finite() && kb > 0.0 => Ok(kb),
        Ok(_) => Err("target_size_kb must be a positive number".to_string()),
        Err(_) => Err("target_size_kb must be a number".to_string()),
    }
}
