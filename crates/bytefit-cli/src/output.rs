//! Output naming and the summary lines printed on success.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use bytefit_core::{FinalizeReport, SizeOutcome};
use serde::Serialize;

/// `<dir>/<input stem>.<extension>`
pub fn output_path(dir: &Path, input: &Path, extension: &str) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| anyhow!("input has no file name: {}", input.display()))?;
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    Ok(dir.join(name))
}

/// Parenthesized note at the end of the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Exact,
    CopiedPadded,
    OverTarget,
    Unpadded,
}

impl Label {
    /// The label for a write, given what the happy path would be called.
    pub fn for_report(success: Label, report: &FinalizeReport) -> Self {
        match report.outcome {
            SizeOutcome::Exact => success,
            SizeOutcome::OverTarget { .. } => Label::OverTarget,
            SizeOutcome::Under { .. } => Label::Unpadded,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Label::Exact => "exact",
            Label::CopiedPadded => "copied/padded",
            Label::OverTarget => "over target",
            Label::Unpadded => "unpadded",
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub original_bytes: usize,
    pub target_kb: f64,
    pub target_bytes: usize,
    pub final_bytes: usize,
    pub label: Label,
    pub output_path: PathBuf,
    pub report: FinalizeReport,
}

impl Summary {
    pub fn new(
        original_bytes: usize,
        target_kb: f64,
        target_bytes: usize,
        success: Label,
        report: FinalizeReport,
        output_path: PathBuf,
    ) -> Self {
        Self {
            original_bytes,
            target_kb,
            target_bytes,
            final_bytes: report.total_len,
            label: Label::for_report(success, &report),
            output_path,
            report,
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "Original: {:.2} KB | Target: {:.2} KB | Final: {:.2} KB ({})",
            self.original_bytes as f64 / 1024.0,
            self.target_kb,
            self.final_bytes as f64 / 1024.0,
            self.label
        )
    }

    pub fn path_line(&self) -> String {
        format!("FINAL_OUTPUT_PATH::{}", self.output_path.display())
    }
}
