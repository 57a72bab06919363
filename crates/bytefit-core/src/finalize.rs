//! Exact-size output.
//!
//! The encoded payload is written verbatim and followed by zero filler until
//! the file is exactly the requested length. Real content is never truncated:
//! a payload larger than the target is written whole and reported as
//! [`SizeOutcome::OverTarget`].
//!
//! Strict parsers may reject the trailing filler after an end-of-image or
//! end-of-file marker. Callers that cannot accept that should disable padding.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

/// How the persisted length relates to the requested one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeOutcome {
    /// Length equals the target.
    Exact,
    /// Padding was disabled and the payload is shorter than the target.
    Under { short_by: usize },
    /// The payload alone exceeds the target.
    OverTarget { excess: usize },
}

/// What [`write_exact`] put on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FinalizeReport {
    pub payload_len: usize,
    pub padding: usize,
    pub total_len: usize,
    pub outcome: SizeOutcome,
}

impl FinalizeReport {
    fn new(payload_len: usize, padding: usize, target: usize) -> Self {
        let total_len = payload_len + padding;
        let outcome = if total_len == target {
            SizeOutcome::Exact
        } else if total_len > target {
            SizeOutcome::OverTarget {
                excess: total_len - target,
            }
        } else {
            SizeOutcome::Under {
                short_by: target - total_len,
            }
        };
        Self {
            payload_len,
            padding,
            total_len,
            outcome,
        }
    }
}

/// In-memory form: `data` extended with zeros to `exact_size`.
pub fn pad_to_exact(mut data: Vec<u8>, exact_size: usize) -> Vec<u8> {
    if data.len() < exact_size {
        data.resize(exact_size, 0);
    }
    data
}

/// Persist `data` at `path`, padded with zeros to `exact_size` when `pad` is set.
///
/// Bytes go to a temporary file in the destination directory which is
/// renamed over `path` only once fully written. On any error the temporary
/// file is removed and `path` is left untouched.
///
/// # Arguments
///
/// * `path` - Destination file; missing parent directories are created
/// * `data` - Encoded payload, written verbatim and never truncated
/// * `exact_size` - Requested file length in bytes
/// * `pad` - Append zero filler up to `exact_size`
///
/// # Returns
///
/// A [`FinalizeReport`] whose outcome is `Exact`, `Under` (padding
/// disabled) or `OverTarget` (payload longer than `exact_size`).
///
/// # Errors
///
/// Any I/O failure creating the directory, writing or renaming the file.
pub fn write_exact(
    path: &Path,
    data: &[u8],
    exact_size: usize,
    pad: bool,
) -> io::Result<FinalizeReport> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let padding = if pad {
        exact_size.saturating_sub(data.len())
    } else {
        0
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    if padding > 0 {
        io::copy(&mut io::repeat(0).take(padding as u64), &mut tmp)?;
    }
    tmp.flush()?;
    set_output_permissions(&tmp, path)?;
    tmp.persist(path).map_err(|e| e.error)?;

    let report = FinalizeReport::new(data.len(), padding, exact_size);
    match report.outcome {
        SizeOutcome::OverTarget { excess } => log::warn!(
            "{} is {} bytes over the {} byte target",
            path.display(),
            excess,
            exact_size
        ),
        _ => log::info!(
            "wrote {} ({} payload + {} filler bytes)",
            path.display(),
            report.payload_len,
            report.padding
        ),
    }
    Ok(report)
}

/// Temporary files are created owner-only; give the output the mode of the
/// file it replaces, or 0644 for a new one.
#[cfg(unix)]
fn set_output_permissions(tmp: &NamedTempFile, path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match fs::metadata(path) {
        Ok(existing) => existing.permissions(),
        Err(_) => fs::Permissions::from_mode(0o644),
    };
    tmp.as_file().set_permissions(permissions)
}

#[cfg(not(unix))]
fn set_output_permissions(_tmp: &NamedTempFile, _path: &Path) -> io::Result<()> {
    Ok(())
}
