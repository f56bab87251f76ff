//! Measure every image in a folder and write a CSV report.

use std::cmp::Ordering;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Result;
use crate::fwhr::FwhrOptions;
use crate::source::{measure_image, LandmarkSource};

/// Report file name written into the scanned folder.
pub const REPORT_FILENAME: &str = "fwhr_ratios.csv";

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Filename,
    Ratio,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "filename" => Ok(SortBy::Filename),
            "ratio" => Ok(SortBy::Ratio),
            other => Err(format!(
                "invalid sort key '{other}', accepted values are 'filename' and 'ratio'"
            )),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortBy::Filename => "filename",
            SortBy::Ratio => "ratio",
        })
    }
}

/// One line of the report. `ratio` is `None` when the image could not be
/// measured.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkRow {
    pub filename: String,
    pub ratio: Option<f32>,
}

/// Image files directly inside `folder`, sorted by path.
pub fn scan(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            images.push(path);
        }
    }
    images.sort();
    Ok(images)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Measure the first face of every image in `folder`.
///
/// A failure on one image is logged and recorded as an empty ratio; only
/// failing to read the folder itself is an error.
pub fn run_bulk<S: LandmarkSource + ?Sized>(
    source: &mut S,
    folder: &Path,
    options: &FwhrOptions,
    sort: SortBy,
) -> Result<Vec<BulkRow>> {
    let images = scan(folder)?;
    tracing::info!(folder = %folder.display(), images = images.len(), "bulk measurement");

    let mut rows: Vec<BulkRow> = images
        .iter()
        .map(|path| {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let ratio = match measure_image(&mut *source, path, 0, options) {
                Ok(m) => Some(m.ratio),
                Err(e) => {
                    tracing::warn!(image = %path.display(), error = %e, "skipping image");
                    None
                }
            };
            BulkRow { filename, ratio }
        })
        .collect();

    sort_rows(&mut rows, sort);
    Ok(rows)
}

/// Sort rows in place. By ratio, unmeasured rows go last.
pub fn sort_rows(rows: &mut [BulkRow], by: SortBy) {
    match by {
        SortBy::Filename => rows.sort_by(|a, b| a.filename.cmp(&b.filename)),
        SortBy::Ratio => rows.sort_by(|a, b| match (a.ratio, b.ratio) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.filename.cmp(&b.filename),
        }),
    }
}

/// Write the report as CSV with a `Filename,Ratio` header.
pub fn write_csv<W: Write>(writer: &mut W, rows: &[BulkRow]) -> Result<()> {
    writeln!(writer, "Filename,Ratio")?;
    for row in rows {
        let ratio = row.ratio.map(|r| r.to_string()).unwrap_or_default();
        writeln!(writer, "{},{}", csv_field(&row.filename), ratio)?;
    }
    Ok(())
}

/// Write the report to `path`.
pub fn save_csv(path: &Path, rows: &[BulkRow]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(&mut writer, rows)?;
    writer.flush()?;
    tracing::info!(report = %path.display(), rows = rows.len(), "report written");
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
