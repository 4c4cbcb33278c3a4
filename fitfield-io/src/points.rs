//! Plain-text point files
//!
//! One point per line, either `x y` or `x y nx ny`. Everything following a
//! `#` is a comment. When at least one line carries no normal, normals are
//! re-estimated for the whole set after loading.

use crate::error::IoError;
use fitfield_algorithms::{estimate_normals, DEFAULT_NORMAL_NEIGHBORS};
use fitfield_core::{OrientedPoint2f, PointSet, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Header line written at the top of every saved file
pub const POINT_FILE_HEADER: &str = "# x y nx ny";

/// A successfully parsed point line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointRecord {
    /// `x y`, normal left to estimation
    Position { x: f32, y: f32 },
    /// `x y nx ny`
    Oriented { x: f32, y: f32, nx: f32, ny: f32 },
}

impl PointRecord {
    pub fn has_normal(&self) -> bool {
        matches!(self, PointRecord::Oriented { .. })
    }

    pub fn into_point(self) -> OrientedPoint2f {
        match self {
            PointRecord::Position { x, y } => OrientedPoint2f::with_default_normal(x, y),
            PointRecord::Oriented { x, y, nx, ny } => OrientedPoint2f::from_normal(x, y, nx, ny),
        }
    }
}

/// Parse one line of a point file.
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_line(line: &str) -> std::result::Result<Option<PointRecord>, IoError> {
    let content = line.find('#').map_or(line, |i| &line[..i]).trim();
    if content.is_empty() {
        return Ok(None);
    }

    let values = content
        .split_whitespace()
        .map(|token| match token.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(IoError::ParseError {
                message: format!("invalid number \"{token}\""),
            }),
        })
        .collect::<std::result::Result<Vec<f32>, IoError>>()?;

    match values[..] {
        [x, y] => Ok(Some(PointRecord::Position { x, y })),
        [x, y, nx, ny] => Ok(Some(PointRecord::Oriented { x, y, nx, ny })),
        _ => Err(IoError::ParseError {
            message: format!("expected 2 or 4 values, found {}", values.len()),
        }),
    }
}

/// Read a point set from a text file
pub fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IoError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => IoError::Io(e),
    })?;

    let points = read_points_from(BufReader::new(file))?;
    tracing::info!(path = %path.display(), points = points.len(), "point set loaded");
    Ok(points)
}

/// Read a point set from any buffered reader.
///
/// Malformed lines are skipped with a warning; only read failures are errors.
pub fn read_points_from<R: BufRead>(reader: R) -> Result<PointSet> {
    let mut points = Vec::new();
    let mut needs_normals = false;
    let mut skipped = 0usize;

    // split on raw bytes so that a stray non-UTF-8 byte only spoils its own line
    for (line_number, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line = String::from_utf8_lossy(&bytes);
        match parse_line(&line) {
            Ok(Some(record)) => {
                needs_normals |= !record.has_normal();
                points.push(record.into_point());
            }
            Ok(None) => {}
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    line = line_number + 1,
                    content = line.trim(),
                    error = %e,
                    "skipping malformed line"
                );
            }
        }
    }

    if needs_normals {
        tracing::info!(points = points.len(), "recomputing normals");
        estimate_normals(&mut points, DEFAULT_NORMAL_NEIGHBORS);
    }
    if skipped > 0 {
        tracing::debug!(skipped, "malformed lines ignored");
    }

    Ok(PointSet::from_points(points))
}

/// Write a point set as `x y nx ny` lines
pub fn write_point_set<P: AsRef<Path>>(points: &PointSet, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_points_to(points, &mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), points = points.len(), "point set saved");
    Ok(())
}

pub fn write_points_to<W: Write>(points: &PointSet, writer: &mut W) -> Result<()> {
    writeln!(writer, "{POINT_FILE_HEADER}")?;
    for point in points {
        let n = point.normal();
        writeln!(
            writer,
            "{} {} {} {}",
            point.position.x, point.position.y, n.x, n.y
        )?;
    }
    Ok(())
}
