//! ASCII PCD reader/writer for clouds and histogram rows.
//!
//! Two layouts share the container: point clouds (`FIELDS x y z`, one point
//! per row) and histograms (a single row whose field `COUNT` is the
//! histogram length, as produced for descriptor and signature files).

use std::path::Path;

use crate::cloud::{Point, PointCloud};

use super::{ArtifactError, Result};

// ── Reading ─────────────────────────────────────────────────────────────────

/// Load an ASCII `x y z` point cloud.
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let path = path.as_ref();
    let data = read_file(path)?;
    parse_point_cloud(&data).map_err(|reason| ArtifactError::Malformed {
        path: path.into(),
        reason,
    })
}

/// Load a histogram artifact (`.cvfh`, `.crh`, `.cph`) as a flat float row.
///
/// The caller checks the length against the expected bin count; files for
/// different descriptor families differ only in field name and count.
pub fn read_histogram<P: AsRef<Path>>(path: P) -> Result<Vec<f32>> {
    let path = path.as_ref();
    let data = read_file(path)?;
    parse_histogram(&data).map_err(|reason| ArtifactError::Malformed {
        path: path.into(),
        reason,
    })
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.into(),
        source,
    })
}

// ── Writing ─────────────────────────────────────────────────────────────────

/// Write a cloud as ASCII PCD with `x y z` fields.
pub fn write_point_cloud<P: AsRef<Path>>(path: P, cloud: &PointCloud) -> Result<()> {
    write_file(path.as_ref(), &format_point_cloud(cloud))
}

/// Write a histogram row as ASCII PCD with a single counted field.
pub fn write_histogram<P: AsRef<Path>>(path: P, field: &str, values: &[f32]) -> Result<()> {
    write_file(path.as_ref(), &format_histogram(field, values))
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    std::fs::write(path, data).map_err(|source| ArtifactError::Io {
        path: path.into(),
        source,
    })
}

// ── Formatting ──────────────────────────────────────────────────────────────

fn format_point_cloud(cloud: &PointCloud) -> String {
    let n = cloud.len();
    let mut out = String::new();
    out.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    out.push_str("VERSION 0.7\n");
    out.push_str("FIELDS x y z\n");
    out.push_str("SIZE 4 4 4\n");
    out.push_str("TYPE F F F\n");
    out.push_str("COUNT 1 1 1\n");
    out.push_str(&format!("WIDTH {n}\n"));
    out.push_str("HEIGHT 1\n");
    out.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    out.push_str(&format!("POINTS {n}\n"));
    out.push_str("DATA ascii\n");
    for p in &cloud.points {
        out.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    out
}

fn format_histogram(field: &str, values: &[f32]) -> String {
    let count = values.len();
    let mut out = String::new();
    out.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    out.push_str("VERSION 0.7\n");
    out.push_str(&format!("FIELDS {field}\n"));
    out.push_str("SIZE 4\n");
    out.push_str("TYPE F\n");
    out.push_str(&format!("COUNT {count}\n"));
    out.push_str("WIDTH 1\n");
    out.push_str("HEIGHT 1\n");
    out.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    out.push_str("POINTS 1\n");
    out.push_str("DATA ascii\n");
    let row: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    out.push_str(&row.join(" "));
    out.push('\n');
    out
}

// ── Parsing ─────────────────────────────────────────────────────────────────

struct Header {
    fields: Vec<String>,
    counts: Vec<usize>,
    points: usize,
}

/// Consume header lines up to and including `DATA ascii`, returning the
/// header and the remaining data lines.
fn parse_header<'a>(
    mut lines: std::str::Lines<'a>,
) -> std::result::Result<(Header, std::str::Lines<'a>), String> {
    let mut fields: Vec<String> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut points: Option<usize> = None;

    while let Some(line) = lines.next() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let key = tokens.next().unwrap_or_default();
        match key {
            "FIELDS" => fields = tokens.map(str::to_string).collect(),
            "COUNT" => {
                counts = tokens
                    .map(|t| t.parse::<usize>().map_err(|_| format!("bad COUNT: {line}")))
                    .collect::<std::result::Result<_, _>>()?;
            }
            "POINTS" => {
                points = Some(
                    tokens
                        .next()
                        .and_then(|t| t.parse().ok())
                        .ok_or_else(|| format!("bad POINTS: {line}"))?,
                );
            }
            "DATA" => {
                let kind = tokens.next().unwrap_or_default();
                if kind != "ascii" {
                    return Err(format!("unsupported DATA encoding: {kind}"));
                }
                let header = Header {
                    fields,
                    counts,
                    points: points.ok_or("missing POINTS before DATA")?,
                };
                return Ok((header, lines));
            }
            // VERSION, SIZE, TYPE, WIDTH, HEIGHT, VIEWPOINT
            _ => {}
        }
    }
    Err("missing DATA line".to_string())
}

fn parse_point_cloud(data: &str) -> std::result::Result<PointCloud, String> {
    let (header, lines) = parse_header(data.lines())?;
    if header.fields.len() < 3
        || header.fields[0] != "x"
        || header.fields[1] != "y"
        || header.fields[2] != "z"
    {
        return Err(format!("expected x y z fields, got {:?}", header.fields));
    }

    let mut points = Vec::with_capacity(header.points);
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let point = (|| {
            Some(Point::new(
                tokens.next()?.parse().ok()?,
                tokens.next()?.parse().ok()?,
                tokens.next()?.parse().ok()?,
            ))
        })()
        .ok_or_else(|| format!("bad point row: {line}"))?;
        points.push(point);
    }

    if points.len() != header.points {
        return Err(format!(
            "header declares {} points, found {}",
            header.points,
            points.len()
        ));
    }
    Ok(PointCloud::from_points(points))
}

fn parse_histogram(data: &str) -> std::result::Result<Vec<f32>, String> {
    let (header, lines) = parse_header(data.lines())?;
    if header.points != 1 {
        return Err(format!(
            "histogram must hold exactly one row, header declares {}",
            header.points
        ));
    }

    let mut values = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        for token in line.split_whitespace() {
            let v: f32 = token
                .parse()
                .map_err(|_| format!("bad histogram value: {token}"))?;
            values.push(v);
        }
    }

    let declared: usize = header.counts.iter().sum();
    if declared > 0 && values.len() != declared {
        return Err(format!(
            "header declares {} values, found {}",
            declared,
            values.len()
        ));
    }
    if values.is_empty() {
        return Err("empty histogram".to_string());
    }
    Ok(values)
}
