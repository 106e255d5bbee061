//! Capture pose artifact: a 4x4 transform as 16 whitespace-separated values.
//!
//! Values are row-major. Line breaks and `#` comment lines are ignored,
//! so both one-row and four-row layouts load.

use std::path::Path;

use super::{ArtifactError, Result};

/// Load a row-major 4x4 pose matrix.
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<[[f64; 4]; 4]> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.into(),
        source,
    })?;
    parse_matrix(&data).map_err(|reason| ArtifactError::Malformed {
        path: path.into(),
        reason,
    })
}

/// Write a pose matrix as four rows of four values.
pub fn write_matrix<P: AsRef<Path>>(path: P, matrix: &[[f64; 4]; 4]) -> Result<()> {
    let path = path.as_ref();
    let mut out = String::new();
    for row in matrix {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    std::fs::write(path, out).map_err(|source| ArtifactError::Io {
        path: path.into(),
        source,
    })
}

fn parse_matrix(data: &str) -> std::result::Result<[[f64; 4]; 4], String> {
    let mut values = Vec::with_capacity(16);
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for token in line.split_whitespace() {
            let v: f64 = token
                .parse()
                .map_err(|_| format!("bad matrix value: {token}"))?;
            values.push(v);
        }
    }
    if values.len() != 16 {
        return Err(format!("expected 16 values, found {}", values.len()));
    }

    let mut matrix = [[0.0; 4]; 4];
    for (i, v) in values.into_iter().enumerate() {
        matrix[i / 4][i % 4] = v;
    }
    Ok(matrix)
}
