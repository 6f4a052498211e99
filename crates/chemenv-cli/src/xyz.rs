//! Reader for `.xyz` coordinate files.
//!
//! ```text
//! <num_atoms>
//! <comment line>
//! <element> <x> <y> <z>
//! ...
//! ```
//!
//! Coordinates are returned in the file's own units.

use std::path::Path;

use thiserror::Error;

/// Errors while reading an XYZ file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    FormatError { line: usize, message: String },
}

/// An atom position with its element label.
#[derive(Debug, Clone)]
pub struct LabelledPoint {
    pub label: String,
    pub position: [f64; 3],
}

/// Read the labelled positions of an XYZ file.
pub fn load_points(path: &Path) -> Result<Vec<LabelledPoint>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_xyz(&content)
}

/// Split labelled points into labels and positions.
pub fn unzip(points: Vec<LabelledPoint>) -> (Vec<String>, Vec<[f64; 3]>) {
    points.into_iter().map(|p| (p.label, p.position)).unzip()
}

/// Parse an XYZ file from a string.
pub fn parse_xyz(content: &str) -> Result<Vec<LabelledPoint>, ParseError> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 2 {
        return Err(ParseError::FormatError {
            line: 1,
            message: "XYZ file must start with an atom count and a comment line".into(),
        });
    }

    let num_atoms: usize = lines[0].trim().parse().map_err(|_| ParseError::FormatError {
        line: 1,
        message: "First line must be the number of atoms".into(),
    })?;

    let mut points = Vec::with_capacity(num_atoms);
    for (idx, line) in lines[2..].iter().enumerate() {
        let line_no = idx + 3;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(ParseError::FormatError {
                line: line_no,
                message: format!("Expected 'element x y z', got '{}'", line),
            });
        }

        let mut position = [0.0; 3];
        for (axis, (value, name)) in parts[1..4].iter().zip(["x", "y", "z"]).enumerate() {
            position[axis] = value.parse().map_err(|_| ParseError::FormatError {
                line: line_no,
                message: format!("Invalid {} coordinate: {}", name, value),
            })?;
        }

        points.push(LabelledPoint {
            label: parts[0].to_string(),
            position,
        });
    }

    if points.len() != num_atoms {
        return Err(ParseError::FormatError {
            line: 1,
            message: format!("Header says {} atoms but found {}", num_atoms, points.len()),
        });
    }

    Ok(points)
}
