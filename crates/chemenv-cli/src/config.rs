//! TOML configuration deserialisation for plane-analysis jobs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::Deserialize;

use chemenv_geometry::plane::{FitStrategy, Grouping, ProjectionOrigin};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub plane: PlaneConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How the plane is obtained. Exactly one source must be given.
#[derive(Debug, Deserialize)]
pub struct PlaneConfig {
    /// Equation coefficients `[a, b, c, d]`.
    pub coefficients: Option<[f64; 4]>,
    /// Points to fit the plane through.
    pub points: Option<Vec<[f64; 3]>>,
    /// XYZ file with the points to fit the plane through.
    pub points_file: Option<PathBuf>,
    /// Fit strategy for more than three points. Default: least squares.
    #[serde(default)]
    pub fit: FitStrategy,
}

/// Resolved plane source.
#[derive(Debug, Clone, Copy)]
pub enum PlaneSource<'a> {
    Coefficients([f64; 4]),
    Points(&'a [[f64; 3]]),
    File(&'a Path),
}

impl PlaneConfig {
    pub fn source(&self) -> anyhow::Result<PlaneSource<'_>> {
        match (&self.coefficients, &self.points, &self.points_file) {
            (Some(c), None, None) => Ok(PlaneSource::Coefficients(*c)),
            (None, Some(p), None) => Ok(PlaneSource::Points(p)),
            (None, None, Some(f)) => Ok(PlaneSource::File(f)),
            (None, None, None) => {
                bail!("[plane] needs one of 'coefficients', 'points' or 'points_file'")
            }
            _ => bail!("[plane] accepts only one of 'coefficients', 'points' or 'points_file'"),
        }
    }
}

/// Points to classify and project against the plane.
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// Distance below which a point counts as in the plane.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Inline points. When neither these nor `points_file` are given, the
    /// points the plane was fitted through are analysed.
    #[serde(default)]
    pub points: Vec<[f64; 3]>,
    pub points_file: Option<PathBuf>,
    /// Origin of the 2D projection: "mean" or [x, y, z]. Default: "mean".
    #[serde(default)]
    pub origin: ProjectionOrigin,
    /// Absolute gap between distance groups.
    pub delta: Option<f64>,
    /// Gap between distance groups relative to the largest distance.
    pub delta_factor: Option<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            points: Vec::new(),
            points_file: None,
            origin: ProjectionOrigin::default(),
            delta: None,
            delta_factor: None,
        }
    }
}

impl AnalysisConfig {
    pub fn grouping(&self) -> anyhow::Result<Grouping> {
        match (self.delta, self.delta_factor) {
            (Some(delta), None) => Ok(Grouping::Delta(delta)),
            (None, Some(factor)) => Ok(Grouping::DeltaFactor(factor)),
            (None, None) => Ok(Grouping::default()),
            (Some(_), Some(_)) => bail!("[analysis] accepts only one of 'delta' or 'delta_factor'"),
        }
    }
}

fn default_tolerance() -> f64 {
    1e-6
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to save the report as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

impl JobConfig {
    /// Check the parts of the job that deserialisation cannot.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.plane.source()?;
        self.analysis.grouping()?;
        if self.analysis.points_file.is_some() && !self.analysis.points.is_empty() {
            bail!("[analysis] accepts only one of 'points' or 'points_file'");
        }
        if !self.analysis.tolerance.is_finite() {
            bail!("[analysis] tolerance must be finite");
        }
        Ok(())
    }
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid configuration {}", path.display()))
}

/// Parse and validate a TOML job configuration.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}
