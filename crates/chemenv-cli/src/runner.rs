//! Analysis runner: builds the plane and classifies / projects points.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;

use chemenv_geometry::plane::{FitStrategy, Plane, SignedDistanceGroups};
use chemenv_geometry::Separation;

use crate::config::{JobConfig, PlaneSource};
use crate::xyz::{load_points, unzip};

/// How the plane of a report was obtained.
#[derive(Debug, Serialize)]
pub struct FitSummary {
    pub strategy: FitStrategy,
    pub num_points: usize,
    pub least_square_distance_error: f64,
    pub maximum_distance_error: f64,
}

/// Results of one analysis job.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub plane: Plane,
    pub fit: Option<FitSummary>,
    pub tolerance: f64,
    /// Element labels from the XYZ file, or the point index for inline points.
    pub labels: Vec<String>,
    pub points: Vec<[f64; 3]>,
    pub separation: Separation,
    pub distances: SignedDistanceGroups,
    pub projected: Vec<[f64; 3]>,
    pub projected_2d: Vec<[f64; 2]>,
}

/// Build the plane described by the job. Relative paths are resolved against
/// `base_dir`.
pub fn build_plane(job: &JobConfig, base_dir: &Path) -> Result<(Plane, Option<Vec<[f64; 3]>>)> {
    let loaded;
    let points: &[[f64; 3]] = match job.plane.source()? {
        PlaneSource::Coefficients([a, b, c, d]) => {
            let plane = Plane::from_coefficients(a, b, c, d)?;
            return Ok((plane, None));
        }
        PlaneSource::Points(points) => points,
        PlaneSource::File(path) => {
            let path = base_dir.join(path);
            let labelled = load_points(&path)
                .with_context(|| format!("Failed to load plane points from {}", path.display()))?;
            loaded = unzip(labelled).1;
            &loaded
        }
    };
    let plane = Plane::from_npoints(points, job.plane.fit)
        .with_context(|| format!("Cannot fit a plane through {} points", points.len()))?;
    Ok((plane, Some(points.to_vec())))
}

/// Run a full analysis from a parsed job configuration.
pub fn run_analysis(job: &JobConfig, base_dir: &Path) -> Result<AnalysisReport> {
    let (plane, fitted_points) = build_plane(job, base_dir)?;
    debug!("Plane coefficients: {:?}", plane.coefficients());

    let fit = fitted_points.as_ref().map(|points| FitSummary {
        strategy: job.plane.fit,
        num_points: points.len(),
        least_square_distance_error: plane.fit_error(points, FitStrategy::LeastSquareDistance),
        maximum_distance_error: plane.fit_error(points, FitStrategy::MaximumDistance),
    });

    let analysis = &job.analysis;
    let (labels, points) = match &analysis.points_file {
        Some(path) => {
            let path = base_dir.join(path);
            let labelled = load_points(&path).with_context(|| {
                format!("Failed to load analysis points from {}", path.display())
            })?;
            unzip(labelled)
        }
        None => {
            let points = if analysis.points.is_empty() {
                fitted_points.unwrap_or_default()
            } else {
                analysis.points.clone()
            };
            ((0..points.len()).map(|i| i.to_string()).collect(), points)
        }
    };
    info!("Analysing {} points against the plane", points.len());

    let separation = plane.indices_separate(&points, analysis.tolerance);
    let distances = plane.signed_distances_indices_groups(&points, analysis.grouping()?)?;
    let projected = plane.projectionpoints(&points);
    let projected_2d = plane.project_and_to2dim(&points, analysis.origin);

    Ok(AnalysisReport {
        plane,
        fit,
        tolerance: analysis.tolerance,
        labels,
        points,
        separation,
        distances,
        projected,
        projected_2d,
    })
}

/// Print a human-readable summary of a report.
pub fn print_report(report: &AnalysisReport) {
    println!("{}", report.plane);
    if let Some(fit) = &report.fit {
        println!(
            "  fit           : {} through {} points (sum sq = {:.4e}, max = {:.4e})",
            fit.strategy, fit.num_points, fit.least_square_distance_error, fit.maximum_distance_error
        );
    }
    if report.points.is_empty() {
        println!("No points to analyse.");
        return;
    }

    println!();
    println!("Separation (tolerance {:.2e}):", report.tolerance);
    println!("  below    : {:?}", report.separation.below);
    println!("  in plane : {:?}", report.separation.in_plane);
    println!("  above    : {:?}", report.separation.above);

    println!();
    println!(
        "{:>5} {:>6} {:>12} {:>12} {:>12}",
        "index", "label", "distance", "u", "v"
    );
    for entry in &report.distances.sorted {
        let xy = report.projected_2d[entry.index];
        println!(
            "{:5} {:>6} {:12.6} {:12.6} {:12.6}",
            entry.index,
            report.labels[entry.index],
            report.distances.distances[entry.index],
            xy[0],
            xy[1]
        );
    }

    println!();
    println!("Distance groups:");
    for (i, group) in report.distances.groups.iter().enumerate() {
        let indices: Vec<usize> = group.iter().map(|s| s.index).collect();
        println!("  [{}] {:?}", i, indices);
    }
}

/// Write the report as pretty-printed JSON.
pub fn write_report_json(report: &AnalysisReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("  Report written to {}", path.display());
    Ok(())
}
