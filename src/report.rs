//! Plain-text result report for a single run.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::TspError;
use crate::instance::Graph;
use crate::solution::Solution;

/// File name part of `instance_file`, with directories removed.
fn file_name(instance_file: &str) -> &str {
    Path::new(instance_file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(instance_file)
}

/// File name without its last extension.
fn file_stem(instance_file: &str) -> &str {
    Path::new(instance_file)
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or(instance_file)
}

/// Render the report for `solution` on `graph`.
pub fn render_report(graph: &Graph, solution: &Solution, instance_file: &str) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "--- {} algorithm results for the problem {} ---\n\n",
        solution.algorithm,
        file_name(instance_file)
    ));
    report.push_str("Node_ID    X-coo        Y-coo\n");
    for node in &graph.nodes {
        report.push_str(&format!("{}         {:.6}   {:.6}\n", node.id, node.x, node.y));
    }

    report.push_str(&format!("\nSize of tour: {}\n", solution.tour.len()));
    report.push_str(&format!("MSTlen: {:.6}\n", solution.length));
    report.push_str(&format!("\nNumber of unique elements: {}\n", solution.unique_nodes()));

    report.push_str("\n---Final Tour---\n");
    let ids = graph.tour_ids(&solution.tour);
    for id in &ids {
        report.push_str(&format!("{} ", id));
    }
    if let Some(first) = ids.first() {
        report.push_str(&format!("{}", first));
    }
    report.push('\n');

    report.push_str(&format!("\nFinal Tour Length: {:.6}\n", solution.length));
    report.push_str("\n---Execution Time---\n");
    report.push_str(&format!("{:.6} seconds\n", solution.computation_time));

    report
}

/// Write the report to `<dir>/<ALG>_<stem>_results.txt`, creating `dir` if
/// needed.
pub fn write_report<P: AsRef<Path>>(
    dir: P,
    graph: &Graph,
    solution: &Solution,
    instance_file: &str,
) -> Result<PathBuf, TspError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!(
        "{}_{}_results.txt",
        solution.algorithm,
        file_stem(instance_file)
    ));
    std::fs::write(&path, render_report(graph, solution, instance_file))?;
    info!("Report written to {}", path.display());

    Ok(path)
}
