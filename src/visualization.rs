//! SVG rendering of tours.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::instance::Graph;
use crate::solution::Solution;

/// Node labels are drawn only up to this many nodes.
const MAX_LABELLED_NODES: usize = 150;

/// SVG visualization generator
pub struct Visualizer {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Margin
    pub margin: f64,
    /// Node radius
    pub node_radius: f64,
}

impl Default for Visualizer {
    fn default() -> Self {
        Visualizer {
            width: 800.0,
            height: 800.0,
            margin: 50.0,
            node_radius: 4.0,
        }
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

impl Visualizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// (min_x, max_x, min_y, max_y) in one pass, all zero for an empty graph.
    fn bounds(graph: &Graph) -> (f64, f64, f64, f64) {
        if graph.nodes.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        graph.nodes.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(min_x, max_x, min_y, max_y), node| {
                (min_x.min(node.x), max_x.max(node.x), min_y.min(node.y), max_y.max(node.y))
            },
        )
    }

    /// Generate an SVG drawing of the closed tour of `solution`.
    pub fn generate_svg(&self, graph: &Graph, solution: &Solution) -> String {
        let mut svg = String::new();

        let (min_x, max_x, min_y, max_y) = Self::bounds(graph);
        let scale_x = (self.width - 2.0 * self.margin) / (max_x - min_x).max(1e-9);
        let scale_y = (self.height - 2.0 * self.margin) / (max_y - min_y).max(1e-9);
        let scale = scale_x.min(scale_y);

        svg.push_str(&format!(
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
    .node {{ fill: #3498db; stroke: #2c3e50; stroke-width: 1; }}
    .start {{ fill: #e74c3c; stroke: #c0392b; stroke-width: 1; }}
    .edge {{ stroke: #34495e; stroke-width: 1.5; fill: none; }}
    .label {{ font-family: Arial; font-size: 9px; fill: #2c3e50; }}
    .title {{ font-family: Arial; font-size: 14px; fill: #2c3e50; font-weight: bold; }}
</style>
<rect width="100%" height="100%" fill="#ecf0f1"/>
"##,
            self.width, self.height, self.width, self.height
        ));

        svg.push_str(&format!(
            r##"<text x="{}" y="25" class="title">Instance: {} | {} | Length: {:.2} | Nodes: {}</text>
"##,
            self.margin,
            escape(&graph.name),
            escape(&solution.algorithm),
            solution.length,
            graph.num_nodes()
        ));

        let transform = |x: f64, y: f64| -> (f64, f64) {
            let tx = self.margin + (x - min_x) * scale;
            let ty = self.height - self.margin - (y - min_y) * scale;
            (tx, ty)
        };

        if solution.tour.len() > 1 {
            let points: Vec<String> = solution
                .tour
                .iter()
                .map(|&i| {
                    let (x, y) = transform(graph.nodes[i].x, graph.nodes[i].y);
                    format!("{:.2},{:.2}", x, y)
                })
                .collect();
            svg.push_str(&format!(
                r#"<polygon points="{}" class="edge"/>
"#,
                points.join(" ")
            ));
        }

        let start = solution.tour.first().copied();
        let labelled = graph.num_nodes() <= MAX_LABELLED_NODES;
        for (i, node) in graph.nodes.iter().enumerate() {
            let (x, y) = transform(node.x, node.y);
            let class = if Some(i) == start { "start" } else { "node" };

            svg.push_str(&format!(
                r#"<circle cx="{:.2}" cy="{:.2}" r="{}" class="{}"/>
"#,
                x, y, self.node_radius, class
            ));
            if labelled {
                svg.push_str(&format!(
                    r#"<text x="{:.2}" y="{:.2}" class="label" text-anchor="middle">{}</text>
"#,
                    x,
                    y - self.node_radius - 2.0,
                    node.id
                ));
            }
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Save SVG to file
    pub fn save_svg<P: AsRef<Path>>(&self, svg: &str, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(svg.as_bytes())?;
        Ok(())
    }
}
