//! Region outlines and their SVG rendering.

use std::f64::consts::TAU;
use std::fmt::Write as _;

use serde::Serialize;

/// Default SVG size in pixels.
pub const DEFAULT_SIZE: u32 = 400;

const MARGIN: f64 = 24.0;

/// The boundary of a region as a closed polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPlot {
    /// Caption of the plot.
    pub title: String,
    /// Vertices in order; the last equals the first.
    pub outline: Vec<[f64; 2]>,
}

impl RegionPlot {
    /// Closes `points` into an outline.
    #[must_use]
    pub fn polygon(title: impl Into<String>, mut points: Vec<[f64; 2]>) -> Self {
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if first != last {
                points.push(first);
            }
        }
        Self {
            title: title.into(),
            outline: points,
        }
    }

    /// The outline of `[x1, x2] × [y1, y2]`.
    #[must_use]
    pub fn rectangle(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self::polygon("Rectangle Region", vec![[x1, y1], [x2, y1], [x2, y2], [x1, y2]])
    }

    /// A circle of `radius` sampled at `samples` evenly spaced angles.
    #[must_use]
    pub fn circle(radius: f64, samples: usize) -> Self {
        let samples = samples.max(3);
        #[allow(clippy::cast_precision_loss)]
        let points = (0..samples)
            .map(|i| {
                let t = TAU * i as f64 / samples as f64;
                [radius * t.cos(), radius * t.sin()]
            })
            .collect();
        Self::polygon("Circular Region", points)
    }

    /// The triangle `(0, 0)`, `(a, 0)`, `(0, b)`.
    #[must_use]
    pub fn triangle(a: f64, b: f64) -> Self {
        Self::polygon("Triangle Region", vec![[0.0, 0.0], [a, 0.0], [0.0, b]])
    }

    /// Smallest box containing the outline, as `(min_x, min_y, max_x, max_y)`.
    #[must_use]
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.outline.iter().filter(|p| p[0].is_finite() && p[1].is_finite());
        let first = points.next()?;
        Some(points.fold(
            (first[0], first[1], first[0], first[1]),
            |(x0, y0, x1, y1), p| (x0.min(p[0]), y0.min(p[1]), x1.max(p[0]), y1.max(p[1])),
        ))
    }

    /// Renders the outline as a filled SVG path with axes through the origin
    /// where they are in view.
    #[must_use]
    pub fn to_svg(&self, width: u32, height: u32) -> String {
        let (w, h) = (f64::from(width), f64::from(height));
        let mut svg = format!(
            "<svg width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
        );
        let _ = writeln!(svg, "<rect width=\"100%\" height=\"100%\" fill=\"white\"/>");

        if let Some((min_x, min_y, max_x, max_y)) = self.bounds() {
            let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
            let scale = ((w.min(h)) - 2.0 * MARGIN) / span;
            let cx = (min_x + max_x) / 2.0;
            let cy = (min_y + max_y) / 2.0;
            let to_px = |x: f64, y: f64| (w / 2.0 + (x - cx) * scale, h / 2.0 - (y - cy) * scale);

            let (ox, oy) = to_px(0.0, 0.0);
            if (0.0..=w).contains(&ox) {
                let _ = writeln!(
                    svg,
                    "<line x1=\"{ox:.2}\" y1=\"0\" x2=\"{ox:.2}\" y2=\"{h}\" stroke=\"#bbb\" stroke-width=\"1\"/>"
                );
            }
            if (0.0..=h).contains(&oy) {
                let _ = writeln!(
                    svg,
                    "<line x1=\"0\" y1=\"{oy:.2}\" x2=\"{w}\" y2=\"{oy:.2}\" stroke=\"#bbb\" stroke-width=\"1\"/>"
                );
            }

            let mut path = String::new();
            for (i, p) in self.outline.iter().enumerate() {
                let (px, py) = to_px(p[0], p[1]);
                let command = if i == 0 { 'M' } else { 'L' };
                let _ = write!(path, "{command}{px:.2},{py:.2} ");
            }
            let _ = writeln!(
                svg,
                "<path d=\"{}Z\" fill=\"steelblue\" fill-opacity=\"0.3\" stroke=\"steelblue\" stroke-width=\"2\"/>",
                path
            );
        }

        let _ = writeln!(
            svg,
            "<text x=\"{:.1}\" y=\"16\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"14\">{}</text>",
            w / 2.0,
            escape(&self.title)
        );
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outlines_are_closed() {
        let rect = RegionPlot::rectangle(0.0, 2.0, 0.0, 3.0);
        assert_eq!(rect.outline.len(), 5);
        assert_eq!(rect.outline.first(), rect.outline.last());

        let circle = RegionPlot::circle(2.0, 300);
        assert_eq!(circle.outline.len(), 301);
        let triangle = RegionPlot::triangle(3.0, 4.0);
        assert_eq!(triangle.outline, vec![[0.0, 0.0], [3.0, 0.0], [0.0, 4.0], [0.0, 0.0]]);
    }

    #[test]
    fn test_bounds() {
        let circle = RegionPlot::circle(2.0, 4);
        let (x0, y0, x1, y1) = circle.bounds().unwrap();
        assert!((x0 + 2.0).abs() < 1e-12 && (x1 - 2.0).abs() < 1e-12);
        assert!((y0 + 2.0).abs() < 1e-12 && (y1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_svg() {
        let svg = RegionPlot::triangle(3.0, 4.0).to_svg(DEFAULT_SIZE, DEFAULT_SIZE);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("<path d=\"M"));
        assert!(svg.contains("Triangle Region"));
    }

    #[test]
    fn test_title_is_escaped() {
        let plot = RegionPlot::polygon("a < b", vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert!(plot.to_svg(100, 100).contains("a &lt; b"));
    }
}
