//! Chart geometry for the cumulative completion curve.
//!
//! The renderer is out of scope; this module only turns a numeric series into
//! a smooth path string and a human-friendly axis ceiling. The smoothing is a
//! readability choice, not a fitting algorithm: quadratic segments are
//! anchored at midpoints between consecutive points, so the curve passes near
//! interior points rather than exactly through them.

use serde::Serialize;

/// Fixed lower bound of the value axis.
pub const CHART_MIN: f64 = 0.0;

/// Synthetic lead-in/lead-out padding as a fraction of the inner width.
const EDGE_PAD_RATIO: f64 = 0.03;

/// A 2D point in chart coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// A "nice" axis ceiling for a maximum data value.
///
/// Small values snap to the 10/20/50/100 ladder; above that the mantissa is
/// rounded up to 2, 5 or 10 times the nearest lower power of ten.
pub fn nice_rounded_max(n: u32) -> u32 {
    if n <= 10 {
        return 10;
    }
    if n <= 20 {
        return 20;
    }
    if n <= 50 {
        return 50;
    }
    if n <= 100 {
        return 100;
    }

    let mut pow: u64 = 10;
    while pow * 10 <= u64::from(n) {
        pow *= 10;
    }
    let mantissa = (u64::from(n) + pow - 1) / pow;
    let factor = if mantissa <= 2 {
        2
    } else if mantissa <= 5 {
        5
    } else {
        10
    };
    (factor * pow) as u32
}

/// Build a smoothed curve through an ordered point sequence.
///
/// Each interior point becomes the control of a quadratic segment ending at
/// the midpoint to its successor; a final straight segment closes on the last
/// point. Fewer than two points yields an empty path.
pub fn smooth_path(points: &[ChartPoint]) -> String {
    if points.len() < 2 {
        return String::new();
    }

    let mut path = format!("M {:.2} {:.2}", points[0].x, points[0].y);
    for i in 1..points.len() - 1 {
        let control = points[i];
        let next = points[i + 1];
        let mid_x = (control.x + next.x) / 2.0;
        let mid_y = (control.y + next.y) / 2.0;
        path.push_str(&format!(
            " Q {:.2} {:.2} {:.2} {:.2}",
            control.x, control.y, mid_x, mid_y
        ));
    }

    let last = points[points.len() - 1];
    path.push_str(&format!(" L {:.2} {:.2}", last.x, last.y));
    path
}

/// Geometry for one rendered series.
#[derive(Debug, Clone, Serialize)]
pub struct ChartGeometry {
    /// Smoothed path through the (padded) points
    pub path: String,
    /// Nice-rounded axis ceiling
    pub max: u32,
    /// The padded point list fed to [`smooth_path`]
    pub points: Vec<ChartPoint>,
}

/// Map a value series into chart coordinates and build the smoothed path.
///
/// Values are normalized between [`CHART_MIN`] and the nice-rounded max and
/// spread evenly across the inner width. A synthetic point is added slightly
/// before the first and after the last real point (3% of the inner width)
/// purely to smooth the curve endpoints.
pub fn build_chart(values: &[u32], width: f64, height: f64, inset: f64) -> ChartGeometry {
    let max = nice_rounded_max(values.iter().copied().max().unwrap_or(0));
    if values.is_empty() {
        return ChartGeometry {
            path: String::new(),
            max,
            points: Vec::new(),
        };
    }

    let inner_w = width - 2.0 * inset;
    let inner_h = height - 2.0 * inset;
    let step = if values.len() > 1 {
        inner_w / (values.len() - 1) as f64
    } else {
        0.0
    };

    let core: Vec<ChartPoint> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let ratio = (f64::from(v) - CHART_MIN) / (f64::from(max) - CHART_MIN);
            ChartPoint {
                x: inset + i as f64 * step,
                y: inset + (1.0 - ratio) * inner_h,
            }
        })
        .collect();

    let pad = inner_w * EDGE_PAD_RATIO;
    let first = core[0];
    let last = core[core.len() - 1];

    let mut points = Vec::with_capacity(core.len() + 2);
    points.push(ChartPoint {
        x: first.x - pad,
        y: first.y,
    });
    points.extend(core);
    points.push(ChartPoint {
        x: last.x + pad,
        y: last.y,
    });

    ChartGeometry {
        path: smooth_path(&points),
        max,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_rounded_max_ladder() {
        assert_eq!(nice_rounded_max(0), 10);
        assert_eq!(nice_rounded_max(7), 10);
        assert_eq!(nice_rounded_max(15), 20);
        assert_eq!(nice_rounded_max(37), 50);
        assert_eq!(nice_rounded_max(83), 100);
        assert_eq!(nice_rounded_max(150), 200);
        assert_eq!(nice_rounded_max(430), 500);
        assert_eq!(nice_rounded_max(1200), 2000);
    }

    #[test]
    fn test_nice_rounded_max_edges() {
        assert_eq!(nice_rounded_max(10), 10);
        assert_eq!(nice_rounded_max(100), 100);
        assert_eq!(nice_rounded_max(101), 200);
        assert_eq!(nice_rounded_max(200), 200);
        assert_eq!(nice_rounded_max(201), 500);
        assert_eq!(nice_rounded_max(501), 1000);
    }

    #[test]
    fn test_smooth_path_degenerate() {
        assert_eq!(smooth_path(&[]), "");
        assert_eq!(smooth_path(&[ChartPoint { x: 1.0, y: 2.0 }]), "");
    }

    #[test]
    fn test_smooth_path_two_points_is_a_line() {
        let path = smooth_path(&[
            ChartPoint { x: 0.0, y: 0.0 },
            ChartPoint { x: 10.0, y: 5.0 },
        ]);
        assert_eq!(path, "M 0.00 0.00 L 10.00 5.00");
    }

    #[test]
    fn test_smooth_path_segment_count() {
        let points: Vec<ChartPoint> = (0..5)
            .map(|i| ChartPoint {
                x: f64::from(i),
                y: f64::from(i * i),
            })
            .collect();
        let path = smooth_path(&points);
        assert!(path.starts_with("M 0.00 0.00"));
        // one quadratic per interior point, then the closing segment
        assert_eq!(path.matches(" Q ").count(), points.len() - 2);
        assert!(path.ends_with("L 4.00 16.00"));
    }

    #[test]
    fn test_build_chart_normalization_and_padding() {
        let values = [0, 5, 10];
        let geometry = build_chart(&values, 120.0, 60.0, 10.0);
        assert_eq!(geometry.max, 10);
        // 3 real points plus the two synthetic endpoints
        assert_eq!(geometry.points.len(), 5);

        let first_real = geometry.points[1];
        let last_real = geometry.points[3];
        // value 0 sits on the bottom of the inner area, max on the top
        assert!((first_real.y - 50.0).abs() < 1e-9);
        assert!((last_real.y - 10.0).abs() < 1e-9);
        assert!((first_real.x - 10.0).abs() < 1e-9);
        assert!((last_real.x - 110.0).abs() < 1e-9);

        // synthetic endpoints sit 3% of the inner width outside, same y
        let lead_in = geometry.points[0];
        assert!((lead_in.x - (10.0 - 3.0)).abs() < 1e-9);
        assert!((lead_in.y - first_real.y).abs() < 1e-9);

        assert!(!geometry.path.is_empty());
    }

    #[test]
    fn test_build_chart_empty_series() {
        let geometry = build_chart(&[], 100.0, 50.0, 5.0);
        assert!(geometry.path.is_empty());
        assert!(geometry.points.is_empty());
        assert_eq!(geometry.max, 10);
    }
}
