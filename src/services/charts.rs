use chrono::NaiveDate;
use serde::Serialize;
use std::f64::consts::PI;

use crate::models::{AgeGroups, Demographics, PieSegment, TimelinePoint};

// ============================================================================
// Line chart
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

pub const LINE_PADDING: Padding = Padding {
    top: 10.0,
    right: 20.0,
    bottom: 30.0,
    left: 32.0,
};

const MIN_PLOT_WIDTH: f64 = 360.0;
const POINT_SPACING: f64 = 22.0;
const PLOT_HEIGHT: f64 = 220.0;
const MAX_Y_STEPS: u64 = 5;
const MAX_X_LABELS: usize = 6;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct YTick {
    pub y: f64,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct XLabel {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// Pixel-space geometry of the signup line chart
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineChart {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
    pub max_y: u64,
    /// SVG path data through every point in order
    pub path: String,
    pub points: Vec<ChartPoint>,
    pub y_ticks: Vec<YTick>,
    pub x_labels: Vec<XLabel>,
}

/// Short axis label: `MM-DD` for ISO dates, otherwise the text after the year
fn axis_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%m-%d").to_string(),
        Err(_) => date.chars().skip(5).collect(),
    }
}

/// Lays out the line chart; `None` when there is nothing to plot
pub fn line_chart(timeline: &[TimelinePoint]) -> Option<LineChart> {
    if timeline.is_empty() {
        return None;
    }

    let padding = LINE_PADDING;
    let count = timeline.len();
    let width = MIN_PLOT_WIDTH.max(count as f64 * POINT_SPACING) + padding.left + padding.right;
    let height = PLOT_HEIGHT + padding.top + padding.bottom;

    // Floor of 1 keeps the scale finite when every count is zero
    let max_y = timeline.iter().map(|p| p.count).max().unwrap_or(0).max(1);

    let x_step = (width - padding.left - padding.right) / (count.saturating_sub(1).max(1) as f64);
    let usable = height - padding.top - padding.bottom;
    let x_at = |index: usize| padding.left + index as f64 * x_step;
    let y_at = |value: u64| padding.top + (usable - (value as f64 / max_y as f64) * usable);

    let points: Vec<ChartPoint> = timeline
        .iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            x: x_at(i),
            y: y_at(p.count),
            date: p.date.clone(),
            count: p.count,
        })
        .collect();

    let path = format!(
        "M {}",
        points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" L ")
    );

    let steps = MAX_Y_STEPS.min(max_y);
    let y_ticks = (0..=steps)
        .map(|i| {
            let value = ((max_y as f64 / steps as f64) * i as f64).round() as u64;
            YTick {
                y: y_at(value),
                value,
            }
        })
        .collect();

    let stride = count.div_ceil(MAX_X_LABELS);
    let label_y = height - padding.bottom + 16.0;
    let x_labels = points
        .iter()
        .enumerate()
        .filter(|(i, _)| i % stride == 0)
        .map(|(i, p)| XLabel {
            index: i,
            x: p.x,
            y: label_y,
            label: axis_label(&p.date),
        })
        .collect();

    Some(LineChart {
        width,
        height,
        padding,
        max_y,
        path,
        points,
        y_ticks,
        x_labels,
    })
}

// ============================================================================
// Pie charts
// ============================================================================

pub const PIE_RADIUS: f64 = 70.0;

/// One ring arc, drawn as a dashed circle stroke
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieArc {
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: f64,
    pub dash: f64,
    pub gap: f64,
    pub offset: f64,
    pub dash_array: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieChart {
    pub radius: f64,
    pub circumference: f64,
    pub arcs: Vec<PieArc>,
}

/// Lays segments around the ring in input order.
///
/// Offsets come from a running sum of the preceding values. Segments summing
/// below 100 leave a gap at the end of the ring.
pub fn pie_arcs(segments: &[PieSegment], radius: f64) -> Vec<PieArc> {
    let circumference = 2.0 * PI * radius;
    let mut cumulative = 0.0;

    segments
        .iter()
        .map(|segment| {
            let dash = (segment.value / 100.0) * circumference;
            let gap = circumference - dash;
            let offset = if cumulative == 0.0 {
                0.0
            } else {
                -(cumulative / 100.0) * circumference
            };
            cumulative += segment.value;

            PieArc {
                label: segment.label.clone(),
                color: segment.color.clone(),
                key: segment.key.clone(),
                value: segment.value,
                dash,
                gap,
                offset,
                dash_array: format!("{} {}", dash, gap),
            }
        })
        .collect()
}

pub fn pie_chart(segments: &[PieSegment]) -> PieChart {
    PieChart {
        radius: PIE_RADIUS,
        circumference: 2.0 * PI * PIE_RADIUS,
        arcs: pie_arcs(segments, PIE_RADIUS),
    }
}

pub fn gender_segments(demographics: &Demographics) -> Vec<PieSegment> {
    vec![
        PieSegment::new("Male", demographics.male.percent, "#3B82F6"),
        PieSegment::new("Female", demographics.female.percent, "#EC4899"),
    ]
}

pub fn age_segments(groups: &AgeGroups) -> Vec<PieSegment> {
    vec![
        PieSegment::new(groups.kids.label.as_str(), groups.kids.percent, "#10B981").with_key("kids"),
        PieSegment::new(groups.teens.label.as_str(), groups.teens.percent, "#F59E0B").with_key("teens"),
        PieSegment::new(groups.adults.label.as_str(), groups.adults.percent, "#8B5CF6").with_key("adults"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupShare, LabeledGroupShare};

    fn timeline(counts: &[u64]) -> Vec<TimelinePoint> {
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| TimelinePoint {
                date: format!("2024-05-{:02}", i + 1),
                count: *count,
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.05
    }

    #[test]
    fn test_empty_timeline_has_no_chart() {
        assert!(line_chart(&[]).is_none());
    }

    #[test]
    fn test_y_ticks_rounded() {
        let chart = line_chart(&timeline(&[0, 2, 4, 4, 8])).unwrap();
        assert_eq!(chart.max_y, 8);

        let values: Vec<u64> = chart.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0, 2, 3, 5, 6, 8]);
    }

    #[test]
    fn test_all_zero_counts_use_unit_domain() {
        let chart = line_chart(&timeline(&[0, 0, 0])).unwrap();
        assert_eq!(chart.max_y, 1);

        let values: Vec<u64> = chart.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0, 1]);
        assert!(chart.points.iter().all(|p| p.y == 230.0));
    }

    #[test]
    fn test_small_max_limits_tick_count() {
        let chart = line_chart(&timeline(&[1, 3, 2])).unwrap();
        let values: Vec<u64> = chart.y_ticks.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dimensions() {
        let chart = line_chart(&timeline(&[1, 2])).unwrap();
        assert_eq!(chart.width, 360.0 + 52.0);
        assert_eq!(chart.height, 260.0);

        let chart = line_chart(&timeline(&[1; 30])).unwrap();
        assert_eq!(chart.width, 660.0 + 52.0);
    }

    #[test]
    fn test_points_and_path() {
        let chart = line_chart(&timeline(&[0, 4, 2])).unwrap();

        // plot width 360 over two intervals
        assert_eq!(chart.points[0].x, 32.0);
        assert_eq!(chart.points[1].x, 212.0);
        assert_eq!(chart.points[2].x, 392.0);

        // origin at the bottom
        assert_eq!(chart.points[0].y, 230.0);
        assert_eq!(chart.points[1].y, 10.0);
        assert_eq!(chart.points[2].y, 120.0);

        assert_eq!(chart.path, "M 32,230 L 212,10 L 392,120");
    }

    #[test]
    fn test_single_point_sits_on_left_edge() {
        let chart = line_chart(&timeline(&[5])).unwrap();
        assert_eq!(chart.points[0].x, 32.0);
        assert_eq!(chart.path, "M 32,10");
        assert_eq!(chart.x_labels.len(), 1);
    }

    #[test]
    fn test_x_labels_sparse() {
        let chart = line_chart(&timeline(&[1; 30])).unwrap();
        let indices: Vec<usize> = chart.x_labels.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 5, 10, 15, 20, 25]);
        assert_eq!(chart.x_labels[1].label, "05-06");

        let chart = line_chart(&timeline(&[1; 7])).unwrap();
        let indices: Vec<usize> = chart.x_labels.iter().map(|l| l.index).collect();
        assert_eq!(indices, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_axis_label_fallback() {
        assert_eq!(axis_label("2024-12-31"), "12-31");
        assert_eq!(axis_label("2024-12-31T08:00"), "12-31T08:00");
        assert_eq!(axis_label("Mon"), "");
    }

    #[test]
    fn test_pie_arcs_contiguous() {
        let segments = vec![
            PieSegment::new("A", 60.0, "#000"),
            PieSegment::new("B", 40.0, "#fff"),
        ];
        let arcs = pie_arcs(&segments, 70.0);

        assert!(approx(arcs[0].dash, 263.9));
        assert_eq!(arcs[0].offset, 0.0);
        assert!(approx(arcs[1].dash, 175.9));
        assert!(approx(arcs[1].offset, -263.9));
        assert!(approx(arcs[0].dash + arcs[0].gap, 439.8));
    }

    #[test]
    fn test_pie_arcs_follow_input_order_with_gap() {
        let segments = vec![
            PieSegment::new("A", 10.0, "#111"),
            PieSegment::new("B", 20.0, "#222"),
            PieSegment::new("C", 30.0, "#333"),
        ];
        let arcs = pie_arcs(&segments, 70.0);
        let labels: Vec<&str> = arcs.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);

        let circumference = 2.0 * PI * 70.0;
        assert!(approx(arcs[2].offset, -0.3 * circumference));

        let traced: f64 = arcs.iter().map(|a| a.dash).sum();
        assert!(traced < circumference);
    }

    #[test]
    fn test_dash_array_format() {
        let arcs = pie_arcs(&[PieSegment::new("All", 100.0, "#000")], 70.0);
        assert_eq!(arcs[0].gap, 0.0);
        assert!(arcs[0].dash_array.ends_with(" 0"));
    }

    #[test]
    fn test_demographic_segments() {
        let demographics = Demographics {
            male: GroupShare { count: 6, percent: 60.0 },
            female: GroupShare { count: 4, percent: 40.0 },
        };
        let segments = gender_segments(&demographics);
        assert_eq!(segments[0].label, "Male");
        assert_eq!(segments[1].color, "#EC4899");

        let groups = AgeGroups {
            kids: LabeledGroupShare { label: "Kids".into(), count: 1, percent: 10.0 },
            teens: LabeledGroupShare { label: "Teens".into(), count: 2, percent: 20.0 },
            adults: LabeledGroupShare { label: "Adults".into(), count: 7, percent: 70.0 },
        };
        let segments = age_segments(&groups);
        let keys: Vec<_> = segments.iter().map(|s| s.key.as_deref()).collect();
        assert_eq!(keys, vec![Some("kids"), Some("teens"), Some("adults")]);

        let chart = pie_chart(&segments);
        assert_eq!(chart.arcs.len(), 3);
        assert!(approx(chart.arcs[2].offset, -0.3 * chart.circumference));
    }
}
