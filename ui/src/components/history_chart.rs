//! Line chart for backend time series.
//!
//! Each chart owns its tooltip: hovering a point shows it, clicking pins it,
//! clicking anywhere outside the chart dismisses it, and unmounting the chart
//! drops it with the rest of the component state.

use dioxus::prelude::*;

use crate::core::format::{format_optional, format_percent};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 280.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 32.0;

pub const PALETTE: [&str; 6] = [
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub color: String,
    /// `(date, value)` in chronological order; gaps are `None`.
    pub points: Vec<(String, Option<f64>)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueFormat {
    Percent,
    Decimal(usize),
}

impl ValueFormat {
    fn format(&self, value: f64) -> String {
        match self {
            ValueFormat::Percent => format_percent(Some(value)),
            ValueFormat::Decimal(places) => format_optional(Some(value), *places),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlottedSeries {
    pub label: String,
    pub color: String,
    pub path: String,
    pub points: Vec<PlottedPoint>,
}

#[derive(Debug, Clone, PartialEq)]
struct Tooltip {
    x: f64,
    y: f64,
    text: String,
    pinned: bool,
}

impl Tooltip {
    fn at(point: &PlottedPoint, pinned: bool) -> Self {
        Self {
            x: point.x,
            y: point.y,
            text: point.label.clone(),
            pinned,
        }
    }
}

/// Value range across every series, padded so flat lines stay visible.
fn value_range(series: &[ChartSeries], format: ValueFormat) -> (f64, f64) {
    if format == ValueFormat::Percent {
        return (0.0, 1.0);
    }
    let values = series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|(_, v)| *v))
        .filter(|v| v.is_finite());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        (0.0, 1.0)
    } else if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

/// Project series onto the chart area. Dates share one x axis.
pub fn plot(series: &[ChartSeries], format: ValueFormat) -> Vec<PlottedSeries> {
    let mut dates: Vec<&str> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(d, _)| d.as_str()))
        .collect();
    dates.sort();
    dates.dedup();

    let (lo, hi) = value_range(series, format);
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let step = if dates.len() > 1 {
        plot_w / (dates.len() - 1) as f64
    } else {
        0.0
    };

    series
        .iter()
        .map(|s| {
            let points: Vec<PlottedPoint> = s
                .points
                .iter()
                .filter_map(|(date, value)| {
                    let value = value.filter(|v| v.is_finite())?;
                    let index = dates.binary_search(&date.as_str()).ok()?;
                    Some(PlottedPoint {
                        x: MARGIN_LEFT + step * index as f64,
                        y: MARGIN_TOP + plot_h * (1.0 - (value - lo) / (hi - lo)),
                        label: format!("{} · {date} · {}", s.label, format.format(value)),
                    })
                })
                .collect();
            let path = points
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{}{:.1},{:.1}", if i == 0 { "M" } else { "L" }, p.x, p.y))
                .collect::<Vec<_>>()
                .join(" ");
            PlottedSeries {
                label: s.label.clone(),
                color: s.color.clone(),
                path,
                points,
            }
        })
        .collect()
}

#[component]
pub fn HistoryChart(
    class: String,
    title: String,
    series: Vec<ChartSeries>,
    format: ValueFormat,
) -> Element {
    let mut tooltip = use_signal(|| None::<Tooltip>);
    let plotted = plot(&series, format);
    let (lo, hi) = value_range(&series, format);
    let pinned = tooltip().map(|t| t.pinned).unwrap_or(false);
    let axis_bottom = HEIGHT - MARGIN_BOTTOM;

    rsx! {
        if pinned {
            div {
                class: "chart-backdrop",
                "data-export-ignore": "true",
                onclick: move |_| tooltip.set(None),
            }
        }
        figure { class: "chart {class}",
            figcaption { class: "chart__title", "{title}" }
            svg {
                width: "{WIDTH}",
                height: "{HEIGHT}",
                view_box: "0 0 {WIDTH} {HEIGHT}",
                line { x1: "{MARGIN_LEFT}", y1: "{axis_bottom}", x2: "{WIDTH - MARGIN_RIGHT}", y2: "{axis_bottom}", stroke: "#9ca3af" }
                line { x1: "{MARGIN_LEFT}", y1: "{MARGIN_TOP}", x2: "{MARGIN_LEFT}", y2: "{axis_bottom}", stroke: "#9ca3af" }
                text { x: "{MARGIN_LEFT - 6.0}", y: "{MARGIN_TOP + 4.0}", text_anchor: "end", font_size: "11", fill: "#4b5563", "{format.format(hi)}" }
                text { x: "{MARGIN_LEFT - 6.0}", y: "{axis_bottom}", text_anchor: "end", font_size: "11", fill: "#4b5563", "{format.format(lo)}" }
                for line in plotted.iter() {
                    path { key: "{line.label}", d: "{line.path}", fill: "none", stroke: "{line.color}", stroke_width: "2" }
                }
                for line in plotted.iter() {
                    for point in line.points.iter() {
                        ChartPoint { point: point.clone(), color: line.color.clone(), tooltip }
                    }
                }
            }
            if let Some(tip) = tooltip() {
                div {
                    class: "chart__tooltip",
                    "data-export-ignore": "true",
                    style: "left: {tip.x}px; top: {tip.y}px;",
                    "{tip.text}"
                }
            }
            ul { class: "chart__legend",
                for line in plotted.iter() {
                    li { key: "{line.label}",
                        span { class: "chart__swatch", style: "background: {line.color}" }
                        "{line.label}"
                    }
                }
            }
        }
    }
}

#[component]
fn ChartPoint(point: PlottedPoint, color: String, tooltip: Signal<Option<Tooltip>>) -> Element {
    let mut tooltip = tooltip;
    let is_pinned = move || tooltip().map(|t| t.pinned).unwrap_or(false);
    let hover = point.clone();
    let pin = point.clone();

    rsx! {
        circle {
            cx: "{point.x}",
            cy: "{point.y}",
            r: "4",
            fill: "{color}",
            onmouseenter: move |_| {
                if !is_pinned() {
                    tooltip.set(Some(Tooltip::at(&hover, false)));
                }
            },
            onmouseleave: move |_| {
                if !is_pinned() {
                    tooltip.set(None);
                }
            },
            onclick: move |evt| {
                evt.stop_propagation();
                tooltip.set(Some(Tooltip::at(&pin, true)));
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[Option<f64>]) -> ChartSeries {
        ChartSeries {
            label: "Duke".into(),
            color: PALETTE[0].into(),
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("2025-03-0{}", i + 1), *v))
                .collect(),
        }
    }

    #[test]
    fn percent_series_span_the_full_height() {
        let plotted = plot(&[series(&[Some(0.0), Some(1.0)])], ValueFormat::Percent);
        let points = &plotted[0].points;
        assert_eq!(points[0].y, HEIGHT - MARGIN_BOTTOM);
        assert_eq!(points[1].y, MARGIN_TOP);
        assert_eq!(points[1].x, WIDTH - MARGIN_RIGHT);
        assert!(plotted[0].path.starts_with('M'));
        assert!(points[1].label.contains("100.0%"));
    }

    #[test]
    fn gaps_are_skipped_but_keep_their_slot() {
        let plotted = plot(&[series(&[Some(2.0), None, Some(4.0)])], ValueFormat::Decimal(1));
        let points = &plotted[0].points;
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].x, WIDTH - MARGIN_RIGHT);
    }

    #[test]
    fn flat_series_get_a_padded_range() {
        assert_eq!(
            value_range(&[series(&[Some(5.0), Some(5.0)])], ValueFormat::Decimal(1)),
            (4.0, 6.0)
        );
    }
}
