//! Hand-written SVG charts. Every function returns a complete standalone
//! SVG document; writing it anywhere is the caller's business.

use crate::analyzer::market_indicators::MarketIndicators;
use crate::model::{CorrelationMatrix, Series, TrendLine};
use chrono::NaiveDate;

const WIDTH: i32 = 960;
const HEIGHT: i32 = 480;
const PADDING: f64 = 48.0;
const PALETTE: &[&str] = &[
    "#348dc1", "#ff9933", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];
const AXIS_COLOR: &str = "#000";
const GRID_COLOR: &str = "#e5e5e5";

struct Line {
    label: Option<String>,
    color: &'static str,
    stroke_width: f64,
    dash: bool,
    points: Vec<(NaiveDate, f64)>,
}

struct LegendEntry {
    label: String,
    color: &'static str,
    dash: bool,
}

fn color_for(idx: usize) -> &'static str {
    PALETTE[idx % PALETTE.len()]
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn svg_header(width: i32, height: i32, title: &str) -> String {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}"><style>text{{font-family:Arial,sans-serif;font-size:11px;fill:#555}}</style><rect width="100%" height="100%" fill="#fff" /><text x="{cx:.2}" y="24" text-anchor="middle" font-size="15" fill="#222">{title}</text>"##,
        w = width,
        h = height,
        cx = width as f64 / 2.0,
        title = escape(title)
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn empty_chart(title: &str) -> String {
    let mut svg = svg_header(WIDTH, HEIGHT, title);
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">No data</text>"#,
        x = WIDTH as f64 / 2.0,
        y = HEIGHT as f64 / 2.0
    ));
    svg.push_str(svg_footer());
    svg
}

fn scale_value(value: f64, min_v: f64, max_v: f64, height: f64) -> f64 {
    if (max_v - min_v).abs() < f64::EPSILON {
        return height / 2.0;
    }

    let inner_height = height - 2.0 * PADDING;
    let norm = (value - min_v) / (max_v - min_v);
    PADDING + (1.0 - norm) * inner_height
}

fn scale_date(date: NaiveDate, start: NaiveDate, end: NaiveDate, width: f64) -> f64 {
    let span = (end - start).num_days();
    if span == 0 {
        return width / 2.0;
    }
    let inner_width = width - 2.0 * PADDING;
    PADDING + inner_width * ((date - start).num_days() as f64 / span as f64)
}

fn value_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut extent: Option<(f64, f64)> = None;
    for v in values.filter(|v| v.is_finite()) {
        extent = Some(match extent {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        });
    }
    extent
}

fn date_extent(lines: &[Line]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = lines.iter().flat_map(|l| l.points.iter().map(|(d, _)| *d));
    let start = dates.clone().min()?;
    let end = dates.max()?;
    Some((start, end))
}

fn add_value_axis(
    svg: &mut String,
    min_v: f64,
    max_v: f64,
    width: f64,
    height: f64,
    percent: bool,
) {
    let ticks = 5;
    for i in 0..=ticks {
        let value = min_v + (max_v - min_v) * i as f64 / ticks as f64;
        let y = scale_value(value, min_v, max_v, height);
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
            x1 = PADDING,
            x2 = width - PADDING,
            y = y,
            color = GRID_COLOR
        ));
        let label = if percent {
            format!("{:.1}%", value * 100.0)
        } else {
            format!("{:.2}", value)
        };
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
            x = PADDING - 6.0,
            y = y + 4.0,
            label = label
        ));
    }
}

fn add_time_axis(svg: &mut String, start: NaiveDate, end: NaiveDate, width: f64, height: f64) {
    let axis_y = height - PADDING + 5.0;
    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1" />"#,
        x1 = PADDING,
        x2 = width - PADDING,
        y = axis_y,
        color = AXIS_COLOR
    ));

    let span = (end - start).num_days();
    let ticks: i64 = if span == 0 { 0 } else { 4 };
    for i in 0..=ticks {
        let date = start + chrono::Duration::days(if ticks == 0 { 0 } else { span * i / ticks });
        let x = scale_date(date, start, end, width);
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = x,
            y = axis_y + 16.0,
            label = date.format("%Y-%m-%d")
        ));
    }
}

fn draw_legend(svg: &mut String, entries: &[LegendEntry]) {
    let mut y = PADDING + 14.0;
    let x = PADDING + 10.0;
    for entry in entries {
        let dash = if entry.dash { "4 3" } else { "0" };
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="1.5" stroke-dasharray="{dash}" />"##,
            x1 = x,
            x2 = x + 20.0,
            y = y - 4.0,
            color = entry.color,
            dash = dash
        ));
        svg.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="start" fill="#333">{label}</text>"##,
            x = x + 26.0,
            y = y,
            label = escape(&entry.label)
        ));
        y += 16.0;
    }
}

fn render_time_chart(lines: &[Line], title: &str, percent: bool, zero_line: bool) -> String {
    let (Some((start, end)), Some((mut min_v, mut max_v))) = (
        date_extent(lines),
        value_extent(lines.iter().flat_map(|l| l.points.iter().map(|(_, v)| *v))),
    ) else {
        return empty_chart(title);
    };
    if zero_line {
        min_v = min_v.min(0.0);
        max_v = max_v.max(0.0);
    }

    let width = WIDTH as f64;
    let height = HEIGHT as f64;
    let mut svg = svg_header(WIDTH, HEIGHT, title);
    add_value_axis(&mut svg, min_v, max_v, width, height, percent);

    if zero_line {
        let y = scale_value(0.0, min_v, max_v, height);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#bbbbbb" stroke-width="1" stroke-dasharray="4 3" />"##,
            x1 = PADDING,
            x2 = width - PADDING,
            y = y
        ));
    }

    let mut legend = Vec::new();
    for line in lines {
        let coords: Vec<String> = line
            .points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| {
                format!(
                    "{:.2},{:.2}",
                    scale_date(*d, start, end, width),
                    scale_value(*v, min_v, max_v, height)
                )
            })
            .collect();
        if coords.is_empty() {
            continue;
        }
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{color}" stroke-width="{width}" stroke-dasharray="{dash}" points="{points}" />"#,
            color = line.color,
            width = line.stroke_width,
            dash = if line.dash { "4 3" } else { "0" },
            points = coords.join(" ")
        ));
        if let Some(label) = &line.label {
            legend.push(LegendEntry {
                label: label.clone(),
                color: line.color,
                dash: line.dash,
            });
        }
    }

    add_time_axis(&mut svg, start, end, width, height);
    draw_legend(&mut svg, &legend);
    svg.push_str(svg_footer());
    svg
}

fn defined_points(series: &Series, values: &[Option<f64>]) -> Vec<(NaiveDate, f64)> {
    series
        .points
        .iter()
        .zip(values)
        .filter_map(|(p, v)| v.map(|v| (p.date, v)))
        .collect()
}

/// Overlay of closing prices; rolling means are drawn dashed when attached.
pub fn price_chart(series: &[&Series], title: &str) -> String {
    let mut lines = Vec::new();
    for (idx, s) in series.iter().enumerate() {
        let color = color_for(idx);
        lines.push(Line {
            label: Some(s.name.clone()),
            color,
            stroke_width: 1.5,
            dash: false,
            points: s.points.iter().map(|p| (p.date, p.price)).collect(),
        });
        if let Some(derived) = &s.derived {
            for (window, means) in [
                (derived.short_window, &derived.short_mean),
                (derived.long_window, &derived.long_mean),
            ] {
                let points = defined_points(s, means);
                if points.is_empty() {
                    continue;
                }
                lines.push(Line {
                    label: Some(format!("{} MA{}", s.name, window)),
                    color,
                    stroke_width: 1.0,
                    dash: true,
                    points,
                });
            }
        }
    }
    render_time_chart(&lines, title, false, false)
}

/// Overlay of period returns.
pub fn returns_chart(series: &[&Series], title: &str) -> String {
    let lines: Vec<Line> = series
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let returns = match &s.derived {
                Some(derived) => derived.period_return.clone(),
                None => {
                    let prices: Vec<Option<f64>> = s.points.iter().map(|p| Some(p.price)).collect();
                    MarketIndicators::period_returns(&prices)
                }
            };
            Line {
                label: Some(s.name.clone()),
                color: color_for(idx),
                stroke_width: 1.0,
                dash: false,
                points: defined_points(s, &returns),
            }
        })
        .collect();
    render_time_chart(&lines, title, true, true)
}

/// Diverging blue-white-red fill for a value in [-1, 1].
fn heat_color(value: f64) -> String {
    let v = value.clamp(-1.0, 1.0);
    let (r, g, b) = if v >= 0.0 {
        (255.0, 255.0 * (1.0 - v), 255.0 * (1.0 - v))
    } else {
        (255.0 * (1.0 + v), 255.0 * (1.0 + v), 255.0)
    };
    format!("#{:02x}{:02x}{:02x}", r.round() as u8, g.round() as u8, b.round() as u8)
}

/// Labeled correlation grid with each coefficient printed in its cell.
pub fn heatmap(matrix: &CorrelationMatrix, title: &str) -> String {
    let n = matrix.size();
    if n == 0 {
        return empty_chart(title);
    }
    let label_space = 120.0;
    let cell = ((WIDTH.min(HEIGHT) as f64 - label_space - PADDING) / n as f64).clamp(24.0, 80.0);
    let width = (label_space + cell * n as f64 + PADDING).ceil() as i32;
    let height = (label_space + cell * n as f64 + PADDING).ceil() as i32;

    let mut svg = svg_header(width, height, title);
    for (i, label) in matrix.labels.iter().enumerate() {
        let offset = label_space + cell * (i as f64 + 0.5);
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
            x = label_space - 6.0,
            y = offset + 4.0,
            label = escape(label)
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="start" transform="rotate(-45 {x:.2} {y:.2})">{label}</text>"#,
            x = offset,
            y = label_space - 6.0,
            label = escape(label)
        ));
    }

    for i in 0..n {
        for j in 0..n {
            let x = label_space + cell * j as f64;
            let y = label_space + cell * i as f64;
            let (fill, text) = match matrix.get(i, j) {
                Some(v) => (heat_color(v), format!("{:.2}", v)),
                None => ("#dddddd".to_string(), "n/a".to_string()),
            };
            svg.push_str(&format!(
                r##"<rect x="{x:.2}" y="{y:.2}" width="{s:.2}" height="{s:.2}" fill="{fill}" stroke="#fff" stroke-width="1" />"##,
                x = x,
                y = y,
                s = cell,
                fill = fill
            ));
            svg.push_str(&format!(
                r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" fill="#222">{text}</text>"##,
                x = x + cell / 2.0,
                y = y + cell / 2.0 + 4.0,
                text = text
            ));
        }
    }
    svg.push_str(svg_footer());
    svg
}

/// Price scatter with the fitted trend line drawn between its endpoints.
pub fn trend_chart(series: &Series, trend: &TrendLine, title: &str) -> String {
    let points: Vec<(NaiveDate, f64)> = series
        .points
        .iter()
        .filter(|p| p.price.is_finite())
        .map(|p| (p.date, p.price))
        .collect();
    let values = points
        .iter()
        .map(|(_, v)| *v)
        .chain([trend.start.1, trend.end.1]);
    let Some((min_v, max_v)) = value_extent(values) else {
        return empty_chart(title);
    };
    let (start, end) = (trend.start.0, trend.end.0);

    let width = WIDTH as f64;
    let height = HEIGHT as f64;
    let color = color_for(0);
    let mut svg = svg_header(WIDTH, HEIGHT, title);
    add_value_axis(&mut svg, min_v, max_v, width, height, false);

    for (date, price) in &points {
        svg.push_str(&format!(
            r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="2" fill="{color}" fill-opacity="0.6" />"#,
            cx = scale_date(*date, start, end, width),
            cy = scale_value(*price, min_v, max_v, height),
            color = color
        ));
    }
    svg.push_str(&format!(
        r##"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}" stroke="#d62728" stroke-width="2" />"##,
        x1 = scale_date(start, start, end, width),
        y1 = scale_value(trend.start.1, min_v, max_v, height),
        x2 = scale_date(end, start, end, width),
        y2 = scale_value(trend.end.1, min_v, max_v, height)
    ));

    add_time_axis(&mut svg, start, end, width, height);
    draw_legend(
        &mut svg,
        &[
            LegendEntry {
                label: format!("{} price", series.name),
                color,
                dash: false,
            },
            LegendEntry {
                label: format!("trend {:+.4}/day", trend.slope_per_day),
                color: "#d62728",
                dash: false,
            },
        ],
    );
    svg.push_str(svg_footer());
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, AnalyzerImpl, fit_trend};
    use crate::model::PricePoint;
    use chrono::Duration;

    fn sample(name: &str, prices: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Series::new(
            name,
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| PricePoint {
                    date: start + Duration::days(i as i64),
                    price,
                })
                .collect(),
        )
    }

    #[test]
    fn test_price_chart_has_line_per_series_and_means() {
        let mut a = sample("A & Co", &[1.0, 2.0, 3.0, 4.0]);
        let b = sample("B", &[4.0, 3.0, 2.0, 1.0]);
        AnalyzerImpl::new(2, 3).enrich(&mut a);

        let svg = price_chart(&[&a, &b], "Prices");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        // two price lines plus MA2 and MA3 for the enriched series
        assert_eq!(svg.matches("<polyline").count(), 4);
        assert!(svg.contains("A &amp; Co MA2"));
    }

    #[test]
    fn test_empty_input_still_valid_svg() {
        let svg = price_chart(&[], "Prices");
        assert!(svg.contains("No data"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_returns_chart_skips_first_point() {
        let a = sample("A", &[1.0, 2.0, 3.0]);
        let svg = returns_chart(&[&a], "Returns");
        let line = svg.split("<polyline").nth(1).unwrap();
        let points = line.split("points=\"").nth(1).unwrap().split('"').next().unwrap();
        assert_eq!(points.split(' ').count(), 2);
    }

    #[test]
    fn test_heatmap_cells() {
        let matrix = CorrelationMatrix {
            labels: vec!["A".into(), "B".into()],
            values: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };
        let svg = heatmap(&matrix, "Corr");
        assert_eq!(svg.matches("<rect x=").count(), 4);
        assert!(svg.contains("n/a"));
        assert!(svg.contains("#ff0000"));
    }

    #[test]
    fn test_heat_color_scale() {
        assert_eq!(heat_color(1.0), "#ff0000");
        assert_eq!(heat_color(0.0), "#ffffff");
        assert_eq!(heat_color(-1.0), "#0000ff");
    }

    #[test]
    fn test_trend_chart() {
        let a = sample("A", &[5.0, 7.0, 9.0, 11.0]);
        let trend = fit_trend(&a).unwrap();
        let svg = trend_chart(&a, &trend, "A Trend");
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains("trend +2.0000/day"));
    }
}
