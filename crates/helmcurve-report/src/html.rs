//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined and the
//! charts drawn as inline SVG.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use helmcurve_core::discretize::DifficultyAxis;
use helmcurve_core::report::{AucPoint, DifficultyReport, PlotKind};

const PALETTE: &[&str] = &[
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#ca8a04", "#db2777",
];

const CHART_WIDTH: f64 = 640.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 44.0;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

fn axis_label(axis: DifficultyAxis) -> &'static str {
    match axis {
        DifficultyAxis::Quantile => "Difficulty quantile",
        DifficultyAxis::Raw => "Difficulty",
    }
}

/// Generate an HTML report from a difficulty report.
pub fn generate_html(report: &DifficultyReport) -> String {
    let settings = &report.settings;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>helmcurve report: {}</title>\n",
        html_escape(&report.task)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>helmcurve report</h1>\n");
    let split = settings
        .split
        .map(|s| s.to_string())
        .unwrap_or_else(|| "all splits".to_string());
    html.push_str(&format!(
        "<p class=\"meta\">Task: <strong>{}</strong> | {} instances | {} models | {} | {} | {}</p>\n",
        html_escape(&report.task),
        report.instance_count,
        report.models.len(),
        split,
        axis_label(settings.axis),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Characteristic chart
    html.push_str("<section class=\"curves\">\n");
    match settings.plot {
        PlotKind::Logistic => {
            html.push_str("<h2>Agent characteristic curves</h2>\n");
            if !report.logistic.is_empty() {
                html.push_str(&logistic_chart(report));
            }
        }
        PlotKind::Binned => {
            html.push_str(&format!(
                "<h2>Binned accuracy ({} bins)</h2>\n",
                settings.num_bins
            ));
            if !report.binned.is_empty() {
                html.push_str(&binned_chart(report));
            }
        }
    }
    html.push_str("</section>\n");

    // AUC
    html.push_str("<section class=\"auc\">\n");
    html.push_str("<h2>Area under the curve</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Model</th><th>AUC</th><th>log10(params)</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for point in &report.auc {
        let log_params = point
            .log_params
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr><td>{}</td><td>{:.3}</td><td>{}</td></tr>\n",
            html_escape(&point.model),
            point.auc,
            log_params
        ));
    }
    html.push_str("</tbody></table>\n");
    let sized: Vec<&AucPoint> = report.auc.iter().filter(|p| p.log_params.is_some()).collect();
    if !sized.is_empty() {
        html.push_str(&auc_chart(&sized));
    }
    html.push_str("</section>\n");

    // Per-model accuracy
    let selected: HashSet<&str> = settings.models.iter().map(String::as_str).collect();
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Model accuracy</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Model</th><th onclick=\"sortTable(1)\">Instances</th><th onclick=\"sortTable(2)\">Accuracy</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for summary in &report.models {
        let class = if selected.contains(summary.model.as_str()) {
            " class=\"selected\""
        } else {
            ""
        };
        let accuracy = summary
            .accuracy
            .map(|a| format!("{:.1}%", a * 100.0))
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr{}><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&summary.model),
            summary.instances,
            accuracy
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &DifficultyReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    tracing::debug!("wrote HTML report to {}", path.display());
    Ok(())
}

/// Linear mapping from data space into the plot area.
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new((x_min, x_max): (f64, f64), (y_min, y_max): (f64, f64)) -> Self {
        let (x_min, x_max) = widen(x_min, x_max);
        let (y_min, y_max) = widen(y_min, y_max);
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    fn px(&self, x: f64) -> f64 {
        let width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        MARGIN_LEFT + (x - self.x_min) / (self.x_max - self.x_min) * width
    }

    fn py(&self, y: f64) -> f64 {
        let height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + (self.y_max - y) / (self.y_max - self.y_min) * height
    }

    /// Opening tag, axes, tick labels and axis titles.
    fn open(&self, x_title: &str, y_title: &str) -> String {
        let mut svg = format!(
            "<svg width=\"{CHART_WIDTH}\" height=\"{CHART_HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\">\n"
        );
        let (left, right) = (MARGIN_LEFT, CHART_WIDTH - MARGIN_RIGHT);
        let (top, bottom) = (MARGIN_TOP, CHART_HEIGHT - MARGIN_BOTTOM);
        svg.push_str(&format!(
            "  <path d=\"M{left},{top} V{bottom} H{right}\" stroke=\"currentColor\" fill=\"none\"/>\n"
        ));

        for i in 0..=4 {
            let t = i as f64 / 4.0;
            let x = self.x_min + t * (self.x_max - self.x_min);
            let y = self.y_min + t * (self.y_max - self.y_min);
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
                self.px(x),
                bottom + 16.0,
                tick(x)
            ));
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
                left - 6.0,
                self.py(y),
                tick(y)
            ));
        }

        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\">{}</text>\n",
            (left + right) / 2.0,
            CHART_HEIGHT - 6.0,
            html_escape(x_title)
        ));
        svg.push_str(&format!(
            "  <text x=\"14\" y=\"{:.1}\" font-size=\"12\" fill=\"currentColor\" text-anchor=\"middle\" transform=\"rotate(-90 14 {:.1})\">{}</text>\n",
            (top + bottom) / 2.0,
            (top + bottom) / 2.0,
            html_escape(y_title)
        ));
        svg
    }

    fn polyline(&self, points: impl Iterator<Item = (f64, f64)>, color: &str) -> String {
        let coords: Vec<String> = points
            .map(|(x, y)| format!("{:.1},{:.1}", self.px(x), self.py(y)))
            .collect();
        format!(
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            coords.join(" "),
            color
        )
    }
}

fn widen(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        (0.0, 1.0)
    } else if max - min < 1e-9 {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn tick(v: f64) -> String {
    if v.abs() >= 10.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn legend(models: impl Iterator<Item = String>) -> String {
    let mut html = String::from("<ul class=\"legend\">\n");
    for (i, model) in models.enumerate() {
        html.push_str(&format!(
            "<li><span class=\"swatch\" style=\"background:{}\"></span>{}</li>\n",
            color(i),
            html_escape(&model)
        ));
    }
    html.push_str("</ul>\n");
    html
}

fn logistic_chart(report: &DifficultyReport) -> String {
    let xs = bounds(report.logistic.iter().flat_map(|s| s.xs.iter().copied()));
    let frame = Frame::new(xs, (0.0, 1.0));

    let mut svg = frame.open(axis_label(report.settings.axis), "P(correct)");
    for (i, series) in report.logistic.iter().enumerate() {
        let points = series.xs.iter().copied().zip(series.ys.iter().copied());
        svg.push_str(&frame.polyline(points, color(i)));
    }
    svg.push_str("</svg>\n");
    svg.push_str(&legend(report.logistic.iter().map(|s| s.model.clone())));
    svg
}

fn binned_chart(report: &DifficultyReport) -> String {
    let xs = bounds(
        report
            .binned
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.bucket)),
    );
    let frame = Frame::new(xs, (0.0, 1.0));

    let mut svg = frame.open(axis_label(report.settings.axis), "Mean correctness");
    for (i, series) in report.binned.iter().enumerate() {
        let c = color(i);
        for p in &series.points {
            let x = frame.px(p.bucket);
            svg.push_str(&format!(
                "  <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"{c}\" stroke-opacity=\"0.5\"/>\n",
                frame.py(p.ci_low),
                frame.py(p.ci_high)
            ));
            svg.push_str(&format!(
                "  <circle cx=\"{x:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{c}\"><title>n={}</title></circle>\n",
                frame.py(p.mean),
                p.count
            ));
        }
        svg.push_str(&frame.polyline(series.points.iter().map(|p| (p.bucket, p.mean)), c));
    }
    svg.push_str("</svg>\n");
    svg.push_str(&legend(report.binned.iter().map(|s| s.model.clone())));
    svg
}

fn auc_chart(points: &[&AucPoint]) -> String {
    let xs = bounds(points.iter().filter_map(|p| p.log_params));
    let ys = bounds(points.iter().map(|p| p.auc));
    let frame = Frame::new(xs, ys);

    let mut svg = frame.open("log10(params)", "AUC");
    for (i, p) in points.iter().enumerate() {
        let Some(log_params) = p.log_params else {
            continue;
        };
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"5\" fill=\"{}\"><title>{}</title></circle>\n",
            frame.px(log_params),
            frame.py(p.auc),
            color(i),
            html_escape(&p.model)
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --selected: #dbeafe; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --selected: #1e3a8a; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.selected { background: var(--selected); font-weight: bold; }
.legend { list-style: none; padding: 0; display: flex; flex-wrap: wrap; gap: 1rem; }
.swatch { display: inline-block; width: 12px; height: 12px; margin-right: 0.4rem; border-radius: 2px; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
