//! HTML report generator.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::result::{BacktestMetrics, TaskResult};

use super::{write_atomic, ReportError, ReportSink};

/// Writes `{dir}/{instrument}/report_{A}_{paramsA}_{B}_{paramsB}.html`.
#[derive(Debug, Clone)]
pub struct HtmlReportSink {
    dir: PathBuf,
}

impl HtmlReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, result: &TaskResult) -> PathBuf {
        self.dir
            .join(&result.task.instrument)
            .join(format!("{}.html", result.task.report_stem()))
    }
}

impl ReportSink for HtmlReportSink {
    fn write(&self, result: &TaskResult) -> Result<PathBuf, ReportError> {
        let metrics = result
            .metrics()
            .ok_or_else(|| ReportError::Render(format!("task {} has no metrics", result.task)))?;
        let path = self.path_for(result);
        write_atomic(&path, render(result, metrics).as_bytes())?;
        Ok(path)
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `1234567.891` → `1,234,567.89`
fn thousands(v: f64) -> String {
    if !v.is_finite() {
        return "N/A".to_string();
    }
    let fixed = format!("{:.2}", v.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

const STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif; margin: 2em; background-color: #f8f9fa; color: #212529; }
.container { max-width: 800px; margin: auto; background: white; padding: 2em; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.1); }
h1, h2 { color: #0056b3; border-bottom: 2px solid #dee2e6; padding-bottom: 0.3em; }
table { border-collapse: collapse; width: 100%; margin-top: 1.5em; }
th, td { border: 1px solid #dee2e6; padding: 12px; text-align: left; }
th { background-color: #e9ecef; font-weight: 600; }
tr:nth-child(even) { background-color: #f8f9fa; }
";

fn row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(html, "<tr><th>{label}</th><td>{value}</td></tr>");
}

pub fn render(result: &TaskResult, m: &BacktestMetrics) -> String {
    let task = &result.task;
    let instrument = escape(&task.instrument);
    let sharpe = m
        .sharpe
        .filter(|s| s.is_finite())
        .map(|s| format!("{s:.3}"))
        .unwrap_or_else(|| "N/A".to_string());
    let win_rate = m
        .trades
        .win_rate()
        .map(|w| format!("{:.2}", w * 100.0))
        .unwrap_or_else(|| "N/A".to_string());

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <title>Backtest Report: {instrument}</title>\n<style>\n{STYLE}</style>\n</head>\n\
         <body>\n<div class=\"container\">\n<h1>Backtest Report</h1>\n"
    );

    html.push_str("<h2>Configuration</h2>\n<table>\n");
    row(&mut html, "Instrument", &instrument);
    row(
        &mut html,
        "Indicator 1",
        &format!(
            "{} (Params: {})",
            escape(&task.indicator_a),
            escape(&task.params_a.to_string())
        ),
    );
    row(
        &mut html,
        "Indicator 2",
        &format!(
            "{} (Params: {})",
            escape(&task.indicator_b),
            escape(&task.params_b.to_string())
        ),
    );
    row(&mut html, "Bars", &m.bars.to_string());
    row(&mut html, "Dataset", &format!("<code>{}</code>", m.dataset_hash));
    html.push_str("</table>\n");

    html.push_str("<h2>Performance Summary</h2>\n<table>\n");
    row(&mut html, "Net Profit/Loss (PNL)", &thousands(m.pnl));
    row(&mut html, "Final Portfolio Value", &thousands(m.final_value));
    row(&mut html, "Sharpe Ratio (Annualized)", &sharpe);
    row(&mut html, "Max Drawdown (%)", &format!("{:.2}", m.max_drawdown_pct));
    row(&mut html, "Total Trades", &m.trades.total.to_string());
    row(&mut html, "Open Trades", &m.trades.open.to_string());
    row(&mut html, "Winning Trades", &m.trades.won.to_string());
    row(&mut html, "Losing Trades", &m.trades.lost.to_string());
    row(&mut html, "Win Rate (% of closed trades)", &win_rate);
    html.push_str("</table>\n</div>\n</body>\n</html>\n");
    html
}
