//! Server-rendered dashboard page.
//!
//! Charts are plain inline SVG so the page needs no scripts or assets.

use std::fmt::{self, Write};

use crate::analytics::{DashboardView, FilterOptions, HighRiskRow, ToolDetail};
use crate::data::DataSource;
use crate::models::RiskLevel;

use super::query::ViewQuery;

const HIGH_RISK_ROWS_SHOWN: usize = 15;
const BAR_WIDTH: usize = 360;

pub struct PageData<'a> {
    pub source: &'a DataSource,
    pub options: FilterOptions,
    pub query: &'a ViewQuery,
    pub view: DashboardView,
    pub high_risk: Vec<HighRiskRow>,
    pub tool_names: Vec<&'a str>,
    pub detail: Option<ToolDetail>,
    pub raw_query: String,
}

pub fn render(data: &PageData<'_>) -> String {
    let mut html = String::with_capacity(16 * 1024);
    if let Err(e) = write_page(&mut html, data) {
        tracing::error!(error = %e, "Failed to render dashboard page");
    }
    html
}

fn level_color(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "#d62728",
        RiskLevel::High => "#ff7f0e",
        RiskLevel::Medium => "#ffd700",
        RiskLevel::Low => "#2ca02c",
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

fn bar_len(count: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        count * BAR_WIDTH / max
    }
}

fn write_page(out: &mut String, data: &PageData<'_>) -> fmt::Result {
    out.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Shadow AI Discovery &amp; Risk Intake</title>\n<style>\n\
         body{font-family:sans-serif;margin:0;display:flex}\n\
         aside{width:240px;padding:16px;background:#f4f4f4;min-height:100vh}\n\
         main{flex:1;padding:16px 24px}\n\
         .cards{display:flex;gap:12px}\n\
         .card{border:1px solid #ddd;border-radius:6px;padding:12px;min-width:150px}\n\
         .card b{display:block;font-size:1.6em}\n\
         .notice{background:#fff3cd;border:1px solid #ffe08a;padding:8px;margin-bottom:12px}\n\
         table{border-collapse:collapse;margin:8px 0}\n\
         td,th{border:1px solid #ddd;padding:4px 8px;text-align:left}\n\
         </style>\n</head>\n<body>\n",
    );

    write_filters(out, data)?;

    out.push_str("<main>\n<h1>Shadow AI Discovery &amp; Risk Intake</h1>\n");
    if data.source.is_synthetic() {
        out.push_str(
            "<p class=\"notice\">No CSV files were found in the data directory; \
             showing synthetic demo data.</p>\n",
        );
    }

    write_kpis(out, &data.view)?;
    write_distribution(out, &data.view)?;
    write_categories(out, &data.view)?;
    write_timeline(out, &data.view)?;
    write_heatmap(out, &data.view)?;
    write_high_risk(out, &data.high_risk)?;
    write_detail(out, data.detail.as_ref())?;
    write_exports(out, &data.raw_query)?;

    out.push_str("</main>\n</body>\n</html>\n");
    Ok(())
}

fn write_checkboxes<'v>(
    out: &mut String,
    name: &str,
    values: impl Iterator<Item = &'v str>,
    is_checked: impl Fn(&str) -> bool,
) -> fmt::Result {
    // an all-unchecked group still submits the key, which selects nothing
    writeln!(out, "<input type=\"hidden\" name=\"{name}\" value=\"\">")?;
    for value in values {
        let value = escape(value);
        let checked = if is_checked(&value) { " checked" } else { "" };
        writeln!(
            out,
            "<label><input type=\"checkbox\" name=\"{name}\" value=\"{value}\"{checked}> {value}</label><br>"
        )?;
    }
    Ok(())
}

fn write_filters(out: &mut String, data: &PageData<'_>) -> fmt::Result {
    let filter = &data.query.filter;
    out.push_str("<aside>\n<form method=\"get\" action=\"/\">\n<h3>Risk level</h3>\n");
    write_checkboxes(
        out,
        "level",
        data.options.levels.iter().map(|l| l.as_str()),
        |v| {
            filter
                .levels
                .as_ref()
                .is_none_or(|set| set.iter().any(|l| l.as_str() == v))
        },
    )?;

    out.push_str("<h3>Department</h3>\n");
    write_checkboxes(
        out,
        "dept",
        data.options.departments.iter().map(String::as_str),
        |v| {
            filter
                .departments
                .as_ref()
                .is_none_or(|set| set.iter().any(|d| escape(d) == v))
        },
    )?;

    out.push_str("<h3>Category</h3>\n");
    write_checkboxes(
        out,
        "category",
        data.options.categories.iter().map(String::as_str),
        |v| {
            filter
                .categories
                .as_ref()
                .is_none_or(|set| set.iter().any(|c| escape(c) == v))
        },
    )?;

    out.push_str("<h3>Timeline</h3>\n<select name=\"granularity\">\n");
    for option in ["week", "month"] {
        let selected = if data.query.granularity.to_string() == option {
            " selected"
        } else {
            ""
        };
        writeln!(out, "<option value=\"{option}\"{selected}>{option}</option>")?;
    }
    out.push_str("</select>\n<h3>Tool detail</h3>\n<select name=\"tool\">\n<option value=\"\">(none)</option>\n");
    for name in &data.tool_names {
        let selected = if data.query.tool.as_deref() == Some(*name) {
            " selected"
        } else {
            ""
        };
        let name = escape(name);
        writeln!(out, "<option value=\"{name}\"{selected}>{name}</option>")?;
    }
    out.push_str("</select>\n<p><button type=\"submit\">Apply</button> <a href=\"/\">Reset</a></p>\n</form>\n</aside>\n");
    Ok(())
}

fn write_kpis(out: &mut String, view: &DashboardView) -> fmt::Result {
    let k = &view.kpis;
    writeln!(
        out,
        "<section class=\"cards\">\n\
         <div class=\"card\">Total AI tools<b>{}</b>+{} last 30 days</div>\n\
         <div class=\"card\">High-risk tools<b>{}</b>Critical or High</div>\n\
         <div class=\"card\">Users affected<b>{}</b></div>\n\
         <div class=\"card\">Average risk score<b>{:.1}</b>out of 100</div>\n\
         </section>",
        k.total_tools, view.recent_discoveries, k.high_risk_count, k.users_affected, k.average_risk_score
    )
}

fn write_distribution(out: &mut String, view: &DashboardView) -> fmt::Result {
    let counts = &view.risk_distribution;
    let max = counts.max();
    out.push_str("<h2>Risk distribution</h2>\n<svg width=\"480\" height=\"112\">\n");
    for (i, level) in RiskLevel::ALL.iter().enumerate() {
        let count = counts.get(*level);
        let y = i * 28;
        writeln!(
            out,
            "<text x=\"0\" y=\"{}\">{level}</text><rect x=\"70\" y=\"{y}\" width=\"{}\" height=\"20\" fill=\"{}\"/><text x=\"{}\" y=\"{}\">{count}</text>",
            y + 15,
            bar_len(count, max),
            level_color(*level),
            bar_len(count, max) + 76,
            y + 15,
        )?;
    }
    out.push_str("</svg>\n");
    Ok(())
}

fn write_categories(out: &mut String, view: &DashboardView) -> fmt::Result {
    let max = view.categories.iter().map(|c| c.count).max().unwrap_or(0);
    writeln!(
        out,
        "<h2>Top categories</h2>\n<svg width=\"600\" height=\"{}\">",
        view.categories.len() * 24
    )?;
    for (i, category) in view.categories.iter().enumerate() {
        let y = i * 24;
        let len = bar_len(category.count, max);
        writeln!(
            out,
            "<text x=\"0\" y=\"{}\">{}</text><rect x=\"180\" y=\"{y}\" width=\"{len}\" height=\"18\" fill=\"#1f77b4\"/><text x=\"{}\" y=\"{}\">{}</text>",
            y + 14,
            escape(&category.category),
            len + 186,
            y + 14,
            category.count,
        )?;
    }
    out.push_str("</svg>\n");
    Ok(())
}

fn write_timeline(out: &mut String, view: &DashboardView) -> fmt::Result {
    const HEIGHT: usize = 120;
    const STEP: usize = 14;

    let max = view
        .discovery_timeline
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    writeln!(
        out,
        "<h2>Discovery timeline (per {})</h2>\n<svg width=\"{}\" height=\"{}\">",
        view.granularity,
        view.discovery_timeline.len().max(1) * STEP,
        HEIGHT
    )?;
    for (i, bucket) in view.discovery_timeline.iter().enumerate() {
        let h = if max == 0 { 0 } else { bucket.count * HEIGHT / max };
        writeln!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{h}\" fill=\"#9467bd\"><title>{}: {}</title></rect>",
            i * STEP,
            HEIGHT - h,
            STEP - 2,
            bucket.start,
            bucket.count,
        )?;
    }
    out.push_str("</svg>\n");
    Ok(())
}

fn write_heatmap(out: &mut String, view: &DashboardView) -> fmt::Result {
    let max = view
        .department_heatmap
        .iter()
        .map(|row| row.counts.max())
        .max()
        .unwrap_or(0);

    out.push_str("<h2>Department risk heatmap</h2>\n<table>\n<tr><th>Department</th>");
    for level in RiskLevel::ALL {
        write!(out, "<th>{level}</th>")?;
    }
    out.push_str("</tr>\n");

    for row in &view.department_heatmap {
        write!(out, "<tr><td>{}</td>", escape(&row.dept))?;
        for level in RiskLevel::ALL {
            let count = row.counts.get(level);
            let alpha = if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            };
            write!(
                out,
                "<td style=\"background:rgba(214,39,40,{alpha:.2})\">{count}</td>"
            )?;
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
    Ok(())
}

fn write_high_risk(out: &mut String, rows: &[HighRiskRow]) -> fmt::Result {
    out.push_str("<h2>High-risk tools</h2>\n");
    if rows.is_empty() {
        out.push_str("<p>No Critical or High tools in the current view.</p>\n");
        return Ok(());
    }

    out.push_str(
        "<table>\n<tr><th>Tool</th><th>Domain</th><th>Category</th><th>Department</th>\
         <th>Users</th><th>Score</th><th>Level</th><th>Data type</th><th>Recommended action</th></tr>\n",
    );
    for row in rows.iter().take(HIGH_RISK_ROWS_SHOWN) {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td style=\"color:{}\">{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.tool_name),
            escape(&row.domain),
            escape(&row.category),
            escape(&row.dept),
            row.user_count,
            row.risk_score,
            level_color(row.risk_level),
            row.risk_level,
            escape(&row.data_type),
            row.action,
        )?;
    }
    out.push_str("</table>\n");
    if rows.len() > HIGH_RISK_ROWS_SHOWN {
        writeln!(
            out,
            "<p>Showing {HIGH_RISK_ROWS_SHOWN} of {}; download the high-risk report for the rest.</p>",
            rows.len()
        )?;
    }
    Ok(())
}

fn write_detail(out: &mut String, detail: Option<&ToolDetail>) -> fmt::Result {
    let Some(detail) = detail else {
        return Ok(());
    };
    let r = &detail.record;
    let level = r.risk_level.map(|l| l.as_str()).unwrap_or("Unscored");

    writeln!(out, "<h2>Tool detail: {}</h2>\n<table>", escape(&r.tool_name))?;
    let rows: [(&str, String); 12] = [
        ("Domain", escape(&r.domain)),
        ("Category", escape(&r.category)),
        ("Department", escape(&r.dept)),
        ("Users", r.user_count.to_string()),
        ("Usage count", r.usage_count.to_string()),
        ("First detected", r.first_detected.to_string()),
        ("Last seen", r.last_seen.to_string()),
        ("Data type", escape(&r.data_type)),
        ("Vendor tier", escape(&r.vendor_tier)),
        ("Risk", format!("{} ({level})", r.score_or_zero())),
        (
            "Controls present",
            if detail.controls_present { "Yes" } else { "No" }.to_string(),
        ),
        ("Recommended action", detail.recommended_action.to_string()),
    ];
    for (label, value) in rows {
        writeln!(out, "<tr><th>{label}</th><td>{value}</td></tr>")?;
    }
    out.push_str("</table>\n");
    Ok(())
}

fn write_exports(out: &mut String, raw_query: &str) -> fmt::Result {
    let suffix = if raw_query.is_empty() {
        String::new()
    } else {
        format!("?{}", escape(raw_query))
    };
    writeln!(
        out,
        "<h2>Exports</h2>\n<p>\
         <a href=\"/api/exports/full.csv{suffix}\">Full report (CSV)</a> | \
         <a href=\"/api/exports/high-risk.csv{suffix}\">High-risk report (CSV)</a> | \
         <a href=\"/api/exports/summary.txt{suffix}\">Executive summary (TXT)</a></p>"
    )
}
