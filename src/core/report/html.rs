use crate::core::report::table::{ReportTable, ServiceRow};

// Styles are inlined on every element because mail clients usually strip
// <style> blocks from HTML bodies. Tested with the Gmail web client.
const TABLE_STYLE: &str = "border-collapse: collapse";
const TH_STYLE: &str = "font-size: 12px; text-align: justify; font-weight: bold; \
                        color: #6d6d6d; background-color: #f7f7f9; padding: 5px";
const TD_STYLE: &str = "font-size: 12px; padding: 10px";

/// Render the report table as an HTML `<table>` string.
///
/// All monetary cells are fixed to two decimals. The DoD and MoM delta cells
/// are colored red when positive (cost went up) and green when zero or
/// negative. Pure function of the table; no I/O.
pub fn render(table: &ReportTable) -> String {
    let mut html = String::new();

    html.push_str(&format!("<table style=\"{}\">\n", TABLE_STYLE));

    html.push_str("<thead><tr>");
    for title in [
        "Service Name".to_string(),
        "Total cost this month".to_string(),
        format!("Cost on {}", table.current_day),
        "DoD Cost Diff".to_string(),
        "Total cost last month".to_string(),
        "MoM Cost Diff".to_string(),
    ] {
        html.push_str(&format!("<th style=\"{}\">{}</th>", TH_STYLE, title));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &table.rows {
        push_row(&mut html, row);
    }
    push_row(&mut html, &table.total);

    html.push_str("</tbody>\n</table>");
    html
}

fn push_row(html: &mut String, row: &ServiceRow) {
    html.push_str("<tr>");
    html.push_str(&format!(
        "<th style=\"{}\">{}</th>",
        TH_STYLE,
        escape(&row.service)
    ));
    push_cell(html, row.month_to_date, TD_STYLE.to_string());
    push_cell(html, row.current_day, TD_STYLE.to_string());
    push_cell(html, row.day_over_day, delta_style(row.day_over_day));
    push_cell(html, row.previous_month, TD_STYLE.to_string());
    push_cell(html, row.month_over_month, delta_style(row.month_over_month));
    html.push_str("</tr>\n");
}

fn push_cell(html: &mut String, value: f64, style: String) {
    html.push_str(&format!("<td style=\"{}\">{:.2}</td>", style, value));
}

/// Red for a cost increase, green for flat or decreasing.
fn delta_style(value: f64) -> String {
    let color = if value > 0.0 { "red" } else { "green" };
    format!("{}; color: {}", TD_STYLE, color)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
