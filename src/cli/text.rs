use colored::{control, ColoredString, Colorize};

use crate::core::report::table::{ReportTable, ServiceRow};

const SERVICE_WIDTH: usize = 42;
const VALUE_WIDTH: usize = 12;

/// Render the report table for the terminal.
///
/// Layout:
/// ```text
///  Cost report for 2021-09-14 (vs 2021-09-13)
///  Service                       This month          Day          DoD   Last month          MoM
///  Amazon S3                          12.50         0.40        -0.10        14.00        -1.50
///  ...
///  Total                             812.04        30.11         2.04       799.61        12.43
/// ```
pub fn render_table(table: &ReportTable, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();

    lines.push(
        format!(
            " Cost report for {} (vs {})",
            table.current_day, table.previous_day
        )
        .bold()
        .to_string(),
    );

    lines.push(format!(
        " {:<sw$} {:>vw$} {:>vw$} {:>vw$} {:>vw$} {:>vw$}",
        "Service",
        "This month",
        "Day",
        "DoD",
        "Last month",
        "MoM",
        sw = SERVICE_WIDTH,
        vw = VALUE_WIDTH,
    ));

    for row in &table.rows {
        lines.push(render_row(row, false));
    }
    lines.push(render_row(&table.total, true));

    lines.join("\n")
}

fn render_row(row: &ServiceRow, bold: bool) -> String {
    let service = format!("{:<width$}", row.service, width = SERVICE_WIDTH);
    let service = if bold {
        service.bold().to_string()
    } else {
        service
    };

    format!(
        " {} {:>vw$.2} {:>vw$.2} {} {:>vw$.2} {}",
        service,
        row.month_to_date,
        row.current_day,
        delta_cell(row.day_over_day),
        row.previous_month,
        delta_cell(row.month_over_month),
        vw = VALUE_WIDTH,
    )
}

/// Red means costs went up, green means flat or down. Padding happens before
/// coloring so ANSI codes do not break the alignment.
fn delta_cell(value: f64) -> ColoredString {
    let text = format!("{:>width$.2}", value, width = VALUE_WIDTH);
    if value > 0.0 {
        text.red()
    } else {
        text.green()
    }
}
