use anyhow::Result;
use chrono::NaiveDate;

use crate::core::billing::{CostResponse, DayCosts};
use crate::core::report::aggregate;

/// One service's figures, in canonical column order. The previous-day cost
/// is consumed while computing the day-over-day delta and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRow {
    pub service: String,
    pub month_to_date: f64,
    pub current_day: f64,
    pub day_over_day: f64,
    pub previous_month: f64,
    pub month_over_month: f64,
}

/// The finished comparison table: per-service rows sorted ascending by
/// month-over-month delta, plus a Total row that is the column-wise sum of
/// the service rows and always comes last.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub current_day: NaiveDate,
    pub previous_day: NaiveDate,
    pub rows: Vec<ServiceRow>,
    pub total: ServiceRow,
}

/// Join the two period responses into one comparison table.
///
/// The service set is taken from the current day's groups; services that
/// billed only in earlier days or only in the previous period are left out
/// deliberately (the report covers services active today; a discontinued
/// service still shows up in the Total row's MoM delta).
///
/// Deterministic: the same two responses always produce an identical table.
pub fn build(
    current: &CostResponse,
    previous: &CostResponse,
    second_day_of_month: bool,
) -> Result<ReportTable> {
    let days = &current.results_by_time;
    if days.len() < 2 {
        anyhow::bail!(
            "current-period response has {} day(s), need at least 2 for a day-over-day delta",
            days.len()
        );
    }
    let current_day = &days[days.len() - 1];
    let previous_day = &days[days.len() - 2];

    let rows = collect_rows(current, previous, current_day, previous_day, second_day_of_month)?;
    let rows = sorted_by_mom(rows);
    let rows = rounded(rows);
    let total = total_row(&rows);

    Ok(ReportTable {
        current_day: current_day.time_period.start,
        previous_day: previous_day.time_period.start,
        rows,
        total,
    })
}

/// One row per service billed on the current day, with both deltas computed
/// from raw (unrounded) figures.
fn collect_rows(
    current: &CostResponse,
    previous: &CostResponse,
    current_day: &DayCosts,
    previous_day: &DayCosts,
    second_day_of_month: bool,
) -> Result<Vec<ServiceRow>> {
    let mut rows = Vec::with_capacity(current_day.groups.len());

    for group in &current_day.groups {
        let service = group.service_name()?;
        let current_day_cost = group.amount()?;
        let previous_day_cost = aggregate::cost_on_day(previous_day, service)?;
        let month_to_date =
            aggregate::month_to_date(current, service, true, second_day_of_month)?;
        let previous_month =
            aggregate::month_to_date(previous, service, false, second_day_of_month)?;

        rows.push(ServiceRow {
            service: service.to_string(),
            month_to_date,
            current_day: current_day_cost,
            day_over_day: current_day_cost - previous_day_cost,
            previous_month,
            month_over_month: month_to_date - previous_month,
        });
    }

    Ok(rows)
}

/// Ascending by MoM delta: the biggest cost drops come first.
fn sorted_by_mom(mut rows: Vec<ServiceRow>) -> Vec<ServiceRow> {
    rows.sort_by(|a, b| a.month_over_month.total_cmp(&b.month_over_month));
    rows
}

fn rounded(rows: Vec<ServiceRow>) -> Vec<ServiceRow> {
    rows.into_iter()
        .map(|row| ServiceRow {
            service: row.service,
            month_to_date: round_cents(row.month_to_date),
            current_day: round_cents(row.current_day),
            day_over_day: round_cents(row.day_over_day),
            previous_month: round_cents(row.previous_month),
            month_over_month: round_cents(row.month_over_month),
        })
        .collect()
}

/// Column-wise sum over the already-rounded service rows, rounded again so
/// float summation artifacts cannot reach the rendered output.
fn total_row(rows: &[ServiceRow]) -> ServiceRow {
    let mut total = ServiceRow {
        service: "Total".to_string(),
        month_to_date: 0.0,
        current_day: 0.0,
        day_over_day: 0.0,
        previous_month: 0.0,
        month_over_month: 0.0,
    };
    for row in rows {
        total.month_to_date += row.month_to_date;
        total.current_day += row.current_day;
        total.day_over_day += row.day_over_day;
        total.previous_month += row.previous_month;
        total.month_over_month += row.month_over_month;
    }
    total.month_to_date = round_cents(total.month_to_date);
    total.current_day = round_cents(total.current_day);
    total.day_over_day = round_cents(total.day_over_day);
    total.previous_month = round_cents(total.previous_month);
    total.month_over_month = round_cents(total.month_over_month);
    total
}

/// Round to 2 decimals, normalizing the -0.00 that rounding a small negative
/// leaves behind.
fn round_cents(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::billing::{CostAmount, GroupMetrics, ServiceGroup, TimePeriod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(start: NaiveDate, entries: &[(&str, &str)]) -> DayCosts {
        DayCosts {
            time_period: TimePeriod {
                start,
                end: start.succ_opt().unwrap(),
            },
            groups: entries
                .iter()
                .map(|(service, amount)| ServiceGroup {
                    keys: vec![service.to_string()],
                    metrics: GroupMetrics {
                        unblended_cost: CostAmount {
                            amount: amount.to_string(),
                        },
                    },
                })
                .collect(),
        }
    }

    fn response(days: Vec<DayCosts>) -> CostResponse {
        CostResponse {
            results_by_time: days,
        }
    }

    fn row<'a>(table: &'a ReportTable, service: &str) -> &'a ServiceRow {
        table
            .rows
            .iter()
            .find(|r| r.service == service)
            .unwrap_or_else(|| panic!("no row for {}", service))
    }

    #[test]
    fn deltas_for_present_and_absent_services() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "10.0")]),
            day(date(2021, 9, 14), &[("A", "12.005"), ("B", "3.0")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("A", "8.0")])]);

        let table = build(&current, &previous, false).unwrap();

        // 2.005 at cent scale rounds half away from zero.
        assert_eq!(row(&table, "A").day_over_day, 2.01);
        // B was absent yesterday: previous-day cost defaults to zero.
        assert_eq!(row(&table, "B").day_over_day, 3.0);
        assert_eq!(table.current_day, date(2021, 9, 14));
        assert_eq!(table.previous_day, date(2021, 9, 13));
    }

    #[test]
    fn negative_zero_is_normalized() {
        // MoM delta of -0.001 rounds to -0.00 and must come out as plain zero.
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1.0")]),
            day(date(2021, 9, 14), &[("A", "1.0")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("A", "2.001")])]);

        let table = build(&current, &previous, false).unwrap();
        let a = row(&table, "A");
        assert_eq!(a.month_over_month, 0.0);
        assert!(a.month_over_month.is_sign_positive());
        assert_eq!(format!("{:.2}", a.month_over_month), "0.00");
    }

    #[test]
    fn rows_sorted_ascending_by_mom() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1"), ("B", "1"), ("C", "1")]),
            day(
                date(2021, 9, 14),
                &[("A", "9"), ("B", "1"), ("C", "4")],
            ),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("B", "20")])]);

        let table = build(&current, &previous, false).unwrap();
        let moms: Vec<f64> = table.rows.iter().map(|r| r.month_over_month).collect();
        for pair in moms.windows(2) {
            assert!(pair[0] <= pair[1], "rows out of order: {:?}", moms);
        }
        assert_eq!(table.rows[0].service, "B");
    }

    #[test]
    fn total_is_columnwise_sum_of_service_rows() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1.11"), ("B", "2.22")]),
            day(date(2021, 9, 14), &[("A", "3.33"), ("B", "4.44")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("A", "0.5")])]);

        let table = build(&current, &previous, false).unwrap();
        let sum = |f: fn(&ServiceRow) -> f64| -> f64 {
            (table.rows.iter().map(f).sum::<f64>() * 100.0).round() / 100.0
        };
        assert_eq!(table.total.service, "Total");
        assert_eq!(table.total.month_to_date, sum(|r| r.month_to_date));
        assert_eq!(table.total.current_day, sum(|r| r.current_day));
        assert_eq!(table.total.day_over_day, sum(|r| r.day_over_day));
        assert_eq!(table.total.previous_month, sum(|r| r.previous_month));
        assert_eq!(table.total.month_over_month, sum(|r| r.month_over_month));
    }

    #[test]
    fn second_day_lookback_excluded_from_month_to_date() {
        // 08-31 is the lookback day: it feeds the DoD delta but not the
        // current month's total.
        let current = response(vec![
            day(date(2021, 8, 31), &[("A", "5")]),
            day(date(2021, 9, 1), &[("A", "10")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 1), &[("A", "4")])]);

        let table = build(&current, &previous, true).unwrap();
        let a = row(&table, "A");
        assert_eq!(a.month_to_date, 10.0);
        assert_eq!(a.day_over_day, 5.0);
        assert_eq!(a.month_over_month, 6.0);
    }

    #[test]
    fn services_only_in_previous_period_are_excluded() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1")]),
            day(date(2021, 9, 14), &[("A", "1")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("Retired", "99")])]);

        let table = build(&current, &previous, false).unwrap();
        assert!(table.rows.iter().all(|r| r.service != "Retired"));
        assert_eq!(table.rows.len(), 1);
    }

    #[test]
    fn build_is_deterministic() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1.005"), ("B", "2")]),
            day(date(2021, 9, 14), &[("B", "3"), ("A", "0.5")]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[("A", "7")])]);

        let first = build(&current, &previous, false).unwrap();
        let second = build(&current, &previous, false).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn short_response_is_an_error() {
        let current = response(vec![day(date(2021, 9, 14), &[("A", "1")])]);
        let previous = response(vec![]);

        let err = build(&current, &previous, false).unwrap_err();
        assert!(err.to_string().contains("need at least 2"));
    }

    #[test]
    fn empty_current_day_produces_zero_total() {
        let current = response(vec![
            day(date(2021, 9, 13), &[("A", "1")]),
            day(date(2021, 9, 14), &[]),
        ]);
        let previous = response(vec![day(date(2021, 8, 13), &[])]);

        let table = build(&current, &previous, false).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.total.month_to_date, 0.0);
        assert_eq!(table.total.month_over_month, 0.0);
    }
}
