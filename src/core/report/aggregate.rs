use anyhow::Result;

use crate::core::billing::{CostResponse, DayCosts};

/// Cost of `service` on a single day.
///
/// A service absent from the day's groups is a zero-cost day by policy, not
/// an error: service membership varies day to day and absence means nothing
/// was billed. A matching group with an unparseable amount is an error.
pub fn cost_on_day(day: &DayCosts, service: &str) -> Result<f64> {
    match day
        .groups
        .iter()
        .find(|group| group.keys.first().is_some_and(|key| key == service))
    {
        Some(group) => group.amount(),
        None => Ok(0.0),
    }
}

/// Sum `service` across every day of `response`. No rounding here.
///
/// When summing the current month on the 2nd, the first day in the list is
/// the lookback day from the previous month (fetched only so a day-over-day
/// delta exists) and must not be counted in the monthly total.
pub fn month_to_date(
    response: &CostResponse,
    service: &str,
    is_current_month: bool,
    second_day_of_month: bool,
) -> Result<f64> {
    let skip = usize::from(is_current_month && second_day_of_month);

    let mut total = 0.0;
    for day in response.results_by_time.iter().skip(skip) {
        total += cost_on_day(day, service)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::billing::{CostAmount, GroupMetrics, ServiceGroup, TimePeriod};
    use chrono::NaiveDate;

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

    fn lookback_fixture() -> CostResponse {
        CostResponse {
            results_by_time: vec![
                day(date(2021, 8, 31), &[("A", "5")]),
                day(date(2021, 9, 1), &[("A", "10")]),
            ],
        }
    }

    #[test]
    fn cost_on_day_finds_service() {
        let d = day(date(2021, 9, 1), &[("A", "1.5"), ("B", "2.5")]);
        assert!((cost_on_day(&d, "B").unwrap() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn cost_on_day_defaults_absent_service_to_zero() {
        let d = day(date(2021, 9, 1), &[("A", "1.5")]);
        assert_eq!(cost_on_day(&d, "B").unwrap(), 0.0);
    }

    #[test]
    fn cost_on_day_propagates_malformed_amount() {
        let d = day(date(2021, 9, 1), &[("A", "oops")]);
        assert!(cost_on_day(&d, "A").is_err());
    }

    #[test]
    fn lookback_day_excluded_from_current_month() {
        let total = month_to_date(&lookback_fixture(), "A", true, true).unwrap();
        assert!((total - 10.0).abs() < 1e-10);
    }

    #[test]
    fn all_days_counted_without_lookback_flag() {
        let total = month_to_date(&lookback_fixture(), "A", true, false).unwrap();
        assert!((total - 15.0).abs() < 1e-10);
    }

    #[test]
    fn previous_month_never_drops_days() {
        // The flag only trims the current month's list.
        let total = month_to_date(&lookback_fixture(), "A", false, true).unwrap();
        assert!((total - 15.0).abs() < 1e-10);
    }

    #[test]
    fn absent_service_sums_to_zero() {
        let total = month_to_date(&lookback_fixture(), "Z", true, false).unwrap();
        assert_eq!(total, 0.0);
    }

    #[test]
    fn days_with_gaps_contribute_zero() {
        let response = CostResponse {
            results_by_time: vec![
                day(date(2021, 9, 1), &[("A", "3")]),
                day(date(2021, 9, 2), &[("B", "7")]),
                day(date(2021, 9, 3), &[("A", "4")]),
            ],
        };
        let total = month_to_date(&response, "A", true, false).unwrap();
        assert!((total - 7.0).abs() < 1e-10);
    }
}
