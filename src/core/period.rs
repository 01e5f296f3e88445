use chrono::{Datelike, Months, NaiveDate};

/// Half-open query window: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The two query windows for one report run, derived from today's UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriods {
    pub current: CostWindow,
    pub previous: CostWindow,
    /// Today is the 2nd of the month, so the current window starts on the
    /// last day of the previous month (lookback day). The monthly aggregator
    /// must skip that day when summing the current month.
    pub second_day_of_month: bool,
}

impl ReportPeriods {
    /// Compute both windows for `today`.
    ///
    /// The billing API has no data for the in-progress day, so both windows
    /// end exclusively. The current window is guaranteed to span at least
    /// two days so a day-over-day delta is always computable:
    /// on the 1st the "current month" becomes the whole previous month, and
    /// on the 2nd the window start shifts one day back into the prior month.
    pub fn for_date(today: NaiveDate) -> Self {
        let one_month = Months::new(1);

        let mut first_of_current = today
            .with_day(1)
            .expect("day 1 exists in every month");
        if today == first_of_current {
            first_of_current = first_of_current
                .checked_sub_months(one_month)
                .expect("date within supported range");
        }
        let first_of_previous = first_of_current
            .checked_sub_months(one_month)
            .expect("date within supported range");

        // Clamped month subtraction: 2021-03-31 maps to 2021-02-28
        // (02-29 in leap years).
        let relative_prev_month_date = today
            .checked_sub_months(one_month)
            .expect("date within supported range");

        let second_day_of_month = today.day() == 2;
        let current_start = if second_day_of_month {
            first_of_current
                .pred_opt()
                .expect("date within supported range")
        } else {
            first_of_current
        };

        Self {
            current: CostWindow {
                start: current_start,
                end: today,
            },
            previous: CostWindow {
                start: first_of_previous,
                end: relative_prev_month_date,
            },
            second_day_of_month,
        }
    }
}
