use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::cli::output::OutputOptions;
use crate::cli::text;
use crate::core::billing::BillingClient;
use crate::core::config::{AppConfig, Credentials};
use crate::core::mail;
use crate::core::period::ReportPeriods;
use crate::core::report::table::ReportTable;
use crate::core::report::{html, table};

/// Invocation result reported to the scheduler. This is the sole observable
/// contract of a `run`: 200 with a success message, or 500 with the failure
/// description. No partial report is ever sent.
#[derive(Debug, Serialize)]
pub struct RunStatus {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Fetch billing data, build the report, email it. Any failure anywhere in
/// the pipeline is caught here and mapped to a 500 status; nothing below
/// this level recovers, retries or degrades.
pub async fn run() -> RunStatus {
    let today = Utc::now().date_naive();
    status_from(generate_and_send(today).await)
}

fn status_from(result: Result<()>) -> RunStatus {
    match result {
        Ok(()) => {
            let msg = "Cost report generated and sent successfully".to_string();
            tracing::info!("{}", msg);
            RunStatus {
                status_code: 200,
                body: msg,
            }
        }
        Err(e) => {
            let msg = format!("Failed to generate report due to {:#}", e);
            tracing::error!("{}", msg);
            RunStatus {
                status_code: 500,
                body: msg,
            }
        }
    }
}

async fn generate_and_send(today: NaiveDate) -> Result<()> {
    let config = load_valid_config()?;
    let credentials = Credentials::from_env()?;

    let report = build_report(&config, &credentials.billing_token, today).await?;
    let body = html::render(&report);
    mail::send_report(&config.email, &credentials.mail_api_key, today, &body).await
}

/// Build the report and print it without sending. Useful for checking what
/// tomorrow's email will look like.
pub async fn preview(date: Option<NaiveDate>, as_html: bool, opts: &OutputOptions) -> Result<()> {
    let config = load_valid_config()?;
    let billing_token = Credentials::billing_token_from_env()?;
    let today = date.unwrap_or_else(|| Utc::now().date_naive());

    if opts.verbose {
        let periods = ReportPeriods::for_date(today);
        eprintln!(
            "current window: {} to {}, previous window: {} to {}",
            periods.current.start, periods.current.end, periods.previous.start, periods.previous.end
        );
    }

    let report = build_report(&config, &billing_token, today).await?;
    if as_html {
        println!("{}", html::render(&report));
    } else {
        println!("{}", text::render_table(&report, opts.use_color));
    }
    Ok(())
}

fn load_valid_config() -> Result<AppConfig> {
    let config = AppConfig::load()?;
    let issues = config.validate();
    if !issues.is_empty() {
        anyhow::bail!("invalid config: {}", issues.join("; "));
    }
    Ok(config)
}

async fn build_report(
    config: &AppConfig,
    billing_token: &str,
    today: NaiveDate,
) -> Result<ReportTable> {
    let periods = ReportPeriods::for_date(today);
    let client = BillingClient::new(&config.billing.endpoint, billing_token);

    let current = client.cost_and_usage(periods.current).await?;
    tracing::info!(
        days = current.results_by_time.len(),
        "fetched current-period costs"
    );
    let previous = client.cost_and_usage(periods.previous).await?;
    tracing::info!(
        days = previous.results_by_time.len(),
        "fetched previous-period costs"
    );

    table::build(&current, &previous, periods.second_day_of_month)
}
