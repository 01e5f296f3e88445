use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::core::config::EmailConfig;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Serialize)]
struct Address {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Serialize)]
struct Personalization {
    to: Vec<Address>,
}

#[derive(Serialize)]
struct Content {
    #[serde(rename = "type")]
    kind: String,
    value: String,
}

#[derive(Serialize)]
struct MailMessage {
    personalizations: Vec<Personalization>,
    from: Address,
    subject: String,
    content: Vec<Content>,
}

/// The weekly list gets the report on Monday, the daily list on every other
/// day.
pub fn recipients_for(config: &EmailConfig, today: NaiveDate) -> &[String] {
    if today.weekday() == Weekday::Mon {
        &config.weekly_recipients
    } else {
        &config.daily_recipients
    }
}

pub fn subject_for(config: &EmailConfig, today: NaiveDate) -> String {
    format!("{} - {}", config.subject, today)
}

fn build_message(config: &EmailConfig, today: NaiveDate, html_body: &str) -> MailMessage {
    let to = recipients_for(config, today)
        .iter()
        .map(|email| Address {
            email: email.clone(),
            name: None,
        })
        .collect();

    MailMessage {
        personalizations: vec![Personalization { to }],
        from: Address {
            email: config.sender_email.clone(),
            name: Some(config.sender_name.clone()),
        },
        subject: subject_for(config, today),
        content: vec![Content {
            kind: "text/html".to_string(),
            value: html_body.to_string(),
        }],
    }
}

/// Send the rendered report through the transactional mail API. A non-2xx
/// response or transport error propagates to the caller; there is no retry.
pub async fn send_report(
    config: &EmailConfig,
    api_key: &str,
    today: NaiveDate,
    html_body: &str,
) -> Result<()> {
    let message = build_message(config, today, html_body);

    let response = reqwest::Client::new()
        .post(SENDGRID_URL)
        .bearer_auth(api_key)
        .json(&message)
        .send()
        .await
        .context("Failed to send request to mail API")?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        anyhow::bail!("Unauthorized - check your mail API key");
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("HTTP {} from mail API: {}", status.as_u16(), body);
    }

    tracing::info!(status = status.as_u16(), "report email accepted");
    Ok(())
}
