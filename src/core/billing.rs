use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::period::CostWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimePeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostQuery {
    pub time_period: TimePeriod,
    pub metrics: Vec<String>,
    pub granularity: String,
    pub group_by: Vec<GroupDefinition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupDefinition {
    pub key: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

impl CostQuery {
    /// Daily-granularity unblended-cost query over `window`, grouped by
    /// service.
    pub fn daily_by_service(window: CostWindow) -> Self {
        Self {
            time_period: TimePeriod {
                start: window.start,
                end: window.end,
            },
            metrics: vec!["UNBLENDED_COST".to_string()],
            granularity: "DAILY".to_string(),
            group_by: vec![GroupDefinition {
                key: "SERVICE".to_string(),
                kind: "DIMENSION".to_string(),
            }],
        }
    }
}

/// One cost-and-usage response: an ordered day list, one entry per day of
/// the queried window. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostResponse {
    pub results_by_time: Vec<DayCosts>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayCosts {
    pub time_period: TimePeriod,
    #[serde(default)]
    pub groups: Vec<ServiceGroup>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceGroup {
    pub keys: Vec<String>,
    pub metrics: GroupMetrics,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupMetrics {
    pub unblended_cost: CostAmount,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CostAmount {
    /// String-encoded decimal, as delivered by the billing API.
    pub amount: String,
}

impl ServiceGroup {
    pub fn service_name(&self) -> Result<&str> {
        self.keys
            .first()
            .map(String::as_str)
            .context("billing group has no service key")
    }

    pub fn amount(&self) -> Result<f64> {
        self.metrics
            .unblended_cost
            .amount
            .parse::<f64>()
            .with_context(|| {
                format!(
                    "malformed cost amount: {:?}",
                    self.metrics.unblended_cost.amount
                )
            })
    }
}

/// Thin client for the cost-and-usage endpoint. Holds no business logic;
/// transport and API errors propagate unmodified to the caller.
pub struct BillingClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl BillingClient {
    pub fn new(endpoint: &str, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        }
    }

    /// Run one windowed, service-grouped, daily-granularity cost query.
    pub async fn cost_and_usage(&self, window: CostWindow) -> Result<CostResponse> {
        let query = CostQuery::daily_by_service(window);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(&query)
            .send()
            .await
            .context("Failed to send request to billing API")?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            anyhow::bail!("Unauthorized - check your billing API token");
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {} from billing API: {}", status.as_u16(), body);
        }

        response
            .json()
            .await
            .context("Failed to parse billing API response")
    }
}
