use crate::{
    alerts::model::Alert,
    error::ImportError,
    metrics::external::{self, Target},
};

pub mod model;
pub mod record;

pub struct AlertsApi {
    url: String,
    client: reqwest::Client,
}

impl AlertsApi {
    /// Create a new client for the alerts endpoint
    pub fn new(url: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            url: url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create all alerts in a single bulk request
    #[tracing::instrument(skip(self, token, alerts), fields(count = alerts.len()))]
    pub async fn bulk_create(&self, token: &str, alerts: &[Alert]) -> Result<(), ImportError> {
        tracing::info!("Submitting alerts to the bulk endpoint");
        let _timer = external::external_request_timer(Target::Alerts);

        let result = self
            .client
            .post(format!("{}/bulk", self.url))
            .bearer_auth(token)
            .json(alerts)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                external::record_external_request_failure(Target::Alerts);
                return Err(e.into());
            }
        };

        let status = response.status();

        if !status.is_success() {
            external::record_external_request_failure(Target::Alerts);
            let body = response.text().await.unwrap_or_default();

            return Err(ImportError::Rejected { status, body });
        }

        Ok(())
    }
}
