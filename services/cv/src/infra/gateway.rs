use std::time::Duration;

use anyhow::{Context as _, anyhow};
use reqwest::Client;
use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::domain::repository::PaymentGateway;
use crate::domain::types::ChargeRequest;
use crate::error::CvServiceError;

#[derive(Deserialize)]
struct ChargeResponse {
    url: Option<String>,
}

/// Hosted-payment-page gateway reached over HTTPS.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpPaymentGateway {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("build gateway http client")?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_charge(
        &self,
        request: &ChargeRequest,
    ) -> Result<Option<String>, CvServiceError> {
        let response = self
            .client
            .post(format!("{}/charges", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("send charge request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                body = %body,
                correlation_token = %request.correlation_token,
                "gateway rejected charge request"
            );
            return Err(anyhow!("gateway returned {status}").into());
        }

        let charge: ChargeResponse = response
            .json()
            .await
            .context("parse charge response")?;
        Ok(charge.url.filter(|url| !url.trim().is_empty()))
    }
}
