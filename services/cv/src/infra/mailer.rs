use std::time::Duration;

use anyhow::{Context as _, anyhow};
use reqwest::Client;
use serde::Serialize;

use crate::config::MailConfig;
use crate::domain::repository::Notifier;
use crate::domain::types::CredentialsEmail;
use crate::error::CvServiceError;

const SUBJECT: &str = "Your DigitalCV access details";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: String,
}

/// Resend-style transactional mail API client.
///
/// Without an API key every send is a logged no-op.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: Option<String>,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .context("build mail http client")?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some() && self.from.is_some()
    }
}

fn credentials_text(email: &CredentialsEmail) -> String {
    format!(
        "Hi {name},\n\nYour digital CV can be opened with these details:\n\nUsername: {username}\nPIN: {pin}\n\nThis PIN replaces any PIN sent to you before.\n",
        name = email.recipient_name,
        username = email.cv_username,
        pin = email.cv_pin,
    )
}

impl Notifier for HttpMailer {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), CvServiceError> {
        let (Some(api_key), Some(from)) = (self.api_key.as_deref(), self.from.as_deref()) else {
            tracing::info!(
                cv_username = %email.cv_username,
                "email delivery disabled, skipping credentials email"
            );
            return Ok(());
        };

        let request = SendEmailRequest {
            from,
            to: [email.to.as_str()],
            subject: SUBJECT,
            text: credentials_text(email),
        };
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .context("send credentials email")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("mail api returned {status}: {body}").into());
        }
        tracing::info!(cv_username = %email.cv_username, "credentials email sent");
        Ok(())
    }
}
