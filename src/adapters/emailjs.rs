use crate::config::ContactConfig;
use crate::domain::model::{ContactMessage, SubmissionReceipt};
use crate::domain::ports::ContactSubmitter;
use crate::utils::error::{PortfolioError, Result};
use crate::utils::validation::{validate_required_field, validate_url};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    from_name: &'a str,
    reply_to: &'a str,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

/// EmailJS REST API 的寄信客戶端
#[derive(Debug, Clone)]
pub struct EmailJsClient {
    client: Client,
    endpoint: String,
    service_id: String,
    template_id: String,
    public_key: String,
}

impl EmailJsClient {
    pub fn new(
        endpoint: &str,
        service_id: &str,
        template_id: &str,
        public_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        validate_url("contact.endpoint", endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            service_id: service_id.to_string(),
            template_id: template_id.to_string(),
            public_key: public_key.to_string(),
        })
    }

    pub fn from_config(config: &ContactConfig) -> Result<Self> {
        let service_id = validate_required_field("contact.service_id", &config.service_id)?;
        let template_id = validate_required_field("contact.template_id", &config.template_id)?;
        let public_key = validate_required_field("contact.public_key", &config.public_key)?;
        Self::new(
            &config.endpoint,
            service_id,
            template_id,
            public_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl ContactSubmitter for EmailJsClient {
    async fn submit(&self, message: &ContactMessage) -> Result<SubmissionReceipt> {
        let body = SendRequest {
            service_id: &self.service_id,
            template_id: &self.template_id,
            user_id: &self.public_key,
            template_params: TemplateParams {
                from_name: &message.name,
                reply_to: &message.email,
                message: &message.message,
            },
        };

        tracing::debug!("Sending contact message to: {}", self.endpoint);
        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("⚠️ Could not read e-mail service response body: {}", e);
                String::new()
            }
        };
        tracing::debug!("E-mail service response status: {}", status);

        if status.is_success() {
            Ok(SubmissionReceipt {
                status: status.as_u16(),
                text,
                sent_at: Utc::now(),
            })
        } else {
            Err(PortfolioError::SubmissionError {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

/// 不真正寄信，只記錄內容；CLI 預設使用
#[derive(Debug, Clone, Default)]
pub struct DryRunSubmitter;

#[async_trait]
impl ContactSubmitter for DryRunSubmitter {
    async fn submit(&self, message: &ContactMessage) -> Result<SubmissionReceipt> {
        tracing::info!(
            "📨 Dry run: message from {} <{}> ({} chars) not sent",
            message.name,
            message.email,
            message.message.chars().count()
        );
        Ok(SubmissionReceipt {
            status: 200,
            text: "dry-run".to_string(),
            sent_at: Utc::now(),
        })
    }
}
