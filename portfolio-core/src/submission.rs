use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::config::ContactConfig;
use crate::logger::Logger;

/// The four fields collected by the chat, posted as a single JSON body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("form endpoint answered with status {0}")]
    Status(u16),
    #[error("form endpoint did not answer within {0:?}")]
    Timeout(Duration),
    #[error("form endpoint unreachable: {0}")]
    Network(String),
}

impl SubmitError {
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitError::Status(_) => "status",
            SubmitError::Timeout(_) => "timeout",
            SubmitError::Network(_) => "network",
        }
    }
}

#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmitError>;
}

/// Posts submissions to a third-party form-handling endpoint.
pub struct HttpFormSubmitter {
    client: Client,
    endpoint: String,
    timeout: Duration,
    logger: Logger,
}

impl HttpFormSubmitter {
    pub fn new(client: Client, config: &ContactConfig, logger: Logger) -> Self {
        Self {
            client,
            endpoint: config.form_endpoint.clone(),
            timeout: config.submit_timeout,
            logger,
        }
    }

    pub fn from_config(config: &ContactConfig, logger: Logger) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.submit_timeout).build()?;
        Ok(Self::new(client, config, logger))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl FormSubmitter for HttpFormSubmitter {
    async fn submit(&self, submission: &ContactSubmission) -> Result<(), SubmitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(submission)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    SubmitError::Timeout(self.timeout)
                } else {
                    SubmitError::Network(error.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.logger.warn(
                "contact.endpoint_rejected",
                json!({
                    "endpoint": self.endpoint,
                    "statusCode": status.as_u16(),
                    "body": truncate(&body, 256),
                }),
            );
            return Err(SubmitError::Status(status.as_u16()));
        }

        self.logger.debug(
            "contact.endpoint_accepted",
            json!({
                "endpoint": self.endpoint,
                "statusCode": status.as_u16(),
            }),
        );
        Ok(())
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
