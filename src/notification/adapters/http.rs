//! Gateway calling the hosted mail functions over HTTP.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::notification::{
    domain::{EmailKind, EmailPayload},
    ports::{NotificationGateway, NotificationGatewayError, NotificationGatewayResult},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`NotificationGateway`] posting to `{base_url}/functions/v1/<name>`.
#[derive(Debug, Clone)]
pub struct HttpNotificationGateway {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpNotificationGateway {
    /// Creates a gateway for the functions host at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] when the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base: String = base_url.into();
        Ok(Self {
            client,
            base_url: base.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        })
    }

    /// Returns the URL invoked for `kind`.
    #[must_use]
    pub fn function_url(&self, kind: EmailKind) -> String {
        format!("{}/functions/v1/{}", self.base_url, kind.function_name())
    }
}

#[async_trait]
impl NotificationGateway for HttpNotificationGateway {
    async fn send(
        &self,
        kind: EmailKind,
        payload: &EmailPayload,
    ) -> NotificationGatewayResult<()> {
        let function = kind.function_name();
        let url = self.function_url(kind);
        debug!(%url, "invoking mail function");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|err| NotificationGatewayError::transport(function, err))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotificationGatewayError::Rejected {
            function,
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        })
    }
}
