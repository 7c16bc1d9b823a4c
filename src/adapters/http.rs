use crate::domain::ports::{ConfigProvider, HttpGateway, PayloadDelivery};
use crate::utils::error::{IntegrationError, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Method};
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

/// 送出前的攔截器；回傳 false 代表取消送出，可以修改 payload
pub type PayloadHook = Box<dyn Fn(&str, &mut serde_json::Value) -> bool + Send + Sync>;

/// 以 reqwest 實作的 API 閘道
///
/// HTTP client 在第一次請求時建立，之後於整個閘道生命週期內重複使用。
/// 每個請求都會帶上 `apikey` 查詢參數。
pub struct ReqwestGateway {
    base_url: Url,
    api_key: String,
    timeout: Option<Duration>,
    client: OnceCell<Client>,
    before_send: Vec<PayloadHook>,
}

impl ReqwestGateway {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self> {
        // 沒有結尾斜線時 Url::join 會取代最後一段路徑
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            timeout: None,
            client: OnceCell::new(),
            before_send: Vec::new(),
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let gateway = Self::new(config.base_url(), config.api_key())?;
        Ok(match config.timeout() {
            Some(timeout) => gateway.with_timeout(timeout),
            None => gateway,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &mut serde_json::Value) -> bool + Send + Sync + 'static,
    {
        self.before_send.push(Box::new(hook));
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn is_client_initialized(&self) -> bool {
        self.client.initialized()
    }

    async fn client(&self) -> Result<&Client> {
        let timeout = self.timeout;
        self.client
            .get_or_try_init(|| async move {
                tracing::debug!("Creating HTTP client");
                let mut builder = Client::builder();
                if let Some(timeout) = timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(IntegrationError::from)
            })
            .await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let client = self.client().await?;
        let url = self.endpoint(path)?;

        tracing::debug!("Making API request: {} {}", method, url);

        let mut request = client
            .request(method, url)
            .query(&[("apikey", self.api_key.as_str())])
            .header(header::ACCEPT, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::HttpStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| IntegrationError::UnexpectedResponseError {
            message: format!("Response body is not valid JSON: {}", e),
        })
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn request(&self, method: Method, path: &str) -> Result<serde_json::Value> {
        self.send(method, path, None).await
    }

    async fn deliver_payload(
        &self,
        path: &str,
        mut payload: serde_json::Value,
    ) -> Result<PayloadDelivery> {
        for hook in &self.before_send {
            if !hook(path, &mut payload) {
                tracing::info!("Payload for {} cancelled by before-send hook", path);
                return Ok(PayloadDelivery::Cancelled);
            }
        }

        let response = self.send(Method::POST, path, Some(&payload)).await?;
        Ok(PayloadDelivery::Sent(response))
    }
}
