use crate::config::{Credentials, RuntimeConfig};
use crate::mock::MockData;
use crate::model::{Payload, ResourceTab};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where page data comes from: the disk usage API or the bundled sample set.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn label(&self) -> String;

    async fn fetch(&self, tab: ResourceTab) -> Result<Payload>;

    /// Asks the backend to rescan. The response carries nothing beyond success.
    async fn trigger_scan(&self) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}

pub fn build_source(config: &RuntimeConfig, mock_latency: Duration) -> Result<Arc<dyn DataSource>> {
    if config.mock {
        info!("serving bundled sample data");
        return Ok(Arc::new(MockSource::new(mock_latency)));
    }

    let api = ApiSource::new(
        &config.api_url,
        config.request_timeout,
        config.credentials.clone(),
    )?;
    if config.fallback_to_mock {
        info!("api {} with sample data fallback", config.api_url);
        return Ok(Arc::new(FallbackSource::new(
            api,
            MockSource::new(mock_latency),
        )));
    }

    info!("api {}", config.api_url);
    Ok(Arc::new(api))
}

pub struct ApiSource {
    client: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl ApiSource {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Option<Credentials>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url_for(path));
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, credentials.password.as_ref())
            }
            None => builder,
        }
    }

    async fn send(&self, method: Method, path: &str) -> Result<reqwest::Response> {
        let url = self.url_for(path);
        let response = self
            .request(method.clone(), path)
            .send()
            .await
            .with_context(|| format!("{method} {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!(
                "{method} {url} returned {status}{}",
                summarize_body(&detail)
            );
        }
        Ok(response)
    }
}

#[async_trait]
impl DataSource for ApiSource {
    fn label(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch(&self, tab: ResourceTab) -> Result<Payload> {
        let response = self.send(Method::GET, tab.endpoint()).await?;
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON from {}", self.url_for(tab.endpoint())))?;
        let payload = Payload::from_json(tab, body)
            .with_context(|| format!("unexpected {} response shape", tab.title()))?;
        debug!(
            "fetched {} ({} records)",
            tab.title(),
            payload.record_count().unwrap_or(1)
        );
        Ok(payload)
    }

    async fn trigger_scan(&self) -> Result<()> {
        self.send(Method::POST, "/scan").await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.send(Method::GET, ResourceTab::Dashboard.endpoint())
            .await
            .map(|_| ())
    }
}

pub struct MockSource {
    data: MockData,
    latency: Duration,
}

impl MockSource {
    pub fn new(latency: Duration) -> Self {
        Self {
            data: MockData::new(Utc::now()),
            latency,
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl DataSource for MockSource {
    fn label(&self) -> String {
        "sample data".to_string()
    }

    async fn fetch(&self, tab: ResourceTab) -> Result<Payload> {
        self.simulate_latency().await;
        Ok(self.data.payload(tab, Utc::now()))
    }

    async fn trigger_scan(&self) -> Result<()> {
        self.simulate_latency().await;
        self.data.record_scan(Utc::now());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Tries the API first and serves sample data when a request fails.
pub struct FallbackSource<P = ApiSource> {
    primary: P,
    fallback: MockSource,
}

impl<P: DataSource> FallbackSource<P> {
    pub fn new(primary: P, fallback: MockSource) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P: DataSource> DataSource for FallbackSource<P> {
    fn label(&self) -> String {
        format!("{} (sample fallback)", self.primary.label())
    }

    async fn fetch(&self, tab: ResourceTab) -> Result<Payload> {
        match self.primary.fetch(tab).await {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!("{} fetch failed, using sample data: {error:#}", tab.title());
                self.fallback.fetch(tab).await
            }
        }
    }

    async fn trigger_scan(&self) -> Result<()> {
        match self.primary.trigger_scan().await {
            Ok(()) => Ok(()),
            Err(error) => {
                warn!("scan request failed, using sample data: {error:#}");
                self.fallback.trigger_scan().await
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        self.primary.ping().await
    }
}

fn summarize_body(body: &str) -> String {
    let line = body.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return String::new();
    }
    let detail = serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("detail").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| line.chars().take(120).collect());
    format!(": {detail}")
}

#[cfg(test)]
mod tests {
    use super::{ApiSource, DataSource, FallbackSource, MockSource, summarize_body};
    use crate::model::{Payload, ResourceTab};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::time::Duration;

    struct Unreachable;

    #[async_trait]
    impl DataSource for Unreachable {
        fn label(&self) -> String {
            "unreachable".to_string()
        }

        async fn fetch(&self, _tab: ResourceTab) -> Result<Payload> {
            Err(anyhow!("connection refused"))
        }

        async fn trigger_scan(&self) -> Result<()> {
            Err(anyhow!("connection refused"))
        }

        async fn ping(&self) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
    }

    #[test]
    fn endpoint_urls_join_cleanly() {
        let source = ApiSource::new("http://localhost:9090/api/", Duration::from_secs(1), None)
            .unwrap();
        assert_eq!(
            source.url_for(ResourceTab::BuildCache.endpoint()),
            "http://localhost:9090/api/build-cache"
        );
        assert_eq!(source.url_for("scan"), "http://localhost:9090/api/scan");
        assert_eq!(source.label(), "http://localhost:9090/api");
    }

    #[test]
    fn error_bodies_prefer_detail_field() {
        assert_eq!(
            summarize_body(r#"{"detail":"Failed to fetch images: boom"}"#),
            ": Failed to fetch images: boom"
        );
        assert_eq!(summarize_body("Bad Gateway"), ": Bad Gateway");
        assert_eq!(summarize_body(""), "");
    }

    #[tokio::test]
    async fn mock_source_serves_every_tab() {
        let source = MockSource::new(Duration::ZERO);
        for tab in ResourceTab::ALL {
            let payload = source.fetch(tab).await.unwrap();
            assert_eq!(payload.tab(), tab);
        }
        assert!(source.trigger_scan().await.is_ok());
        assert!(source.ping().await.is_ok());
    }

    #[tokio::test]
    async fn fallback_serves_sample_data_but_reports_ping_failure() {
        let source = FallbackSource::new(Unreachable, MockSource::new(Duration::ZERO));
        let payload = source.fetch(ResourceTab::Containers).await.unwrap();
        assert_eq!(payload.record_count(), Some(3));
        assert!(source.trigger_scan().await.is_ok());
        assert!(source.ping().await.is_err());
        assert_eq!(source.label(), "unreachable (sample fallback)");
    }
}
