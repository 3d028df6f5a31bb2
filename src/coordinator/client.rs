use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};

use super::protocol::{
    AnnounceRequest, AnnounceResponse, ENDPOINT_ANNOUNCE, PRINCIPAL_HEADER, PROTOCOL_VERSION,
};

/// Member-side half of the announcement exchange.
///
/// Remembers the coordinator instance and cursor returned by the previous
/// round and keeps a local cluster view reconciled from the differential
/// responses. When the coordinator identity changes (restart, or first
/// contact) the next response carries every live member and the local view
/// starts over.
///
/// The client stamps [`PRINCIPAL_HEADER`] itself, which is convenient for
/// development; deployed behind the authenticated transport, the transport
/// overwrites it with the identity it actually verified.
pub struct AnnounceClient {
    http: reqwest::Client,
    base_url: String,
    principal: String,
    key: String,
    timeout: Duration,
    cursor: u64,
    server_instance: String,
    cluster: HashMap<String, String>,
}

impl AnnounceClient {
    /// The request timeout defaults to 100 ms, tunable through the
    /// `ANNOUNCE_TIMEOUT_MS` environment variable or [`Self::with_timeout`].
    pub fn new(
        base_url: impl Into<String>,
        principal: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        let timeout_ms = std::env::var("ANNOUNCE_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(100);
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            principal: principal.into(),
            key: key.into(),
            timeout: Duration::from_millis(timeout_ms),
            cursor: 0,
            server_instance: String::new(),
            cluster: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the key announced from the next round on (key rotation).
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }

    /// The locally reconciled view of the cluster.
    pub fn cluster(&self) -> &HashMap<String, String> {
        &self.cluster
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// One announcement round trip.
    ///
    /// Passing `include_member` additionally asks the coordinator to resolve
    /// that member; if the reply omits it, the member no longer exists and is
    /// dropped from the local view.
    pub async fn announce(&mut self, include_member: Option<&str>) -> Result<()> {
        let request = AnnounceRequest {
            version: PROTOCOL_VERSION,
            key: self.key.clone(),
            cursor: self.cursor,
            include_member: include_member.unwrap_or_default().to_string(),
            server_instance: self.server_instance.clone(),
        };

        let url = format!("{}{}", self.base_url, ENDPOINT_ANNOUNCE);
        let response = self.post_with_retry(&url, &request, 3).await?;
        if !response.status().is_success() {
            return Err(anyhow!("announcement rejected: {}", response.status()));
        }
        let response: AnnounceResponse = response.json().await?;

        if response.server_instance != self.server_instance {
            tracing::info!(
                "Coordinator instance changed to {}; resynchronizing",
                response.server_instance
            );
            self.cluster = response.current_cluster;
            self.server_instance = response.server_instance;
        } else {
            if let Some(member) = include_member {
                if !response.current_cluster.contains_key(member) {
                    self.cluster.remove(member);
                }
            }
            self.cluster.extend(response.current_cluster);
        }
        self.cursor = response.cursor;

        Ok(())
    }

    /// Periodic re-announce loop. Each tick refreshes our own membership and
    /// folds the returned changes into the local view.
    pub async fn run(mut self, period: Duration) {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            match self.announce(None).await {
                Ok(()) => {
                    tracing::debug!(
                        "Cluster view: {} members at cursor {}",
                        self.cluster.len(),
                        self.cursor
                    );
                }
                Err(e) => {
                    tracing::warn!("Announcement failed: {}", e);
                }
            }
        }
    }

    async fn post_with_retry(
        &self,
        url: &str,
        payload: &AnnounceRequest,
        attempts: usize,
    ) -> Result<reqwest::Response> {
        let mut delay_ms = 150u64;

        for attempt in 0..attempts {
            let response = self
                .http
                .post(url)
                .header(PRINCIPAL_HEADER, self.principal.as_str())
                .json(payload)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(anyhow!(e));
                    }
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(1200);
                }
            }
        }

        Err(anyhow!("retry attempts exhausted"))
    }
}
