//! Service registration and heartbeating against the control plane.
//!
//! On startup the client registers with exponential-backoff retry, then
//! heartbeats on a fixed cadence. Any heartbeat failure is treated as a
//! gateway restart: the in-memory service registry over there is gone, so
//! the client re-registers from scratch.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use reqwest::Client;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// Layer 3: Internal module imports
use actormesh_core::{
    HeartbeatRequest, RegisterServiceRequest, ServiceId, SharedSecret, API_KEY_HEADER,
    HTTP_CONNECT_TIMEOUT, HTTP_READ_TIMEOUT,
};

/// Initial retry delay for registration.
const BACKOFF_BASE: Duration = Duration::from_millis(500);

/// Retry delay ceiling.
const BACKOFF_MAX: Duration = Duration::from_secs(30);

/// Registration and heartbeat loop of one hosting service.
pub struct RegistrationClient {
    client: Client,
    gateway_url: String,
    secret: SharedSecret,
    request: RegisterServiceRequest,
    heartbeat_interval: Duration,
}

impl RegistrationClient {
    /// Build a client.
    pub fn new(
        gateway_url: impl Into<String>,
        secret: SharedSecret,
        service_id: ServiceId,
        service_public_url: impl Into<String>,
        supported_actor_types: Vec<String>,
        heartbeat_interval: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_READ_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            gateway_url: gateway_url.into().trim_end_matches('/').to_owned(),
            secret,
            request: RegisterServiceRequest {
                service_id,
                service_url: service_public_url.into(),
                supported_actor_types: Some(supported_actor_types),
            },
            heartbeat_interval,
        })
    }

    /// Spawn the register-then-heartbeat loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.register_with_backoff().await;
            loop {
                tokio::time::sleep(self.heartbeat_interval).await;
                if !self.send_heartbeat().await {
                    warn!(
                        service_id = %self.request.service_id,
                        "heartbeat failed, assuming gateway restart"
                    );
                    self.register_with_backoff().await;
                }
            }
        })
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.secret.outbound_value() {
            Some(secret) => request.header(API_KEY_HEADER, secret),
            None => request,
        }
    }

    /// One registration attempt.
    pub async fn register_once(&self) -> bool {
        let url = format!("{}/api/v1/services/register", self.gateway_url);
        match self
            .authorized(self.client.post(&url).json(&self.request))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(service_id = %self.request.service_id, "registered with gateway");
                true
            }
            Ok(response) => {
                warn!(status = %response.status(), "gateway refused registration");
                false
            }
            Err(error) => {
                debug!(%error, "registration attempt failed");
                false
            }
        }
    }

    /// Register until it succeeds, doubling the delay up to the ceiling.
    pub async fn register_with_backoff(&self) {
        let mut delay = BACKOFF_BASE;
        loop {
            if self.register_once().await {
                return;
            }
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(BACKOFF_MAX);
        }
    }

    /// One heartbeat; `false` on any failure (including an unknown-service
    /// answer from a freshly restarted gateway).
    pub async fn send_heartbeat(&self) -> bool {
        let url = format!("{}/api/v1/services/heartbeat", self.gateway_url);
        let body = HeartbeatRequest {
            service_id: self.request.service_id.clone(),
        };
        match self
            .authorized(self.client.post(&url).json(&body))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(%error, "heartbeat failed");
                false
            }
        }
    }
}
