// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

// Layer 3: Internal module imports
use actormesh_core::{
    ActorHealth, CreateCommand, CreatedActor, Envelope, RemoteAddress, RemoteTransport,
    SharedSecret, TellCommand, TransportError, API_KEY_HEADER, HTTP_CONNECT_TIMEOUT,
    HTTP_READ_TIMEOUT,
};

/// HTTP control transport.
///
/// Reaches a hosting service's `/runtime` facade: tell is a POST, stop a
/// DELETE, health a GET, ask a short-lived POST against the facade's
/// pending-reply table. Timeouts are short and fixed (connect 2 s, read
/// 5 s); failures surface as typed [`TransportError`]s and are never
/// retried here.
#[derive(Clone)]
pub struct HttpRemoteTransport {
    client: Client,
    secret: SharedSecret,
}

impl HttpRemoteTransport {
    /// Build a transport with the standard control-plane timeouts.
    pub fn new(secret: SharedSecret) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_READ_TIMEOUT)
            .build()
            .map_err(|error| TransportError::Connection(error.to_string()))?;
        Ok(Self { client, secret })
    }

    /// Build over an existing client (tests, custom timeouts).
    pub fn with_client(client: Client, secret: SharedSecret) -> Self {
        Self { client, secret }
    }

    fn base_url<'a>(&self, target: &'a RemoteAddress) -> Result<&'a str, TransportError> {
        target
            .service_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| TransportError::MissingServiceUrl(target.actor_id.clone()))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.secret.outbound_value() {
            Some(secret) => request.header(API_KEY_HEADER, secret),
            None => request,
        }
    }

    fn map_request_error(error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(HTTP_READ_TIMEOUT)
        } else {
            TransportError::Connection(error.to_string())
        }
    }

    /// Forward an actor creation to a hosting service.
    ///
    /// Control-plane only; not part of the transport contract, which is
    /// why it lives on the concrete type.
    pub async fn create_actor(
        &self,
        service_url: &str,
        command: &CreateCommand,
    ) -> Result<CreatedActor, TransportError> {
        let url = format!("{}/runtime/create-actor", service_url.trim_end_matches('/'));
        let response = self
            .authorized(self.client.post(&url).json(command))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::OK => response
                .json::<CreatedActor>()
                .await
                .map_err(|error| TransportError::Protocol(error.to_string())),
            StatusCode::BAD_REQUEST => Err(TransportError::Rejected(
                read_problem_message(response).await,
            )),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }
}

async fn read_problem_message(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_owned())
}

#[async_trait]
impl RemoteTransport for HttpRemoteTransport {
    async fn send(
        &self,
        target: &RemoteAddress,
        command: TellCommand,
    ) -> Result<(), TransportError> {
        let base = self.base_url(target)?;
        let url = format!("{base}/runtime/tell");
        debug!(actor_id = %target.actor_id, %url, "forwarding tell");

        let response = self
            .authorized(self.client.post(&url).json(&command))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(target.actor_id.clone())),
            StatusCode::SERVICE_UNAVAILABLE => Err(TransportError::Unavailable(
                read_problem_message(response).await,
            )),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }

    async fn ask(
        &self,
        target: &RemoteAddress,
        command: TellCommand,
        timeout: Duration,
    ) -> Result<Envelope, TransportError> {
        let base = self.base_url(target)?;
        let url = format!("{base}/runtime/ask");

        let response = self
            .authorized(
                self.client
                    .post(&url)
                    .query(&[("timeoutMs", timeout.as_millis().to_string())])
                    .json(&command)
                    // The facade holds the request until the reply or its
                    // own deadline; give it headroom over the ask timeout.
                    .timeout(timeout + HTTP_READ_TIMEOUT),
            )
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    TransportError::Timeout(timeout)
                } else {
                    Self::map_request_error(error)
                }
            })?;

        match response.status() {
            StatusCode::OK => response
                .json::<Envelope>()
                .await
                .map_err(|error| TransportError::Protocol(error.to_string())),
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(target.actor_id.clone())),
            StatusCode::GATEWAY_TIMEOUT => Err(TransportError::Timeout(timeout)),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }

    async fn exists(&self, target: &RemoteAddress) -> Result<bool, TransportError> {
        let base = self.base_url(target)?;
        let url = format!("{base}/runtime/actors/{}/health", target.actor_id);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }

    async fn stop(&self, target: &RemoteAddress) -> Result<(), TransportError> {
        let base = self.base_url(target)?;
        let url = format!("{base}/runtime/actors/{}", target.actor_id);

        let response = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(target.actor_id.clone())),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }

    async fn state(&self, target: &RemoteAddress) -> Result<ActorHealth, TransportError> {
        let base = self.base_url(target)?;
        let url = format!("{base}/runtime/actors/{}/health", target.actor_id);

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_request_error)?;

        match response.status() {
            StatusCode::OK => response
                .json::<ActorHealth>()
                .await
                .map_err(|error| TransportError::Protocol(error.to_string())),
            StatusCode::NOT_FOUND => Err(TransportError::NotFound(target.actor_id.clone())),
            status => Err(TransportError::Protocol(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }
}
