// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

// Layer 3: Internal module imports
use super::RegistryError;
use actormesh_core::{RegisterServiceRequest, ServiceId, ServiceRecord};

const COMMAND_BUFFER: usize = 64;

/// Outcome of a registration.
#[derive(Debug, Clone)]
pub struct Registered {
    pub record: ServiceRecord,

    /// The service was flagged unhealthy and this registration recovers it
    /// immediately (no probe round-trip needed).
    pub recovered: bool,
}

enum Command {
    Register {
        request: RegisterServiceRequest,
        reply: oneshot::Sender<Registered>,
    },
    Heartbeat {
        service_id: ServiceId,
        reply: oneshot::Sender<bool>,
    },
    Get {
        service_id: ServiceId,
        reply: oneshot::Sender<Option<ServiceRecord>>,
    },
    List {
        reply: oneshot::Sender<Vec<ServiceRecord>>,
    },
    SetHealth {
        service_id: ServiceId,
        healthy: bool,
        reply: oneshot::Sender<Option<bool>>,
    },
}

/// Handle to the service registry task.
#[derive(Clone)]
pub struct ServiceRegistryHandle {
    tx: mpsc::Sender<Command>,
}

impl ServiceRegistryHandle {
    /// Spawn the registry task.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = tokio::spawn(registry_task(rx));
        (Self { tx }, handle)
    }

    async fn send<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, RegistryError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| RegistryError::Closed)?;
        reply_rx.await.map_err(|_| RegistryError::Closed)
    }

    /// Register or re-register a service.
    ///
    /// Idempotent: an existing `service_id` keeps its identity and updates
    /// url, heartbeat and supported types. Re-registration while flagged
    /// unhealthy reports `recovered`.
    pub async fn register(
        &self,
        request: RegisterServiceRequest,
    ) -> Result<Registered, RegistryError> {
        self.send(|reply| Command::Register { request, reply }).await
    }

    /// Record a heartbeat; `false` when the service is unknown.
    pub async fn heartbeat(&self, service_id: &ServiceId) -> Result<bool, RegistryError> {
        self.send(|reply| Command::Heartbeat {
            service_id: service_id.clone(),
            reply,
        })
        .await
    }

    /// Look up one service.
    pub async fn get(&self, service_id: &ServiceId) -> Result<Option<ServiceRecord>, RegistryError> {
        self.send(|reply| Command::Get {
            service_id: service_id.clone(),
            reply,
        })
        .await
    }

    /// Snapshot of every registered service.
    pub async fn list(&self) -> Result<Vec<ServiceRecord>, RegistryError> {
        self.send(|reply| Command::List { reply }).await
    }

    /// Flip a service's health flag; replies with the previous flag, or
    /// `None` when the service is unknown.
    pub async fn set_health(
        &self,
        service_id: &ServiceId,
        healthy: bool,
    ) -> Result<Option<bool>, RegistryError> {
        self.send(|reply| Command::SetHealth {
            service_id: service_id.clone(),
            healthy,
            reply,
        })
        .await
    }
}

async fn registry_task(mut rx: mpsc::Receiver<Command>) {
    let mut services: HashMap<ServiceId, ServiceRecord> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Register { request, reply } => {
                let recovered = services
                    .get(&request.service_id)
                    .map(|existing| !existing.healthy)
                    .unwrap_or(false);

                let record = ServiceRecord {
                    service_id: request.service_id.clone(),
                    service_url: request.service_url,
                    last_heartbeat: Utc::now(),
                    healthy: true,
                    supported_actor_types: request.supported_actor_types,
                };
                info!(service_id = %record.service_id, url = %record.service_url, recovered, "service registered");
                services.insert(request.service_id, record.clone());
                let _ = reply.send(Registered { record, recovered });
            }
            Command::Heartbeat { service_id, reply } => {
                let known = match services.get_mut(&service_id) {
                    Some(record) => {
                        record.last_heartbeat = Utc::now();
                        true
                    }
                    None => false,
                };
                let _ = reply.send(known);
            }
            Command::Get { service_id, reply } => {
                let _ = reply.send(services.get(&service_id).cloned());
            }
            Command::List { reply } => {
                let _ = reply.send(services.values().cloned().collect());
            }
            Command::SetHealth {
                service_id,
                healthy,
                reply,
            } => {
                let previous = match services.get_mut(&service_id) {
                    Some(record) => {
                        let was = record.healthy;
                        record.healthy = healthy;
                        Some(was)
                    }
                    None => None,
                };
                let _ = reply.send(previous);
            }
        }
    }
}
