// Layer 1: Standard library imports
use std::collections::{HashMap, HashSet};

// Layer 2: Third-party crate imports
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

// Layer 3: Internal module imports
use super::RegistryError;
use actormesh_core::{ActorId, ActorRecord, ActorStatus, ServiceId};

const COMMAND_BUFFER: usize = 128;

enum Command {
    Put {
        record: Box<ActorRecord>,
        reply: oneshot::Sender<()>,
    },
    Remove {
        actor_id: ActorId,
        reply: oneshot::Sender<Option<ActorRecord>>,
    },
    Get {
        actor_id: ActorId,
        reply: oneshot::Sender<Option<ActorRecord>>,
    },
    List {
        reply: oneshot::Sender<Vec<ActorRecord>>,
    },
    ListByService {
        service_id: ServiceId,
        reply: oneshot::Sender<Vec<ActorRecord>>,
    },
    SetStatus {
        actor_id: ActorId,
        status: ActorStatus,
        reply: oneshot::Sender<bool>,
    },
    MarkServiceAvailability {
        service_id: ServiceId,
        available: bool,
        reply: oneshot::Sender<Vec<ActorId>>,
    },
    Count {
        reply: oneshot::Sender<usize>,
    },
}

/// Handle to the actor registry task.
///
/// The task is the sole owner of the records and the per-service index, so
/// writes for one actor id are serialized by construction. Reads reply
/// with snapshots.
#[derive(Clone)]
pub struct ActorRegistryHandle {
    tx: mpsc::Sender<Command>,
}

impl ActorRegistryHandle {
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

    /// Insert or replace a record.
    pub async fn put(&self, record: ActorRecord) -> Result<(), RegistryError> {
        self.send(|reply| Command::Put {
            record: Box::new(record),
            reply,
        })
        .await
    }

    /// Remove a record, returning it.
    pub async fn remove(&self, actor_id: &ActorId) -> Result<Option<ActorRecord>, RegistryError> {
        self.send(|reply| Command::Remove {
            actor_id: actor_id.clone(),
            reply,
        })
        .await
    }

    /// Look up one record.
    pub async fn get(&self, actor_id: &ActorId) -> Result<Option<ActorRecord>, RegistryError> {
        self.send(|reply| Command::Get {
            actor_id: actor_id.clone(),
            reply,
        })
        .await
    }

    /// Snapshot of every record.
    pub async fn list(&self) -> Result<Vec<ActorRecord>, RegistryError> {
        self.send(|reply| Command::List { reply }).await
    }

    /// Snapshot of the records owned by one service.
    pub async fn list_by_service(
        &self,
        service_id: &ServiceId,
    ) -> Result<Vec<ActorRecord>, RegistryError> {
        self.send(|reply| Command::ListByService {
            service_id: service_id.clone(),
            reply,
        })
        .await
    }

    /// Set one actor's status; `false` when the actor is unknown.
    pub async fn set_status(
        &self,
        actor_id: &ActorId,
        status: ActorStatus,
    ) -> Result<bool, RegistryError> {
        self.send(|reply| Command::SetStatus {
            actor_id: actor_id.clone(),
            status,
            reply,
        })
        .await
    }

    /// Bulk availability flip for every actor owned by a service.
    ///
    /// Down: CREATED/ACTIVE become UNAVAILABLE. Up: UNAVAILABLE becomes
    /// ACTIVE. Explicitly STOPPED actors never come back. Returns the ids
    /// that actually flipped.
    pub async fn mark_service_availability(
        &self,
        service_id: &ServiceId,
        available: bool,
    ) -> Result<Vec<ActorId>, RegistryError> {
        self.send(|reply| Command::MarkServiceAvailability {
            service_id: service_id.clone(),
            available,
            reply,
        })
        .await
    }

    /// Number of records.
    pub async fn count(&self) -> Result<usize, RegistryError> {
        self.send(|reply| Command::Count { reply }).await
    }
}

struct Store {
    records: HashMap<ActorId, ActorRecord>,
    by_service: HashMap<ServiceId, HashSet<ActorId>>,
}

impl Store {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            by_service: HashMap::new(),
        }
    }

    fn put(&mut self, record: ActorRecord) {
        if let Some(previous) = self.records.get(&record.actor_id) {
            // Re-homing an id to another service updates the index.
            if previous.service_id != record.service_id {
                if let Some(owned) = self.by_service.get_mut(&previous.service_id) {
                    owned.remove(&record.actor_id);
                }
            }
        }
        self.by_service
            .entry(record.service_id.clone())
            .or_default()
            .insert(record.actor_id.clone());
        self.records.insert(record.actor_id.clone(), record);
    }

    fn remove(&mut self, actor_id: &ActorId) -> Option<ActorRecord> {
        let record = self.records.remove(actor_id)?;
        if let Some(owned) = self.by_service.get_mut(&record.service_id) {
            owned.remove(actor_id);
            if owned.is_empty() {
                self.by_service.remove(&record.service_id);
            }
        }
        Some(record)
    }

    fn mark_availability(&mut self, service_id: &ServiceId, available: bool) -> Vec<ActorId> {
        let Some(owned) = self.by_service.get(service_id) else {
            return Vec::new();
        };

        let mut flipped = Vec::new();
        for actor_id in owned {
            let Some(record) = self.records.get_mut(actor_id) else {
                continue;
            };
            let next = match (record.status, available) {
                (ActorStatus::Active | ActorStatus::Created, false) => ActorStatus::Unavailable,
                (ActorStatus::Unavailable, true) => ActorStatus::Active,
                _ => continue,
            };
            record.status = next;
            flipped.push(actor_id.clone());
        }
        flipped
    }
}

async fn registry_task(mut rx: mpsc::Receiver<Command>) {
    let mut store = Store::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Put { record, reply } => {
                debug!(actor_id = %record.actor_id, service_id = %record.service_id, "registry put");
                store.put(*record);
                let _ = reply.send(());
            }
            Command::Remove { actor_id, reply } => {
                let _ = reply.send(store.remove(&actor_id));
            }
            Command::Get { actor_id, reply } => {
                let _ = reply.send(store.records.get(&actor_id).cloned());
            }
            Command::List { reply } => {
                let _ = reply.send(store.records.values().cloned().collect());
            }
            Command::ListByService { service_id, reply } => {
                let records = store
                    .by_service
                    .get(&service_id)
                    .map(|owned| {
                        owned
                            .iter()
                            .filter_map(|id| store.records.get(id).cloned())
                            .collect()
                    })
                    .unwrap_or_default();
                let _ = reply.send(records);
            }
            Command::SetStatus {
                actor_id,
                status,
                reply,
            } => {
                let found = match store.records.get_mut(&actor_id) {
                    Some(record) => {
                        record.status = status;
                        true
                    }
                    None => false,
                };
                let _ = reply.send(found);
            }
            Command::MarkServiceAvailability {
                service_id,
                available,
                reply,
            } => {
                let flipped = store.mark_availability(&service_id, available);
                let _ = reply.send(flipped);
            }
            Command::Count { reply } => {
                let _ = reply.send(store.records.len());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use actormesh_core::Params;
    use chrono::Utc;

    fn record(actor_id: &str, service_id: &str, status: ActorStatus) -> ActorRecord {
        ActorRecord {
            actor_id: ActorId::new(actor_id),
            actor_type: "Echo".to_owned(),
            service_id: ServiceId::new(service_id),
            service_url: format!("http://{service_id}:8080"),
            status,
            created_at: Utc::now(),
            properties: Params::new(),
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let (registry, _task) = ActorRegistryHandle::spawn();

        registry
            .put(record("a-1", "svc-a", ActorStatus::Active))
            .await
            .unwrap();

        let found = registry.get(&ActorId::new("a-1")).await.unwrap().unwrap();
        assert_eq!(found.service_id.as_str(), "svc-a");
        assert_eq!(registry.count().await.unwrap(), 1);

        let removed = registry.remove(&ActorId::new("a-1")).await.unwrap();
        assert!(removed.is_some());
        assert!(registry.get(&ActorId::new("a-1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_secondary_index_by_service() {
        let (registry, _task) = ActorRegistryHandle::spawn();

        registry
            .put(record("a-1", "svc-a", ActorStatus::Active))
            .await
            .unwrap();
        registry
            .put(record("a-2", "svc-a", ActorStatus::Active))
            .await
            .unwrap();
        registry
            .put(record("b-1", "svc-b", ActorStatus::Active))
            .await
            .unwrap();

        let owned = registry
            .list_by_service(&ServiceId::new("svc-a"))
            .await
            .unwrap();
        assert_eq!(owned.len(), 2);

        let unknown = registry
            .list_by_service(&ServiceId::new("svc-x"))
            .await
            .unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_availability_flip_spares_stopped() {
        let (registry, _task) = ActorRegistryHandle::spawn();

        registry
            .put(record("a-1", "svc-a", ActorStatus::Active))
            .await
            .unwrap();
        registry
            .put(record("a-2", "svc-a", ActorStatus::Stopped))
            .await
            .unwrap();

        let down = registry
            .mark_service_availability(&ServiceId::new("svc-a"), false)
            .await
            .unwrap();
        assert_eq!(down.len(), 1);
        assert_eq!(
            registry
                .get(&ActorId::new("a-1"))
                .await
                .unwrap()
                .unwrap()
                .status,
            ActorStatus::Unavailable
        );
        assert_eq!(
            registry
                .get(&ActorId::new("a-2"))
                .await
                .unwrap()
                .unwrap()
                .status,
            ActorStatus::Stopped
        );

        let up = registry
            .mark_service_availability(&ServiceId::new("svc-a"), true)
            .await
            .unwrap();
        assert_eq!(up.len(), 1);
        assert_eq!(
            registry
                .get(&ActorId::new("a-1"))
                .await
                .unwrap()
                .unwrap()
                .status,
            ActorStatus::Active
        );
        // STOPPED never comes back.
        assert_eq!(
            registry
                .get(&ActorId::new("a-2"))
                .await
                .unwrap()
                .unwrap()
                .status,
            ActorStatus::Stopped
        );
    }

    #[tokio::test]
    async fn test_rehoming_updates_index() {
        let (registry, _task) = ActorRegistryHandle::spawn();

        registry
            .put(record("a-1", "svc-a", ActorStatus::Active))
            .await
            .unwrap();
        registry
            .put(record("a-1", "svc-b", ActorStatus::Active))
            .await
            .unwrap();

        assert!(registry
            .list_by_service(&ServiceId::new("svc-a"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            registry
                .list_by_service(&ServiceId::new("svc-b"))
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
