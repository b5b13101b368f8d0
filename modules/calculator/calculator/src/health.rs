//! Serving status of the process and of each hosted gRPC service.
//!
//! The empty service name stands for the server as a whole.

use std::collections::HashMap;

use tokio::sync::watch;

/// Name under which the overall server status is registered.
pub const OVERALL: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServingStatus {
    Serving,
    NotServing,
}

pub type StatusMap = HashMap<String, ServingStatus>;

/// Registry of serving statuses; subscribers see every change.
#[derive(Debug)]
pub struct HealthRegistry {
    statuses: watch::Sender<StatusMap>,
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthRegistry {
    #[must_use]
    pub fn new() -> Self {
        let (statuses, _) = watch::channel(StatusMap::new());
        Self { statuses }
    }

    /// Register or update a service. Subscribers are only woken on change.
    pub fn set_status(&self, service: &str, status: ServingStatus) {
        let changed = self.statuses.send_if_modified(|map| {
            map.insert(service.to_owned(), status) != Some(status)
        });
        if changed {
            tracing::info!(service, ?status, "serving status changed");
        }
    }

    /// Move every registered service, the overall entry included, to `status`.
    pub fn set_all(&self, status: ServingStatus) {
        self.statuses.send_if_modified(|map| {
            let mut changed = false;
            for current in map.values_mut() {
                if *current != status {
                    *current = status;
                    changed = true;
                }
            }
            changed
        });
        tracing::info!(?status, "serving status of all services set");
    }

    /// Status of a registered service; `None` for unknown names.
    #[must_use]
    pub fn status(&self, service: &str) -> Option<ServingStatus> {
        self.statuses.borrow().get(service).copied()
    }

    /// Status of the server as a whole.
    #[must_use]
    pub fn overall(&self) -> Option<ServingStatus> {
        self.status(OVERALL)
    }

    /// Receiver that observes the current statuses and every later change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StatusMap> {
        self.statuses.subscribe()
    }
}
