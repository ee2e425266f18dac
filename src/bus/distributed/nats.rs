//! NATS transport.
//!
//! The bus contracts are synchronous, the NATS client is not. Calls are
//! driven to completion on a tokio runtime handle supplied by the caller,
//! and every queue subscription gets a task that hands incoming messages to
//! the blocking thread pool one at a time.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_nats::{Client, ConnectOptions};
use futures::StreamExt;
use serde::Deserialize;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::transport::{MessageCallback, Transport, TransportMessage};
use crate::bus::SubscriptionId;
use crate::error::{BoxError, Error, ErrorKind, Result};
use crate::metadata::Metadata;

/// Connection settings, loadable from any serde source.
#[derive(Clone, Debug, Deserialize)]
pub struct NatsConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Client connection name shown in server monitoring.
    #[serde(default)]
    pub name: Option<String>,
    /// Queue group the distributed bus joins.
    #[serde(default = "default_queue_group")]
    pub queue_group: String,
    #[serde(default = "default_connect_timeout")]
    pub connection_timeout_secs: u64,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            name: None,
            queue_group: default_queue_group(),
            connection_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_queue_group() -> String {
    "default".to_string()
}

const fn default_connect_timeout() -> u64 {
    5
}

/// [`Transport`] backed by a core NATS client.
///
/// Blocking calls made from inside a tokio runtime require the multi-thread
/// flavor.
pub struct NatsTransport {
    client: Client,
    runtime: Handle,
    tasks: Mutex<HashMap<SubscriptionId, JoinHandle<()>>>,
}

impl NatsTransport {
    /// Wrap an already connected client.
    pub fn new(client: Client, runtime: Handle) -> Self {
        Self {
            client,
            runtime,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn connect(config: &NatsConfig, runtime: Handle) -> Result<Self> {
        let mut options = ConnectOptions::new()
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs));
        if let Some(name) = &config.name {
            options = options.name(name);
        }

        let client = block_on(&runtime, options.connect(config.url.as_str())).map_err(|err| {
            Error::wrap(ErrorKind::Transport, err, "could not connect to NATS")
                .with_metadata(Metadata::with("url", &config.url))
        })?;

        info!(url = %config.url, "connected to NATS");
        Ok(Self::new(client, runtime))
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<SubscriptionId, JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for NatsTransport {
    fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BoxError> {
        block_on(
            &self.runtime,
            self.client.publish(subject.to_string(), payload.into()),
        )?;
        Ok(())
    }

    fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
        callback: MessageCallback,
    ) -> Result<SubscriptionId, BoxError> {
        let mut subscriber = block_on(
            &self.runtime,
            self.client
                .queue_subscribe(subject.to_string(), queue_group.to_string()),
        )?;

        let id = SubscriptionId::next();
        let task = self.runtime.spawn(async move {
            while let Some(message) = subscriber.next().await {
                let callback = callback.clone();
                let message = TransportMessage {
                    subject: message.subject.to_string(),
                    payload: message.payload.to_vec(),
                };
                // Awaited so one subscription sees its messages in order.
                if let Err(err) = tokio::task::spawn_blocking(move || callback(message)).await {
                    warn!(subscription = %id, error = %err, "message callback panicked");
                }
            }
            debug!(subscription = %id, "NATS subscription closed");
        });

        self.lock_tasks().insert(id, task);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, BoxError> {
        // Dropping the subscriber inside the task unsubscribes on the server.
        match self.lock_tasks().remove(&id) {
            Some(task) => {
                task.abort();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Drop for NatsTransport {
    fn drop(&mut self) {
        for (_, task) in self.lock_tasks().drain() {
            task.abort();
        }
    }
}

fn block_on<F: Future>(runtime: &Handle, future: F) -> F::Output {
    match Handle::try_current() {
        Ok(current) if current.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| runtime.block_on(future))
        }
        _ => runtime.block_on(future),
    }
}
