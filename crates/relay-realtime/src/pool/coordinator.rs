//! Pool coordinator: the single task that owns membership and fans out
//! broadcasts.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use relay_core::config::pool::PoolConfig;
use relay_core::types::ClientId;

use crate::connection::OutboundHandle;
use crate::message::types::Message;
use crate::metrics::{self, RelayMetrics};

use super::handle::{self, Inlets, PoolHandle, Registration};

/// Authoritative set of connected clients plus the inlets feeding it.
///
/// Membership is touched only from [`Pool::run`], one event at a time, so it
/// needs no lock.
#[derive(Debug)]
pub struct Pool {
    /// Client ID → the outbound queue broadcasts are written to.
    members: HashMap<ClientId, OutboundHandle>,
    inlets: Inlets,
    metrics: Arc<RelayMetrics>,
}

impl Pool {
    /// Creates a pool and the handle used to submit events to it.
    pub fn new(config: &PoolConfig, metrics: Arc<RelayMetrics>) -> (Self, PoolHandle) {
        let (handle, inlets) = handle::channel(config, metrics.clone());

        let pool = Self {
            members: HashMap::new(),
            inlets,
            metrics,
        };

        (pool, handle)
    }

    /// Runs the coordinating loop.
    ///
    /// Waits on the registration, deregistration, and broadcast inlets and
    /// applies whichever event is ready, to completion, before taking the
    /// next. When several inlets are ready the choice between them is random.
    /// No event handler awaits, so the loop only ever blocks waiting for the
    /// next event. Returns only after every [`PoolHandle`] has been dropped.
    pub async fn run(mut self) {
        info!("Connection pool started");

        loop {
            tokio::select! {
                Some(registration) = self.inlets.register.recv() => {
                    self.handle_register(registration);
                }
                Some(client_id) = self.inlets.deregister.recv() => {
                    self.handle_deregister(client_id);
                }
                Some(message) = self.inlets.broadcast.recv() => {
                    self.handle_broadcast(message);
                }
                else => break,
            }
        }

        info!(members = self.members.len(), "All pool handles dropped, connection pool stopped");
    }

    fn handle_register(&mut self, registration: Registration) {
        let Registration {
            id,
            outbound,
            applied,
        } = registration;

        let is_new = self.members.insert(id, outbound).is_none();
        if is_new {
            metrics::connections::record_register(&self.metrics, self.members.len());
            info!(client_id = %id, size = self.members.len(), "Client registered");
            debug!(
                members = ?self.members.keys().map(ToString::to_string).collect::<Vec<_>>(),
                "Current pool members"
            );
        } else {
            debug!(client_id = %id, "Client already registered");
        }

        // An abandoned registration has no receive loop to deregister it.
        if applied.send(()).is_err() && is_new {
            debug!(client_id = %id, "Registering client went away");
            self.handle_deregister(id);
        }
    }

    fn handle_deregister(&mut self, client_id: ClientId) {
        if self.members.remove(&client_id).is_none() {
            debug!(client_id = %client_id, "Deregistration for unknown client ignored");
            return;
        }

        metrics::connections::record_deregister(&self.metrics, self.members.len());
        info!(client_id = %client_id, size = self.members.len(), "Client deregistered");
    }

    /// Queues the message for every member except its sender. A recipient
    /// whose queue is full or whose writer has stopped is logged and skipped;
    /// it neither aborts the fan-out nor is removed from membership.
    fn handle_broadcast(&mut self, message: Message) {
        let sender = message.sender();
        let mut queued = 0u64;
        let mut rejected = 0u64;

        for (client_id, outbound) in &self.members {
            if *client_id == sender {
                continue;
            }

            match outbound.try_send(message.frame().clone()) {
                Ok(()) => queued += 1,
                Err(e) => {
                    warn!(
                        client_id = %client_id,
                        sender = %sender,
                        error = %e,
                        "Failed to deliver message"
                    );
                    rejected += 1;
                }
            }
        }

        debug!(
            sender = %sender,
            kind = %message.kind(),
            bytes = message.payload().len(),
            queued,
            rejected,
            "Sent message to all clients in pool"
        );
        metrics::messages::record_broadcast(&self.metrics, rejected);
    }
}
