//! Request/response session
//!
//! Sends one job at a time over a [`Transport`] and matches the reply by id.
//!
//! The device pushes `props` notifications on the same stream and may answer
//! a request after we stopped waiting for it, so the line read after a request
//! is not necessarily its reply. Every line is classified:
//!
//! - notification          → logged, skipped
//! - reply to our request  → returned
//! - reply to an expired request (one that timed out earlier) → discarded
//! - any other id          → protocol error

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use super::Transport;
use crate::error::{LightError, Result};
use crate::protocol::{codec, CommandKind, Job, Message, Response};

/// How many timed-out ids are remembered; older ones are forgotten
pub const EXPIRED_CAPACITY: usize = 32;

/// Ids of requests sent and not yet answered
#[derive(Debug, Default)]
pub struct PendingRequests {
    /// Requests currently awaiting a reply
    in_flight: HashMap<u64, CommandKind>,

    /// Most recent requests we gave up waiting for, oldest first.
    /// A late reply to one of them is dropped silently.
    expired: VecDeque<u64>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, method: CommandKind) {
        self.forget_expired(id);
        self.in_flight.insert(id, method);
    }

    /// Remove a request that got its reply
    pub fn resolve(&mut self, id: u64) -> Option<CommandKind> {
        self.in_flight.remove(&id)
    }

    /// Stop waiting for a request but remember its id
    pub fn expire(&mut self, id: u64) {
        if self.in_flight.remove(&id).is_none() {
            return;
        }
        self.forget_expired(id);
        if self.expired.len() == EXPIRED_CAPACITY {
            self.expired.pop_front();
        }
        self.expired.push_back(id);
    }

    /// Drop `id` from the expired list, returning whether it was there
    pub fn forget_expired(&mut self, id: u64) -> bool {
        match self.expired.iter().position(|&e| e == id) {
            Some(pos) => {
                self.expired.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn is_in_flight(&self, id: u64) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn is_expired(&self, id: u64) -> bool {
        self.expired.contains(&id)
    }

    pub fn expired_count(&self) -> usize {
        self.expired.len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// A transport plus its pending-request table
#[derive(Debug)]
pub struct Session<T: Transport> {
    transport: T,
    pending: PendingRequests,
}

impl<T: Transport> Session<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            pending: PendingRequests::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    /// Send `job` and wait for its reply
    ///
    /// `Ok(None)` means no reply arrived before the transport's read timeout.
    /// The timeout covers the whole exchange; notifications read while
    /// waiting do not extend it.
    pub fn request(&mut self, job: &Job) -> Result<Option<Response>> {
        if !self.transport.is_online()? {
            return Err(LightError::DeviceOffline(format!(
                "peer closed the connection before request {}",
                job.id()
            )));
        }

        let payload = codec::encode_job(job)?;
        self.transport.send_line(&payload)?;
        self.pending.insert(job.id(), job.method());
        let deadline = Instant::now() + self.transport.read_timeout();

        loop {
            let line = match self.transport.recv_line_until(deadline) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    tracing::debug!("No reply to {} (id {}) before timeout", job.method(), job.id());
                    self.pending.expire(job.id());
                    return Ok(None);
                }
                Err(e) => {
                    self.pending.expire(job.id());
                    return Err(e);
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            let message = match codec::decode_message(&line) {
                Ok(message) => message,
                Err(e) => {
                    self.pending.expire(job.id());
                    return Err(e);
                }
            };

            match message {
                Message::Notification(notification) => {
                    tracing::trace!(
                        "Skipping '{}' notification while waiting for id {}",
                        notification.method,
                        job.id()
                    );
                }
                Message::Response(response) if response.id == job.id() => {
                    self.pending.resolve(response.id);
                    return Ok(Some(response));
                }
                Message::Response(response) if self.pending.is_expired(response.id) => {
                    tracing::debug!("Discarding late reply to expired request {}", response.id);
                    self.pending.forget_expired(response.id);
                }
                Message::Response(response) => {
                    self.pending.expire(job.id());
                    return Err(LightError::UnmatchedResponse(response.id));
                }
            }
        }
    }
}
