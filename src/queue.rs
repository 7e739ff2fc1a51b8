//! Job Queue
//!
//! Accumulates validated jobs and flushes them through a session on commit.
//!
//! ## Ids
//! Jobs are numbered 0, 1, 2, ... in insertion order. The numbering restarts
//! at 0 once a commit has drained the queue.
//!
//! `get_prop` and `stop_cf` are sent immediately by the client and are never
//! queued.

use std::str::FromStr;

use serde_json::Value;

use crate::command::{self, Command};
use crate::config::CommitPolicy;
use crate::error::{LightError, Result};
use crate::network::{Session, Transport};
use crate::protocol::{CommandKind, DeviceErrorBody, Job, Outcome};

/// How the device answered one job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// `result` reply
    Accepted(Vec<Value>),

    /// No reply before the read timeout; the device applies these silently
    Silent,

    /// `error` reply
    Rejected(DeviceErrorBody),
}

/// Outcome of one committed job
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub id: u64,
    pub method: CommandKind,
    pub status: JobStatus,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, JobStatus::Rejected(_))
    }
}

/// Per-job outcomes of one commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitReport {
    outcomes: Vec<JobOutcome>,
    policy: CommitPolicy,
}

impl CommitReport {
    pub fn new(outcomes: Vec<JobOutcome>, policy: CommitPolicy) -> Self {
        Self { outcomes, policy }
    }

    /// Aggregate result under the report's policy
    ///
    /// With `AnySucceeded` a batch with one accepted job among rejected ones
    /// still counts as a success; inspect [`Self::outcomes`] for details.
    pub fn succeeded(&self) -> bool {
        match self.policy {
            CommitPolicy::AnySucceeded => self.outcomes.iter().any(JobOutcome::is_success),
            CommitPolicy::AllSucceeded => {
                !self.outcomes.is_empty() && self.outcomes.iter().all(JobOutcome::is_success)
            }
        }
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    pub fn outcomes(&self) -> &[JobOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Ordered, append-only list of pending jobs
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: Vec<Job>,
    next_id: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate raw params for `method` and append the resulting job
    pub fn enqueue(&mut self, method: &str, params: Vec<Value>) -> Result<&mut Self> {
        let kind = CommandKind::from_str(method)?;
        self.enqueue_kind(kind, params)
    }

    /// Same as [`Self::enqueue`] with an already parsed method
    pub fn enqueue_kind(&mut self, kind: CommandKind, params: Vec<Value>) -> Result<&mut Self> {
        reject_immediate(kind)?;
        let command = command::validate(kind, &params)?;
        Ok(self.append(command))
    }

    /// Append a validated command
    pub fn push(&mut self, command: Command) -> Result<&mut Self> {
        reject_immediate(command.kind())?;
        Ok(self.append(command))
    }

    /// Append a command already known to be deferrable
    pub(crate) fn append(&mut self, command: Command) -> &mut Self {
        debug_assert!(!command.kind().is_immediate());
        let job = Job::new(self.next_id, &command);
        tracing::trace!("Queued {} as job {}", job.method(), job.id());
        self.next_id += 1;
        self.jobs.push(job);
        self
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Id the next pushed job will get
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Send every job in order and collect the outcomes
    ///
    /// The queue is emptied and its ids reset whatever happens. A connection
    /// or protocol failure aborts the remaining jobs and is returned as the
    /// error; device rejections are recorded per job.
    pub fn commit<T: Transport>(
        &mut self,
        session: &mut Session<T>,
        policy: CommitPolicy,
    ) -> Result<CommitReport> {
        let jobs = std::mem::take(&mut self.jobs);
        self.next_id = 0;

        tracing::debug!("Committing {} job(s)", jobs.len());

        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in &jobs {
            let status = match session.request(job)? {
                Some(response) => match response.outcome {
                    Outcome::Ok(result) => JobStatus::Accepted(result),
                    Outcome::Err(error) => {
                        tracing::warn!(
                            "Device rejected {} (id {}): {} {}",
                            job.method(),
                            job.id(),
                            error.code,
                            error.message
                        );
                        JobStatus::Rejected(error)
                    }
                },
                None => JobStatus::Silent,
            };
            outcomes.push(JobOutcome {
                id: job.id(),
                method: job.method(),
                status,
            });
        }

        Ok(CommitReport::new(outcomes, policy))
    }
}

fn reject_immediate(kind: CommandKind) -> Result<()> {
    if kind.is_immediate() {
        return Err(LightError::validation(format!(
            "{} is sent immediately and cannot be queued",
            kind
        )));
    }
    Ok(())
}
