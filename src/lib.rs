//! # lightwire
//!
//! Client for the LAN control protocol of smart lights:
//! - Line-delimited JSON requests over one persistent TCP connection
//! - Parameters validated before anything is queued
//! - Deferred job queue flushed by an explicit commit
//! - Replies matched to requests by id
//! - Typed property reads
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Light<T>                              │
//! │          (deferred commands, immediate reads)                │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │    Validator    │            │ Property Reader │
//!   │ (command, flow) │            │   (get_prop)    │
//!   └────────┬────────┘            └────────┬────────┘
//!            ▼                              │
//!   ┌─────────────────┐                     │
//!   │    Job Queue    │                     │
//!   │    (commit)     │                     │
//!   └────────┬────────┘                     │
//!            └──────────────┬───────────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │     Session     │
//!                  │ (id correlation)│
//!                  └────────┬────────┘
//!                           ▼
//!                  ┌─────────────────┐
//!                  │   Connection    │
//!                  │  (TCP, CRLF)    │
//!                  └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use lightwire::{ColorSpec, Config, Light};
//!
//! # fn main() -> lightwire::Result<()> {
//! let mut light = Light::connect("192.168.1.20", Config::default())?;
//! light
//!     .set_color(ColorSpec::rgb(0xFF0000)?)?
//!     .set_brightness(60)?;
//! let report = light.commit()?;
//! assert!(report.succeeded());
//! println!("power on: {}", light.is_on()?);
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod command;
pub mod network;
pub mod queue;
pub mod properties;
pub mod light;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ErrorKind, LightError, Result};
pub use config::{CommitPolicy, Config, DEFAULT_PORT};
pub use command::{ColorSpace, ColorSpec, Command, FadeEffect, FlowAction, FlowExpression, FlowMode, FlowStep, Power};
pub use light::Light;
pub use network::{Connection, ConnectionState, Transport};
pub use properties::{ColorReading, PropertyValues};
pub use protocol::{CommandKind, Job, Property, Value};
pub use queue::{CommitReport, JobOutcome, JobQueue, JobStatus};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lightwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
