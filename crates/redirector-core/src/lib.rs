//! # Redirector Core
//!
//! Core types and error handling for the domain redirector.
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Pool configuration model (weighted domains, ordered path rules, headers)
//! - Resolution request and result types
//! - Error taxonomy for resolution failures
//! - The structured resolution record and the sink it is emitted to

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod record;
pub mod resolution;
pub mod types;

// Re-export commonly used types
pub use error::{RedirectError, RedirectResult, NO_DOMAINS_MESSAGE, POOL_NOT_FOUND_MESSAGE};
pub use record::{NoopSink, RecordEvent, RecordOutcome, RecordSink, ResolutionRecord};
pub use resolution::{Redirect, ResolutionRequest};
pub use types::{CustomHeaders, PathRule, PathRules, PoolConfig, PoolEntry, WeightedDomain};
