//! # Redirector Routing
//!
//! Resolution of `(pool, path)` pairs to redirect targets.
//!
//! This crate provides:
//! - Ordered literal path-prefix matching
//! - Weighted random domain selection
//! - Target URL construction
//! - The [`Resolver`], which ties these together and emits one record per call

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod matcher;
pub mod resolver;
pub mod selector;

// Re-export main types
pub use matcher::{matching_rule, select_candidates};
pub use resolver::{build_target_url, resolve, resolve_with_rng, Resolver};
pub use selector::{choose_weighted, total_weight};
