//! # parley-core
//!
//! Core engine for the Parley chat event framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! receivers and extensions that don't need the full `parley` facade. It
//! contains the parts of the framework with real invariants:
//!
//! ## Classification ([`classify`])
//!
//! Inbound payload shapes overlap, so classification is a prioritized,
//! total decision procedure over the closed [`EventKind`] variant: exactly
//! one kind per payload, first matching rule wins, unrecognized shapes are
//! [`EventKind::Unknown`] (dropped, never an error).
//!
//! ## Constraints ([`Constraint`])
//!
//! Declarative listener matchers over the classified event. Every field a
//! constraint specifies must match; absent fields are wildcards; fields are
//! structural, so they only ever apply to the kinds that define them.
//! Constraints are validated at registration time, never silently ignored.
//!
//! ## The chain ([`Chain`], [`Middleware`], [`Next`])
//!
//! An ordered middleware list executed by a single driver loop. Each
//! middleware either signals its continuation once (advance), returns
//! without signaling (complete early), or errors (fail). "Proceed twice"
//! and "never proceed" are explicit driver states, not emergent behavior.
//!
//! ## The gate ([`Acknowledger`])
//!
//! At-most-once acknowledgment per event, enforced with a latch shared by
//! every middleware in the chain.
//!
//! # Error Types
//!
//! - [`AppInitError`] - construction-time misconfiguration
//! - [`ConstraintError`] - registration-time constraint rejection
//! - [`DispatchError`] - dispatch-time errors owed to the error sink
//! - [`ChainViolation`] - middleware protocol violations

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod ack;
mod chain;
mod classify;
mod constraint;
mod error;
mod middleware;
pub mod payload;

// Re-exports
pub use ack::{AckFn, Acknowledger};
pub use chain::{Chain, ChainOutcome, ChainState};
pub use classify::{ActionType, EventKind, OptionsSource, ViewKind, classify};
pub use constraint::{Constraint, Matcher};
pub use error::{AppInitError, BoxError, ChainViolation, ConstraintError, DispatchError};
pub use middleware::{Middleware, Next};
