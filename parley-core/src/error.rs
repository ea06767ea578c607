//! Error types for Parley.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`AppInitError`] - Construction-time misconfiguration, raised synchronously
//! - [`ConstraintError`] - Registration-time listener constraint rejection
//! - [`DispatchError`] - Dispatch-time errors, funneled to the error sink
//! - [`ChainViolation`] - Middleware protocol violations detected by the driver

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised synchronously while constructing an app.
///
/// These are fatal: a misconfigured app is never built.
#[derive(Error, Debug)]
pub enum AppInitError {
    /// Neither a token nor an authorizer was supplied.
    #[error("no authorization method configured: provide a token or an authorizer")]
    MissingAuthorization,

    /// Both a token and an authorizer were supplied.
    #[error("conflicting authorization: supply either a token or an authorizer, not both")]
    ConflictingAuthorization,

    /// No outbound API client was supplied.
    #[error("no API client configured")]
    MissingClient,

    /// `start`/`stop` was called on an app built without a receiver.
    #[error("no receiver configured")]
    MissingReceiver,
}

/// Errors raised synchronously at listener registration time.
///
/// A rejected registration never produces a dead listener, and must not
/// prevent other registrations from working.
#[derive(Error, Debug)]
pub enum ConstraintError {
    /// The constraint specified no field recognized for the listener slot.
    #[error("constraint specifies no field recognized for {slot} listeners")]
    Empty {
        /// The slot the registration targeted.
        slot: &'static str,
    },

    /// The constraint specified a field the listener slot does not support.
    #[error("constraint field `{field}` is not supported for {slot} listeners")]
    Unsupported {
        /// The offending constraint field.
        field: &'static str,
        /// The slot the registration targeted.
        slot: &'static str,
    },

    /// A JSON constraint form contained unknown keys or malformed values.
    #[error("invalid constraint object: {0}")]
    Invalid(String),

    /// A pattern field failed to compile.
    #[error("invalid constraint pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Protocol violations detected by the chain driver.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainViolation {
    /// A middleware signaled its continuation more than once.
    #[error("middleware invoked its continuation more than once")]
    MultipleNext,
}

/// Dispatch-time errors, routed to the app's error sink.
///
/// Exactly one `DispatchError` reaches the sink per failing event; the
/// variants are tagged so a handler can discriminate.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Identity resolution failed; no middleware ran for the event.
    #[error("authorization failed")]
    Authorization(#[source] BoxError),

    /// An event was acknowledged more than once.
    #[error("event acknowledged more than once")]
    MultipleAcknowledgement,

    /// A middleware violated the chain protocol.
    #[error("chain protocol violation: {0}")]
    Chain(#[from] ChainViolation),

    /// Any other error raised inside a middleware.
    #[error("unhandled error in middleware")]
    Unhandled(#[source] BoxError),
}

impl DispatchError {
    /// Fold an arbitrary middleware error into the dispatch taxonomy.
    ///
    /// Errors that already are a `DispatchError` (for example a propagated
    /// double-acknowledgment) or a [`ChainViolation`] keep their tag;
    /// everything else becomes [`DispatchError::Unhandled`].
    pub fn from_boxed(error: BoxError) -> Self {
        let error = match error.downcast::<DispatchError>() {
            Ok(tagged) => return *tagged,
            Err(other) => other,
        };
        match error.downcast::<ChainViolation>() {
            Ok(violation) => DispatchError::Chain(*violation),
            Err(other) => DispatchError::Unhandled(other),
        }
    }
}
