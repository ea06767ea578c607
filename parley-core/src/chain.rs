//! The middleware chain driver.
//!
//! A [`Chain`] is an ordered list of middleware executed by a single driver
//! loop: the driver awaits each middleware's completion, inspects its
//! [`Next`] latch, and only then decides whether to advance. Control flow is
//! therefore an explicit state machine rather than nested continuations:
//!
//! ```text
//! Pending --run--> Running --+--> Completed   (every link proceeded, or one
//!                            |                 stopped the chain cleanly)
//!                            +--> Failed      (a link errored or violated
//!                                              the proceed protocol)
//! ```
//!
//! Ordering is strict: middleware run in the order they were added, one at a
//! time, and no middleware is ever re-entered. Chains for different events
//! are independent and may interleave at await points; nothing here is
//! shared across events.

use crate::error::{BoxError, ChainViolation, DispatchError};
use crate::middleware::{Middleware, Next};
use std::sync::Arc;

/// Observable driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Constructed, not yet run.
    Pending,
    /// The driver loop is executing middleware.
    Running,
    /// The chain resolved without error.
    Completed,
    /// A middleware errored or violated the protocol; the sink was owed
    /// exactly one error.
    Failed,
}

/// How a finished chain resolved.
#[derive(Debug)]
pub enum ChainOutcome {
    /// All applicable middleware ran.
    ///
    /// `stopped` is true when a middleware finished without proceeding,
    /// ending the chain before the last link.
    Completed {
        /// Number of middleware that ran.
        ran: usize,
        /// Whether a middleware stopped the chain early.
        stopped: bool,
    },
    /// A middleware failed; remaining links never ran.
    Failed {
        /// Number of middleware that ran, including the failing one.
        ran: usize,
        /// The dispatch-tagged error owed to the sink.
        error: DispatchError,
    },
}

impl ChainOutcome {
    /// The terminal state this outcome corresponds to.
    pub fn state(&self) -> ChainState {
        match self {
            ChainOutcome::Completed { .. } => ChainState::Completed,
            ChainOutcome::Failed { .. } => ChainState::Failed,
        }
    }
}

/// An ordered middleware chain for one event.
///
/// Built per dispatch from `[global middleware.., matched listener
/// middleware..]` and discarded once run.
pub struct Chain<C> {
    links: Vec<Arc<dyn Middleware<C>>>,
    state: ChainState,
}

impl<C: Clone + Send + 'static> Chain<C> {
    /// Build a chain from an ordered middleware list. State starts Pending.
    pub fn new(links: Vec<Arc<dyn Middleware<C>>>) -> Self {
        Self {
            links,
            state: ChainState::Pending,
        }
    }

    /// Current driver state.
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Number of links in the chain.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Drive the chain to completion over the given context.
    ///
    /// Each link runs at most once, strictly in order. The driver advances
    /// only after the current link resolves `Ok` with exactly one proceed
    /// signal; zero signals complete the chain early, more than one fail it
    /// with [`ChainViolation::MultipleNext`] even if the link swallowed the
    /// error returned by its own second `proceed` call.
    pub async fn run(mut self, ctx: C) -> ChainOutcome {
        self.state = ChainState::Running;
        let total = self.links.len();

        for (index, link) in self.links.iter().enumerate() {
            let next = Next::new();
            let result: Result<(), BoxError> = link.handle(ctx.clone(), next.clone()).await;

            if let Err(error) = result {
                self.state = ChainState::Failed;
                return ChainOutcome::Failed {
                    ran: index + 1,
                    error: DispatchError::from_boxed(error),
                };
            }

            match next.signal_count() {
                0 => {
                    self.state = ChainState::Completed;
                    return ChainOutcome::Completed {
                        ran: index + 1,
                        stopped: index + 1 < total,
                    };
                }
                1 => continue,
                _ => {
                    self.state = ChainState::Failed;
                    return ChainOutcome::Failed {
                        ran: index + 1,
                        error: DispatchError::Chain(ChainViolation::MultipleNext),
                    };
                }
            }
        }

        self.state = ChainState::Completed;
        ChainOutcome::Completed {
            ran: total,
            stopped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use futures::executor::block_on;
    use std::sync::Mutex;

    type Ctx = Arc<Mutex<Vec<&'static str>>>;

    fn recording(label: &'static str, proceed: bool) -> Arc<dyn Middleware<Ctx>> {
        Arc::new(move |ctx: Ctx, next: Next| async move {
            ctx.lock().unwrap().push(label);
            if proceed {
                next.proceed()?;
            }
            Ok::<(), BoxError>(())
        })
    }

    #[test]
    fn empty_chain_completes() {
        let chain: Chain<Ctx> = Chain::new(Vec::new());
        assert_eq!(chain.state(), ChainState::Pending);
        let outcome = block_on(chain.run(Arc::new(Mutex::new(Vec::new()))));
        assert!(matches!(
            outcome,
            ChainOutcome::Completed {
                ran: 0,
                stopped: false
            }
        ));
    }

    #[test]
    fn links_run_in_order() {
        let order: Ctx = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(vec![
            recording("a", true),
            recording("b", true),
            recording("c", true),
        ]);
        let outcome = block_on(chain.run(order.clone()));
        assert_eq!(outcome.state(), ChainState::Completed);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn not_proceeding_stops_the_chain() {
        let order: Ctx = Arc::new(Mutex::new(Vec::new()));
        let chain = Chain::new(vec![
            recording("a", true),
            recording("b", false),
            recording("c", true),
        ]);
        let outcome = block_on(chain.run(order.clone()));
        assert!(matches!(
            outcome,
            ChainOutcome::Completed {
                ran: 2,
                stopped: true
            }
        ));
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn errors_halt_and_tag() {
        let order: Ctx = Arc::new(Mutex::new(Vec::new()));
        let failing: Arc<dyn Middleware<Ctx>> = Arc::new(|_ctx: Ctx, _next: Next| async {
            Err::<(), BoxError>("boom".into())
        });
        let chain = Chain::new(vec![recording("a", true), failing, recording("c", true)]);
        let outcome = block_on(chain.run(order.clone()));
        match outcome {
            ChainOutcome::Failed { ran, error } => {
                assert_eq!(ran, 2);
                assert!(matches!(error, DispatchError::Unhandled(_)));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(*order.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn double_proceed_fails_even_when_swallowed() {
        let greedy: Arc<dyn Middleware<Ctx>> = Arc::new(|_ctx: Ctx, next: Next| async move {
            next.proceed()?;
            // Swallow the violation; the driver still notices.
            let _ = next.proceed();
            Ok::<(), BoxError>(())
        });
        let chain = Chain::new(vec![greedy, recording("after", true)]);
        let outcome = block_on(chain.run(Arc::new(Mutex::new(Vec::new()))));
        match outcome {
            ChainOutcome::Failed { error, .. } => {
                assert!(matches!(
                    error,
                    DispatchError::Chain(ChainViolation::MultipleNext)
                ));
            }
            other => panic!("expected protocol failure, got {other:?}"),
        }
    }

    #[test]
    fn propagated_double_proceed_keeps_its_tag() {
        let strict: Arc<dyn Middleware<Ctx>> = Arc::new(|_ctx: Ctx, next: Next| async move {
            next.proceed()?;
            next.proceed()?; // propagates ChainViolation
            Ok::<(), BoxError>(())
        });
        let chain = Chain::new(vec![strict]);
        let outcome = block_on(chain.run(Arc::new(Mutex::new(Vec::new()))));
        match outcome {
            ChainOutcome::Failed { error, .. } => {
                assert!(matches!(
                    error,
                    DispatchError::Chain(ChainViolation::MultipleNext)
                ));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
