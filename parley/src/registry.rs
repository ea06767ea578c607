//! Listener registrations and per-event selection.
//!
//! Every listener is registered under a slot (the kind of listener the
//! registration API created) with a [`Constraint`]. Selection for a
//! dispatched event filters by slot first and constraint second, so kind
//! discrimination is structural: an action listener is never even a
//! candidate for an options request, whatever its constraint says.
//!
//! Constraints are validated here, at registration time. A constraint with
//! no field the slot recognizes, or with a field foreign to the slot, is
//! rejected with a [`ConstraintError`]; other registrations are unaffected.

use crate::context::Context;
use bitflags::bitflags;
use parley_core::{Constraint, ConstraintError, EventKind, Middleware};
use serde_json::Value;
use std::sync::Arc;

bitflags! {
    /// Listener kinds, used both for registrations and as per-event masks.
    ///
    /// A message event carries `EVENT | MESSAGE`, since message listeners
    /// are event listeners with a fixed `event.type`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ListenerSlot: u8 {
        /// Subscription event listeners.
        const EVENT = 1;
        /// Message listeners (`event.type == "message"`).
        const MESSAGE = 1 << 1;
        /// Slash command listeners.
        const COMMAND = 1 << 2;
        /// Interactive action listeners.
        const ACTION = 1 << 3;
        /// Options (suggestion) listeners.
        const OPTIONS = 1 << 4;
        /// Modal view listeners.
        const VIEW = 1 << 5;
    }
}

impl ListenerSlot {
    /// The slot mask a classified event can be matched by.
    ///
    /// [`EventKind::Unknown`] maps to the empty mask: unknown events are
    /// never candidates for any listener.
    pub fn for_kind(kind: &EventKind) -> ListenerSlot {
        match kind {
            EventKind::Event { .. } if kind.is_message() => {
                ListenerSlot::EVENT | ListenerSlot::MESSAGE
            }
            EventKind::Event { .. } => ListenerSlot::EVENT,
            EventKind::Command { .. } => ListenerSlot::COMMAND,
            EventKind::Action(_) => ListenerSlot::ACTION,
            EventKind::Options(_) => ListenerSlot::OPTIONS,
            EventKind::ViewSubmission { .. } | EventKind::ViewClosed { .. } => ListenerSlot::VIEW,
            EventKind::Unknown => ListenerSlot::empty(),
        }
    }

    fn label(self) -> &'static str {
        if self == ListenerSlot::EVENT {
            "event"
        } else if self == ListenerSlot::MESSAGE {
            "message"
        } else if self == ListenerSlot::COMMAND {
            "command"
        } else if self == ListenerSlot::ACTION {
            "action"
        } else if self == ListenerSlot::OPTIONS {
            "options"
        } else if self == ListenerSlot::VIEW {
            "view"
        } else {
            "listener"
        }
    }

    /// Constraint fields this slot recognizes.
    fn recognized_fields(self) -> &'static [&'static str] {
        if self == ListenerSlot::EVENT || self == ListenerSlot::MESSAGE {
            &["event_type", "message_pattern"]
        } else if self == ListenerSlot::COMMAND {
            &["command"]
        } else if self == ListenerSlot::ACTION {
            &["action_id", "callback_id", "block_id", "action_type"]
        } else if self == ListenerSlot::OPTIONS {
            &["action_id", "callback_id", "options_source"]
        } else if self == ListenerSlot::VIEW {
            &["view_callback_id", "view_kind"]
        } else {
            &[]
        }
    }
}

/// One registered listener: a slot, a constraint, and its middleware.
pub(crate) struct Registration {
    slot: ListenerSlot,
    constraint: Constraint,
    chain: Vec<Arc<dyn Middleware<Context>>>,
}

/// Ordered listener registrations for one app.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Validate and append a registration.
    pub(crate) fn register(
        &mut self,
        slot: ListenerSlot,
        constraint: Constraint,
        chain: Vec<Arc<dyn Middleware<Context>>>,
    ) -> Result<(), ConstraintError> {
        validate(slot, &constraint)?;
        self.entries.push(Registration {
            slot,
            constraint,
            chain,
        });
        Ok(())
    }

    /// Number of accepted registrations.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Middleware of every registration matching the classified event, in
    /// registration order.
    pub(crate) fn select(
        &self,
        kind: &EventKind,
        body: &Value,
    ) -> Vec<Arc<dyn Middleware<Context>>> {
        let mask = ListenerSlot::for_kind(kind);
        self.entries
            .iter()
            .filter(|entry| entry.slot.intersects(mask))
            .filter(|entry| entry.constraint.matches(kind, body))
            .flat_map(|entry| entry.chain.iter().cloned())
            .collect()
    }
}

fn validate(slot: ListenerSlot, constraint: &Constraint) -> Result<(), ConstraintError> {
    let recognized = slot.recognized_fields();
    let specified = constraint.specified_fields();

    if let Some(field) = specified.iter().find(|field| !recognized.contains(field)) {
        return Err(ConstraintError::Unsupported {
            field,
            slot: slot.label(),
        });
    }
    if specified.is_empty() {
        return Err(ConstraintError::Empty { slot: slot.label() });
    }
    Ok(())
}
