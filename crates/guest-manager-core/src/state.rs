// ABOUTME: Defines EventCollection and the Mutation enum that is folded into it.
// ABOUTME: apply() pattern-matches on Mutation and rewrites the ordered collection by id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::{find_by_id, find_by_id_mut, remove_by_id, update_by_id};
use crate::guest::{Guest, GuestPatch};
use crate::model::{Event, EventPatch, SubEvent};

/// Errors raised by mutations that would break a collection invariant.
#[derive(Debug, Error, PartialEq)]
pub enum MutationError {
    #[error("sub-event {sub_event_id} does not belong to event {event_id}")]
    UnknownSubEvent {
        event_id: String,
        sub_event_id: String,
    },

    #[error("guest {guest_id} does not require transport")]
    TransportNotRequired { guest_id: String },
}

/// A single change to the collection. Records carried by the `Add*`
/// variants already have their ids assigned.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddEvent {
        event: Event,
    },
    UpdateEvent {
        id: String,
        patch: EventPatch,
    },
    UpdateBudget {
        id: String,
        amount: f64,
    },
    DeleteEvent {
        id: String,
    },
    AddSubEvent {
        event_id: String,
        sub_event: SubEvent,
    },
    DeleteSubEvent {
        event_id: String,
        sub_event_id: String,
    },
    AddGuest {
        event_id: String,
        guest: Guest,
    },
    UpdateGuest {
        event_id: String,
        guest_id: String,
        patch: GuestPatch,
    },
    DeleteGuest {
        event_id: String,
        guest_id: String,
    },
    ToggleAttendance {
        event_id: String,
        guest_id: String,
    },
    SetTransportRequired {
        event_id: String,
        guest_id: String,
        required: bool,
    },
    ToggleArrival {
        event_id: String,
        guest_id: String,
    },
    ToggleReturn {
        event_id: String,
        guest_id: String,
    },
    SetAccommodationRequired {
        event_id: String,
        guest_id: String,
        required: bool,
    },
    AdvanceAccommodationStatus {
        event_id: String,
        guest_id: String,
    },
    ReplaceAll {
        events: Vec<Event>,
    },
}

impl Mutation {
    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::AddEvent { .. } => "add_event",
            Mutation::UpdateEvent { .. } => "update_event",
            Mutation::UpdateBudget { .. } => "update_budget",
            Mutation::DeleteEvent { .. } => "delete_event",
            Mutation::AddSubEvent { .. } => "add_sub_event",
            Mutation::DeleteSubEvent { .. } => "delete_sub_event",
            Mutation::AddGuest { .. } => "add_guest",
            Mutation::UpdateGuest { .. } => "update_guest",
            Mutation::DeleteGuest { .. } => "delete_guest",
            Mutation::ToggleAttendance { .. } => "toggle_attendance",
            Mutation::SetTransportRequired { .. } => "set_transport_required",
            Mutation::ToggleArrival { .. } => "toggle_arrival",
            Mutation::ToggleReturn { .. } => "toggle_return",
            Mutation::SetAccommodationRequired { .. } => "set_accommodation_required",
            Mutation::AdvanceAccommodationStatus { .. } => "advance_accommodation_status",
            Mutation::ReplaceAll { .. } => "replace_all",
        }
    }
}

/// The ordered collection of events, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCollection {
    events: Vec<Event>,
}

impl EventCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Event> {
        find_by_id(&self.events, id)
    }

    pub fn guest(&self, event_id: &str, guest_id: &str) -> Option<&Guest> {
        self.get(event_id)
            .and_then(|event| find_by_id(&event.guests, guest_id))
    }

    /// Apply one mutation. Returns `Ok(true)` when a record matched and the
    /// collection changed, `Ok(false)` when the addressed id was not found.
    /// On error the collection is left untouched.
    pub fn apply(&mut self, mutation: Mutation) -> Result<bool, MutationError> {
        match mutation {
            Mutation::AddEvent { event } => {
                self.events.push(event);
                Ok(true)
            }

            Mutation::UpdateEvent { id, patch } => {
                Ok(update_by_id(&mut self.events, &id, |event| patch.apply(event)))
            }

            Mutation::UpdateBudget { id, amount } => {
                Ok(update_by_id(&mut self.events, &id, |event| event.budget = amount))
            }

            Mutation::DeleteEvent { id } => Ok(remove_by_id(&mut self.events, &id).is_some()),

            Mutation::AddSubEvent {
                event_id,
                sub_event,
            } => Ok(update_by_id(&mut self.events, &event_id, |event| {
                event.sub_events.push(sub_event)
            })),

            Mutation::DeleteSubEvent {
                event_id,
                sub_event_id,
            } => {
                let Some(event) = find_by_id_mut(&mut self.events, &event_id) else {
                    return Ok(false);
                };
                if remove_by_id(&mut event.sub_events, &sub_event_id).is_none() {
                    return Ok(false);
                }
                let mut moved = 0usize;
                for guest in &mut event.guests {
                    if guest.sub_event_id.as_deref() == Some(sub_event_id.as_str()) {
                        guest.sub_event_id = None;
                        moved += 1;
                    }
                }
                if moved > 0 {
                    tracing::debug!(
                        "moved {} guests of deleted sub-event {} back to the main event",
                        moved,
                        sub_event_id
                    );
                }
                Ok(true)
            }

            Mutation::AddGuest {
                event_id,
                mut guest,
            } => {
                let Some(event) = find_by_id_mut(&mut self.events, &event_id) else {
                    return Ok(false);
                };
                if let Some(target) = guest.sub_event_id.as_deref()
                    && event.sub_event(target).is_none()
                {
                    return Err(MutationError::UnknownSubEvent {
                        event_id,
                        sub_event_id: target.to_string(),
                    });
                }
                guest.event_id = event_id;
                event.guests.push(guest);
                Ok(true)
            }

            Mutation::UpdateGuest {
                event_id,
                guest_id,
                patch,
            } => {
                let Some(event) = find_by_id_mut(&mut self.events, &event_id) else {
                    return Ok(false);
                };
                if find_by_id(&event.guests, &guest_id).is_none() {
                    return Ok(false);
                }
                if let Some(target) = patch.target_sub_event()
                    && event.sub_event(target).is_none()
                {
                    return Err(MutationError::UnknownSubEvent {
                        event_id,
                        sub_event_id: target.to_string(),
                    });
                }
                Ok(update_by_id(&mut event.guests, &guest_id, |guest| {
                    patch.apply(guest)
                }))
            }

            Mutation::DeleteGuest { event_id, guest_id } => {
                let mut removed = false;
                update_by_id(&mut self.events, &event_id, |event| {
                    removed = remove_by_id(&mut event.guests, &guest_id).is_some();
                });
                Ok(removed)
            }

            Mutation::ToggleAttendance { event_id, guest_id } => {
                Ok(self.update_guest(&event_id, &guest_id, |g| g.attendance = !g.attendance))
            }

            Mutation::SetTransportRequired {
                event_id,
                guest_id,
                required,
            } => Ok(self.update_guest(&event_id, &guest_id, |g| {
                g.transport.set_required(required)
            })),

            Mutation::ToggleArrival { event_id, guest_id } => {
                self.ensure_transport_required(&event_id, &guest_id)?;
                Ok(self.update_guest(&event_id, &guest_id, |g| {
                    g.transport.toggle_arrival();
                }))
            }

            Mutation::ToggleReturn { event_id, guest_id } => {
                self.ensure_transport_required(&event_id, &guest_id)?;
                Ok(self.update_guest(&event_id, &guest_id, |g| {
                    g.transport.toggle_return();
                }))
            }

            Mutation::SetAccommodationRequired {
                event_id,
                guest_id,
                required,
            } => Ok(self.update_guest(&event_id, &guest_id, |g| {
                g.accommodation.set_required(required)
            })),

            Mutation::AdvanceAccommodationStatus { event_id, guest_id } => {
                Ok(self.update_guest(&event_id, &guest_id, |g| {
                    g.accommodation.advance_status();
                }))
            }

            Mutation::ReplaceAll { events } => {
                self.events = events;
                Ok(true)
            }
        }
    }

    /// Arrival and return marks only exist on guests that need transport.
    /// A missing guest passes so the caller reports a plain miss.
    fn ensure_transport_required(&self, event_id: &str, guest_id: &str) -> Result<(), MutationError> {
        match self.guest(event_id, guest_id) {
            Some(guest) if !guest.transport.required => Err(MutationError::TransportNotRequired {
                guest_id: guest_id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn update_guest(&mut self, event_id: &str, guest_id: &str, f: impl FnOnce(&mut Guest)) -> bool {
        let mut hit = false;
        update_by_id(&mut self.events, event_id, |event| {
            hit = update_by_id(&mut event.guests, guest_id, f);
        });
        hit
    }
}
