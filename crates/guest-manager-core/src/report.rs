// ABOUTME: Read-only views over the collection: guest-list filtering, dashboard and per-event counts.
// ABOUTME: Budget totals tolerate stored non-finite values by skipping them.

use serde::Serialize;

use crate::guest::{AccommodationStatus, Guest};
use crate::model::Event;

/// Three-way filter on a logistics `required` flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequirementFilter {
    #[default]
    All,
    Required,
    NotRequired,
}

impl RequirementFilter {
    fn matches(self, required: bool) -> bool {
        match self {
            RequirementFilter::All => true,
            RequirementFilter::Required => required,
            RequirementFilter::NotRequired => !required,
        }
    }
}

/// Guest-list filter. The default matches every guest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestFilter {
    /// Case-insensitive substring of name, designation, or organization.
    pub query: String,
    /// Only guests assigned to this sub-event.
    pub sub_event_id: Option<String>,
    pub transport: RequirementFilter,
    pub accommodation: RequirementFilter,
}

impl GuestFilter {
    pub fn matches(&self, guest: &Guest) -> bool {
        let query = self.query.trim().to_lowercase();
        let matches_search = query.is_empty()
            || [&guest.name, &guest.designation, &guest.organization]
                .iter()
                .any(|field| field.to_lowercase().contains(&query));

        let matches_sub_event = match &self.sub_event_id {
            Some(wanted) => guest.sub_event_id.as_deref() == Some(wanted.as_str()),
            None => true,
        };

        matches_search
            && matches_sub_event
            && self.transport.matches(guest.transport.required)
            && self.accommodation.matches(guest.accommodation.required)
    }
}

/// Guests of `event` that pass `filter`, in list order.
pub fn filter_guests<'a>(event: &'a Event, filter: &GuestFilter) -> Vec<&'a Guest> {
    event.guests.iter().filter(|g| filter.matches(g)).collect()
}

/// Sum of event budgets.
pub fn total_budget(events: &[Event]) -> f64 {
    events
        .iter()
        .map(|e| e.budget)
        .filter(|b| b.is_finite())
        .sum()
}

/// Collection-wide counters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub events: usize,
    pub guests: usize,
    pub transport_required: usize,
    pub accommodation_required: usize,
    pub total_budget: f64,
}

pub fn dashboard_stats(events: &[Event]) -> DashboardStats {
    let guests = || events.iter().flat_map(|e| e.guests.iter());
    DashboardStats {
        events: events.len(),
        guests: guests().count(),
        transport_required: guests().filter(|g| g.transport.required).count(),
        accommodation_required: guests().filter(|g| g.accommodation.required).count(),
        total_budget: total_budget(events),
    }
}

/// Counters for a single event card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub sub_events: usize,
    pub guests: usize,
    pub present: usize,
    pub transport_required: usize,
    pub arrivals_marked: usize,
    pub returns_marked: usize,
    pub accommodation_required: usize,
    pub checked_in: usize,
    pub checked_out: usize,
}

pub fn event_stats(event: &Event) -> EventStats {
    let mut stats = EventStats {
        sub_events: event.sub_events.len(),
        guests: event.guests.len(),
        ..Default::default()
    };
    for guest in &event.guests {
        stats.present += usize::from(guest.attendance);
        if guest.transport.required {
            stats.transport_required += 1;
            stats.arrivals_marked += usize::from(guest.transport.arrival_marked);
            stats.returns_marked += usize::from(guest.transport.return_marked);
        }
        if guest.accommodation.required {
            stats.accommodation_required += 1;
            match guest.accommodation.status {
                AccommodationStatus::CheckedIn => stats.checked_in += 1,
                AccommodationStatus::CheckedOut => stats.checked_out += 1,
                AccommodationStatus::Booked => {}
            }
        }
    }
    stats
}
