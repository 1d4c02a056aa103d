// ABOUTME: Renders a single Event as a Markdown run sheet.
// ABOUTME: Header and counts, sub-events in list order, then one section per guest with logistics.

use std::fmt::Write;

use crate::datetime::format_local;
use crate::guest::Guest;
use crate::model::Event;
use crate::report::event_stats;

fn or_unset(value: Option<String>) -> String {
    value.unwrap_or_else(|| "Not set".to_string())
}

/// Render an Event as Markdown. Sub-events and guests keep their stored order.
pub fn export_event_markdown(event: &Event) -> String {
    let mut out = String::new();
    let stats = event_stats(event);

    writeln!(out, "# {}", event.name).unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "> {} · {} · {} day(s)",
        event.category,
        event.date.format("%Y-%m-%d"),
        event.duration
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(out, "- Budget: {:.2}", event.budget).unwrap();
    writeln!(out, "- Guests: {} ({} present)", stats.guests, stats.present).unwrap();
    writeln!(
        out,
        "- Transport: {} required, {} arrived, {} returned",
        stats.transport_required, stats.arrivals_marked, stats.returns_marked
    )
    .unwrap();
    writeln!(
        out,
        "- Accommodation: {} required, {} checked in, {} checked out",
        stats.accommodation_required, stats.checked_in, stats.checked_out
    )
    .unwrap();

    if !event.sub_events.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "## Sub-Events").unwrap();
        writeln!(out).unwrap();
        for se in &event.sub_events {
            writeln!(out, "- {} ({})", se.name, format_local(&se.date)).unwrap();
        }
    }

    if !event.guests.is_empty() {
        writeln!(out).unwrap();
        writeln!(out, "## Guests").unwrap();
        for guest in &event.guests {
            writeln!(out).unwrap();
            write_guest(&mut out, event, guest);
        }
    }

    out
}

fn write_guest(out: &mut String, event: &Event, guest: &Guest) {
    writeln!(
        out,
        "### {} ({}, {})",
        guest.name, guest.designation, guest.organization
    )
    .unwrap();
    writeln!(out).unwrap();
    writeln!(
        out,
        "- Session: {}",
        event.session_name(guest.sub_event_id.as_deref())
    )
    .unwrap();
    if let Some(ref contact) = guest.contact {
        writeln!(out, "- Contact: {}", contact).unwrap();
    }
    writeln!(
        out,
        "- Attendance: {}",
        if guest.attendance { "Present" } else { "Absent" }
    )
    .unwrap();

    let t = &guest.transport;
    if t.required {
        writeln!(
            out,
            "- Transport: {} → {}, arrival {}{}, return {}{}",
            t.pickup_location,
            t.drop_location,
            or_unset(t.arrival_time.as_ref().map(format_local)),
            if t.arrival_marked { " ✓" } else { "" },
            or_unset(t.return_time.as_ref().map(format_local)),
            if t.return_marked { " ✓" } else { "" },
        )
        .unwrap();
    }

    let a = &guest.accommodation;
    if a.required {
        writeln!(
            out,
            "- Accommodation: {} ({}), check-in {}, check-out {}",
            a.name,
            a.status,
            or_unset(a.check_in.as_ref().map(format_local)),
            or_unset(a.check_out.as_ref().map(format_local)),
        )
        .unwrap();
    }
}
