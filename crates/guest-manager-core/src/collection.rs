// ABOUTME: Generic by-id lookup, update, and removal over ordered record sequences.
// ABOUTME: Every nesting level (events, sub-events, guests) goes through these helpers.

use crate::guest::Guest;
use crate::model::{Event, SubEvent};

/// A record addressed by an opaque string identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Event {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for SubEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Guest {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}

pub fn find_by_id_mut<'a, T: Identified>(items: &'a mut [T], id: &str) -> Option<&'a mut T> {
    items.iter_mut().find(|item| item.id() == id)
}

/// Run `f` on the element with the given id. Returns `false` (and does
/// nothing) when no element matches.
pub fn update_by_id<T: Identified>(items: &mut [T], id: &str, f: impl FnOnce(&mut T)) -> bool {
    match find_by_id_mut(items, id) {
        Some(item) => {
            f(item);
            true
        }
        None => false,
    }
}

/// Remove the element with the given id, preserving the order of the rest.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> Option<T> {
    let index = items.iter().position(|item| item.id() == id)?;
    Some(items.remove(index))
}
