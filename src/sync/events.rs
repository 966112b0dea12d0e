//! Inbound glasses events: classify, then resolve a click to a row.

use hubwire::{HubEvent, OsEventType};

use crate::layout::{self, MAX_ROWS};
use crate::model::CartList;

use super::SyncOutcome;

/// How an event's type resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Click,
    /// No type on any part of the event. Older firmware omits the zero
    /// value, so this is treated as a click.
    Unspecified,
    Other(OsEventType),
}

impl InputKind {
    #[must_use]
    pub fn of(event: &HubEvent) -> Self {
        match event.event_type() {
            None => Self::Unspecified,
            Some(OsEventType::Click) => Self::Click,
            Some(other) => Self::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Startup has not finished.
    NotLive,
    EmptyList,
    NotAClick(OsEventType),
    /// Click carried no list part, so there is no row to map it to.
    NoListEvent,
    /// Resolved index was negative or past the end of the list.
    NoSuchItem(i64),
}

#[derive(Debug)]
pub enum EventOutcome {
    Ignored(IgnoreReason),
    Toggled { index: usize, outcome: SyncOutcome },
}

impl EventOutcome {
    #[must_use]
    pub fn toggled_index(&self) -> Option<usize> {
        match self {
            Self::Toggled { index, .. } => Some(*index),
            Self::Ignored(_) => None,
        }
    }
}

/// Map a click to the index of the row it selected.
///
/// The explicit index wins. Without one, the selected row label is matched
/// against the visible rows; the first match is taken, and no match falls
/// back to row 0.
///
/// # Errors
///
/// The reason the event does not toggle anything.
pub fn resolve_click(event: &HubEvent, list: &CartList) -> Result<usize, IgnoreReason> {
    if list.is_empty() {
        return Err(IgnoreReason::EmptyList);
    }
    if let InputKind::Other(kind) = InputKind::of(event) {
        return Err(IgnoreReason::NotAClick(kind));
    }
    let Some(list_event) = &event.list_event else {
        return Err(IgnoreReason::NoListEvent);
    };

    let index = list_event.current_select_item_index.unwrap_or_else(|| {
        let name = list_event.current_select_item_name.as_deref();
        list.items()
            .iter()
            .take(MAX_ROWS)
            .position(|item| name == Some(layout::row_label(item).as_str()))
            .map_or(0, |pos| i64::try_from(pos).unwrap_or(0))
    });

    usize::try_from(index)
        .ok()
        .filter(|i| *i < list.len())
        .ok_or(IgnoreReason::NoSuchItem(index))
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
