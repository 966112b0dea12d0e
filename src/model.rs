//! Cart list model: ordered items and their pure mutations.
//!
//! DESIGN
//! ======
//! `CartList` is an immutable value from the caller's point of view: every
//! operation returns a new list and leaves the receiver untouched. The sync
//! engine swaps the authoritative list wholesale after each mutation, so no
//! caller ever observes a half-applied change.
//!
//! Ids come from `IdAllocator`, which is wall-clock based but strictly
//! increasing within a session and seeded past every id already in the list.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Stable identity of a cart item. Never reused within a list's lifetime.
pub type ItemId = i64;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("duplicate item id: {0}")]
    DuplicateId(ItemId),
    #[error("reorder is not a permutation of the current ids ({expected} items, got {got})")]
    NotAPermutation { expected: usize, got: usize },
    #[error("index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A single grocery entry. Mirrors the persisted `{id, name, done}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    pub name: String,
    pub done: bool,
}

/// Ordered cart items. Order is user-visible and persisted.
///
/// Deserialization rejects duplicate ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct CartList {
    items: Vec<CartItem>,
}

impl TryFrom<Vec<CartItem>> for CartList {
    type Error = ModelError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(ModelError::DuplicateId(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<CartList> for Vec<CartItem> {
    fn from(list: CartList) -> Self {
        list.items
    }
}

// =============================================================================
// READS
// =============================================================================

impl CartList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CartItem> {
        self.items.get(index)
    }

    #[must_use]
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    #[must_use]
    pub fn done_count(&self) -> usize {
        self.items.iter().filter(|item| item.done).count()
    }

    #[must_use]
    pub fn has_completed(&self) -> bool {
        self.items.iter().any(|item| item.done)
    }

    #[must_use]
    pub fn max_id(&self) -> Option<ItemId> {
        self.items.iter().map(|item| item.id).max()
    }

    /// Progress line shown on the phone, e.g. `"1 / 2 items collected"`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} / {} items collected", self.done_count(), self.len())
    }
}

// =============================================================================
// MUTATIONS
// =============================================================================

impl CartList {
    /// Append a new unchecked item. A blank name leaves the list unchanged.
    #[must_use]
    pub fn add(&self, name: &str, ids: &mut IdAllocator) -> Self {
        let name = name.trim();
        if name.is_empty() {
            return self.clone();
        }
        let mut items = self.items.clone();
        items.push(CartItem { id: ids.next_id(), name: name.to_owned(), done: false });
        Self { items }
    }

    #[must_use]
    pub fn remove(&self, id: ItemId) -> Self {
        let items = self.items.iter().filter(|item| item.id != id).cloned().collect();
        Self { items }
    }

    #[must_use]
    pub fn toggle(&self, id: ItemId) -> Self {
        let items = self
            .items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                if item.id == id {
                    item.done = !item.done;
                }
                item
            })
            .collect();
        Self { items }
    }

    /// Toggle by position, as reported by the glasses. `None` if out of range.
    #[must_use]
    pub fn toggle_at(&self, index: usize) -> Option<Self> {
        let id = self.items.get(index)?.id;
        Some(self.toggle(id))
    }

    #[must_use]
    pub fn clear_completed(&self) -> Self {
        let items = self.items.iter().filter(|item| !item.done).cloned().collect();
        Self { items }
    }

    /// Replace the order wholesale.
    ///
    /// # Errors
    ///
    /// Returns `NotAPermutation` unless `order` names every current id
    /// exactly once and nothing else.
    pub fn reorder(&self, order: &[ItemId]) -> Result<Self, ModelError> {
        let not_a_permutation = || ModelError::NotAPermutation { expected: self.items.len(), got: order.len() };
        if order.len() != self.items.len() {
            return Err(not_a_permutation());
        }

        let mut seen = HashSet::with_capacity(order.len());
        let mut items = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(not_a_permutation());
            }
            let item = self.items.iter().find(|item| item.id == *id).ok_or_else(not_a_permutation)?;
            items.push(item.clone());
        }
        Ok(Self { items })
    }

    /// Move the item at `from` so it lands at `to`, shifting the rest.
    ///
    /// # Errors
    ///
    /// Returns `IndexOutOfRange` if either index is past the end.
    pub fn move_item(&self, from: usize, to: usize) -> Result<Self, ModelError> {
        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(ModelError::IndexOutOfRange { index, len });
            }
        }
        let mut order: Vec<ItemId> = self.items.iter().map(|item| item.id).collect();
        let id = order.remove(from);
        order.insert(to, id);
        self.reorder(&order)
    }
}

// =============================================================================
// ID ALLOCATION
// =============================================================================

/// Hands out strictly increasing item ids derived from the wall clock.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    last: ItemId,
    clock: fn() -> ItemId,
}

/// Current time as milliseconds since Unix epoch.
fn now_ms() -> ItemId {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    ItemId::try_from(dur.as_millis()).unwrap_or(ItemId::MAX)
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(now_ms)
    }

    /// Allocator driven by a custom clock. Used by tests to freeze time.
    #[must_use]
    pub fn with_clock(clock: fn() -> ItemId) -> Self {
        Self { last: 0, clock }
    }

    /// Ensure future ids sort after every id already present in `list`.
    pub fn observe(&mut self, list: &CartList) {
        if let Some(max) = list.max_id() {
            self.last = self.last.max(max);
        }
    }

    pub fn next_id(&mut self) -> ItemId {
        let id = (self.clock)().max(self.last.saturating_add(1));
        self.last = id;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
