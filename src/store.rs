//! Cart persistence over the host key/value storage.
//!
//! The whole list lives under one key as a JSON array of
//! `{id, name, done}` objects. A missing or empty value is an empty cart.

use crate::bridge::Storage;
use crate::error::SyncError;
use crate::model::CartList;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart_items";

/// Load the persisted cart.
///
/// # Errors
///
/// `PersistFailure` if storage cannot be read, `ParseFailure` if the stored
/// JSON is corrupt or repeats an id.
pub async fn load_list(storage: &dyn Storage) -> Result<CartList, SyncError> {
    let Some(raw) = storage.get_local_storage(CART_KEY).await? else {
        return Ok(CartList::new());
    };
    if raw.trim().is_empty() {
        return Ok(CartList::new());
    }
    serde_json::from_str(&raw).map_err(SyncError::ParseFailure)
}

/// Persist the full cart, replacing whatever was stored.
///
/// # Errors
///
/// `PersistFailure` if encoding or the storage write fails.
pub async fn save_list(storage: &dyn Storage, list: &CartList) -> Result<(), SyncError> {
    let json = serde_json::to_string(list).map_err(|e| SyncError::PersistFailure(e.to_string()))?;
    storage.set_local_storage(CART_KEY, &json).await?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
