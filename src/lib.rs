//! Shopping-cart state sync between a phone and a pair of smart glasses.
//!
//! The phone owns the list; the glasses render it and report clicks back.
//! [`sync::SyncEngine`] is the only writer, [`layout`] turns a list into a
//! device page, and [`bridge`] abstracts the host SDK.

pub mod bridge;
pub mod config;
pub mod console;
pub mod error;
pub mod layout;
pub mod model;
pub mod splash;
pub mod store;
pub mod sync;
