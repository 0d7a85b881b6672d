//! # Severa Store
//!
//! Per-user embedded keyed table store.
//!
//! This crate provides:
//! - `Store`, a handle over the seven typed tables of one user's data
//! - Auto-keyed inserts, synced-flag scans, and targeted updates
//! - `Store::transaction` for atomic multi-table writes
//!
//! One store instance exists per user identity; switching users closes the
//! handle and opens a different store. The handle is passed explicitly into
//! the sync engines; there is no module-level store.
//!
//! The in-memory backend here plays the role the physical storage engine
//! plays in production: a generic keyed table store with indexed scans and
//! bulk upsert.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod store;
mod txn;

pub use error::{StoreError, StoreResult};
pub use store::Store;
pub use txn::Txn;
