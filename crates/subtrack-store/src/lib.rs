//! # subtrack-store
//!
//! Persistent storage for subtrack (SQLite-backed).

pub mod store;

pub use store::Store;
