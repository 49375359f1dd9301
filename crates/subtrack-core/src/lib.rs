//! # subtrack-core
//!
//! Core types, traits, configuration, and error handling for subtrack.

pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod message;
pub mod model;
pub mod parse;
pub mod session;
pub mod traits;

pub use config::shellexpand;
