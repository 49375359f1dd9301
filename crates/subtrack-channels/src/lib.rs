//! # subtrack-channels
//!
//! Messaging platform integrations for subtrack.

pub mod telegram;
