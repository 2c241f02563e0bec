//! Persistent storage for the dock host.

pub mod config;
