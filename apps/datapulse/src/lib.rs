//! # datapulse (library surface)
//!
//! Exposes the API, CLI, and configuration modules so integration tests
//! can build routers without starting a real process.

pub mod api;
pub mod cli;
pub mod config;
