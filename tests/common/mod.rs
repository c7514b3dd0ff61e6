//! Common test utilities for all integration tests.
//!
//! Provides in-memory store fakes with TTL bookkeeping and failure
//! injection.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod stores;
