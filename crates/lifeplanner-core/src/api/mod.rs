//! Async client for the LifePlanner REST backend.
//!
//! The backend is the source of truth for projects and tasks. Everything the
//! entitlement checks need to count comes from here.

mod client;

pub use client::BackendClient;
