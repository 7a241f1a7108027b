//! Incident Coordinator Library
//!
//! This library provides the core functionality for the incident
//! coordinator, including the coordination engine, domain types, profile and
//! enhancement adapters, and the HTTP surface.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
