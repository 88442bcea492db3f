//! Integration test utilities for the relay gateway
//!
//! This crate provides helpers for running an end-to-end gateway server
//! and driving it over a real WebSocket client.

pub mod helpers;

pub use helpers::*;
