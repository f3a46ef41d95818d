//! Integration tests for ratewatch-tracker.
//!
//! These tests verify the interaction between components:
//! - Update protocol against the shared cache and a record store
//! - Worker supervision with scripted ticker responses

pub mod common;
