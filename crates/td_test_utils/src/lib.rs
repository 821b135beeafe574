//! # TD Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Map and catalog fixtures
//! - Scripted game, capture and OCR fakes
//! - Decision replay harness for reproducibility checks

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fakes;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
