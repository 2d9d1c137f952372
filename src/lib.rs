//! WHEELWATCH — roulette column/tier pattern analysis
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod session;
pub mod types;
