//! Command implementations for the `glimpse` binary.

pub mod batch;
pub mod compare;
pub mod config;
pub mod recognize;
pub mod shared;
pub mod types;
