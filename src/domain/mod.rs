//! Core domain types and logic.

pub mod error;
pub mod filter;
pub mod forecast;
pub mod pipeline;
pub mod series;
