//! Core library for the cleaning-operations back office: the pricing and
//! commission engine plus the estimate workflow built around it.

pub mod config;
pub mod error;
pub mod pricing;
pub mod telemetry;
