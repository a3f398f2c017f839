//! Numeric helpers.

pub mod statistics;
