//! Authentication primitives.
//!
//! - [`jwt`] -- access-token validation (and generation for operators and tests).

pub mod jwt;
