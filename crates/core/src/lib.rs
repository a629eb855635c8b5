//! Domain types and pure rules for the product catalog.
//!
//! This crate performs no I/O so both the repository layer and the HTTP
//! layer can depend on it.

pub mod error;
pub mod listing;
pub mod product;
pub mod types;
