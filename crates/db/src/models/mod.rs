//! Row models and DTOs.

pub mod product;
pub mod user;
