//! Keyward Core
//!
//! Core domain types, traits, and error handling for Keyward.
//! This crate has minimal dependencies and defines the shared vocabulary
//! used across all other crates: licenses, products, the lifecycle rules
//! that move a license between states, and the ports the stores implement.

pub mod clock;
pub mod error;
pub mod ids;
pub mod license;
pub mod lifecycle;
pub mod ports;
pub mod product;

pub use error::{Error, Result, ValidationErrors};
pub use ids::*;
