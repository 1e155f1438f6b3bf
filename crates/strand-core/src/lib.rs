//! Strand Core - Foundational types for the Strand terrain toolkit
//!
//! This crate provides the core types that all other Strand crates depend on:
//! - `EntityId` - Stable identifiers for spline and vegetation components
//! - `Vec3` - Spatial vector type used by the spline and terrain math
//! - Catmull-Rom interpolation
//! - Error types and Result alias

mod error;
mod id;
pub mod spline;
mod types;

pub use error::{Result, StrandError};
pub use id::EntityId;
pub use types::Vec3;
