//! Strand Terrain - Heightmap terrain sampling
//!
//! Provides heightmap loading and world-space height/normal sampling behind
//! the `TerrainSampler` trait. The spline ribbon builder snaps vertices with
//! it and the vegetation pager scatters instances on it. Terrain is centred
//! on the world origin: a terrain of size `S` covers `[-S/2, S/2]` on X and Z.

pub mod heightmap;
pub mod sampler;

pub use heightmap::Heightmap;
pub use sampler::{FlatTerrain, TerrainSampler};
