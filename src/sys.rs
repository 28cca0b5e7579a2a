//! Host-facing types: geometry and the adapter interface the engine drives.

pub mod driver;
pub mod geometry;
pub mod headless;
