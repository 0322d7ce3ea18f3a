//! Builders for the leaf components that get attached to a mesh: cache
//! levels, directories, memories and core complexes. Each one creates its
//! engine nodes up front and hands out an `EndpointGroup` for attachment.
//! Links that bypass the mesh (core to L1, L1 to L2 over a bus) are made here.

pub mod bus;
pub mod cache;
pub mod cores;
pub mod memory;


pub use bus::Bus;
pub use cache::{CacheLevel, ReplacementPolicy};
pub use cores::{CoreComplex, CoreComplexConfig, Isa};
pub use memory::{Directories, DramPreset, InterleavedMemory};
