//! Multi-plane mesh interconnect: grid construction, endpoint attachment,
//! port allocation and the final mesh-wide parameter pass.
//!
//! A topology moves through `MeshTopology::build`, any number of `attach`
//! calls, then `finalize`, which consumes it.

pub mod attach;
pub mod connectivity;
pub mod endpoint;
pub mod error;
pub mod finalize;
pub mod mesh;
pub mod params;
pub mod ports;
pub mod types;
pub mod units;

#[cfg(test)]
mod unit_tests;

pub use attach::{AttachOptions, AttachReport, Placement};
pub use connectivity::{Connectivity, ConnectivityMap};
pub use endpoint::{Endpoint, EndpointGroup, Slot};
pub use error::{ConfigurationError, Result};
pub use finalize::{FinalizeOptions, FinalizedMesh};
pub use mesh::{MeshTopology, Router};
pub use params::{HopLatencies, MeshConfig, MeshLayout, PlaneParamSet, PlaneParams};
pub use ports::PortAllocator;
pub use types::{AttachSide, EndpointCategory, HierarchyLevel, Plane, PortName, ReservedCategory, RouterId, Tlb};
pub use units::{Bandwidth, Bytes, Frequency, Latency};
