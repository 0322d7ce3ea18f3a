use log::info;
use serde::Deserialize;

use crate::engine::{Engine, NodeHandle};
use crate::params;

use super::error::{ConfigurationError, Result};
use super::mesh::{MeshTopology, Router};
use super::params::MeshLayout;
use super::types::{HierarchyLevel, Plane, ReservedCategory, RouterId};

/// Order in which reserved categories are stacked above the highest observed
/// hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<ReservedCategory>")]
pub struct FinalizeOptions {
    reserved_order: [ReservedCategory; 2],
}

impl Default for FinalizeOptions {
    fn default() -> Self {
        Self {
            reserved_order: [ReservedCategory::Directory, ReservedCategory::Memory],
        }
    }
}

impl FinalizeOptions {
    pub fn new(reserved_order: [ReservedCategory; 2]) -> Result<Self> {
        if reserved_order[0] == reserved_order[1] {
            return Err(ConfigurationError::invalid(
                "reserved level order",
                "directory and memory, each exactly once",
                format!("{}, {}", reserved_order[0], reserved_order[1]),
            ));
        }
        Ok(Self { reserved_order })
    }

    pub fn reserved_order(&self) -> &[ReservedCategory; 2] {
        &self.reserved_order
    }
}

impl TryFrom<Vec<ReservedCategory>> for FinalizeOptions {
    type Error = ConfigurationError;

    fn try_from(order: Vec<ReservedCategory>) -> Result<Self> {
        match order.as_slice() {
            [first, second] => Self::new([*first, *second]),
            _ => Err(ConfigurationError::invalid(
                "reserved level order",
                "directory and memory, each exactly once",
                format!("{} entries", order.len()),
            )),
        }
    }
}

/// A mesh after its one finalization pass. Nothing more can be attached.
#[derive(Debug)]
pub struct FinalizedMesh {
    layout: MeshLayout,
    routers: Vec<Router>,
    used_ports: Vec<u32>,
    max_ports: u32,
    max_level: HierarchyLevel,
    reserved_levels: Vec<(ReservedCategory, HierarchyLevel)>,
}

impl FinalizedMesh {
    pub fn layout(&self) -> &MeshLayout {
        &self.layout
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn used_ports(&self, router: RouterId) -> u32 {
        self.used_ports[router]
    }

    /// Port capacity configured on every router of every plane.
    pub fn max_ports(&self) -> u32 {
        self.max_ports
    }

    /// Highest level in use, including reserved levels handed out.
    pub fn max_level(&self) -> HierarchyLevel {
        self.max_level
    }

    pub fn reserved_level(&self, category: ReservedCategory) -> Option<HierarchyLevel> {
        self.reserved_levels
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, level)| *level)
    }
}

impl MeshTopology {
    /// Apply the mesh-wide port capacity and hand out reserved levels.
    pub fn finalize<E: Engine + ?Sized>(self, engine: &mut E, options: &FinalizeOptions) -> FinalizedMesh {
        let max_ports = self.ports.max_used();
        for router in &self.routers {
            for plane in Plane::ALL {
                engine.set_parameters(router.node(plane), params! { "local_ports" => max_ports });
            }
        }

        let mut max_level = self
            .routers
            .iter()
            .flat_map(|router| router.levels().iter().copied())
            .max()
            .unwrap_or(0);

        let mut reserved_levels = Vec::new();
        for category in options.reserved_order {
            let nics: Vec<NodeHandle> = self
                .reserved_nics
                .iter()
                .filter(|(c, _)| *c == category)
                .map(|(_, nic)| *nic)
                .collect();
            if nics.is_empty() {
                continue;
            }
            max_level += 1;
            for nic in nics {
                engine.set_parameters(nic, params! { "group" => max_level });
            }
            reserved_levels.push((category, max_level));
        }

        info!(
            "{}: finalized with {max_ports} local ports per router, max level {max_level}",
            self.layout.prefix
        );

        let used_ports = (0..self.ports.routers()).map(|r| self.ports.used(r)).collect();
        FinalizedMesh {
            layout: self.layout,
            routers: self.routers,
            used_ports,
            max_ports,
            max_level,
            reserved_levels,
        }
    }
}
