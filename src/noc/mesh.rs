use log::{debug, info};
use smallvec::SmallVec;

use crate::engine::{Engine, LinkEnd, NodeHandle};

use super::error::{ConfigurationError, Result};
use super::params::MeshLayout;
use super::ports::PortAllocator;
use super::types::{HierarchyLevel, Plane, PortName, ReservedCategory, RouterId};

pub const ROUTER_KIND: &str = "kingsley.noc_mesh";

/// One grid position. The position exists once on each plane as a separate
/// engine node.
#[derive(Debug, Clone)]
pub struct Router {
    pub id: RouterId,
    pub x: usize,
    pub y: usize,
    nodes: [NodeHandle; 4],
    levels: SmallVec<[HierarchyLevel; 4]>,
}

impl Router {
    pub fn node(&self, plane: Plane) -> NodeHandle {
        self.nodes[plane.index()]
    }

    /// Hierarchy levels of the groups attached here, in first-seen order.
    pub fn levels(&self) -> &[HierarchyLevel] {
        &self.levels
    }

    pub(crate) fn record_level(&mut self, level: HierarchyLevel) {
        if !self.levels.contains(&level) {
            self.levels.push(level);
        }
    }
}

/// An xdim by ydim mesh replicated on four planes, accepting endpoint groups
/// until it is finalized.
///
/// All state lives in this value and is mutated through `&mut self`; building
/// one topology from several threads at once is not supported.
#[derive(Debug)]
pub struct MeshTopology {
    pub(crate) layout: MeshLayout,
    pub(crate) routers: Vec<Router>,
    pub(crate) ports: PortAllocator,
    pub(crate) link_seq: u64,
    /// Network interfaces of reserved-category endpoints, for finalization.
    pub(crate) reserved_nics: Vec<(ReservedCategory, NodeHandle)>,
}

impl MeshTopology {
    pub fn build<E: Engine + ?Sized>(engine: &mut E, layout: MeshLayout) -> Result<Self> {
        let (xdim, ydim) = (layout.xdim, layout.ydim);
        if xdim < 1 || ydim < 1 {
            return Err(ConfigurationError::Dimensions { xdim, ydim });
        }

        let count = xdim * ydim;
        let mut routers: Vec<Router> = Vec::with_capacity(count);
        for y in 0..ydim {
            for x in 0..xdim {
                let id = routers.len();
                let nodes = Plane::ALL.map(|plane| {
                    let node = engine.create_node(&format!("{}_{}{}", layout.prefix, plane.tag(), id), ROUTER_KIND);
                    engine.set_parameters(node, layout.planes.for_plane(plane).router_params());
                    node
                });
                routers.push(Router {
                    id,
                    x,
                    y,
                    nodes,
                    levels: SmallVec::new(),
                });

                for plane in Plane::ALL {
                    let node = routers[id].node(plane);
                    if y != 0 {
                        let above = routers[id - xdim].node(plane);
                        let hop = layout.latencies.y;
                        engine.create_link(
                            &format!("{}{}ns{}", layout.prefix, plane.short(), id),
                            LinkEnd::new(above, PortName::South, hop),
                            LinkEnd::new(node, PortName::North, hop),
                        );
                    }
                    if x != 0 {
                        let left = routers[id - 1].node(plane);
                        let hop = layout.latencies.x;
                        engine.create_link(
                            &format!("{}{}ew{}", layout.prefix, plane.short(), id),
                            LinkEnd::new(left, PortName::East, hop),
                            LinkEnd::new(node, PortName::West, hop),
                        );
                    }
                }
                debug!("{}: router {id} at ({x}, {y})", layout.prefix);
            }
        }

        info!(
            "{}: built {xdim}x{ydim} mesh, {} routers per plane",
            layout.prefix, count
        );
        Ok(Self {
            layout,
            routers,
            ports: PortAllocator::new(count),
            link_seq: 0,
            reserved_nics: Vec::new(),
        })
    }

    pub fn layout(&self) -> &MeshLayout {
        &self.layout
    }

    pub fn prefix(&self) -> &str {
        &self.layout.prefix
    }

    pub fn xdim(&self) -> usize {
        self.layout.xdim
    }

    pub fn ydim(&self) -> usize {
        self.layout.ydim
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    pub fn router(&self, id: RouterId) -> &Router {
        &self.routers[id]
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    /// Router nodes of one plane in raster order.
    pub fn plane_nodes(&self, plane: Plane) -> impl Iterator<Item = NodeHandle> + '_ {
        self.routers.iter().map(move |router| router.node(plane))
    }

    pub fn used_ports(&self, router: RouterId) -> u32 {
        self.ports.used(router)
    }

    pub(crate) fn next_link_name(&mut self) -> String {
        let name = format!("{}{}", self.layout.prefix, self.link_seq);
        self.link_seq += 1;
        name
    }
}
