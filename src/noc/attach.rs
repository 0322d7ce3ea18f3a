use log::{debug, info};

use crate::engine::{Engine, LinkEnd, NodeHandle, Params};

use super::connectivity::{Connectivity, ConnectivityMap};
use super::endpoint::{Endpoint, EndpointGroup};
use super::error::Result;
use super::mesh::MeshTopology;
use super::types::{AttachSide, Plane, PortName, RouterId};

pub const NIC_KIND: &str = "memHierarchy.MemNICFour";
pub const ADAPTER_KIND: &str = "kingsley.linkcontrol";

#[derive(Debug, Clone, Copy, Default)]
pub struct AttachOptions {
    /// Debug level for the network interfaces; 0 leaves debugging off.
    pub debug: u32,
}

/// Where one endpoint landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub endpoint: String,
    pub router: RouterId,
    pub port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachReport {
    pub group: String,
    pub placements: Vec<Placement>,
}

impl AttachReport {
    pub fn links_created(&self) -> usize {
        self.placements.len() * Plane::ALL.len()
    }

    pub fn on_router(&self, router: RouterId) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.router == router)
    }
}

/// Engine nodes installed on an endpoint for its network side.
struct EndpointNics {
    nic: NodeHandle,
    adapters: [NodeHandle; 4],
}

impl MeshTopology {
    pub fn attach<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        group: &EndpointGroup,
        connectivity: Connectivity,
        side: AttachSide,
    ) -> Result<AttachReport> {
        self.attach_with(engine, group, connectivity, side, AttachOptions::default())
    }

    /// Attach every endpoint of `group` to the routers named by
    /// `connectivity`. The map is validated first; on error nothing has been
    /// created and the topology can still be used.
    pub fn attach_with<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        group: &EndpointGroup,
        connectivity: Connectivity,
        side: AttachSide,
        options: AttachOptions,
    ) -> Result<AttachReport> {
        let map = connectivity.resolve(self.router_count(), group.slot_count())?;
        let report = self.place(engine, group, &map, side, options);
        info!(
            "{}: attached group '{}' ({} endpoints, {} links) on {}",
            self.prefix(),
            group.name,
            report.placements.len(),
            report.links_created(),
            side.slot()
        );
        Ok(report)
    }

    /// Walk slots in input order against routers in raster order. `map` must
    /// already be validated against this mesh and `group`.
    pub(crate) fn place<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        group: &EndpointGroup,
        map: &ConnectivityMap,
        side: AttachSide,
        options: AttachOptions,
    ) -> AttachReport {
        let mut cursor = map.placements();
        let mut placements = Vec::with_capacity(group.endpoint_count());

        for (index, slot) in group.slots().iter().enumerate() {
            let nics: Vec<EndpointNics> = slot
                .iter()
                .map(|endpoint| self.install_nics(engine, group, endpoint, side, options))
                .collect();

            let Some(router) = cursor.next() else {
                panic!(
                    "{}: connectivity map exhausted at slot {index} of group '{}' ({} slots, map total {})",
                    self.prefix(),
                    group.name,
                    group.slot_count(),
                    map.total()
                );
            };

            for (endpoint, nics) in slot.iter().zip(&nics) {
                let port = self.ports.next(router);
                self.connect_endpoint(engine, router, port, nics);
                if let Some(level) = group.category.level() {
                    self.routers[router].record_level(level);
                }
                if let Some(category) = group.category.reserved() {
                    self.reserved_nics.push((category, nics.nic));
                }
                debug!(
                    "{}: {} -> router {router} local{port}",
                    self.prefix(),
                    endpoint.name
                );
                placements.push(Placement {
                    endpoint: endpoint.name.clone(),
                    router,
                    port,
                });
            }
        }

        AttachReport {
            group: group.name.clone(),
            placements,
        }
    }

    fn install_nics<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        group: &EndpointGroup,
        endpoint: &Endpoint,
        side: AttachSide,
        options: AttachOptions,
    ) -> EndpointNics {
        let nic_name = format!("{}.{}", endpoint.name, side.slot());
        let nic = engine.create_node(&nic_name, NIC_KIND);
        let mut nic_params = Params::new();
        if let Some(level) = group.category.level() {
            nic_params.insert("group".into(), level.into());
        }
        if options.debug > 0 {
            nic_params.insert("debug".into(), 1u32.into());
            nic_params.insert("debug_level".into(), options.debug.into());
        }
        engine.set_parameters(nic, nic_params);

        let adapters = Plane::ALL.map(|plane| {
            let adapter = engine.create_node(&format!("{nic_name}.{}", plane.tag()), ADAPTER_KIND);
            engine.set_parameters(adapter, self.layout.planes.for_plane(plane).adapter_params());
            adapter
        });
        EndpointNics { nic, adapters }
    }

    fn connect_endpoint<E: Engine + ?Sized>(
        &mut self,
        engine: &mut E,
        router: RouterId,
        port: u32,
        nics: &EndpointNics,
    ) {
        let latency = self.layout.latencies.local;
        for plane in Plane::ALL {
            let name = self.next_link_name();
            engine.create_link(
                &name,
                LinkEnd::new(self.routers[router].node(plane), PortName::Local(port), latency),
                LinkEnd::new(nics.adapters[plane.index()], PortName::Router, latency),
            );
        }
    }
}
