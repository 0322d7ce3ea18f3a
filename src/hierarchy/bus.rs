use crate::engine::{Engine, LinkEnd, NodeHandle, Params};
use crate::noc::{Endpoint, Latency, PortName};

pub const BUS_KIND: &str = "memHierarchy.Bus";

/// A snooping bus wired point to point, outside the mesh. Upper components
/// connect through their `lowlink`, lower ones through their `highlink`; the
/// bus numbers its own ports per side in connection order.
#[derive(Debug, Clone)]
pub struct Bus {
    pub name: String,
    node: NodeHandle,
    latency: Latency,
    highlinks: u32,
    lowlinks: u32,
}

impl Bus {
    pub fn new<E: Engine + ?Sized>(engine: &mut E, name: &str, params: &Params, latency: Latency) -> Self {
        let node = engine.create_node(name, BUS_KIND);
        engine.set_parameters(node, params.clone());
        Self {
            name: name.to_string(),
            node,
            latency,
            highlinks: 0,
            lowlinks: 0,
        }
    }

    pub fn node(&self) -> NodeHandle {
        self.node
    }

    pub fn connect_high<E: Engine + ?Sized>(&mut self, engine: &mut E, component: &Endpoint) {
        let port = self.highlinks;
        engine.create_link(
            &format!("{}.{}.highlink{port}", self.name, component.name),
            LinkEnd::new(component.node, PortName::LowLink, self.latency),
            LinkEnd::new(self.node, PortName::BusHigh(port), self.latency),
        );
        self.highlinks += 1;
    }

    pub fn connect_low<E: Engine + ?Sized>(&mut self, engine: &mut E, component: &Endpoint) {
        let port = self.lowlinks;
        engine.create_link(
            &format!("{}.{}.lowlink{port}", self.name, component.name),
            LinkEnd::new(component.node, PortName::HighLink, self.latency),
            LinkEnd::new(self.node, PortName::BusLow(port), self.latency),
        );
        self.lowlinks += 1;
    }
}
