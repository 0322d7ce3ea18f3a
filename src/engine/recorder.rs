use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::{Engine, LinkEnd, NodeHandle, ParamValue, Params};

#[derive(Debug, Clone, Serialize)]
pub struct NodeRecord {
    pub name: String,
    pub kind: String,
    pub params: Params,
}

impl NodeRecord {
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEndRecord {
    pub node: String,
    pub port: String,
    pub latency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub name: String,
    pub a: LinkEndRecord,
    pub b: LinkEndRecord,
}

impl LinkRecord {
    pub fn touches(&self, node: &str) -> bool {
        self.a.node == node || self.b.node == node
    }

    /// The end opposite `node`, if this link touches it.
    pub fn peer_of(&self, node: &str) -> Option<&LinkEndRecord> {
        if self.a.node == node {
            Some(&self.b)
        } else if self.b.node == node {
            Some(&self.a)
        } else {
            None
        }
    }
}

/// Serializable snapshot of everything an engine was asked to build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphDescription {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

/// Engine that records calls instead of instantiating anything. Used by the CLI
/// to emit a graph description, and by tests to inspect what was built.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    graph: GraphDescription,
    by_name: HashMap<String, NodeHandle>,
    link_names: HashSet<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn graph(&self) -> &GraphDescription {
        &self.graph
    }

    pub fn into_graph(self) -> GraphDescription {
        self.graph
    }

    pub fn node(&self, handle: NodeHandle) -> &NodeRecord {
        &self.graph.nodes[handle.0]
    }

    pub fn find(&self, name: &str) -> Option<&NodeRecord> {
        self.by_name.get(name).map(|handle| self.node(*handle))
    }

    pub fn handle_of(&self, name: &str) -> Option<NodeHandle> {
        self.by_name.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.graph.links.len()
    }

    pub fn links(&self) -> &[LinkRecord] {
        &self.graph.links
    }

    pub fn links_touching<'a>(&'a self, node: &'a str) -> impl Iterator<Item = &'a LinkRecord> + 'a {
        self.graph.links.iter().filter(move |link| link.touches(node))
    }

    fn end_record(&self, end: &LinkEnd) -> LinkEndRecord {
        LinkEndRecord {
            node: self.node(end.node).name.clone(),
            port: end.port.to_string(),
            latency: end.latency.to_string(),
        }
    }
}

impl Engine for RecordingEngine {
    fn create_node(&mut self, name: &str, kind: &str) -> NodeHandle {
        assert!(
            !self.by_name.contains_key(name),
            "duplicate node name '{name}'"
        );
        let handle = NodeHandle(self.graph.nodes.len());
        self.graph.nodes.push(NodeRecord {
            name: name.to_string(),
            kind: kind.to_string(),
            params: Params::new(),
        });
        self.by_name.insert(name.to_string(), handle);
        handle
    }

    fn set_parameters(&mut self, node: NodeHandle, params: Params) {
        assert!(node.0 < self.graph.nodes.len(), "invalid node handle");
        self.graph.nodes[node.0].params.extend(params);
    }

    fn create_link(&mut self, name: &str, a: LinkEnd, b: LinkEnd) {
        assert!(a.node.0 < self.graph.nodes.len(), "invalid link endpoint");
        assert!(b.node.0 < self.graph.nodes.len(), "invalid link endpoint");
        assert!(
            !self.link_names.contains(name),
            "duplicate link name '{name}'"
        );
        let record = LinkRecord {
            name: name.to_string(),
            a: self.end_record(&a),
            b: self.end_record(&b),
        };
        self.link_names.insert(name.to_string());
        self.graph.links.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noc::types::PortName;
    use crate::noc::units::Latency;
    use crate::params;

    #[test]
    fn parameters_merge_and_overwrite() {
        let mut engine = RecordingEngine::new();
        let node = engine.create_node("l2_0", "memHierarchy.Cache");
        engine.set_parameters(node, params! { "group" => 2u32, "debug" => false });
        engine.set_parameters(node, params! { "group" => 4u32 });

        let record = engine.find("l2_0").expect("node should be recorded");
        assert_eq!(Some(&ParamValue::Int(4)), record.param("group"));
        assert_eq!(Some(&ParamValue::Bool(false)), record.param("debug"));
    }

    #[test]
    fn links_are_recorded_with_engine_port_names() {
        let mut engine = RecordingEngine::new();
        let a = engine.create_node("a", "kingsley.noc_mesh");
        let b = engine.create_node("b", "kingsley.noc_mesh");
        let hop = Latency::from_ps(500);
        engine.create_link(
            "ab",
            LinkEnd::new(a, PortName::East, hop),
            LinkEnd::new(b, PortName::Local(3), hop),
        );

        let link = &engine.links()[0];
        assert_eq!("east", link.a.port);
        assert_eq!("local3", link.b.port);
        assert_eq!("500ps", link.b.latency);
        assert_eq!(Some(&link.b), link.peer_of("a"));
    }

    #[test]
    #[should_panic(expected = "duplicate node name")]
    fn duplicate_node_names_are_rejected() {
        let mut engine = RecordingEngine::new();
        engine.create_node("dup", "x");
        engine.create_node("dup", "x");
    }

    #[test]
    #[should_panic(expected = "duplicate link name 'ab'")]
    fn duplicate_link_names_are_rejected() {
        let mut engine = RecordingEngine::new();
        let a = engine.create_node("a", "x");
        let b = engine.create_node("b", "x");
        let hop = Latency::from_ps(500);
        engine.create_link("ab", LinkEnd::new(a, PortName::East, hop), LinkEnd::new(b, PortName::West, hop));
        engine.create_link("ab", LinkEnd::new(b, PortName::North, hop), LinkEnd::new(a, PortName::South, hop));
    }
}
