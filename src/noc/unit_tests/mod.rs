use crate::engine::{Engine, RecordingEngine};

use super::{Endpoint, EndpointCategory, EndpointGroup, MeshConfig, MeshTopology};

#[cfg(test)]
mod finalize_tests;

fn build_mesh(engine: &mut RecordingEngine, xdim: usize, ydim: usize) -> MeshTopology {
    let config = MeshConfig {
        xdim,
        ydim,
        ..MeshConfig::default()
    };
    MeshTopology::build(engine, config.layout().unwrap()).expect("mesh should build")
}

/// `count` bare endpoints named `{prefix}{n}`.
fn endpoint_group(
    engine: &mut RecordingEngine,
    prefix: &str,
    count: usize,
    category: EndpointCategory,
) -> EndpointGroup {
    let endpoints: Vec<Endpoint> = (0..count)
        .map(|n| {
            let name = format!("{prefix}{n}");
            let node = engine.create_node(&name, "memHierarchy.Cache");
            Endpoint::new(name, node)
        })
        .collect();
    EndpointGroup::from_endpoints(prefix, category, endpoints)
}

fn caches(engine: &mut RecordingEngine, prefix: &str, count: usize, level: u32) -> EndpointGroup {
    endpoint_group(engine, prefix, count, EndpointCategory::Cache { level })
}
