use toml::Table;

use super::config::{Config, GroupConfig, SimConfig, SystemConfig};
use super::top::SystemTop;
use crate::engine::RecordingEngine;
use crate::hierarchy::{DramPreset, Isa};
use crate::noc::{AttachSide, ConfigurationError, Connectivity, Latency, ReservedCategory};

const SYSTEM: &str = r#"
[sim]
nic_debug = 2

[mesh]
xdim = 2
ydim = 2
frequency = "1GHz"

[[group]]
kind = "cores"
prefix = "cpu"
cores = 2
isa = "rv"
connectivity = [1, 1, 0, 0]
os_router = 3

[[group]]
kind = "cache"
prefix = "l3_"
level = 3
count = 2
distributed = true
replacement = "lru"
connectivity = [0, 0, 1, 1]

[[group]]
kind = "directory"
count = 2
connectivity = [0, 0, 1, 1]

[[group]]
kind = "memory"
controllers = 2
total_size = "1GiB"
interleave_size = "4KiB"
dram = "lpddr5"
connectivity = [1, 0, 0, 1]
"#;

fn system(text: &str) -> SystemConfig {
    let table: Table = toml::from_str(text).unwrap();
    SystemConfig::from_table(&table).unwrap()
}

#[test]
fn sections_parse_with_defaults() {
    let config = system(SYSTEM);
    assert_eq!(2, config.sim.nic_debug);
    assert!(config.sim.pretty);
    assert_eq!(2, config.mesh.xdim);
    assert_eq!("mesh", config.mesh.prefix);
    assert_eq!(4, config.groups.len());

    let GroupConfig::Cores(cores) = &config.groups[0] else {
        panic!("expected a core group first");
    };
    assert_eq!(Isa::Riscv64, cores.isa);
    assert_eq!(Connectivity::Map(vec![1, 1, 0, 0]), cores.connectivity);

    let GroupConfig::Memory(memory) = &config.groups[3] else {
        panic!("expected a memory group last");
    };
    assert_eq!(Some(DramPreset::Lpddr5), memory.dram);
    assert_eq!(AttachSide::HighLink, memory.side);
    assert_eq!("memory", memory.prefix);
}

#[test]
fn missing_section_falls_back_to_default() {
    let sim = SimConfig::from_section(None).unwrap();
    assert_eq!(0, sim.nic_debug);
    assert!(sim.output.is_none());
}

#[test]
fn malformed_section_is_an_error() {
    let section: toml::Value = toml::from_str("nic_debug = \"loud\"").unwrap();
    assert!(SimConfig::from_section(Some(&section)).is_err());
}

#[test]
fn core_link_latency_and_bus_params_parse() {
    let config = system(
        r#"
        [[group]]
        kind = "cores"
        link_latency = "2ns"
        l2_params = { cache_size = "256KiB" }
        bus_params = { bus_frequency = "2GHz" }
        "#,
    );
    let GroupConfig::Cores(cores) = &config.groups[0] else {
        panic!("expected a core group");
    };
    assert_eq!(Latency::from_ps(2000), cores.link_latency);
    assert!(cores.os_cache_params.is_none());

    let mut engine = RecordingEngine::new();
    SystemTop::build(&mut engine, &config).unwrap();
    assert_eq!("2GHz", engine.find("cpubus0").unwrap().param("bus_frequency").unwrap().to_string());
    assert_eq!("2", engine.find("cpuos_l10.lowlink").unwrap().param("group").unwrap().to_string());
}

#[test]
fn unknown_group_kind_is_rejected() {
    let table: Table = toml::from_str("[[group]]\nkind = \"bus\"\n").unwrap();
    assert!(SystemConfig::from_table(&table).is_err());

    let table: Table = toml::from_str("[[group]]\nkind = \"cache\"\nside = \"sideways\"\n").unwrap();
    assert!(SystemConfig::from_table(&table).is_err());
}

#[test]
fn full_system_builds_and_finalizes() {
    let config = system(SYSTEM);
    let mut engine = RecordingEngine::new();
    let top = SystemTop::build(&mut engine, &config).unwrap();

    // cores: 2 L1D/L1I pairs + os cache, l3: 2, dirs: 2, memories: 2
    assert_eq!(11, top.endpoints());
    assert_eq!(Some(4), top.mesh.reserved_level(ReservedCategory::Directory));
    assert_eq!(Some(5), top.mesh.reserved_level(ReservedCategory::Memory));
    assert_eq!(4, top.mesh.max_ports());

    let nic = engine.find("cpul1d0.lowlink").unwrap();
    assert_eq!("2", nic.param("debug_level").unwrap().to_string());
    assert_eq!("1", nic.param("group").unwrap().to_string());
    assert_eq!("5", engine.find("memory1.highlink").unwrap().param("group").unwrap().to_string());
    assert!(engine.find("memory0.backend").is_some());
    assert!(engine.find("l3_1.replacement0").is_some());
    assert_eq!(
        "4",
        engine.find("mesh_data2").unwrap().param("local_ports").unwrap().to_string()
    );
}

#[test]
fn cores_are_wired_to_their_caches() {
    let config = system(SYSTEM);
    let mut engine = RecordingEngine::new();
    SystemTop::build(&mut engine, &config).unwrap();

    assert!(engine.links_touching("cpucore0").count() > 0);
    // The mesh side goes through the NIC's adapters, not the cache itself.
    assert_eq!(1, engine.links_touching("cpul1d0").count());
    assert!(engine.links().iter().any(|l| l.name == "cpul1os"));
}

#[test]
fn clashing_group_prefixes_are_rejected_before_building() {
    let config = system(
        r#"
        [[group]]
        kind = "directory"

        [[group]]
        kind = "directory"
        "#,
    );
    let mut engine = RecordingEngine::new();
    let err = SystemTop::build(&mut engine, &config).unwrap_err();
    assert_eq!(
        ConfigurationError::PrefixClash {
            expected: "dir".to_string(),
            actual: "dir".to_string()
        },
        err
    );
    assert_eq!(0, engine.node_count());

    // "cpu" would also name "cpu2" nodes for a group called "cpu2".
    let mut config = system(SYSTEM);
    if let GroupConfig::Cache(cache) = &mut config.groups[1] {
        cache.prefix = "cpu2".to_string();
    }
    assert!(matches!(
        SystemTop::build(&mut RecordingEngine::new(), &config),
        Err(ConfigurationError::PrefixClash { .. })
    ));
}

#[test]
fn bad_group_map_surfaces_as_configuration_error() {
    let mut config = system(SYSTEM);
    if let GroupConfig::Cache(cache) = &mut config.groups[1] {
        cache.connectivity = Connectivity::Map(vec![1, 1, 1, 0]);
    }
    let mut engine = RecordingEngine::new();
    let err = SystemTop::build(&mut engine, &config).unwrap_err();
    assert_eq!(ConfigurationError::MapSum { expected: 2, actual: 3 }, err);
}

#[test]
fn empty_description_builds_a_bare_mesh() {
    let config = system("");
    let mut engine = RecordingEngine::new();
    let top = SystemTop::build(&mut engine, &config).unwrap();
    assert_eq!(0, top.endpoints());
    assert_eq!(4, top.mesh.routers().len());
    assert_eq!(0, top.mesh.max_level());
}
