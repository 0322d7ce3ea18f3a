use std::path::PathBuf;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::*;

use crate::engine::Params;
use crate::hierarchy::{DramPreset, Isa, ReplacementPolicy};
use crate::noc::{AttachSide, Bytes, Connectivity, FinalizeOptions, HierarchyLevel, Latency, MeshConfig, RouterId};

pub trait Config: DeserializeOwned + Default {
    /// A missing section falls back to the defaults; a malformed one is an
    /// error for the caller to report.
    fn from_section(section: Option<&Value>) -> Result<Self, de::Error> {
        match section {
            Some(value) => value.clone().try_into(),
            None => {
                warn!("config section not found");
                Ok(Self::default())
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    /// Where the graph description goes; stdout when unset.
    pub output: Option<PathBuf>,
    pub pretty: bool,
    /// NIC debug level applied to every attached group.
    pub nic_debug: u32,
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            output: None,
            pretty: true,
            nic_debug: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FinalizeConfig {
    pub reserved_order: FinalizeOptions,
}

impl Config for FinalizeConfig {}

/// One `[[group]]` entry. Groups are attached in file order.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupConfig {
    Cache(CacheGroupConfig),
    Directory(DirectoryGroupConfig),
    Memory(MemoryGroupConfig),
    Cores(CoresGroupConfig),
}

impl GroupConfig {
    pub fn prefix(&self) -> &str {
        match self {
            GroupConfig::Cache(c) => &c.prefix,
            GroupConfig::Directory(c) => &c.prefix,
            GroupConfig::Memory(c) => &c.prefix,
            GroupConfig::Cores(c) => &c.prefix,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheGroupConfig {
    pub prefix: String,
    pub level: HierarchyLevel,
    pub count: usize,
    /// Address-sliced across all members instead of one cache per requester.
    pub distributed: bool,
    pub params: Params,
    pub replacement: Option<ReplacementPolicy>,
    pub directory_replacement: Option<ReplacementPolicy>,
    pub connectivity: Connectivity,
    pub side: AttachSide,
}

impl Default for CacheGroupConfig {
    fn default() -> Self {
        Self {
            prefix: "l2_".to_string(),
            level: 2,
            count: 1,
            distributed: false,
            params: Params::new(),
            replacement: None,
            directory_replacement: None,
            connectivity: Connectivity::Router(0),
            side: AttachSide::HighLink,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DirectoryGroupConfig {
    pub prefix: String,
    pub count: usize,
    pub params: Params,
    pub connectivity: Connectivity,
    pub side: AttachSide,
}

impl Default for DirectoryGroupConfig {
    fn default() -> Self {
        Self {
            prefix: "dir".to_string(),
            count: 1,
            params: Params::new(),
            connectivity: Connectivity::Router(0),
            side: AttachSide::HighLink,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryGroupConfig {
    pub prefix: String,
    pub controllers: usize,
    pub total_size: Bytes,
    pub interleave_size: Bytes,
    pub start_address: u64,
    pub end_address: Option<u64>,
    pub controller_params: Params,
    pub dram: Option<DramPreset>,
    pub connectivity: Connectivity,
    pub side: AttachSide,
}

impl Default for MemoryGroupConfig {
    fn default() -> Self {
        Self {
            prefix: "memory".to_string(),
            controllers: 1,
            total_size: Bytes::new(1 << 30),
            interleave_size: Bytes::new(64),
            start_address: 0,
            end_address: None,
            controller_params: Params::new(),
            dram: None,
            connectivity: Connectivity::Router(0),
            side: AttachSide::HighLink,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoresGroupConfig {
    pub prefix: String,
    pub cores: usize,
    pub isa: Isa,
    pub hw_threads: u32,
    pub first_node_id: u32,
    pub core_params: Params,
    pub l1i_params: Params,
    pub l1d_params: Params,
    pub l2_params: Option<Params>,
    /// Falls back to `l1d_params`.
    pub os_cache_params: Option<Params>,
    pub link_latency: Latency,
    pub bus_params: Option<Params>,
    pub connectivity: Connectivity,
    pub os_router: RouterId,
}

impl Default for CoresGroupConfig {
    fn default() -> Self {
        Self {
            prefix: "cpu".to_string(),
            cores: 1,
            isa: Isa::Riscv64,
            hw_threads: 1,
            first_node_id: 0,
            core_params: Params::new(),
            l1i_params: Params::new(),
            l1d_params: Params::new(),
            l2_params: None,
            os_cache_params: None,
            link_latency: Latency::from_ps(1000),
            bus_params: None,
            connectivity: Connectivity::Router(0),
            os_router: 0,
        }
    }
}

/// A whole system description: `[sim]`, `[mesh]`, `[finalize]` and any number
/// of `[[group]]` tables.
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    pub sim: SimConfig,
    pub mesh: MeshConfig,
    pub finalize: FinalizeConfig,
    pub groups: Vec<GroupConfig>,
}

impl SystemConfig {
    pub fn from_table(table: &Table) -> Result<Self, de::Error> {
        let groups = match table.get("group") {
            Some(value) => value.clone().try_into()?,
            None => {
                warn!("no [[group]] entries, the mesh will be empty");
                Vec::new()
            }
        };
        Ok(Self {
            sim: SimConfig::from_section(table.get("sim"))?,
            mesh: MeshConfig::from_section(table.get("mesh"))?,
            finalize: FinalizeConfig::from_section(table.get("finalize"))?,
            groups,
        })
    }
}
