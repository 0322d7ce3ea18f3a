use std::str::FromStr;

use serde::Deserialize;

use crate::engine::{Engine, NodeHandle, Params};
use crate::noc::{Bytes, ConfigurationError, Endpoint, EndpointCategory, EndpointGroup, Result};
use crate::params;

pub const MEMORY_KIND: &str = "memHierarchy.MemController";
pub const DIRECTORY_KIND: &str = "memHierarchy.DirectoryController";
pub const SIMPLE_DRAM_KIND: &str = "memHierarchy.simpleDRAM";

/// Canned `simpleDRAM` timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DramPreset {
    Lpddr4,
    Lpddr5,
}

impl DramPreset {
    pub fn params(self) -> Params {
        match self {
            DramPreset::Lpddr4 => params! {
                "max_requests_per_cycle" => 1u32,
                "request_width" => 64u32,
                "cycle_time" => "2133MHz",
                "tCAS" => 36u32,
                // two 2-cycle commands instead of one 1-cycle command
                "tRCD" => 23u32,
                "tRP" => 16u32,
                "banks" => 8u32,
                "bank_interleave_granularity" => "2KiB",
                "row_size" => "2KiB",
                "row_policy" => "open",
            },
            // Data clock, so the latency estimate comes out roughly right.
            DramPreset::Lpddr5 => params! {
                "max_requests_per_cycle" => 1u32,
                "request_width" => 64u32,
                "cycle_time" => "3200MHz",
                "tCAS" => 48u32,
                "tRCD" => 30u32,
                "tRP" => 21u32,
                "banks" => 16u32,
                "bank_interleave_granularity" => "1KiB",
                "row_size" => "1KiB",
                "row_policy" => "open",
            },
        }
    }
}

impl FromStr for DramPreset {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "LPDDR4" => Ok(Self::Lpddr4),
            "LPDDR5" => Ok(Self::Lpddr5),
            _ => Err(ConfigurationError::unknown(
                "DRAM timing preset",
                "LPDDR4, LPDDR5",
                value,
            )),
        }
    }
}

impl TryFrom<String> for DramPreset {
    type Error = ConfigurationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Memory controllers that split one address range by fixed-size interleave.
#[derive(Debug, Clone)]
pub struct InterleavedMemory {
    pub prefix: String,
    pub module_capacity: Bytes,
    controllers: Vec<Endpoint>,
    backends: Vec<NodeHandle>,
}

impl InterleavedMemory {
    pub fn new<E: Engine + ?Sized>(
        engine: &mut E,
        prefix: &str,
        controllers: usize,
        total_size: Bytes,
        interleave_size: Bytes,
        start_address: u64,
        end_address: Option<u64>,
    ) -> Result<Self> {
        if controllers == 0 {
            return Err(ConfigurationError::invalid(
                "memory controller count",
                "at least 1",
                controllers,
            ));
        }
        if interleave_size.get() == 0 {
            return Err(ConfigurationError::invalid(
                "interleave size",
                "a non-zero size",
                interleave_size,
            ));
        }

        let end = end_address.unwrap_or(total_size.get());
        let overflow = || {
            ConfigurationError::invalid(
                "interleaved address range",
                "addresses below 2^64",
                format!("{controllers} x {interleave_size} from {start_address:#x}"),
            )
        };
        let step = interleave_size.times(controllers as u64).ok_or_else(overflow)?;
        let starts = (0..controllers as u64)
            .map(|n| {
                interleave_size
                    .times(n)
                    .and_then(|offset| start_address.checked_add(offset.get()))
                    .ok_or_else(overflow)
            })
            .collect::<Result<Vec<u64>>>()?;

        let endpoints = starts
            .into_iter()
            .enumerate()
            .map(|(n, start)| {
                let name = format!("{prefix}{n}");
                let node = engine.create_node(&name, MEMORY_KIND);
                engine.set_parameters(
                    node,
                    params! {
                        "interleave_size" => interleave_size,
                        "interleave_step" => step,
                        "addr_range_start" => start,
                        "addr_range_end" => end,
                    },
                );
                Endpoint::new(name, node)
            })
            .collect();

        Ok(Self {
            prefix: prefix.to_string(),
            module_capacity: Bytes::new(total_size.get() / controllers as u64),
            controllers: endpoints,
            backends: Vec::new(),
        })
    }

    pub fn controllers(&self) -> &[Endpoint] {
        &self.controllers
    }

    pub fn backends(&self) -> &[NodeHandle] {
        &self.backends
    }

    pub fn configure_controllers<E: Engine + ?Sized>(&self, engine: &mut E, params: &Params) {
        for controller in &self.controllers {
            engine.set_parameters(controller.node, params.clone());
        }
    }

    pub fn set_simple_dram<E: Engine + ?Sized>(&mut self, engine: &mut E, preset: DramPreset) {
        self.set_backend(engine, SIMPLE_DRAM_KIND, &preset.params());
    }

    /// Install a timing backend of any kind on every controller.
    pub fn set_backend<E: Engine + ?Sized>(&mut self, engine: &mut E, kind: &str, params: &Params) {
        for controller in &self.controllers {
            let backend = engine.create_node(&format!("{}.backend", controller.name), kind);
            let mut backend_params = params! { "mem_size" => self.module_capacity };
            backend_params.extend(params.clone());
            engine.set_parameters(backend, backend_params);
            self.backends.push(backend);
        }
    }

    pub fn group(&self) -> EndpointGroup {
        EndpointGroup::from_endpoints(
            self.prefix.clone(),
            EndpointCategory::MEMORY,
            self.controllers.iter().cloned(),
        )
    }
}

/// Coherence directories. Like memories, they get their hierarchy level only
/// when the mesh is finalized.
#[derive(Debug, Clone)]
pub struct Directories {
    pub prefix: String,
    controllers: Vec<Endpoint>,
}

impl Directories {
    pub fn new<E: Engine + ?Sized>(engine: &mut E, prefix: &str, count: usize, params: &Params) -> Self {
        let controllers = (0..count)
            .map(|n| {
                let name = format!("{prefix}{n}");
                let node = engine.create_node(&name, DIRECTORY_KIND);
                engine.set_parameters(node, params.clone());
                Endpoint::new(name, node)
            })
            .collect();
        Self {
            prefix: prefix.to_string(),
            controllers,
        }
    }

    pub fn controllers(&self) -> &[Endpoint] {
        &self.controllers
    }

    pub fn group(&self) -> EndpointGroup {
        EndpointGroup::from_endpoints(
            self.prefix.clone(),
            EndpointCategory::DIRECTORY,
            self.controllers.iter().cloned(),
        )
    }
}
