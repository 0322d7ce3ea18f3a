use log::info;

use crate::engine::Engine;
use crate::hierarchy::{CacheLevel, CoreComplex, CoreComplexConfig, Directories, InterleavedMemory};
use crate::noc::{AttachOptions, AttachReport, ConfigurationError, FinalizedMesh, MeshTopology, Result};
use crate::sim::config::{GroupConfig, SystemConfig};

/// A built and finalized system: the mesh plus where every group landed.
#[derive(Debug)]
pub struct SystemTop {
    pub mesh: FinalizedMesh,
    pub attached: Vec<AttachReport>,
}

impl SystemTop {
    /// Build the mesh, attach every group in order, then finalize. The first
    /// configuration error aborts the build.
    pub fn build<E: Engine + ?Sized>(engine: &mut E, config: &SystemConfig) -> Result<SystemTop> {
        check_prefixes(config)?;
        let mut mesh = MeshTopology::build(engine, config.mesh.layout()?)?;
        let options = AttachOptions {
            debug: config.sim.nic_debug,
        };

        let mut attached = Vec::new();
        for group in &config.groups {
            let reports = attach_group(engine, &mut mesh, group, options)?;
            info!("group '{}' placed in {} step(s)", group.prefix(), reports.len());
            attached.extend(reports);
        }

        let mesh = mesh.finalize(engine, &config.finalize.reserved_order);
        Ok(SystemTop { mesh, attached })
    }

    pub fn endpoints(&self) -> usize {
        self.attached.iter().map(|r| r.placements.len()).sum()
    }
}

/// Every component name starts with its group's prefix and continues with a
/// counter or a dotted suffix, so two prefixes where one starts with the other
/// can produce the same name. Reject those before anything is created.
fn check_prefixes(config: &SystemConfig) -> Result<()> {
    let prefixes: Vec<&str> = std::iter::once(config.mesh.prefix.as_str())
        .chain(config.groups.iter().map(GroupConfig::prefix))
        .collect();
    for (index, later) in prefixes.iter().enumerate() {
        if let Some(earlier) = prefixes[..index]
            .iter()
            .find(|earlier| later.starts_with(**earlier) || earlier.starts_with(*later))
        {
            return Err(ConfigurationError::PrefixClash {
                expected: earlier.to_string(),
                actual: later.to_string(),
            });
        }
    }
    Ok(())
}

fn attach_group<E: Engine + ?Sized>(
    engine: &mut E,
    mesh: &mut MeshTopology,
    group: &GroupConfig,
    options: AttachOptions,
) -> Result<Vec<AttachReport>> {
    let report = match group {
        GroupConfig::Cache(c) => {
            let level = if c.distributed {
                CacheLevel::distributed(engine, &c.prefix, c.level, c.count, &c.params)
            } else {
                CacheLevel::private(engine, &c.prefix, c.level, c.count, &c.params)
            };
            if let Some(policy) = c.replacement {
                level.set_replacement(engine, policy, None, false);
            }
            if let Some(policy) = c.directory_replacement {
                level.set_replacement(engine, policy, None, true);
            }
            mesh.attach_with(engine, &level.group(), c.connectivity.clone(), c.side, options)?
        }
        GroupConfig::Directory(c) => {
            let dirs = Directories::new(engine, &c.prefix, c.count, &c.params);
            mesh.attach_with(engine, &dirs.group(), c.connectivity.clone(), c.side, options)?
        }
        GroupConfig::Memory(c) => {
            let mut memory = InterleavedMemory::new(
                engine,
                &c.prefix,
                c.controllers,
                c.total_size,
                c.interleave_size,
                c.start_address,
                c.end_address,
            )?;
            if !c.controller_params.is_empty() {
                memory.configure_controllers(engine, &c.controller_params);
            }
            if let Some(preset) = c.dram {
                memory.set_simple_dram(engine, preset);
            }
            mesh.attach_with(engine, &memory.group(), c.connectivity.clone(), c.side, options)?
        }
        GroupConfig::Cores(c) => {
            let complex = CoreComplex::build(
                engine,
                &CoreComplexConfig {
                    prefix: c.prefix.clone(),
                    cores: c.cores,
                    isa: c.isa,
                    hw_threads: c.hw_threads,
                    first_node_id: c.first_node_id,
                    core_params: c.core_params.clone(),
                    l1i_params: c.l1i_params.clone(),
                    l1d_params: c.l1d_params.clone(),
                    l2_params: c.l2_params.clone(),
                    os_cache_params: c.os_cache_params.clone(),
                    link_latency: c.link_latency,
                    bus_params: c.bus_params.clone(),
                },
            )?;
            return complex.attach(mesh, engine, c.connectivity.clone(), c.os_router, options);
        }
    };
    Ok(vec![report])
}
