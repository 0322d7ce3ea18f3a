use std::str::FromStr;

use phf::phf_map;
use serde::Deserialize;
use smallvec::smallvec;

use crate::engine::{Engine, LinkEnd, NodeHandle, Params};
use crate::noc::{
    AttachOptions, AttachReport, AttachSide, ConfigurationError, Connectivity, EndpointCategory,
    EndpointGroup, Latency, MeshTopology, PortName, Result, RouterId, Tlb,
};
use crate::params;

use super::bus::Bus;
use super::cache::CacheLevel;

pub const CORE_KIND: &str = "vanadis.dbg_VanadisCPU";
pub const OS_KIND: &str = "vanadis.VanadisNodeOS";
pub const MMU_KIND: &str = "mmu.simpleMMU";
pub const TLB_WRAPPER_KIND: &str = "mmu.tlb_wrapper";
pub const TLB_KIND: &str = "mmu.simpleTLB";
pub const LSQ_KIND: &str = "vanadis.VanadisBasicLoadStoreQueue";
pub const BRANCH_UNIT_KIND: &str = "vanadis.VanadisBasicBranchUnit";
pub const MEM_INTERFACE_KIND: &str = "memHierarchy.standardInterface";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Isa {
    Riscv64,
    Mips,
}

static ISA_ALIASES: phf::Map<&'static str, Isa> = phf_map! {
    "riscv64" => Isa::Riscv64,
    "riscv" => Isa::Riscv64,
    "rv" => Isa::Riscv64,
    "mips" => Isa::Mips,
    "mipsel" => Isa::Mips,
};

impl Isa {
    pub fn name(self) -> &'static str {
        match self {
            Isa::Riscv64 => "RISCV64",
            Isa::Mips => "MIPS",
        }
    }

    pub fn decoder(self) -> String {
        format!("vanadis.Vanadis{}Decoder", self.name())
    }

    pub fn os_handler(self) -> String {
        format!("vanadis.Vanadis{}OSHandler", self.name())
    }
}

impl FromStr for Isa {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        ISA_ALIASES
            .get(value.to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| {
                ConfigurationError::unknown(
                    "ISA",
                    "RISCV64 (rv, riscv, riscv64) or MIPS (mips, mipsel)",
                    value,
                )
            })
    }
}

impl TryFrom<String> for Isa {
    type Error = ConfigurationError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone)]
pub struct CoreComplexConfig {
    pub prefix: String,
    pub cores: usize,
    pub isa: Isa,
    pub hw_threads: u32,
    /// Node id of the first core; the rest follow consecutively. Supplied by
    /// the caller so that several complexes never share ids.
    pub first_node_id: u32,
    pub core_params: Params,
    pub l1i_params: Params,
    pub l1d_params: Params,
    /// Builds a private L2 per core when set.
    pub l2_params: Option<Params>,
    /// Falls back to `l1d_params`.
    pub os_cache_params: Option<Params>,
    /// Latency of the direct links: core to TLB to L1, L1 to bus to L2, OS to
    /// its cache.
    pub link_latency: Latency,
    /// Defaults to `bus_frequency` set from `link_latency`.
    pub bus_params: Option<Params>,
}

/// Processor cores with their private caches and the OS cache.
#[derive(Debug, Clone)]
pub struct CoreComplex {
    pub prefix: String,
    cores: Vec<NodeHandle>,
    os: NodeHandle,
    l1i: CacheLevel,
    l1d: CacheLevel,
    l2: Option<CacheLevel>,
    buses: Vec<Bus>,
    os_cache: CacheLevel,
}

/// The per-core nodes that sit between a core and its L1s.
struct CoreFrontEnd {
    data_if: NodeHandle,
    insn_if: NodeHandle,
    dtlb: NodeHandle,
    itlb: NodeHandle,
}

impl CoreComplex {
    pub fn build<E: Engine + ?Sized>(engine: &mut E, config: &CoreComplexConfig) -> Result<Self> {
        if config.hw_threads == 0 {
            return Err(ConfigurationError::invalid(
                "hardware thread count",
                "at least 1",
                config.hw_threads,
            ));
        }
        let ids_fit = u32::try_from(config.cores)
            .ok()
            .and_then(|cores| config.first_node_id.checked_add(cores))
            .is_some();
        if !ids_fit {
            return Err(ConfigurationError::invalid(
                "core node ids",
                "ids below 2^32",
                format!("{} cores from {}", config.cores, config.first_node_id),
            ));
        }
        let prefix = &config.prefix;
        let latency = config.link_latency;

        let os_name = format!("{prefix}os");
        let os = engine.create_node(&os_name, OS_KIND);
        engine.set_parameters(os, params! { "cores" => config.cores, "useMMU" => true });
        let mmu = engine.create_node(&format!("{os_name}.mmu"), MMU_KIND);
        engine.set_parameters(
            mmu,
            params! { "num_cores" => config.cores, "num_threads" => config.hw_threads },
        );
        let os_mem_if = engine.create_node(&format!("{os_name}.mem_interface"), MEM_INTERFACE_KIND);

        let mut cores = Vec::with_capacity(config.cores);
        let mut front_ends = Vec::with_capacity(config.cores);
        for (n, node_id) in (0..config.cores).zip(config.first_node_id..) {
            let name = format!("{prefix}core{n}");
            let core = engine.create_node(&name, CORE_KIND);
            let mut core_params = params! {
                "core_id" => n,
                "node_id" => node_id,
                "hardware_threads" => config.hw_threads,
            };
            core_params.extend(config.core_params.clone());
            engine.set_parameters(core, core_params);

            for thread in 0..config.hw_threads {
                let decoder = format!("{name}.decoder{thread}");
                engine.create_node(&decoder, &config.isa.decoder());
                engine.create_node(&format!("{decoder}.os_handler"), &config.isa.os_handler());
                engine.create_node(&format!("{decoder}.branch_unit"), BRANCH_UNIT_KIND);
            }

            let front_end = Self::front_end(engine, &name);
            let core_id = n as u32;
            engine.create_link(
                &format!("{prefix}{n}os"),
                LinkEnd::new(core, PortName::OsLink, latency),
                LinkEnd::new(os, PortName::OsCore(core_id), latency),
            );
            for (tlb, tlb_node, interface) in [
                (Tlb::Data, front_end.dtlb, front_end.data_if),
                (Tlb::Instruction, front_end.itlb, front_end.insn_if),
            ] {
                engine.create_link(
                    &format!("{prefix}{n}{}", tlb.tag()),
                    LinkEnd::new(interface, PortName::LowLink, latency),
                    LinkEnd::new(tlb_node, PortName::CpuInterface, latency),
                );
                engine.create_link(
                    &format!("{prefix}{n}{}_mmu", tlb.tag()),
                    LinkEnd::new(tlb_node, PortName::Mmu, latency),
                    LinkEnd::new(mmu, PortName::MmuTlb(core_id, tlb), latency),
                );
            }
            cores.push(core);
            front_ends.push(front_end);
        }

        let l1i = CacheLevel::private(engine, &format!("{prefix}l1i"), 1, config.cores, &config.l1i_params);
        let l1d = CacheLevel::private(engine, &format!("{prefix}l1d"), 1, config.cores, &config.l1d_params);
        for (n, front_end) in front_ends.iter().enumerate() {
            engine.create_link(
                &format!("{prefix}{n}c1i"),
                LinkEnd::new(front_end.itlb, PortName::CacheInterface, latency),
                LinkEnd::new(l1i.get(n).node, PortName::HighLink, latency),
            );
            engine.create_link(
                &format!("{prefix}{n}c1d"),
                LinkEnd::new(front_end.dtlb, PortName::CacheInterface, latency),
                LinkEnd::new(l1d.get(n).node, PortName::HighLink, latency),
            );
        }

        let l2 = config
            .l2_params
            .as_ref()
            .map(|params| CacheLevel::private(engine, &format!("{prefix}l2"), 2, config.cores, params));
        let mut buses = Vec::new();
        if let Some(l2) = &l2 {
            let bus_params = config
                .bus_params
                .clone()
                .unwrap_or_else(|| params! { "bus_frequency" => latency });
            for n in 0..config.cores {
                let mut bus = Bus::new(engine, &format!("{prefix}bus{n}"), &bus_params, latency);
                bus.connect_high(engine, l1i.get(n));
                bus.connect_high(engine, l1d.get(n));
                bus.connect_low(engine, l2.get(n));
                buses.push(bus);
            }
        }

        // The OS cache sits beside the cores' last private level.
        let os_level = if l2.is_some() { 2 } else { 1 };
        let os_cache_params = config.os_cache_params.as_ref().unwrap_or(&config.l1d_params);
        let os_cache = CacheLevel::private(engine, &format!("{prefix}os_l1"), os_level, 1, os_cache_params);
        engine.create_link(
            &format!("{prefix}l1os"),
            LinkEnd::new(os_mem_if, PortName::LowLink, latency),
            LinkEnd::new(os_cache.get(0).node, PortName::HighLink, latency),
        );

        Ok(Self {
            prefix: prefix.clone(),
            cores,
            os,
            l1i,
            l1d,
            l2,
            buses,
            os_cache,
        })
    }

    /// Load/store queue, instruction interface and the two TLB wrappers of one
    /// core.
    fn front_end<E: Engine + ?Sized>(engine: &mut E, core: &str) -> CoreFrontEnd {
        engine.create_node(&format!("{core}.lsq"), LSQ_KIND);
        let data_if = engine.create_node(&format!("{core}.lsq.memory_interface"), MEM_INTERFACE_KIND);
        let insn_if = engine.create_node(&format!("{core}.mem_interface_inst"), MEM_INTERFACE_KIND);

        let mut tlb_wrapper = |tlb: Tlb| {
            let name = format!("{core}.{}", tlb.tag());
            let wrapper = engine.create_node(&name, TLB_WRAPPER_KIND);
            if tlb == Tlb::Instruction {
                engine.set_parameters(wrapper, params! { "exe" => true });
            }
            engine.create_node(&format!("{name}.tlb"), TLB_KIND);
            wrapper
        };
        let dtlb = tlb_wrapper(Tlb::Data);
        let itlb = tlb_wrapper(Tlb::Instruction);

        CoreFrontEnd {
            data_if,
            insn_if,
            dtlb,
            itlb,
        }
    }

    pub fn cores(&self) -> &[NodeHandle] {
        &self.cores
    }

    pub fn os(&self) -> NodeHandle {
        self.os
    }

    pub fn l1i(&self) -> &CacheLevel {
        &self.l1i
    }

    pub fn l1d(&self) -> &CacheLevel {
        &self.l1d
    }

    pub fn l2(&self) -> Option<&CacheLevel> {
        self.l2.as_ref()
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn os_cache(&self) -> &CacheLevel {
        &self.os_cache
    }

    /// The group placed on the mesh for the cores: the private L2s when
    /// present, otherwise one L1D/L1I pair per core sharing a router.
    pub fn network_group(&self) -> EndpointGroup {
        if let Some(l2) = &self.l2 {
            return l2.group();
        }
        let mut group = EndpointGroup::new(
            format!("{}l1", self.prefix),
            EndpointCategory::Core { level: self.l1d.level },
        );
        for (l1d, l1i) in self.l1d.caches().iter().zip(self.l1i.caches()) {
            group.push_slot(smallvec![l1d.clone(), l1i.clone()]);
        }
        group
    }

    /// Put the cores' network group on `mesh` per `connectivity`, then the OS
    /// cache on `os_router`. Both placements are validated before either is
    /// made.
    pub fn attach<E: Engine + ?Sized>(
        &self,
        mesh: &mut MeshTopology,
        engine: &mut E,
        connectivity: Connectivity,
        os_router: RouterId,
        options: AttachOptions,
    ) -> Result<Vec<AttachReport>> {
        let group = self.network_group();
        let os_group = self.os_cache.group();
        let routers = mesh.router_count();
        let map = connectivity.resolve(routers, group.slot_count())?;
        let os_map = Connectivity::Router(os_router).resolve(routers, os_group.slot_count())?;

        let side = AttachSide::LowLink;
        Ok(vec![
            mesh.place(engine, &group, &map, side, options),
            mesh.place(engine, &os_group, &os_map, side, options),
        ])
    }
}
