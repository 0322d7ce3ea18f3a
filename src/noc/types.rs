use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::error::ConfigurationError;

pub type RouterId = usize;
pub type HierarchyLevel = u32;

/// The four independent sub-networks laid over the same mesh shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Plane {
    Request,
    Acknowledge,
    Forward,
    Data,
}

impl Plane {
    pub const ALL: [Plane; 4] = [Plane::Request, Plane::Acknowledge, Plane::Forward, Plane::Data];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used for router components (`{prefix}_req3`) and adapter slots.
    pub fn tag(self) -> &'static str {
        match self {
            Plane::Request => "req",
            Plane::Acknowledge => "ack",
            Plane::Forward => "fwd",
            Plane::Data => "data",
        }
    }

    /// One-letter prefix for neighbor link names.
    pub fn short(self) -> char {
        match self {
            Plane::Request => 'r',
            Plane::Acknowledge => 'a',
            Plane::Forward => 'f',
            Plane::Data => 'd',
        }
    }

    pub fn is_control(self) -> bool {
        self != Plane::Data
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Router and adapter port identifiers. Only the engine boundary turns these
/// into strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortName {
    North,
    South,
    East,
    West,
    Local(u32),
    /// The single router-facing port of a channel adapter.
    Router,
    /// Upper (processor-facing) side of a cache or memory component.
    HighLink,
    /// Lower (memory-facing) side of a cache, interface or core port.
    LowLink,
    /// Numbered upper-side port of a bus.
    BusHigh(u32),
    /// Numbered lower-side port of a bus.
    BusLow(u32),
    /// Core-facing port of a TLB wrapper.
    CpuInterface,
    /// Cache-facing port of a TLB wrapper.
    CacheInterface,
    /// A core's request port toward the node OS.
    OsLink,
    /// The node OS port serving core `n`.
    OsCore(u32),
    /// A TLB's port toward the MMU.
    Mmu,
    /// The MMU port serving one TLB of core `n`.
    MmuTlb(u32, Tlb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tlb {
    Data,
    Instruction,
}

impl Tlb {
    pub fn tag(self) -> &'static str {
        match self {
            Tlb::Data => "dtlb",
            Tlb::Instruction => "itlb",
        }
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortName::North => f.write_str("north"),
            PortName::South => f.write_str("south"),
            PortName::East => f.write_str("east"),
            PortName::West => f.write_str("west"),
            PortName::Local(n) => write!(f, "local{n}"),
            PortName::Router => f.write_str("rtr_port"),
            PortName::HighLink => f.write_str("highlink"),
            PortName::LowLink => f.write_str("lowlink"),
            PortName::BusHigh(n) => write!(f, "highlink{n}"),
            PortName::BusLow(n) => write!(f, "lowlink{n}"),
            PortName::CpuInterface => f.write_str("cpu_if"),
            PortName::CacheInterface => f.write_str("cache_if"),
            PortName::OsLink => f.write_str("os_link"),
            PortName::OsCore(n) => write!(f, "core{n}"),
            PortName::Mmu => f.write_str("mmu"),
            PortName::MmuTlb(n, tlb) => write!(f, "core{n}.{}", tlb.tag()),
        }
    }
}

/// Which side of an endpoint faces the network. `LowLink` is used for
/// endpoints whose upper side is wired directly to cores or upper caches;
/// `HighLink` for endpoints that reach everything over the network or whose
/// lower side is wired directly to memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum AttachSide {
    #[default]
    HighLink,
    LowLink,
}

impl AttachSide {
    pub fn slot(self) -> &'static str {
        match self {
            AttachSide::HighLink => "highlink",
            AttachSide::LowLink => "lowlink",
        }
    }
}

impl FromStr for AttachSide {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "highlink" => Ok(Self::HighLink),
            "lowlink" => Ok(Self::LowLink),
            _ => Err(ConfigurationError::unknown(
                "attach side",
                "highlink, lowlink",
                value,
            )),
        }
    }
}

impl TryFrom<String> for AttachSide {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reserved categories get their hierarchy level only at finalization, stacked
/// above every level observed on the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservedCategory {
    Directory,
    Memory,
}

impl fmt::Display for ReservedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservedCategory::Directory => f.write_str("directory"),
            ReservedCategory::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointCategory {
    Cache { level: HierarchyLevel },
    Core { level: HierarchyLevel },
    Reserved(ReservedCategory),
}

impl EndpointCategory {
    pub const DIRECTORY: Self = EndpointCategory::Reserved(ReservedCategory::Directory);
    pub const MEMORY: Self = EndpointCategory::Reserved(ReservedCategory::Memory);

    /// Level known at attach time; `None` for reserved categories.
    pub fn level(&self) -> Option<HierarchyLevel> {
        match self {
            EndpointCategory::Cache { level } | EndpointCategory::Core { level } => Some(*level),
            EndpointCategory::Reserved(_) => None,
        }
    }

    pub fn reserved(&self) -> Option<ReservedCategory> {
        match self {
            EndpointCategory::Reserved(category) => Some(*category),
            _ => None,
        }
    }
}
