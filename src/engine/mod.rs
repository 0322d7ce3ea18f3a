//! Boundary to the execution engine that eventually runs a simulation over the
//! generated graph. Construction code only ever talks to an [`Engine`] through
//! its three primitives; nothing engine-internal is inspected.

mod recorder;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::noc::types::PortName;
use crate::noc::units::{Bandwidth, Bytes, Frequency, Latency};

pub use recorder::{GraphDescription, LinkEndRecord, LinkRecord, NodeRecord, RecordingEngine};

/// Opaque handle handed out by an engine for every created node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeHandle(pub(crate) usize);

impl NodeHandle {
    /// For engine implementations; `index` is whatever the engine uses to
    /// find the node again.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

macro_rules! display_param {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(value: $ty) -> Self {
                ParamValue::Str(value.to_string())
            }
        })*
    };
}

display_param!(Bytes, Bandwidth, Frequency, Latency);

/// Named parameters for one `set_parameters` call. Callers build a fresh map for
/// every call; maps are never shared between nodes.
pub type Params = BTreeMap<String, ParamValue>;

/// Build a [`Params`] map from `key => value` pairs.
#[macro_export]
macro_rules! params {
    () => { $crate::engine::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::engine::Params::new();
        $(map.insert(::std::string::String::from($key), $crate::engine::ParamValue::from($value));)+
        map
    }};
}

/// One side of a link: node, port on that node, and the latency seen from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkEnd {
    pub node: NodeHandle,
    pub port: PortName,
    pub latency: Latency,
}

impl LinkEnd {
    pub fn new(node: NodeHandle, port: PortName, latency: Latency) -> Self {
        Self { node, port, latency }
    }
}

pub trait Engine {
    fn create_node(&mut self, name: &str, kind: &str) -> NodeHandle;
    /// Adds `params` to the node; keys already present are overwritten.
    fn set_parameters(&mut self, node: NodeHandle, params: Params);
    fn create_link(&mut self, name: &str, a: LinkEnd, b: LinkEnd);
}
