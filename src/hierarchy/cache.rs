use std::str::FromStr;

use serde::Deserialize;

use crate::engine::{Engine, NodeHandle, Params};
use crate::noc::{ConfigurationError, Endpoint, EndpointCategory, EndpointGroup, HierarchyLevel};
use crate::params;

pub const CACHE_KIND: &str = "memHierarchy.Cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ReplacementPolicy {
    Lru,
    Lfu,
    Mru,
    Nmru,
    Random,
}

impl ReplacementPolicy {
    /// Shared caches use the optimized variants where one exists.
    pub fn component(self, shared: bool) -> String {
        let (name, has_opt) = match self {
            ReplacementPolicy::Lru => ("lru", true),
            ReplacementPolicy::Lfu => ("lfu", true),
            ReplacementPolicy::Mru => ("mru", true),
            ReplacementPolicy::Nmru => ("nmru", false),
            ReplacementPolicy::Random => ("random", false),
        };
        let suffix = if shared && has_opt { "-opt" } else { "" };
        format!("memHierarchy.replacement.{name}{suffix}")
    }
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            "mru" => Ok(Self::Mru),
            "nmru" => Ok(Self::Nmru),
            "random" => Ok(Self::Random),
            _ => Err(ConfigurationError::unknown(
                "replacement policy",
                "lru, lfu, mru, nmru, random",
                value,
            )),
        }
    }
}

impl TryFrom<String> for ReplacementPolicy {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A set of caches at one hierarchy level. Distributed levels are address
/// sliced across all members; private levels belong to one requester each.
#[derive(Debug, Clone)]
pub struct CacheLevel {
    pub prefix: String,
    pub level: HierarchyLevel,
    pub shared: bool,
    caches: Vec<Endpoint>,
}

impl CacheLevel {
    pub fn private<E: Engine + ?Sized>(
        engine: &mut E,
        prefix: &str,
        level: HierarchyLevel,
        count: usize,
        params: &Params,
    ) -> Self {
        Self::build(engine, prefix, level, count, false, params)
    }

    pub fn distributed<E: Engine + ?Sized>(
        engine: &mut E,
        prefix: &str,
        level: HierarchyLevel,
        count: usize,
        params: &Params,
    ) -> Self {
        let cache_level = Self::build(engine, prefix, level, count, true, params);
        for (slice, cache) in cache_level.caches.iter().enumerate() {
            engine.set_parameters(
                cache.node,
                params! {
                    "num_cache_slices" => count,
                    "slice_allocation_policy" => "rr",
                    "slice_id" => slice,
                },
            );
        }
        cache_level
    }

    fn build<E: Engine + ?Sized>(
        engine: &mut E,
        prefix: &str,
        level: HierarchyLevel,
        count: usize,
        shared: bool,
        params: &Params,
    ) -> Self {
        let caches = (0..count)
            .map(|n| {
                let name = format!("{prefix}{n}");
                let node = engine.create_node(&name, CACHE_KIND);
                engine.set_parameters(node, params.clone());
                Endpoint::new(name, node)
            })
            .collect();
        Self {
            prefix: prefix.to_string(),
            level,
            shared,
            caches,
        }
    }

    pub fn len(&self) -> usize {
        self.caches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    pub fn get(&self, index: usize) -> &Endpoint {
        &self.caches[index]
    }

    pub fn caches(&self) -> &[Endpoint] {
        &self.caches
    }

    /// Install a replacement policy on every cache. Caches that embed a
    /// directory take a second policy in slot 1 for the directory array.
    pub fn set_replacement<E: Engine + ?Sized>(
        &self,
        engine: &mut E,
        policy: ReplacementPolicy,
        params: Option<&Params>,
        for_directory: bool,
    ) -> Vec<NodeHandle> {
        let slot = usize::from(for_directory);
        let kind = policy.component(self.shared);
        self.caches
            .iter()
            .map(|cache| {
                let node = engine.create_node(&format!("{}.replacement{slot}", cache.name), &kind);
                if let Some(params) = params {
                    engine.set_parameters(node, params.clone());
                }
                node
            })
            .collect()
    }

    pub fn group(&self) -> EndpointGroup {
        EndpointGroup::from_endpoints(
            self.prefix.clone(),
            EndpointCategory::Cache { level: self.level },
            self.caches.iter().cloned(),
        )
    }
}
