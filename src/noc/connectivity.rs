use serde::Deserialize;

use super::error::{ConfigurationError, Result};
use super::types::RouterId;

/// How a group is spread over the mesh, as supplied by the caller: either every
/// slot on one router, or an explicit per-router count in raster order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Connectivity {
    Router(RouterId),
    Map(Vec<usize>),
}

impl From<RouterId> for Connectivity {
    fn from(router: RouterId) -> Self {
        Connectivity::Router(router)
    }
}

impl From<Vec<usize>> for Connectivity {
    fn from(map: Vec<usize>) -> Self {
        Connectivity::Map(map)
    }
}

impl Connectivity {
    /// Normalize to an explicit map and check it against the mesh and the
    /// group before anything is mutated.
    pub fn resolve(&self, routers: usize, slots: usize) -> Result<ConnectivityMap> {
        let counts = match self {
            Connectivity::Router(router) => {
                if *router >= routers {
                    return Err(ConfigurationError::RouterIndex {
                        routers,
                        actual: *router,
                    });
                }
                let mut counts = vec![0; routers];
                counts[*router] = slots;
                counts
            }
            Connectivity::Map(counts) => counts.clone(),
        };
        ConnectivityMap::validate(counts, routers, slots)
    }
}

/// A per-router slot count whose length matches the mesh and whose sum
/// matches the group being attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityMap {
    counts: Vec<usize>,
}

impl ConnectivityMap {
    pub fn validate(counts: Vec<usize>, routers: usize, slots: usize) -> Result<Self> {
        if counts.len() != routers {
            return Err(ConfigurationError::MapLength {
                expected: routers,
                actual: counts.len(),
            });
        }
        let sum = counts
            .iter()
            .try_fold(0usize, |sum, count| sum.checked_add(*count))
            .ok_or_else(|| {
                ConfigurationError::invalid("connectivity map", "counts whose sum fits in usize", format!("{counts:?}"))
            })?;
        if sum != slots {
            return Err(ConfigurationError::MapSum {
                expected: slots,
                actual: sum,
            });
        }
        Ok(Self { counts })
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Router assignment for each slot, in slot order.
    pub fn placements(&self) -> Placements<'_> {
        Placements::new(&self.counts)
    }
}

/// Walks routers in raster order, handing out each router as many times as its
/// count. Yields `None` once every count is consumed.
#[derive(Debug, Clone)]
pub struct Placements<'a> {
    counts: &'a [usize],
    router: RouterId,
    remaining: usize,
}

impl<'a> Placements<'a> {
    pub(crate) fn new(counts: &'a [usize]) -> Self {
        Self {
            counts,
            router: 0,
            remaining: counts.first().copied().unwrap_or(0),
        }
    }
}

impl Iterator for Placements<'_> {
    type Item = RouterId;

    fn next(&mut self) -> Option<RouterId> {
        while self.remaining == 0 {
            if self.router + 1 >= self.counts.len() {
                return None;
            }
            self.router += 1;
            self.remaining = self.counts[self.router];
        }
        self.remaining -= 1;
        Some(self.router)
    }
}
