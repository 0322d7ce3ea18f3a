use super::types::RouterId;

/// Hands out local port numbers per router. Every attached endpoint takes the
/// same number on all four planes, so one counter per router suffices.
/// Ports are never freed.
#[derive(Debug, Clone, Default)]
pub struct PortAllocator {
    used: Vec<u32>,
}

impl PortAllocator {
    pub fn new(routers: usize) -> Self {
        Self {
            used: vec![0; routers],
        }
    }

    /// Returns the router's current used-port count, then bumps it.
    pub fn next(&mut self, router: RouterId) -> u32 {
        let port = self.used[router];
        self.used[router] += 1;
        port
    }

    pub fn used(&self, router: RouterId) -> u32 {
        self.used[router]
    }

    pub fn max_used(&self) -> u32 {
        self.used.iter().copied().max().unwrap_or(0)
    }

    pub fn routers(&self) -> usize {
        self.used.len()
    }
}
