use smallvec::{smallvec, SmallVec};

use crate::engine::NodeHandle;

use super::types::EndpointCategory;

/// A leaf component that needs a seat on the mesh. Attachment only needs
/// `name`, since the NIC and adapters are separate nodes named after it;
/// `node` is for links made straight to the component, such as a bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub node: NodeHandle,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, node: NodeHandle) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// Endpoints that are placed together: one connectivity-map unit, one router,
/// one port per endpoint. Almost always a single endpoint; a core's L1D/L1I
/// pair shares a slot.
pub type Slot = SmallVec<[Endpoint; 2]>;

#[derive(Debug, Clone)]
pub struct EndpointGroup {
    pub name: String,
    pub category: EndpointCategory,
    slots: Vec<Slot>,
}

impl EndpointGroup {
    pub fn new(name: impl Into<String>, category: EndpointCategory) -> Self {
        Self {
            name: name.into(),
            category,
            slots: Vec::new(),
        }
    }

    pub fn from_endpoints(
        name: impl Into<String>,
        category: EndpointCategory,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Self {
        let mut group = Self::new(name, category);
        for endpoint in endpoints {
            group.push(endpoint);
        }
        group
    }

    pub fn push(&mut self, endpoint: Endpoint) {
        self.slots.push(smallvec![endpoint]);
    }

    pub fn push_slot(&mut self, slot: Slot) {
        assert!(!slot.is_empty(), "endpoint slot must not be empty");
        self.slots.push(slot);
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn endpoint_count(&self) -> usize {
        self.slots.iter().map(|slot| slot.len()).sum()
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.slots.iter().flatten()
    }
}
