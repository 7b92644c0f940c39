use std::collections::BTreeMap;

use crate::{
    contract::Contract,
    remote::{CreatorCapacity, CreatorId, DeviceSnapshot},
};

// Speculative per-session view of one host's capacity. The container
// re-validates when it instantiates the winning assembly.
#[derive(Debug, Clone, Default)]
pub struct Device {
    capacities: BTreeMap<CreatorId, CreatorCapacity>,
}

impl Device {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: DeviceSnapshot) -> Self {
        Self {
            capacities: snapshot.capacities,
        }
    }

    pub fn reserve(&mut self, creator: &CreatorId, contract: &Contract) -> bool {
        let units = contract.cost_estimate();
        if units.is_empty() {
            return true;
        }
        let Some(capacity) = self.capacities.get_mut(creator) else {
            return false;
        };
        if units.len() > capacity.free.len() {
            return false;
        }
        if units
            .iter()
            .zip(capacity.free.iter())
            .any(|(requested, free)| requested > free)
        {
            return false;
        }
        for (requested, free) in units.iter().zip(capacity.free.iter_mut()) {
            *free -= requested;
        }
        true
    }

    pub fn release(&mut self, creator: &CreatorId, contract: &Contract) {
        let units = contract.cost_estimate();
        if units.is_empty() {
            return;
        }
        let Some(capacity) = self.capacities.get_mut(creator) else {
            return;
        };
        for ((requested, free), total) in units
            .iter()
            .zip(capacity.free.iter_mut())
            .zip(capacity.total.iter())
        {
            *free = free.saturating_add(*requested);
            if *free > *total {
                tracing::warn!(
                    target: "device",
                    creator = %creator,
                    "release drove free capacity above total; unbalanced release"
                );
                *free = *total;
            }
        }
    }

    pub fn free_resources(&self, creator: &CreatorId) -> Option<&[u64]> {
        self.capacities
            .get(creator)
            .map(|capacity| capacity.free.as_slice())
    }

    pub fn total_resources(&self, creator: &CreatorId) -> Option<&[u64]> {
        self.capacities
            .get(creator)
            .map(|capacity| capacity.total.as_slice())
    }
}
