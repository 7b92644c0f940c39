use std::collections::BTreeMap;

use crate::{
    device::ledger::Device,
    remote::HostId,
};

#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: BTreeMap<HostId, Device>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, host: HostId, device: Device) {
        self.devices.insert(host, device);
    }

    pub fn device(&self, host: &HostId) -> Option<&Device> {
        self.devices.get(host)
    }

    pub fn device_mut(&mut self, host: &HostId) -> &mut Device {
        self.devices.entry(host.clone()).or_insert_with(Device::empty)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &HostId> {
        self.devices.keys()
    }
}
