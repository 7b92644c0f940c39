use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contract::{Contract, ContractType};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(pub String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatorId(pub String);

impl CreatorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CreatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub host: HostId,
    pub creator: CreatorId,
    pub contract: Contract,
}

impl Template {
    pub fn provision(&self) -> Option<&Contract> {
        let provision_type = match self.contract.contract_type() {
            ContractType::InstanceTemplate | ContractType::InstanceStatus => {
                ContractType::InstanceProvision
            }
            ContractType::ResourceTemplate | ContractType::ResourceStatus => {
                ContractType::ResourceProvision
            }
            _ => return None,
        };
        self.contract
            .contracts(provision_type)
            .ok()
            .and_then(|mut provisions| provisions.next())
    }

    pub fn is_resource(&self) -> bool {
        matches!(
            self.contract.contract_type(),
            ContractType::ResourceTemplate | ContractType::ResourceStatus
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorCapacity {
    pub total: Vec<u64>,
    pub free: Vec<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub capacities: BTreeMap<CreatorId, CreatorCapacity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGroup {
    pub creator: CreatorId,
    pub templates: Vec<Contract>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBatch {
    pub per_demand: Vec<Vec<TemplateGroup>>,
}
