use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    contract::Contract,
    remote::{CreatorId, HostId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementRef(Uuid);

impl ElementRef {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ElementRef {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    pub host: HostId,
    pub creator: CreatorId,
    pub name: String,
    pub contract: Contract,
    pub element: ElementRef,
    pub reused: bool,
    pub instances: Vec<Assembly>,
    pub resources: Vec<Assembly>,
}

impl Assembly {
    pub fn to_state(&self) -> AssemblyState {
        AssemblyState {
            host: self.host.clone(),
            creator: self.creator.clone(),
            name: self.name.clone(),
            element: self.element,
            instances: self.instances.iter().map(Assembly::to_state).collect(),
            resources: self.resources.iter().map(Assembly::to_state).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyState {
    pub host: HostId,
    pub creator: CreatorId,
    pub name: String,
    pub element: ElementRef,
    pub instances: Vec<AssemblyState>,
    pub resources: Vec<AssemblyState>,
}
