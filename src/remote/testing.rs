use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::{
    contract::{Contract, ContractType},
    remote::{
        error::RemoteError,
        ports::ContainerPort,
        types::{CreatorId, DeviceSnapshot, HostId, TemplateBatch, TemplateGroup},
    },
};

#[derive(Debug, Clone)]
struct ScriptedOffer {
    demand_type: ContractType,
    demand_name: String,
    creator: CreatorId,
    templates: Vec<Contract>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticContainerPort {
    snapshots: BTreeMap<HostId, DeviceSnapshot>,
    offers: BTreeMap<HostId, Vec<ScriptedOffer>>,
    failing: BTreeSet<HostId>,
}

impl StaticContainerPort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(mut self, host: HostId, snapshot: DeviceSnapshot) -> Self {
        self.snapshots.insert(host, snapshot);
        self
    }

    pub fn with_offer(
        mut self,
        host: HostId,
        demand_type: ContractType,
        demand_name: impl Into<String>,
        creator: CreatorId,
        templates: Vec<Contract>,
    ) -> Self {
        self.offers.entry(host).or_default().push(ScriptedOffer {
            demand_type,
            demand_name: demand_name.into(),
            creator,
            templates,
        });
        self
    }

    pub fn with_failing_host(mut self, host: HostId) -> Self {
        self.failing.insert(host);
        self
    }

    fn check_reachable(&self, host: &HostId) -> Result<(), RemoteError> {
        if self.failing.contains(host) {
            Err(RemoteError::Transport(format!("host '{host}' unreachable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContainerPort for StaticContainerPort {
    async fn get_resources(&self, host: &HostId) -> Result<DeviceSnapshot, RemoteError> {
        self.check_reachable(host)?;
        Ok(self.snapshots.get(host).cloned().unwrap_or_default())
    }

    async fn get_templates(
        &self,
        host: &HostId,
        demands: &[Contract],
    ) -> Result<TemplateBatch, RemoteError> {
        self.check_reachable(host)?;
        let offers = self.offers.get(host).map(Vec::as_slice).unwrap_or(&[]);
        let per_demand = demands
            .iter()
            .map(|demand| {
                offers
                    .iter()
                    .filter(|offer| {
                        offer.demand_type == demand.contract_type()
                            && offer.demand_name == demand.name()
                    })
                    .map(|offer| TemplateGroup {
                        creator: offer.creator.clone(),
                        templates: offer.templates.clone(),
                    })
                    .collect()
            })
            .collect();
        Ok(TemplateBatch { per_demand })
    }
}
