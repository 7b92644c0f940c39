use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    assembly::{Assembly, AssemblyState, ElementRef, Pointer, PointerIndex, SlotKind},
    contract::{Contract, ContractType},
    device::{Device, DeviceDirectory},
    remote::{ContainerPort, HostId, Template, scatter},
    session::{
        error::{PlanningError, broken_invariant, cancelled, invalid_anchor},
        tree::{Binding, BindingId, Element, ElementId, ResolutionTree},
    },
};

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub snapshot_timeout: Duration,
    pub query_timeout: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            snapshot_timeout: Duration::from_millis(10_000),
            query_timeout: Duration::from_millis(10_000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningOutcome {
    Assembly(Assembly),
    NoAssembly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigureOutcome {
    Configured,
    ResourceExhausted,
    NoCandidate,
    Stale,
}

enum WorkItem {
    Binding(BindingId),
    Element(ElementId),
}

// Backtracking is local and one-step: a failure only advances the failing
// binding's own cursor and never reconsiders a sibling's choice, so the
// search is bounded but not complete.
pub struct PlanningSession {
    config: PlannerConfig,
    container: Arc<dyn ContainerPort>,
    hosts: Vec<HostId>,
    devices: DeviceDirectory,
    tree: ResolutionTree,
    items: Vec<WorkItem>,
    pending: Vec<BindingId>,
    pointers: PointerIndex,
    shutdown: CancellationToken,
    session_id: Uuid,
    failed: bool,
}

impl PlanningSession {
    pub fn new(
        config: PlannerConfig,
        container: Arc<dyn ContainerPort>,
        hosts: Vec<HostId>,
    ) -> Self {
        Self {
            config,
            container,
            hosts,
            devices: DeviceDirectory::new(),
            tree: ResolutionTree::new(),
            items: Vec::new(),
            pending: Vec::new(),
            pointers: PointerIndex::empty(),
            shutdown: CancellationToken::new(),
            session_id: Uuid::now_v7(),
            failed: false,
        }
    }

    pub fn with_state(mut self, state: &AssemblyState) -> Self {
        self.pointers = PointerIndex::from_state(state);
        self
    }

    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub async fn plan(mut self, anchor: Contract) -> Result<PlanningOutcome, PlanningError> {
        if anchor.contract_type() != ContractType::InstanceDemand {
            return Err(invalid_anchor(format!(
                "planning anchors on an instance demand, got {:?}",
                anchor.contract_type()
            )));
        }

        tracing::info!(
            target: "session",
            session = %self.session_id,
            anchor = anchor.name(),
            hosts = self.hosts.len(),
            known_pointers = self.pointers.len(),
            "planning session started"
        );

        self.bootstrap_devices().await;

        let pointer = Pointer::root(anchor.name());
        let root = self.tree.add_binding(Binding {
            kind: SlotKind::Instance,
            demand: anchor,
            parent: None,
            pointer,
            pinned_host: None,
            candidates: Vec::new(),
            cursor: 0,
            resolved: false,
            child: None,
        });
        self.items.push(WorkItem::Binding(root));

        let mut round: u64 = 0;
        while !self.failed && (!self.items.is_empty() || !self.pending.is_empty()) {
            if self.shutdown.is_cancelled() {
                return Err(cancelled("planning session cancelled"));
            }
            while let Some(item) = self.items.pop() {
                match item {
                    WorkItem::Binding(id) => self.configure_binding(id)?,
                    WorkItem::Element(id) => self.configure_element(id)?,
                }
                if self.failed {
                    break;
                }
            }
            if self.failed || self.pending.is_empty() {
                break;
            }
            round += 1;
            self.resolve_pending(round).await?;
        }

        if self.failed {
            tracing::info!(
                target: "session",
                session = %self.session_id,
                rounds = round,
                "root exhausted its candidates; no assembly found"
            );
            return Ok(PlanningOutcome::NoAssembly);
        }

        match self.externalize(root)? {
            Some(assembly) => {
                tracing::info!(
                    target: "session",
                    session = %self.session_id,
                    rounds = round,
                    host = %assembly.host,
                    "planning session produced an assembly"
                );
                Ok(PlanningOutcome::Assembly(assembly))
            }
            None => Ok(PlanningOutcome::NoAssembly),
        }
    }

    async fn bootstrap_devices(&mut self) {
        let port = Arc::clone(&self.container);
        let replies = scatter(&self.hosts, self.config.snapshot_timeout, |host| {
            let port = Arc::clone(&port);
            async move { port.get_resources(&host).await }
        })
        .await;

        for reply in replies {
            let device = match reply.outcome {
                Ok(snapshot) => Device::from_snapshot(snapshot),
                Err(err) => {
                    tracing::warn!(
                        target: "session",
                        session = %self.session_id,
                        host = %reply.host,
                        error = %err,
                        "device snapshot unavailable; planning with empty ledger"
                    );
                    Device::empty()
                }
            };
            self.devices.insert(reply.host, device);
        }
    }

    fn configure_binding(&mut self, id: BindingId) -> Result<(), PlanningError> {
        match self.try_configure_binding(id)? {
            ConfigureOutcome::NoCandidate => self.binding_exhausted(id),
            ConfigureOutcome::Configured | ConfigureOutcome::Stale => Ok(()),
            ConfigureOutcome::ResourceExhausted => Err(broken_invariant(
                "binding configuration never reserves capacity itself",
            )),
        }
    }

    fn try_configure_binding(&mut self, id: BindingId) -> Result<ConfigureOutcome, PlanningError> {
        let Some(binding) = self.tree.binding(id) else {
            // Released by an ancestor's backtrack while still queued.
            return Ok(ConfigureOutcome::Stale);
        };
        if !binding.resolved {
            self.pending.push(id);
            return Ok(ConfigureOutcome::Configured);
        }
        if let Some(child) = binding.child {
            if self.tree.element(child).is_some_and(|element| element.configured) {
                return Ok(ConfigureOutcome::Configured);
            }
            // Partial state from an earlier attempt; drop it before retrying.
            self.tree.release_element(child, &mut self.devices);
            if let Some(binding) = self.tree.binding_mut(id) {
                binding.child = None;
            }
        }

        let Some(binding) = self.tree.binding(id) else {
            return Ok(ConfigureOutcome::Stale);
        };
        let Some(template) = binding.candidates.get(binding.cursor).cloned() else {
            return Ok(ConfigureOutcome::NoCandidate);
        };

        let reuse = self
            .pointers
            .lookup(&binding.pointer)
            .filter(|running| {
                running.host == template.host && running.creator == template.creator
            })
            .map(|running| running.element);
        tracing::debug!(
            target: "session",
            session = %self.session_id,
            pointer = %binding.pointer,
            host = %template.host,
            creator = %template.creator,
            cursor = binding.cursor,
            reused = reuse.is_some(),
            "binding picked a candidate"
        );

        let element = Element {
            kind: binding.kind,
            binding: id,
            template,
            children: Vec::new(),
            reserved: false,
            reference: reuse.unwrap_or_else(ElementRef::new),
            reused: reuse.is_some(),
            configured: false,
        };
        let element_id = self.tree.add_element(element);
        self.tree
            .binding_mut(id)
            .ok_or_else(|| broken_invariant("binding vanished while configuring"))?
            .child = Some(element_id);
        self.items.push(WorkItem::Element(element_id));
        Ok(ConfigureOutcome::Configured)
    }

    fn configure_element(&mut self, id: ElementId) -> Result<(), PlanningError> {
        match self.try_configure_element(id)? {
            ConfigureOutcome::ResourceExhausted => self.notify_failure(id),
            ConfigureOutcome::Configured | ConfigureOutcome::Stale => Ok(()),
            ConfigureOutcome::NoCandidate => Err(broken_invariant(
                "a materialized element always has its candidate",
            )),
        }
    }

    fn try_configure_element(&mut self, id: ElementId) -> Result<ConfigureOutcome, PlanningError> {
        let Some(element) = self.tree.element(id) else {
            return Ok(ConfigureOutcome::Stale);
        };
        if element.configured {
            return Ok(ConfigureOutcome::Configured);
        }
        let kind = element.kind;
        let binding_id = element.binding;
        let template = element.template.clone();

        if kind == SlotKind::Resource {
            let reserved = self
                .devices
                .device_mut(&template.host)
                .reserve(&template.creator, &template.contract);
            if !reserved {
                tracing::debug!(
                    target: "session",
                    session = %self.session_id,
                    host = %template.host,
                    creator = %template.creator,
                    "reservation unavailable; backtracking one step"
                );
                return Ok(ConfigureOutcome::ResourceExhausted);
            }
            self.tree
                .element_mut(id)
                .ok_or_else(|| broken_invariant("element vanished while reserving"))?
                .reserved = true;
        }

        let pointer = self
            .tree
            .binding(binding_id)
            .ok_or_else(|| broken_invariant("element's binding vanished"))?
            .pointer
            .clone();

        for (child_kind, demand) in child_demands(kind, &template)? {
            let child_pointer = pointer.child(child_kind, demand.name());
            let pinned_host = match child_kind {
                SlotKind::Resource => Some(template.host.clone()),
                SlotKind::Instance => None,
            };
            let child = self.tree.add_binding(Binding {
                kind: child_kind,
                demand,
                parent: Some(id),
                pointer: child_pointer,
                pinned_host,
                candidates: Vec::new(),
                cursor: 0,
                resolved: false,
                child: None,
            });
            self.tree
                .element_mut(id)
                .ok_or_else(|| broken_invariant("element vanished while expanding"))?
                .children
                .push(child);
            self.pending.push(child);
        }

        self.tree
            .element_mut(id)
            .ok_or_else(|| broken_invariant("element vanished while expanding"))?
            .configured = true;
        Ok(ConfigureOutcome::Configured)
    }

    fn notify_failure(&mut self, id: ElementId) -> Result<(), PlanningError> {
        let Some(element) = self.tree.element(id) else {
            return Ok(());
        };
        let binding_id = element.binding;
        self.tree.release_element(id, &mut self.devices);
        let binding = self
            .tree
            .binding_mut(binding_id)
            .ok_or_else(|| broken_invariant("failing element's binding vanished"))?;
        binding.child = None;
        binding.cursor += 1;
        self.items.push(WorkItem::Binding(binding_id));
        Ok(())
    }

    fn binding_exhausted(&mut self, id: BindingId) -> Result<(), PlanningError> {
        let Some(binding) = self.tree.binding(id) else {
            return Ok(());
        };
        tracing::debug!(
            target: "session",
            session = %self.session_id,
            pointer = %binding.pointer,
            tried = binding.cursor,
            "binding exhausted its candidates"
        );
        match binding.parent {
            Some(parent) => self.notify_failure(parent),
            None => {
                self.failed = true;
                Ok(())
            }
        }
    }

    async fn resolve_pending(&mut self, round: u64) -> Result<(), PlanningError> {
        let pending = std::mem::take(&mut self.pending);
        let mut live: Vec<BindingId> = Vec::new();
        let mut by_host: BTreeMap<HostId, Vec<(BindingId, Contract)>> = BTreeMap::new();

        for id in pending {
            let Some(binding) = self.tree.binding(id) else {
                continue;
            };
            if binding.resolved {
                self.items.push(WorkItem::Binding(id));
                continue;
            }
            let demand = binding.demand.copy();
            match &binding.pinned_host {
                Some(host) => by_host.entry(host.clone()).or_default().push((id, demand)),
                None => {
                    for host in &self.hosts {
                        by_host
                            .entry(host.clone())
                            .or_default()
                            .push((id, demand.copy()));
                    }
                }
            }
            live.push(id);
        }

        if live.is_empty() {
            return Ok(());
        }

        let hosts: Vec<HostId> = by_host.keys().cloned().collect();
        tracing::debug!(
            target: "session",
            session = %self.session_id,
            round,
            bindings = live.len(),
            hosts = hosts.len(),
            "resolve round dispatched"
        );

        let port = Arc::clone(&self.container);
        let replies = scatter(&hosts, self.config.query_timeout, |host| {
            let port = Arc::clone(&port);
            let demands: Vec<Contract> = by_host
                .get(&host)
                .map(|entries| entries.iter().map(|(_, demand)| demand.copy()).collect())
                .unwrap_or_default();
            async move { port.get_templates(&host, &demands).await }
        })
        .await;

        for reply in replies {
            let Some(entries) = by_host.get(&reply.host) else {
                continue;
            };
            let batch = match reply.outcome {
                Ok(batch) => batch,
                Err(err) => {
                    tracing::warn!(
                        target: "session",
                        session = %self.session_id,
                        host = %reply.host,
                        error = %err,
                        "template query failed; host contributes no candidates this round"
                    );
                    continue;
                }
            };
            if batch.per_demand.len() != entries.len() {
                tracing::warn!(
                    target: "session",
                    session = %self.session_id,
                    host = %reply.host,
                    "template response group count mismatches the query; dropped"
                );
                continue;
            }
            for ((id, demand), groups) in entries.iter().zip(batch.per_demand) {
                let Some(binding) = self.tree.binding_mut(*id) else {
                    continue;
                };
                for group in groups {
                    for contract in group.templates {
                        let template = Template {
                            host: reply.host.clone(),
                            creator: group.creator.clone(),
                            contract,
                        };
                        if admissible(binding.kind, &template, demand) {
                            binding.candidates.push(template);
                        }
                    }
                }
            }
        }

        for id in live {
            if let Some(binding) = self.tree.binding_mut(id) {
                binding.resolved = true;
                self.items.push(WorkItem::Binding(id));
            }
        }
        Ok(())
    }

    fn externalize(&self, id: BindingId) -> Result<Option<Assembly>, PlanningError> {
        let Some(binding) = self.tree.binding(id) else {
            return Ok(None);
        };
        let Some(element) = binding.child.and_then(|child| self.tree.element(child)) else {
            return Ok(None);
        };
        if !element.configured {
            return Ok(None);
        }

        let mut instances = Vec::new();
        let mut resources = Vec::new();
        for &child in &element.children {
            let Some(child_binding) = self.tree.binding(child) else {
                return Err(broken_invariant("configured element lost a child binding"));
            };
            let Some(assembly) = self.externalize(child)? else {
                return Ok(None);
            };
            match child_binding.kind {
                SlotKind::Instance => instances.push(assembly),
                SlotKind::Resource => resources.push(assembly),
            }
        }

        Ok(Some(Assembly {
            host: element.template.host.clone(),
            creator: element.template.creator.clone(),
            name: binding.demand.name().to_string(),
            contract: element.template.contract.copy(),
            element: element.reference,
            reused: element.reused,
            instances,
            resources,
        }))
    }
}

fn admissible(kind: SlotKind, template: &Template, demand: &Contract) -> bool {
    let wrapper_fits = match kind {
        SlotKind::Instance => {
            template.contract.contract_type() == ContractType::InstanceTemplate
        }
        SlotKind::Resource => {
            template.contract.contract_type() == ContractType::ResourceTemplate
        }
    };
    wrapper_fits
        && template
            .provision()
            .is_some_and(|provision| provision.matches(demand, true))
}

fn child_demands(
    kind: SlotKind,
    template: &Template,
) -> Result<Vec<(SlotKind, Contract)>, PlanningError> {
    let mut demands = Vec::new();
    if kind == SlotKind::Instance {
        let children = template
            .contract
            .contracts(ContractType::InstanceDemand)
            .map_err(|err| broken_invariant(err.to_string()))?;
        demands.extend(children.map(|demand| (SlotKind::Instance, demand.copy())));
    }
    let children = template
        .contract
        .contracts(ContractType::ResourceDemand)
        .map_err(|err| broken_invariant(err.to_string()))?;
    demands.extend(children.map(|demand| (SlotKind::Resource, demand.copy())));
    Ok(demands)
}
