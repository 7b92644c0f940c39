use crate::{
    assembly::{ElementRef, Pointer, SlotKind},
    contract::Contract,
    device::DeviceDirectory,
    remote::{HostId, Template},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BindingId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
pub struct Binding {
    pub kind: SlotKind,
    pub demand: Contract,
    pub parent: Option<ElementId>,
    pub pointer: Pointer,
    pub pinned_host: Option<HostId>,
    pub candidates: Vec<Template>,
    pub cursor: usize,
    pub resolved: bool,
    pub child: Option<ElementId>,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub kind: SlotKind,
    pub binding: BindingId,
    pub template: Template,
    pub children: Vec<BindingId>,
    pub reserved: bool,
    pub reference: ElementRef,
    pub reused: bool,
    pub configured: bool,
}

#[derive(Debug, Default)]
pub struct ResolutionTree {
    bindings: Vec<Option<Binding>>,
    elements: Vec<Option<Element>>,
}

impl ResolutionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binding(&mut self, binding: Binding) -> BindingId {
        let id = BindingId(self.bindings.len());
        self.bindings.push(Some(binding));
        id
    }

    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Some(element));
        id
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id.0).and_then(Option::as_ref)
    }

    pub fn binding_mut(&mut self, id: BindingId) -> Option<&mut Binding> {
        self.bindings.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0).and_then(Option::as_ref)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn release_element(&mut self, id: ElementId, devices: &mut DeviceDirectory) {
        let Some(element) = self.elements.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        for child in element.children {
            self.release_binding(child, devices);
        }
        if element.reserved {
            devices
                .device_mut(&element.template.host)
                .release(&element.template.creator, &element.template.contract);
        }
    }

    pub fn release_binding(&mut self, id: BindingId, devices: &mut DeviceDirectory) {
        let Some(binding) = self.bindings.get_mut(id.0).and_then(Option::take) else {
            return;
        };
        if let Some(child) = binding.child {
            self.release_element(child, devices);
        }
    }
}
