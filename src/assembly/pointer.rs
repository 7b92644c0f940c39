use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    assembly::types::{AssemblyState, ElementRef},
    remote::{CreatorId, HostId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotKind {
    Instance,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointerSegment {
    pub kind: SlotKind,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pointer(Vec<PointerSegment>);

impl Pointer {
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![PointerSegment {
            kind: SlotKind::Instance,
            name: name.into(),
        }])
    }

    pub fn child(&self, kind: SlotKind, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PointerSegment {
            kind,
            name: name.into(),
        });
        Self(segments)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            let tag = match segment.kind {
                SlotKind::Instance => "i",
                SlotKind::Resource => "r",
            };
            write!(f, "{}:{}", tag, segment.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningElement {
    pub host: HostId,
    pub creator: CreatorId,
    pub element: ElementRef,
}

#[derive(Debug, Clone, Default)]
pub struct PointerIndex {
    entries: BTreeMap<Pointer, RunningElement>,
}

impl PointerIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_state(state: &AssemblyState) -> Self {
        let mut index = Self::default();
        index.record(Pointer::root(state.name.clone()), state);
        index
    }

    fn record(&mut self, pointer: Pointer, state: &AssemblyState) {
        self.entries.insert(
            pointer.clone(),
            RunningElement {
                host: state.host.clone(),
                creator: state.creator.clone(),
                element: state.element,
            },
        );
        for child in &state.instances {
            self.record(pointer.child(SlotKind::Instance, child.name.clone()), child);
        }
        for child in &state.resources {
            self.record(pointer.child(SlotKind::Resource, child.name.clone()), child);
        }
    }

    pub fn lookup(&self, pointer: &Pointer) -> Option<&RunningElement> {
        self.entries.get(pointer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
