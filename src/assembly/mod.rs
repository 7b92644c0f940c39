pub mod pointer;
pub mod types;

pub use pointer::{Pointer, PointerIndex, PointerSegment, RunningElement, SlotKind};
pub use types::{Assembly, AssemblyState, ElementRef};
