//! Distributed component-assembly planner.

pub mod assembly;
pub mod config;
pub mod contract;
pub mod device;
pub mod logging;
pub mod remote;
pub mod session;
