pub mod directory;
pub mod ledger;

pub use directory::DeviceDirectory;
pub use ledger::Device;
