pub mod error;
pub mod fanout;
pub mod http;
pub mod ports;
pub mod testing;
pub mod types;

pub use error::RemoteError;
pub use fanout::{HostReply, scatter};
pub use http::HttpContainerPort;
pub use ports::ContainerPort;
pub use testing::StaticContainerPort;
pub use types::{
    CreatorCapacity, CreatorId, DeviceSnapshot, HostId, Template, TemplateBatch, TemplateGroup,
};
