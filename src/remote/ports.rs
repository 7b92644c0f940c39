use async_trait::async_trait;

use crate::{
    contract::Contract,
    remote::{
        error::RemoteError,
        types::{DeviceSnapshot, HostId, TemplateBatch},
    },
};

#[async_trait]
pub trait ContainerPort: Send + Sync {
    async fn get_resources(&self, host: &HostId) -> Result<DeviceSnapshot, RemoteError>;

    async fn get_templates(
        &self,
        host: &HostId,
        demands: &[Contract],
    ) -> Result<TemplateBatch, RemoteError>;
}
