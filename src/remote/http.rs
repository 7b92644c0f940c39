use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    contract::Contract,
    remote::{
        error::RemoteError,
        ports::ContainerPort,
        types::{DeviceSnapshot, HostId, TemplateBatch},
    },
};

#[derive(Debug, Serialize)]
struct TemplateQuery<'a> {
    demands: &'a [Contract],
}

#[derive(Debug, Deserialize)]
struct TemplateReply {
    #[serde(flatten)]
    batch: TemplateBatch,
}

pub struct HttpContainerPort {
    client: reqwest::Client,
    base_urls: BTreeMap<HostId, String>,
}

impl HttpContainerPort {
    pub fn new(
        base_urls: BTreeMap<HostId, String>,
        request_timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self { client, base_urls })
    }

    fn endpoint(&self, host: &HostId, path: &str) -> Result<String, RemoteError> {
        let base = self.base_urls.get(host).ok_or_else(|| {
            RemoteError::Transport(format!("no base url configured for host '{host}'"))
        })?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }
}

#[async_trait]
impl ContainerPort for HttpContainerPort {
    async fn get_resources(&self, host: &HostId) -> Result<DeviceSnapshot, RemoteError> {
        let url = self.endpoint(host, "resources")?;
        let response = self.client.post(url).send().await?;
        let response = response
            .error_for_status()
            .map_err(|err| RemoteError::Protocol(err.to_string()))?;
        Ok(response.json::<DeviceSnapshot>().await?)
    }

    async fn get_templates(
        &self,
        host: &HostId,
        demands: &[Contract],
    ) -> Result<TemplateBatch, RemoteError> {
        let url = self.endpoint(host, "templates")?;
        let response = self
            .client
            .post(url)
            .json(&TemplateQuery { demands })
            .send()
            .await?;
        let response = response
            .error_for_status()
            .map_err(|err| RemoteError::Protocol(err.to_string()))?;
        let reply = response.json::<TemplateReply>().await?;
        if reply.batch.per_demand.len() != demands.len() {
            return Err(RemoteError::Protocol(format!(
                "host '{host}' answered {} demand groups for {} demands",
                reply.batch.per_demand.len(),
                demands.len()
            )));
        }
        Ok(reply.batch)
    }
}
