use std::future::Future;
use std::time::Duration;

use futures_util::future::join_all;

use crate::remote::{error::RemoteError, types::HostId};

#[derive(Debug)]
pub struct HostReply<T> {
    pub host: HostId,
    pub outcome: Result<T, RemoteError>,
}

pub async fn scatter<T, F, Fut>(hosts: &[HostId], timeout: Duration, call: F) -> Vec<HostReply<T>>
where
    F: Fn(HostId) -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let legs: Vec<_> = hosts
        .iter()
        .cloned()
        .map(|host| {
            let pending = call(host.clone());
            async move {
                let outcome = match tokio::time::timeout(timeout, pending).await {
                    Ok(result) => result,
                    Err(_) => Err(RemoteError::Timeout(timeout)),
                };
                HostReply { host, outcome }
            }
        })
        .collect();

    join_all(legs).await
}
