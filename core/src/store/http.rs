use std::fmt;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ItemStore;
use crate::client::ItemClient;
use crate::error::StoreError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Item, ItemId, NewItem};

/// Executes a plain-data `HttpRequest` and returns the response as data.
///
/// Non-2xx statuses must be returned as `Ok(HttpResponse)` so `ItemClient`
/// can interpret them; `Err` is reserved for requests that produced no
/// response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, StoreError>;
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, StoreError> {
    let url = req.url.as_str();
    let headers = req.headers.as_slice();
    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(url), headers).call(),
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(url), headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => with_headers(agent.post(url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            with_headers(agent.put(url), headers).send(body.as_bytes())
        }
        (HttpMethod::Put, None) => with_headers(agent.put(url), headers).send_empty(),
    };
    let mut response = result.map_err(|e| StoreError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| StoreError::Transport(e.to_string()))?;

    Ok(HttpResponse { status, body })
}

/// `ItemStore` backed by a remote HTTP store.
#[derive(Debug, Clone)]
pub struct HttpItemStore<T = UreqTransport> {
    client: ItemClient,
    transport: T,
}

impl HttpItemStore<UreqTransport> {
    pub fn connect(base_url: &str) -> Self {
        Self::with_transport(base_url, UreqTransport::new())
    }
}

impl<T: Transport> HttpItemStore<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: ItemClient::new(base_url),
            transport,
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        debug!(method = request.method.as_str(), url = %request.url, "store request");
        let response = self.transport.execute(request).await.inspect_err(|e| {
            warn!(error = %e, "store request failed");
        })?;
        debug!(status = response.status, "store response");
        Ok(response)
    }
}

#[async_trait]
impl<T: Transport> ItemStore for HttpItemStore<T> {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let response = self.round_trip(self.client.build_list_items()).await?;
        self.client.parse_list_items(response)
    }

    async fn create(&self, fields: &NewItem) -> Result<Item, StoreError> {
        let request = self.client.build_create_item(fields)?;
        let response = self.round_trip(request).await?;
        self.client.parse_create_item(response)
    }

    async fn update(&self, id: ItemId, fields: &Item) -> Result<Item, StoreError> {
        let request = self.client.build_update_item(id, fields)?;
        let response = self.round_trip(request).await?;
        self.client.parse_update_item(response)
    }

    async fn delete(&self, id: ItemId) -> Result<(), StoreError> {
        let response = self.round_trip(self.client.build_delete_item(id)).await?;
        self.client.parse_delete_item(response)
    }
}
