use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use nexus_api::{ChatRequest, NexusApiClient, NexusApiConfig, NexusApiError};
use nexus_ui::{ChatTransport, ChunkStream, TransportError};

use super::ChatProvider;

/// Streams from a live backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: NexusApiClient,
}

impl HttpProvider {
    pub fn new(config: NexusApiConfig) -> Result<Self, NexusApiError> {
        Ok(Self {
            client: NexusApiClient::new(config)?,
        })
    }

    pub fn client(&self) -> &NexusApiClient {
        &self.client
    }
}

impl ChatTransport for HttpProvider {
    fn name(&self) -> &str {
        "http"
    }

    fn open<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        async move {
            let request = ChatRequest::new(prompt);
            let stream = self
                .client
                .open_stream(&request)
                .await
                .map_err(map_transport_error)?;
            Ok(stream
                .map(|chunk| chunk.map_err(map_transport_error))
                .boxed())
        }
        .boxed()
    }
}

impl ChatProvider for HttpProvider {
    fn id(&self) -> &'static str {
        "http"
    }

    fn transport(&self) -> &dyn ChatTransport {
        self
    }

    fn health(&self) -> BoxFuture<'_, Result<String, String>> {
        async move {
            let status = self
                .client
                .health()
                .await
                .map_err(|error| error.to_string())?;
            let base_url = &self.client.config().base_url;
            Ok(match status.engine {
                Some(engine) => format!("{} ({engine}) at {base_url}", status.status),
                None => format!("{} at {base_url}", status.status),
            })
        }
        .boxed()
    }
}

fn map_transport_error(error: NexusApiError) -> TransportError {
    TransportError::new(error.to_string())
}
