use std::sync::Arc;

use futures_util::future::BoxFuture;
use nexus_ui::ChatTransport;

use crate::config::{ClientConfig, ProviderKind};

mod http;
mod mock;

pub use http::HttpProvider;
pub use mock::ScriptedProvider;

/// A chat backend as seen by the client: a transport plus a health probe.
pub trait ChatProvider: Send + Sync {
    fn id(&self) -> &'static str;

    fn transport(&self) -> &dyn ChatTransport;

    /// Short human-readable status line.
    fn health(&self) -> BoxFuture<'_, Result<String, String>>;
}

pub fn provider_from_config(config: &ClientConfig) -> Result<Arc<dyn ChatProvider>, String> {
    match config.provider {
        ProviderKind::Http => {
            let provider =
                HttpProvider::new(config.api.clone()).map_err(|error| error.to_string())?;
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => Ok(Arc::new(ScriptedProvider::default())),
    }
}
