use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::{stream, FutureExt, StreamExt};
use nexus_chat::app::AppView;
use nexus_chat::providers::{ChatProvider, ScriptedProvider};
use nexus_ui::{
    ChatTransport, ChunkStream, Diagnostic, Phase, Session, SessionObserver, TransportError,
};

#[derive(Default)]
pub struct ViewSpy {
    pub notices: Vec<String>,
    pub phases: Vec<Phase>,
    pub diagnostics: Vec<String>,
}

impl SessionObserver for ViewSpy {
    fn on_update(&mut self, session: &Session) {
        self.phases.push(session.phase());
    }

    fn on_diagnostic(&mut self, diagnostic: &Diagnostic) {
        self.diagnostics.push(diagnostic.to_string());
    }
}

impl AppView for ViewSpy {
    fn notice(&mut self, text: &str) {
        self.notices.push(text.to_string());
    }
}

/// Scripted replay with no pacing and tiny chunks.
pub fn fast_mock() -> Arc<dyn ChatProvider> {
    Arc::new(
        ScriptedProvider::default()
            .with_chunk_size(3)
            .with_chunk_delay(Duration::ZERO),
    )
}

/// Delivers `first` and then drops the connection.
pub struct DroppingProvider {
    pub first: Vec<u8>,
}

impl ChatTransport for DroppingProvider {
    fn name(&self) -> &str {
        "dropping"
    }

    fn open<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        let chunks = vec![
            Ok(self.first.clone()),
            Err(TransportError::new("connection reset by peer")),
        ];
        let result: Result<ChunkStream, TransportError> = Ok(stream::iter(chunks).boxed());
        async move { result }.boxed()
    }
}

impl ChatProvider for DroppingProvider {
    fn id(&self) -> &'static str {
        "dropping"
    }

    fn transport(&self) -> &dyn ChatTransport {
        self
    }

    fn health(&self) -> BoxFuture<'_, Result<String, String>> {
        async { Err("connection refused".to_string()) }.boxed()
    }
}
