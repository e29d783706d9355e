use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream;
use futures_util::{FutureExt, StreamExt};
use nexus_ui::{ChatTransport, ChunkStream, TransportError};
use serde_json::json;

use super::ChatProvider;

const TABLE_LEAD_IN: &str = "Here is how the iPhone 16 and Pixel 9 compare";
const TABLE_PAYLOAD: &str = r#"{
  "type": "table",
  "title": "iPhone 16 vs Pixel 9",
  "data": {
    "headers": ["Spec", "iPhone 16", "Pixel 9"],
    "rows": [
      ["Display", "6.1\" OLED", "6.3\" OLED"],
      ["Chip", "A18", "Tensor G4"],
      ["Main camera", "48 MP", "50 MP"],
      ["Starting price", "$799", "$799"]
    ]
  }
}"#;

const CHART_LEAD_IN: &str = "Battery capacity, in mAh";
const CHART_PAYLOAD: &str = r#"{
  "type": "bar_chart",
  "title": "Battery capacity (mAh)",
  "data": [
    {"label": "iPhone 16", "value": 3561},
    {"label": "Pixel 9", "value": 4700},
    {"label": "Galaxy S24", "value": 4000}
  ]
}"#;

/// Replays canned NDJSON in small chunks that cut through records and
/// markers, the way a real network delivers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedProvider {
    chunk_size: usize,
    chunk_delay: Duration,
    script: Option<Vec<String>>,
}

impl ScriptedProvider {
    const CHUNK_SIZE: usize = 7;
    const CHUNK_DELAY_MS: u64 = 15;

    /// Replays `messages` for every prompt, one `message` record each.
    pub fn with_messages(messages: Vec<String>) -> Self {
        Self {
            script: Some(messages),
            ..Self::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Full NDJSON body the provider would send for `prompt`.
    pub fn body_for(&self, prompt: &str) -> Vec<u8> {
        let messages = match &self.script {
            Some(messages) => messages.clone(),
            None => default_script(prompt),
        };

        let mut body = String::new();
        for content in messages {
            body.push_str(&json!({"type": "message", "content": content}).to_string());
            body.push('\n');
        }
        body.into_bytes()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            chunk_size: Self::CHUNK_SIZE,
            chunk_delay: Duration::from_millis(Self::CHUNK_DELAY_MS),
            script: None,
        }
    }
}

impl ChatTransport for ScriptedProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn open<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<ChunkStream, TransportError>> {
        let chunks: Vec<Vec<u8>> = self
            .body_for(prompt)
            .chunks(self.chunk_size)
            .map(<[u8]>::to_vec)
            .collect();
        let delay = self.chunk_delay;

        let stream = stream::iter(chunks).then(move |chunk| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, TransportError>(chunk)
        });
        let result: Result<ChunkStream, TransportError> = Ok(stream.boxed());

        async move { result }.boxed()
    }
}

impl ChatProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn transport(&self) -> &dyn ChatTransport {
        self
    }

    fn health(&self) -> BoxFuture<'_, Result<String, String>> {
        async { Ok("ok (scripted replay)".to_string()) }.boxed()
    }
}

/// Each entry is the full content so far, as the backend resends it.
fn default_script(prompt: &str) -> Vec<String> {
    let lowered = prompt.to_ascii_lowercase();
    if lowered.contains("chart") || lowered.contains("battery") {
        return progressive(CHART_LEAD_IN, CHART_PAYLOAD);
    }
    if lowered.contains("compare") || lowered.contains(" vs") || lowered.contains("table") {
        return progressive(TABLE_LEAD_IN, TABLE_PAYLOAD);
    }

    let reply = format!(
        "You said: {}. Ask me to compare phones or chart their batteries.",
        prompt.trim()
    );
    let half = reply
        .char_indices()
        .map(|(index, _)| index)
        .nth(reply.chars().count() / 2)
        .unwrap_or(reply.len());
    vec![reply[..half].to_string(), reply]
}

fn progressive(lead_in: &str, payload: &str) -> Vec<String> {
    vec![
        lead_in.to_string(),
        format!("{lead_in}:\n<UI_COMPONENT>\n{payload}"),
        format!("{lead_in}:\n<UI_COMPONENT>\n{payload}\n</UI_COMPONENT>"),
    ]
}
