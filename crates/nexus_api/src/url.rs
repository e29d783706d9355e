/// Default base URL for a locally running backend.
pub const DEFAULT_NEXUS_BASE_URL: &str = "http://localhost:8000";

const CHAT_PATH: &str = "/chat";
const HEALTH_PATH: &str = "/health";

/// Normalize a base URL to the streaming chat endpoint.
///
/// Normalization rules:
/// 1) blank input falls back to [`DEFAULT_NEXUS_BASE_URL`]
/// 2) keep a trailing `/chat` unchanged
/// 3) append `/chat` otherwise
pub fn normalize_chat_url(input: &str) -> String {
    let base = service_root(input);
    format!("{base}{CHAT_PATH}")
}

/// Normalize a base URL (or a chat endpoint URL) to the health probe.
pub fn normalize_health_url(input: &str) -> String {
    let base = service_root(input);
    format!("{base}{HEALTH_PATH}")
}

fn service_root(input: &str) -> &str {
    let base = if input.trim().is_empty() {
        DEFAULT_NEXUS_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    trimmed
        .strip_suffix(CHAT_PATH)
        .or_else(|| trimmed.strip_suffix(HEALTH_PATH))
        .unwrap_or(trimmed)
}
