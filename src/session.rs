//! Session state machine for one chat view.
//!
//! A [`Session`] owns the transcript, the canvas and the record decoder of
//! the active exchange. Every mutation goes through the phase transitions
//! below, one transport chunk at a time:
//!
//! ```text
//! Idle --submit--> AwaitingFirstToken --first message--> Streaming
//!                          |                                 |
//!                          +------ complete / fail ----------+--> Settled
//! ```
//!
//! `Settled` accepts a new submission exactly like `Idle`.

use std::fmt;

use tracing::{debug, error, info, warn};

use crate::artifact::ArtifactError;
use crate::canvas::Canvas;
use crate::marker::{scan, ArtifactScan};
use crate::record::{RecordDecoder, RecordError, StreamRecord};
use crate::transcript::Transcript;
use crate::transport::TransportError;

pub const DEFAULT_GREETING: &str =
    "Hello! I am Nexus. I can browse the web and generate live reports for you.";
pub const DEFAULT_PLACEHOLDER: &str = "Here is the requested data:";
pub const DEFAULT_CONNECTION_ERROR: &str = "Error connecting to Nexus Brain.";

/// Fixed texts the session writes into the transcript on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub greeting: String,
    /// Shown when a message opens with an artifact and no lead-in text.
    pub placeholder: String,
    /// Appended as an assistant turn when the transport fails.
    pub connection_error: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            connection_error: DEFAULT_CONNECTION_ERROR.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_connection_error(mut self, message: impl Into<String>) -> Self {
        self.connection_error = message.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingFirstToken,
    Streaming,
    Settled,
}

/// Recoverable problem observed while ingesting a stream.
///
/// Diagnostics never reach the transcript; they are logged and handed back
/// to the caller.
#[derive(Debug)]
pub enum Diagnostic {
    MalformedRecord(RecordError),
    MalformedArtifact(ArtifactError),
    ServerError(String),
    DiscardedTail { bytes: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord(error) => write!(f, "dropped record: {error}"),
            Self::MalformedArtifact(error) => write!(f, "artifact not rendered: {error}"),
            Self::ServerError(message) => write!(f, "server reported: {message}"),
            Self::DiscardedTail { bytes } => {
                write!(f, "discarded {bytes} bytes of unterminated record")
            }
        }
    }
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    phase: Phase,
    transcript: Transcript,
    canvas: Canvas,
    decoder: RecordDecoder,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let transcript = Transcript::with_greeting(&config.greeting);
        Self {
            config,
            phase: Phase::Idle,
            transcript,
            canvas: Canvas::default(),
            decoder: RecordDecoder::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// True exactly while waiting for the first message of a cycle.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::AwaitingFirstToken
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::AwaitingFirstToken | Phase::Streaming)
    }

    /// Starts a cycle and returns the trimmed prompt to send.
    ///
    /// Blank input or an active cycle make this a no-op returning `None`.
    pub fn submit(&mut self, input: &str) -> Option<String> {
        if self.is_active() {
            debug!(phase = ?self.phase, "ignoring submit while a cycle is active");
            return None;
        }

        let prompt = input.trim();
        if prompt.is_empty() {
            return None;
        }

        self.transcript.push_user(prompt);
        self.decoder = RecordDecoder::default();
        self.phase = Phase::AwaitingFirstToken;
        info!(prompt_len = prompt.len(), "chat cycle started");

        Some(prompt.to_string())
    }

    /// Applies every record completed by `chunk`, in arrival order.
    pub fn ingest_chunk(&mut self, chunk: &[u8]) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if !self.is_active() {
            debug!(phase = ?self.phase, bytes = chunk.len(), "ignoring chunk outside a cycle");
            return diagnostics;
        }

        for record in self.decoder.feed(chunk) {
            match record {
                Ok(StreamRecord::Message { content }) => {
                    self.apply_message(&content, &mut diagnostics);
                }
                Ok(StreamRecord::Error { content }) => {
                    warn!(message = %content, "backend reported an error record");
                    diagnostics.push(Diagnostic::ServerError(content));
                }
                Ok(StreamRecord::Other { record_type, .. }) => {
                    debug!(%record_type, "passing through unhandled record type");
                }
                Err(error) => diagnostics.push(Diagnostic::MalformedRecord(error)),
            }
        }

        diagnostics
    }

    /// Transport closed normally.
    pub fn complete(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if !self.is_active() {
            return diagnostics;
        }

        if let Some(bytes) = self.decoder.finish() {
            diagnostics.push(Diagnostic::DiscardedTail { bytes });
        }
        self.transcript.close_assistant_turn();
        self.phase = Phase::Settled;
        info!(turns = self.transcript.len(), "chat cycle settled");

        diagnostics
    }

    /// Transport failed. Ends the cycle with the fixed connection error turn.
    pub fn fail(&mut self, cause: &TransportError) {
        if !self.is_active() {
            debug!(%cause, "ignoring transport failure outside a cycle");
            return;
        }

        error!(%cause, phase = ?self.phase, "chat cycle failed");
        let _ = self.decoder.finish();
        self.transcript
            .push_assistant(self.config.connection_error.clone());
        self.phase = Phase::Settled;
    }

    /// Back to a single greeting turn and an empty canvas.
    pub fn reset(&mut self) {
        self.transcript.reset(&self.config.greeting);
        self.canvas.clear();
        self.decoder = RecordDecoder::default();
        self.phase = Phase::Idle;
    }

    fn apply_message(&mut self, content: &str, diagnostics: &mut Vec<Diagnostic>) {
        if self.phase == Phase::AwaitingFirstToken {
            self.transcript.open_assistant_turn();
            self.phase = Phase::Streaming;
        }

        let outcome = scan(content);
        match outcome.artifact {
            ArtifactScan::Absent => {
                self.transcript.apply_prose(outcome.prose);
            }
            ArtifactScan::Pending => {
                self.transcript
                    .apply_lead_in(outcome.prose, &self.config.placeholder);
            }
            ArtifactScan::Complete(decoded) => {
                self.transcript
                    .apply_lead_in(outcome.prose, &self.config.placeholder);
                match decoded {
                    Ok(artifact) => {
                        if self.canvas.set_artifact(artifact) {
                            debug!(revision = self.canvas.revision(), "canvas artifact replaced");
                        }
                    }
                    Err(error) => {
                        warn!(%error, "failed to decode inline artifact");
                        diagnostics.push(Diagnostic::MalformedArtifact(error));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::artifact::Artifact;
    use crate::transcript::{ChatTurn, Role};

    fn message_line(content: &str) -> Vec<u8> {
        let mut line = serde_json::json!({"type": "message", "content": content}).to_string();
        line.push('\n');
        line.into_bytes()
    }

    fn last_content(session: &Session) -> &str {
        session
            .transcript()
            .last()
            .map(|turn| turn.content.as_str())
            .unwrap_or_default()
    }

    #[test]
    fn submit_appends_user_turn_and_awaits_first_token() {
        let mut session = Session::default();

        assert_eq!(session.submit("  hi there \n"), Some("hi there".to_string()));
        assert_eq!(session.phase(), Phase::AwaitingFirstToken);
        assert!(session.is_loading());
        assert_eq!(
            session.transcript().turns(),
            &[ChatTurn::assistant(DEFAULT_GREETING), ChatTurn::user("hi there")]
        );
    }

    #[test]
    fn submit_is_a_noop_for_blank_input_or_active_cycle() {
        let mut session = Session::default();

        assert_eq!(session.submit("   "), None);
        assert_eq!(session.phase(), Phase::Idle);

        session.submit("first");
        assert_eq!(session.submit("second"), None);
        assert_eq!(session.transcript().len(), 2);
    }

    #[test]
    fn first_message_opens_turn_and_clears_loading() {
        let mut session = Session::default();
        session.submit("q");

        let diagnostics = session.ingest_chunk(&message_line("Hel"));
        assert!(diagnostics.is_empty());
        assert_eq!(session.phase(), Phase::Streaming);
        assert!(!session.is_loading());

        session.ingest_chunk(&message_line("Hello"));
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(last_content(&session), "Hello");
    }

    #[test]
    fn non_message_records_do_not_open_a_turn() {
        let mut session = Session::default();
        session.submit("q");

        let diagnostics = session.ingest_chunk(
            b"{\"type\":\"status\",\"content\":\"searching\"}\n{\"type\":\"error\",\"content\":\"Server Error: x\"}\n",
        );

        assert_eq!(session.phase(), Phase::AwaitingFirstToken);
        assert_eq!(session.transcript().len(), 2);
        assert!(matches!(diagnostics.as_slice(), [Diagnostic::ServerError(_)]));
    }

    #[test]
    fn placeholder_is_shown_for_marker_only_message() {
        let mut session = Session::default();
        session.submit("chart it");

        session.ingest_chunk(&message_line(
            r#"<UI_COMPONENT>{"type":"bar_chart","title":"B","data":[{"label":"a","value":3}]}</UI_COMPONENT>"#,
        ));

        assert_eq!(last_content(&session), DEFAULT_PLACEHOLDER);
        assert!(matches!(session.canvas().artifact(), Some(Artifact::BarChart(_))));
    }

    #[test]
    fn malformed_artifact_keeps_previous_canvas_and_applies_prose() {
        let mut session = Session::default();
        session.submit("q");
        session.ingest_chunk(&message_line(
            r#"Old<UI_COMPONENT>{"type":"table","headers":["A"],"rows":[["1"]]}</UI_COMPONENT>"#,
        ));
        let before = session.canvas().clone();
        session.complete();

        session.submit("again");
        let diagnostics = session.ingest_chunk(&message_line(
            "New summary<UI_COMPONENT>{\"type\":\"table\",</UI_COMPONENT>",
        ));

        assert!(matches!(diagnostics.as_slice(), [Diagnostic::MalformedArtifact(_)]));
        assert_eq!(session.canvas(), &before);
        assert_eq!(last_content(&session), "New summary");
    }

    #[test]
    fn complete_settles_and_reports_discarded_tail() {
        let mut session = Session::default();
        session.submit("q");
        session.ingest_chunk(&message_line("done"));
        session.ingest_chunk(b"{\"type\":\"message\",\"content\":\"done and");

        let diagnostics = session.complete();
        assert!(matches!(
            diagnostics.as_slice(),
            [Diagnostic::DiscardedTail { .. }]
        ));
        assert_eq!(session.phase(), Phase::Settled);
        assert_eq!(last_content(&session), "done");
        assert!(session.transcript().open_turn().is_none());

        assert!(session.ingest_chunk(&message_line("late")).is_empty());
        assert_eq!(last_content(&session), "done");
    }

    #[test]
    fn failure_appends_single_error_turn_and_keeps_canvas() {
        let mut session = Session::default();
        session.submit("q");

        session.fail(&TransportError::new("connection refused"));

        assert_eq!(session.phase(), Phase::Settled);
        assert!(!session.is_loading());
        assert!(session.canvas().is_empty());
        assert_eq!(session.transcript().len(), 3);
        let last = session.transcript().last().expect("error turn");
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, DEFAULT_CONNECTION_ERROR);

        session.fail(&TransportError::new("again"));
        assert_eq!(session.transcript().len(), 3);
    }

    #[test]
    fn settled_session_accepts_a_new_cycle() {
        let mut session = Session::default();
        session.submit("one");
        session.ingest_chunk(&message_line("first answer"));
        session.complete();

        assert_eq!(session.submit("two"), Some("two".to_string()));
        session.ingest_chunk(&message_line("second answer"));

        let contents: Vec<_> = session
            .transcript()
            .turns()
            .iter()
            .map(|turn| turn.content.as_str())
            .collect();
        assert_eq!(
            contents,
            vec![DEFAULT_GREETING, "one", "first answer", "two", "second answer"]
        );
    }

    #[test]
    fn reset_restores_greeting_and_empty_canvas() {
        let mut session = Session::new(SessionConfig::default().with_greeting("Hi."));
        session.submit("q");
        session.ingest_chunk(&message_line(
            r#"<UI_COMPONENT>{"type":"bar_chart","data":[]}</UI_COMPONENT>"#,
        ));

        session.reset();

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.transcript().turns(), &[ChatTurn::assistant("Hi.")]);
        assert!(session.canvas().is_empty());
    }
}
