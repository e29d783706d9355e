//! Ordered chat turns with in-place replacement of the streaming turn.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    /// True only for the last assistant turn while its response streams.
    pub streaming: bool,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            streaming: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            streaming: false,
        }
    }

    /// Empty turns are never drawn as bubbles.
    pub fn is_visible(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn with_greeting(greeting: &str) -> Self {
        let mut transcript = Self::default();
        transcript.reset(greeting);
        transcript
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Turns a renderer should draw, in order.
    pub fn visible_turns(&self) -> impl Iterator<Item = &ChatTurn> {
        self.turns.iter().filter(|turn| turn.is_visible())
    }

    /// Replaces all turns with a single assistant greeting.
    pub fn reset(&mut self, greeting: &str) {
        self.turns.clear();
        if !greeting.is_empty() {
            self.turns.push(ChatTurn::assistant(greeting));
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.close_assistant_turn();
        self.turns.push(ChatTurn::user(content));
    }

    /// Appends a finished assistant turn, closing any streaming one first.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.close_assistant_turn();
        self.turns.push(ChatTurn::assistant(content));
    }

    pub fn open_turn(&self) -> Option<&ChatTurn> {
        self.turns.last().filter(|turn| turn.streaming)
    }

    /// Appends the empty streaming assistant turn. Returns false when one is
    /// already open, so repeated calls within a cycle append nothing.
    pub fn open_assistant_turn(&mut self) -> bool {
        if self.open_turn().is_some() {
            return false;
        }

        self.turns.push(ChatTurn {
            role: Role::Assistant,
            content: String::new(),
            streaming: true,
        });
        true
    }

    /// Replaces the open turn's content with the full text so far.
    ///
    /// Blank text never hides a turn that already shows something. Returns
    /// whether the content changed.
    pub fn apply_prose(&mut self, text: &str) -> bool {
        let Some(turn) = self.turns.last_mut().filter(|turn| turn.streaming) else {
            return false;
        };

        if text.trim().is_empty() && turn.is_visible() {
            return false;
        }
        if turn.content == text {
            return false;
        }

        turn.content.clear();
        turn.content.push_str(text);
        true
    }

    /// Applies the lead-in prose of a message carrying an artifact marker.
    ///
    /// When the lead-in is empty and the turn shows nothing yet, `placeholder`
    /// is shown instead.
    pub fn apply_lead_in(&mut self, prose: &str, placeholder: &str) -> bool {
        if !prose.is_empty() {
            return self.apply_prose(prose);
        }

        match self.open_turn() {
            Some(turn) if !turn.is_visible() => self.apply_prose(placeholder),
            _ => false,
        }
    }

    /// Marks the streaming turn finished. Content is left as is.
    pub fn close_assistant_turn(&mut self) {
        if let Some(turn) = self.turns.last_mut() {
            turn.streaming = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{ChatTurn, Role, Transcript};

    const PLACEHOLDER: &str = "Here is the requested data:";

    fn streaming_transcript() -> Transcript {
        let mut transcript = Transcript::with_greeting("Hello!");
        transcript.push_user("question");
        assert!(transcript.open_assistant_turn());
        transcript
    }

    #[test]
    fn greeting_is_the_only_initial_turn() {
        let transcript = Transcript::with_greeting("Hello!");

        assert_eq!(transcript.turns(), &[ChatTurn::assistant("Hello!")]);
    }

    #[test]
    fn open_assistant_turn_appends_once() {
        let mut transcript = streaming_transcript();

        assert!(!transcript.open_assistant_turn());
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().map(|turn| turn.role), Some(Role::Assistant));
        assert!(transcript.open_turn().is_some());
    }

    #[test]
    fn apply_prose_replaces_instead_of_appending() {
        let mut transcript = streaming_transcript();

        assert!(transcript.apply_prose("Hel"));
        assert!(transcript.apply_prose("Hello wor"));
        assert_eq!(transcript.last().map(|turn| turn.content.as_str()), Some("Hello wor"));
    }

    #[test]
    fn apply_prose_is_idempotent() {
        let mut transcript = streaming_transcript();
        transcript.apply_prose("same text");
        let snapshot = transcript.clone();

        assert!(!transcript.apply_prose("same text"));
        assert_eq!(transcript, snapshot);
    }

    #[test]
    fn empty_prose_never_blanks_visible_turn() {
        let mut transcript = streaming_transcript();
        transcript.apply_prose("Shown");

        assert!(!transcript.apply_prose(""));
        assert!(!transcript.apply_lead_in("", PLACEHOLDER));
        assert_eq!(transcript.last().map(|turn| turn.content.as_str()), Some("Shown"));
    }

    #[test]
    fn whitespace_prose_never_hides_visible_turn() {
        let mut transcript = streaming_transcript();
        transcript.apply_prose("Partial");

        assert!(!transcript.apply_prose("   "));
        assert!(!transcript.apply_prose("\n\t"));
        let turn = transcript.open_turn().expect("open turn");
        assert_eq!(turn.content, "Partial");
        assert!(turn.is_visible());
    }

    #[test]
    fn whitespace_only_turn_still_gets_placeholder() {
        let mut transcript = streaming_transcript();
        transcript.apply_prose("  ");

        assert!(transcript.apply_lead_in("", PLACEHOLDER));
        assert_eq!(
            transcript.last().map(|turn| turn.content.as_str()),
            Some(PLACEHOLDER)
        );
    }

    #[test]
    fn empty_lead_in_on_fresh_turn_shows_placeholder() {
        let mut transcript = streaming_transcript();

        assert!(transcript.apply_lead_in("", PLACEHOLDER));
        assert_eq!(
            transcript.last().map(|turn| turn.content.as_str()),
            Some(PLACEHOLDER)
        );
        assert!(transcript.apply_lead_in("Real summary", PLACEHOLDER));
        assert_eq!(
            transcript.last().map(|turn| turn.content.as_str()),
            Some("Real summary")
        );
    }

    #[test]
    fn prose_is_ignored_without_open_turn() {
        let mut transcript = Transcript::with_greeting("Hello!");

        assert!(!transcript.apply_prose("stray"));
        assert_eq!(transcript.turns(), &[ChatTurn::assistant("Hello!")]);
    }

    #[test]
    fn empty_turns_are_not_visible() {
        let transcript = streaming_transcript();

        let visible: Vec<_> = transcript
            .visible_turns()
            .map(|turn| turn.content.as_str())
            .collect();
        assert_eq!(visible, vec!["Hello!", "question"]);
    }

    #[test]
    fn push_assistant_closes_streaming_turn() {
        let mut transcript = streaming_transcript();
        transcript.apply_prose("partial");
        transcript.push_assistant("Error connecting to Nexus Brain.");

        assert!(transcript.open_turn().is_none());
        assert!(transcript.turns().iter().all(|turn| !turn.streaming));
        assert_eq!(transcript.len(), 4);
    }
}
