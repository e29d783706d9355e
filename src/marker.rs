//! Inline artifact marker scanning.

use crate::artifact::{Artifact, ArtifactError};

pub const OPEN_MARKER: &str = "<UI_COMPONENT>";
pub const CLOSE_MARKER: &str = "</UI_COMPONENT>";

/// State of the artifact payload found in one message.
#[derive(Debug)]
pub enum ArtifactScan {
    /// No opening marker: the message is pure prose.
    Absent,
    /// Opening marker seen, closing marker not yet streamed.
    Pending,
    /// Both markers present and the enclosed payload was decoded.
    Complete(Result<Artifact, ArtifactError>),
}

/// Result of splitting one full-content-so-far message.
#[derive(Debug)]
pub struct ScanOutcome<'a> {
    /// Verbatim text without a marker, trimmed lead-in text with one.
    pub prose: &'a str,
    pub artifact: ArtifactScan,
}

impl ScanOutcome<'_> {
    pub fn has_marker(&self) -> bool {
        !matches!(self.artifact, ArtifactScan::Absent)
    }
}

/// Splits `text` into lead-in prose and the first marker-delimited payload.
pub fn scan(text: &str) -> ScanOutcome<'_> {
    let Some(open) = text.find(OPEN_MARKER) else {
        return ScanOutcome {
            prose: text,
            artifact: ArtifactScan::Absent,
        };
    };

    let prose = text[..open].trim();
    let region = &text[open + OPEN_MARKER.len()..];
    let artifact = match region.find(CLOSE_MARKER) {
        Some(close) => ArtifactScan::Complete(Artifact::decode(&region[..close])),
        None => ArtifactScan::Pending,
    };

    ScanOutcome { prose, artifact }
}
