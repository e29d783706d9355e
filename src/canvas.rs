//! Holder for the single live artifact.

use crate::artifact::Artifact;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    artifact: Option<Artifact>,
    revision: u64,
}

impl Canvas {
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.artifact.is_none()
    }

    /// Bumped on every change so renderers can skip redraws.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replaces the held artifact wholesale. Returns whether it differed.
    pub fn set_artifact(&mut self, artifact: Artifact) -> bool {
        let changed = self.artifact.as_ref() != Some(&artifact);
        self.artifact = Some(artifact);
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Drops the artifact. Only used when the session resets.
    pub fn clear(&mut self) {
        if self.artifact.take().is_some() {
            self.revision += 1;
        }
    }
}
